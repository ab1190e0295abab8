//! A set of types for building requests and reading replies as defined in
//! the [JSON-RPC 1.0 spec](https://www.jsonrpc.org/specification_v1) and
//! [JSON-RPC 2.0 spec](https://www.jsonrpc.org/specification).
//!
//! # Usage
//!
//! ## Creates JSON-RPC 2.0 method calls
//!
//! ```rust
//! use dual_jsonrpc_types::{v2::MethodCall, Id, Params};
//!
//! let call = MethodCall::new("foo", Some(Params::Array(vec![])), Some(Id::Num(1)));
//! assert_eq!(
//!     serde_json::to_string(&call).unwrap(),
//!     r#"{"jsonrpc":"2.0","method":"foo","params":[],"id":1}"#
//! );
//!
//! // Notifications carry no id at all.
//! let notification = MethodCall::new("foo", None, None);
//! assert_eq!(
//!     serde_json::to_string(&notification).unwrap(),
//!     r#"{"jsonrpc":"2.0","method":"foo"}"#
//! );
//! ```
//!
//! ## Creates JSON-RPC 1.0 method calls
//!
//! ```rust
//! use dual_jsonrpc_types::{v1::MethodCall, Id};
//!
//! let call = MethodCall::new("foo", Some(vec![]), Some(Id::Num(1)));
//! assert_eq!(
//!     serde_json::to_string(&call).unwrap(),
//!     r#"{"method":"foo","params":[],"id":1}"#
//! );
//!
//! // Notifications keep the id member, set to null.
//! let notification = MethodCall::new("foo", None, None);
//! assert_eq!(
//!     serde_json::to_string(&notification).unwrap(),
//!     r#"{"method":"foo","id":null}"#
//! );
//! ```

#![deny(unused_imports)]
#![deny(missing_docs)]

/// JSON-RPC 1.0 types.
pub mod v1;
/// JSON-RPC 2.0 types.
pub mod v2;

mod error;
mod id;
mod params;
mod version;

pub use self::{
    error::{Error, ErrorCode},
    id::Id,
    params::Params,
    version::{UnsupportedVersion, Version},
};

// Re-exports
pub use serde_json::{Map, Value};
