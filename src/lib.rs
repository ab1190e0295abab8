//! A JSON-RPC client engine for the [1.0](https://www.jsonrpc.org/specification_v1)
//! and [2.0](https://www.jsonrpc.org/specification) protocols.
//!
//! Requests are encoded according to the protocol version chosen by the
//! caller, replies are validated against that version and correlated with
//! their request by id. Batches hand each reply envelope to the member it
//! answers.
//!
//! Encoding and interpretation are plain synchronous computations; only the
//! [`Transport`] does I/O.
//!
//! ```rust
//! use dual_jsonrpc_client::{BatchRequest, Request, ResponseState};
//! use dual_jsonrpc_types::{Params, Version};
//! use serde_json::json;
//!
//! let mut batch = BatchRequest::new(vec![
//!     Request::with_id("A", "add", Some(Params::Array(vec![json!(1), json!(2)]))),
//!     Request::with_id("B", "sub", Some(Params::Array(vec![json!(1), json!(2)]))),
//!     Request::notification("log", None),
//! ]);
//! let _payload = batch.to_payload(Version::V2_0).unwrap();
//!
//! batch
//!     .demultiplex(&json!([
//!         {"jsonrpc": "2.0", "id": "B", "result": -1},
//!         {"jsonrpc": "2.0", "id": null, "error": {"code": -32603, "message": "Internal error"}},
//!     ]))
//!     .unwrap();
//! assert!(batch.requests()[0].is_error());
//! assert_eq!(batch.requests()[1].state(), &ResponseState::Result(json!(-1)));
//! ```
//!
//! # Crate features
//!
//! * **http-tokio** (default) -
//!   Provides [`HttpClient`], a transport backed by `reqwest`.

#![deny(missing_docs)]

mod batch;
mod client;
mod errors;
#[cfg(feature = "http-tokio")]
mod http_client;
mod id;
mod request;
mod response;
mod serializer;
mod transport;

pub use self::batch::{BatchRequest, FifoPairing, NullIdStrategy, StrictPairing};
pub use self::client::Client;
pub use self::errors::{ClientError, RequestFailure, Result};
#[cfg(feature = "http-tokio")]
pub use self::http_client::{HttpClient, HttpClientBuilder};
pub use self::id::random_id;
pub use self::request::{Request, ResponseState};
pub use self::response::{interpret, Outcome, ReplyError, NON_CONFORMING};
pub use self::serializer::{JsonSerializer, Serializer};
pub use self::transport::{ResponseMeta, Transport};
pub use dual_jsonrpc_types as types;
