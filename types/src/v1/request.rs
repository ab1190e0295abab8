use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Id;

/// Represents JSON-RPC 1.0 request call.
///
/// JSON-RPC 1.0 always sends the `id` member: a notification is a call whose id is null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodCall {
    /// A String containing the name of the method to be invoked.
    pub method: String,
    /// An Array of objects to pass as arguments to the method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
    /// The request id, null for a notification.
    pub id: Option<Id>,
}

impl MethodCall {
    /// Creates a JSON-RPC 1.0 request call.
    pub fn new<M: Into<String>>(method: M, params: Option<Vec<Value>>, id: Option<Id>) -> Self {
        Self {
            method: method.into(),
            params,
            id,
        }
    }
}
