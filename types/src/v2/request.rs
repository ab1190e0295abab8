use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{Id, Params, Version};

/// Represents JSON-RPC 2.0 request call or notification.
///
/// A call without `id` is a notification: the Server MUST NOT reply to it,
/// including when it is part of a batch request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodCall {
    /// A String specifying the version of the JSON-RPC protocol, MUST be exactly "2.0".
    #[serde(deserialize_with = "deserialize_v2")]
    pub jsonrpc: Version,
    /// A String containing the name of the method to be invoked.
    ///
    /// Method names that begin with the word rpc followed by a period character (U+002E or ASCII 46)
    /// are reserved for rpc-internal methods and extensions and MUST NOT be used for anything else.
    pub method: String,
    /// A Structured value that holds the parameter values to be used
    /// during the invocation of the method. This member MAY be omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// An identifier established by the Client.
    /// If it is not included it is assumed to be a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl MethodCall {
    /// Creates a JSON-RPC 2.0 request call, or a notification when `id` is `None`.
    pub fn new<M: Into<String>>(method: M, params: Option<Params>, id: Option<Id>) -> Self {
        Self {
            jsonrpc: Version::V2_0,
            method: method.into(),
            params,
            id,
        }
    }
}

fn deserialize_v2<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    match Version::deserialize(deserializer)? {
        Version::V2_0 => Ok(Version::V2_0),
        other => Err(de::Error::invalid_value(de::Unexpected::Str(other.as_str()), &"2.0")),
    }
}
