//! Reply classification.
//!
//! A decoded reply envelope is checked against the grammar of the protocol
//! version the request was encoded with and against the id of that request.
//! The error shape is tried first, then the result shape; anything else is
//! invalid.

use std::fmt;

use dual_jsonrpc_types::{Error, Id, Map, Value, Version};

use crate::errors::{ClientError, Result};

/// Reason recorded for an envelope that fits neither the result nor the error shape.
pub const NON_CONFORMING: &str = "does not conform to protocol for the given spec version";

/// The error member of a reply.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyError {
    /// JSON-RPC 2.0 error object.
    Structured(Error),
    /// JSON-RPC 1.0 error, which the protocol leaves unstructured.
    Opaque(Value),
}

impl ReplyError {
    /// Returns the error code, if the error is structured.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Structured(error) => Some(error.code.code()),
            Self::Opaque(_) => None,
        }
    }

    /// Returns the error message, if the error is structured.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Structured(error) => Some(&error.message),
            Self::Opaque(_) => None,
        }
    }

    /// Returns the additional error data.
    ///
    /// For a 1.0 error this is the whole error member.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Structured(error) => error.data.as_ref(),
            Self::Opaque(data) => Some(data),
        }
    }
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(error) => write!(f, "{}", error),
            Self::Opaque(data) => write!(f, "Remote error: {}", data),
        }
    }
}

/// Classification of one reply envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A result, possibly `null`.
    Result(Value),
    /// An error reported by the server.
    Error(ReplyError),
    /// The envelope is not a valid reply to the request.
    Invalid(String),
}

/// Classifies `reply` as the answer to a request encoded with `version` whose id is `expected`.
///
/// A notification has no id; its expected id is `null`.
pub fn interpret(version: Version, reply: &Value, expected: Option<&Id>) -> Outcome {
    let envelope = match reply.as_object() {
        Some(envelope) => envelope,
        None => return Outcome::Invalid(NON_CONFORMING.to_owned()),
    };

    if let Some(error) = interpret_error(version, envelope, expected) {
        return Outcome::Error(error);
    }
    if let Some(result) = interpret_result(version, envelope, expected) {
        return Outcome::Result(result);
    }
    Outcome::Invalid(NON_CONFORMING.to_owned())
}

fn id_matches(expected: Option<&Id>, id: &Value) -> bool {
    match expected {
        Some(expected) => expected.matches(id),
        None => id.is_null(),
    }
}

fn is_v2(envelope: &Map<String, Value>) -> bool {
    envelope.get("jsonrpc").and_then(Value::as_str) == Some("2.0")
}

fn interpret_result(
    version: Version,
    envelope: &Map<String, Value>,
    expected: Option<&Id>,
) -> Option<Value> {
    let id = envelope.get("id")?;
    let result = envelope.get("result")?;
    let accepted = match version {
        Version::V2_0 => is_v2(envelope) && id_matches(expected, id),
        // 1.0 servers may answer with a null id when they also have nothing to return.
        Version::V1_0 => id_matches(expected, id) || result.is_null(),
    };
    if accepted {
        Some(result.clone())
    } else {
        None
    }
}

fn interpret_error(
    version: Version,
    envelope: &Map<String, Value>,
    expected: Option<&Id>,
) -> Option<ReplyError> {
    // A 1.0 success carries `"error": null`.
    let error = envelope.get("error").filter(|error| !error.is_null())?;
    match version {
        Version::V2_0 => {
            if !is_v2(envelope) {
                return None;
            }
            // The id may be missing or null when the server could not read it.
            match envelope.get("id") {
                Some(id) if !id.is_null() && !id_matches(expected, id) => return None,
                _ => {}
            }
            Error::from_value(error).map(ReplyError::Structured)
        }
        Version::V1_0 => {
            let id = envelope.get("id")?;
            if !id.is_null() && !id_matches(expected, id) {
                return None;
            }
            Some(ReplyError::Opaque(error.clone()))
        }
    }
}

/// Decodes a raw reply body.
pub(crate) fn decode_reply(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ClientError::Connection("No response received".to_owned()));
    }
    serde_json::from_slice(body)
        .map_err(|err| ClientError::MalformedReply(format!("Invalid response encoding: {}", err)))
}
