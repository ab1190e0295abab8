use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents JSON-RPC request/response id.
///
/// An identifier established by the Client that MUST contain a String, Number,
/// or NULL value if included, If it is not included it is assumed to be a notification.
/// The value SHOULD normally not be Null and Numbers SHOULD NOT contain fractional parts.
///
/// The Server **MUST** reply with the same value in the Response object if included.
/// This member is used to correlate the context between the two objects.
///
/// Null is not a variant: a request without id is modelled as `Option<Id>::None`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id
    Num(u64),
    /// String id
    Str(String),
}

impl Id {
    /// If the `Id` is a String, returns the associated str. Returns None
    /// otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(id) => Some(id),
            _ => None,
        }
    }

    /// Reads an id back from a decoded reply.
    ///
    /// Only strings and unsigned integers map to an `Id`; `null`, floats,
    /// negative numbers and structured values return `None`. No coercion
    /// happens between the two variants, so `"1"` and `1` stay distinct.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(Self::Str(id.clone())),
            Value::Number(num) => num.as_u64().map(Self::Num),
            _ => None,
        }
    }

    /// Checks whether a decoded reply id is exactly this id.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Str(id), Value::String(other)) => id == other,
            (Self::Num(id), Value::Number(other)) => other.as_u64() == Some(*id),
            _ => false,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(id) => write!(f, "{}", id),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        Self::Num(id)
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self::Str(id.to_owned())
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        match id {
            Id::Num(id) => Self::Number(id.into()),
            Id::Str(id) => Self::String(id),
        }
    }
}
