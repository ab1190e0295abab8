use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents JSON-RPC request parameters.
///
/// If present, parameters for the rpc call MUST be provided as a Structured value.
/// Either by-position through an Array or by-name through an Object.
/// JSON-RPC 1.0 only knows the by-position form.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Array of values
    Array(Vec<Value>),
    /// Map of values
    Map(Map<String, Value>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Array(vec![])
    }
}

impl Params {
    /// Checks if any parameter is addressed by name.
    ///
    /// An empty map has no keys at all, so it is not considered named.
    pub fn is_named(&self) -> bool {
        matches!(self, Params::Map(map) if !map.is_empty())
    }

    /// Returns the positional form of the parameters, or `None` if some are named.
    pub fn into_positional(self) -> Option<Vec<Value>> {
        match self {
            Params::Array(array) => Some(array),
            Params::Map(map) if map.is_empty() => Some(vec![]),
            Params::Map(_) => None,
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(array: Vec<Value>) -> Self {
        Params::Array(array)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Map(map)
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Value {
        match params {
            Params::Array(array) => Value::Array(array),
            Params::Map(object) => Value::Object(object),
        }
    }
}
