use serde_json::Value;

use crate::errors::Result;

/// Turns a prepared request structure into the bytes sent over the wire.
///
/// Implementations must be deterministic and may only change formatting, never content.
pub trait Serializer: Send + Sync {
    /// Serializes the prepared structure.
    fn serialize(&self, payload: &Value) -> Result<Vec<u8>>;
}

impl<F> Serializer for F
where
    F: Fn(&Value) -> Result<Vec<u8>> + Send + Sync,
{
    fn serialize(&self, payload: &Value) -> Result<Vec<u8>> {
        self(payload)
    }
}

/// The default serializer, backed by `serde_json`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Creates a serializer emitting compact JSON.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Creates a serializer emitting indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, payload: &Value) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(payload)?
        } else {
            serde_json::to_vec(payload)?
        };
        Ok(bytes)
    }
}
