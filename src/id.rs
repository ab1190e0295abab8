use dual_jsonrpc_types::Id;
use uuid::Uuid;

/// Generates a fresh request id: a random (v4) UUID in its hyphenated form.
pub fn random_id() -> Id {
    Id::Str(Uuid::new_v4().to_string())
}
