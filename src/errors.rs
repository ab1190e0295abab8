use dual_jsonrpc_types::UnsupportedVersion;

use crate::response::ReplyError;

/// A result type that wraps up the rpc client errors.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// The error type for rpc client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The chosen protocol version forbids the operation (named params or batch under 1.0).
    #[error("Spec violation: {0}")]
    SpecViolation(String),
    /// An unrecognized protocol version was configured.
    #[error(transparent)]
    UnsupportedSpec(#[from] UnsupportedVersion),
    /// The reply could not be decoded at all.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
    /// The batch reply is not a non-empty array of reply objects.
    #[error("Malformed batch reply: {0}")]
    MalformedBatch(String),
    /// The exchange with the remote endpoint could not complete.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The endpoint URL is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Json serialization/deserialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// HTTP error.
    #[cfg(feature = "http-tokio")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The request did not end with a result.
    #[error(transparent)]
    Rpc(#[from] RequestFailure),
}

/// Why a request ended without a result.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RequestFailure {
    /// The server replied with an error.
    #[error("{0}")]
    Rpc(ReplyError),
    /// The reply does not fit the protocol.
    #[error("Invalid response structure: {0}")]
    Invalid(String),
    /// No reply was correlated with the request.
    #[error("No response received")]
    NoResponse,
}
