use http::{HeaderMap, StatusCode};

use crate::errors::Result;

/// Metadata of the reply, kept on the request for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ResponseMeta {
    /// HTTP-style status code, when the transport has one.
    pub status: Option<StatusCode>,
    /// Reply headers.
    pub headers: HeaderMap,
}

/// A transport exchanging encoded JSON-RPC payloads with a remote endpoint.
#[async_trait::async_trait]
pub trait Transport {
    /// Sends the encoded payload and returns the raw reply body along with its metadata.
    ///
    /// Fails with `ClientError::Connection` (or a transport specific error) when
    /// the exchange cannot complete.
    async fn send(&self, payload: Vec<u8>) -> Result<(Vec<u8>, ResponseMeta)>;
}
