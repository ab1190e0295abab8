mod builder;

use http::{header, StatusCode};

pub use self::builder::HttpClientBuilder;
use crate::{
    errors::{ClientError, Result},
    transport::{ResponseMeta, Transport},
};

/// HTTP transport
#[derive(Clone)]
pub struct HttpClient {
    url: String,
    valid_statuses: Vec<StatusCode>,
    client: reqwest::Client,
}

impl HttpClient {
    /// Creates a new HTTP transport with given `url`.
    pub fn new<U: Into<String>>(url: U) -> Result<Self> {
        HttpClientBuilder::new().build(url)
    }

    /// Creates a `HttpClientBuilder` to configure a `HttpClient`.
    ///
    /// This is the same as `HttpClientBuilder::new()`.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Returns the endpoint url.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl Transport for HttpClient {
    async fn send(&self, payload: Vec<u8>) -> Result<(Vec<u8>, ResponseMeta)> {
        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !self.valid_statuses.contains(&status) {
            return Err(ClientError::Connection(format!(
                "Connection to '{}' failed. Http code: '{}', status: '{}'.",
                self.url,
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok((
            body.to_vec(),
            ResponseMeta {
                status: Some(status),
                headers,
            },
        ))
    }
}
