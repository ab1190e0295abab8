use dual_jsonrpc_types::{Params, Version};
use serde::de::DeserializeOwned;

use crate::{
    batch::BatchRequest,
    errors::Result,
    request::Request,
    transport::Transport,
};

/// A JSON-RPC client speaking one protocol version over a transport.
#[derive(Clone, Debug)]
pub struct Client<T> {
    transport: T,
    version: Version,
}

impl<T: Transport> Client<T> {
    /// Creates a client encoding every request with `version`.
    pub fn new(transport: T, version: Version) -> Self {
        Self { transport, version }
    }

    /// Creates a client from a textual protocol version, as found in configuration.
    ///
    /// Fails with `ClientError::UnsupportedSpec` unless `version` is `"1.0"` or `"2.0"`.
    pub fn from_version_str(transport: T, version: &str) -> Result<Self> {
        Ok(Self::new(transport, version.parse::<Version>()?))
    }

    /// Returns the protocol version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the request and records the reply on it.
    ///
    /// Encoding errors are returned before anything is sent. The reply of a
    /// notification is not interpreted.
    pub async fn send(&self, request: &mut Request) -> Result<()> {
        let payload = request.to_payload(self.version)?;
        log::debug!("Request: {}", String::from_utf8_lossy(&payload));

        let (body, meta) = self.transport.send(payload).await?;
        log::debug!("Response: {}", String::from_utf8_lossy(&body));

        request.set_response_meta(meta);
        if request.is_notification() {
            return Ok(());
        }
        request.interpret_raw(&body)?;
        Ok(())
    }

    /// Sends the batch and hands the replies to its members.
    ///
    /// A JSON-RPC 1.0 client fails here with `ClientError::SpecViolation`
    /// before anything is sent.
    pub async fn send_batch(&self, batch: &mut BatchRequest) -> Result<()> {
        let payload = batch.to_payload(self.version)?;
        log::debug!("Batch request: {}", String::from_utf8_lossy(&payload));

        let (body, meta) = self.transport.send(payload).await?;
        log::debug!("Batch response: {}", String::from_utf8_lossy(&body));

        batch.set_response_meta(meta);
        if !batch.expects_response() {
            return Ok(());
        }
        batch.demultiplex_raw(&body)
    }

    /// Calls `method` and decodes its result.
    pub async fn call<M, R>(&self, method: M, params: Option<Params>) -> Result<R>
    where
        M: Into<String>,
        R: DeserializeOwned,
    {
        let mut request = Request::new(method, params);
        self.send(&mut request).await?;
        let result = request.into_result()?;
        Ok(serde_json::from_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use dual_jsonrpc_types::{Map, Value};
    use serde_json::json;

    use super::*;
    use crate::{
        errors::{ClientError, RequestFailure},
        transport::ResponseMeta,
    };

    /// Answers every payload with a reply built from the decoded request.
    struct MockTransport<F> {
        reply: F,
        sent: Mutex<Vec<Value>>,
    }

    impl<F> MockTransport<F>
    where
        F: Fn(&Value) -> String + Send + Sync,
    {
        fn new(reply: F) -> Self {
            Self {
                reply,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<Value> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl<F> Transport for MockTransport<F>
    where
        F: Fn(&Value) -> String + Send + Sync,
    {
        async fn send(&self, payload: Vec<u8>) -> Result<(Vec<u8>, ResponseMeta)> {
            let request: Value = serde_json::from_slice(&payload)?;
            let reply = (self.reply)(&request);
            self.sent.lock().unwrap().push(request);
            Ok((reply.into_bytes(), ResponseMeta::default()))
        }
    }

    fn echo_v2(request: &Value) -> String {
        json!({"jsonrpc": "2.0", "id": request["id"], "result": request["params"]}).to_string()
    }

    #[test]
    fn version_from_configuration() {
        let client = Client::from_version_str(MockTransport::new(echo_v2), "1.0").unwrap();
        assert_eq!(client.version(), Version::V1_0);
        assert!(matches!(
            Client::from_version_str(MockTransport::new(echo_v2), "1.1"),
            Err(ClientError::UnsupportedSpec(_))
        ));
    }

    #[tokio::test]
    async fn send_single_request() {
        let client = Client::new(MockTransport::new(echo_v2), Version::V2_0);
        let mut request = Request::with_id("X", "echo", Some(Params::Array(vec![json!(1)])));
        client.send(&mut request).await.unwrap();
        assert_eq!(request.result(), Some(&json!([1])));
        assert!(request.response_meta().is_some());
        assert_eq!(
            client.transport().sent(),
            vec![json!({"jsonrpc": "2.0", "method": "echo", "id": "X", "params": [1]})]
        );
    }

    #[tokio::test]
    async fn notification_reply_is_not_interpreted() {
        let client = Client::new(MockTransport::new(|_: &Value| String::new()), Version::V2_0);
        let mut notification = Request::notification("ping", None);
        client.send(&mut notification).await.unwrap();
        assert!(notification.is_pending());
    }

    #[tokio::test]
    async fn empty_reply_is_a_connection_error() {
        let client = Client::new(MockTransport::new(|_: &Value| " ".to_owned()), Version::V2_0);
        let mut request = Request::new("foo", None);
        assert!(matches!(client.send(&mut request).await, Err(ClientError::Connection(_))));
    }

    #[tokio::test]
    async fn v1_named_params_fail_before_sending() {
        let client = Client::new(MockTransport::new(echo_v2), Version::V1_0);
        let mut params = Map::new();
        params.insert("a".into(), json!(1));
        let mut request = Request::new("foo", Some(Params::Map(params)));
        assert!(matches!(client.send(&mut request).await, Err(ClientError::SpecViolation(_))));
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn v1_batch_fails_before_sending() {
        let client = Client::new(MockTransport::new(echo_v2), Version::V1_0);
        let mut batch = BatchRequest::new(vec![Request::new("foo", None)]);
        assert!(matches!(client.send_batch(&mut batch).await, Err(ClientError::SpecViolation(_))));
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn send_batch_request() {
        let reply = |request: &Value| {
            let replies = request
                .as_array()
                .unwrap()
                .iter()
                .filter(|call| call.get("id").is_some())
                .map(|call| json!({"jsonrpc": "2.0", "id": call["id"], "result": call["method"]}))
                .collect::<Vec<_>>();
            Value::Array(replies).to_string()
        };
        let client = Client::new(MockTransport::new(reply), Version::V2_0);
        let mut batch = BatchRequest::new(vec![
            Request::with_id(1u64, "foo", None),
            Request::notification("log", None),
            Request::with_id(2u64, "bar", None),
        ]);
        client.send_batch(&mut batch).await.unwrap();
        let results = batch.requests().iter().map(|m| m.result().cloned()).collect::<Vec<_>>();
        assert_eq!(results, vec![Some(json!("foo")), None, Some(json!("bar"))]);
    }

    #[tokio::test]
    async fn notification_only_batch_skips_reply() {
        let client = Client::new(MockTransport::new(|_: &Value| String::new()), Version::V2_0);
        let mut batch = BatchRequest::new(vec![Request::notification("a", None), Request::notification("b", None)]);
        client.send_batch(&mut batch).await.unwrap();
        assert_eq!(client.transport().sent()[0].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn call_decodes_result() {
        let client = Client::new(MockTransport::new(echo_v2), Version::V2_0);
        let result: Vec<u32> = client
            .call("echo", Some(Params::Array(vec![json!(1), json!(2)])))
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2]);
    }

    #[tokio::test]
    async fn call_surfaces_remote_error() {
        let reply = |request: &Value| {
            json!({"jsonrpc": "2.0", "id": request["id"], "error": {"code": -32601, "message": "Method not found"}})
                .to_string()
        };
        let client = Client::new(MockTransport::new(reply), Version::V2_0);
        let err = client.call::<_, Value>("missing", None).await.unwrap_err();
        match err {
            ClientError::Rpc(RequestFailure::Rpc(error)) => assert_eq!(error.code(), Some(-32601)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn v1_call() {
        let reply = |request: &Value| json!({"id": request["id"], "result": "pong", "error": null}).to_string();
        let client = Client::new(MockTransport::new(reply), Version::V1_0);
        let result: String = client.call("ping", Some(Params::Array(vec![]))).await.unwrap();
        assert_eq!(result, "pong");
        assert_eq!(client.transport().sent()[0]["params"], json!([]));
        assert!(client.transport().sent()[0].get("jsonrpc").is_none());
    }
}
