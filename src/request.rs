use std::{fmt, sync::Arc};

use dual_jsonrpc_types::{v1, v2, Id, Params, Value, Version};

use crate::{
    errors::{ClientError, RequestFailure, Result},
    id::random_id,
    response::{self, decode_reply, Outcome, ReplyError},
    serializer::{JsonSerializer, Serializer},
    transport::ResponseMeta,
};

/// What is known about the reply of a request.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseState {
    /// No reply has been interpreted yet.
    Pending,
    /// The server returned a result, possibly `null`.
    Result(Value),
    /// The server returned an error.
    Error(ReplyError),
    /// The reply does not fit the protocol.
    Invalid(String),
}

impl ResponseState {
    /// Checks if no reply has been interpreted yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, ResponseState::Pending)
    }
}

impl Default for ResponseState {
    fn default() -> Self {
        ResponseState::Pending
    }
}

impl From<Outcome> for ResponseState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Result(result) => ResponseState::Result(result),
            Outcome::Error(error) => ResponseState::Error(error),
            Outcome::Invalid(reason) => ResponseState::Invalid(reason),
        }
    }
}

/// A single JSON-RPC call, or a notification when it has no id.
///
/// The request remembers the protocol version it was last encoded with and
/// validates its reply against that version.
#[derive(Clone)]
pub struct Request {
    id: Option<Id>,
    method: String,
    params: Option<Params>,
    version: Option<Version>,
    state: ResponseState,
    response_meta: Option<ResponseMeta>,
    serializer: Arc<dyn Serializer>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("params", &self.params)
            .field("version", &self.version)
            .field("state", &self.state)
            .field("response_meta", &self.response_meta)
            .finish()
    }
}

impl Request {
    /// Creates a request call with a random id.
    pub fn new<M: Into<String>>(method: M, params: Option<Params>) -> Self {
        Self::build(Some(random_id()), method.into(), params)
    }

    /// Creates a request call with the given id.
    pub fn with_id<I: Into<Id>, M: Into<String>>(id: I, method: M, params: Option<Params>) -> Self {
        Self::build(Some(id.into()), method.into(), params)
    }

    /// Creates a notification, a call the server never replies to.
    pub fn notification<M: Into<String>>(method: M, params: Option<Params>) -> Self {
        Self::build(None, method.into(), params)
    }

    fn build(id: Option<Id>, method: String, params: Option<Params>) -> Self {
        Self {
            id,
            method,
            params,
            version: None,
            state: ResponseState::Pending,
            response_meta: None,
            serializer: Arc::new(JsonSerializer::new()),
        }
    }

    /// Replaces the serializer used by `to_payload`.
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Returns the request id, `None` for a notification.
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Returns the method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the parameters.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Returns the protocol version of the last successful encode.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// Checks if the request is a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Builds the prepared structure of the request for `version`.
    ///
    /// JSON-RPC 1.0 has no named parameters; they fail with `ClientError::SpecViolation`.
    /// Encoding is repeatable and records `version` for interpreting the reply.
    pub fn encode(&mut self, version: Version) -> Result<Value> {
        let payload = match version {
            Version::V2_0 => {
                let call = v2::MethodCall::new(self.method.clone(), self.params.clone(), self.id.clone());
                serde_json::to_value(call)?
            }
            Version::V1_0 => {
                let params = match self.params.clone() {
                    Some(params) if params.is_named() => {
                        return Err(ClientError::SpecViolation(
                            "JSON-RPC 1.0 doesn't allow named parameters".to_owned(),
                        ))
                    }
                    Some(params) => params.into_positional(),
                    None => None,
                };
                let call = v1::MethodCall::new(self.method.clone(), params, self.id.clone());
                serde_json::to_value(call)?
            }
        };
        self.version = Some(version);
        Ok(payload)
    }

    /// Encodes the request for `version` and serializes it with the request's serializer.
    pub fn to_payload(&mut self, version: Version) -> Result<Vec<u8>> {
        let payload = self.encode(version)?;
        self.serializer.serialize(&payload)
    }

    /// Interprets a decoded reply envelope and records the outcome.
    ///
    /// The state is written once: a request that already holds an outcome keeps it.
    /// A request that was never encoded has no version to validate against and stays pending.
    pub fn interpret(&mut self, reply: &Value) -> &ResponseState {
        if !self.state.is_pending() {
            log::warn!(
                "Ignoring reply for request {:?} ({}): response already interpreted",
                self.id,
                self.method
            );
            return &self.state;
        }
        let version = match self.version {
            Some(version) => version,
            None => {
                log::warn!("Ignoring reply for request {:?} ({}): request was never encoded", self.id, self.method);
                return &self.state;
            }
        };
        self.state = response::interpret(version, reply, self.id.as_ref()).into();
        if let ResponseState::Invalid(reason) = &self.state {
            log::debug!("Invalid reply for request {:?}: {}: {}", self.id, reason, reply);
        }
        &self.state
    }

    /// Decodes a raw reply body and interprets it.
    pub fn interpret_raw(&mut self, body: &[u8]) -> Result<&ResponseState> {
        let reply = decode_reply(body)?;
        Ok(self.interpret(&reply))
    }

    /// Returns the response state.
    pub fn state(&self) -> &ResponseState {
        &self.state
    }

    /// Checks if no reply has been interpreted yet.
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Checks if the server replied with an error.
    pub fn is_error(&self) -> bool {
        matches!(self.state, ResponseState::Error(_))
    }

    /// Returns the result, if the server returned one.
    pub fn result(&self) -> Option<&Value> {
        match &self.state {
            ResponseState::Result(result) => Some(result),
            _ => None,
        }
    }

    /// Returns the error, if the server returned one.
    pub fn error(&self) -> Option<&ReplyError> {
        match &self.state {
            ResponseState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the metadata of the reply.
    pub fn response_meta(&self) -> Option<&ResponseMeta> {
        self.response_meta.as_ref()
    }

    /// Attaches the metadata of the reply.
    pub fn set_response_meta(&mut self, meta: ResponseMeta) {
        self.response_meta = Some(meta);
    }

    /// Converts the request into its result.
    pub fn into_result(self) -> Result<Value, RequestFailure> {
        match self.state {
            ResponseState::Result(result) => Ok(result),
            ResponseState::Error(error) => Err(RequestFailure::Rpc(error)),
            ResponseState::Invalid(reason) => Err(RequestFailure::Invalid(reason)),
            ResponseState::Pending => Err(RequestFailure::NoResponse),
        }
    }
}
