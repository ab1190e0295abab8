//! Batch requests and the correlation of batch replies.
//!
//! Members are matched with reply envelopes by id. Envelopes carrying a null
//! id cannot be attributed by the protocol alone; what happens to them is left
//! to a [`NullIdStrategy`]. The default, [`FifoPairing`], hands them out to
//! the unanswered members in batch order. That is a best-effort guess for
//! servers that do not echo ids, not something JSON-RPC guarantees.

use std::{collections::HashMap, fmt, sync::Arc};

use dual_jsonrpc_types::{Id, Value, Version};

use crate::{
    errors::{ClientError, Result},
    request::Request,
    response::decode_reply,
    serializer::{JsonSerializer, Serializer},
    transport::ResponseMeta,
};

/// Decides which unanswered members receive the envelopes that carry a null id.
pub trait NullIdStrategy: Send + Sync {
    /// `unmatched` holds the positions of the members without a reply, in batch order.
    /// Returns the `(position, envelope)` pairs to interpret.
    fn pair(&self, unmatched: &[usize], null_replies: Vec<Value>) -> Vec<(usize, Value)>;
}

/// Pairs the n-th unanswered member with the n-th null-id envelope.
///
/// Members left over once the envelopes run out stay pending.
#[derive(Copy, Clone, Debug, Default)]
pub struct FifoPairing;

impl NullIdStrategy for FifoPairing {
    fn pair(&self, unmatched: &[usize], null_replies: Vec<Value>) -> Vec<(usize, Value)> {
        unmatched.iter().copied().zip(null_replies).collect()
    }
}

/// Never guesses: null-id envelopes are dropped and the unanswered members stay pending.
#[derive(Copy, Clone, Debug, Default)]
pub struct StrictPairing;

impl NullIdStrategy for StrictPairing {
    fn pair(&self, unmatched: &[usize], null_replies: Vec<Value>) -> Vec<(usize, Value)> {
        if !null_replies.is_empty() {
            log::warn!(
                "Dropping {} null-id batch replies, {} requests left without reply",
                null_replies.len(),
                unmatched.len()
            );
        }
        Vec::new()
    }
}

/// An ordered batch of requests and notifications, sent as one JSON-RPC 2.0 array.
///
/// Ids are unique among the members: a request whose id is already in the
/// batch is dropped, the first one wins.
pub struct BatchRequest {
    members: Vec<Request>,
    index: HashMap<Id, usize>,
    version: Option<Version>,
    response_meta: Option<ResponseMeta>,
    serializer: Arc<dyn Serializer>,
    strategy: Arc<dyn NullIdStrategy>,
}

impl fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRequest")
            .field("members", &self.members)
            .field("version", &self.version)
            .field("response_meta", &self.response_meta)
            .finish()
    }
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            index: HashMap::new(),
            version: None,
            response_meta: None,
            serializer: Arc::new(JsonSerializer::new()),
            strategy: Arc::new(FifoPairing),
        }
    }
}

impl BatchRequest {
    /// Creates a batch from the given members, dropping duplicate ids.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Request>,
    {
        let mut batch = Self::default();
        for member in members {
            batch.push(member);
        }
        batch
    }

    /// Replaces the serializer of the batch array.
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Replaces the strategy for null-id replies.
    pub fn with_null_id_strategy(mut self, strategy: Arc<dyn NullIdStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Appends a member. Returns `false` if its id is already taken and it was dropped.
    pub fn push(&mut self, member: Request) -> bool {
        if let Some(id) = member.id() {
            if self.index.contains_key(id) {
                log::warn!("Dropping request {} from batch: duplicate id", id);
                return false;
            }
            self.index.insert(id.clone(), self.members.len());
        }
        self.members.push(member);
        true
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Checks if the batch has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Checks if any member is not a notification.
    pub fn expects_response(&self) -> bool {
        !self.index.is_empty()
    }

    /// Returns the members in batch order.
    pub fn requests(&self) -> &[Request] {
        &self.members
    }

    /// Returns the member with the given id.
    pub fn get(&self, id: &Id) -> Option<&Request> {
        self.index.get(id).map(|&pos| &self.members[pos])
    }

    /// Gives the members back.
    pub fn into_requests(self) -> Vec<Request> {
        self.members
    }

    /// Returns the protocol version of the last successful encode.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// Returns the metadata of the reply.
    pub fn response_meta(&self) -> Option<&ResponseMeta> {
        self.response_meta.as_ref()
    }

    /// Attaches the metadata of the reply to the batch and all of its members.
    pub fn set_response_meta(&mut self, meta: ResponseMeta) {
        for member in &mut self.members {
            member.set_response_meta(meta.clone());
        }
        self.response_meta = Some(meta);
    }

    /// Builds the prepared batch array for `version`.
    ///
    /// Every member is encoded and serialized with its own serializer, then
    /// decoded again, so the batch serializer alone produces the final bytes.
    pub fn encode(&mut self, version: Version) -> Result<Value> {
        if !version.supports_batch() {
            return Err(ClientError::SpecViolation(format!(
                "Batch requests are not supported by JSON-RPC {} spec",
                version
            )));
        }
        if self.members.is_empty() {
            return Err(ClientError::SpecViolation("Batch request must not be empty".to_owned()));
        }
        let calls = self
            .members
            .iter_mut()
            .map(|member| {
                let bytes = member.to_payload(version)?;
                Ok(serde_json::from_slice::<Value>(&bytes)?)
            })
            .collect::<Result<Vec<_>>>()?;
        self.version = Some(version);
        Ok(Value::Array(calls))
    }

    /// Encodes the batch for `version` and serializes it with the batch serializer.
    pub fn to_payload(&mut self, version: Version) -> Result<Vec<u8>> {
        let payload = self.encode(version)?;
        self.serializer.serialize(&payload)
    }

    /// Hands the envelopes of a decoded batch reply to the members they answer.
    ///
    /// Fails with `ClientError::MalformedBatch`, without touching any member,
    /// if the reply is not a non-empty array of objects that each have a
    /// `jsonrpc` or an `id` member. Otherwise every envelope goes to the
    /// member with the same id, the first one for an id wins, envelopes for
    /// unknown ids are discarded and null-id envelopes are left to the
    /// null-id strategy. Members without a reply stay pending.
    pub fn demultiplex(&mut self, reply: &Value) -> Result<()> {
        let envelopes = match reply.as_array() {
            Some(envelopes) if !envelopes.is_empty() => envelopes,
            _ => {
                return Err(ClientError::MalformedBatch(
                    "Expected batch response, but none was received".to_owned(),
                ))
            }
        };
        for envelope in envelopes {
            let envelope = envelope.as_object().ok_or_else(|| {
                ClientError::MalformedBatch("Expected batch response, but no object was received".to_owned())
            })?;
            if !envelope.contains_key("jsonrpc") && !envelope.contains_key("id") {
                return Err(ClientError::MalformedBatch(
                    "The received response doesn't implement the JSON-RPC protocol".to_owned(),
                ));
            }
        }

        let mut pending = self.index.clone();
        let mut null_replies = Vec::new();
        for envelope in envelopes {
            let id = envelope.get("id").unwrap_or(&Value::Null);
            match Id::from_value(id).and_then(|id| pending.remove(&id)) {
                Some(pos) => {
                    self.members[pos].interpret(envelope);
                }
                None if id.is_null() => null_replies.push(envelope.clone()),
                None => log::debug!("Discarding batch reply with unexpected id {}", id),
            }
        }

        let mut unmatched = pending.values().copied().collect::<Vec<_>>();
        unmatched.sort_unstable();
        for (pos, envelope) in self.strategy.pair(&unmatched, null_replies) {
            if let Some(member) = self.members.get_mut(pos) {
                member.interpret(&envelope);
            }
        }

        let unanswered = self.members.iter().filter(|m| !m.is_notification() && m.is_pending()).count();
        if unanswered > 0 {
            log::debug!("{} batch requests received no response", unanswered);
        }
        Ok(())
    }

    /// Decodes a raw batch reply body and demultiplexes it.
    pub fn demultiplex_raw(&mut self, body: &[u8]) -> Result<()> {
        let reply = decode_reply(body)?;
        self.demultiplex(&reply)
    }
}

#[cfg(test)]
mod tests {
    use dual_jsonrpc_types::{Map, Params};
    use serde_json::json;

    use super::*;
    use crate::request::ResponseState;

    fn encoded(members: Vec<Request>) -> BatchRequest {
        let mut batch = BatchRequest::new(members);
        batch.encode(Version::V2_0).unwrap();
        batch
    }

    fn state_of<'a>(batch: &'a BatchRequest, id: &str) -> &'a ResponseState {
        batch.get(&Id::from(id)).unwrap().state()
    }

    #[test]
    fn encode_keeps_member_order() {
        let mut batch = BatchRequest::new(vec![
            Request::with_id("a", "foo", None),
            Request::notification("notify", Some(Params::Array(vec![json!(1)]))),
            Request::with_id(2u64, "bar", Some(Params::Array(vec![]))),
        ]);
        assert_eq!(
            batch.encode(Version::V2_0).unwrap(),
            json!([
                {"jsonrpc": "2.0", "method": "foo", "id": "a"},
                {"jsonrpc": "2.0", "method": "notify", "params": [1]},
                {"jsonrpc": "2.0", "method": "bar", "params": [], "id": 2},
            ])
        );
        assert_eq!(batch.version(), Some(Version::V2_0));
        assert!(batch.requests().iter().all(|m| m.version() == Some(Version::V2_0)));
    }

    #[test]
    fn encode_rejects_v1() {
        let mut batch = BatchRequest::new(vec![Request::with_id("a", "foo", None)]);
        assert!(matches!(batch.encode(Version::V1_0), Err(ClientError::SpecViolation(_))));
        assert!(matches!(batch.to_payload(Version::V1_0), Err(ClientError::SpecViolation(_))));
        assert_eq!(batch.version(), None);
    }

    #[test]
    fn encode_rejects_empty_batch() {
        let mut batch = BatchRequest::new(vec![]);
        assert!(matches!(batch.encode(Version::V2_0), Err(ClientError::SpecViolation(_))));
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let mut batch = BatchRequest::new(vec![
            Request::with_id("a", "first", None),
            Request::with_id("a", "second", None),
            Request::notification("n", None),
            Request::notification("n", None),
        ]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(&Id::from("a")).unwrap().method(), "first");
        assert!(!batch.push(Request::with_id("a", "third", None)));
        assert!(batch.push(Request::with_id("b", "fourth", None)));

        let payload = batch.encode(Version::V2_0).unwrap();
        let ids = payload
            .as_array()
            .unwrap()
            .iter()
            .filter(|call| call["id"] == json!("a"))
            .count();
        assert_eq!(ids, 1);
    }

    #[test]
    fn member_serializers_are_not_applied_twice() {
        // Escapes forward slashes the way some JSON encoders do by default.
        let escaping = |payload: &Value| -> Result<Vec<u8>> {
            let text = serde_json::to_string(payload)?;
            Ok(text.replace('/', "\\/").into_bytes())
        };
        let mut params = Map::new();
        params.insert("p".into(), json!("11/11/2011"));
        let mut plain = Request::with_id("a", "test", Some(Params::Map(params)));
        let mut member = plain.clone().with_serializer(Arc::new(escaping));
        let own = String::from_utf8(member.to_payload(Version::V2_0).unwrap()).unwrap();
        assert!(own.contains("11\\/11\\/2011"));

        let mut batch = BatchRequest::new(vec![member]);
        let text = String::from_utf8(batch.to_payload(Version::V2_0).unwrap()).unwrap();
        assert!(text.contains("11/11/2011"));
        assert!(!text.contains("\\/"));

        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded[0], plain.encode(Version::V2_0).unwrap());
    }

    #[test]
    fn member_serializer_output_must_be_json() {
        let broken = |_: &Value| -> Result<Vec<u8>> { Ok(b"not json".to_vec()) };
        let mut batch = BatchRequest::new(vec![Request::new("test", None).with_serializer(Arc::new(broken))]);
        assert!(matches!(batch.encode(Version::V2_0), Err(ClientError::Json(_))));
    }

    #[test]
    fn demultiplex_by_id() {
        let mut batch = encoded(vec![
            Request::with_id("a", "foo", None),
            Request::with_id("b", "bar", None),
            Request::notification("n", None),
        ]);
        batch
            .demultiplex(&json!([
                {"jsonrpc": "2.0", "id": "b", "error": {"code": -32601, "message": "not found"}},
                {"jsonrpc": "2.0", "id": "a", "result": 1},
            ]))
            .unwrap();
        assert_eq!(state_of(&batch, "a"), &ResponseState::Result(json!(1)));
        assert!(batch.get(&Id::from("b")).unwrap().is_error());
        assert!(batch.requests()[2].is_pending());
    }

    #[test]
    fn null_id_reply_goes_to_first_unmatched_member() {
        let mut batch = encoded(vec![
            Request::with_id("A", "a", None),
            Request::with_id("B", "b", None),
            Request::with_id("C", "c", None),
        ]);
        batch
            .demultiplex(&json!([
                {"jsonrpc": "2.0", "id": "C", "result": "c"},
                {"jsonrpc": "2.0", "id": null, "error": {"code": -32600, "message": "Invalid request"}},
                {"jsonrpc": "2.0", "id": "B", "result": "b"},
            ]))
            .unwrap();
        assert!(batch.get(&Id::from("A")).unwrap().is_error());
        assert_eq!(state_of(&batch, "B"), &ResponseState::Result(json!("b")));
        assert_eq!(state_of(&batch, "C"), &ResponseState::Result(json!("c")));
        assert!(batch.requests().iter().all(|m| !m.is_pending()));
    }

    #[test]
    fn null_id_replies_are_paired_in_batch_order() {
        let mut batch = encoded(vec![
            Request::with_id("A", "a", None),
            Request::notification("n", None),
            Request::with_id("B", "b", None),
            Request::with_id("C", "c", None),
        ]);
        batch
            .demultiplex(&json!([
                {"jsonrpc": "2.0", "id": null, "error": {"code": 1, "message": "first"}},
                {"jsonrpc": "2.0", "id": null, "error": {"code": 2, "message": "second"}},
            ]))
            .unwrap();
        assert_eq!(batch.get(&Id::from("A")).unwrap().error().unwrap().code(), Some(1));
        assert_eq!(batch.get(&Id::from("B")).unwrap().error().unwrap().code(), Some(2));
        // Ran out of null-id replies.
        assert!(batch.get(&Id::from("C")).unwrap().is_pending());
        // Notifications never take a reply.
        assert!(batch.requests()[1].is_pending());
    }

    #[test]
    fn null_id_result_is_invalid_for_its_member() {
        let mut batch = encoded(vec![Request::with_id("A", "a", None)]);
        batch.demultiplex(&json!([{"jsonrpc": "2.0", "id": null, "result": 1}])).unwrap();
        assert!(matches!(state_of(&batch, "A"), ResponseState::Invalid(_)));
    }

    #[test]
    fn strict_pairing_never_guesses() {
        let mut batch = BatchRequest::new(vec![Request::with_id("A", "a", None), Request::with_id("B", "b", None)])
            .with_null_id_strategy(Arc::new(StrictPairing));
        batch.encode(Version::V2_0).unwrap();
        batch
            .demultiplex(&json!([
                {"jsonrpc": "2.0", "id": "B", "result": "b"},
                {"jsonrpc": "2.0", "id": null, "error": {"code": -32600, "message": "Invalid request"}},
            ]))
            .unwrap();
        assert!(batch.get(&Id::from("A")).unwrap().is_pending());
        assert_eq!(state_of(&batch, "B"), &ResponseState::Result(json!("b")));
    }

    #[test]
    fn unknown_and_duplicate_ids_are_discarded() {
        let mut batch = encoded(vec![Request::with_id("A", "a", None)]);
        batch
            .demultiplex(&json!([
                {"jsonrpc": "2.0", "id": "Z", "result": "z"},
                {"jsonrpc": "2.0", "id": "A", "result": "first"},
                {"jsonrpc": "2.0", "id": "A", "result": "second"},
                {"jsonrpc": "2.0", "id": 1.5, "result": "float"},
            ]))
            .unwrap();
        assert_eq!(state_of(&batch, "A"), &ResponseState::Result(json!("first")));
    }

    #[test]
    fn malformed_member_does_not_affect_others() {
        let mut batch = encoded(vec![Request::with_id("A", "a", None), Request::with_id("B", "b", None)]);
        batch
            .demultiplex(&json!([
                {"jsonrpc": "1.0", "id": "A", "result": "a"},
                {"jsonrpc": "2.0", "id": "B", "result": "b"},
            ]))
            .unwrap();
        assert!(matches!(state_of(&batch, "A"), ResponseState::Invalid(_)));
        assert_eq!(state_of(&batch, "B"), &ResponseState::Result(json!("b")));
    }

    #[test]
    fn malformed_batch_reply() {
        let cases = vec![
            json!([]),
            json!({"jsonrpc": "2.0", "id": "A", "result": 1}),
            json!(null),
            json!([1, 2]),
            json!([{"jsonrpc": "2.0", "id": "A", "result": 1}, {"result": 1}]),
        ];
        for reply in cases {
            let mut batch = encoded(vec![Request::with_id("A", "a", None)]);
            assert!(
                matches!(batch.demultiplex(&reply), Err(ClientError::MalformedBatch(_))),
                "{}",
                reply
            );
            // Shape failures are wholesale: no member was touched.
            assert!(batch.get(&Id::from("A")).unwrap().is_pending());
        }
    }

    #[test]
    fn envelope_shape_check_is_permissive() {
        let mut batch = encoded(vec![Request::with_id("A", "a", None), Request::with_id("B", "b", None)]);
        // Only an id, or only a version, is enough to pass the shape check.
        batch
            .demultiplex(&json!([
                {"id": "A", "result": 1},
                {"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse error"}},
            ]))
            .unwrap();
        assert!(matches!(state_of(&batch, "A"), ResponseState::Invalid(_)));
        // The envelope without id is treated like a null id.
        assert!(batch.get(&Id::from("B")).unwrap().is_error());
    }

    #[test]
    fn demultiplex_raw() {
        let mut batch = encoded(vec![Request::with_id(1u64, "a", None)]);
        assert!(matches!(batch.demultiplex_raw(b""), Err(ClientError::Connection(_))));
        assert!(matches!(batch.demultiplex_raw(b"[{"), Err(ClientError::MalformedReply(_))));
        batch.demultiplex_raw(br#"[{"jsonrpc":"2.0","id":1,"result":true}]"#).unwrap();
        assert_eq!(batch.requests()[0].result(), Some(&json!(true)));
    }

    #[test]
    fn response_meta_reaches_every_member() {
        let mut batch = BatchRequest::new(vec![Request::with_id("A", "a", None), Request::notification("n", None)]);
        let mut meta = ResponseMeta::default();
        meta.headers.insert("x-test", "1".parse().unwrap());
        batch.set_response_meta(meta);
        assert!(batch.response_meta().is_some());
        for member in batch.requests() {
            assert_eq!(member.response_meta().unwrap().headers["x-test"], "1");
        }
        assert!(batch.expects_response());
        assert!(!BatchRequest::new(vec![Request::notification("n", None)]).expects_response());
    }
}
