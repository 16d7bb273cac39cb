//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::client::Clients;
use crate::config::IntakeConfig;
use crate::notify::RecordingNotifier;
use crate::request::RequestBody;
use crate::session::Session;
use crate::transport::{PreparedRequest, RawResponse, Transport, TransportError};

/// Records every request and replays queued replies. Replies default to an
/// empty `200` success envelope once the queue is drained.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    sent: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: Value) {
        self.replies.lock().unwrap().push_back(Ok(RawResponse { status, body }));
    }

    pub fn fail(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> PreparedRequest {
        self.sent().pop().expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse { status: 200, body: json!({ "base": { "code": "200", "msg": "ok" } }) }))
    }
}

pub struct Fixture {
    pub clients: Clients,
    pub session: Session,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn fixture() -> Fixture {
    let session = Session::in_memory();
    let transport = Arc::new(MockTransport::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clients = Clients::with_transport(&IntakeConfig::default(), session.clone(), transport.clone(), notifier.clone());
    Fixture { clients, session, transport, notifier }
}

/// Text fields of a multipart body, sorted by name.
pub fn text_fields(body: &RequestBody) -> Vec<(String, String)> {
    let RequestBody::Multipart(fields) = body else {
        panic!("expected multipart body, got {body:?}");
    };
    let mut pairs: Vec<_> = fields
        .iter()
        .filter_map(|f| f.as_text().map(|text| (f.name.clone(), text.to_owned())))
        .collect();
    pairs.sort();
    pairs
}

pub fn header<'a>(request: &'a PreparedRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
