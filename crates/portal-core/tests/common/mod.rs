//! Recording transport: replies are queued up front, requests are kept

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use portal_core::{PortalConfig, TransportError, WebhookClient, WebhookTransport};
use serde_json::Value;

pub const BASE_URL: &str = "https://hooks.test/webhook";

#[derive(Default)]
pub struct RecordingTransport {
    replies: RefCell<VecDeque<Result<Value, TransportError>>>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl RecordingTransport {
    pub fn reply(&self, value: Value) -> &Self {
        self.replies.borrow_mut().push_back(Ok(value));
        self
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl WebhookTransport for RecordingTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no reply queued".to_string())))
    }
}

pub fn client() -> (WebhookClient, Rc<RecordingTransport>) {
    let transport = Rc::new(RecordingTransport::default());
    let config = PortalConfig::default()
        .with_overrides(|key| (key == "LEXDRAFT_WEBHOOK_BASE").then(|| BASE_URL.to_string()))
        .unwrap();
    (WebhookClient::new(config, transport.clone()), transport)
}
