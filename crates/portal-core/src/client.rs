//! Webhook client: endpoint resolution, logging and error mapping

use std::fmt;
use std::rc::Rc;

use draft_model::DocumentKind;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::transport::WebhookTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Signup,
    /// Sends and verifies OTPs; the body's `step` says which
    Otp,
    Chat,
    Document(DocumentKind),
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Signup => "signup",
            Endpoint::Otp => "otp",
            Endpoint::Chat => "chat",
            Endpoint::Document(kind) => kind.endpoint_key(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cheap to clone; components each hold one
#[derive(Clone)]
pub struct WebhookClient {
    config: Rc<PortalConfig>,
    transport: Rc<dyn WebhookTransport>,
}

impl WebhookClient {
    pub fn new(config: PortalConfig, transport: Rc<dyn WebhookTransport>) -> Self {
        Self {
            config: Rc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// POST one JSON body; bodies are never logged, only their key count
    pub async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<Value, PortalError> {
        let url = self.config.url_for(&endpoint)?;
        let keys = body.as_object().map(|o| o.len()).unwrap_or(0);
        info!(%endpoint, keys, "Posting to webhook");

        match self.transport.post_json(&url, body).await {
            Ok(reply) => {
                debug!(%endpoint, shape = reply_shape(&reply), "Webhook replied");
                Ok(reply)
            }
            Err(e) => {
                error!(%endpoint, error = %e, "Webhook request failed");
                Err(e.into())
            }
        }
    }
}

fn reply_shape(reply: &Value) -> &'static str {
    match reply {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
