//! Webhook transport port
//!
//! Every webhook is a JSON POST answered with JSON. Browsers implement this
//! over `fetch`; natively [`ReqwestTransport`] does. Both enforce the
//! configured request timeout.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not read reply: {0}")]
    Decode(String),

    #[error("Request aborted")]
    Aborted,
}

/// Futures are `?Send`: the browser runtime is single-threaded
#[async_trait(?Send)]
pub trait WebhookTransport {
    /// POST `body` as JSON and return the decoded reply
    ///
    /// A 2xx reply that is not JSON comes back as a JSON string holding the
    /// raw body text.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

/// Decode a reply body; plain text becomes a JSON string
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(feature = "native")]
pub use native::ReqwestTransport;

#[cfg(feature = "native")]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use serde_json::Value;

    use super::{decode_body, TransportError, WebhookTransport};

    pub struct ReqwestTransport {
        http: Client,
        timeout_ms: u64,
    }

    impl ReqwestTransport {
        /// Fails when the TLS backend cannot be initialised
        pub fn new(timeout_ms: u64) -> Result<Self, TransportError> {
            let http = Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .user_agent(concat!("lexdraft/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| {
                    TransportError::Network(format!("HTTP client setup failed: {}", e))
                })?;
            Ok(Self { http, timeout_ms })
        }

        fn map_error(&self, err: reqwest::Error) -> TransportError {
            if err.is_timeout() {
                TransportError::Timeout(self.timeout_ms)
            } else if err.is_decode() || err.is_body() {
                TransportError::Decode(err.to_string())
            } else {
                TransportError::Network(err.to_string())
            }
        }
    }

    #[async_trait(?Send)]
    impl WebhookTransport for ReqwestTransport {
        async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| self.map_error(e))?;

            let status = response.status();
            let text = response.text().await.map_err(|e| self.map_error(e))?;

            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }
            Ok(decode_body(&text))
        }
    }
}
