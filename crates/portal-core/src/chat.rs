//! Chat with the drafting assistant

use std::rc::Rc;

use draft_model::ChatReply;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cancel::Canceller;
use crate::client::{Endpoint, WebhookClient};
use crate::error::PortalError;
use crate::storage::{KeyValueStore, StorageError, SESSION_ID_KEY};

pub const CHAT_ERROR_MESSAGE: &str = "Sorry, I couldn't reach the assistant. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    /// Set on the fixed line shown when the assistant could not answer
    #[serde(default)]
    pub is_error: bool,
}

pub struct ChatSession {
    session_id: String,
    transcript: Vec<ChatMessage>,
    pending: bool,
    canceller: Canceller,
}

impl ChatSession {
    /// Reuse the stored `sessionId`, or mint and store a new one
    pub fn open(store: &Rc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let session_id = match store.get(SESSION_ID_KEY)? {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                store.set(SESSION_ID_KEY, &id)?;
                id
            }
        };
        Ok(Self {
            session_id,
            transcript: Vec::new(),
            pending: false,
            canceller: Canceller::new(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Append the user's message and return the body to POST
    ///
    /// Blank prompts are ignored (`Ok(None)`).
    pub fn begin_send(&mut self, prompt: &str) -> Result<Option<Value>, PortalError> {
        if self.pending {
            return Err(PortalError::Busy);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        self.transcript.push(ChatMessage {
            speaker: Speaker::User,
            text: prompt.to_string(),
            is_error: false,
        });
        self.pending = true;
        Ok(Some(json!({ "prompt": prompt, "sessionId": self.session_id })))
    }

    /// Append the assistant's answer, or the error line
    pub fn finish_send(&mut self, reply: Result<Value, PortalError>) -> &ChatMessage {
        self.pending = false;

        let message = match reply {
            Ok(value) => match ChatReply::decode(&value) {
                Some(ChatReply { text }) => ChatMessage {
                    speaker: Speaker::Assistant,
                    text,
                    is_error: false,
                },
                None => {
                    warn!("Chat reply carried no text");
                    error_line()
                }
            },
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                error_line()
            }
        };

        self.transcript.push(message);
        &self.transcript[self.transcript.len() - 1]
    }

    /// Send one prompt; `None` when the prompt was blank
    pub async fn send(
        &mut self,
        client: &WebhookClient,
        prompt: &str,
    ) -> Result<Option<&ChatMessage>, PortalError> {
        let Some(body) = self.begin_send(prompt)? else {
            return Ok(None);
        };
        info!(turns = self.transcript.len(), "Sending chat prompt");

        let reply = self
            .canceller
            .run(client.post(Endpoint::Chat, &body))
            .await
            .and_then(|reply| reply);
        Ok(Some(self.finish_send(reply)))
    }
}

fn error_line() -> ChatMessage {
    ChatMessage {
        speaker: Speaker::Assistant,
        text: CHAT_ERROR_MESSAGE.to_string(),
        is_error: true,
    }
}
