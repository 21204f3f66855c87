//! Form sessions: one per open document form
//!
//! A session owns the values typed so far and drives the submit pipeline:
//! validate, POST the flat payload, normalise the reply into a
//! [`DocumentModel`]. Whatever goes wrong, the record is left intact so the
//! user can retry.

use draft_model::{DocumentKind, DocumentModel, FieldError, FormRecord, FormSchema};
use serde_json::Value;
use tracing::{info, warn};

use crate::cancel::Canceller;
use crate::client::{Endpoint, WebhookClient};
use crate::error::PortalError;

pub const SUBMIT_FAILED_MESSAGE: &str =
    "Something went wrong while generating the document. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Loading,
    /// A model is ready for preview
    Ready,
    Failed(String),
}

pub struct FormSession {
    schema: FormSchema,
    record: FormRecord,
    state: SubmitState,
    field_errors: Vec<FieldError>,
    model: Option<DocumentModel>,
    canceller: Canceller,
}

impl FormSession {
    pub fn new(kind: DocumentKind) -> Self {
        let schema = FormSchema::for_kind(kind);
        let record = schema.blank_record();
        Self {
            schema,
            record,
            state: SubmitState::Idle,
            field_errors: Vec::new(),
            model: None,
            canceller: Canceller::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SubmitState::Loading
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn model(&self) -> Option<&DocumentModel> {
        self.model.as_ref()
    }

    /// Hand the model to the preview, leaving the form idle
    pub fn take_model(&mut self) -> Option<DocumentModel> {
        if self.state == SubmitState::Ready {
            self.state = SubmitState::Idle;
        }
        self.model.take()
    }

    /// A clone for the view to cancel with on teardown
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// The message shown under the submit button, if any
    pub fn inline_message(&self) -> Option<&str> {
        match &self.state {
            SubmitState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Update one field and drop its stale error
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.record.set(name, value);
        self.field_errors.retain(|e| e.field != name);
    }

    /// Back to a blank form
    pub fn reset(&mut self) {
        self.canceller.cancel();
        self.record = self.schema.blank_record();
        self.state = SubmitState::Idle;
        self.field_errors.clear();
        self.model = None;
    }

    /// Validate and enter the loading state, returning the payload to POST
    ///
    /// Refused with [`PortalError::Busy`] while a request is outstanding.
    pub fn begin_submit(&mut self) -> Result<Value, PortalError> {
        if self.is_loading() {
            return Err(PortalError::Busy);
        }

        if let Err(errors) = self.record.validate(&self.schema) {
            self.field_errors = errors.clone();
            self.state = SubmitState::Idle;
            return Err(PortalError::Validation(errors));
        }

        self.field_errors.clear();
        self.state = SubmitState::Loading;
        Ok(self.record.to_payload(&self.schema))
    }

    /// Settle a submission with the webhook's reply
    pub fn finish_submit(
        &mut self,
        reply: Result<Value, PortalError>,
    ) -> Result<&DocumentModel, PortalError> {
        let kind = self.kind();
        match reply.and_then(|value| DocumentModel::from_reply(value).map_err(PortalError::from)) {
            Ok(model) => {
                info!(
                    kind = kind.slug(),
                    paragraphs = model.body.paragraphs.len(),
                    "Document model ready"
                );
                self.state = SubmitState::Ready;
                Ok(self.model.insert(model))
            }
            Err(e) => {
                warn!(kind = kind.slug(), error = %e, "Document generation failed");
                self.state = SubmitState::Failed(SUBMIT_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Validate, POST and normalise in one go
    pub async fn submit(&mut self, client: &WebhookClient) -> Result<&DocumentModel, PortalError> {
        let payload = self.begin_submit()?;
        let endpoint = Endpoint::Document(self.kind());
        let reply = self
            .canceller
            .run(client.post(endpoint, &payload))
            .await
            .and_then(|reply| reply);
        self.finish_submit(reply)
    }
}
