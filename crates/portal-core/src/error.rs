use draft_model::{FieldError, ModelError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::transport::TransportError;

/// Every failure a portal component can surface
///
/// Semantic webhook outcomes (wrong password, rejected OTP) are not errors;
/// they arrive as reply enum variants.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed reply: {0}")]
    Malformed(#[from] ModelError),

    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    #[error("A request is already in progress")]
    Busy,

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not available in the current step: {0}")]
    OutOfStep(&'static str),
}

impl From<draft_pdf::RenderError> for PortalError {
    fn from(err: draft_pdf::RenderError) -> Self {
        PortalError::Render(err.to_string())
    }
}

impl From<draft_docx::DocxError> for PortalError {
    fn from(err: draft_docx::DocxError) -> Self {
        PortalError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
