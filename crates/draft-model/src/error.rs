use thiserror::Error;

/// Reasons a webhook reply cannot become a [`crate::DocumentModel`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Expected a JSON object but found {0}")]
    NotAnObject(&'static str),

    #[error("Reply was an empty array")]
    EmptyReply,

    #[error("Reply does not name any parties")]
    MissingParties,

    #[error("Party group '{0}' has no named members")]
    EmptyPartyGroup(String),

    #[error("Unknown party role: {0}")]
    UnknownRole(String),

    #[error("Field '{field}' should be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl ModelError {
    pub(crate) fn invalid(field: impl Into<String>, expected: &'static str) -> Self {
        ModelError::InvalidField {
            field: field.into(),
            expected,
        }
    }
}
