//! Document Model contract shared by the portal, the PDF adapter and the
//! Word builder.
//!
//! The external generation service returns loosely shaped JSON. This crate
//! pins that contract down once, at the network boundary:
//!
//! - [`types`]: the fully typed [`DocumentModel`]
//! - [`normalize`]: decoding raw webhook replies into a validated model
//! - [`kinds`]: the registry of supported document kinds
//! - [`forms`]: per-kind form schemas, records and field validation
//! - [`replies`]: tagged decoders for the auth/OTP/chat webhook replies

pub mod error;
pub mod forms;
pub mod kinds;
pub mod normalize;
pub mod replies;
pub mod types;

pub use error::ModelError;
pub use forms::{FieldControl, FieldError, FieldSpec, FormRecord, FormSchema, FormSection};
pub use kinds::DocumentKind;
pub use replies::{ChatReply, LoginReply, OtpSendReply, OtpVerifyReply, SignupReply};
pub use types::{
    relief_label, Body, BodyLabel, CourtDetails, DocumentModel, Footer, Party, PartyGroup,
    PartyRole, Prayer, Relief, Side,
};
