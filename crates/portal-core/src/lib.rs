//! Client core of the drafting portal
//!
//! Everything a front end needs between the user and the webhooks, with the
//! platform pieces behind ports: a [`KeyValueStore`] for session storage and
//! a [`WebhookTransport`] for HTTP. The browser build plugs in
//! `sessionStorage` and `fetch`; the command line uses files and reqwest.
//!
//! # Feature Flags
//!
//! - `native` (default): [`transport::ReqwestTransport`], file storage and
//!   PDF rendering with a deadline
//! - `wasm`: browser builds

pub mod account;
pub mod auth;
pub mod cancel;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod preview;
pub mod routes;
pub mod storage;
pub mod transport;

pub use account::{LoginForm, LoginState, SignupFlow, SignupProfile, SignupStep};
pub use auth::{AuthContext, AuthState};
pub use cancel::Canceller;
pub use chat::{ChatMessage, ChatSession, Speaker};
pub use client::{Endpoint, WebhookClient};
pub use config::{ConfigError, PortalConfig};
pub use error::PortalError;
pub use forms::{FormSession, SubmitState};
pub use preview::{Artifact, PreviewModal, PreviewState};
pub use routes::{navigate, Navigation, Route};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use transport::{TransportError, WebhookTransport};
