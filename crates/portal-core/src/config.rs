//! Portal configuration
//!
//! Webhook URLs, the request timeout and rendering defaults, loaded from
//! TOML natively or JSON in the browser, with environment overrides for
//! the values that change between deployments.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use draft_docx::BuildOptions;
use draft_model::DocumentKind;
use draft_pdf::{LayoutOptions, Paper};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::Endpoint;

pub const ENV_WEBHOOK_BASE: &str = "LEXDRAFT_WEBHOOK_BASE";
pub const ENV_TIMEOUT_MS: &str = "LEXDRAFT_TIMEOUT_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No URL configured for the {0} webhook")]
    MissingEndpoint(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("http.timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Webhook URLs
///
/// Any URL left out is derived from `base_url` as `<base_url>/<name>`,
/// where `name` is `login`, `signup`, `otp`, `chat` or a document slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub login: Option<String>,
    pub signup: Option<String>,
    pub otp: Option<String>,
    pub chat: Option<String>,
    /// Document slug to URL
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request deadline
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    60_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub paper: Paper,
    /// Body text size in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_true")]
    pub include_verification: bool,
    /// Word documents only; PDFs use the embedded fonts
    #[serde(default = "default_docx_font")]
    pub docx_font: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paper: Paper::default(),
            font_size: default_font_size(),
            include_verification: default_true(),
            docx_font: default_docx_font(),
        }
    }
}

fn default_font_size() -> f64 {
    12.0
}

fn default_true() -> bool {
    true
}

fn default_docx_font() -> String {
    BuildOptions::default().font_family
}

impl RenderConfig {
    pub fn layout_options(&self, kind: DocumentKind) -> LayoutOptions {
        LayoutOptions {
            paper: self.paper,
            font_size: self.font_size,
            case_label: kind.case_label().to_string(),
            include_verification: self.include_verification,
        }
    }

    pub fn build_options(&self, kind: DocumentKind) -> BuildOptions {
        BuildOptions {
            case_label: kind.case_label().to_string(),
            font_family: self.docx_font.clone(),
            include_verification: self.include_verification,
        }
    }
}

impl PortalConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use portal_core::config::PortalConfig;
    ///
    /// # fn example() -> Result<(), portal_core::config::ConfigError> {
    /// let config = PortalConfig::from_file("lexdraft.toml")?.with_env_overrides()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use portal_core::config::PortalConfig;
    ///
    /// let config = PortalConfig::from_toml(r#"
    ///     [endpoints]
    ///     base_url = "https://hooks.example.com/webhook"
    ///
    ///     [http]
    ///     timeout_ms = 30000
    /// "#).unwrap();
    /// assert_eq!(config.http.timeout_ms, 30000);
    /// ```
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)?.validated()
    }

    /// Parse configuration handed over by the browser host
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }

    /// Apply `LEXDRAFT_WEBHOOK_BASE` and `LEXDRAFT_TIMEOUT_MS`
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base) = lookup(ENV_WEBHOOK_BASE).filter(|v| !v.trim().is_empty()) {
            self.endpoints.base_url = Some(base.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.http.timeout_ms = raw
                .trim()
                .parse()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidOverride {
                    key: ENV_TIMEOUT_MS,
                    value: raw,
                })?;
        }
        Ok(self)
    }

    /// Resolve the URL an endpoint posts to
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<String, ConfigError> {
        let endpoints = &self.endpoints;
        let explicit = match endpoint {
            Endpoint::Login => endpoints.login.as_ref(),
            Endpoint::Signup => endpoints.signup.as_ref(),
            Endpoint::Otp => endpoints.otp.as_ref(),
            Endpoint::Chat => endpoints.chat.as_ref(),
            Endpoint::Document(kind) => endpoints.documents.get(kind.endpoint_key()),
        };

        if let Some(url) = explicit {
            return Ok(url.clone());
        }
        match &endpoints.base_url {
            Some(base) => Ok(format!("{}/{}", base.trim_end_matches('/'), endpoint.name())),
            None => Err(ConfigError::MissingEndpoint(endpoint.name().to_string())),
        }
    }
}
