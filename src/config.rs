//! Studio configuration loaded from YAML/JSON files and the environment.
//!
//! Secrets are never stored in the file itself: `auth_token_env` names an
//! environment variable which is resolved through [`EnvKey`] when the HTTP
//! connector is built.

use crate::errors::{StudioError, StudioResult};
use crate::transport::HttpConnector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const AGENT_URL_ENV: &str = "A2A_STUDIO_AGENT_URL";
pub const LOG_FILTER_ENV: &str = "A2A_STUDIO_LOG";

/// A reference to an environment variable holding a secret
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvKey(String);

impl EnvKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    /// Resolve this key from the process environment
    pub fn resolve(&self) -> StudioResult<String> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve this key through a custom lookup
    pub fn resolve_with<F>(&self, lookup: F) -> StudioResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.0).ok_or_else(|| StudioError::InvalidConfiguration {
            field: self.0.clone(),
            reason: format!("Environment variable '{}' not found", self.0),
        })
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudioConfig {
    /// Agent to connect to on startup
    #[serde(default)]
    pub agent_url: Option<String>,
    /// Timeout applied to every HTTP request
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Environment variable holding a bearer token
    #[serde(default)]
    pub auth_token_env: Option<EnvKey>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            agent_url: None,
            request_timeout_secs: None,
            auth_token_env: None,
            headers: HashMap::new(),
            log_filter: default_log_filter(),
        }
    }
}

impl StudioConfig {
    pub fn from_yaml(yaml: &str) -> StudioResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| StudioError::InvalidConfiguration {
            field: "config".to_string(),
            reason: format!("Failed to parse YAML: {e}"),
        })
    }

    pub fn from_json(json: &str) -> StudioResult<Self> {
        serde_json::from_str(json).map_err(|e| StudioError::InvalidConfiguration {
            field: "config".to_string(),
            reason: format!("Failed to parse JSON: {e}"),
        })
    }

    /// Load a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StudioError::InvalidConfiguration {
            field: path.display().to_string(),
            reason: format!("Failed to read config file: {e}"),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            other => Err(StudioError::InvalidConfiguration {
                field: path.display().to_string(),
                reason: format!("Unsupported config format: {:?}", other.unwrap_or("")),
            }),
        }
    }

    /// Apply `A2A_STUDIO_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(AGENT_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.agent_url = Some(url);
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        self
    }

    /// Build the HTTP client carrying the configured timeout and headers
    pub fn http_client(&self) -> StudioResult<reqwest::Client> {
        let headers =
            a2a_client::header_map(&self.headers).map_err(|e| StudioError::InvalidConfiguration {
                field: "headers".to_string(),
                reason: e.to_string(),
            })?;

        let mut builder = reqwest::Client::builder().default_headers(headers);
        match self.request_timeout_secs {
            Some(0) => {
                return Err(StudioError::InvalidConfiguration {
                    field: "request_timeout_secs".to_string(),
                    reason: "Timeout must be greater than zero".to_string(),
                })
            }
            Some(secs) => builder = builder.timeout(Duration::from_secs(secs)),
            None => {}
        }

        builder.build().map_err(|e| StudioError::InvalidConfiguration {
            field: "http_client".to_string(),
            reason: e.to_string(),
        })
    }

    /// Build the production connector, resolving the auth token if configured
    pub fn connector(&self) -> StudioResult<HttpConnector> {
        let connector = HttpConnector::new(self.http_client()?);
        match &self.auth_token_env {
            Some(key) => Ok(connector.with_auth_token(key.resolve()?)),
            None => Ok(connector),
        }
    }
}
