//! Configuration types
//!
//! Provider credentials, declared resources and reconciler settings.

use crate::controller::ResourceSpec;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.domeneshop.no/v0";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Credentials and endpoint of the domain-hosting API
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API token (basic auth user)
    pub token: String,

    /// API secret (basic auth password)
    /// ⚠️ NEVER log this value
    pub secret: String,

    /// Base URL that resource paths are appended to
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout enforced by the transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"<REDACTED>")
            .field("secret", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::config(
                "Unable to authenticate against the API: `token` not set",
            ));
        }
        if self.secret.is_empty() {
            return Err(Error::config(
                "Unable to authenticate against the API: `secret` not set",
            ));
        }
        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(Error::config(format!(
                "API base URL must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(Error::config(format!(
                "Request timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// What a refresh does when the API reports the record as gone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Drop the resource from state; the next apply recreates it
    #[default]
    Forget,
    /// Surface the 404 as an error and keep state untouched
    Error,
}

/// Reconciler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub not_found: NotFoundPolicy,
}

/// State store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,
}

/// One declared DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource name, the key under which state is kept
    pub name: String,

    #[serde(flatten)]
    pub spec: ResourceSpec,
}

/// Set of declared records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub resources: Vec<ResourceConfig>,

    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl Manifest {
    /// Parse and validate a JSON manifest
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("Invalid manifest: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        if self.resources.is_empty() {
            return Err(Error::config("No resources declared"));
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.name.is_empty() {
                return Err(Error::config("Resource name cannot be empty"));
            }
            if !seen.insert(resource.name.as_str()) {
                return Err(Error::config(format!(
                    "Resource {} is declared more than once",
                    resource.name
                )));
            }
            resource.spec.record.validate().map_err(|e| {
                Error::config(format!("Resource {}: {}", resource.name, e))
            })?;
        }

        Ok(())
    }
}
