//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/codelens/) and project (.codelens/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{history as history_constants, llm as llm_constants, network};
use crate::types::{CodeLensError, Result, UserIdentity};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model API settings
    pub llm: LlmConfig,

    /// History store settings
    pub history: HistoryConfig,

    /// Identity profile used as the session source
    pub session: SessionConfig,

    /// Callable server settings
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            history: HistoryConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `CodeLensError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(CodeLensError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(api_base) = &self.llm.api_base {
            let url = url::Url::parse(api_base).map_err(|e| {
                CodeLensError::Config(format!("Invalid llm.api_base '{}': {}", api_base, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(CodeLensError::Config(format!(
                    "llm.api_base must use http or https scheme, got: {}",
                    url.scheme()
                )));
            }
        }

        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(CodeLensError::Config(format!(
                "server.bind must be a socket address (host:port), got: {}",
                self.server.bind
            )));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Model API configuration
///
/// The API key is never serialized to output and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type (only "gemini" is supported)
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// API key; falls back to GEMINI_API_KEY / API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL override
    pub api_base: Option<String>,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: llm_constants::DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config, then the environment.
    ///
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                llm_constants::API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|k| !k.trim().is_empty())
            })
    }
}

// =============================================================================
// History Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Disable to run without a history store
    pub enabled: bool,
    /// Database path (defaults to .codelens/history.db)
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl HistoryConfig {
    pub fn db_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            super::ConfigLoader::project_dir().join(history_constants::DEFAULT_DB_FILE)
        })
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Identity profile that stands in for the external identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub uid: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl SessionConfig {
    /// The configured identity, if a non-blank uid is present
    pub fn identity(&self) -> Option<UserIdentity> {
        let uid = self.uid.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(UserIdentity {
            uid: uid.to_string(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            photo_url: self.photo_url.clone(),
        })
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `codelens serve`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: network::DEFAULT_BIND.to_string(),
        }
    }
}
