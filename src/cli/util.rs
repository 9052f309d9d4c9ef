//! CLI Common Utilities
//!
//! Shared initialization for command handlers.

use std::path::Path;
use std::sync::Arc;

use crate::ai::ModelClient;
use crate::analysis::{AnalysisClient, AnalysisWorkflow};
use crate::config::{Config, ConfigLoader};
use crate::session::ProfileSessionProvider;
use crate::storage::HistoryStore;
use crate::types::Result;

/// Signed-out marker file, relative to the project directory
pub const SESSION_MARKER: &str = "signed_out";

/// Resources shared by the session- and history-facing commands
pub struct CommandContext {
    pub config: Config,
    pub session: ProfileSessionProvider,
    pub history: Arc<HistoryStore>,
}

impl CommandContext {
    /// Load config, open history and resolve the session provider.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let history = HistoryStore::open(&config.history);
        let session = session_provider(&config);

        Ok(Self {
            config,
            session,
            history: Arc::new(history),
        })
    }

    /// Analysis workflow over this context's history store.
    ///
    /// Built on demand so commands that never call the model do not need it.
    pub fn workflow(&self) -> Result<AnalysisWorkflow> {
        let model = ModelClient::from_config(&self.config.llm)?;
        Ok(AnalysisWorkflow::new(
            AnalysisClient::new(model),
            Arc::clone(&self.history),
        ))
    }
}

/// Effective configuration: a single file when given, the layered chain otherwise
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Session provider for the configured profile, with sign-out persisted
/// under the project directory
pub fn session_provider(config: &Config) -> ProfileSessionProvider {
    ProfileSessionProvider::new(config.session.identity())
        .with_marker(ConfigLoader::project_dir().join(SESSION_MARKER))
}

