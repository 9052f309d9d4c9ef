//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Model API constants
pub mod llm {
    /// Default Gemini REST base URL
    pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default generation model
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    /// Sampling temperature for every analysis request
    pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

    /// Environment variables consulted for the API key, in order
    pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
}

/// User-facing messages
pub mod messages {
    pub const NOT_CONFIGURED: &str =
        "Model API key is missing. Set GEMINI_API_KEY or llm.api_key in the config.";

    pub const ANALYSIS_FAILED: &str = "Failed to analyze code. Please try again.";

    pub const NO_EXPLANATION: &str = "No explanation provided.";

    pub const SIGN_IN_REQUIRED: &str = "Please sign in to view your history.";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default bind address for the callable server
    pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
}

/// History store constants
pub mod history {
    /// Default database file name inside the project data directory
    pub const DEFAULT_DB_FILE: &str = "history.db";

    /// Characters of the snippet shown in list views
    pub const PREVIEW_CHARS: usize = 60;
}
