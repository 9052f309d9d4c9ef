//! CodeLens - LLM-backed code analysis
//!
//! Explains code, suggests improvements and finds bugs through a single
//! generative-model call per submission, and keeps a per-user history of
//! completed analyses.
//!
//! ## Core Features
//!
//! - **Three modes**: Explain, Improve (structured `{improvedCode, explanation}`
//!   output) and Find Bugs
//! - **Decode-or-degrade parsing**: malformed structured output falls back to
//!   the raw text instead of failing
//! - **Optional history**: SQLite-backed, silently skipped when unavailable
//! - **Server-side callable**: HTTP endpoint that keeps the API key off clients
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use codelens::{AnalysisClient, AnalysisMode, AnalysisWorkflow, HistoryStore, ModelClient};
//! use codelens::session::SessionState;
//!
//! let config = codelens::ConfigLoader::load()?;
//! let client = AnalysisClient::new(ModelClient::from_config(&config.llm)?);
//! let workflow = AnalysisWorkflow::new(client, Arc::new(HistoryStore::open(&config.history)));
//!
//! let submission = workflow
//!     .submit("function add(a,b){return a+b}", AnalysisMode::FindBugs, &SessionState::SignedOut)
//!     .await?;
//! println!("{}", submission.result.markdown);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompt table, Gemini provider, response parsing
//! - [`analysis`]: analysis client and the submit workflow
//! - [`storage`]: SQLite history store with connection pooling
//! - [`session`]: signed-in state and the identity provider seam
//! - [`server`]: HTTP callable
//! - [`config`]: layered configuration

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{CodeLensError, ErrorCategory, Result, ResultExt};

// Domain Types
pub use types::{AnalysisMode, AnalysisResult, HistoryItem, UserIdentity};

// Storage
pub use storage::{Database, HistoryStore, PoolConfig};

// =============================================================================
// Analysis Re-exports
// =============================================================================

pub use analysis::{AnalysisClient, AnalysisWorkflow, HistoryWrite, Submission};

pub use ai::{GeminiProvider, GenerationRequest, LlmProvider, LlmResponse, ModelClient};
