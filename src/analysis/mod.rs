//! Analysis pipeline: a single model call wrapped by the submit workflow.

pub mod client;
pub mod workflow;

pub use client::AnalysisClient;
pub use workflow::{AnalysisWorkflow, HistoryWrite, Submission};
