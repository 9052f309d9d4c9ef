pub mod analysis;
pub mod error;
pub mod history;
pub mod identity;

pub use analysis::{AnalysisMode, AnalysisRequest, AnalysisResult, EMPTY_INPUT_MESSAGE};
pub use error::{CodeLensError, ErrorCategory, ErrorClassifier, LlmError, Result, ResultExt};
pub use history::HistoryItem;
pub use identity::UserIdentity;
