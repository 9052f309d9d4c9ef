//! Two-phase submission: analyze first, then persist.
//!
//! The history write is started only after the result exists and runs on the
//! blocking pool. Its outcome is `()`, so persistence can never change what the
//! caller shows.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::client::AnalysisClient;
use crate::session::SessionState;
use crate::storage::HistoryStore;
use crate::types::{AnalysisMode, AnalysisRequest, AnalysisResult, Result};

/// Completed analysis plus the (optional) pending history write
#[derive(Debug)]
pub struct Submission {
    pub result: AnalysisResult,
    /// `Some` only when a user was signed in
    pub history: Option<HistoryWrite>,
}

/// Handle to a history write running on the blocking pool.
///
/// Dropping it detaches the write.
#[derive(Debug)]
pub struct HistoryWrite {
    handle: JoinHandle<()>,
}

impl HistoryWrite {
    /// Wait for the write to finish. Failures were already logged.
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            warn!("History write task did not complete: {}", e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisWorkflow {
    client: AnalysisClient,
    history: Arc<HistoryStore>,
}

impl AnalysisWorkflow {
    pub fn new(client: AnalysisClient, history: Arc<HistoryStore>) -> Self {
        Self { client, history }
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Validate, analyze, then (when signed in) record the original code.
    pub async fn submit(
        &self,
        code: &str,
        mode: AnalysisMode,
        session: &SessionState,
    ) -> Result<Submission> {
        let request = AnalysisRequest::new(code, mode)?;
        let result = self.client.analyze_request(&request).await?;

        let history = match session.user() {
            Some(user) => Some(self.spawn_record(&user.uid, &request, &result)),
            None => {
                debug!("No signed-in user; skipping history");
                None
            }
        };

        Ok(Submission { result, history })
    }

    fn spawn_record(
        &self,
        user_id: &str,
        request: &AnalysisRequest,
        result: &AnalysisResult,
    ) -> HistoryWrite {
        let store = Arc::clone(&self.history);
        let user_id = user_id.to_string();
        let code = request.code().to_string();
        let mode = request.mode();
        let markdown = result.markdown.clone();

        let handle = tokio::task::spawn_blocking(move || {
            store.record(&user_id, &code, mode, &markdown);
        });
        HistoryWrite { handle }
    }
}
