//! History Store Adapter
//!
//! Append and list analysis records per user. The store is optional: when it
//! is disabled or fails to open, every operation degrades to a logged no-op so
//! that analysis keeps working without persistence.

use chrono::{TimeZone, Utc};
use rusqlite::params;
use tracing::{debug, error, info, warn};

use super::database::Database;
use crate::config::HistoryConfig;
use crate::types::{AnalysisMode, HistoryItem, Result, ResultExt};

/// History persistence, present or absent
#[derive(Debug)]
pub enum HistoryStore {
    Available(Database),
    Unavailable,
}

/// Raw `history` row before mode/timestamp decoding
type HistoryRow = (String, String, String, String, String, i64);

impl HistoryStore {
    /// Open the store described by `config`.
    ///
    /// Never fails: a disabled store or an open/initialize error yields
    /// `Unavailable`.
    pub fn open(config: &HistoryConfig) -> Self {
        if !config.enabled {
            info!("History store disabled by configuration");
            return Self::Unavailable;
        }

        let path = config.db_path();
        match Database::open(&path).and_then(|db| db.initialize().map(|_| db)) {
            Ok(db) => {
                debug!("History store opened at {}", path.display());
                Self::Available(db)
            }
            Err(e) => {
                warn!("History store unavailable ({}): {}", path.display(), e);
                Self::Unavailable
            }
        }
    }

    /// Wrap an already-open database, creating the schema if needed.
    pub fn with_database(db: Database) -> Result<Self> {
        db.initialize()?;
        Ok(Self::Available(db))
    }

    /// In-memory store, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Self::with_database(Database::open_in_memory()?)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Append one record for `user_id`.
    ///
    /// `code` must be the code as originally submitted. Failures are logged
    /// and swallowed.
    pub fn record(&self, user_id: &str, code: &str, mode: AnalysisMode, markdown: &str) {
        let Self::Available(db) = self else {
            warn!("History store unavailable; analysis not saved");
            return;
        };

        let item = HistoryItem {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            code_snippet: code.to_string(),
            mode,
            response: markdown.to_string(),
            timestamp: Utc::now(),
        };

        match insert(db, &item) {
            Ok(()) => debug!("Saved analysis {} for user {}", item.id, user_id),
            Err(e) => error!("Failed to save analysis history: {}", e),
        }
    }

    /// All records for `user_id`, newest first. Empty on any failure.
    pub fn list(&self, user_id: &str) -> Vec<HistoryItem> {
        let Self::Available(db) = self else {
            warn!("History store unavailable; returning empty history");
            return Vec::new();
        };

        select_for_user(db, user_id).unwrap_or_else(|e| {
            error!("Failed to load analysis history: {}", e);
            Vec::new()
        })
    }

    /// Number of records for `user_id`; 0 when unavailable.
    pub fn count(&self, user_id: &str) -> usize {
        let Self::Available(db) = self else {
            return 0;
        };

        let counted: Result<i64> = db.connection().and_then(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM history WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .with_context("Failed to count history")
        });

        match counted {
            Ok(n) => n as usize,
            Err(e) => {
                error!("{}", e);
                0
            }
        }
    }
}

fn insert(db: &Database, item: &HistoryItem) -> Result<()> {
    db.execute(
        "INSERT INTO history (id, user_id, code_snippet, mode, response, timestamp_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        &[
            &item.id,
            &item.user_id,
            &item.code_snippet,
            &item.mode.label(),
            &item.response,
            &item.timestamp.timestamp_millis(),
        ],
    )?;
    Ok(())
}

fn select_for_user(db: &Database, user_id: &str) -> Result<Vec<HistoryItem>> {
    let conn = db.connection()?;
    let mut stmt = conn
        .prepare(
            "SELECT id, user_id, code_snippet, mode, response, timestamp_ms
             FROM history WHERE user_id = ?1
             ORDER BY timestamp_ms DESC, rowid DESC",
        )
        .with_context("Failed to prepare history query")?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok::<HistoryRow, rusqlite::Error>((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })
        .with_context("Failed to query history")?;

    let mut items = Vec::new();
    for row in rows {
        let (id, user_id, code_snippet, mode, response, timestamp_ms) =
            row.with_context("Failed to read history row")?;

        let Some(mode) = AnalysisMode::from_label(&mode) else {
            warn!("Skipping history record {} with unknown mode '{}'", id, mode);
            continue;
        };
        let Some(timestamp) = Utc.timestamp_millis_opt(timestamp_ms).single() else {
            warn!("Skipping history record {} with invalid timestamp", id);
            continue;
        };

        items.push(HistoryItem {
            id,
            user_id,
            code_snippet,
            mode,
            response,
            timestamp,
        });
    }
    Ok(items)
}
