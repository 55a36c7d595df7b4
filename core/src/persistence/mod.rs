//! Durable persistence for game and analysis records.
//!
//! SQLite-backed repositories sit behind the traits in [`traits`]; the
//! [`DurableStore`] facade applies the failure policy the rest of the crate
//! relies on: reads degrade to "not found", writes surface errors to the
//! immediate caller.

pub mod sqlite;
pub mod store;
pub mod traits;

pub use sqlite::Database;
pub use store::{DurableStore, StoreStats};

use std::time::{SystemTime, UNIX_EPOCH};

use analysis::GameAnalysis;
use serde::{Deserialize, Serialize};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
}

/// The computed result of analyzing one game for one player perspective.
///
/// Keyed by `(game_uuid, username)`: the same game can carry distinct
/// analyses for each side's player. At most one stored record per key; a
/// recomputation overwrites the prior one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub game_uuid: String,
    /// Owning username, lowercased.
    pub username: String,
    /// Payload shape version; mismatch forces a recompute.
    pub schema_version: i32,
    pub analysis: GameAnalysis,
    /// Unix seconds when the analysis was computed.
    pub created_at: i64,
}

/// Get the current unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
