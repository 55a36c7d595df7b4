//! The durable-store facade used by the cache coordinator.
//!
//! Wraps the SQLite repositories with the failure policy the pipeline
//! depends on: read failures degrade to "not found" so a failing durable
//! tier means "always recompute", never a hard failure; write failures are
//! surfaced to the immediate caller, which treats them as non-fatal.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use archive::{normalize_username, GameRecord};

use super::sqlite::{Database, SqliteAnalysisRepository, SqliteGameRepository};
use super::traits::{AnalysisRepository, GameRepository};
use super::{AnalysisRecord, StorageError};
use analysis::ANALYSIS_SCHEMA_VERSION;

/// Observability snapshot of the durable tier. No correctness dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub game_count: u64,
    pub analysis_count: u64,
    pub storage_size_bytes: u64,
}

/// Persistent storage for [`GameRecord`]s and [`AnalysisRecord`]s.
pub struct DurableStore {
    games: SqliteGameRepository,
    analyses: SqliteAnalysisRepository,
    db_path: Option<PathBuf>,
}

impl DurableStore {
    /// Open (or create) the store at `path`.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let db = Database::open(path).await?;
        Ok(Self {
            games: SqliteGameRepository::new(db.pool().clone()),
            analyses: SqliteAnalysisRepository::new(db.pool().clone()),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// In-memory store for tests.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let db = Database::in_memory().await?;
        Ok(Self {
            games: SqliteGameRepository::new(db.pool().clone()),
            analyses: SqliteAnalysisRepository::new(db.pool().clone()),
            db_path: None,
        })
    }

    /// Point lookup by the provider's uuid. Read failures degrade to `None`.
    pub async fn game(&self, uuid: &str) -> Option<GameRecord> {
        match self.games.load_game(uuid).await {
            Ok(game) => game,
            Err(e) => {
                tracing::warn!(uuid = %uuid, "Game read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Idempotent upsert keyed by `uuid`.
    ///
    /// The stored username is lowercased here, so records built straight
    /// from provider JSON (which preserves display case) still land on the
    /// keys the read paths use.
    pub async fn put_game(&self, record: &GameRecord) -> Result<(), StorageError> {
        self.games.save_game(&normalized_game(record)).await
    }

    /// Bulk upsert. Partial success is allowed: failed rows are logged and
    /// skipped, and the caller retries by repeating `put_game`. Errors only
    /// when not a single row could be written.
    pub async fn put_games(&self, records: &[GameRecord]) -> Result<usize, StorageError> {
        let mut written = 0;
        let mut last_err = None;
        for record in records {
            match self.games.save_game(&normalized_game(record)).await {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(uuid = %record.uuid, "Game write failed: {}", e);
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) if written == 0 && !records.is_empty() => Err(e),
            _ => Ok(written),
        }
    }

    /// Look up a stored analysis by `(game_uuid, username)`.
    ///
    /// Degrades to `None` on read failure, and also when the stored record
    /// carries a different schema version — an old evaluator's output is a
    /// forced miss, recomputed and overwritten by the next upsert.
    pub async fn analysis(&self, game_uuid: &str, username: &str) -> Option<AnalysisRecord> {
        let username = normalize_username(username);
        match self.analyses.load_analysis(game_uuid, &username).await {
            Ok(Some(record)) if record.schema_version == ANALYSIS_SCHEMA_VERSION => Some(record),
            Ok(Some(record)) => {
                tracing::debug!(
                    game_uuid = %game_uuid,
                    stored = record.schema_version,
                    current = ANALYSIS_SCHEMA_VERSION,
                    "Analysis schema version mismatch, forcing recompute"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    game_uuid = %game_uuid,
                    username = %username,
                    "Analysis read failed, treating as miss: {}",
                    e
                );
                None
            }
        }
    }

    /// Idempotent upsert keyed by `(game_uuid, username)`. The stored
    /// username is lowercased, matching the read-side keys.
    pub async fn put_analysis(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        self.analyses.save_analysis(&normalized_analysis(record)).await
    }

    /// Bulk lookup: maps each found `game_uuid` to its record; absent keys
    /// are omitted so callers compute the miss set by set-difference. Read
    /// failures degrade to an empty map.
    pub async fn analyses_bulk(
        &self,
        username: &str,
        game_uuids: &[String],
    ) -> HashMap<String, AnalysisRecord> {
        let username = normalize_username(username);
        match self.analyses.load_analyses_bulk(&username, game_uuids).await {
            Ok(records) => records
                .into_iter()
                .filter(|r| r.schema_version == ANALYSIS_SCHEMA_VERSION)
                .map(|r| (r.game_uuid.clone(), r))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    username = %username,
                    "Bulk analysis read failed, treating all as misses: {}",
                    e
                );
                HashMap::new()
            }
        }
    }

    /// Counts and on-disk size. Failures degrade to zeros.
    pub async fn stats(&self) -> StoreStats {
        let game_count = self.games.count_games().await.unwrap_or_else(|e| {
            tracing::warn!("Game count failed: {}", e);
            0
        });
        let analysis_count = self.analyses.count_analyses().await.unwrap_or_else(|e| {
            tracing::warn!("Analysis count failed: {}", e);
            0
        });
        let storage_size_bytes = self
            .db_path
            .as_deref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        StoreStats {
            game_count,
            analysis_count,
            storage_size_bytes,
        }
    }

    /// Delete all game and analysis rows, scoped to one user if given.
    /// Succeeds when nothing matches.
    pub async fn clear(&self, username: Option<&str>) -> Result<(), StorageError> {
        let normalized = username.map(normalize_username);
        let scope = normalized.as_deref();
        self.games.delete_games(scope).await?;
        self.analyses.delete_analyses(scope).await?;
        tracing::info!(username = ?scope, "Cleared durable store");
        Ok(())
    }
}

/// Lowercase the owning username before a game write; already-normalized
/// records are passed through without a clone.
fn normalized_game(record: &GameRecord) -> Cow<'_, GameRecord> {
    let username = normalize_username(&record.username);
    if username == record.username {
        Cow::Borrowed(record)
    } else {
        let mut owned = record.clone();
        owned.username = username;
        Cow::Owned(owned)
    }
}

fn normalized_analysis(record: &AnalysisRecord) -> Cow<'_, AnalysisRecord> {
    let username = normalize_username(&record.username);
    if username == record.username {
        Cow::Borrowed(record)
    } else {
        let mut owned = record.clone();
        owned.username = username;
        Cow::Owned(owned)
    }
}
