//! Async repository trait definitions for the persistence layer.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` — required by `tokio::spawn`.

use std::future::Future;

use archive::GameRecord;

use super::{AnalysisRecord, StorageError};

/// Repository for raw game records.
///
/// `save_game` is an idempotent upsert keyed by `uuid`: it must tolerate
/// repeated calls with the same uuid (a re-fetched month) without
/// duplication or error.
pub trait GameRepository: Send + Sync {
    fn save_game(
        &self,
        record: &GameRecord,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
    fn load_game(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<GameRecord>, StorageError>> + Send;
    fn count_games(&self) -> impl Future<Output = Result<u64, StorageError>> + Send;
    /// Delete all games, or only one user's if `username` is given. Must not
    /// error when nothing matches.
    fn delete_games(
        &self,
        username: Option<&str>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Repository for computed analysis records, keyed `(game_uuid, username)`.
pub trait AnalysisRepository: Send + Sync {
    fn save_analysis(
        &self,
        record: &AnalysisRecord,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
    fn load_analysis(
        &self,
        game_uuid: &str,
        username: &str,
    ) -> impl Future<Output = Result<Option<AnalysisRecord>, StorageError>> + Send;
    /// Load the subset of `game_uuids` that have a stored analysis for
    /// `username`. Absent keys are simply omitted.
    fn load_analyses_bulk(
        &self,
        username: &str,
        game_uuids: &[String],
    ) -> impl Future<Output = Result<Vec<AnalysisRecord>, StorageError>> + Send;
    fn count_analyses(&self) -> impl Future<Output = Result<u64, StorageError>> + Send;
    fn delete_analyses(
        &self,
        username: Option<&str>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
