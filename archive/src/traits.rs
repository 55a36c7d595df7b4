//! The external game-source interface.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` — callers hold them across
//! `tokio::spawn` boundaries.

use std::future::Future;

use crate::error::SourceError;
use crate::types::{ArchiveMonth, GameRecord, ProfileSummary};

/// A provider of archived games and player profiles.
///
/// Implementations must be assumed rate-limited; the caching layer issues at
/// most one `fetch_month` per distinct `(username, year, month)` per cache
/// TTL window.
pub trait GameSource: Send + Sync {
    /// List the months for which the player has archived games.
    fn fetch_archive_list(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<ArchiveMonth>, SourceError>> + Send;

    /// Fetch all of the player's games finished in the given month.
    fn fetch_month(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> impl Future<Output = Result<Vec<GameRecord>, SourceError>> + Send;

    /// Fetch the player's public profile metadata.
    fn fetch_profile(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<ProfileSummary, SourceError>> + Send;
}
