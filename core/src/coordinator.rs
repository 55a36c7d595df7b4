//! The cache coordinator: the single façade between the analysis pipeline
//! and the two storage tiers.
//!
//! Tier policy in one place: callers never touch [`DurableStore`] or
//! [`EphemeralCache`] directly. Constructed once per process and passed by
//! handle — never ambient global state.
//!
//! Cache-key rules: usernames are lowercased everywhere, so differently
//! cased requests for the same player collide onto the same entries; game
//! uuids are the provider's identifiers verbatim, never re-derived.

use std::collections::HashMap;
use std::future::Future;

use archive::{normalize_username, GameRecord, GameSource, ProfileSummary, SourceError};

use crate::ephemeral::EphemeralCache;
use crate::persistence::{AnalysisRecord, DurableStore, StorageError, StoreStats};

pub struct CacheCoordinator {
    durable: DurableStore,
    ephemeral: EphemeralCache,
}

impl CacheCoordinator {
    pub fn new(durable: DurableStore, ephemeral: EphemeralCache) -> Self {
        Self { durable, ephemeral }
    }

    /// Direct access to the durable tier, for admin surfaces and tests.
    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    /// The games of one `(username, year, month)`.
    ///
    /// Ephemeral hit: returned as-is, no network call, no durable write.
    /// Miss: fetched from `source`, then written through to both tiers so
    /// future batch lookups and future individual-game lookups are both
    /// fast. A source failure propagates unmodified — with no cached batch
    /// there is genuinely nothing to fall back on. A durable write failure
    /// is logged and swallowed; losing a cache write costs performance, not
    /// correctness.
    pub async fn fetch_monthly_games<S: GameSource>(
        &self,
        source: &S,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<GameRecord>, SourceError> {
        let username = normalize_username(username);

        if let Some(batch) = self.ephemeral.monthly_batch(&username, year, month).await {
            tracing::debug!(
                username = %username,
                year,
                month,
                games = batch.len(),
                "Monthly batch served from ephemeral cache"
            );
            return Ok(batch);
        }

        let games = source.fetch_month(&username, year, month).await?;
        tracing::info!(
            username = %username,
            year,
            month,
            games = games.len(),
            "Fetched monthly batch from source"
        );

        self.ephemeral
            .put_monthly_batch(&username, year, month, games.clone())
            .await;
        if let Err(e) = self.durable.put_games(&games).await {
            tracing::warn!(
                username = %username,
                year,
                month,
                "Durable write of monthly batch failed: {}",
                e
            );
        }

        Ok(games)
    }

    /// The player's profile snapshot, read through the ephemeral cache.
    pub async fn profile<S: GameSource>(
        &self,
        source: &S,
        username: &str,
    ) -> Result<ProfileSummary, SourceError> {
        let username = normalize_username(username);

        if let Some(profile) = self.ephemeral.profile(&username).await {
            return Ok(profile);
        }

        let profile = source.fetch_profile(&username).await?;
        self.ephemeral.put_profile(&username, profile.clone()).await;
        Ok(profile)
    }

    /// Resolve one analysis per requested game, computing only the misses.
    ///
    /// Misses are processed strictly one at a time in input order, which
    /// also rate-limits the expensive external calls behind `compute`. Each
    /// fresh record is written through immediately, so a crash partway
    /// through a long batch keeps everything computed so far.
    ///
    /// `compute` returns `None` when a game cannot be analyzed; that game
    /// is omitted from the result. The returned records otherwise follow
    /// the caller's `game_uuids` order, one record per occurrence (a uuid
    /// listed twice resolves twice but computes at most once) — callers
    /// cannot tell hits from misses.
    pub async fn resolve_analyses<F, Fut>(
        &self,
        username: &str,
        game_uuids: &[String],
        mut compute: F,
    ) -> Vec<AnalysisRecord>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Option<AnalysisRecord>>,
    {
        let username = normalize_username(username);
        let mut resolved: HashMap<String, AnalysisRecord> =
            self.durable.analyses_bulk(&username, game_uuids).await;
        let hits = resolved.len();

        for uuid in game_uuids {
            if resolved.contains_key(uuid) {
                continue;
            }
            let Some(record) = compute(uuid.clone()).await else {
                continue;
            };
            if let Err(e) = self.durable.put_analysis(&record).await {
                tracing::warn!(
                    game_uuid = %uuid,
                    username = %username,
                    "Durable write of analysis failed: {}",
                    e
                );
            }
            resolved.insert(uuid.clone(), record);
        }

        tracing::info!(
            username = %username,
            requested = game_uuids.len(),
            hits,
            computed = resolved.len() - hits,
            "Resolved analyses"
        );

        game_uuids
            .iter()
            .filter_map(|uuid| resolved.get(uuid).cloned())
            .collect()
    }

    /// Durable-tier stats, for observability only.
    pub async fn stats(&self) -> StoreStats {
        self.durable.stats().await
    }

    /// Drop cached data in both tiers, scoped to one user if given.
    pub async fn clear(&self, username: Option<&str>) -> Result<(), StorageError> {
        self.ephemeral.clear_profiles(username).await;
        self.ephemeral.clear_monthly_batches(username).await;
        self.durable.clear(username).await
    }
}
