//! Process-local, time-bounded caches for profiles and monthly batches.
//!
//! Expiry is lazy: entries are checked (and removed) at the point of read,
//! never swept eagerly. Which monthly TTL applies is decided at read time
//! too — a batch written while its month was current silently falls under
//! the long TTL once the calendar rolls over. Old months truly become
//! immutable, so that is the intended behavior, not an accident to fix.
//!
//! Nothing here survives a restart; profile and monthly data are cheap to
//! re-derive from durable games plus a fresh profile fetch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{Datelike, Utc};
use tokio::sync::RwLock;

use archive::{normalize_username, GameRecord, ProfileSummary};

use crate::config::CacheConfig;

/// Key of one cached monthly batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BatchKey {
    username: String,
    year: i32,
    month: u32,
}

struct TimedEntry<T> {
    value: T,
    stored_at: Instant,
    /// Extra age applied by test hooks; always zero in production.
    extra_age: Duration,
}

impl<T> TimedEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            extra_age: Duration::ZERO,
        }
    }

    fn age(&self) -> Duration {
        self.stored_at.elapsed() + self.extra_age
    }
}

/// The current calendar `(year, month)`, UTC.
fn current_year_month() -> (i32, u32) {
    let now = Utc::now();
    (now.year(), now.month())
}

/// In-memory TTL caches for the two volatile record kinds.
pub struct EphemeralCache {
    config: CacheConfig,
    profiles: RwLock<HashMap<String, TimedEntry<ProfileSummary>>>,
    batches: RwLock<HashMap<BatchKey, TimedEntry<Vec<GameRecord>>>>,
}

impl EphemeralCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            profiles: RwLock::new(HashMap::new()),
            batches: RwLock::new(HashMap::new()),
        }
    }

    /// Valid (unexpired) profile snapshot, or `None`. Expired entries are
    /// removed on the way out.
    pub async fn profile(&self, username: &str) -> Option<ProfileSummary> {
        let key = normalize_username(username);
        let mut profiles = self.profiles.write().await;
        match profiles.get(&key) {
            Some(entry) if entry.age() < self.config.ttl_profile => Some(entry.value.clone()),
            Some(_) => {
                profiles.remove(&key);
                None
            }
            None => None,
        }
    }

    pub async fn put_profile(&self, username: &str, summary: ProfileSummary) {
        let key = normalize_username(username);
        self.profiles
            .write()
            .await
            .insert(key, TimedEntry::new(summary));
    }

    /// Which TTL applies to a batch for `(year, month)` right now.
    fn batch_ttl(&self, year: i32, month: u32) -> Duration {
        if (year, month) == current_year_month() {
            self.config.ttl_current_month
        } else {
            self.config.ttl_past_month
        }
    }

    /// Valid (unexpired) monthly batch, or `None`.
    pub async fn monthly_batch(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Option<Vec<GameRecord>> {
        let key = BatchKey {
            username: normalize_username(username),
            year,
            month,
        };
        let ttl = self.batch_ttl(year, month);
        let mut batches = self.batches.write().await;
        match batches.get(&key) {
            Some(entry) if entry.age() < ttl => Some(entry.value.clone()),
            Some(_) => {
                batches.remove(&key);
                None
            }
            None => None,
        }
    }

    pub async fn put_monthly_batch(
        &self,
        username: &str,
        year: i32,
        month: u32,
        games: Vec<GameRecord>,
    ) {
        let key = BatchKey {
            username: normalize_username(username),
            year,
            month,
        };
        self.batches.write().await.insert(key, TimedEntry::new(games));
    }

    /// Drop cached profiles, scoped to one user if given.
    pub async fn clear_profiles(&self, username: Option<&str>) {
        let mut profiles = self.profiles.write().await;
        match username {
            Some(user) => {
                profiles.remove(&normalize_username(user));
            }
            None => profiles.clear(),
        }
    }

    /// Drop cached monthly batches, scoped to one user if given.
    pub async fn clear_monthly_batches(&self, username: Option<&str>) {
        let mut batches = self.batches.write().await;
        match username {
            Some(user) => {
                let key = normalize_username(user);
                batches.retain(|k, _| k.username != key);
            }
            None => batches.clear(),
        }
    }

    /// Age a batch artificially so tests can cross TTL boundaries without
    /// sleeping.
    #[cfg(test)]
    async fn age_monthly_batch(&self, username: &str, year: i32, month: u32, by: Duration) {
        let key = BatchKey {
            username: normalize_username(username),
            year,
            month,
        };
        if let Some(entry) = self.batches.write().await.get_mut(&key) {
            entry.extra_age += by;
        }
    }

    #[cfg(test)]
    async fn age_profile(&self, username: &str, by: Duration) {
        let key = normalize_username(username);
        if let Some(entry) = self.profiles.write().await.get_mut(&key) {
            entry.extra_age += by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive::Color;

    fn sample_games(username: &str, n: usize) -> Vec<GameRecord> {
        (0..n)
            .map(|i| {
                GameRecord::new(
                    format!("g{}", i),
                    username,
                    1_710_504_000,
                    username,
                    "opponent",
                    "1. e4 e5",
                    "blitz",
                    "win",
                    Color::White,
                )
            })
            .collect()
    }

    fn sample_profile(username: &str) -> ProfileSummary {
        ProfileSummary {
            username: normalize_username(username),
            display_name: Some("Alice".into()),
            avatar_url: None,
            country: Some("NO".into()),
            title: None,
            joined: Some(1_500_000_000),
            last_online: None,
        }
    }

    fn cache() -> EphemeralCache {
        EphemeralCache::new(CacheConfig::default())
    }

    #[tokio::test]
    async fn test_profile_roundtrip_case_insensitive() {
        let cache = cache();
        cache.put_profile("Alice", sample_profile("alice")).await;
        assert!(cache.profile("ALICE").await.is_some());
        assert!(cache.profile("alice").await.is_some());
        assert!(cache.profile("bob").await.is_none());
    }

    #[tokio::test]
    async fn test_profile_expires_and_is_removed() {
        let cache = cache();
        cache.put_profile("alice", sample_profile("alice")).await;
        cache
            .age_profile("alice", Duration::from_secs(60 * 60 + 1))
            .await;
        assert!(cache.profile("alice").await.is_none());
        // Stale entry was deleted, not just hidden
        assert!(cache.profiles.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_current_month_short_ttl() {
        let cache = cache();
        let (year, month) = current_year_month();
        cache
            .put_monthly_batch("alice", year, month, sample_games("alice", 2))
            .await;

        // Aged past the short TTL but well under the long one
        cache
            .age_monthly_batch("alice", year, month, Duration::from_secs(11 * 60))
            .await;
        assert!(cache.monthly_batch("alice", year, month).await.is_none());
    }

    #[tokio::test]
    async fn test_past_month_long_ttl() {
        let cache = cache();
        let (year, month) = current_year_month();
        let (past_year, past_month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        cache
            .put_monthly_batch("alice", past_year, past_month, sample_games("alice", 2))
            .await;

        // Aged past the short TTL: still valid, the long TTL applies
        cache
            .age_monthly_batch("alice", past_year, past_month, Duration::from_secs(11 * 60))
            .await;
        assert!(cache
            .monthly_batch("alice", past_year, past_month)
            .await
            .is_some());

        // Aged past the long TTL: expired
        cache
            .age_monthly_batch(
                "alice",
                past_year,
                past_month,
                Duration::from_secs(24 * 60 * 60),
            )
            .await;
        assert!(cache
            .monthly_batch("alice", past_year, past_month)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fresh_current_month_served() {
        let cache = cache();
        let (year, month) = current_year_month();
        cache
            .put_monthly_batch("alice", year, month, sample_games("alice", 3))
            .await;
        let batch = cache.monthly_batch("alice", year, month).await.unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[tokio::test]
    async fn test_clear_monthly_batches_scoped() {
        let cache = cache();
        let (year, month) = current_year_month();
        cache
            .put_monthly_batch("alice", year, month, sample_games("alice", 1))
            .await;
        cache
            .put_monthly_batch("bob", year, month, sample_games("bob", 1))
            .await;

        cache.clear_monthly_batches(Some("Alice")).await;
        assert!(cache.monthly_batch("alice", year, month).await.is_none());
        assert!(cache.monthly_batch("bob", year, month).await.is_some());

        cache.clear_monthly_batches(None).await;
        assert!(cache.monthly_batch("bob", year, month).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_profiles_scoped() {
        let cache = cache();
        cache.put_profile("alice", sample_profile("alice")).await;
        cache.put_profile("bob", sample_profile("bob")).await;

        cache.clear_profiles(Some("alice")).await;
        assert!(cache.profile("alice").await.is_none());
        assert!(cache.profile("bob").await.is_some());
    }
}
