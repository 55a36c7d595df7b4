//! Configuration: data directory resolution and cache TTL knobs.
//!
//! Data directory precedence:
//! 1. BLUNDERLAB_DATA_DIR environment variable
//! 2. ~/.config/blunderlab/data (production default)
//! 3. ./data (fallback for development)

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_DIR: &str = ".config/blunderlab/data";
const DEV_DATA_DIR: &str = "./data";

/// Get the data directory for durable storage.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BLUNDERLAB_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// TTLs for the ephemeral tier.
///
/// The monthly-batch TTL class is decided at read time: a batch for the
/// *current* calendar month can still acquire new games and goes stale
/// quickly, while past months are immutable in practice and are held for a
/// day.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// TTL of a monthly batch whose month is the current calendar month.
    pub ttl_current_month: Duration,
    /// TTL of a monthly batch for any past month.
    pub ttl_past_month: Duration,
    /// TTL of a cached profile snapshot.
    pub ttl_profile: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_current_month: Duration::from_secs(10 * 60),
            ttl_past_month: Duration::from_secs(24 * 60 * 60),
            ttl_profile: Duration::from_secs(60 * 60),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_month_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_current_month = ttl;
        self
    }

    pub fn with_past_month_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_past_month = ttl;
        self
    }

    pub fn with_profile_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_profile = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_not_empty() {
        let dir = get_data_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_ttl_ordering() {
        let config = CacheConfig::default();
        assert!(config.ttl_current_month < config.ttl_profile);
        assert!(config.ttl_profile < config.ttl_past_month);
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::new()
            .with_current_month_ttl(Duration::from_secs(1))
            .with_past_month_ttl(Duration::from_secs(2))
            .with_profile_ttl(Duration::from_secs(3));
        assert_eq!(config.ttl_current_month, Duration::from_secs(1));
        assert_eq!(config.ttl_past_month, Duration::from_secs(2));
        assert_eq!(config.ttl_profile, Duration::from_secs(3));
    }
}
