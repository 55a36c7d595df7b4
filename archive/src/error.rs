//! Error types for the archive source seam.

use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure to retrieve data from the external games archive.
///
/// These are the only errors the caching layer lets propagate to the
/// top-level caller, and only when there is no cached batch to fall back on.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Archive request failed: {0}")]
    RequestFailed(String),

    #[error("Archive rate limit hit (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Archive returned invalid data: {0}")]
    InvalidData(String),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}
