//! Game-archive client seam.
//!
//! Defines the records retrieved from the public games archive and the
//! [`GameSource`] trait that the cache/pipeline layers consume. The actual
//! HTTP client lives outside this workspace; tests use [`MockGameSource`].

mod error;
pub mod mock;
mod traits;
mod types;

pub use error::{SourceError, SourceResult};
pub use traits::GameSource;
pub use types::{normalize_username, year_month_of, ArchiveMonth, Color, GameRecord, ProfileSummary};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGameSource;
