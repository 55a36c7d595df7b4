//! Caching and analysis memoization for chess game histories.
//!
//! Two storage tiers sit behind one façade: a SQLite-backed
//! [`DurableStore`] that survives restarts and a TTL-bounded in-process
//! [`EphemeralCache`]. The [`CacheCoordinator`] routes reads and
//! write-throughs between them, and the [`AnalysisPipeline`] fills
//! analysis misses one game at a time with cooperative cancellation.

pub mod config;
pub mod coordinator;
pub mod ephemeral;
pub mod error;
pub mod persistence;
pub mod pipeline;

pub use config::{get_data_dir, CacheConfig};
pub use coordinator::CacheCoordinator;
pub use ephemeral::EphemeralCache;
pub use error::CoreError;
pub use persistence::{AnalysisRecord, DurableStore, StorageError, StoreStats};
pub use pipeline::{recurring_patterns, AnalysisPipeline};
