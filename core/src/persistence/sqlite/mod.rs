//! SQLite-backed repository implementations.
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode** — one writer, multiple concurrent readers.
//! - **Foreign keys enabled** — enforced at the connection level.
//! - **Embedded migrations** — `sqlx::migrate!` runs
//!   `migrations/001_initial_schema.sql` automatically on open.
//!
//! [`SqliteGameRepository`] and [`SqliteAnalysisRepository`] implement the
//! traits from [`crate::persistence::traits`]. Analysis payloads are stored
//! as JSON `TEXT` next to their `schema_version`; the player-color enum is
//! round-tripped through [`helpers`].

mod analysis_repo;
mod database;
pub(crate) mod helpers;
mod game_repo;

pub use analysis_repo::SqliteAnalysisRepository;
pub use database::Database;
pub use game_repo::SqliteGameRepository;
