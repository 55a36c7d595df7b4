//! Unified error type for library consumers.
//!
//! Only a source failure on a true cold miss ever reaches the top-level
//! caller; storage and compute failures all have degraded-but-non-fatal
//! behavior further down.

use archive::SourceError;
use thiserror::Error;

use crate::persistence::StorageError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A single game could not be analyzed (malformed movetext or an
    /// evaluator failure). Batch callers log and skip; it is fatal only
    /// when analyzing one specific game.
    #[error("Analysis of game {game_uuid} failed: {reason}")]
    Analysis { game_uuid: String, reason: String },
}
