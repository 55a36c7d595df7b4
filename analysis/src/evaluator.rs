//! The heuristic move-evaluator seam.
//!
//! The actual scoring formulas (material, king safety, center control) live
//! outside this workspace; the pipeline only depends on this trait. The
//! evaluator must be side-effect-free over chess positions so that
//! re-running an analysis for the same inputs yields an equivalent record.

use thiserror::Error;

use crate::types::MoveClassification;

/// Output of evaluating one played move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEvaluation {
    pub classification: MoveClassification,
    /// The evaluator's preferred move, SAN.
    pub best_move: String,
    /// Centipawns the played move lost relative to `best_move` (>= 0).
    pub evaluation_delta: i32,
    /// Short human-readable note on what the move cost.
    pub explanation: String,
}

/// Evaluation failure for a single move.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Evaluator failed on move {san}: {reason}")]
    Internal { san: String, reason: String },
}

/// Heuristic position evaluator, invoked once per player move per game
/// during a cache-miss analysis.
pub trait MoveEvaluator: Send + Sync {
    /// Evaluate the move `san` played from `fen_before`, reaching
    /// `fen_after`.
    fn evaluate_move(
        &self,
        fen_before: &str,
        san: &str,
        fen_after: &str,
    ) -> Result<MoveEvaluation, EvalError>;
}
