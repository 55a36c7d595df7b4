//! Shared analysis types: per-move reviews, aggregates, mistake patterns.

use serde::{Deserialize, Serialize};

/// Version of the stored [`GameAnalysis`] shape.
///
/// Bumped whenever the evaluator's classification thresholds or the payload
/// layout change. A stored record with a different version is treated as a
/// cache miss and recomputed.
pub const ANALYSIS_SCHEMA_VERSION: i32 = 1;

/// Classification of a move's quality relative to the evaluator's preferred
/// move in the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveClassification {
    /// Matches or very close to the evaluator's best move.
    Best,
    /// Within 30 cp of best.
    Good,
    /// 31-100 cp worse than best.
    Inaccuracy,
    /// 101-300 cp worse than best.
    Mistake,
    /// 300+ cp worse than best.
    Blunder,
    /// Only one legal move available.
    Forced,
}

impl MoveClassification {
    /// Classify based on centipawn loss.
    /// `cp_loss` should be non-negative (how many cp the played move lost).
    pub fn from_cp_loss(cp_loss: i32, is_forced: bool) -> Self {
        if is_forced {
            return Self::Forced;
        }
        match cp_loss {
            i if i <= 0 => Self::Best,
            1..=30 => Self::Good,
            31..=100 => Self::Inaccuracy,
            101..=300 => Self::Mistake,
            _ => Self::Blunder,
        }
    }

    /// True for the severities worth surfacing as mistakes.
    pub fn is_mistake(self) -> bool {
        matches!(self, Self::Inaccuracy | Self::Mistake | Self::Blunder)
    }
}

/// Rough phase of the game a ply belongs to, used for grouping recurring
/// mistakes ("you keep blundering in the endgame").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    /// Phase by ply number and remaining piece count (kings included).
    pub fn of(ply: u32, pieces_on_board: u32) -> Self {
        if pieces_on_board <= 10 {
            Self::Endgame
        } else if ply <= 20 {
            Self::Opening
        } else {
            Self::Middlegame
        }
    }
}

/// Evaluation of a single played move by the owning player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReview {
    /// 1-indexed ply within the game (both sides counted).
    pub ply: u32,
    pub san: String,
    pub fen_before: String,
    pub fen_after: String,
    pub classification: MoveClassification,
    /// Centipawns lost relative to the evaluator's preferred move.
    pub cp_loss: i32,
    /// The evaluator's preferred move, SAN.
    pub best_move: String,
    /// Short evaluator explanation of what the move cost.
    pub explanation: String,
    pub phase: GamePhase,
}

/// Aggregate statistics over one player's moves in one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// 0-100, derived from average centipawn loss.
    pub accuracy: f64,
    pub move_count: u32,
    pub best: u32,
    pub good: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
}

/// A single surfaced mistake, with enough context to show the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeExample {
    pub game_uuid: String,
    pub ply: u32,
    pub san: String,
    pub fen_before: String,
    pub best_move: String,
    pub classification: MoveClassification,
    pub cp_loss: i32,
    pub phase: GamePhase,
    pub explanation: String,
}

/// A recurring mistake shape detected across many games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakePattern {
    pub phase: GamePhase,
    pub classification: MoveClassification,
    /// How many times this (phase, severity) pair occurred across the batch.
    pub count: u32,
    /// Representative examples, worst first.
    pub examples: Vec<MistakeExample>,
}

/// Full structured analysis output for one game, one player perspective.
///
/// This is the payload persisted by the durable analysis store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub moves: Vec<MoveReview>,
    pub stats: AggregateStats,
    pub mistakes: Vec<MistakeExample>,
    pub summary: String,
}
