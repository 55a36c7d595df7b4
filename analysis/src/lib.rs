pub mod aggregate;
pub mod evaluator;
pub mod san;
pub mod summary;
pub mod types;

pub use aggregate::{aggregate_stats, mistake_examples, recurring_mistakes};
pub use evaluator::{EvalError, MoveEvaluation, MoveEvaluator};
pub use summary::{RuleBasedSummary, Summarizer, SummaryError};
pub use types::{
    AggregateStats, GameAnalysis, GamePhase, MistakeExample, MistakePattern, MoveClassification,
    MoveReview, ANALYSIS_SCHEMA_VERSION,
};
