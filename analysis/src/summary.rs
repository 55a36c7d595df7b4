//! Natural-language game summaries.
//!
//! The real text-generation collaborator (network, quota-limited) sits
//! behind [`Summarizer`]. [`RuleBasedSummary`] is the deterministic fallback
//! the pipeline substitutes when generation fails; it must never fail
//! itself.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};

use archive::{Color, GameRecord};
use thiserror::Error;

use crate::types::AggregateStats;

/// Text-generation failure. Never fatal to the pipeline.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary request failed: {0}")]
    RequestFailed(String),

    #[error("Summary quota exhausted")]
    QuotaExhausted,

    #[error("Summary output unparseable: {0}")]
    InvalidOutput(String),
}

/// Produces a short natural-language summary of one analyzed game.
pub trait Summarizer: Send + Sync {
    fn summarize(
        &self,
        game: &GameRecord,
        player_color: Color,
        stats: &AggregateStats,
    ) -> impl Future<Output = Result<String, SummaryError>> + Send;
}

/// Opening phrases for the fallback summary. The pick is seeded from the
/// game uuid so repeated runs produce identical records.
const OPENERS: [&str; 4] = [
    "A hard-fought game",
    "An instructive game",
    "A sharp encounter",
    "A tense battle",
];

fn seeded_pick<'a>(uuid: &str, choices: &[&'a str]) -> &'a str {
    let mut hasher = DefaultHasher::new();
    uuid.hash(&mut hasher);
    choices[(hasher.finish() % choices.len() as u64) as usize]
}

/// Deterministic rule-based summary built from the aggregate statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSummary;

impl RuleBasedSummary {
    /// Build the fallback text. Infallible by design.
    pub fn render(game: &GameRecord, player_color: Color, stats: &AggregateStats) -> String {
        let opener = seeded_pick(&game.uuid, &OPENERS);
        let side = match player_color {
            Color::White => "White",
            Color::Black => "Black",
        };
        let mut text = format!(
            "{} as {}: {:.1}% accuracy over {} moves.",
            opener, side, stats.accuracy, stats.move_count
        );

        if stats.blunders > 0 {
            text.push_str(&format!(
                " {} blunder{} proved costly.",
                stats.blunders,
                if stats.blunders == 1 { "" } else { "s" }
            ));
        } else if stats.mistakes > 0 {
            text.push_str(&format!(
                " {} mistake{} to review.",
                stats.mistakes,
                if stats.mistakes == 1 { "" } else { "s" }
            ));
        } else {
            text.push_str(" A clean game with no serious errors.");
        }

        text
    }
}

impl Summarizer for RuleBasedSummary {
    fn summarize(
        &self,
        game: &GameRecord,
        player_color: Color,
        stats: &AggregateStats,
    ) -> impl Future<Output = Result<String, SummaryError>> + Send {
        let text = Self::render(game, player_color, stats);
        async move { Ok(text) }
    }
}
