//! The batch analysis pipeline.
//!
//! Turns raw game records into persisted [`AnalysisRecord`]s by way of the
//! [`CacheCoordinator`]: the coordinator decides which games need computing,
//! the pipeline does the computing. One evaluator call per player move, one
//! summarizer call per freshly analyzed game. Cancellation is cooperative
//! and checked between games, never mid-game, so every record that starts
//! computing either finishes and persists or was already cached.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use analysis::{
    aggregate_stats, mistake_examples, recurring_mistakes, GameAnalysis, MistakePattern,
    MoveEvaluator, MoveReview, RuleBasedSummary, Summarizer, ANALYSIS_SCHEMA_VERSION,
};
use analysis::{san, GamePhase};
use archive::{Color, GameRecord, GameSource};

use crate::coordinator::CacheCoordinator;
use crate::error::CoreError;
use crate::persistence::{now_timestamp, AnalysisRecord};

pub struct AnalysisPipeline<E, S> {
    evaluator: E,
    summarizer: S,
}

impl<E, S> AnalysisPipeline<E, S>
where
    E: MoveEvaluator,
    S: Summarizer,
{
    pub fn new(evaluator: E, summarizer: S) -> Self {
        Self {
            evaluator,
            summarizer,
        }
    }

    /// Analyze a batch of games for one player, cached results first.
    ///
    /// Games whose analysis is already stored come back without any
    /// evaluator work. The rest are computed one at a time in input order
    /// and written through as each finishes. A game that cannot be
    /// evaluated (malformed movetext, evaluator failure on any move) is
    /// skipped with a warning; the batch continues. Once `cancel` fires,
    /// no further game starts computing, but cached hits still resolve.
    pub async fn analyze_batch(
        &self,
        coordinator: &CacheCoordinator,
        username: &str,
        games: &[GameRecord],
        cancel: &CancellationToken,
    ) -> Vec<AnalysisRecord> {
        let by_uuid: HashMap<&str, &GameRecord> =
            games.iter().map(|g| (g.uuid.as_str(), g)).collect();
        let uuids: Vec<String> = games.iter().map(|g| g.uuid.clone()).collect();

        coordinator
            .resolve_analyses(username, &uuids, |uuid| {
                let game = by_uuid.get(uuid.as_str()).copied();
                async move {
                    if cancel.is_cancelled() {
                        tracing::info!(game_uuid = %uuid, "Analysis cancelled before start");
                        return None;
                    }
                    let game = game?;
                    match self.compute_one(game).await {
                        Ok(record) => Some(record),
                        Err(e) => {
                            tracing::warn!(
                                game_uuid = %game.uuid,
                                "Skipping game, analysis failed: {}",
                                e
                            );
                            None
                        }
                    }
                }
            })
            .await
    }

    /// Analyze the player's most recent games, newest month first.
    ///
    /// Walks the archive list backwards, pulling each month through the
    /// coordinator's game cache, until `max_games` games have been
    /// collected or the archive runs out. Then analyzes the collected
    /// batch. Archive and month fetches go through the same cache tiers
    /// as any other lookup.
    pub async fn analyze_recent<G: GameSource>(
        &self,
        coordinator: &CacheCoordinator,
        source: &G,
        username: &str,
        max_games: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<AnalysisRecord>, CoreError> {
        let months = source.fetch_archive_list(username).await?;
        let mut games: Vec<GameRecord> = Vec::new();

        for month in months.iter().rev() {
            if games.len() >= max_games || cancel.is_cancelled() {
                break;
            }
            let batch = coordinator
                .fetch_monthly_games(source, username, month.year, month.month)
                .await?;
            games.extend(batch);
        }
        // Newest games first within the collected window
        games.sort_by(|a, b| b.end_time.cmp(&a.end_time));
        games.truncate(max_games);

        Ok(self.analyze_batch(coordinator, username, &games, cancel).await)
    }

    /// Full analysis of one game from the player's perspective.
    async fn compute_one(&self, game: &GameRecord) -> Result<AnalysisRecord, CoreError> {
        let analysis_err = |reason: String| CoreError::Analysis {
            game_uuid: game.uuid.clone(),
            reason,
        };
        let replayed =
            san::replay_movetext(&game.pgn).map_err(|e| analysis_err(e.to_string()))?;

        let mut moves = Vec::new();
        for m in &replayed {
            if !is_player_ply(m.ply, game.player_color) {
                continue;
            }
            let eval = self
                .evaluator
                .evaluate_move(&m.fen_before, &m.san, &m.fen_after)
                .map_err(|e| analysis_err(e.to_string()))?;
            moves.push(MoveReview {
                ply: m.ply,
                san: m.san.clone(),
                fen_before: m.fen_before.clone(),
                fen_after: m.fen_after.clone(),
                classification: eval.classification,
                cp_loss: eval.evaluation_delta,
                best_move: eval.best_move,
                explanation: eval.explanation,
                phase: GamePhase::of(m.ply, m.pieces_before),
            });
        }

        let stats = aggregate_stats(&moves);
        let mistakes = mistake_examples(&game.uuid, &moves);
        let summary = match self
            .summarizer
            .summarize(game, game.player_color, &stats)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    game_uuid = %game.uuid,
                    "Summarizer failed, using fallback: {}",
                    e
                );
                RuleBasedSummary::render(game, game.player_color, &stats)
            }
        };

        Ok(AnalysisRecord {
            game_uuid: game.uuid.clone(),
            username: game.username.clone(),
            schema_version: ANALYSIS_SCHEMA_VERSION,
            analysis: GameAnalysis {
                moves,
                stats,
                mistakes,
                summary,
            },
            created_at: now_timestamp(),
        })
    }
}

/// Mistake patterns that recur across a set of analyzed games.
pub fn recurring_patterns(records: &[AnalysisRecord]) -> Vec<MistakePattern> {
    let analyses: Vec<GameAnalysis> = records.iter().map(|r| r.analysis.clone()).collect();
    recurring_mistakes(&analyses)
}

fn is_player_ply(ply: u32, color: Color) -> bool {
    match color {
        Color::White => ply % 2 == 1,
        Color::Black => ply % 2 == 0,
    }
}
