//! Aggregate statistics and recurring-mistake detection.

use std::collections::HashMap;

use crate::types::{
    AggregateStats, GameAnalysis, GamePhase, MistakeExample, MistakePattern, MoveClassification,
    MoveReview,
};

/// Maximum surfaced mistakes per game.
const MISTAKE_EXAMPLES_PER_GAME: usize = 3;

/// Maximum representative examples kept per recurring pattern.
const EXAMPLES_PER_PATTERN: usize = 3;

/// Derive accuracy and severity counts from one player's reviewed moves.
///
/// Accuracy maps average centipawn loss onto 0-100 with the familiar
/// exponential curve; an empty move list scores 100.
pub fn aggregate_stats(moves: &[MoveReview]) -> AggregateStats {
    let mut stats = AggregateStats {
        accuracy: 100.0,
        move_count: moves.len() as u32,
        best: 0,
        good: 0,
        inaccuracies: 0,
        mistakes: 0,
        blunders: 0,
    };

    if moves.is_empty() {
        return stats;
    }

    for mv in moves {
        match mv.classification {
            MoveClassification::Best | MoveClassification::Forced => stats.best += 1,
            MoveClassification::Good => stats.good += 1,
            MoveClassification::Inaccuracy => stats.inaccuracies += 1,
            MoveClassification::Mistake => stats.mistakes += 1,
            MoveClassification::Blunder => stats.blunders += 1,
        }
    }

    let total_cp_loss: f64 = moves.iter().map(|m| (m.cp_loss as f64).min(1000.0)).sum();
    let avg_cp_loss = total_cp_loss / moves.len() as f64;
    let accuracy = 103.1668 * (-0.006 * avg_cp_loss).exp() - 3.1668;
    stats.accuracy = accuracy.clamp(0.0, 100.0);
    stats
}

/// Pick the worst moves of one game as surfaced mistake examples.
pub fn mistake_examples(game_uuid: &str, moves: &[MoveReview]) -> Vec<MistakeExample> {
    let mut candidates: Vec<&MoveReview> = moves
        .iter()
        .filter(|m| m.classification.is_mistake())
        .collect();
    candidates.sort_by(|a, b| b.cp_loss.cmp(&a.cp_loss));

    candidates
        .into_iter()
        .take(MISTAKE_EXAMPLES_PER_GAME)
        .map(|m| MistakeExample {
            game_uuid: game_uuid.to_string(),
            ply: m.ply,
            san: m.san.clone(),
            fen_before: m.fen_before.clone(),
            best_move: m.best_move.clone(),
            classification: m.classification,
            cp_loss: m.cp_loss,
            phase: m.phase,
            explanation: m.explanation.clone(),
        })
        .collect()
}

/// Group the mistakes of many analyzed games by `(phase, severity)` and
/// surface the pairs that recur, most frequent first.
pub fn recurring_mistakes(analyses: &[GameAnalysis]) -> Vec<MistakePattern> {
    let mut groups: HashMap<(GamePhase, MoveClassification), Vec<&MistakeExample>> = HashMap::new();
    for analysis in analyses {
        for example in &analysis.mistakes {
            groups
                .entry((example.phase, example.classification))
                .or_default()
                .push(example);
        }
    }

    let mut patterns: Vec<MistakePattern> = groups
        .into_iter()
        .filter(|(_, examples)| examples.len() >= 2)
        .map(|((phase, classification), mut examples)| {
            examples.sort_by(|a, b| b.cp_loss.cmp(&a.cp_loss));
            MistakePattern {
                phase,
                classification,
                count: examples.len() as u32,
                examples: examples
                    .into_iter()
                    .take(EXAMPLES_PER_PATTERN)
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    patterns.sort_by(|a, b| b.count.cmp(&a.count).then(b.classification_rank().cmp(&a.classification_rank())));
    patterns
}

impl MistakePattern {
    /// Severity ordering for tie-breaking pattern lists.
    fn classification_rank(&self) -> u8 {
        match self.classification {
            MoveClassification::Blunder => 3,
            MoveClassification::Mistake => 2,
            MoveClassification::Inaccuracy => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(ply: u32, cp_loss: i32, phase: GamePhase) -> MoveReview {
        MoveReview {
            ply,
            san: format!("m{}", ply),
            fen_before: "fen".to_string(),
            fen_after: "fen".to_string(),
            classification: MoveClassification::from_cp_loss(cp_loss, false),
            cp_loss,
            best_move: "best".to_string(),
            explanation: "why".to_string(),
            phase,
        }
    }

    fn analysis_with(mistakes: Vec<MistakeExample>) -> GameAnalysis {
        GameAnalysis {
            moves: vec![],
            stats: aggregate_stats(&[]),
            mistakes,
            summary: String::new(),
        }
    }

    fn example(uuid: &str, cp_loss: i32, phase: GamePhase) -> MistakeExample {
        MistakeExample {
            game_uuid: uuid.to_string(),
            ply: 1,
            san: "Qh4".to_string(),
            fen_before: "fen".to_string(),
            best_move: "Nf3".to_string(),
            classification: MoveClassification::from_cp_loss(cp_loss, false),
            cp_loss,
            phase,
            explanation: "why".to_string(),
        }
    }

    #[test]
    fn test_empty_moves_score_perfect() {
        let stats = aggregate_stats(&[]);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.move_count, 0);
    }

    #[test]
    fn test_all_best_high_accuracy() {
        let moves = vec![
            review(1, 0, GamePhase::Opening),
            review(3, 0, GamePhase::Opening),
        ];
        let stats = aggregate_stats(&moves);
        assert!(stats.accuracy > 99.0);
        assert_eq!(stats.best, 2);
    }

    #[test]
    fn test_blunders_tank_accuracy() {
        let moves = vec![
            review(1, 500, GamePhase::Middlegame),
            review(3, 400, GamePhase::Middlegame),
        ];
        let stats = aggregate_stats(&moves);
        assert!(stats.accuracy < 15.0);
        assert_eq!(stats.blunders, 2);
    }

    #[test]
    fn test_severity_counts() {
        let moves = vec![
            review(1, 0, GamePhase::Opening),
            review(3, 20, GamePhase::Opening),
            review(5, 50, GamePhase::Middlegame),
            review(7, 200, GamePhase::Middlegame),
            review(9, 400, GamePhase::Endgame),
        ];
        let stats = aggregate_stats(&moves);
        assert_eq!(
            (stats.best, stats.good, stats.inaccuracies, stats.mistakes, stats.blunders),
            (1, 1, 1, 1, 1)
        );
    }

    #[test]
    fn test_mistake_examples_worst_first_capped() {
        let moves = vec![
            review(1, 150, GamePhase::Opening),
            review(3, 400, GamePhase::Middlegame),
            review(5, 50, GamePhase::Middlegame),
            review(7, 320, GamePhase::Endgame),
            review(9, 0, GamePhase::Endgame),
        ];
        let examples = mistake_examples("g1", &moves);
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0].cp_loss, 400);
        assert_eq!(examples[1].cp_loss, 320);
        assert_eq!(examples[2].cp_loss, 150);
        assert!(examples.iter().all(|e| e.game_uuid == "g1"));
    }

    #[test]
    fn test_recurring_requires_two_occurrences() {
        let analyses = vec![
            analysis_with(vec![example("g1", 400, GamePhase::Endgame)]),
            analysis_with(vec![example("g2", 350, GamePhase::Endgame)]),
            analysis_with(vec![example("g3", 50, GamePhase::Opening)]),
        ];
        let patterns = recurring_mistakes(&analyses);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].phase, GamePhase::Endgame);
        assert_eq!(patterns[0].count, 2);
        // Worst example first
        assert_eq!(patterns[0].examples[0].game_uuid, "g1");
    }

    #[test]
    fn test_recurring_sorted_by_count() {
        let analyses = vec![
            analysis_with(vec![
                example("g1", 400, GamePhase::Endgame),
                example("g1", 150, GamePhase::Opening),
            ]),
            analysis_with(vec![
                example("g2", 350, GamePhase::Endgame),
                example("g2", 140, GamePhase::Opening),
            ]),
            analysis_with(vec![example("g3", 380, GamePhase::Endgame)]),
        ];
        let patterns = recurring_mistakes(&analyses);
        assert_eq!(patterns[0].count, 3);
        assert_eq!(patterns[0].phase, GamePhase::Endgame);
        assert_eq!(patterns[1].count, 2);
    }
}
