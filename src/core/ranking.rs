use crate::core::models::{RankAssignment, ScoreRow};
use itertools::Itertools;
use std::cmp::Ordering;

/// Leaderboard order: score descending, entry id ascending among equal scores.
pub fn leaderboard_order(a: &ScoreRow, b: &ScoreRow) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Standard competition ranking ("1224") of one event's rows.
///
/// Tied scores share the lower rank and the next distinct score is ranked by its
/// 1-based position, so [100, 90, 90, 80] ranks as [1, 2, 2, 4]. Assignments come
/// back in leaderboard order. Empty input gives an empty result.
pub fn competition_ranks(rows: &[ScoreRow]) -> Vec<RankAssignment> {
    rows.iter()
        .sorted_by(|a, b| leaderboard_order(a, b))
        .enumerate()
        .scan(
            (1u32, None::<u64>),
            |(current_rank, previous_score), (position, row)| {
                if previous_score.map_or(false, |previous| previous != row.score) {
                    *current_rank = position as u32 + 1;
                }
                *previous_score = Some(row.score);
                Some(RankAssignment {
                    id: row.id,
                    rank: *current_rank,
                })
            },
        )
        .collect()
}
