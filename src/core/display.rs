use crate::{
    core::models::{EventSummary, LeaderboardRow},
    utils::format_rank,
};
use itertools::Itertools;

fn participant_name(row: &LeaderboardRow) -> String {
    match &row.user {
        Some(info) => info.display_name.clone(),
        None => format!("(anonymous user #{})", row.entry.user_id),
    }
}

// Display leaderboard rows, already in rank order
pub fn leaderboard(rows: &[LeaderboardRow]) -> String {
    let names = rows.iter().map(participant_name).collect::<Vec<String>>();

    // calculate width for positions, "1st", "12th", ...
    let width_pos = rows
        .iter()
        .map(|row| format_rank(row.entry.rank).len())
        .max()
        .unwrap_or_default();

    // calculate width for names
    let width_name = names.iter().map(|n| n.len()).max().unwrap_or_default();

    // calculate width for scores
    let width_score = rows
        .iter()
        .map(|row| row.entry.score.to_string().len())
        .max()
        .unwrap_or_default();

    rows.iter()
        .zip(names.iter())
        .map(|(row, name)| {
            format!(
                "{:>width_pos$}) {:<width_name$} {:>width_score$}",
                format_rank(row.entry.rank),
                name,
                row.entry.score,
            )
        })
        .join("\n")
}

// Display event catalog page
pub fn events(events: &[EventSummary]) -> String {
    let width_name = events.iter().map(|e| e.name.len()).max().unwrap_or_default();

    events
        .iter()
        .map(|event| {
            format!(
                "{:<width_name$}  {}  (since {})",
                event.name,
                event.id,
                event.created_at.format("%Y-%m-%d %H:%M")
            )
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DisplayInfo, ScoreEntry};
    use chrono::Utc;
    use uuid::Uuid;

    fn row(rank: u32, score: u64, name: Option<&str>) -> LeaderboardRow {
        LeaderboardRow {
            entry: ScoreEntry {
                id: Uuid::new_v4(),
                event_id: Uuid::nil(),
                user_id: Uuid::nil(),
                score,
                rank,
                updated_at: Utc::now(),
            },
            user: name.map(|n| DisplayInfo {
                display_name: n.to_string(),
                avatar_ref: None,
            }),
        }
    }

    #[test]
    fn aligns_columns() {
        let rows = vec![
            row(1, 80, Some("ada")),
            row(1, 80, Some("grace")),
            row(3, 5, Some("linus")),
        ];
        assert_eq!(
            leaderboard(&rows),
            "1st) ada   80\n1st) grace 80\n3rd) linus  5"
        );
    }

    #[test]
    fn unknown_participants_and_pending_ranks() {
        let rows = vec![row(0, 7, None)];
        assert_eq!(
            leaderboard(&rows),
            format!("-) (anonymous user #{}) 7", Uuid::nil())
        );
        assert_eq!(leaderboard(&[]), "");
    }
}
