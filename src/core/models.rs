use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EventId = Uuid;
pub type UserId = Uuid;
pub type EntryId = Uuid;

/// Score of one participant in one event. Unique per (event_id, user_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: EntryId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub score: u64,
    // 1-indexed. 0 only while a fresh row waits for its first recompute.
    pub rank: u32,
    pub updated_at: DateTime<Utc>,
}

/// Minimal projection of an entry fed to the rank calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRow {
    pub id: EntryId,
    pub score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankAssignment {
    pub id: EntryId,
    pub rank: u32,
}

/// Participant data joined into leaderboard listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub display_name: String,
    pub avatar_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    #[serde(flatten)]
    pub entry: ScoreEntry,
    // None when the profile lookup failed or knows nothing about the user
    pub user: Option<DisplayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ScoreEntry> for ScoreRow {
    fn from(entry: &ScoreEntry) -> Self {
        ScoreRow {
            id: entry.id,
            score: entry.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_row_serializes_flat() {
        let entry = ScoreEntry {
            id: Uuid::nil(),
            event_id: Uuid::nil(),
            user_id: Uuid::nil(),
            score: 42,
            rank: 1,
            updated_at: Utc::now(),
        };
        let row = LeaderboardRow {
            entry,
            user: Some(DisplayInfo {
                display_name: "ada".to_string(),
                avatar_ref: None,
            }),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["score"], 42);
        assert_eq!(json["rank"], 1);
        assert_eq!(json["user"]["display_name"], "ada");
        assert!(json.get("entry").is_none());
    }
}
