use crate::core::models::{
    DisplayInfo, EntryId, EventId, RankAssignment, ScoreEntry, ScoreRow, UserId,
};
use crate::error::BoardResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable (event, user) -> score mapping behind the leaderboard.
///
/// Implementations report unreachable backends and rejected reads/writes as
/// `BoardError::Persistence`. A single row must be readable right after it was
/// written.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert or overwrite the score of `user_id` in `event_id`. New rows get rank 0.
    async fn upsert_row(
        &self,
        event_id: EventId,
        user_id: UserId,
        score: u64,
        at: DateTime<Utc>,
    ) -> BoardResult<EntryId>;

    async fn list_rows(&self, event_id: EventId) -> BoardResult<Vec<ScoreRow>>;

    /// Apply every assignment or none of them.
    async fn batch_update_ranks(&self, ranks: &[RankAssignment]) -> BoardResult<()>;

    async fn get_entry(&self, id: EntryId) -> BoardResult<Option<ScoreEntry>>;

    async fn list_entries(&self, event_id: EventId) -> BoardResult<Vec<ScoreEntry>>;

    /// Every event holding at least one entry.
    async fn event_ids(&self) -> BoardResult<Vec<EventId>>;
}

#[async_trait]
pub trait EventLookup: Send + Sync {
    async fn event_exists(&self, event_id: EventId) -> BoardResult<bool>;
}

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn display_info(&self, user_id: UserId) -> BoardResult<Option<DisplayInfo>>;
}
