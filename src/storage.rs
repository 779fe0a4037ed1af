use crate::core::{
    models::{
        DisplayInfo, EntryId, EventId, EventSummary, RankAssignment, ScoreEntry, ScoreRow, UserId,
    },
    store::{EventLookup, ProfileLookup, ScoreStore},
};
use crate::error::{BoardError, BoardResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    entries: HashMap<EntryId, ScoreEntry>,
    by_event_user: HashMap<(EventId, UserId), EntryId>,
    events: HashMap<EventId, EventSummary>,
    profiles: HashMap<UserId, DisplayInfo>,
}

type SharedTables = Arc<Mutex<Tables>>;

/// In-memory backend: score store, event catalog and profile directory in one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: SharedTables,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn tables(&self) -> BoardResult<MutexGuard<'_, Tables>> {
        self.data
            .lock()
            .map_err(|e| BoardError::persistence("memory store lock", e))
    }

    pub fn create_event(&self, name: &str) -> BoardResult<EventSummary> {
        let event = EventSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.tables()?.events.insert(event.id, event.clone());
        Ok(event)
    }

    /// Oldest first.
    pub fn list_events(&self) -> BoardResult<Vec<EventSummary>> {
        Ok(self
            .tables()?
            .events
            .values()
            .cloned()
            .sorted_by_key(|e| (e.created_at, e.id))
            .collect())
    }

    pub fn create_profile(
        &self,
        display_name: &str,
        avatar_ref: Option<String>,
    ) -> BoardResult<UserId> {
        let user_id = Uuid::new_v4();
        self.tables()?.profiles.insert(
            user_id,
            DisplayInfo {
                display_name: display_name.to_string(),
                avatar_ref,
            },
        );
        Ok(user_id)
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn upsert_row(
        &self,
        event_id: EventId,
        user_id: UserId,
        score: u64,
        at: DateTime<Utc>,
    ) -> BoardResult<EntryId> {
        let mut tables = self.tables()?;
        let tables = &mut *tables;

        match tables.by_event_user.get(&(event_id, user_id)) {
            Some(id) => {
                let entry = tables.entries.get_mut(id).ok_or_else(|| {
                    BoardError::Persistence(format!("dangling index for entry {id}"))
                })?;
                entry.score = score;
                entry.updated_at = at;
                Ok(entry.id)
            }
            None => {
                let entry = ScoreEntry {
                    id: Uuid::new_v4(),
                    event_id,
                    user_id,
                    score,
                    rank: 0,
                    updated_at: at,
                };
                let id = entry.id;
                tables.by_event_user.insert((event_id, user_id), id);
                tables.entries.insert(id, entry);
                Ok(id)
            }
        }
    }

    async fn list_rows(&self, event_id: EventId) -> BoardResult<Vec<ScoreRow>> {
        Ok(self
            .tables()?
            .entries
            .values()
            .filter(|e| e.event_id == event_id)
            .map(ScoreRow::from)
            .collect())
    }

    async fn batch_update_ranks(&self, ranks: &[RankAssignment]) -> BoardResult<()> {
        let mut tables = self.tables()?;

        if let Some(unknown) = ranks.iter().find(|r| !tables.entries.contains_key(&r.id)) {
            return Err(BoardError::Persistence(format!(
                "cannot rank unknown entry {}",
                unknown.id
            )));
        }
        for assignment in ranks {
            if let Some(entry) = tables.entries.get_mut(&assignment.id) {
                entry.rank = assignment.rank;
            }
        }
        Ok(())
    }

    async fn get_entry(&self, id: EntryId) -> BoardResult<Option<ScoreEntry>> {
        Ok(self.tables()?.entries.get(&id).cloned())
    }

    async fn list_entries(&self, event_id: EventId) -> BoardResult<Vec<ScoreEntry>> {
        Ok(self
            .tables()?
            .entries
            .values()
            .filter(|e| e.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn event_ids(&self) -> BoardResult<Vec<EventId>> {
        Ok(self
            .tables()?
            .entries
            .values()
            .map(|e| e.event_id)
            .unique()
            .sorted()
            .collect())
    }
}

#[async_trait]
impl EventLookup for MemoryStore {
    async fn event_exists(&self, event_id: EventId) -> BoardResult<bool> {
        Ok(self.tables()?.events.contains_key(&event_id))
    }
}

#[async_trait]
impl ProfileLookup for MemoryStore {
    async fn display_info(&self, user_id: UserId) -> BoardResult<Option<DisplayInfo>> {
        Ok(self.tables()?.profiles.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_row_updates_in_place_per_event_and_user() {
        let store = MemoryStore::new();
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store.upsert_row(event, user, 10, Utc::now()).await.unwrap();
        let second = store.upsert_row(event, user, 25, Utc::now()).await.unwrap();
        assert_eq!(first, second);

        let rows = store.list_rows(event).await.unwrap();
        assert_eq!(rows, vec![ScoreRow { id: first, score: 25 }]);

        let entry = store.get_entry(first).await.unwrap().unwrap();
        assert_eq!(entry.rank, 0);
    }

    #[tokio::test]
    async fn same_user_in_two_events_gets_two_entries() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let a = store
            .upsert_row(Uuid::new_v4(), user, 1, Utc::now())
            .await
            .unwrap();
        let b = store
            .upsert_row(Uuid::new_v4(), user, 1, Utc::now())
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.event_ids().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn batch_update_is_all_or_nothing() {
        let store = MemoryStore::new();
        let event = Uuid::new_v4();
        let id = store
            .upsert_row(event, Uuid::new_v4(), 3, Utc::now())
            .await
            .unwrap();

        let result = store
            .batch_update_ranks(&[
                RankAssignment { id, rank: 1 },
                RankAssignment {
                    id: Uuid::new_v4(),
                    rank: 2,
                },
            ])
            .await;
        assert!(matches!(result, Err(BoardError::Persistence(_))));
        assert_eq!(store.get_entry(id).await.unwrap().unwrap().rank, 0);

        store
            .batch_update_ranks(&[RankAssignment { id, rank: 1 }])
            .await
            .unwrap();
        assert_eq!(store.get_entry(id).await.unwrap().unwrap().rank, 1);
    }

    #[tokio::test]
    async fn catalog_and_profiles() {
        let store = MemoryStore::new();
        let event = store.create_event("spring jam").unwrap();
        assert!(store.event_exists(event.id).await.unwrap());
        assert!(!store.event_exists(Uuid::new_v4()).await.unwrap());
        assert_eq!(store.list_events().unwrap(), vec![event]);

        let user = store
            .create_profile("grace", Some("avatars/grace.png".to_string()))
            .unwrap();
        let info = store.display_info(user).await.unwrap().unwrap();
        assert_eq!(info.display_name, "grace");
        assert_eq!(store.display_info(Uuid::new_v4()).await.unwrap(), None);
    }
}
