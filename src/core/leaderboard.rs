use crate::{
    cache::{keys::CacheKeys, TtlCache},
    core::{
        models::{EventId, LeaderboardRow, ScoreEntry, UserId},
        pagination::{PageRequest, Paginated},
        ranking::competition_ranks,
        store::{EventLookup, ProfileLookup, ScoreStore},
    },
    error::{BoardError, BoardResult},
};
use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use itertools::Itertools;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub type LeaderboardCache = TtlCache<Vec<LeaderboardRow>>;

/// Upsert-then-recompute leaderboard on top of a [`ScoreStore`].
///
/// Every write to an event runs under that event's lock: the score upsert, the
/// full rank recompute and the refetch can not interleave with another writer of
/// the same event, so ranks are always derived from a complete snapshot.
/// Different events do not contend.
///
/// The score write and the rank write are two store calls. When the second one
/// fails the new score is kept, ranks of the event stay stale (a new entry keeps
/// rank 0) and the caller gets the persistence error. The next successful upsert
/// on the event, [`LeaderboardService::recalculate`] or
/// [`LeaderboardService::reconcile_all`] repairs them.
pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
    events: Arc<dyn EventLookup>,
    profiles: Arc<dyn ProfileLookup>,
    cache: Arc<LeaderboardCache>,
    cache_ttl: Duration,
    event_locks: DashMap<EventId, Arc<Mutex<()>>>,
}

impl LeaderboardService {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        events: Arc<dyn EventLookup>,
        profiles: Arc<dyn ProfileLookup>,
        cache: Arc<LeaderboardCache>,
        cache_ttl: Duration,
    ) -> Self {
        LeaderboardService {
            store,
            events,
            profiles,
            cache,
            cache_ttl,
            event_locks: DashMap::new(),
        }
    }

    /// Create or overwrite the score of `user_id` in `event_id`, then re-rank the whole event.
    pub async fn upsert(
        &self,
        event_id: EventId,
        user_id: UserId,
        score: i64,
    ) -> BoardResult<ScoreEntry> {
        let score = u64::try_from(score).map_err(|_| {
            BoardError::Validation(format!("score must be a non-negative integer, got {score}"))
        })?;

        if !self.events.event_exists(event_id).await? {
            return Err(BoardError::NotFound(format!("event {event_id}")));
        }

        let lock = self.lock_for(event_id);
        let _writing = lock.lock().await;

        let entry_id = self
            .store
            .upsert_row(event_id, user_id, score, Utc::now())
            .await?;

        let ranked = self.recalculate_locked(event_id).await;
        // the score changed either way
        self.cache.invalidate(&CacheKeys::leaderboard(&event_id));
        if let Err(e) = ranked {
            error!(%event_id, %entry_id, "score stored but ranks are stale. {e}");
            return Err(e);
        }

        self.store
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("leaderboard entry {entry_id}")))
    }

    /// Every entry of the event by rank, with participant display data. Cached.
    pub async fn list(&self, event_id: EventId) -> BoardResult<Vec<LeaderboardRow>> {
        self.cache
            .get_or_compute(
                &CacheKeys::leaderboard(&event_id),
                || self.load_rows(event_id),
                Some(self.cache_ttl),
            )
            .await
    }

    pub async fn list_page(
        &self,
        event_id: EventId,
        request: &PageRequest,
    ) -> BoardResult<Paginated<LeaderboardRow>> {
        let rows = self.list(event_id).await?;
        Ok(Paginated::from_items(&rows, request))
    }

    /// Recompute and persist the ranks of one event. Returns how many entries were ranked.
    pub async fn recalculate(&self, event_id: EventId) -> BoardResult<usize> {
        let lock = self.lock_for(event_id);
        let _writing = lock.lock().await;

        let ranked = self.recalculate_locked(event_id).await;
        self.cache.invalidate(&CacheKeys::leaderboard(&event_id));
        ranked
    }

    /// Recompute every event known to the store. Failing events are logged and skipped.
    /// Returns how many events were reconciled.
    pub async fn reconcile_all(&self) -> BoardResult<usize> {
        let event_ids = self.store.event_ids().await?;
        let mut reconciled = 0;
        for event_id in event_ids {
            match self.recalculate(event_id).await {
                Ok(_) => reconciled += 1,
                Err(e) => error!(%event_id, "could not reconcile ranks. {e}"),
            }
        }
        info!(reconciled, "rank reconciliation done");
        Ok(reconciled)
    }

    fn lock_for(&self, event_id: EventId) -> Arc<Mutex<()>> {
        self.event_locks
            .entry(event_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Caller must hold the event lock.
    async fn recalculate_locked(&self, event_id: EventId) -> BoardResult<usize> {
        let rows = self.store.list_rows(event_id).await?;
        let ranks = competition_ranks(&rows);
        if ranks.is_empty() {
            return Ok(0);
        }
        self.store.batch_update_ranks(&ranks).await?;
        debug!(%event_id, entries = ranks.len(), "ranks recalculated");
        Ok(ranks.len())
    }

    async fn load_rows(&self, event_id: EventId) -> BoardResult<Vec<LeaderboardRow>> {
        let entries = self
            .store
            .list_entries(event_id)
            .await?
            .into_iter()
            // entries still waiting for their first rank go last
            .sorted_by_key(|e| (e.rank == 0, e.rank, e.id))
            .collect::<Vec<ScoreEntry>>();

        let rows = join_all(entries.into_iter().map(|entry| async move {
            let user = match self.profiles.display_info(entry.user_id).await {
                Ok(user) => user,
                Err(e) => {
                    warn!(user_id = %entry.user_id, "profile lookup failed, listing without it. {e}");
                    None
                }
            };
            LeaderboardRow { entry, user }
        }))
        .await;

        Ok(rows)
    }
}
