//! Line-oriented operator console: parses `!commands`, runs them against the
//! leaderboard service and renders the answer with the message templates.

use crate::{
    cache::{
        keys::{CacheFamily, CacheKeys},
        ManagedCache, TtlCache,
    },
    config::Settings,
    core::{
        commands::{Command, PagingBounds},
        display,
        leaderboard::{LeaderboardCache, LeaderboardService},
        models::EventSummary,
        pagination::{PageRequest, Paginated},
        templates::MessageTemplate,
    },
    error::{BoardError, BoardResult},
    storage::MemoryStore,
    utils::format_rank,
};
use minijinja::context;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

pub type EventsCache = TtlCache<Paginated<EventSummary>>;

pub struct Console {
    store: MemoryStore,
    leaderboard: Arc<LeaderboardService>,
    leaderboard_cache: Arc<LeaderboardCache>,
    events_cache: Arc<EventsCache>,
    events_ttl: Duration,
    bounds: PagingBounds,
}

impl Console {
    pub fn new(
        store: MemoryStore,
        leaderboard: Arc<LeaderboardService>,
        leaderboard_cache: Arc<LeaderboardCache>,
        events_cache: Arc<EventsCache>,
        settings: &Settings,
    ) -> Self {
        Console {
            store,
            leaderboard,
            leaderboard_cache,
            events_cache,
            events_ttl: CacheFamily::Events.ttl(settings),
            bounds: PagingBounds {
                default_limit: settings.pagination_default_limit,
                max_limit: settings.pagination_max_limit,
            },
        }
    }

    /// Caches owned by the console, for the scheduler sweep job.
    pub fn caches(&self) -> Vec<Arc<dyn ManagedCache>> {
        vec![
            self.leaderboard_cache.clone() as Arc<dyn ManagedCache>,
            self.events_cache.clone() as Arc<dyn ManagedCache>,
        ]
    }

    /// Answer to one input line. `None` when the line is not a command.
    pub async fn handle(&self, line: &str) -> Option<String> {
        if !Command::is_command(line) {
            return None;
        }
        info!("Received command `{}`", line.trim());

        let answer = match Command::parse(line, self.bounds) {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };
        match answer {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Command `{}` failed. {e}", line.trim());
                let text = MessageTemplate::Error
                    .render(context! { error => e.to_string() })
                    .unwrap_or_else(|_| e.to_string());
                Some(text)
            }
        }
    }

    pub async fn execute(&self, command: Command) -> BoardResult<String> {
        match command {
            Command::Help => MessageTemplate::Help.render(context! {}),
            Command::CreateEvent(name) => {
                let event = self.store.create_event(&name)?;
                self.events_cache
                    .invalidate_pattern(&CacheFamily::Events.prefix());
                MessageTemplate::EventCreated.render(context! { name => event.name, id => event.id })
            }
            Command::ListEvents(request) => {
                let page = self.events_page(request).await?;
                MessageTemplate::EventList.render(context! {
                    events => display::events(&page.data),
                    page => page.pagination.page,
                    total_pages => page.pagination.total_pages,
                    total => page.pagination.total,
                })
            }
            Command::CreateProfile(name) => {
                let id = self.store.create_profile(&name, None)?;
                MessageTemplate::ProfileCreated.render(context! { name, id })
            }
            Command::SubmitScore(event_id, user_id, score) => {
                let entry = self.leaderboard.upsert(event_id, user_id, score).await?;
                MessageTemplate::ScoreRecorded.render(context! {
                    score => entry.score,
                    user_id => entry.user_id,
                    rank => format_rank(entry.rank),
                })
            }
            Command::ShowLeaderboard(event_id, request) => {
                let page = self.leaderboard.list_page(event_id, &request).await?;
                MessageTemplate::Leaderboard.render(context! {
                    leaderboard => display::leaderboard(&page.data),
                    page => page.pagination.page,
                    total_pages => page.pagination.total_pages,
                    total => page.pagination.total,
                })
            }
            Command::CacheStats => {
                let caches = self
                    .caches()
                    .iter()
                    .map(|c| (c.cache_name().to_string(), c.cache_stats()))
                    .collect::<Vec<_>>();
                MessageTemplate::CacheStats.render(context! { caches })
            }
            Command::ClearCaches => {
                self.caches().iter().for_each(|c| c.clear_entries());
                MessageTemplate::CachesCleared.render(context! {})
            }
        }
    }

    async fn events_page(&self, request: PageRequest) -> BoardResult<Paginated<EventSummary>> {
        let key = CacheKeys::events(None, Some(request.page), Some(request.limit));
        self.events_cache
            .get_or_compute(
                &key,
                || async {
                    let events = self.store.list_events()?;
                    Ok::<_, BoardError>(Paginated::from_items(&events, &request))
                },
                Some(self.events_ttl),
            )
            .await
    }
}
