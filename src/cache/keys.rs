use crate::config::Settings;
use std::time::Duration;
use strum::{Display, EnumIter};
use uuid::Uuid;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 20;

/// Families of cached reads. The family prefix is what writes invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CacheFamily {
    Sponsors,
    Events,
    Event,
    Leaderboard,
    Resources,
    Profile,
}

impl CacheFamily {
    /// Prefix shared by every key of the family, e.g. `events:`.
    pub fn prefix(&self) -> String {
        format!("{}:", self)
    }

    pub fn ttl(&self, settings: &Settings) -> Duration {
        let millis = match self {
            CacheFamily::Sponsors => settings.sponsors_ttl_ms,
            CacheFamily::Events | CacheFamily::Event => settings.events_ttl_ms,
            CacheFamily::Leaderboard => settings.leaderboard_ttl_ms,
            CacheFamily::Resources => settings.resources_ttl_ms,
            CacheFamily::Profile => settings.profile_ttl_ms,
        };
        Duration::from_millis(millis)
    }
}

/// Key builders, so that every reader and every invalidation agree on key shapes.
///
/// The console only reads `events` and `leaderboard` keys. The sponsors, event,
/// resources and profile builders cover the other families, so read endpoints
/// layered on this crate share the same layout and the same prefix invalidation.
pub struct CacheKeys;

impl CacheKeys {
    pub fn sponsors() -> String {
        format!("{}list", CacheFamily::Sponsors.prefix())
    }

    pub fn events(status: Option<&str>, page: Option<u32>, limit: Option<u32>) -> String {
        format!(
            "{}list:{}:{}:{}",
            CacheFamily::Events.prefix(),
            status.unwrap_or("all"),
            page.unwrap_or(DEFAULT_PAGE),
            limit.unwrap_or(DEFAULT_LIMIT)
        )
    }

    pub fn event(id: &Uuid) -> String {
        format!("{}{}", CacheFamily::Event.prefix(), id)
    }

    pub fn leaderboard(event_id: &Uuid) -> String {
        format!("{}{}", CacheFamily::Leaderboard.prefix(), event_id)
    }

    pub fn resources(category: Option<&str>, page: Option<u32>, limit: Option<u32>) -> String {
        format!(
            "{}list:{}:{}:{}",
            CacheFamily::Resources.prefix(),
            category.unwrap_or("all"),
            page.unwrap_or(DEFAULT_PAGE),
            limit.unwrap_or(DEFAULT_LIMIT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_follow_family_prefixes() {
        let id = Uuid::nil();
        assert_eq!(CacheKeys::sponsors(), "sponsors:list");
        assert_eq!(
            CacheKeys::event(&id),
            "event:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            CacheKeys::leaderboard(&id),
            "leaderboard:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            CacheKeys::resources(Some("workshops"), Some(3), Some(10)),
            "resources:list:workshops:3:10"
        );
    }

    #[test]
    fn single_event_prefix_does_not_match_event_lists() {
        assert!(!CacheKeys::events(None, None, None).contains(&CacheFamily::Event.prefix()));
    }

    #[test]
    fn every_family_has_a_ttl() {
        let settings = Settings::default();
        for family in CacheFamily::iter() {
            assert!(family.ttl(&settings) > Duration::ZERO, "{family}");
        }
        assert_eq!(
            CacheFamily::Leaderboard.ttl(&settings),
            Duration::from_secs(30)
        );
    }
}
