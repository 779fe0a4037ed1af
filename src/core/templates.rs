use crate::error::BoardResult;
use minijinja::{Environment, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{error, info};

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();

    // Use strum to iterate over the variants of the enum.
    for template in MessageTemplate::iter() {
        if let Err(e) = env.add_template(template.name(), template.template()) {
            error!("Could not load template {}. {e}", template.name());
        }
    }

    info!("Templates loaded in templating engine environment.");

    env
});

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum MessageTemplate {
    Help,
    EventCreated,
    EventList,
    ProfileCreated,
    ScoreRecorded,
    Leaderboard,
    CacheStats,
    CachesCleared,
    Error,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Help => "help.txt",
            MessageTemplate::EventCreated => "event_created.txt",
            MessageTemplate::EventList => "event_list.txt",
            MessageTemplate::ProfileCreated => "profile_created.txt",
            MessageTemplate::ScoreRecorded => "score_recorded.txt",
            MessageTemplate::Leaderboard => "leaderboard.txt",
            MessageTemplate::CacheStats => "cache_stats.txt",
            MessageTemplate::CachesCleared => "caches_cleared.txt",
            MessageTemplate::Error => "error.txt",
        }
    }

    pub fn get(&self) -> BoardResult<Template<'static, 'static>> {
        Ok(TEMPLATES_ENVIRONMENT.get_template(self.name())?)
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> BoardResult<String> {
        Ok(self.get()?.render(ctx)?)
    }

    pub fn template(&self) -> &'static str {
        // \n\ at each code line end creates a line break at the proper position and discards further spaces in this line of code.
        // \x20 (hex; 32 in decimal) is an ASCII space and an indicator for the first space to be preserved in this line of the string.
        match self {
            MessageTemplate::Help => {
                "🗒️ Leaderboard console commands.\n\n\
                👉 ```!event <name>```\n\
                \x20  Register a new event and print its id.\n\
                👉 ```!events [page] [limit]```\n\
                \x20  Registered events, oldest first.\n\
                👉 ```!profile <display name>```\n\
                \x20  Register a participant and print its id.\n\
                👉 ```!score <event id> <user id> <score>```\n\
                \x20  Create or overwrite a score. The whole event is re-ranked.\n\
                👉 ```!leaderboard <event id> [page] [limit]```\n\
                \x20  Standings of an event. Tied scores share a rank.\n\
                👉 ```!stats```\n\
                \x20  Cache statistics.\n\
                👉 ```!clear```\n\
                \x20  Drop every cached entry."
            }
            MessageTemplate::EventCreated => {
                "🎉 Event *{{ name }}* registered with id {{ id }}"
            }
            MessageTemplate::EventList => {
                "{%- if events -%}
                    📅 Events (page {{ page }}/{{ total_pages }}, {{ total }} in total):\n\
                ```{{ events }}```
                {%- else -%}
                    📅 No event on page {{ page }} ({{ total }} in total).
                {%- endif -%}"
            }
            MessageTemplate::ProfileCreated => {
                "🕺 Participant *{{ name }}* registered with id {{ id }}"
            }
            MessageTemplate::ScoreRecorded => {
                "📣 Score *{{ score }}* recorded for {{ user_id }}, now ranked *{{ rank }}*"
            }
            MessageTemplate::Leaderboard => {
                "{%- if leaderboard -%}
                    📓 Leaderboard (page {{ page }}/{{ total_pages }}, {{ total }} participants):\n\
                ```{{ leaderboard }}```
                {%- else -%}
                    📓 Nobody on page {{ page }} of this leaderboard ({{ total }} participants).
                {%- endif -%}"
            }
            MessageTemplate::CacheStats => {
                "🗄️ Cache statistics:\
                {%- for (name, stats) in caches %}\n\
                \x20 • {{ name }}: {{ stats.entries }} entries, {{ stats.in_flight }} in flight\
                {%- endfor %}"
            }
            MessageTemplate::CachesCleared => "🧹 Caches cleared.",
            MessageTemplate::Error => "🚨 {{ error }}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn every_template_is_loaded() {
        for template in MessageTemplate::iter() {
            assert!(template.get().is_ok(), "{} did not load", template.name());
        }
    }

    #[test]
    fn renders_score_and_error() {
        let text = MessageTemplate::ScoreRecorded
            .render(context! { score => 80, user_id => "u-1", rank => "1st" })
            .unwrap();
        assert_eq!(text, "📣 Score *80* recorded for u-1, now ranked *1st*");

        let text = MessageTemplate::Error
            .render(context! { error => "Not Found: event 42" })
            .unwrap();
        assert_eq!(text, "🚨 Not Found: event 42");
    }

    #[test]
    fn renders_cache_stats_lines() {
        let text = MessageTemplate::CacheStats
            .render(context! {
                caches => vec![("leaderboard", context! { entries => 2, in_flight => 0 })],
            })
            .unwrap();
        assert!(text.starts_with("🗄️ Cache statistics:"));
        assert!(text.contains("• leaderboard: 2 entries, 0 in flight"));
    }

    #[test]
    fn empty_leaderboard_page_has_its_own_wording() {
        let text = MessageTemplate::Leaderboard
            .render(context! { leaderboard => "", page => 2, total_pages => 1, total => 3 })
            .unwrap();
        assert!(text.contains("Nobody on page 2"));
    }
}
