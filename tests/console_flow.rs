use hackboard::cache::keys::CacheFamily;
use hackboard::config::Settings;
use hackboard::console::{Console, EventsCache};
use hackboard::core::leaderboard::{LeaderboardCache, LeaderboardService};
use hackboard::storage::MemoryStore;

use regex::Regex;
use std::sync::Arc;

fn console() -> Console {
    let settings = Settings::default();
    let store = MemoryStore::new();
    let leaderboard_cache = Arc::new(LeaderboardCache::new(
        "leaderboard",
        settings.cache_default_ttl(),
    ));
    let leaderboard = Arc::new(LeaderboardService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        leaderboard_cache.clone(),
        CacheFamily::Leaderboard.ttl(&settings),
    ));
    let events_cache = Arc::new(EventsCache::new("events", settings.cache_default_ttl()));
    Console::new(store, leaderboard, leaderboard_cache, events_cache, &settings)
}

fn registered_id(answer: &str) -> String {
    let uuid = Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap();
    uuid.find(answer).unwrap().as_str().to_string()
}

async fn run(console: &Console, line: &str) -> String {
    console.handle(line).await.unwrap()
}

#[tokio::test]
async fn tied_scores_share_a_rank_end_to_end() {
    let console = console();
    let event = registered_id(&run(&console, "!event Spring Jam").await);

    let mut users = vec![];
    for name in ["ada", "grace", "linus", "margaret"] {
        users.push(registered_id(&run(&console, &format!("!profile {name}")).await));
    }

    for (user, score) in users.iter().zip([50, 80, 80, 30]) {
        let answer = run(&console, &format!("!score {event} {user} {score}")).await;
        assert!(answer.starts_with("📣 Score"), "{answer}");
    }

    let board = run(&console, &format!("!leaderboard {event}")).await;
    let ranks = board
        .lines()
        .filter_map(|line| line.trim_start_matches("```").split(')').next())
        .filter(|rank| rank.ends_with("st") || rank.ends_with("rd") || rank.ends_with("th"))
        .map(|rank| rank.to_string())
        .collect::<Vec<String>>();
    assert_eq!(ranks, vec!["1st", "1st", "3rd", "4th"]);
    assert!(board.contains("4 participants"));

    // lowering a score re-ranks everyone
    let answer = run(&console, &format!("!score {event} {} 40", users[1])).await;
    assert!(answer.ends_with("now ranked *3rd*"), "{answer}");
}

#[tokio::test]
async fn bad_input_never_stops_the_console() {
    let console = console();
    let event = registered_id(&run(&console, "!event Autumn Jam").await);
    let user = registered_id(&run(&console, "!profile ada").await);

    let answer = run(&console, &format!("!score {event} {user} -3")).await;
    assert!(answer.starts_with("🚨 Validation Error"), "{answer}");

    let answer = run(&console, "!score nope nope 3").await;
    assert!(answer.starts_with("🚨 Validation Error"), "{answer}");

    let answer = run(&console, &format!("!score {event} {user} 3")).await;
    assert!(answer.ends_with("now ranked *1st*"), "{answer}");

    let events = run(&console, "!events").await;
    assert!(events.contains("Autumn Jam"));
    assert!(run(&console, "!stats").await.contains("events: 1 entries"));
}
