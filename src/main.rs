use hackboard::cache::keys::CacheFamily;
use hackboard::cli::Cli;
use hackboard::config::Settings;
use hackboard::console::{Console, EventsCache};
use hackboard::core::leaderboard::{LeaderboardCache, LeaderboardService};
use hackboard::scheduler::{JobProcess, Scheduler};
use hackboard::storage::MemoryStore;

use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    // Logs go to stderr, stdout is the console output.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let store = MemoryStore::new();
    let leaderboard_cache = Arc::new(LeaderboardCache::new(
        "leaderboard",
        settings.cache_default_ttl(),
    ));
    let events_cache = Arc::new(EventsCache::new("events", settings.cache_default_ttl()));

    let leaderboard = Arc::new(LeaderboardService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        leaderboard_cache.clone(),
        CacheFamily::Leaderboard.ttl(&settings),
    ));
    let console = Console::new(
        store,
        leaderboard.clone(),
        leaderboard_cache,
        events_cache,
        &settings,
    );

    let mut sched = Scheduler::new(console.caches(), leaderboard).await?;

    let mut jobs = vec![JobProcess::SweepCaches(&settings.cache_sweep_schedule)];
    if let Some(schedule) = &settings.rank_reconcile_schedule {
        jobs.push(JobProcess::ReconcileRanks(schedule));
    }
    for job in jobs {
        sched.add_job(job).await?;
    }
    sched.start().await?;

    info!("Console ready, type !help for the list of commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if let Some(answer) = console.handle(&line).await {
            stdout.write_all(answer.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    sched.shutdown().await?;
    Ok(())
}
