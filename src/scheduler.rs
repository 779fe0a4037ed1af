use tokio_cron_scheduler::{Job, JobScheduler};

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cache::ManagedCache;
use crate::core::leaderboard::LeaderboardService;
use crate::error::BoardResult;

/// Background maintenance: cache sweeps and rank reconciliation.
/// Jobs log their failures and never hand them back to request paths.
pub struct Scheduler {
    scheduler: JobScheduler,
    caches: Vec<Arc<dyn ManagedCache>>,
    leaderboard: Arc<LeaderboardService>,
}

pub enum JobProcess<'schedule> {
    SweepCaches(&'schedule str),
    ReconcileRanks(&'schedule str),
}

impl Scheduler {
    pub async fn new(
        caches: Vec<Arc<dyn ManagedCache>>,
        leaderboard: Arc<LeaderboardService>,
    ) -> BoardResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler {
            scheduler,
            caches,
            leaderboard,
        })
    }

    pub async fn add_job(&self, job_process: JobProcess<'_>) -> BoardResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::SweepCaches(schedule) => {
                sweep_caches_job(schedule, self.caches.clone()).await?
            }
            JobProcess::ReconcileRanks(schedule) => {
                reconcile_ranks_job(schedule, self.leaderboard.clone()).await?
            }
        };
        Ok(self.scheduler.add(job).await?)
    }

    pub async fn start(&self) -> BoardResult<()> {
        info!("Starting scheduler.");
        Ok(self.scheduler.start().await?)
    }

    pub async fn shutdown(&mut self) -> BoardResult<()> {
        info!("Stopping scheduler.");
        Ok(self.scheduler.shutdown().await?)
    }
}

//////////////////
// Jobs definition
//////////////////

async fn sweep_caches_job(schedule: &str, caches: Vec<Arc<dyn ManagedCache>>) -> BoardResult<Job> {
    let job = Job::new_async(schedule, move |uuid, mut l| {
        let caches = caches.clone();
        Box::pin(async move {
            let removed: usize = caches.iter().map(|cache| cache.sweep_expired()).sum();
            debug!(removed, caches = caches.len(), "cache sweep done");

            match l.next_tick_for_job(uuid).await {
                Ok(Some(ts)) => debug!("Next cache sweep at {:?}", ts),
                _ => error!("Could not get next tick for cache sweep job"),
            }
        })
    })?;
    Ok(job)
}

async fn reconcile_ranks_job(
    schedule: &str,
    leaderboard: Arc<LeaderboardService>,
) -> BoardResult<Job> {
    let job = Job::new_async(schedule, move |uuid, mut l| {
        let leaderboard = leaderboard.clone();
        Box::pin(async move {
            if let Err(e) = leaderboard.reconcile_all().await {
                error!("Could not reconcile leaderboard ranks. {e}");
            }

            match l.next_tick_for_job(uuid).await {
                Ok(Some(ts)) => info!("Next rank reconciliation at {:?}", ts),
                _ => error!("Could not get next tick for rank reconciliation job"),
            }
        })
    })?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::clock::ManualClock;
    use crate::core::leaderboard::LeaderboardCache;
    use crate::error::BoardError;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    fn leaderboard() -> Arc<LeaderboardService> {
        let store = MemoryStore::new();
        Arc::new(LeaderboardService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(LeaderboardCache::new("leaderboard", Duration::from_secs(30))),
            Duration::from_secs(30),
        ))
    }

    #[tokio::test]
    async fn invalid_schedule_is_a_scheduler_error() {
        let scheduler = Scheduler::new(vec![], leaderboard()).await.unwrap();
        let error = scheduler
            .add_job(JobProcess::SweepCaches("every now and then"))
            .await
            .unwrap_err();
        assert!(matches!(error, BoardError::Scheduler(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn sweep_job_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(TtlCache::<String>::with_clock(
            "sponsors",
            Duration::from_millis(100),
            clock.clone(),
        ));
        cache.set("sponsors:list", "acme".to_string(), None);
        clock.advance(Duration::from_secs(1));

        let mut scheduler = Scheduler::new(vec![cache.clone() as Arc<dyn ManagedCache>], leaderboard())
            .await
            .unwrap();
        scheduler
            .add_job(JobProcess::SweepCaches("* * * * * *"))
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        scheduler.shutdown().await.unwrap();

        assert_eq!(cache.stats().entries, 0);
    }
}
