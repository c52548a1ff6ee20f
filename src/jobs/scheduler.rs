use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Job;

// ============================================================================
// Scheduler - Fixed-Interval Triggers, Serialized per Trigger
// ============================================================================

/// Drives each registered job on its own fixed interval in its own task
/// loop. Because one loop runs one job, successive firings of the same
/// trigger are serialized: a tick that overruns its period delays the next
/// tick instead of racing it. Different triggers still run concurrently;
/// isolating their writes is the store's contract.
///
/// Shutdown is observed only between ticks: an in-flight tick always runs
/// to completion, so cancellation never lands mid-mutation.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    pub fn schedule(&mut self, job: Arc<dyn Job>, period: Duration) {
        let mut shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(job = job.name(), period_ms = period.as_millis() as u64, "Trigger scheduled");

            loop {
                tokio::select! {
                    _ = ticker.tick() => job.run().await,
                    _ = shutdown.changed() => {
                        tracing::debug!(job = job.name(), "Trigger stopped");
                        break;
                    }
                }
            }
        });

        self.handles.push(handle);
    }

    /// Signal every loop to stop and wait for in-flight ticks to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingJob {
        work: Duration,
        runs: AtomicU32,
        active: AtomicU32,
        max_active: AtomicU32,
    }

    #[async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.work).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_runs_repeatedly() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = Scheduler::new();
        scheduler.schedule(job.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(105)).await;
        scheduler.shutdown().await;

        assert!(job.runs.load(Ordering::SeqCst) >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_tick_never_overlaps_its_successor() {
        // Each tick takes 5x the period; the loop must delay, not stack.
        let job = Arc::new(CountingJob {
            work: Duration::from_millis(50),
            ..Default::default()
        });
        let mut scheduler = Scheduler::new();
        scheduler.schedule(job.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(500)).await;
        scheduler.shutdown().await;

        assert!(job.runs.load(Ordering::SeqCst) >= 2);
        assert_eq!(job.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_firing() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = Scheduler::new();
        scheduler.schedule(job.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(55)).await;
        scheduler.shutdown().await;
        let runs_at_shutdown = job.runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), runs_at_shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_triggers_run_concurrently() {
        let fast = Arc::new(CountingJob::default());
        let slow = Arc::new(CountingJob {
            work: Duration::from_millis(30),
            ..Default::default()
        });

        let mut scheduler = Scheduler::new();
        scheduler.schedule(fast.clone(), Duration::from_millis(10));
        scheduler.schedule(slow.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(200)).await;
        scheduler.shutdown().await;

        // The slow trigger does not starve the fast one.
        assert!(fast.runs.load(Ordering::SeqCst) > slow.runs.load(Ordering::SeqCst));
    }
}
