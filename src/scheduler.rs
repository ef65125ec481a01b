//! Periodic refresh trigger.
//!
//! The scheduler task only emits [`Tick`]s; the app loop receives them and
//! runs the refresh itself, so all state stays on one task. The task lives
//! until [`PollingScheduler::stop`] is called or the scheduler is dropped.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub seq: u64,
    pub at: Instant,
}

pub struct PollingScheduler {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    /// Spawn the timer. The first tick arrives one full period after start.
    pub fn start(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let period = if period.is_zero() { DEFAULT_PERIOD } else { period };

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            // A slow refresh must not cause a burst of catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut seq = 0u64;
            loop {
                interval.tick().await;
                seq += 1;
                if tx.send(Tick { seq, at: Instant::now() }).is_err() {
                    tracing::debug!("Tick receiver dropped, scheduler exiting");
                    break;
                }
            }
        });

        tracing::info!("Polling scheduler started ({}s period)", period.as_secs_f64());
        (
            Self {
                period,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Polling scheduler stopped");
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_emits_ticks_in_sequence() {
        let (scheduler, mut rx) = PollingScheduler::start(Duration::from_millis(20));
        assert!(scheduler.is_running());

        let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        let second = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert!(second.at >= first.at);
    }

    #[tokio::test]
    async fn test_stop_closes_the_channel() {
        let (mut scheduler, mut rx) = PollingScheduler::start(Duration::from_millis(20));
        timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        // Drain anything sent before the abort; afterwards the sender is gone.
        let closed = timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn test_drop_stops_the_task() {
        let (scheduler, mut rx) = PollingScheduler::start(Duration::from_millis(20));
        drop(scheduler);

        let closed = timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn test_zero_period_falls_back_to_default() {
        let (scheduler, _rx) = PollingScheduler::start(Duration::ZERO);
        assert_eq!(scheduler.period(), DEFAULT_PERIOD);
    }
}
