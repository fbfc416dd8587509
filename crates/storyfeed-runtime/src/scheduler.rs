//! Scheduler backed by tokio timers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use storyfeed_core::scheduler::{CancelToken, Scheduler, TickFn};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::RuntimeError;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runs every timer as a task on a tokio runtime. Cancelling the token
/// aborts the task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedules onto `handle`.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedules onto the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Config` when called outside a tokio runtime.
    pub fn current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| RuntimeError::Config(format!("no tokio runtime: {e}")))
    }
}

impl Scheduler for TokioScheduler {
    fn start(&self, period: Duration, mut on_tick: TickFn) -> CancelToken {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                on_tick();
            }
        });
        CancelToken::new(cancelled, move || task.abort())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting() -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        (
            count,
            Box::new(move || {
                ticks.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period_after_start() {
        // Arrange
        let scheduler = TokioScheduler::current().unwrap();
        let (count, on_tick) = counting();

        // Act
        let _token = scheduler.start(Duration::from_millis(100), on_tick);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let before_first_period = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Assert
        assert_eq!(before_first_period, 0);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let scheduler = TokioScheduler::current().unwrap();
        let (count, on_tick) = counting();
        let mut token = scheduler.start(Duration::from_millis(100), on_tick);
        tokio::time::sleep(Duration::from_millis(150)).await;

        token.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(token.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_token_stops_ticks() {
        let scheduler = TokioScheduler::current().unwrap();
        let (count, on_tick) = counting();

        drop(scheduler.start(Duration::from_millis(100), on_tick));
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_current_fails_outside_runtime() {
        assert!(TokioScheduler::current().is_err());
    }
}
