//! Playback timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use storyfeed_core::clock::Clock;
use storyfeed_core::scheduler::{CancelToken, Scheduler};

use crate::domain::playback::{elapsed_since, progress};

/// One progress tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Time played so far.
    pub elapsed: Duration,
    /// `elapsed` as a percentage of the story duration, capped at 100.
    pub progress: f64,
}

/// Drives one story's progress from a fixed start instant.
///
/// Each tick recomputes elapsed time from the clock, so the completion
/// instant does not depend on how regularly ticks arrive. `on_complete`
/// runs at most once, on the first tick at or past the duration; later
/// ticks are ignored. Dropping the timer stops it.
#[derive(Debug)]
pub struct PlaybackTimer {
    token: CancelToken,
    started_at: DateTime<Utc>,
}

impl PlaybackTimer {
    /// Starts ticking every `period` for a story lasting `duration`, with
    /// `already_played` counted as elapsed.
    #[must_use]
    pub fn start(
        scheduler: &dyn Scheduler,
        clock: Arc<dyn Clock>,
        period: Duration,
        duration: Duration,
        already_played: Duration,
        mut on_tick: impl FnMut(Tick) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        let offset = chrono::Duration::from_std(already_played).unwrap_or_else(|_| {
            chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero())
        });
        let started_at = clock.now() - offset;
        let mut on_complete = Some(on_complete);
        let token = scheduler.start(
            period,
            Box::new(move || {
                if on_complete.is_none() {
                    return;
                }
                let elapsed = elapsed_since(started_at, clock.now());
                on_tick(Tick {
                    elapsed,
                    progress: progress(elapsed, duration),
                });
                if elapsed >= duration {
                    if let Some(done) = on_complete.take() {
                        done();
                    }
                }
            }),
        );
        Self { token, started_at }
    }

    /// Time played at `now`.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        elapsed_since(self.started_at, now)
    }

    /// Stops the timer. Idempotent.
    pub fn stop(&mut self) {
        self.token.cancel();
    }
}
