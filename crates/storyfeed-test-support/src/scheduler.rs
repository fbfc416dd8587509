//! Test scheduler — a virtual-time `Scheduler` for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storyfeed_core::scheduler::{CancelToken, Scheduler, TickFn};

use crate::clock::ManualClock;

struct TimerEntry {
    period: Duration,
    next_due: Duration,
    cancelled: Arc<AtomicBool>,
    task: Arc<Mutex<TickFn>>,
}

#[derive(Default)]
struct SchedulerState {
    elapsed: Duration,
    timers: Vec<TimerEntry>,
}

/// A scheduler whose timers fire only inside [`ManualScheduler::advance`].
///
/// Virtual time and the paired [`ManualClock`] move together: each due timer
/// fires with the clock set to its due instant, in due order. Timers started
/// from inside a callback are scheduled relative to that instant.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<SchedulerState>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have not been cancelled.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn active_timers(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .timers
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Advance virtual time by `by`, firing every timer that comes due and
    /// moving `clock` in lock step.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn advance(&self, clock: &ManualClock, by: Duration) {
        let target = self.state.lock().unwrap().elapsed + by;
        loop {
            let due = {
                let mut state = self.state.lock().unwrap();
                state.timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                let next = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.next_due <= target)
                    .min_by_key(|(_, t)| t.next_due)
                    .map(|(index, _)| index);
                next.map(|index| {
                    let entry = &mut state.timers[index];
                    let due_at = entry.next_due;
                    entry.next_due += entry.period;
                    let task = Arc::clone(&entry.task);
                    let cancelled = Arc::clone(&entry.cancelled);
                    let delta = due_at - state.elapsed;
                    state.elapsed = due_at;
                    (delta, task, cancelled)
                })
            };
            let Some((delta, task, cancelled)) = due else {
                break;
            };
            clock.advance(delta);
            if !cancelled.load(Ordering::SeqCst) {
                let mut tick = task.lock().unwrap();
                (&mut **tick)();
            }
        }
        let rest = {
            let mut state = self.state.lock().unwrap();
            let rest = target - state.elapsed;
            state.elapsed = target;
            rest
        };
        clock.advance(rest);
    }
}

impl Scheduler for ManualScheduler {
    fn start(&self, period: Duration, on_tick: TickFn) -> CancelToken {
        let period = period.max(Duration::from_millis(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.state.lock().unwrap();
        let next_due = state.elapsed + period;
        state.timers.push(TimerEntry {
            period,
            next_due,
            cancelled: Arc::clone(&cancelled),
            task: Arc::new(Mutex::new(on_tick)),
        });
        CancelToken::new(cancelled, || {})
    }
}
