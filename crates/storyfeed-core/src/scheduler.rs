//! Timer abstraction.
//!
//! Recurring work (the playback tick, the expiration sweep) is started
//! through a [`Scheduler`] and owned through the returned [`CancelToken`].
//! Dropping the token stops the timer, so a torn-down owner never leaves a
//! dangling callback behind.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Callback invoked on every tick of a repeating timer.
pub type TickFn = Box<dyn FnMut() + Send>;

/// Abstraction over repeating timers.
pub trait Scheduler: Send + Sync {
    /// Starts a timer that calls `on_tick` every `period` until the returned
    /// token is cancelled or dropped. The first call happens one `period`
    /// after start.
    fn start(&self, period: Duration, on_tick: TickFn) -> CancelToken;
}

/// Ownership handle for a running timer.
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelToken {
    /// Creates a token whose cancellation runs `on_cancel` exactly once.
    #[must_use]
    pub fn new(cancelled: Arc<AtomicBool>, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancelled,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// A token that controls nothing. Already cancelled.
    #[must_use]
    pub fn inert() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(true)),
            on_cancel: None,
        }
    }

    /// Stops the timer. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }

    /// Returns `true` once the timer has been stopped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for CancelToken {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn test_cancel_runs_hook_once() {
        // Arrange
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);
        let mut token = CancelToken::new(Arc::new(AtomicBool::new(false)), move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        });

        // Act
        token.cancel();
        token.cancel();
        drop(token);

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels_shared_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let token = CancelToken::new(Arc::clone(&flag), || {});

        assert!(!token.is_cancelled());
        drop(token);

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_inert_token_is_cancelled() {
        assert!(CancelToken::inert().is_cancelled());
    }
}
