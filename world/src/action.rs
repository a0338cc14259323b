//! Cancellable timed actions driven by simulated time.

use std::time::Duration;

/// Single slot holding at most one in-flight timed action.
///
/// Starting a new action cancels whatever the slot was running and restarts
/// the clock from zero; the superseded payload is dropped, never queued.
#[derive(Clone, Debug)]
pub struct ActionSlot<T> {
    duration: Duration,
    elapsed: Duration,
    payload: Option<T>,
}

impl<T> ActionSlot<T> {
    /// Creates a slot with nothing in flight.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            payload: None,
        }
    }

    /// Schedules `payload` to complete after `duration` of simulated time.
    ///
    /// Returns `true` when an in-flight action was superseded.
    pub fn start(&mut self, duration: Duration, payload: T) -> bool {
        let superseded = self.payload.replace(payload).is_some();
        self.duration = duration;
        self.elapsed = Duration::ZERO;
        superseded
    }

    /// Progresses the in-flight action, yielding its payload once it completes.
    ///
    /// A zero-length action completes on the first advance after it started.
    pub fn advance(&mut self, dt: Duration) -> Option<T> {
        if self.payload.is_none() {
            return None;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.duration {
            return None;
        }

        self.elapsed = Duration::ZERO;
        self.payload.take()
    }

    /// Aborts the in-flight action, returning its payload.
    pub fn cancel(&mut self) -> Option<T> {
        self.elapsed = Duration::ZERO;
        self.payload.take()
    }

    /// Whether an action is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.payload.is_some()
    }
}

impl<T> Default for ActionSlot<T> {
    fn default() -> Self {
        Self::idle()
    }
}
