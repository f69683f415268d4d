/// Trailing-edge debounce for terminal resize events.
///
/// Each new event restarts the quiet period; only the last width of a burst
/// is delivered once the period elapses. Time is passed in by the caller so
/// the debouncer never sleeps.
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(Instant, u16)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a resize to `width` observed at `now`.
    pub fn push(&mut self, now: Instant, width: u16) {
        self.pending = Some((now, width));
    }

    /// The settled width, if the quiet period has passed since the last event.
    pub fn poll(&mut self, now: Instant) -> Option<u16> {
        match self.pending {
            Some((at, width)) if now.duration_since(at) >= self.delay => {
                self.pending = None;
                Some(width)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget any pending event.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
