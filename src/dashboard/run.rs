/// Run bookkeeping for the detection sequencer.
///
/// [`RunGate`] admits one detection chain at a time; a second `try_begin`
/// while a [`RunTicket`] is alive is refused. Dropping the ticket reopens
/// the gate on every exit path, which is also what clears the loading flag.
///
/// [`CancelToken`] is the teardown signal. The chain checks it between
/// steps and stops without touching view state once it fires.
///
/// Both are `Arc<AtomicBool>` so a handle can be cloned into another thread
/// (a Ctrl-C handler, a test) while the view is busy.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Error;

#[derive(Debug, Clone, Default)]
pub struct RunGate {
    busy: Arc<AtomicBool>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a run is already in flight.
    pub fn try_begin(&self) -> Option<RunTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of an in-flight run. Releases the gate on drop.
#[derive(Debug)]
pub struct RunTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Why a run never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fraud type or file not chosen.
    MissingInput,
    /// Another run holds the gate.
    InFlight,
    /// The view was torn down.
    TornDown,
}

/// How a detection run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        /// Whether the category bar chart was drawn.
        categorical: bool,
    },
    Rejected(Rejection),
    /// Teardown fired mid-chain; nothing was alerted.
    Cancelled,
    /// A step failed; one alert was raised.
    Failed(Error),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
