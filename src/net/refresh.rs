//! Single-flight gate for access-token refresh.
//!
//! DESIGN
//! ======
//! The gate holds the refresh-in-progress flag and the queue of requests
//! waiting on the refresh. The first caller to [`RefreshGate::enter`] while
//! idle becomes the leader and receives a [`RefreshLease`]; every caller that
//! enters while the lease is alive is queued and receives a
//! [`PendingRefresh`] completion handle.
//!
//! The check-and-set of the flag and the queue push/drain happen under one
//! mutex that is never held across an `.await`. Settling the lease clears
//! the flag and takes the queue in the same critical section, then fulfils
//! each waiter in arrival order. A lease dropped without settling (the
//! leader's future was cancelled) does the same with
//! [`ApiError::RefreshCancelled`], so the flag cannot stay set.
//!
//! TRADE-OFFS
//! ==========
//! Single flight holds on any tokio runtime. Waiters are woken in arrival
//! order, but each replays from its own task, so replay dispatch follows
//! that order only on a `current_thread` runtime. On a multi-thread runtime
//! the scheduler may interleave the replays.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use super::error::ApiError;

/// Outcome broadcast to queued requests: the fresh access token or the
/// error every one of them should fail with.
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Default)]
struct GateState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Clone, Default)]
pub struct RefreshGate {
    state: Arc<Mutex<GateState>>,
}

/// Result of entering the gate.
pub enum Entry {
    /// No refresh was running; the caller must perform it and settle the lease.
    Leader(RefreshLease),
    /// A refresh is already running; await its outcome.
    Waiter(PendingRefresh),
}

impl RefreshGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Become the refresh leader, or join the queue behind the running refresh.
    #[must_use]
    pub fn enter(&self) -> Entry {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Entry::Waiter(PendingRefresh { rx })
        } else {
            state.refreshing = true;
            Entry::Leader(RefreshLease { gate: self.clone(), settled: false })
        }
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests currently waiting on the running refresh.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }

    fn finish(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped no longer cares.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

// =============================================================================
// LEASE
// =============================================================================

/// Proof of refresh leadership. Must be settled exactly once; dropping it
/// unsettled releases the gate with [`ApiError::RefreshCancelled`].
pub struct RefreshLease {
    gate: RefreshGate,
    settled: bool,
}

impl RefreshLease {
    /// Return the gate to idle and fulfil every queued request, in arrival
    /// order, with `outcome`. Returns how many requests were released.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.gate.finish(outcome)
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        if !self.settled {
            let released = self.gate.finish(&Err(ApiError::RefreshCancelled));
            tracing::warn!(released, "token refresh abandoned before completion");
        }
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Completion handle for a request queued behind a running refresh.
pub struct PendingRefresh {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl PendingRefresh {
    /// Wait for the running refresh to settle.
    ///
    /// # Errors
    ///
    /// Returns the refresh's error, or [`ApiError::RefreshCancelled`] if the
    /// leader vanished without settling.
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(ApiError::RefreshCancelled))
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
