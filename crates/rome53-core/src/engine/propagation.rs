//! Propagation wait
//!
//! After a change is accepted, the provider reports it as pending until every
//! authoritative server serves the new value. We poll immediately, then back
//! off linearly: 0s, 5s, 10s, 15s, ... between checks. There is no timeout;
//! the user can interrupt the wait at any point, and the change still
//! completes server-side.

use crate::error::Result;
use crate::report::Reporter;
use crate::traits::{ChangeHandle, ChangeStatus, RecordUpdater};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Delays between successive propagation polls
///
/// Yields `0, step, 2*step, ...` and never ends.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    next: Duration,
    step: Duration,
}

impl PollSchedule {
    /// Create a schedule that grows by `step` after every poll
    pub fn new(step: Duration) -> Self {
        Self {
            next: Duration::ZERO,
            step,
        }
    }
}

impl Iterator for PollSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = self.next.saturating_add(self.step);
        Some(current)
    }
}

/// Create a linked cancellation handle and token
///
/// The handle is given to whatever observes the user's interrupt; the token
/// is passed into the wait loop.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Sets a [`CancelToken`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the linked token
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Checked by the wait loop on every iteration
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token nothing can cancel
    pub fn never() -> Self {
        let (_, token) = cancellation();
        token
    }

    /// Whether the token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the token is cancelled
    ///
    /// Never resolves if the handle was dropped without cancelling.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// How a propagation wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The provider reports the change as applied everywhere
    InSync {
        /// Number of status checks performed
        polls: usize,
    },
    /// The user stopped waiting
    Interrupted,
}

/// Poll a change until it is in sync or the token is cancelled
///
/// The first check happens immediately. Each pending check is announced
/// through the reporter with the delay about to be slept.
pub async fn await_propagation(
    updater: &dyn RecordUpdater,
    change: &ChangeHandle,
    step: Duration,
    reporter: &mut Reporter,
    cancel: &mut CancelToken,
) -> Result<WaitOutcome> {
    let mut schedule = PollSchedule::new(step);
    let mut status = change.status;
    let mut polls = 0;

    while status == ChangeStatus::Pending {
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Interrupted);
        }

        let delay = schedule.next().unwrap_or(step);
        reporter.verbose(
            format!("Waiting for DNS update to sync... ({}s)", delay.as_secs()),
            None,
        );

        let poll = async {
            tokio::time::sleep(delay).await;
            updater.change_status(change).await
        };

        status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Propagation wait for change {} interrupted", change.id);
                return Ok(WaitOutcome::Interrupted);
            }
            status = poll => status?,
        };
        polls += 1;
        debug!("Change {} status after poll {}: {:?}", change.id, polls, status);
    }

    Ok(WaitOutcome::InSync { polls })
}
