// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight renewal coordination.
//!
//! At most one renewal exchange is in flight at any time. The first caller
//! to hit an authorization failure becomes the *leader* and performs the
//! exchange; everyone arriving while it is pending becomes a *waiter* whose
//! continuation (a oneshot sender) is enqueued. When the leader settles,
//! waiters receive the shared outcome in enqueue order and retry with the
//! new credential themselves.

use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of a renewal exchange, shared with every queued waiter.
///
/// `Err` carries the failure description; the full error context lives with
/// the leader, which also emits the forced-logout signal.
pub(crate) type RenewalOutcome = Result<String, String>;

/// Role assigned to a caller joining the renewal.
pub(crate) enum RenewalTicket {
    /// This caller must perform the exchange and settle the queue.
    Leader,
    /// A renewal is already pending; await the shared outcome.
    Waiter(oneshot::Receiver<RenewalOutcome>),
}

/// The explicit PendingRenewal state: `None` means no exchange in flight,
/// `Some` holds the FIFO queue of waiter continuations.
#[derive(Default)]
pub(crate) struct RenewalQueue {
    pending: Mutex<Option<Vec<oneshot::Sender<RenewalOutcome>>>>,
}

impl RenewalQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Joins the pending renewal, creating it if none exists.
    pub(crate) fn join(&self) -> RenewalTicket {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.as_mut() {
            None => {
                *pending = Some(Vec::new());
                RenewalTicket::Leader
            }
            Some(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                debug!(queued = waiters.len(), "joined pending credential renewal");
                RenewalTicket::Waiter(rx)
            }
        }
    }

    /// Settles the pending renewal: delivers `outcome` to every queued
    /// waiter in enqueue order and clears the pending state so a later
    /// expiry can start a fresh exchange.
    ///
    /// Must only be called by the leader.
    pub(crate) fn settle(&self, outcome: RenewalOutcome) {
        let waiters = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.take().unwrap_or_default()
        };
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "settling renewal queue");
        for waiter in waiters {
            // A waiter that gave up awaiting is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }
}
