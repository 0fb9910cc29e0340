//! Stale-result suppression for interactive search
//!
//! Each keystroke issues a [`Ticket`]. A result computed for a ticket is only
//! delivered if no newer ticket was issued in the meantime, so a slow early
//! query can never overwrite the answer to a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Generation number handed out by a [`QueryGate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct QueryGate {
    latest: AtomicU64,
}

impl QueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query, superseding every earlier ticket
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Pass `value` through only if `ticket` is still the latest
    pub fn settle<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        self.is_current(&ticket).then_some(value)
    }

    /// Wait out the debounce delay; false if a newer query arrived meanwhile
    pub async fn debounce(&self, ticket: Ticket, delay: Duration) -> bool {
        tokio::time::sleep(delay).await;
        self.is_current(&ticket)
    }
}
