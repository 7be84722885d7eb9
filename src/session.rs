//! Last-request-wins ordering for overlapping searches.
//!
//! Each search started on a [`SearchSession`] takes a ticket. When a search
//! finishes, its response is only kept if no newer ticket was issued in the
//! meantime, so a slow page can never overwrite a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct SearchSession {
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search, superseding every earlier ticket.
    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Keep `value` only if `ticket` is still the newest.
    pub fn settle<T>(&self, ticket: SearchTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
