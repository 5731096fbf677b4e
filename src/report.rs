//! # Publish outcome reporting.
//!
//! A publish call never fails because a handler failed; instead every
//! per-handler outcome is aggregated into a [`PublishResult`]:
//!
//! ```text
//! publish("t", args)
//!     ├─► handler A  ─ ok        ──┐
//!     ├─► handler B  ─ error     ──┼──► PublishResult { matched: 3,
//!     └─► handler C  ─ mismatch  ──┘                    succeeded: 1,
//!                                                       failures: [B, C],
//!                                                       elapsed }
//! ```
//!
//! This lets callers distinguish a broken listener (failure record) from a
//! broken publish request (hard [`BusError`](crate::BusError)).

use std::sync::Arc;
use std::time::Duration;

use crate::core::registry::RegistrationId;
use crate::error::DispatchError;

/// One failed handler within a publish call.
#[derive(Clone, Debug)]
pub struct HandlerFailure {
    /// Registration the failure belongs to.
    pub id: RegistrationId,
    /// Handler name at registration time (for logs).
    pub handler: Arc<str>,
    /// What went wrong.
    pub error: DispatchError,
}

/// Aggregated outcome of one publish call.
///
/// `matched == succeeded + failures.len()` always holds: every matched
/// registration ends up either succeeded or recorded as a failure.
#[derive(Clone, Debug, Default)]
pub struct PublishResult {
    /// Registrations present in the topic snapshot when dispatch began.
    pub matched: usize,
    /// Handlers that ran to completion without error.
    pub succeeded: usize,
    /// Per-handler failure records (empty when everything succeeded).
    pub failures: Vec<HandlerFailure>,
    /// Wall-clock time the dispatch took.
    pub elapsed: Duration,
}

impl PublishResult {
    /// Number of failure records.
    #[inline]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every matched handler completed successfully.
    ///
    /// Also true for a no-op publish (`matched == 0`), which is the normal
    /// outcome of publishing to a topic without listeners.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
