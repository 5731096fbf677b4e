//! # Bus configuration.
//!
//! Provides [`Config`] — centralized settings consumed at bus construction.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unbounded (no per-publish semaphore created)
//! - `publish_timeout = 0s` → no default deadline

use std::time::Duration;

/// Configuration for one bus instance.
///
/// Defines:
/// - **Backpressure**: per-publish handler concurrency cap
/// - **Deadlines**: default publish timeout
/// - **Topic policy**: whether the empty topic may be published to
///
/// ## Field semantics
/// - `max_concurrent`: handlers of one publish call running simultaneously
///   (`0` = unbounded)
/// - `publish_timeout`: default deadline for a publish call (`0s` = none;
///   overridable per call via
///   [`PublishOptions::with_timeout`](crate::PublishOptions::with_timeout))
/// - `deny_empty_topic`: reject `publish("")` with
///   [`BusError::EmptyTopic`](crate::BusError::EmptyTopic) (the empty topic
///   is valid but discouraged; subscribing to it is always allowed)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across calling code.
#[derive(Clone, Debug)]
pub struct Config {
    /// Per-publish handler concurrency cap (`0` = unbounded).
    pub max_concurrent: usize,

    /// Default publish deadline (`Duration::ZERO` = none).
    ///
    /// When the deadline elapses, still-running handlers are recorded as
    /// timed out and left to finish in the background; their cancellation
    /// tokens are cancelled so cooperative handlers can stop early.
    pub publish_timeout: Duration,

    /// Reject publishes to the empty topic.
    pub deny_empty_topic: bool,
}

impl Config {
    /// Returns the per-publish concurrency cap as an `Option`.
    ///
    /// - `None` → unbounded (no semaphore)
    /// - `Some(n)` → at most `n` handlers of one call run simultaneously
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns the default publish deadline as an `Option`.
    ///
    /// - `None` → no deadline
    /// - `Some(d)` → deadline applied per publish call
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.publish_timeout == Duration::ZERO {
            None
        } else {
            Some(self.publish_timeout)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_concurrent = 0` (unbounded)
    /// - `publish_timeout = 0s` (no deadline)
    /// - `deny_empty_topic = false`
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            publish_timeout: Duration::ZERO,
            deny_empty_topic: false,
        }
    }
}
