//! Error types used by the bus and by handler implementations.
//!
//! This module defines three types:
//!
//! - [`BusError`] — structural errors returned directly to the caller
//!   (invalid handler declaration, unknown registration, closed bus).
//! - [`DispatchError`] — per-handler dispatch failures, aggregated into
//!   [`PublishResult`](crate::PublishResult) and never propagated as the
//!   publish call's own failure.
//! - [`HandlerError`] — the error a handler returns from
//!   [`Handle::call`](crate::Handle::call).
//!
//! The split mirrors the propagation policy: a broken *request* fails hard,
//! a broken *listener* is recorded and isolated from its siblings.
//!
//! All error enums provide `as_label()` (stable snake_case, for logs/metrics)
//! and `as_message()` helpers.

use std::time::Duration;
use thiserror::Error;

/// # Structural errors returned directly to the caller.
///
/// These represent a malformed request or a bus in the wrong lifecycle state,
/// never a handler's own failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// Handler declaration is not invocable by this bus.
    ///
    /// Returned by `subscribe` when the declared parameter list exceeds
    /// [`MAX_ARITY`](crate::MAX_ARITY). No state change occurs.
    #[error("handler declares {arity} parameters; at most {max} supported")]
    InvalidHandler {
        /// Declared parameter count.
        arity: usize,
        /// The supported maximum.
        max: usize,
    },

    /// Registration id is unknown or was already removed.
    ///
    /// Removal is not idempotent: a second `unsubscribe` of the same id
    /// fails with this error.
    #[error("registration not found")]
    NotFound,

    /// Operation attempted after `close` completed.
    #[error("bus is closed")]
    Closed,

    /// Publish to the empty topic while `deny_empty_topic` is set.
    #[error("empty topic rejected by configuration")]
    EmptyTopic,

    /// Close grace period was exceeded; some publishes were still in flight.
    #[error("close grace {grace:?} exceeded; {in_flight} publish(es) still in flight")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of publishes still running when the grace elapsed.
        in_flight: usize,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::BusError;
    ///
    /// assert_eq!(BusError::NotFound.as_label(), "bus_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::InvalidHandler { .. } => "bus_invalid_handler",
            BusError::NotFound => "bus_not_found",
            BusError::Closed => "bus_closed",
            BusError::EmptyTopic => "bus_empty_topic",
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Per-handler dispatch failures.
///
/// One record per affected handler, aggregated into
/// [`PublishResult::failures`](crate::PublishResult). A failure of one handler
/// never aborts or delays its siblings.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// Declared parameter shapes do not match the published arguments.
    ///
    /// The handler was **not** invoked.
    #[error("shape mismatch: declared {expected}, published {got}")]
    ShapeMismatch {
        /// Declared signature, e.g. `(int, str)`.
        expected: String,
        /// Published argument shapes, e.g. `(str, int)`.
        got: String,
    },

    /// Handler ran and returned an error.
    #[error("handler failed: {error}")]
    Failed {
        /// The handler's error message.
        error: String,
    },

    /// Handler panicked during execution; the panic was caught and isolated.
    #[error("handler panicked: {message}")]
    Panicked {
        /// Panic payload, if it carried a message.
        message: String,
    },

    /// Handler did not complete within the publish deadline.
    ///
    /// Its cancellation token was cancelled; the handler itself is left to
    /// finish in the background if it does not cooperate.
    #[error("timed out after {timeout:?}")]
    TimedOut {
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Publish-level cancellation was observed before the handler started.
    #[error("cancelled before start")]
    Canceled,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// assert_eq!(DispatchError::Canceled.as_label(), "dispatch_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::ShapeMismatch { .. } => "dispatch_shape_mismatch",
            DispatchError::Failed { .. } => "dispatch_failed",
            DispatchError::Panicked { .. } => "dispatch_panicked",
            DispatchError::TimedOut { .. } => "dispatch_timed_out",
            DispatchError::Canceled => "dispatch_canceled",
        }
    }

    /// Returns a human-readable message with details about the failure.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// Indicates whether the handler actually started executing.
    ///
    /// Returns `false` for [`DispatchError::ShapeMismatch`] and
    /// [`DispatchError::Canceled`] (skipped before invocation), `true`
    /// otherwise.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// let skipped = DispatchError::Canceled;
    /// assert!(!skipped.was_invoked());
    ///
    /// let ran = DispatchError::Failed { error: "boom".into() };
    /// assert!(ran.was_invoked());
    /// ```
    pub fn was_invoked(&self) -> bool {
        !matches!(
            self,
            DispatchError::ShapeMismatch { .. } | DispatchError::Canceled
        )
    }
}

/// # Error returned by handler implementations.
///
/// Carries a message; the dispatcher converts it into
/// [`DispatchError::Failed`] when aggregating results.
///
/// # Example
/// ```
/// use eventvisor::HandlerError;
///
/// let err = HandlerError::msg("connection refused");
/// assert_eq!(err.to_string(), "connection refused");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable failure message.
    pub message: String,
}

impl HandlerError {
    /// Creates a handler error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
