//! # Core observer trait
//!
//! `Observe` is the extension point for plugging failure observability into a
//! bus (metrics counters, structured log shipping, alerting). The dispatcher
//! calls the observer once per failure record, for every publish call —
//! including detached ones, where the observer is the only way to see the
//! outcome.
//!
//! ## Contract
//! - Called synchronously from result aggregation, **after** all handlers of
//!   the call have been joined or abandoned — never from the hot dispatch path.
//! - Implementations must be cheap and non-blocking; ship heavy work to a
//!   channel or task of their own.
//!
//! ## Example (skeleton)
//! ```rust
//! use eventvisor::{HandlerFailure, Observe};
//!
//! struct FailureCounter;
//!
//! impl Observe for FailureCounter {
//!     fn on_failure(&self, topic: &str, failure: &HandlerFailure) {
//!         // increment counter for (topic, failure.error.as_label())
//!         let _ = (topic, failure);
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::report::HandlerFailure;

/// Shared handle to an observer (`Arc<dyn Observe>`).
pub type ObserverRef = Arc<dyn Observe>;

/// Contract for per-failure observability hooks.
pub trait Observe: Send + Sync + 'static {
    /// Reports one handler failure within a publish call.
    ///
    /// # Parameters
    /// - `topic`: the topic the publish call targeted
    /// - `failure`: registration id, handler name, and failure kind
    fn on_failure(&self, topic: &str, failure: &HandlerFailure);

    /// Human-readable name (for logs/diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
