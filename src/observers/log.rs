//! # Simple logging observer for debugging and demos.
//!
//! [`LogObserver`] prints failure records to stderr in a human-readable
//! format. This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [eventvisor] topic=orders handler=audit id=reg-3 kind=dispatch_failed msg="handler failed: connection refused"
//! ```

use crate::observers::observe::Observe;
use crate::report::HandlerFailure;

/// Simple stderr logging observer.
///
/// Enabled via the `logging` feature. Prints one line per failure record for
/// debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Observe`] for
/// structured logging or metrics collection.
pub struct LogObserver;

impl Observe for LogObserver {
    fn on_failure(&self, topic: &str, failure: &HandlerFailure) {
        eprintln!(
            "[eventvisor] topic={} handler={} id={} kind={} msg={:?}",
            topic,
            failure.handler,
            failure.id,
            failure.error.as_label(),
            failure.error.as_message(),
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
