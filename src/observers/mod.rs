//! # Failure observers.
//!
//! This module provides the [`Observe`] trait and the built-in
//! [`LogObserver`] implementation for watching per-handler dispatch failures.
//!
//! ```text
//! Failure flow:
//!   dispatch ── aggregate failures ──► PublishResult
//!                       │
//!                       └──► Observe::on_failure(topic, &HandlerFailure)
//!                                 │
//!                            ┌────┴─────┬─────────┐
//!                            ▼          ▼         ▼
//!                        LogObserver  Metrics  Custom ...
//! ```
//!
//! For detached publishes (`publish_detached`) the observer is the only
//! channel through which failures are visible.

mod observe;

pub use observe::{Observe, ObserverRef};

// Optional: a simple built-in stderr observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogObserver;
