//! # Dispatcher: concurrent, failure-isolating handler invocation.
//!
//! Given a topic snapshot and an argument list, the dispatcher validates each
//! registration's declared shapes, runs every compatible handler as an
//! independent tokio task, and aggregates per-handler outcomes into a
//! [`PublishResult`]. The publish call owns the join point: it waits for every
//! spawned task (or abandons the stragglers at the deadline) before returning.
//!
//! ## Architecture
//! ```text
//! dispatch(topic, snapshot, args, opts)
//!     │
//!     ├─ per registration: shape check (skip + record ShapeMismatch)
//!     │
//!     ├─ spawn one task per compatible handler
//!     │     ├─► [permit?] ── cancelled while waiting ──► Canceled
//!     │     └─► handler.call(child_token, args)
//!     │             ├─ Ok        ──► success
//!     │             ├─ Err       ──► Failed
//!     │             └─ panic     ──► Panicked   (caught, isolated)
//!     │
//!     └─ join all (deadline-bounded)
//!           ├─ joined in time   ──► outcome recorded
//!           └─ deadline elapsed ──► child.cancel(), TimedOut recorded,
//!                                   task left to finish in the background
//! ```
//!
//! ## Rules
//! - One handler's failure never prevents, delays, or corrupts a sibling's
//!   invocation or the overall return.
//! - Handlers are never aborted; cancellation is cooperative via the child
//!   [`CancellationToken`] each invocation receives.
//! - `matched == succeeded + failures.len()` holds for every result.
//! - Every failure record is also reported to the configured observer.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::core::registry::{Registration, RegistrationId};
use crate::error::{DispatchError, HandlerError};
use crate::handlers::HandlerRef;
use crate::observers::ObserverRef;
use crate::report::{HandlerFailure, PublishResult};
use crate::values::{args_label, compatible, signature_label, Args};

/// Per-call options accepted by `publish_with`.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use eventvisor::PublishOptions;
///
/// let cancel = CancellationToken::new();
/// let opts = PublishOptions::new()
///     .with_timeout(Duration::from_millis(250))
///     .with_cancel(cancel.clone());
/// ```
#[derive(Clone, Debug, Default)]
pub struct PublishOptions {
    /// Per-call deadline override.
    ///
    /// - `None` → use the configured default
    /// - `Some(Duration::ZERO)` → explicitly no deadline
    /// - `Some(d)` → deadline `d` for this call
    pub timeout: Option<Duration>,

    /// Cooperative cancellation signal for this call.
    ///
    /// Handlers not yet started when the token fires are skipped and recorded
    /// as cancelled; running handlers observe it through their child token.
    pub cancel: Option<CancellationToken>,
}

impl PublishOptions {
    /// Creates empty options (config defaults apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a per-call deadline (`Duration::ZERO` disables the default).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Attaches a cancellation token to this call.
    #[inline]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Outcome of one handler task (internal).
enum Outcome {
    Completed,
    Failed(HandlerError),
    Panicked(String),
    Canceled,
}

/// A spawned handler invocation awaiting join.
struct Pending {
    id: RegistrationId,
    name: Arc<str>,
    child: CancellationToken,
    handle: JoinHandle<Outcome>,
}

/// Turns a topic snapshot plus arguments into concurrent invocations.
pub(crate) struct Dispatcher {
    limit: Option<usize>,
    default_timeout: Option<Duration>,
    observer: Option<ObserverRef>,
}

impl Dispatcher {
    pub(crate) fn new(cfg: &Config, observer: Option<ObserverRef>) -> Self {
        Self {
            limit: cfg.concurrency_limit(),
            default_timeout: cfg.default_timeout(),
            observer,
        }
    }

    /// Dispatches one publish call against a registry snapshot.
    ///
    /// Never returns an error: per-handler problems become failure records,
    /// and an empty snapshot yields a `matched == 0` no-op result.
    pub(crate) async fn dispatch(
        &self,
        topic: &str,
        snapshot: Arc<[Registration]>,
        args: Args,
        opts: PublishOptions,
    ) -> PublishResult {
        let started = Instant::now();
        let matched = snapshot.len();
        let mut failures: Vec<HandlerFailure> = Vec::new();

        if matched == 0 {
            return PublishResult {
                elapsed: started.elapsed(),
                ..PublishResult::default()
            };
        }

        let cancel = opts.cancel.unwrap_or_default();
        let timeout = match opts.timeout {
            Some(d) if d > Duration::ZERO => Some(d),
            Some(_) => None,
            None => self.default_timeout,
        };
        let semaphore = self.limit.map(|n| Arc::new(Semaphore::new(n)));

        // Shape-check first (I2); only compatible handlers are spawned.
        let mut pending: Vec<Pending> = Vec::with_capacity(matched);
        for reg in snapshot.iter() {
            let shapes = reg.handler.shapes();
            if !compatible(shapes, &args) {
                failures.push(HandlerFailure {
                    id: reg.id,
                    handler: Arc::from(reg.handler.name()),
                    error: DispatchError::ShapeMismatch {
                        expected: signature_label(shapes),
                        got: args_label(&args),
                    },
                });
                continue;
            }

            let child = cancel.child_token();
            let handle = tokio::spawn(run_one(
                reg.handler.clone(),
                child.clone(),
                args.clone(),
                cancel.clone(),
                semaphore.clone(),
            ));
            pending.push(Pending {
                id: reg.id,
                name: Arc::from(reg.handler.name()),
                child,
                handle,
            });
        }

        // Join point: the publish call waits for every spawned invocation,
        // abandoning (never aborting) the ones that outlive the deadline.
        let deadline = timeout.map(|d| started + d);
        let mut succeeded = 0usize;
        for p in pending {
            let joined = match deadline {
                Some(at) => match time::timeout_at(at, p.handle).await {
                    Ok(j) => j,
                    Err(_elapsed) => {
                        p.child.cancel();
                        failures.push(HandlerFailure {
                            id: p.id,
                            handler: p.name,
                            error: DispatchError::TimedOut {
                                // `deadline` is only set when `timeout` is.
                                timeout: timeout.unwrap_or_default(),
                            },
                        });
                        continue;
                    }
                },
                None => p.handle.await,
            };

            match joined {
                Ok(Outcome::Completed) => succeeded += 1,
                Ok(Outcome::Failed(e)) => failures.push(HandlerFailure {
                    id: p.id,
                    handler: p.name,
                    error: DispatchError::Failed { error: e.message },
                }),
                Ok(Outcome::Panicked(message)) => failures.push(HandlerFailure {
                    id: p.id,
                    handler: p.name,
                    error: DispatchError::Panicked { message },
                }),
                Ok(Outcome::Canceled) => failures.push(HandlerFailure {
                    id: p.id,
                    handler: p.name,
                    error: DispatchError::Canceled,
                }),
                Err(join_err) => failures.push(HandlerFailure {
                    id: p.id,
                    handler: p.name,
                    error: if join_err.is_panic() {
                        DispatchError::Panicked {
                            message: "handler task panicked".to_string(),
                        }
                    } else {
                        DispatchError::Canceled
                    },
                }),
            }
        }

        if let Some(obs) = &self.observer {
            for failure in &failures {
                obs.on_failure(topic, failure);
            }
        }

        PublishResult {
            matched,
            succeeded,
            failures,
            elapsed: started.elapsed(),
        }
    }
}

/// Runs a single handler invocation to an [`Outcome`].
///
/// Waits for a concurrency permit (if capped), re-checks cancellation right
/// before invoking, then isolates the invocation behind `catch_unwind`.
async fn run_one(
    handler: HandlerRef,
    child: CancellationToken,
    args: Args,
    cancel: CancellationToken,
    semaphore: Option<Arc<Semaphore>>,
) -> Outcome {
    let _permit = match semaphore {
        Some(sem) => {
            tokio::select! {
                _ = cancel.cancelled() => return Outcome::Canceled,
                permit = sem.acquire_owned() => match permit {
                    Ok(p) => Some(p),
                    Err(_closed) => return Outcome::Canceled,
                },
            }
        }
        None => None,
    };

    if cancel.is_cancelled() {
        return Outcome::Canceled;
    }

    let fut = handler.call(child, args);
    match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(e)) => Outcome::Failed(e),
        Err(panic) => Outcome::Panicked(panic_message(panic.as_ref())),
    }
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
