//! # Bus façade: composition of registry and dispatcher, plus lifecycle.
//!
//! [`Bus`] is the only externally visible surface. It owns the [`Registry`]
//! and [`Dispatcher`] for its whole lifetime and adds the lifecycle pieces:
//! a closed flag, in-flight publish tracking, and graceful close.
//!
//! ## High-level architecture
//! ```text
//! subscribe/unsubscribe ──► Registry (mutex-guarded topic map)
//!                               │
//! publish(topic, args) ────► snapshot(topic) ──► Dispatcher
//!                                                   ├─► handler task 1
//!                                                   ├─► handler task 2
//!                                                   └─► handler task N
//!                                                   (joined by the call)
//!
//! close(grace):
//!   closed = true  →  wait for in-flight publishes (≤ grace)  →  registry.clear()
//! ```
//!
//! ## Rules
//! - Instances are independent: two buses share nothing. There is no global
//!   bus; own one from your composition root.
//! - `Bus` is cheap to clone (internally `Arc`-backed); clones share state.
//! - After `close` completes, every operation fails with
//!   [`BusError::Closed`] — including a second `close`.

use std::borrow::Cow;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::builder::BusBuilder;
use crate::core::config::Config;
use crate::core::dispatcher::{Dispatcher, PublishOptions};
use crate::core::registry::{Registration, RegistrationId, Registry};
use crate::error::{BusError, HandlerError};
use crate::handlers::{HandlerFn, HandlerRef};
use crate::report::PublishResult;
use crate::values::{Args, Shape, Value};

/// Shared state behind one bus instance.
pub(crate) struct Shared {
    pub(crate) registry: Registry,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) deny_empty_topic: bool,
    closed: AtomicBool,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl Shared {
    pub(crate) fn new(registry: Registry, dispatcher: Dispatcher, deny_empty_topic: bool) -> Self {
        Self {
            registry,
            dispatcher,
            deny_empty_topic,
            closed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }
}

/// Keeps the close drain honest: one guard per publish call, held until the
/// dispatch (attached or detached) finishes.
struct InFlightGuard {
    shared: Arc<Shared>,
}

impl InFlightGuard {
    fn enter(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, AtomicOrdering::SeqCst);
        Self {
            shared: Arc::clone(shared),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.shared.in_flight.fetch_sub(1, AtomicOrdering::SeqCst) == 1 {
            // notify_one stores a permit, so a drain that checks the counter
            // just before this decrement still observes the wakeup.
            self.shared.drained.notify_one();
        }
    }
}

/// Topic-keyed event bus with shape-checked, failure-isolating dispatch.
///
/// ### Properties
/// - **Snapshot dispatch**: each publish iterates an immutable copy of the
///   topic's registrations taken at call time; concurrent subscribes never
///   tear an in-progress dispatch.
/// - **Failure isolation**: one handler's error, panic, or timeout is a
///   failure record in the [`PublishResult`], never a sibling's problem.
/// - **Structured concurrency**: `publish` returns only after every matched
///   handler completed or was recorded as failed; `publish_detached` is the
///   explicit fire-and-forget mode.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use eventvisor::{Args, Bus, Config, HandlerError, Shape, Value};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), eventvisor::BusError> {
///     let bus = Bus::new(Config::default());
///
///     bus.subscribe_fn(
///         "user.created",
///         "welcome-mail",
///         [Shape::Int, Shape::Str],
///         |_ctx: CancellationToken, args: Args| async move {
///             let id = args[0].as_int().unwrap_or(0);
///             println!("sending welcome mail to user {id}");
///             Ok::<_, HandlerError>(())
///         },
///     )?;
///
///     let res = bus
///         .publish("user.created", vec![Value::Int(7), Value::from("ada")])
///         .await?;
///     assert_eq!(res.matched, 1);
///     assert_eq!(res.succeeded, 1);
///
///     bus.close(std::time::Duration::from_secs(1)).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Shared>,
}

impl Bus {
    /// Creates a bus with the given configuration and no observer.
    pub fn new(cfg: Config) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts building a bus (attach an observer, then `build`).
    pub fn builder(cfg: Config) -> BusBuilder {
        BusBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { inner: shared }
    }

    /// Registers `handler` under `topic`.
    ///
    /// Topics are created implicitly; per-topic insertion order is preserved
    /// (dispatch order is not). The same handler value may be registered under
    /// several topics; each registration gets its own id.
    ///
    /// # Errors
    /// - [`BusError::InvalidHandler`] — declared signature not invocable.
    /// - [`BusError::Closed`] — bus already closed.
    pub fn subscribe(&self, topic: &str, handler: HandlerRef) -> Result<RegistrationId, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        self.inner.registry.subscribe(topic, handler)
    }

    /// Registers a closure under `topic` (shorthand for a [`HandlerFn`]).
    ///
    /// # Errors
    /// Same as [`Bus::subscribe`].
    pub fn subscribe_fn<F, Fut>(
        &self,
        topic: &str,
        name: impl Into<Cow<'static, str>>,
        shapes: impl Into<Vec<Shape>>,
        f: F,
    ) -> Result<RegistrationId, BusError>
    where
        F: Fn(CancellationToken, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.subscribe(topic, HandlerFn::arc(name, shapes, f))
    }

    /// Removes one registration.
    ///
    /// Removal is not idempotent: a second call for the same id fails.
    ///
    /// # Errors
    /// - [`BusError::NotFound`] — unknown or already-removed id.
    /// - [`BusError::Closed`] — bus already closed.
    pub fn unsubscribe(&self, id: RegistrationId) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        self.inner.registry.unsubscribe(id)
    }

    /// Publishes `args` to every handler currently registered for `topic`.
    ///
    /// Returns after every matched handler completed or was recorded as
    /// failed. Publishing to a topic without listeners is a normal no-op
    /// (`matched == 0`), not an error.
    ///
    /// # Errors
    /// - [`BusError::Closed`] — bus already closed.
    /// - [`BusError::EmptyTopic`] — empty topic under `deny_empty_topic`.
    pub async fn publish(
        &self,
        topic: &str,
        args: Vec<Value>,
    ) -> Result<PublishResult, BusError> {
        self.publish_with(topic, args, PublishOptions::new()).await
    }

    /// Publishes with per-call options (deadline, cancellation token).
    ///
    /// # Errors
    /// Same as [`Bus::publish`].
    pub async fn publish_with(
        &self,
        topic: &str,
        args: Vec<Value>,
        opts: PublishOptions,
    ) -> Result<PublishResult, BusError> {
        let _guard = InFlightGuard::enter(&self.inner);
        let snapshot = self.check_and_snapshot(topic)?;
        let args: Args = args.into();
        Ok(self
            .inner
            .dispatcher
            .dispatch(topic, snapshot, args, opts)
            .await)
    }

    /// Publishes without waiting for handlers (explicit fire-and-forget mode).
    ///
    /// The snapshot is still taken at call time, and `close` still waits for
    /// the detached dispatch to finish. Failures are visible only through the
    /// observer hook.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Same as [`Bus::publish`].
    pub fn publish_detached(&self, topic: &str, args: Vec<Value>) -> Result<(), BusError> {
        let guard = InFlightGuard::enter(&self.inner);
        let snapshot = self.check_and_snapshot(topic)?;
        let args: Args = args.into();

        let shared = Arc::clone(&self.inner);
        let topic = topic.to_string();
        tokio::spawn(async move {
            let _res = shared
                .dispatcher
                .dispatch(&topic, snapshot, args, PublishOptions::new())
                .await;
            drop(guard);
        });
        Ok(())
    }

    /// Closes the bus: rejects new operations, waits up to `grace` for
    /// in-flight publishes to drain, then releases all handler references.
    ///
    /// `grace == 0` does not wait: the bus closes immediately and reports
    /// whatever was still in flight.
    ///
    /// # Errors
    /// - [`BusError::Closed`] — close was already called.
    /// - [`BusError::GraceExceeded`] — some publishes were still in flight
    ///   when `grace` elapsed; the bus is closed regardless.
    pub async fn close(&self, grace: Duration) -> Result<(), BusError> {
        if self.inner.closed.swap(true, AtomicOrdering::SeqCst) {
            return Err(BusError::Closed);
        }

        let result = if grace == Duration::ZERO {
            self.report_in_flight(grace)
        } else {
            match time::timeout(grace, self.drain()).await {
                Ok(()) => Ok(()),
                Err(_elapsed) => self.report_in_flight(grace),
            }
        };

        self.inner.registry.clear();
        result
    }

    /// Waits until no publish is in flight.
    async fn drain(&self) {
        loop {
            let notified = self.inner.drained.notified();
            if self.inner.in_flight.load(AtomicOrdering::SeqCst) == 0 {
                break;
            }
            notified.await;
        }
    }

    fn report_in_flight(&self, grace: Duration) -> Result<(), BusError> {
        match self.inner.in_flight.load(AtomicOrdering::SeqCst) {
            0 => Ok(()),
            n => Err(BusError::GraceExceeded { grace, in_flight: n }),
        }
    }

    /// Closed-state and topic-policy checks shared by all publish entry points.
    fn check_and_snapshot(&self, topic: &str) -> Result<Arc<[Registration]>, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        if topic.is_empty() && self.inner.deny_empty_topic {
            return Err(BusError::EmptyTopic);
        }
        Ok(self.inner.registry.snapshot(topic))
    }

    /// True once `close` has been called.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(AtomicOrdering::SeqCst)
    }

    /// Sorted list of topics with at least one registration.
    pub fn topics(&self) -> Vec<String> {
        self.inner.registry.topics()
    }

    /// Number of registrations for `topic` (0 for unknown topics).
    pub fn handler_count(&self, topic: &str) -> usize {
        self.inner.registry.handler_count(topic)
    }

    /// True if no registrations exist.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }
}
