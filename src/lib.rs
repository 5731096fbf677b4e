//! # eventvisor
//!
//! **Eventvisor** is a lightweight topic-based event bus for Rust.
//!
//! It provides primitives to register async handlers against named topics and
//! broadcast argument lists to them with concurrent, failure-isolated
//! delivery. The crate is designed as an in-process building block: no
//! persistence, no network transport, at-most-once per publish call.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Publisher   │   │  Publisher   │   │  Publisher   │
//!     │ (component A)│   │ (component B)│   │ (component C)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus (façade)                                                     │
//! │  - Registry (topic → registrations, snapshot reads)               │
//! │  - Dispatcher (shape checks, concurrent invocation, aggregation)  │
//! │  - Lifecycle (closed flag, in-flight tracking, graceful close)    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ handler task │   │ handler task │   │ handler task │
//!     │ (spawned per │   │              │   │              │
//!     │  invocation) │   │              │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │  joined by the publish call         │
//!            └───────────────┬────────────────────┘
//!                            ▼
//!                     PublishResult
//!           { matched, succeeded, failures, elapsed }
//!                            │
//!                            └──► Observe::on_failure (per record)
//! ```
//!
//! ### Publish lifecycle
//! ```text
//! publish(topic, args)
//!   ├─► closed / topic-policy checks        (hard BusError)
//!   ├─► snapshot(topic)                      (empty → matched: 0, no error)
//!   ├─► per registration:
//!   │     ├─ shapes incompatible ──► ShapeMismatch recorded, not invoked
//!   │     └─ compatible ──► spawn handler task
//!   │           ├─ cancelled before start ──► Canceled
//!   │           ├─ Ok(())                 ──► success
//!   │           ├─ Err(e)                 ──► Failed
//!   │           ├─ panic (caught)         ──► Panicked
//!   │           └─ deadline elapsed       ──► TimedOut (left running,
//!   │                                          child token cancelled)
//!   └─► PublishResult (matched == succeeded + failures.len())
//! ```
//!
//! ## Features
//! | Area             | Description                                                       | Key types / traits                   |
//! |------------------|-------------------------------------------------------------------|--------------------------------------|
//! | **Handlers**     | Define async, cancelable handlers with declared parameter shapes. | [`Handle`], [`HandlerFn`], [`Shape`] |
//! | **Publishing**   | Broadcast values to a topic; wait for or detach from delivery.    | [`Bus`], [`Value`], [`PublishOptions`] |
//! | **Reporting**    | Per-handler outcomes aggregated per call.                         | [`PublishResult`], [`HandlerFailure`] |
//! | **Errors**       | Structural vs dispatch failure taxonomy.                          | [`BusError`], [`DispatchError`]      |
//! | **Observability**| Hook every failure record (metrics, logs, alerts).                | [`Observe`]                          |
//! | **Configuration**| Concurrency cap, default deadline, topic policy.                  | [`Config`]                           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogObserver`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use eventvisor::{Args, Bus, Config, HandlerError, Shape, Value};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.publish_timeout = Duration::from_secs(5);
//!
//!     let bus = Bus::new(cfg);
//!
//!     // Handlers declare the parameter shapes they expect.
//!     bus.subscribe_fn(
//!         "order.placed",
//!         "stock-reserver",
//!         [Shape::Int],
//!         |ctx: CancellationToken, args: Args| async move {
//!             if ctx.is_cancelled() {
//!                 return Ok(());
//!             }
//!             let order = args[0].as_int().unwrap_or(0);
//!             println!("reserving stock for order {order}");
//!             Ok::<_, HandlerError>(())
//!         },
//!     )?;
//!
//!     // Publish waits for every matched handler and reports per-handler outcomes.
//!     let res = bus.publish("order.placed", vec![Value::Int(42)]).await?;
//!     assert_eq!(res.matched, 1);
//!     assert!(res.is_clean());
//!
//!     bus.close(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod handlers;
mod observers;
mod report;
mod values;

// ---- Public re-exports ----

pub use crate::core::{Bus, BusBuilder, Config, PublishOptions, RegistrationId};
pub use error::{BusError, DispatchError, HandlerError};
pub use handlers::{Handle, HandlerFn, HandlerRef, MAX_ARITY};
pub use observers::{Observe, ObserverRef};
pub use report::{HandlerFailure, PublishResult};
pub use values::{Args, Shape, Value};

// Optional: expose a simple built-in stderr observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogObserver;
