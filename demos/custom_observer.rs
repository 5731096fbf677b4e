//! # Example: custom_observer
//!
//! Demonstrates how to build and attach a failure observer.
//!
//! Shows how to:
//! - Implement the [`Observe`] trait.
//! - Inspect [`HandlerFailure`] records for metrics/alerting.
//! - Wire an observer into [`Bus::builder`].
//! - Combine a custom observer with the built-in [`LogObserver`] pattern.
//!
//! ## Flow
//! ```text
//! publish("jobs.run", [Int])
//!     ├─► "runner"  ─ ok
//!     ├─► "panicky" ─ panic (caught)   ──► Observe::on_failure
//!     └─► "typed"   ─ shape mismatch   ──► Observe::on_failure
//! ```
//!
//! ## Run
//! Requires the `logging` feature for [`LogObserver`].
//! ```bash
//! cargo run --example custom_observer --features logging
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    Args, Bus, Config, HandlerError, HandlerFailure, Observe, Shape, Value,
};
use tokio_util::sync::CancellationToken;

/// Counts failures per kind. In real life, you could export metrics,
/// ship logs, or trigger alerts.
struct FailureCounter {
    total: AtomicUsize,
}

impl Observe for FailureCounter {
    fn on_failure(&self, topic: &str, failure: &HandlerFailure) {
        self.total.fetch_add(1, Ordering::Relaxed);
        println!(
            "[counter] topic={topic} handler={} kind={}",
            failure.handler,
            failure.error.as_label()
        );
    }

    fn name(&self) -> &'static str {
        "failure-counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let counter = Arc::new(FailureCounter {
        total: AtomicUsize::new(0),
    });

    let bus = Bus::builder(Config::default())
        .with_observer(counter.clone())
        .build();

    bus.subscribe_fn(
        "jobs.run",
        "runner",
        [Shape::Int],
        |_ctx: CancellationToken, args: Args| async move {
            println!("[runner] job {}", args[0].as_int().unwrap_or(0));
            Ok::<_, HandlerError>(())
        },
    )?;
    bus.subscribe_fn(
        "jobs.run",
        "panicky",
        [Shape::Int],
        |_ctx: CancellationToken, _args: Args| async {
            panic!("unexpected state");
            #[allow(unreachable_code)]
            Ok::<_, HandlerError>(())
        },
    )?;
    bus.subscribe_fn(
        "jobs.run",
        "typed",
        [Shape::Str],
        |_ctx: CancellationToken, _args: Args| async { Ok::<_, HandlerError>(()) },
    )?;

    let res = bus.publish("jobs.run", vec![Value::Int(1)]).await?;
    println!(
        "matched={} succeeded={} failed={}",
        res.matched,
        res.succeeded,
        res.failed()
    );
    println!("observer saw {} failure(s)", counter.total.load(Ordering::Relaxed));
    bus.close(Duration::from_secs(1)).await?;

    // The built-in LogObserver does the same with a stderr line per record.
    let logged = Bus::builder(Config::default())
        .with_observer(Arc::new(eventvisor::LogObserver))
        .build();
    logged.subscribe_fn(
        "jobs.run",
        "always-fails",
        [Shape::Int],
        |_ctx: CancellationToken, _args: Args| async {
            Err::<(), _>(HandlerError::msg("disk full"))
        },
    )?;
    logged.publish("jobs.run", vec![Value::Int(2)]).await?;
    logged.close(Duration::from_secs(1)).await?;
    Ok(())
}
