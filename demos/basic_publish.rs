//! # Example: basic_publish
//!
//! Minimal example: two handlers on one topic, one publish call, per-handler
//! outcome reporting.
//!
//! Demonstrates how to:
//! - Register closures with declared parameter shapes via `subscribe_fn`.
//! - Publish an argument list and inspect the [`PublishResult`].
//! - See failure isolation: one failing handler never hides the other.
//!
//! ## Flow
//! ```text
//! subscribe_fn("user.created", ...) ×2
//!     └─► publish("user.created", [Int, Str])
//!           ├─► "welcome-mail"  ─ ok
//!           └─► "flaky-metrics" ─ error (recorded, isolated)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_publish
//! ```

use std::time::Duration;

use eventvisor::{Args, Bus, Config, HandlerError, Shape, Value};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the bus (defaults are fine here)
    let bus = Bus::new(Config::default());

    // 2. A well-behaved handler
    bus.subscribe_fn(
        "user.created",
        "welcome-mail",
        [Shape::Int, Shape::Str],
        |_ctx: CancellationToken, args: Args| async move {
            let id = args[0].as_int().unwrap_or(0);
            let name = args[1].as_str().unwrap_or("<unknown>");
            println!("[welcome-mail] sending mail to user {id} ({name})");
            Ok::<_, HandlerError>(())
        },
    )?;

    // 3. A handler that always fails — its error is recorded, not propagated
    bus.subscribe_fn(
        "user.created",
        "flaky-metrics",
        [Shape::Int, Shape::Str],
        |_ctx: CancellationToken, _args: Args| async {
            Err::<(), _>(HandlerError::msg("metrics endpoint unreachable"))
        },
    )?;

    // 4. Publish and inspect the aggregated result
    let res = bus
        .publish("user.created", vec![Value::Int(7), Value::from("ada")])
        .await?;

    println!(
        "matched={} succeeded={} failed={} elapsed={:?}",
        res.matched,
        res.succeeded,
        res.failed(),
        res.elapsed
    );
    for f in &res.failures {
        println!("  failure: handler={} kind={}", f.handler, f.error.as_label());
    }

    bus.close(Duration::from_secs(1)).await?;
    Ok(())
}
