//! # Example: cancel_and_timeout
//!
//! Demonstrates per-call deadlines and cooperative cancellation.
//!
//! Shows how to:
//! - Set a per-call deadline with [`PublishOptions::with_timeout`].
//! - Attach a [`CancellationToken`] with [`PublishOptions::with_cancel`].
//! - Write handlers that check their token and stop early.
//!
//! ## Flow
//! ```text
//! publish_with("work", opts{timeout: 100ms})
//!     ├─► "fast"        ─ completes within the deadline
//!     ├─► "cooperative" ─ sees child-token cancel at the deadline, stops
//!     └─► "stubborn"    ─ ignores the token, reported TimedOut,
//!                         left to finish in the background
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_and_timeout
//! ```

use std::time::Duration;

use eventvisor::{Args, Bus, Config, HandlerError, PublishOptions};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Bus::new(Config::default());

    bus.subscribe_fn(
        "work",
        "fast",
        [],
        |_ctx: CancellationToken, _args: Args| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            println!("[fast] done");
            Ok::<_, HandlerError>(())
        },
    )?;

    bus.subscribe_fn(
        "work",
        "cooperative",
        [],
        |ctx: CancellationToken, _args: Args| async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(10)) => {
                    println!("[cooperative] finished work");
                }
                _ = ctx.cancelled() => {
                    println!("[cooperative] cancelled, stopping early");
                }
            }
            Ok::<_, HandlerError>(())
        },
    )?;

    bus.subscribe_fn(
        "work",
        "stubborn",
        [],
        |_ctx: CancellationToken, _args: Args| async {
            // Ignores its token; the publish call abandons it at the deadline.
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, HandlerError>(())
        },
    )?;

    let opts = PublishOptions::new().with_timeout(Duration::from_millis(100));
    let res = bus.publish_with("work", vec![], opts).await?;

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

    // A pre-cancelled call skips handlers that have not started.
    let token = CancellationToken::new();
    token.cancel();
    let res = bus
        .publish_with("work", vec![], PublishOptions::new().with_cancel(token))
        .await?;
    println!("pre-cancelled: matched={} succeeded={}", res.matched, res.succeeded);

    bus.close(Duration::from_millis(200)).await?;
    Ok(())
}
