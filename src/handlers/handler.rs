//! # Handler abstraction.
//!
//! This module defines the [`Handle`] trait (async, cancelable, shape-declaring).
//! The common handle type is [`HandlerRef`], an `Arc<dyn Handle>` suitable for
//! sharing across the bus; one handler value may be registered under several
//! topics independently.
//!
//! A handler receives a [`CancellationToken`] and should periodically check it
//! to stop cooperatively when the publish deadline elapses or the publish call
//! is cancelled. The bus never aborts a running handler.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::values::{Args, Shape};

/// Highest parameter count a handler may declare.
///
/// `subscribe` rejects declarations above this with
/// [`BusError::InvalidHandler`](crate::BusError::InvalidHandler).
pub const MAX_ARITY: usize = 16;

/// Shared handle to a handler (`Arc<dyn Handle>`).
pub type HandlerRef = Arc<dyn Handle>;

/// # Asynchronous, cancelable topic handler.
///
/// A `Handle` declares a stable [`name`](Handle::name), an ordered parameter
/// [`shapes`](Handle::shapes) signature, and an async [`call`](Handle::call)
/// method that receives a [`CancellationToken`] plus the published arguments.
///
/// The dispatcher checks `shapes()` against the publish arguments before every
/// invocation; `call` only ever sees an argument list that matched.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use eventvisor::{Args, Handle, HandlerError, Shape};
///
/// struct Greeter;
///
/// #[async_trait]
/// impl Handle for Greeter {
///     fn name(&self) -> &str { "greeter" }
///
///     fn shapes(&self) -> &[Shape] { &[Shape::Str] }
///
///     async fn call(&self, ctx: CancellationToken, args: Args) -> Result<(), HandlerError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         let who = args[0].as_str().unwrap_or("world");
///         println!("hello, {who}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handle: Send + Sync + 'static {
    /// Returns a stable, human-readable handler name (for logs and failure records).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the ordered parameter shapes this handler expects.
    ///
    /// The list is fixed at registration time; the dispatcher reads it once
    /// per publish call.
    fn shapes(&self) -> &[Shape];

    /// Handles one publish call.
    ///
    /// Implementations should check `ctx.is_cancelled()` at natural pause
    /// points and return promptly when cancelled; long non-cooperative work
    /// keeps running in the background after a publish deadline.
    ///
    /// `args` is guaranteed to match [`shapes`](Handle::shapes) in count and
    /// per-position compatibility.
    async fn call(&self, ctx: CancellationToken, args: Args) -> Result<(), HandlerError>;
}
