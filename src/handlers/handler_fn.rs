//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(CancellationToken, Args) -> Fut`,
//! producing a fresh future per invocation. This avoids shared mutable state;
//! if a handler needs state across invocations, capture an `Arc<...>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use eventvisor::{Args, HandlerError, HandlerFn, HandlerRef, Shape};
//!
//! let h: HandlerRef = HandlerFn::arc(
//!     "audit",
//!     [Shape::Int, Shape::Str],
//!     |_ctx: CancellationToken, args: Args| async move {
//!         let id = args[0].as_int().unwrap_or(0);
//!         let action = args[1].as_str().unwrap_or("");
//!         println!("audit: user={id} action={action}");
//!         Ok::<_, HandlerError>(())
//!     },
//! );
//!
//! assert_eq!(h.name(), "audit");
//! assert_eq!(h.shapes(), [Shape::Int, Shape::Str]);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::handler::Handle;
use crate::values::{Args, Shape};

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per invocation, plus the
/// parameter shapes the closure expects.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    shapes: Vec<Shape>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        shapes: impl Into<Vec<Shape>>,
        f: F,
    ) -> Self {
        Self {
            name: name.into(),
            shapes: shapes.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(
        name: impl Into<Cow<'static, str>>,
        shapes: impl Into<Vec<Shape>>,
        f: F,
    ) -> Arc<Self> {
        Arc::new(Self::new(name, shapes, f))
    }
}

#[async_trait]
impl<F, Fut> Handle for HandlerFn<F>
where
    F: Fn(CancellationToken, Args) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    async fn call(&self, ctx: CancellationToken, args: Args) -> Result<(), HandlerError> {
        (self.f)(ctx, args).await
    }
}
