//! # Handler abstractions.
//!
//! This module provides the core handler-related types:
//! - [`Handle`] - trait for implementing async cancelable topic handlers
//! - [`HandlerFn`] - function-based handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handle>`)
//! - [`MAX_ARITY`] - the highest parameter count a handler may declare

mod handler;
mod handler_fn;

pub use handler::{Handle, HandlerRef, MAX_ARITY};
pub use handler_fn::HandlerFn;
