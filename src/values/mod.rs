//! # Argument values and parameter shapes.
//!
//! This module provides the typed argument model for publish calls:
//! - [`Value`] — tagged argument carrier (bool/int/float/str/bytes);
//! - [`Shape`] — the semantic type tag a handler declares per parameter;
//! - [`Args`] — the shared argument list handed to each handler invocation.
//!
//! Shape checking replaces runtime reflection: a handler declares its
//! parameter shapes up front, and the dispatcher rejects incompatible publish
//! arguments with a recorded mismatch instead of invoking the handler.

mod shape;
mod value;

use std::sync::Arc;

pub use shape::{args_label, compatible, signature_label, Shape};
pub use value::Value;

/// Shared argument list for one publish call.
///
/// Cloned per handler invocation; cloning is an `Arc` bump, never a payload copy.
pub type Args = Arc<[Value]>;
