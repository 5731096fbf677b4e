//! # Parameter shapes declared by handlers.
//!
//! [`Shape`] is the semantic type tag a handler declares for each of its
//! parameters. Before a handler is invoked, the dispatcher checks the published
//! arguments against the declared shape list:
//! - the **count** must match exactly;
//! - each position must be **compatible** ([`Shape::accepts`]).
//!
//! [`Shape::Any`] accepts every value; all other shapes accept only their own
//! [`Value`](crate::values::Value) variant. There are no implicit numeric
//! coercions (`Int` does not accept `Float`).
//!
//! # Example
//! ```rust
//! use eventvisor::{Shape, Value};
//!
//! assert!(Shape::Int.accepts(&Value::Int(42)));
//! assert!(!Shape::Int.accepts(&Value::Str("42".into())));
//! assert!(Shape::Any.accepts(&Value::Bool(true)));
//! ```

use std::fmt;

use crate::values::value::Value;

/// Semantic type tag for one handler parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Accepts [`Value::Bool`].
    Bool,
    /// Accepts [`Value::Int`].
    Int,
    /// Accepts [`Value::Float`].
    Float,
    /// Accepts [`Value::Str`].
    Str,
    /// Accepts [`Value::Bytes`].
    Bytes,
    /// Accepts any value.
    Any,
}

impl Shape {
    /// Returns `true` if `value` is compatible with this shape.
    #[inline]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Shape::Any => true,
            _ => *self == value.shape(),
        }
    }

    /// Returns a short stable label for logs and mismatch messages.
    pub fn as_label(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Float => "float",
            Shape::Str => "str",
            Shape::Bytes => "bytes",
            Shape::Any => "any",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Renders a shape list as a signature string, e.g. `(int, str)`.
///
/// Used in [`DispatchError::ShapeMismatch`](crate::DispatchError::ShapeMismatch)
/// messages so both sides of a mismatch read the same way.
pub fn signature_label(shapes: &[Shape]) -> String {
    let mut out = String::with_capacity(2 + shapes.len() * 6);
    out.push('(');
    for (i, s) in shapes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(s.as_label());
    }
    out.push(')');
    out
}

/// Renders the shapes of an argument list as a signature string.
pub fn args_label(args: &[Value]) -> String {
    let mut out = String::with_capacity(2 + args.len() * 6);
    out.push('(');
    for (i, v) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(v.shape().as_label());
    }
    out.push(')');
    out
}

/// Checks a declared shape list against published arguments.
///
/// Returns `true` only if the count matches and every position is compatible.
pub fn compatible(shapes: &[Shape], args: &[Value]) -> bool {
    shapes.len() == args.len() && shapes.iter().zip(args).all(|(s, v)| s.accepts(v))
}
