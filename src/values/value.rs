//! # Published argument values.
//!
//! [`Value`] is the tagged argument carrier for publish calls. A publish call
//! passes an ordered list of values; the dispatcher shares that list across
//! all concurrent handler invocations as [`Args`](crate::values::Args)
//! (`Arc<[Value]>`), so clones are cheap and handler invocations never copy
//! payload bytes.
//!
//! String and byte payloads are `Arc`-backed for the same reason.
//!
//! # Example
//! ```rust
//! use eventvisor::{Shape, Value};
//!
//! let v: Value = "hello".into();
//! assert_eq!(v.shape(), Shape::Str);
//! assert_eq!(v.as_str(), Some("hello"));
//! assert_eq!(v.as_int(), None);
//! ```

use std::sync::Arc;

use crate::values::shape::Shape;

/// A single published argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer (64-bit).
    Int(i64),
    /// Floating point (64-bit).
    Float(f64),
    /// UTF-8 string, shared.
    Str(Arc<str>),
    /// Raw bytes, shared.
    Bytes(Arc<[u8]>),
}

impl Value {
    /// Returns the shape of this value.
    #[inline]
    pub fn shape(&self) -> Shape {
        match self {
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) => Shape::Int,
            Value::Float(_) => Shape::Float,
            Value::Str(_) => Shape::Str,
            Value::Bytes(_) => Shape::Bytes,
        }
    }

    /// Returns the boolean payload, if this is a `Bool`.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an `Int`.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float`.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `Str`.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte payload, if this is a `Bytes`.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s.as_str()))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Arc::from(b.as_slice()))
    }
}
