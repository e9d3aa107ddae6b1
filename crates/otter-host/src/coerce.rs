//! Value coercion
//!
//! One total function per primitive target. Each takes a possibly-absent
//! value and a default and never fails: anything that cannot be interpreted
//! as the target degrades to the default.
//!
//! Rules, first match wins:
//!
//! 1. absent value -> default
//! 2. same kind (numeric kinds convert among themselves: integers truncate,
//!    floats use `as` conversion)
//! 3. numeric -> bool: `false` iff zero
//! 4. text -> bool: `true` iff exactly `"true"` or `"yes"`
//! 5. text -> number: locale-invariant parse of the trimmed text, default on
//!    failure
//! 6. text -> text: unchanged
//! 7. anything -> text: canonical `Display` form
//! 8. otherwise default

use crate::value::Value;

/// Coerce to text.
pub fn to_string(value: Option<&Value>, default: impl Into<String>) -> String {
    match value {
        None => default.into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Coerce to a 32-bit integer.
pub fn to_int32(value: Option<&Value>, default: i32) -> i32 {
    match value {
        None => default,
        Some(Value::Int32(n)) => *n,
        Some(Value::Int64(n)) => *n as i32,
        Some(Value::Float32(n)) => *n as i32,
        Some(Value::Float64(n)) => *n as i32,
        Some(Value::String(s)) => parse_int32(s, default),
        Some(_) => default,
    }
}

/// Coerce to a 64-bit integer.
pub fn to_int64(value: Option<&Value>, default: i64) -> i64 {
    match value {
        None => default,
        Some(Value::Int32(n)) => i64::from(*n),
        Some(Value::Int64(n)) => *n,
        Some(Value::Float32(n)) => *n as i64,
        Some(Value::Float64(n)) => *n as i64,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        Some(_) => default,
    }
}

/// Coerce to a 32-bit float.
pub fn to_float32(value: Option<&Value>, default: f32) -> f32 {
    match value {
        None => default,
        Some(Value::Int32(n)) => *n as f32,
        Some(Value::Int64(n)) => *n as f32,
        Some(Value::Float32(n)) => *n,
        Some(Value::Float64(n)) => *n as f32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        Some(_) => default,
    }
}

/// Coerce to a 64-bit float.
pub fn to_float64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        None => default,
        Some(Value::Int32(n)) => f64::from(*n),
        Some(Value::Int64(n)) => *n as f64,
        Some(Value::Float32(n)) => f64::from(*n),
        Some(Value::Float64(n)) => *n,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        Some(_) => default,
    }
}

/// Coerce to a boolean.
pub fn to_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::Int32(n)) => *n != 0,
        Some(Value::Int64(n)) => *n != 0,
        Some(Value::Float32(n)) => *n != 0.0,
        Some(Value::Float64(n)) => *n != 0.0,
        Some(Value::String(s)) => s == "true" || s == "yes",
        Some(_) => default,
    }
}

/// Parse a decimal `i32` the way [`to_int32`] parses text.
///
/// Property keys go through here when they are resolved to list indices.
pub fn parse_int32(text: &str, default: i32) -> i32 {
    text.trim().parse().unwrap_or(default)
}

/// Primitive types that can be produced by coercion.
pub trait Coerce: Sized {
    /// Coerce `value` to `Self`, falling back to `default`.
    fn coerce(value: Option<&Value>, default: Self) -> Self;
}

impl Coerce for String {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_string(value, default)
    }
}

impl Coerce for i32 {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_int32(value, default)
    }
}

impl Coerce for i64 {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_int64(value, default)
    }
}

impl Coerce for f32 {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_float32(value, default)
    }
}

impl Coerce for f64 {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_float64(value, default)
    }
}

impl Coerce for bool {
    fn coerce(value: Option<&Value>, default: Self) -> Self {
        to_bool(value, default)
    }
}

impl Value {
    /// Coerce this value to a primitive; see [`Coerce`].
    pub fn coerce<T: Coerce>(&self, default: T) -> T {
        T::coerce(Some(self), default)
    }
}
