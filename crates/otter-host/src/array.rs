//! Fixed-length homogeneous arrays
//!
//! The element type is fixed at construction. Stores accept the element type
//! itself or a widening numeric conversion (`i32 -> i64 -> f32 -> f64`);
//! anything else is a type mismatch and leaves the slot untouched. Integers
//! widened to a float slot are rounded to the nearest representable value.

use crate::error::{AccessError, AccessResult};
use crate::value::{Value, type_name_of};

/// Element type of a [`FixedArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// `bool`
    Bool,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// `f32`
    Float32,
    /// `f64`
    Float64,
    /// Text, slots may be empty
    String,
    /// Any host value, slots may be empty
    Any,
}

impl ElementType {
    /// Diagnostic name.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::String => "string",
            ElementType::Any => "any",
        }
    }
}

/// A fixed-length array; the length never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedArray {
    /// `bool` elements
    Bool(Box<[bool]>),
    /// `i32` elements
    Int32(Box<[i32]>),
    /// `i64` elements
    Int64(Box<[i64]>),
    /// `f32` elements
    Float32(Box<[f32]>),
    /// `f64` elements
    Float64(Box<[f64]>),
    /// Text elements
    String(Box<[Option<String>]>),
    /// Arbitrary host values
    Any(Box<[Option<Value>]>),
}

impl FixedArray {
    /// Array of `len` default elements of the given type.
    pub fn filled(element: ElementType, len: usize) -> Self {
        match element {
            ElementType::Bool => FixedArray::Bool(vec![false; len].into()),
            ElementType::Int32 => FixedArray::Int32(vec![0; len].into()),
            ElementType::Int64 => FixedArray::Int64(vec![0; len].into()),
            ElementType::Float32 => FixedArray::Float32(vec![0.0; len].into()),
            ElementType::Float64 => FixedArray::Float64(vec![0.0; len].into()),
            ElementType::String => FixedArray::String(vec![None; len].into()),
            ElementType::Any => FixedArray::Any(vec![None; len].into()),
        }
    }

    /// Element type.
    pub fn element_type(&self) -> ElementType {
        match self {
            FixedArray::Bool(_) => ElementType::Bool,
            FixedArray::Int32(_) => ElementType::Int32,
            FixedArray::Int64(_) => ElementType::Int64,
            FixedArray::Float32(_) => ElementType::Float32,
            FixedArray::Float64(_) => ElementType::Float64,
            FixedArray::String(_) => ElementType::String,
            FixedArray::Any(_) => ElementType::Any,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            FixedArray::Bool(a) => a.len(),
            FixedArray::Int32(a) => a.len(),
            FixedArray::Int64(a) => a.len(),
            FixedArray::Float32(a) => a.len(),
            FixedArray::Float64(a) => a.len(),
            FixedArray::String(a) => a.len(),
            FixedArray::Any(a) => a.len(),
        }
    }

    /// `true` when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` as a host value; `None` when out of range or empty.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            FixedArray::Bool(a) => a.get(index).map(|b| Value::Bool(*b)),
            FixedArray::Int32(a) => a.get(index).map(|n| Value::Int32(*n)),
            FixedArray::Int64(a) => a.get(index).map(|n| Value::Int64(*n)),
            FixedArray::Float32(a) => a.get(index).map(|n| Value::Float32(*n)),
            FixedArray::Float64(a) => a.get(index).map(|n| Value::Float64(*n)),
            FixedArray::String(a) => a.get(index).cloned().flatten().map(Value::String),
            FixedArray::Any(a) => a.get(index).cloned().flatten(),
        }
    }

    /// Replace the element at `index`.
    pub fn store(&mut self, index: usize, value: Option<Value>) -> AccessResult<()> {
        let len = self.len();
        if index >= len {
            return Err(AccessError::OutOfRange {
                index: index as i64,
                len,
            });
        }
        let mismatch = |element: ElementType, value: Option<&Value>| AccessError::TypeMismatch {
            expected: element.name(),
            found: type_name_of(value),
        };
        let element = self.element_type();
        match self {
            FixedArray::Bool(a) => {
                a[index] = value
                    .as_ref()
                    .and_then(Value::as_bool)
                    .ok_or_else(|| mismatch(element, value.as_ref()))?;
            }
            FixedArray::Int32(a) => {
                a[index] = value
                    .as_ref()
                    .and_then(Value::as_int32)
                    .ok_or_else(|| mismatch(element, value.as_ref()))?;
            }
            FixedArray::Int64(a) => {
                a[index] = value
                    .as_ref()
                    .and_then(Value::widen_to_i64)
                    .ok_or_else(|| mismatch(element, value.as_ref()))?;
            }
            FixedArray::Float32(a) => {
                a[index] = value
                    .as_ref()
                    .and_then(Value::widen_to_f32)
                    .ok_or_else(|| mismatch(element, value.as_ref()))?;
            }
            FixedArray::Float64(a) => {
                a[index] = value
                    .as_ref()
                    .and_then(Value::widen_to_f64)
                    .ok_or_else(|| mismatch(element, value.as_ref()))?;
            }
            FixedArray::String(a) => {
                a[index] = match value {
                    None => None,
                    Some(Value::String(s)) => Some(s),
                    Some(other) => return Err(mismatch(element, Some(&other))),
                };
            }
            FixedArray::Any(a) => a[index] = value,
        }
        Ok(())
    }
}

impl From<Vec<i32>> for FixedArray {
    fn from(v: Vec<i32>) -> Self {
        FixedArray::Int32(v.into())
    }
}

impl From<Vec<i64>> for FixedArray {
    fn from(v: Vec<i64>) -> Self {
        FixedArray::Int64(v.into())
    }
}

impl From<Vec<f32>> for FixedArray {
    fn from(v: Vec<f32>) -> Self {
        FixedArray::Float32(v.into())
    }
}

impl From<Vec<f64>> for FixedArray {
    fn from(v: Vec<f64>) -> Self {
        FixedArray::Float64(v.into())
    }
}

impl From<Vec<bool>> for FixedArray {
    fn from(v: Vec<bool>) -> Self {
        FixedArray::Bool(v.into())
    }
}

impl From<Vec<String>> for FixedArray {
    fn from(v: Vec<String>) -> Self {
        FixedArray::String(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<Value>> for FixedArray {
    fn from(v: Vec<Value>) -> Self {
        FixedArray::Any(v.into_iter().map(Some).collect())
    }
}
