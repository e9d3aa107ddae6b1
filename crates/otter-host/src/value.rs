//! Host values
//!
//! A [`Value`] is anything that crosses between script code and the host.
//! Scalars are stored inline; every kind that supports property access is a
//! shared handle, so a value handed to the script keeps pointing at the
//! host's storage and writes through `set` are visible to the owner.
//!
//! "Absent" is always `Option::<Value>::None`. There is no separate null
//! variant: a mapping entry or list slot holding nothing stores `None`.
//!
//! Handles are `Rc<RefCell<_>>`. Values are confined to one thread; sharing
//! them across threads is the host's business, not this layer's.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::array::FixedArray;
#[cfg(feature = "document")]
use crate::document::Document;
use crate::object::ScriptObject;
use crate::record::{RecordHandle, ScriptRecord};

/// Shared, interior-mutable handle used by every property-bearing kind.
pub type Shared<T> = Rc<RefCell<T>>;

/// String-keyed association; iteration order is insertion order.
pub type Mapping = IndexMap<String, Option<Value>>;

/// Growable, 0-indexed sequence.
pub type List = Vec<Option<Value>>;

/// Wrap a value in a fresh [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Nesting depth after which `Display` stops descending (cyclic graphs).
const MAX_DISPLAY_DEPTH: usize = 8;

/// A value owned by the host program and visible to script code.
#[derive(Clone)]
pub enum Value {
    /// Boolean scalar
    Bool(bool),
    /// 32-bit integer scalar
    Int32(i32),
    /// 64-bit integer scalar
    Int64(i64),
    /// 32-bit float scalar
    Float32(f32),
    /// 64-bit float scalar
    Float64(f64),
    /// Text scalar
    String(String),
    /// Key/value association
    Mapping(Shared<Mapping>),
    /// Growable ordered list
    List(Shared<List>),
    /// Fixed-length homogeneous array
    Array(Shared<FixedArray>),
    /// Host type that implements its own property protocol
    Object(Shared<dyn ScriptObject>),
    /// Plain host record with marked script-visible fields
    Record(RecordHandle),
    /// Node or array inside a parsed document
    #[cfg(feature = "document")]
    Document(Document),
}

impl Value {
    /// Build a mapping from `(key, value)` pairs.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map: Mapping = entries
            .into_iter()
            .map(|(k, v)| (k.into(), Some(v)))
            .collect();
        Value::Mapping(shared(map))
    }

    /// Build an ordered list.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(shared(items.into_iter().map(Some).collect()))
    }

    /// Wrap a fixed-length array.
    pub fn array(array: FixedArray) -> Self {
        Value::Array(shared(array))
    }

    /// Wrap a script object.
    pub fn object<T: ScriptObject>(object: T) -> Self {
        let handle: Shared<dyn ScriptObject> = shared(object);
        Value::Object(handle)
    }

    /// Wrap a typed record.
    pub fn record<T: ScriptRecord>(record: T) -> Self {
        Value::Record(RecordHandle::new(shared(record)))
    }

    /// Short name of the runtime type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Mapping(_) => "mapping",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Record(_) => "record",
            #[cfg(feature = "document")]
            Value::Document(_) => "document",
        }
    }

    /// `true` for the four numeric scalars.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::Int64(_) | Value::Float32(_) | Value::Float64(_)
        )
    }

    /// Text view of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view of a bool scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Exact `i32` view (no widening from other kinds).
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(n) => Some(*n),
            _ => None,
        }
    }

    /// `i64` view allowing the lossless widening `i32 -> i64`.
    pub fn widen_to_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(n) => Some(i64::from(*n)),
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// `f32` view allowing widening from integer kinds.
    ///
    /// Integers beyond 2^24 round to the nearest `f32`.
    pub fn widen_to_f32(&self) -> Option<f32> {
        match self {
            Value::Int32(n) => Some(*n as f32),
            Value::Int64(n) => Some(*n as f32),
            Value::Float32(n) => Some(*n),
            _ => None,
        }
    }

    /// `f64` view allowing widening from every numeric kind.
    ///
    /// `i64` values beyond 2^53 round to the nearest `f64`.
    pub fn widen_to_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(n) => Some(f64::from(*n)),
            Value::Int64(n) => Some(*n as f64),
            Value::Float32(n) => Some(f64::from(*n)),
            Value::Float64(n) => Some(*n),
            _ => None,
        }
    }

    /// Document handle, if this value is one.
    #[cfg(feature = "document")]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth > MAX_DISPLAY_DEPTH {
            return f.write_str("...");
        }
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(n) => write!(f, "{n}"),
            Value::Int64(n) => write!(f, "{n}"),
            Value::Float32(n) => write!(f, "{n}"),
            Value::Float64(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Mapping(map) => {
                let Ok(map) = map.try_borrow() else {
                    return f.write_str("{...}");
                };
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    write_slot(value.as_ref(), f, depth + 1)?;
                }
                f.write_str("}")
            }
            Value::List(list) => {
                let Ok(list) = list.try_borrow() else {
                    return f.write_str("[...]");
                };
                f.write_str("[")?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_slot(value.as_ref(), f, depth + 1)?;
                }
                f.write_str("]")
            }
            Value::Array(array) => {
                let Ok(array) = array.try_borrow() else {
                    return f.write_str("[...]");
                };
                f.write_str("[")?;
                for i in 0..array.len() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_slot(array.get(i).as_ref(), f, depth + 1)?;
                }
                f.write_str("]")
            }
            Value::Object(object) => match object.try_borrow() {
                Ok(object) => write!(f, "[object {}]", object.class_name()),
                Err(_) => f.write_str("[object]"),
            },
            Value::Record(record) => write!(f, "[record {}]", record.record_type().name),
            #[cfg(feature = "document")]
            Value::Document(doc) => match doc.to_json() {
                Some(json) => write!(f, "{json}"),
                None => f.write_str("null"),
            },
        }
    }
}

fn write_slot(slot: Option<&Value>, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match slot {
        Some(value) => value.write_text(f, depth),
        None => f.write_str("null"),
    }
}

/// Type name of a possibly-absent value.
pub fn type_name_of(value: Option<&Value>) -> &'static str {
    value.map_or("absent", Value::type_name)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, 0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int32(n) => write!(f, "Int32({n})"),
            Value::Int64(n) => write!(f, "Int64({n})"),
            Value::Float32(n) => write!(f, "Float32({n:?})"),
            Value::Float64(n) => write!(f, "Float64({n:?})"),
            Value::String(s) => write!(f, "String({s:?})"),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

/// Scalars compare by value, handles by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            #[cfg(feature = "document")]
            (Value::Document(a), Value::Document(b)) => a.same_node(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float32(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<RecordHandle> for Value {
    fn from(handle: RecordHandle) -> Self {
        Value::Record(handle)
    }
}

impl From<FixedArray> for Value {
    fn from(array: FixedArray) -> Self {
        Value::array(array)
    }
}

#[cfg(feature = "document")]
impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}
