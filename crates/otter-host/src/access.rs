//! Polymorphic property access
//!
//! `keys`, `get` and `set` are total: they accept any value (or none) and any
//! key, and they never fail. Whatever goes wrong collapses to `None` on reads
//! and to a no-op on writes, with a trace event describing why.
//!
//! `try_get` and `try_set` run the same dispatch but report the reason, so an
//! embedder can tell a missing property from one that could not be accessed.

use std::cell::{Ref, RefMut};

use tracing::trace;

use crate::coerce;
use crate::error::{AccessError, AccessResult};
use crate::kind::{Kind, Target, classify};
use crate::record::{read_field, write_field};
use crate::value::{Shared, Value};

/// Reserved pseudo-property of indexed kinds.
pub const LENGTH: &str = "length";

/// Property names of `object`; `None` for absent values and scalars.
pub fn keys(object: Option<&Value>) -> Option<Vec<String>> {
    let object = object?;
    match try_keys(object) {
        Ok(keys) => Some(keys),
        Err(err) => {
            trace!(kind = object.type_name(), error = %err, "key enumeration degraded to absent");
            None
        }
    }
}

/// Read `key` from `object`; `None` when either is absent or nothing is there.
pub fn get(object: Option<&Value>, key: Option<&str>) -> Option<Value> {
    let (object, key) = (object?, key?);
    match try_get(object, key) {
        Ok(value) => value,
        Err(err) => {
            if !err.is_not_found() {
                trace!(key, kind = object.type_name(), error = %err, "property read degraded to absent");
            }
            None
        }
    }
}

/// Write `value` to `key` on `object`; silently ignored when it cannot be done.
pub fn set(object: Option<&Value>, key: Option<&str>, value: Option<Value>) {
    let (Some(object), Some(key)) = (object, key) else {
        return;
    };
    if let Err(err) = try_set(object, key, value) {
        trace!(key, kind = object.type_name(), error = %err, "property write ignored");
    }
}

/// Element count of an indexed value (`OrderedList`, `FixedArray`, `DocumentArray`).
pub fn length(object: &Value) -> Option<usize> {
    match classify(object)? {
        Target::OrderedList(list) => list.try_borrow().ok().map(|list| list.len()),
        Target::FixedArray(array) => array.try_borrow().ok().map(|array| array.len()),
        #[cfg(feature = "document")]
        Target::DocumentArray(doc) => doc.len(),
        _ => None,
    }
}

/// Property names of `object`, or why they could not be listed.
pub fn try_keys(object: &Value) -> AccessResult<Vec<String>> {
    let target = classify(object).ok_or(AccessError::NoProperties(object.type_name()))?;
    match target {
        Target::Mapping(map) => Ok(borrow(map)?.keys().cloned().collect()),
        Target::OrderedList(list) => Ok(index_keys(borrow(list)?.len())),
        Target::FixedArray(array) => Ok(index_keys(borrow(array)?.len())),
        Target::ScriptObject(object) => Ok(borrow(object)?.keys()),
        Target::RecordObject(record) => borrow(record.cell())?
            .as_script_object()
            .map(|object| object.keys())
            .ok_or(AccessError::NoProperties("record")),
        #[cfg(feature = "document")]
        Target::DocumentNode(doc) => doc.keys().ok_or(AccessError::Busy),
        #[cfg(feature = "document")]
        Target::DocumentArray(doc) => doc.len().map(index_keys).ok_or(AccessError::Busy),
        Target::TypedRecord(record) => Ok(record.record_type().script_names()),
    }
}

/// Read `key` from `object`.
///
/// `Ok(None)` means the slot exists and holds the absent value;
/// [`AccessError::NotFound`] and [`AccessError::OutOfRange`] mean there is no
/// such slot. Every other error is a failed access.
pub fn try_get(object: &Value, key: &str) -> AccessResult<Option<Value>> {
    let target = classify(object).ok_or(AccessError::NoProperties(object.type_name()))?;
    match target {
        Target::Mapping(map) => borrow(map)?
            .get(key)
            .cloned()
            .ok_or_else(|| AccessError::NotFound(key.to_string())),
        Target::OrderedList(list) => {
            let list = borrow(list)?;
            if key == LENGTH {
                return Ok(Some(length_value(list.len())));
            }
            let index = in_bounds(index_of(key), list.len())?;
            Ok(list[index].clone())
        }
        Target::FixedArray(array) => {
            let array = borrow(array)?;
            if key == LENGTH {
                return Ok(Some(length_value(array.len())));
            }
            let index = in_bounds(index_of(key), array.len())?;
            Ok(array.get(index))
        }
        Target::ScriptObject(object) => Ok(borrow(object)?.get(key)),
        Target::RecordObject(record) => Ok(borrow(record.cell())?
            .as_script_object()
            .and_then(|object| object.get(key))),
        #[cfg(feature = "document")]
        Target::DocumentNode(doc) => doc.get_member(key),
        #[cfg(feature = "document")]
        Target::DocumentArray(doc) => {
            if key == LENGTH {
                let len = doc.len().ok_or(AccessError::Busy)?;
                return Ok(Some(length_value(len)));
            }
            doc.get_index(index_of(key))
        }
        Target::TypedRecord(record) => read_field(&*borrow(record.cell())?, key),
    }
}

/// Write `value` to `key` on `object`, reporting why a write was not performed.
pub fn try_set(object: &Value, key: &str, value: Option<Value>) -> AccessResult<()> {
    let target = classify(object).ok_or(AccessError::NoProperties(object.type_name()))?;
    match target {
        Target::Mapping(map) => {
            borrow_mut(map)?.insert(key.to_string(), value);
            Ok(())
        }
        Target::OrderedList(list) => {
            let mut list = borrow_mut(list)?;
            let index = index_of(key);
            let len = list.len();
            match usize::try_from(index) {
                Ok(i) if i < len => list[i] = value,
                Ok(i) if i == len => list.push(value),
                _ => {
                    return Err(AccessError::OutOfRange {
                        index: i64::from(index),
                        len,
                    });
                }
            }
            Ok(())
        }
        Target::FixedArray(array) => {
            let mut array = borrow_mut(array)?;
            let index = in_bounds(index_of(key), array.len())?;
            array.store(index, value)
        }
        Target::ScriptObject(object) => {
            borrow_mut(object)?.set(key, value);
            Ok(())
        }
        Target::RecordObject(record) => {
            let mut record = borrow_mut(record.cell())?;
            let object = record
                .as_script_object_mut()
                .ok_or(AccessError::NoProperties("record"))?;
            object.set(key, value);
            Ok(())
        }
        #[cfg(feature = "document")]
        Target::DocumentNode(doc) => doc.set_member(key, value),
        #[cfg(feature = "document")]
        Target::DocumentArray(doc) => doc.set_index(index_of(key), value),
        Target::TypedRecord(record) => {
            write_field(&mut *borrow_mut(record.cell())?, key, value)
        }
    }
}

impl Value {
    /// Kind used for property dispatch; `None` for scalars.
    pub fn kind(&self) -> Option<Kind> {
        Kind::of(self)
    }

    /// [`get`] on this value.
    pub fn get_property(&self, key: &str) -> Option<Value> {
        get(Some(self), Some(key))
    }

    /// [`set`] on this value.
    pub fn set_property(&self, key: &str, value: Option<Value>) {
        set(Some(self), Some(key), value);
    }

    /// [`keys`] of this value.
    pub fn property_keys(&self) -> Option<Vec<String>> {
        keys(Some(self))
    }
}

/// Keys resolve to indices through the `int32` coercion with default 0, so a
/// non-numeric key addresses the first element.
fn index_of(key: &str) -> i32 {
    coerce::parse_int32(key, 0)
}

fn in_bounds(index: i32, len: usize) -> AccessResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(AccessError::OutOfRange {
            index: i64::from(index),
            len,
        })
}

fn index_keys(len: usize) -> Vec<String> {
    (0..len).map(|i| i.to_string()).collect()
}

fn length_value(len: usize) -> Value {
    match i32::try_from(len) {
        Ok(n) => Value::Int32(n),
        Err(_) => Value::Int64(len as i64),
    }
}

fn borrow<T: ?Sized>(cell: &Shared<T>) -> AccessResult<Ref<'_, T>> {
    cell.try_borrow().map_err(|_| AccessError::Busy)
}

fn borrow_mut<T: ?Sized>(cell: &Shared<T>) -> AccessResult<RefMut<'_, T>> {
    cell.try_borrow_mut().map_err(|_| AccessError::Busy)
}
