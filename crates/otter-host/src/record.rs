//! Typed records
//!
//! A typed record is a plain Rust struct whose script-visible fields are
//! marked with `#[script]`. `#[derive(ScriptRecord)]` builds one
//! [`RecordType`] per struct, lazily and exactly once, holding a
//! [`FieldDescriptor`] per marked field and an optional [`BaseLink`] to the
//! ancestor record embedded with `#[script(base)]`.
//!
//! ```ignore
//! use otter_host::ScriptRecord;
//!
//! #[derive(ScriptRecord)]
//! struct Animal {
//!     #[script]
//!     legs: i32,
//! }
//!
//! #[derive(ScriptRecord)]
//! struct Dog {
//!     #[script(base)]
//!     animal: Animal,
//!     #[script(name = "displayName")]
//!     name: String,
//!     // Not visible to scripts
//!     chip_id: u64,
//! }
//! ```
//!
//! Lookups walk the chain from the concrete type towards the root and stop at
//! the first field whose exposed name matches, so a redeclared name in a
//! derived record shadows the ancestor's.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::array::FixedArray;
#[cfg(feature = "document")]
use crate::document::Document;
use crate::error::{AccessError, AccessResult};
use crate::object::ScriptObject;
use crate::value::{List, Mapping, Shared, Value, type_name_of};

/// Reads a field from a receiver of the descriptor's record type.
pub type ReadFn = fn(&dyn Any) -> AccessResult<Option<Value>>;

/// Writes a field on a receiver of the descriptor's record type.
pub type WriteFn = fn(&mut dyn Any, Option<Value>) -> AccessResult<()>;

/// Projects a record onto its embedded ancestor.
pub type ProjectFn = fn(&dyn Any) -> Option<&dyn Any>;

/// Mutable form of [`ProjectFn`].
pub type ProjectMutFn = fn(&mut dyn Any) -> Option<&mut dyn Any>;

/// One script-visible field.
pub struct FieldDescriptor {
    /// Name scripts use (the marker override, or the field name)
    pub name: &'static str,
    /// Rust field identifier
    pub field: &'static str,
    /// Writes are rejected when set
    pub readonly: bool,
    /// Field reader
    pub read: ReadFn,
    /// Field writer
    pub write: WriteFn,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("readonly", &self.readonly)
            .finish()
    }
}

/// Link from a record type to the ancestor embedded in it.
pub struct BaseLink {
    /// Rust field identifier holding the ancestor
    pub field: &'static str,
    /// The ancestor's record type
    pub record_type: fn() -> &'static RecordType,
    /// Borrow the ancestor out of a receiver
    pub project: ProjectFn,
    /// Mutably borrow the ancestor out of a receiver
    pub project_mut: ProjectMutFn,
}

impl fmt::Debug for BaseLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLink")
            .field("field", &self.field)
            .field("record_type", &(self.record_type)().name)
            .finish()
    }
}

/// Script-visible shape of a record type, built once per type.
#[derive(Debug)]
pub struct RecordType {
    /// Type name
    pub name: &'static str,
    /// Marked fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Embedded ancestor, if any
    pub base: Option<BaseLink>,
    /// Instances answer through [`ScriptRecord::as_script_object`]
    pub script_object: bool,
}

impl RecordType {
    /// Field declared directly on this type (ancestors are not consulted).
    pub fn own_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// This type followed by its ancestors, most-derived first.
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static RecordType> {
        std::iter::successors(Some(self), |ty| ty.base.as_ref().map(|base| (base.record_type)()))
    }

    /// First field named `name` on the leaf-to-root walk.
    pub fn lookup(&'static self, name: &str) -> Option<&'static FieldDescriptor> {
        self.lineage().find_map(|ty| ty.own_field(name))
    }

    /// Sorted, duplicate-free exposed names across the whole lineage.
    pub fn script_names(&'static self) -> Vec<String> {
        let names: BTreeSet<&'static str> = self
            .lineage()
            .flat_map(|ty| ty.fields.iter().map(|field| field.name))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }
}

/// A host struct with marked script-visible fields.
///
/// Normally derived. A record that also implements [`ScriptObject`] and
/// returns it from [`as_script_object`](ScriptRecord::as_script_object) is
/// dispatched as a script object instead of through its descriptors.
pub trait ScriptRecord: Any {
    /// Record type of `Self`.
    fn script_type() -> &'static RecordType
    where
        Self: Sized;

    /// Record type of the concrete runtime type.
    fn record_type(&self) -> &'static RecordType;

    /// Upcast for descriptor receivers.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for descriptor receivers.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Script-object view of this record, if it provides one.
    fn as_script_object(&self) -> Option<&dyn ScriptObject> {
        None
    }

    /// Mutable script-object view of this record.
    fn as_script_object_mut(&mut self) -> Option<&mut dyn ScriptObject> {
        None
    }
}

/// Shared handle to a typed record.
///
/// The record type is captured when the handle is made, so dispatch can
/// classify the value even while the record itself is borrowed.
#[derive(Clone)]
pub struct RecordHandle {
    cell: Shared<dyn ScriptRecord>,
    record_type: &'static RecordType,
}

impl RecordHandle {
    /// Handle over an existing shared record.
    pub fn new<T: ScriptRecord>(cell: Shared<T>) -> Self {
        Self {
            cell,
            record_type: T::script_type(),
        }
    }

    /// Record type of the referenced instance.
    pub fn record_type(&self) -> &'static RecordType {
        self.record_type
    }

    /// The shared record.
    pub fn cell(&self) -> &Shared<dyn ScriptRecord> {
        &self.cell
    }

    /// `true` when both handles reference the same record.
    pub fn ptr_eq(&self, other: &RecordHandle) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordHandle({})", self.record_type.name)
    }
}

/// Read the first field named `name` on the leaf-to-root walk.
pub fn read_field(record: &dyn ScriptRecord, name: &str) -> AccessResult<Option<Value>> {
    let mut ty = record.record_type();
    let mut this = record.as_any();
    loop {
        if let Some(field) = ty.own_field(name) {
            return (field.read)(this);
        }
        let Some(base) = &ty.base else {
            return Err(AccessError::NotFound(name.to_string()));
        };
        this = (base.project)(this).ok_or(AccessError::WrongReceiver(ty.name))?;
        ty = (base.record_type)();
    }
}

/// Assign the first field named `name` on the leaf-to-root walk.
pub fn write_field(
    record: &mut dyn ScriptRecord,
    name: &str,
    value: Option<Value>,
) -> AccessResult<()> {
    let mut ty = record.record_type();
    let mut this = record.as_any_mut();
    loop {
        if let Some(field) = ty.own_field(name) {
            return (field.write)(this, value);
        }
        let Some(base) = &ty.base else {
            return Err(AccessError::NotFound(name.to_string()));
        };
        this = (base.project_mut)(this).ok_or(AccessError::WrongReceiver(ty.name))?;
        ty = (base.record_type)();
    }
}

/// Conversion between a record field's Rust type and host values.
pub trait FieldValue: Sized {
    /// Current field value as a host value.
    fn to_value(&self) -> Option<Value>;

    /// Field value from a host value; mismatches are rejected, not coerced.
    fn from_value(value: Option<Value>) -> AccessResult<Self>;
}

fn mismatch(expected: &'static str, found: Option<&Value>) -> AccessError {
    AccessError::TypeMismatch {
        expected,
        found: type_name_of(found),
    }
}

macro_rules! scalar_field {
    ($ty:ty, $name:literal, $variant:ident, $view:path) => {
        impl FieldValue for $ty {
            fn to_value(&self) -> Option<Value> {
                Some(Value::$variant(*self))
            }

            fn from_value(value: Option<Value>) -> AccessResult<Self> {
                value
                    .as_ref()
                    .and_then($view)
                    .ok_or_else(|| mismatch($name, value.as_ref()))
            }
        }
    };
}

scalar_field!(bool, "bool", Bool, Value::as_bool);
scalar_field!(i32, "int32", Int32, Value::as_int32);
scalar_field!(i64, "int64", Int64, Value::widen_to_i64);
scalar_field!(f32, "float32", Float32, Value::widen_to_f32);
scalar_field!(f64, "float64", Float64, Value::widen_to_f64);

impl FieldValue for String {
    fn to_value(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }

    fn from_value(value: Option<Value>) -> AccessResult<Self> {
        match value {
            Some(Value::String(s)) => Ok(s),
            other => Err(mismatch("string", other.as_ref())),
        }
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Option<Value> {
        Some(self.clone())
    }

    fn from_value(value: Option<Value>) -> AccessResult<Self> {
        value.ok_or(AccessError::TypeMismatch {
            expected: "value",
            found: "absent",
        })
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }

    fn from_value(value: Option<Value>) -> AccessResult<Self> {
        match value {
            None => Ok(None),
            some => T::from_value(some).map(Some),
        }
    }
}

macro_rules! handle_field {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FieldValue for $ty {
            fn to_value(&self) -> Option<Value> {
                Some(Value::$variant(self.clone()))
            }

            fn from_value(value: Option<Value>) -> AccessResult<Self> {
                match value {
                    Some(Value::$variant(handle)) => Ok(handle),
                    other => Err(mismatch($name, other.as_ref())),
                }
            }
        }
    };
}

handle_field!(Shared<Mapping>, "mapping", Mapping);
handle_field!(Shared<List>, "list", List);
handle_field!(Shared<FixedArray>, "array", Array);
handle_field!(Shared<dyn ScriptObject>, "object", Object);
handle_field!(RecordHandle, "record", Record);
#[cfg(feature = "document")]
handle_field!(Document, "document", Document);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_fields_widen_but_never_narrow() {
        assert_eq!(i64::from_value(Some(Value::Int32(4))), Ok(4));
        assert_eq!(f64::from_value(Some(Value::Int64(4))), Ok(4.0));
        assert!(i32::from_value(Some(Value::Int64(4))).is_err());
        assert!(i32::from_value(Some(Value::from("4"))).is_err());
        assert!(bool::from_value(None).is_err());
    }

    #[test]
    fn test_optional_fields_accept_absent() {
        assert_eq!(Option::<String>::from_value(None), Ok(None));
        assert_eq!(
            Option::<String>::from_value(Some(Value::from("x"))),
            Ok(Some("x".to_string()))
        );
        assert_eq!(Some(3i32).to_value(), Some(Value::Int32(3)));
        assert_eq!(Option::<i32>::None.to_value(), None);
    }
}
