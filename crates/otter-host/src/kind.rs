//! Kind dispatch
//!
//! The kind of a host value is decided at every access by running an ordered
//! list of guards; the first guard that accepts the value wins. The order is
//! part of the contract: a record that also offers a script-object view must
//! be treated as a script object, never through its field descriptors.
//!
//! | Precedence | Kind |
//! |---|---|
//! | 1 | Mapping |
//! | 2 | OrderedList |
//! | 3 | FixedArray |
//! | 4 | ScriptObject |
//! | 5 | DocumentNode |
//! | 6 | DocumentArray |
//! | 7 | TypedRecord |

use std::fmt;

use crate::array::FixedArray;
#[cfg(feature = "document")]
use crate::document::Document;
use crate::object::ScriptObject;
use crate::record::RecordHandle;
use crate::value::{List, Mapping, Shared, Value};

/// Runtime shape of a host value for property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// String-keyed association
    Mapping,
    /// Growable list
    OrderedList,
    /// Fixed-length homogeneous array
    FixedArray,
    /// Host type with its own property protocol
    ScriptObject,
    /// Object node of a parsed document
    DocumentNode,
    /// Array node of a parsed document
    DocumentArray,
    /// Record with marked fields
    TypedRecord,
}

impl Kind {
    /// Kind of `value`, or `None` for scalars.
    pub fn of(value: &Value) -> Option<Kind> {
        classify(value).map(|target| target.kind())
    }

    /// Kinds addressed by index with a `length` pseudo-property.
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            Kind::OrderedList | Kind::FixedArray | Kind::DocumentArray
        )
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Mapping => "Mapping",
            Kind::OrderedList => "OrderedList",
            Kind::FixedArray => "FixedArray",
            Kind::ScriptObject => "ScriptObject",
            Kind::DocumentNode => "DocumentNode",
            Kind::DocumentArray => "DocumentArray",
            Kind::TypedRecord => "TypedRecord",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified value: the winning kind together with the handle to use.
pub(crate) enum Target<'a> {
    Mapping(&'a Shared<Mapping>),
    OrderedList(&'a Shared<List>),
    FixedArray(&'a Shared<FixedArray>),
    ScriptObject(&'a Shared<dyn ScriptObject>),
    /// Record answering through its script-object view
    RecordObject(&'a RecordHandle),
    #[cfg(feature = "document")]
    DocumentNode(&'a Document),
    #[cfg(feature = "document")]
    DocumentArray(&'a Document),
    TypedRecord(&'a RecordHandle),
}

impl Target<'_> {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Target::Mapping(_) => Kind::Mapping,
            Target::OrderedList(_) => Kind::OrderedList,
            Target::FixedArray(_) => Kind::FixedArray,
            Target::ScriptObject(_) | Target::RecordObject(_) => Kind::ScriptObject,
            #[cfg(feature = "document")]
            Target::DocumentNode(_) => Kind::DocumentNode,
            #[cfg(feature = "document")]
            Target::DocumentArray(_) => Kind::DocumentArray,
            Target::TypedRecord(_) => Kind::TypedRecord,
        }
    }
}

type Guard = for<'a> fn(&'a Value) -> Option<Target<'a>>;

/// Guards in precedence order.
const GUARDS: [Guard; 7] = [
    as_mapping,
    as_ordered_list,
    as_fixed_array,
    as_script_object,
    as_document_node,
    as_document_array,
    as_typed_record,
];

pub(crate) fn classify(value: &Value) -> Option<Target<'_>> {
    GUARDS.iter().find_map(|guard| guard(value))
}

fn as_mapping(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Mapping(map) => Some(Target::Mapping(map)),
        _ => None,
    }
}

fn as_ordered_list(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::List(list) => Some(Target::OrderedList(list)),
        _ => None,
    }
}

fn as_fixed_array(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Array(array) => Some(Target::FixedArray(array)),
        _ => None,
    }
}

fn as_script_object(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Object(object) => Some(Target::ScriptObject(object)),
        Value::Record(record) if record.record_type().script_object => {
            Some(Target::RecordObject(record))
        }
        _ => None,
    }
}

#[cfg(feature = "document")]
fn as_document_node(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Document(doc) if doc.is_node() => Some(Target::DocumentNode(doc)),
        _ => None,
    }
}

#[cfg(feature = "document")]
fn as_document_array(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Document(doc) if doc.is_array() => Some(Target::DocumentArray(doc)),
        _ => None,
    }
}

#[cfg(not(feature = "document"))]
fn as_document_node(_value: &Value) -> Option<Target<'_>> {
    None
}

#[cfg(not(feature = "document"))]
fn as_document_array(_value: &Value) -> Option<Target<'_>> {
    None
}

fn as_typed_record(value: &Value) -> Option<Target<'_>> {
    match value {
        Value::Record(record) => Some(Target::TypedRecord(record)),
        _ => None,
    }
}
