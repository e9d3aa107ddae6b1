//! Parsed documents
//!
//! A [`Document`] is a handle to one node inside a `serde_json` tree: a shared
//! root plus a JSON pointer. Reading an object or array member yields another
//! handle into the same tree, so writes through nested handles land in the
//! original document instead of in a copy.
//!
//! Objects behave like mappings (`DocumentNode`) except that storing the
//! absent value removes the member. Arrays (`DocumentArray`) are indexed like
//! lists but never grow through property writes.

use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::error::{AccessError, AccessResult};
use crate::value::{Shared, Value, shared};

/// Handle to a node inside a shared JSON tree.
#[derive(Clone)]
pub struct Document {
    root: Shared<Json>,
    pointer: String,
}

impl Document {
    /// Wrap a JSON tree; the handle points at its root.
    pub fn new(json: Json) -> Self {
        Self {
            root: shared(json),
            pointer: String::new(),
        }
    }

    /// Parse JSON text into a document.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self::new)
    }

    /// JSON pointer of this node relative to the root (`""` for the root).
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Handle to the root of the tree this node belongs to.
    pub fn root(&self) -> Document {
        Self {
            root: self.root.clone(),
            pointer: String::new(),
        }
    }

    /// Copy of the subtree at this node; `None` if the node no longer exists.
    pub fn to_json(&self) -> Option<Json> {
        self.with_node(Json::clone)
    }

    /// `true` when both handles address the same node of the same tree.
    pub fn same_node(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.root, &other.root) && self.pointer == other.pointer
    }

    /// `true` when the node is a JSON object.
    pub fn is_node(&self) -> bool {
        self.with_node(Json::is_object).unwrap_or(false)
    }

    /// `true` when the node is a JSON array.
    pub fn is_array(&self) -> bool {
        self.with_node(Json::is_array).unwrap_or(false)
    }

    /// Member names of an object node, in document order.
    pub fn keys(&self) -> Option<Vec<String>> {
        self.with_node(|node| node.as_object().map(|obj| obj.keys().cloned().collect()))
            .flatten()
    }

    /// Element count of an array node.
    pub fn len(&self) -> Option<usize> {
        self.with_node(|node| node.as_array().map(Vec::len)).flatten()
    }

    pub(crate) fn get_member(&self, key: &str) -> AccessResult<Option<Value>> {
        let root = self.root.try_borrow().map_err(|_| AccessError::Busy)?;
        let member = root
            .pointer(&self.pointer)
            .and_then(Json::as_object)
            .and_then(|obj| obj.get(key))
            .ok_or_else(|| AccessError::NotFound(key.to_string()))?;
        Ok(self.adopt(member, key))
    }

    pub(crate) fn set_member(&self, key: &str, value: Option<Value>) -> AccessResult<()> {
        let json = match &value {
            Some(value) => Some(to_json(Some(value))?),
            None => None,
        };
        let mut root = self.root.try_borrow_mut().map_err(|_| AccessError::Busy)?;
        let obj = root
            .pointer_mut(&self.pointer)
            .and_then(Json::as_object_mut)
            .ok_or_else(|| AccessError::NotFound(self.pointer.clone()))?;
        match json {
            Some(json) => {
                obj.insert(key.to_string(), json);
            }
            None => {
                obj.remove(key);
            }
        }
        Ok(())
    }

    pub(crate) fn get_index(&self, index: i32) -> AccessResult<Option<Value>> {
        let root = self.root.try_borrow().map_err(|_| AccessError::Busy)?;
        let items = root
            .pointer(&self.pointer)
            .and_then(Json::as_array)
            .ok_or_else(|| AccessError::NotFound(self.pointer.clone()))?;
        let slot = usize::try_from(index).ok().and_then(|i| items.get(i));
        match slot {
            Some(item) => Ok(self.adopt(item, &index.to_string())),
            None => Err(AccessError::OutOfRange {
                index: i64::from(index),
                len: items.len(),
            }),
        }
    }

    pub(crate) fn set_index(&self, index: i32, value: Option<Value>) -> AccessResult<()> {
        let json = to_json(value.as_ref())?;
        let mut root = self.root.try_borrow_mut().map_err(|_| AccessError::Busy)?;
        let items = root
            .pointer_mut(&self.pointer)
            .and_then(Json::as_array_mut)
            .ok_or_else(|| AccessError::NotFound(self.pointer.clone()))?;
        let len = items.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| items.get_mut(i))
            .ok_or(AccessError::OutOfRange {
                index: i64::from(index),
                len,
            })?;
        *slot = json;
        Ok(())
    }

    fn with_node<R>(&self, f: impl FnOnce(&Json) -> R) -> Option<R> {
        let root = self.root.try_borrow().ok()?;
        root.pointer(&self.pointer).map(f)
    }

    fn child(&self, token: &str) -> Document {
        let escaped = token.replace('~', "~0").replace('/', "~1");
        Self {
            root: self.root.clone(),
            pointer: format!("{}/{}", self.pointer, escaped),
        }
    }

    /// Scalars are copied out; objects and arrays become handles into the tree.
    fn adopt(&self, json: &Json, token: &str) -> Option<Value> {
        match json {
            Json::Null => None,
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => Some(number_value(n)),
            Json::String(s) => Some(Value::String(s.clone())),
            Json::Object(_) | Json::Array(_) => Some(Value::Document(self.child(token))),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl From<Json> for Document {
    fn from(json: Json) -> Self {
        Document::new(json)
    }
}

fn number_value(n: &serde_json::Number) -> Value {
    match n.as_i64() {
        Some(i) => match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        },
        None => Value::Float64(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Convert a host value into JSON.
///
/// Script objects and records have no document form; cyclic mappings and
/// lists and non-finite floats are rejected as well.
pub fn to_json(value: Option<&Value>) -> AccessResult<Json> {
    let mut seen = Vec::new();
    convert(value, &mut seen)
}

fn convert(value: Option<&Value>, seen: &mut Vec<*const ()>) -> AccessResult<Json> {
    let Some(value) = value else {
        return Ok(Json::Null);
    };
    let json = match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int32(n) => Json::from(*n),
        Value::Int64(n) => Json::from(*n),
        Value::Float32(n) => finite(f64::from(*n), "float32")?,
        Value::Float64(n) => finite(*n, "float64")?,
        Value::String(s) => Json::String(s.clone()),
        Value::Mapping(map) => {
            enter(seen, Rc::as_ptr(map).cast(), "mapping")?;
            let map = map.try_borrow().map_err(|_| AccessError::Busy)?;
            let mut out = serde_json::Map::new();
            for (key, item) in map.iter() {
                out.insert(key.clone(), convert(item.as_ref(), seen)?);
            }
            seen.pop();
            Json::Object(out)
        }
        Value::List(list) => {
            enter(seen, Rc::as_ptr(list).cast(), "list")?;
            let list = list.try_borrow().map_err(|_| AccessError::Busy)?;
            let items = list
                .iter()
                .map(|item| convert(item.as_ref(), seen))
                .collect::<AccessResult<Vec<_>>>()?;
            seen.pop();
            Json::Array(items)
        }
        Value::Array(array) => {
            enter(seen, Rc::as_ptr(array).cast(), "array")?;
            let array = array.try_borrow().map_err(|_| AccessError::Busy)?;
            let items = (0..array.len())
                .map(|i| convert(array.get(i).as_ref(), seen))
                .collect::<AccessResult<Vec<_>>>()?;
            seen.pop();
            Json::Array(items)
        }
        Value::Document(doc) => doc.to_json().unwrap_or(Json::Null),
        Value::Object(_) | Value::Record(_) => {
            return Err(AccessError::Unrepresentable(value.type_name()));
        }
    };
    Ok(json)
}

fn finite(n: f64, type_name: &'static str) -> AccessResult<Json> {
    serde_json::Number::from_f64(n)
        .map(Json::Number)
        .ok_or(AccessError::Unrepresentable(type_name))
}

fn enter(seen: &mut Vec<*const ()>, ptr: *const (), type_name: &'static str) -> AccessResult<()> {
    if seen.contains(&ptr) {
        return Err(AccessError::Unrepresentable(type_name));
    }
    seen.push(ptr);
    Ok(())
}
