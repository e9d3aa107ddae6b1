//! Script objects
//!
//! A host type that wants full control over what scripts see implements
//! [`ScriptObject`]. The accessor hands every `keys`/`get`/`set` on such a
//! value straight to the implementation.

use crate::value::Value;

/// A host type implementing its own property protocol.
///
/// Implementations must keep the accessor's contract: never panic, return
/// `None` for anything unknown, and ignore writes they cannot honour.
pub trait ScriptObject: 'static {
    /// Property names, in whatever order the object chooses.
    fn keys(&self) -> Vec<String>;

    /// Read a property.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a property; `None` is the absent value.
    fn set(&mut self, key: &str, value: Option<Value>);

    /// Name used when the object is rendered as text.
    fn class_name(&self) -> &str {
        "Object"
    }
}
