//! Property access across host value kinds
//!
//! Covers the kind precedence table: mappings, ordered lists, fixed arrays
//! and script objects. Records and documents have their own test files.

use otter_host::access::LENGTH;
use otter_host::coerce::{to_bool, to_int32};
use otter_host::{
    AccessError, ElementType, FixedArray, Kind, ScriptObject, Value, get, keys, length, set,
    try_get, try_set,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ints(values: &[i32]) -> Value {
    Value::list(values.iter().copied().map(Value::Int32))
}

// ============================================================================
// Mapping
// ============================================================================

#[test]
fn test_mapping_round_trip() {
    init_tracing();
    let map = Value::mapping([("a", Value::Int32(1))]);
    set(Some(&map), Some("b"), Some(Value::from("two")));
    assert_eq!(get(Some(&map), Some("b")), Some(Value::from("two")));
    assert_eq!(get(Some(&map), Some("a")), Some(Value::Int32(1)));
    assert_eq!(get(Some(&map), Some("missing")), None);
}

#[test]
fn test_mapping_keys_follow_insertion_order() {
    let map = Value::mapping([("zeta", Value::Int32(1)), ("alpha", Value::Int32(2))]);
    map.set_property("mid", Some(Value::Bool(true)));
    assert_eq!(
        keys(Some(&map)),
        Some(vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()])
    );
}

#[test]
fn test_mapping_stores_absent_values() {
    let map = Value::mapping([("a", Value::Int32(1))]);
    map.set_property("a", None);
    assert_eq!(map.get_property("a"), None);
    // The key is still there, holding nothing
    assert_eq!(map.property_keys(), Some(vec!["a".to_string()]));
    assert_eq!(try_get(&map, "a"), Ok(None));
    assert_eq!(
        try_get(&map, "b"),
        Err(AccessError::NotFound("b".to_string()))
    );
}

#[test]
fn test_mapping_length_is_an_ordinary_key() {
    let map = Value::mapping([("x", Value::Int32(1))]);
    assert_eq!(map.get_property(LENGTH), None);
    map.set_property(LENGTH, Some(Value::Int32(99)));
    assert_eq!(map.get_property(LENGTH), Some(Value::Int32(99)));
}

// ============================================================================
// OrderedList
// ============================================================================

#[test]
fn test_list_keys_are_indices() {
    let list = ints(&[10, 20, 30]);
    assert_eq!(
        keys(Some(&list)),
        Some(vec!["0".to_string(), "1".to_string(), "2".to_string()])
    );
}

#[test]
fn test_list_length_pseudo_property() {
    let list = ints(&[10, 20, 30]);
    assert_eq!(get(Some(&list), Some("length")), Some(Value::Int32(3)));
    assert_eq!(length(&list), Some(3));
}

#[test]
fn test_list_get_by_index() {
    let list = ints(&[10, 20, 30]);
    assert_eq!(list.get_property("1"), Some(Value::Int32(20)));
    assert_eq!(list.get_property("3"), None);
    assert_eq!(list.get_property("-1"), None);
}

#[test]
fn test_list_replace_and_append() {
    let list = ints(&[10, 20, 30]);
    set(Some(&list), Some("1"), Some(Value::Int32(21)));
    assert_eq!(list.get_property("1"), Some(Value::Int32(21)));

    set(Some(&list), Some("3"), Some(Value::Int32(40)));
    assert_eq!(list.get_property("length"), Some(Value::Int32(4)));
    assert_eq!(list.get_property("3"), Some(Value::Int32(40)));
}

#[test]
fn test_list_never_grows_past_the_end() {
    let list = ints(&[10, 20, 30]);
    set(Some(&list), Some("5"), Some(Value::Int32(60)));
    assert_eq!(length(&list), Some(3));
    assert_eq!(
        try_set(&list, "5", Some(Value::Int32(60))),
        Err(AccessError::OutOfRange { index: 5, len: 3 })
    );
}

#[test]
fn test_list_slot_can_hold_absent() {
    let list = ints(&[1, 2]);
    list.set_property("0", None);
    assert_eq!(list.get_property("0"), None);
    assert_eq!(length(&list), Some(2));
}

#[test]
fn test_list_values_alias_host_storage() {
    let inner = ints(&[1]);
    let outer = Value::list([inner.clone()]);
    let fetched = outer.get_property("0").expect("element 0 exists");
    fetched.set_property("1", Some(Value::Int32(2)));
    assert_eq!(inner.get_property("length"), Some(Value::Int32(2)));
}

// ============================================================================
// FixedArray
// ============================================================================

#[test]
fn test_fixed_array_round_trip_and_length() {
    let array = Value::array(FixedArray::from(vec![1.0f64, 2.0, 3.0]));
    assert_eq!(array.kind(), Some(Kind::FixedArray));
    assert_eq!(array.get_property("length"), Some(Value::Int32(3)));
    array.set_property("2", Some(Value::Float64(9.5)));
    assert_eq!(array.get_property("2"), Some(Value::Float64(9.5)));
    assert_eq!(
        array.property_keys(),
        Some(vec!["0".to_string(), "1".to_string(), "2".to_string()])
    );
}

#[test]
fn test_fixed_array_never_appends() {
    let array = Value::array(FixedArray::filled(ElementType::Int32, 2));
    array.set_property("2", Some(Value::Int32(7)));
    assert_eq!(length(&array), Some(2));
    assert_eq!(array.get_property("2"), None);
}

#[test]
fn test_fixed_array_of_any() {
    let array = Value::array(FixedArray::from(vec![Value::from("a"), Value::Int32(2)]));
    array.set_property("0", Some(Value::Bool(false)));
    assert_eq!(array.get_property("0"), Some(Value::Bool(false)));
    array.set_property("1", None);
    assert_eq!(array.get_property("1"), None);
}

// ============================================================================
// ScriptObject
// ============================================================================

/// Exposes an upper-cased view of whatever is written to it.
#[derive(Default)]
struct Shouter {
    entries: Vec<(String, String)>,
}

impl ScriptObject for Shouter {
    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| Value::String(v.to_uppercase()))
    }

    fn set(&mut self, key: &str, value: Option<Value>) {
        self.entries.retain(|(k, _)| k != key);
        if let Some(value) = value {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    fn class_name(&self) -> &str {
        "Shouter"
    }
}

#[test]
fn test_script_object_delegation() {
    let object = Value::object(Shouter::default());
    assert_eq!(object.kind(), Some(Kind::ScriptObject));
    object.set_property("greeting", Some(Value::from("hello")));
    object.set_property("length", Some(Value::Int32(3)));
    assert_eq!(object.get_property("greeting"), Some(Value::from("HELLO")));
    assert_eq!(object.get_property("length"), Some(Value::from("3")));
    assert_eq!(
        object.property_keys(),
        Some(vec!["greeting".to_string(), "length".to_string()])
    );
    object.set_property("greeting", None);
    assert_eq!(object.get_property("greeting"), None);
    assert_eq!(object.to_string(), "[object Shouter]");
}

// ============================================================================
// Coercion at the boundary
// ============================================================================

#[test]
fn test_coercion_examples() {
    assert_eq!(to_int32(Some(&Value::from("42")), -1), 42);
    assert_eq!(to_int32(Some(&Value::from("abc")), -1), -1);
    assert!(to_bool(Some(&Value::from("yes")), false));
    assert!(!to_bool(Some(&Value::Int32(0)), true));
}

#[test]
fn test_scalar_targets_are_ignored() {
    let text = Value::from("abc");
    set(Some(&text), Some("0"), Some(Value::from("z")));
    assert_eq!(text, Value::from("abc"));
    assert_eq!(get(Some(&text), Some("length")), None);
    assert_eq!(keys(Some(&text)), None);
}
