//! Integration tests for the ScriptRecord derive: generated descriptor tables

#![allow(dead_code)]

use otter_host::record::RecordType;
use otter_host::{AccessError, ScriptObject, ScriptRecord, Value};

#[derive(ScriptRecord)]
struct Vehicle {
    #[script]
    wheels: i32,
    #[script(name = "maxSpeed")]
    max_speed: f64,
    serial: String,
}

#[derive(ScriptRecord)]
#[script(name = "Truck")]
struct HeavyTruck {
    #[script(base)]
    vehicle: Vehicle,
    #[script(readonly)]
    axles: i32,
    #[script(name = "wheels")]
    wheel_count: i32,
}

#[derive(ScriptRecord)]
#[script(object)]
struct Bag {
    #[script]
    hidden_behind_object: i32,
}

impl ScriptObject for Bag {
    fn keys(&self) -> Vec<String> {
        vec!["anything".to_string()]
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(Value::from(key))
    }

    fn set(&mut self, _key: &str, _value: Option<Value>) {}
}

fn field_names(ty: &RecordType) -> Vec<(&'static str, &'static str)> {
    ty.fields.iter().map(|f| (f.name, f.field)).collect()
}

#[test]
fn test_only_marked_fields_are_described() {
    let ty = Vehicle::script_type();
    assert_eq!(ty.name, "Vehicle");
    assert_eq!(
        field_names(ty),
        vec![("wheels", "wheels"), ("maxSpeed", "max_speed")]
    );
    assert!(ty.base.is_none());
}

#[test]
fn test_container_name_and_base_link() {
    let ty = HeavyTruck::script_type();
    assert_eq!(ty.name, "Truck");
    let base = ty.base.as_ref().expect("truck embeds a vehicle");
    assert_eq!(base.field, "vehicle");
    assert_eq!((base.record_type)().name, "Vehicle");
}

#[test]
fn test_descriptor_table_is_built_once() {
    assert!(std::ptr::eq(Vehicle::script_type(), Vehicle::script_type()));
    let truck = HeavyTruck {
        vehicle: Vehicle {
            wheels: 4,
            max_speed: 90.0,
            serial: String::new(),
        },
        axles: 3,
        wheel_count: 10,
    };
    assert!(std::ptr::eq(truck.record_type(), HeavyTruck::script_type()));
}

#[test]
fn test_readonly_descriptor_rejects_writes() {
    let ty = HeavyTruck::script_type();
    let axles = ty.own_field("axles").expect("axles is marked");
    assert!(axles.readonly);

    let mut truck = HeavyTruck {
        vehicle: Vehicle {
            wheels: 4,
            max_speed: 90.0,
            serial: String::new(),
        },
        axles: 3,
        wheel_count: 10,
    };
    assert_eq!(
        (axles.write)(truck.as_any_mut(), Some(Value::Int32(5))),
        Err(AccessError::ReadOnly("axles"))
    );
    assert_eq!((axles.read)(truck.as_any()), Ok(Some(Value::Int32(3))));
}

#[test]
fn test_lookup_prefers_most_derived() {
    let ty = HeavyTruck::script_type();
    let wheels = ty.lookup("wheels").expect("declared on both levels");
    assert_eq!(wheels.field, "wheel_count");
    let speed = ty.lookup("maxSpeed").expect("inherited from vehicle");
    assert_eq!(speed.field, "max_speed");
    assert!(ty.lookup("serial").is_none());
}

#[test]
fn test_descriptor_on_foreign_receiver() {
    let ty = Vehicle::script_type();
    let wheels = ty.own_field("wheels").expect("wheels is marked");
    assert_eq!(
        (wheels.read)(&42u8),
        Err(AccessError::WrongReceiver("Vehicle"))
    );
}

#[test]
fn test_object_option_exposes_script_object_view() {
    let bag = Bag {
        hidden_behind_object: 1,
    };
    assert!(bag.as_script_object().is_some());
    assert!(Bag::script_type().script_object);

    let vehicle = Vehicle {
        wheels: 2,
        max_speed: 25.0,
        serial: String::new(),
    };
    assert!(vehicle.as_script_object().is_none());
    assert!(!Vehicle::script_type().script_object);
}
