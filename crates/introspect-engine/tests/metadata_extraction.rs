//! Tag extraction from types, fields and methods

mod common;

use std::cmp::Ordering;
use std::sync::Arc;
use std::thread;

use introspect_engine::{builtin, TagFilter, Value};
use pretty_assertions::assert_eq;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Single Values
// ============================================================================

#[test]
fn test_class_tag_value() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(
        reflector.class_tag_value(zoo.animal, "Entity", "table", Value::Null),
        Value::from("animals")
    );
    // Type tags are not inherited
    assert_eq!(
        reflector.class_tag_value(zoo.dog, "Entity", "table", Value::from("none")),
        Value::from("none")
    );
}

#[test]
fn test_field_tag_value() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(
        reflector.field_tag_value(zoo.dog, "name", "Column", "name"),
        Some(Value::from("animal_name"))
    );
    assert_eq!(reflector.field_tag_value(zoo.animal, "age", "Column", "order"), Some(Value::Int(2)));
    // Private fields are not searched
    assert_eq!(reflector.field_tag_value(zoo.animal, "secret", "Column", "name"), None);
    assert_eq!(reflector.field_tag_value(zoo.animal, "legs", "Column", "name"), None);
    assert_eq!(reflector.field_tag_value(zoo.animal, "name", "Column", "width"), None);
}

#[test]
fn test_field_tag() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    let tag = reflector.field_tag(zoo.animal, "name", "Column").unwrap();
    assert_eq!(tag.kind(), "Column");
    assert_eq!(tag.attribute_names().collect::<Vec<_>>(), vec!["name", "order"]);
    assert!(reflector.field_tag(zoo.animal, "legs", "Column").is_none());
    assert!(reflector.field_tag(zoo.animal, "missing", "Column").is_none());
}

#[test]
fn test_method_tag_value_uses_exact_signature() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(
        reflector.method_tag_value(zoo.animal, "greet", "Command", "name", &[builtin::STRING]),
        Some(Value::from("greet"))
    );
    assert_eq!(
        reflector.method_tag_value(zoo.animal, "greet", "Command", "name", &[builtin::OBJECT]),
        None
    );
    assert_eq!(
        reflector.method_tag_value(zoo.animal, "speak", "Command", "name", &[]),
        Some(Value::from("speak"))
    );
    // Dog overrides speak without the tag
    assert_eq!(reflector.method_tag_value(zoo.dog, "speak", "Command", "name", &[]), None);
}

// ============================================================================
// Tagged Member Lists
// ============================================================================

#[test]
fn test_tagged_fields_by_presence() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(
        reflector.tagged_fields(zoo.dog, &TagFilter::present("Column")),
        names(&["breed", "name", "age"])
    );
    assert!(reflector.tagged_fields(zoo.dog, &TagFilter::present("Index")).is_empty());
}

#[test]
fn test_tagged_fields_by_stringified_value() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    let by_int = TagFilter::attribute_equals("Column", "order", 1);
    let by_str = TagFilter::attribute_equals("Column", "order", "1");
    assert_eq!(reflector.tagged_fields(zoo.animal, &by_int), names(&["name"]));
    assert_eq!(reflector.tagged_fields(zoo.animal, &by_str), names(&["name"]));

    let by_name = TagFilter::attribute_equals("Column", "name", "breed");
    assert_eq!(reflector.tagged_fields(zoo.dog, &by_name), names(&["breed"]));
    assert!(reflector.tagged_fields(zoo.animal, &by_name).is_empty());

    let absent = TagFilter::attribute_absent("Column", "width");
    assert_eq!(reflector.tagged_fields(zoo.animal, &absent), names(&["name", "age"]));
}

#[test]
fn test_tagged_methods() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    // Presence does not depend on the requested signature
    assert_eq!(
        reflector.tagged_methods(zoo.animal, &TagFilter::present("Command"), &[]),
        names(&["speak", "greet"])
    );
    assert_eq!(
        reflector.tagged_methods(zoo.animal, &TagFilter::present("Command"), &[builtin::INT]),
        names(&["speak", "greet"])
    );
    assert_eq!(
        reflector.tagged_methods(
            zoo.animal,
            &TagFilter::attribute_equals("Command", "name", "greet"),
            &[builtin::STRING]
        ),
        names(&["greet"])
    );
    // Attribute comparison reads the overload with exactly the given params
    assert!(reflector
        .tagged_methods(
            zoo.animal,
            &TagFilter::attribute_equals("Command", "name", "greet"),
            &[builtin::OBJECT]
        )
        .is_empty());
    // Dog's own speak overrides the tagged one; greet is inherited
    assert_eq!(
        reflector.tagged_methods(zoo.dog, &TagFilter::present("Command"), &[]),
        names(&["greet"])
    );
}

// ============================================================================
// Type Filters and Enumeration
// ============================================================================

#[test]
fn test_fields_implementing() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(
        reflector.field_names_implementing(zoo.dog, builtin::STRING),
        names(&["breed", "name"])
    );
    assert_eq!(
        reflector.field_names_implementing(zoo.dog, builtin::OBJECT),
        names(&["breed", "name", "age", "legs"])
    );
    let ints = reflector.fields_implementing(zoo.animal, builtin::INT);
    assert_eq!(ints.iter().map(|f| f.declaring).collect::<Vec<_>>(), vec![zoo.animal, zoo.animal]);
}

#[test]
fn test_enumerate_methods() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();
    let rex = zoo.rex();

    assert_eq!(reflector.enumerate_methods(&rex, &[]), names(&["speak"]));
    assert_eq!(reflector.enumerate_methods(&rex, &[builtin::INT]), names(&["speak"]));
    assert_eq!(reflector.enumerate_methods(&rex, &[builtin::OBJECT]), names(&["fetch"]));
    assert!(reflector.enumerate_methods(&Value::Null, &[]).is_empty());
}

#[test]
fn test_compare_values() {
    let zoo = common::zoo();
    let reflector = zoo.reflector();

    assert_eq!(reflector.compare_values(None, Some(&Value::Null)), Ordering::Equal);
    assert_eq!(reflector.compare_values(Some(&Value::from("b")), None), Ordering::Greater);
    assert_eq!(
        reflector.compare_values(Some(&Value::from("10")), Some(&Value::from("9"))),
        Ordering::Less
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_extraction_is_consistent() {
    let zoo = common::zoo();
    let reflector = Arc::new(zoo.reflector());
    let expected = reflector.tagged_fields(zoo.dog, &TagFilter::present("Column"));

    thread::scope(|scope| {
        for _ in 0..4 {
            let reflector = reflector.clone();
            let expected = &expected;
            let dog = zoo.dog;
            let animal = zoo.animal;
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(&reflector.tagged_fields(dog, &TagFilter::present("Column")), expected);
                    assert_eq!(
                        reflector.class_tag_value(animal, "Entity", "table", Value::Null),
                        Value::from("animals")
                    );
                }
            });
        }
    });
}
