// tests/query_tests.rs
//! Tests for the class member queries
//!
//! Variables, methods, signals, enums, inner classes, tool mode, base type
//! and class name, read off whole scripts.

mod test_harness;

use gdscript::*;
use test_harness::TestHarness;

#[test]
fn test_player_queries() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("player.gd");
    let class = &result.class;

    assert!(class.is_tool());
    assert_eq!(class.class_name().unwrap().name().unwrap().as_str(), "Player");
    assert_eq!(class.extends().unwrap().to_string(), "CharacterBody2D");

    let signals: Vec<_> = class.signals().collect();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0].name().unwrap().as_str(), "health_changed");
    assert_eq!(signals[0].parameters().count(), 2);
    assert_eq!(signals[1].parameters().count(), 0);

    let enums: Vec<_> = class.enums().collect();
    assert_eq!(enums.len(), 1);
    let values: Vec<_> = enums[0]
        .values()
        .map(|v| v.name().unwrap().as_str())
        .collect();
    assert_eq!(values, ["IDLE", "RUN", "JUMP"]);
    let jump = enums[0].values().last().unwrap();
    assert_eq!(jump.value().unwrap().to_string().trim(), "5");

    let constants: Vec<_> = class
        .constants()
        .map(|c| c.name().unwrap().as_str())
        .collect();
    assert_eq!(constants, ["SPEED", "JUMP_VELOCITY"]);
    assert_eq!(class.variables().count(), 10);

    let names: Vec<_> = class
        .methods()
        .map(|m| m.name().unwrap().as_str())
        .collect();
    assert_eq!(names, ["_ready", "_physics_process", "take_damage"]);

    let attributes: Vec<_> = class
        .attributes()
        .map(|a| a.name().unwrap().as_str())
        .collect();
    assert_eq!(
        attributes,
        ["tool", "export", "export_range", "onready", "onready"]
    );
}

#[test]
fn test_variable_details() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("player.gd");
    let class = &result.class;

    let find = |name: &str| {
        class
            .variables()
            .find(|v| v.name().is_some_and(|n| n.as_str() == name))
            .unwrap_or_else(|| panic!("no variable {name}"))
    };

    let speed = find("SPEED");
    assert!(speed.is_const());
    assert!(speed.is_inferred());

    let inventory = find("inventory");
    let ty = inventory.type_node().unwrap();
    assert!(ty.is_generic());
    assert_eq!(ty.name(), Some("Array"));
    assert_eq!(ty.arguments().count(), 1);

    let health = find("health");
    assert_eq!(health.type_node().unwrap().to_string(), "int");
    assert_eq!(health.initializer().unwrap().to_string().trim(), "100");
    let setter = health.setter().unwrap();
    assert_eq!(setter.parameter().unwrap().as_str(), "value");
    assert_eq!(setter.statements().unwrap().len(), 3);
    assert_eq!(health.getter().unwrap().statements().unwrap().len(), 1);

    let sprite = find("sprite");
    let Some(Expression::GetNode(node)) = sprite.initializer() else {
        panic!("expected a get node initializer");
    };
    assert_eq!(node.path(), Some("Sprite2D"));
}

#[test]
fn test_method_details() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("player.gd");

    let take_damage = result.class.methods().last().unwrap();
    let params: Vec<_> = take_damage.parameters().collect();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].type_node().unwrap().to_string(), "int");
    assert!(params[1].type_node().is_none());
    assert!(params[1].default().is_some());
    assert_eq!(take_damage.return_type().unwrap().to_string(), "void");
    assert!(take_damage.has_colon());
}

#[test]
fn test_inner_classes() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("legacy.gd");
    let class = &result.class;

    let inner: Vec<_> = class.inner_classes().collect();
    assert_eq!(inner.len(), 1);
    let inventory = inner[0];
    assert_eq!(inventory.name().unwrap().as_str(), "Inventory");
    assert_eq!(inventory.base().unwrap().to_string(), "Reference");
    assert_eq!(inventory.variables().count(), 1);
    assert_eq!(inventory.methods().count(), 1);

    let slot = inventory.inner_classes().next().unwrap();
    assert_eq!(slot.name().unwrap().as_str(), "Slot");
    assert!(slot.base().is_none());
    let make = slot.methods().next().unwrap();
    assert!(make.is_static());
    assert_eq!(make.return_type().unwrap().to_string(), "Slot");

    // Inner members stay out of the outer class's queries.
    let names: Vec<_> = class
        .variables()
        .map(|v| v.name().unwrap().as_str())
        .collect();
    assert_eq!(names, ["inventory", "ready_count"]);
}

#[test]
fn test_plain_script_queries() {
    let class = gdscript::parse("func f():\n\tpass\n").unwrap();
    assert!(!class.is_tool());
    assert!(class.extends().is_none());
    assert!(class.class_name().is_none());
    assert_eq!(class.signals().count(), 0);
    assert_eq!(class.methods().count(), 1);
}

#[test]
fn test_class_name_with_icon() {
    let class =
        gdscript::parse("class_name Enemy, \"res://icons/enemy.svg\" extends Node2D\n").unwrap();
    let name = class.class_name().unwrap();
    assert_eq!(name.name().unwrap().as_str(), "Enemy");
    assert_eq!(name.icon().unwrap().content(), "res://icons/enemy.svg");
    assert_eq!(class.extends().unwrap().to_string(), "Node2D");
}

#[test]
fn test_enum_values_with_initializer() {
    let source = "enum State { IDLE, RUNNING, JUMPING = 10 }";
    let class = gdscript::parse(source).unwrap();
    assert_eq!(class.to_string(), source);

    let state = class.enums().next().unwrap();
    let values: Vec<_> = state.values().collect();
    assert_eq!(values.len(), 3);
    assert!(values[0].value().is_none());
    assert!(values[1].value().is_none());
    assert_eq!(values[2].value().unwrap().to_string().trim(), "10");
}
