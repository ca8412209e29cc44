use super::{ObjectData, Shared, TypeHandle, Value, ValueType};
use pretty_assertions::assert_eq;

#[test]
fn scalar_equality() {
    assert_eq!(Value::Int(3), Value::Int(3));
    assert_eq!(Value::Null, Value::Null);
    assert_ne!(Value::Int(3), Value::Bool(true));
    assert_ne!(Value::Null, Value::Int(0));
}

#[test]
fn numeric_equality_crosses_tiers() {
    assert_eq!(Value::Int(2), Value::Float(2.0));
    assert_eq!(Value::Float(2.0), Value::Int(2));
    assert_ne!(Value::Int(2), Value::Float(2.5));
}

#[test]
fn list_equality_is_structural() {
    let a = Value::list(vec![Value::Int(1), Value::str("x")]);
    let b = Value::list(vec![Value::Int(1), Value::str("x")]);
    assert_eq!(a, b);
}

#[test]
fn object_equality_is_identity() {
    let a = Value::object(ObjectData::new(TypeHandle(0)));
    let b = Value::object(ObjectData::new(TypeHandle(0)));
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn clone_shares_the_cell() {
    let list = Shared::new(vec![Value::Int(1)]);
    let alias = list.clone();
    alias.borrow_mut().push(Value::Int(2));
    assert_eq!(list.borrow().len(), 2);
    assert!(list.ptr_eq(&alias));
}

#[test]
fn condition_coercion() {
    assert_eq!(Value::Null.as_condition(), Some(false));
    assert_eq!(Value::Bool(true).as_condition(), Some(true));
    assert_eq!(Value::Int(0).as_condition(), Some(false));
    assert_eq!(Value::Float(0.5).as_condition(), Some(true));
    assert_eq!(Value::str("x").as_condition(), None);
}

#[test]
fn parameter_acceptance() {
    assert!(ValueType::accepts(ValueType::Any, ValueType::Map));
    assert!(ValueType::accepts(ValueType::Float, ValueType::Int));
    assert!(!ValueType::accepts(ValueType::Int, ValueType::Float));
    assert!(ValueType::accepts(ValueType::Str, ValueType::Null));
    assert!(!ValueType::accepts(ValueType::Bool, ValueType::Null));
}

#[test]
fn display_formats() {
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(2.5).to_string(), "2.5");
    assert_eq!(
        Value::list(vec![Value::Int(1), Value::Int(2)]).to_string(),
        "[1, 2]"
    );
}
