use super::{HostAccessor, HostRegistry, MethodDef, TypeDescriptor};
use crate::error::EvalErrorKind;
use crate::value::{Value, ValueType};
use pretty_assertions::assert_eq;

#[test]
fn resolves_types_through_implicit_namespaces() {
    let registry = HostRegistry::new();
    let by_bare = registry.resolve_type("Int32", 0).unwrap();
    let by_full = registry.resolve_type("System.Int32", 0).unwrap();
    assert_eq!(by_bare, by_full);
    assert!(registry.resolve_type("List", 1).is_ok());
    assert!(registry.resolve_type("Dictionary", 2).is_ok());
}

#[test]
fn unknown_type_and_wrong_arity_fail() {
    let registry = HostRegistry::new();
    assert!(matches!(
        registry.resolve_type("Nope", 0).unwrap_err().kind,
        EvalErrorKind::NoSuchType { .. }
    ));
    // List`1 exists, List`3 does not.
    assert!(registry.resolve_type("List", 3).is_err());
}

#[test]
fn constructing_collections_and_bags() {
    let registry = HostRegistry::new();
    let list_ty = registry.resolve_type("List", 1).unwrap();
    assert_eq!(registry.construct(list_ty, vec![]).unwrap(), Value::list(vec![]));

    let dict_ty = registry.resolve_type("Dictionary", 2).unwrap();
    assert_eq!(registry.construct(dict_ty, vec![]).unwrap(), Value::map(vec![]));

    let object_ty = registry.resolve_type("Object", 0).unwrap();
    let bag = registry.construct(object_ty, vec![]).unwrap();
    registry.set_property(&bag, "Name", Value::str("mel")).unwrap();
    assert_eq!(registry.get_property(&bag, "Name").unwrap(), Value::str("mel"));
}

#[test]
fn scalar_types_are_not_constructible() {
    let registry = HostRegistry::new();
    let int_ty = registry.resolve_type("Int32", 0).unwrap();
    assert!(matches!(
        registry.construct(int_ty, vec![]).unwrap_err().kind,
        EvalErrorKind::NoSuchMember { .. }
    ));
}

#[test]
fn static_values_and_parse() {
    let registry = HostRegistry::new();
    let int32 = registry.resolve_type("Int32", 0).unwrap();
    assert_eq!(
        registry.get_static_property(int32, "MaxValue").unwrap(),
        Value::Int(i64::from(i32::MAX))
    );
    assert_eq!(
        registry.invoke_static(int32, "Parse", vec![Value::str("42")]).unwrap(),
        Value::Int(42)
    );
    assert!(registry
        .invoke_static(int32, "Parse", vec![Value::str("nope")])
        .is_err());
}

#[test]
fn field_access_defaults_to_the_property_path() {
    let registry = HostRegistry::new();
    let int32 = registry.resolve_type("Int32", 0).unwrap();
    assert_eq!(
        registry.get_static_field(int32, "MaxValue").unwrap(),
        registry.get_static_property(int32, "MaxValue").unwrap()
    );
    let object_ty = registry.resolve_type("Object", 0).unwrap();
    let bag = registry.construct(object_ty, vec![]).unwrap();
    registry.set_field(&bag, "Tag", Value::Int(1)).unwrap();
    assert_eq!(registry.get_field(&bag, "Tag").unwrap(), Value::Int(1));
}

#[test]
fn declared_properties_come_before_dynamic_slots() {
    let registry = HostRegistry::new();
    let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(registry.get_property(&list, "Count").unwrap(), Value::Int(2));
    assert_eq!(
        registry.get_property(&Value::str("abc"), "Length").unwrap(),
        Value::Int(3)
    );
}

#[test]
fn missing_member_is_an_error() {
    let registry = HostRegistry::new();
    let err = registry
        .get_property(&Value::list(vec![]), "Wat")
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoSuchMember {
            member: "Wat".into(),
            type_name: "List".into()
        }
    );
}

#[test]
fn item_access_on_lists_and_maps() {
    let registry = HostRegistry::new();
    let list = Value::list(vec![Value::Int(10), Value::Int(20)]);
    assert_eq!(
        registry.get_item(&list, &[Value::Int(1)]).unwrap(),
        Value::Int(20)
    );
    registry.set_item(&list, &[Value::Int(0)], Value::Int(99)).unwrap();
    assert_eq!(
        registry.get_item(&list, &[Value::Int(0)]).unwrap(),
        Value::Int(99)
    );
    assert!(matches!(
        registry.get_item(&list, &[Value::Int(5)]).unwrap_err().kind,
        EvalErrorKind::IndexOutOfBounds { index: 5, len: 2 }
    ));

    let map = Value::map(vec![(Value::str("k"), Value::Int(1))]);
    assert_eq!(
        registry.get_item(&map, &[Value::str("k")]).unwrap(),
        Value::Int(1)
    );
    // Setting an absent key inserts.
    registry.set_item(&map, &[Value::str("k2")], Value::Int(2)).unwrap();
    assert_eq!(
        registry.get_item(&map, &[Value::str("k2")]).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn instance_methods_dispatch_by_arity() {
    let registry = HostRegistry::new();
    let text = Value::str("hello");
    assert_eq!(
        registry
            .invoke_method(&text, "Substring", vec![Value::Int(1)])
            .unwrap(),
        Value::str("ello")
    );
    assert_eq!(
        registry
            .invoke_method(&text, "Substring", vec![Value::Int(1), Value::Int(3)])
            .unwrap(),
        Value::str("ell")
    );
}

#[test]
fn list_mutation_methods() {
    let registry = HostRegistry::new();
    let list = Value::list(vec![]);
    registry.invoke_method(&list, "Add", vec![Value::Int(1)]).unwrap();
    registry.invoke_method(&list, "Add", vec![Value::Int(2)]).unwrap();
    assert_eq!(registry.get_property(&list, "Count").unwrap(), Value::Int(2));
    assert_eq!(
        registry
            .invoke_method(&list, "Contains", vec![Value::Int(2)])
            .unwrap(),
        Value::Bool(true)
    );
    registry.invoke_method(&list, "RemoveAt", vec![Value::Int(0)]).unwrap();
    assert_eq!(
        registry.get_item(&list, &[Value::Int(0)]).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn string_format_packs_variadic_arguments() {
    let registry = HostRegistry::new();
    let string_ty = registry.resolve_type("String", 0).unwrap();
    let out = registry
        .invoke_static(
            string_ty,
            "Format",
            vec![Value::str("{0}-{1}"), Value::Int(1), Value::Int(2)],
        )
        .unwrap();
    assert_eq!(out, Value::str("1-2"));
}

#[test]
fn conversion_between_builtin_types() {
    let registry = HostRegistry::new();
    let int32 = registry.resolve_type("Int32", 0).unwrap();
    let double = registry.resolve_type("Double", 0).unwrap();
    let string = registry.resolve_type("String", 0).unwrap();

    assert_eq!(
        registry.convert(Value::Float(3.9), int32).unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        registry.convert(Value::str("17"), int32).unwrap(),
        Value::Int(17)
    );
    assert_eq!(
        registry.convert(Value::Int(2), double).unwrap(),
        Value::Float(2.0)
    );
    assert_eq!(
        registry.convert(Value::Int(5), string).unwrap(),
        Value::str("5")
    );
    // Int32 range check.
    assert!(registry
        .convert(Value::Int(i64::from(i32::MAX) + 1), int32)
        .is_err());
}

fn register_vec2(registry: &mut HostRegistry) -> crate::value::TypeHandle {
    let mut desc = TypeDescriptor::new("Demo.Vec2", "Vec2");
    desc.constructible = true;
    desc.methods.push(MethodDef {
        name: "op_add",
        params: &[ValueType::Object],
        variadic: false,
        run: |registry, target, args| {
            let x = registry.get_property(target, "X")?;
            let y = registry.get_property(&args[0], "X")?;
            crate::operators::evaluate_binary(mel_ir::BinaryOp::Add, &x, &y)
        },
    });
    registry.register(desc)
}

#[test]
fn operator_overload_methods_are_found() {
    let mut registry = HostRegistry::new();
    let vec2 = register_vec2(&mut registry);
    let a = registry.construct(vec2, vec![]).unwrap();
    let b = registry.construct(vec2, vec![]).unwrap();
    registry.set_property(&a, "X", Value::Int(2)).unwrap();
    registry.set_property(&b, "X", Value::Int(3)).unwrap();

    let result = registry
        .invoke_operator("op_add", &a, std::slice::from_ref(&b))
        .unwrap()
        .unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn operator_lookup_declines_for_plain_values() {
    let registry = HostRegistry::new();
    assert!(registry
        .invoke_operator("op_add", &Value::Int(1), &[Value::Int(2)])
        .is_none());
}
