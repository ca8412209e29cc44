use super::{pack_variadic, select_overload, Signature};
use crate::error::EvalErrorKind;
use crate::value::{Value, ValueType};
use pretty_assertions::assert_eq;

const INT_INT: Signature<'static> = Signature {
    params: &[ValueType::Int, ValueType::Int],
    variadic: false,
};
const FLOAT_FLOAT: Signature<'static> = Signature {
    params: &[ValueType::Float, ValueType::Float],
    variadic: false,
};
const ANY_VARIADIC: Signature<'static> = Signature {
    params: &[ValueType::Str, ValueType::Any],
    variadic: true,
};

#[test]
fn int_arguments_match_both_numeric_tiers() {
    // Int satisfies Float params too, so both candidates apply.
    let err = select_overload(
        "Max",
        "Math",
        [INT_INT, FLOAT_FLOAT].into_iter(),
        &[Value::Int(1), Value::Int(2)],
    )
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::AmbiguousOverload { .. }));
}

#[test]
fn float_arguments_select_the_float_candidate() {
    let found = select_overload(
        "Max",
        "Math",
        [INT_INT, FLOAT_FLOAT].into_iter(),
        &[Value::Float(1.0), Value::Float(2.0)],
    )
    .unwrap();
    assert_eq!(found, 1);
}

#[test]
fn no_applicable_candidate_is_an_error() {
    let err = select_overload(
        "Max",
        "Math",
        [INT_INT].into_iter(),
        &[Value::str("a"), Value::Int(1)],
    )
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NoOverload { .. }));
}

#[test]
fn variadic_signature_accepts_any_tail_length() {
    assert!(ANY_VARIADIC.matches(&[Value::str("t")]));
    assert!(ANY_VARIADIC.matches(&[Value::str("t"), Value::Int(1), Value::Bool(true)]));
    assert!(!ANY_VARIADIC.matches(&[Value::Int(1)]));
}

#[test]
fn variadic_tail_packs_into_one_list() {
    let packed = pack_variadic(
        2,
        vec![Value::str("t"), Value::Int(1), Value::Int(2)],
    );
    assert_eq!(packed.len(), 2);
    assert_eq!(packed[1], Value::list(vec![Value::Int(1), Value::Int(2)]));
}

#[test]
fn variadic_with_empty_tail_packs_an_empty_list() {
    let packed = pack_variadic(1, vec![]);
    assert_eq!(packed, vec![Value::list(vec![])]);
}
