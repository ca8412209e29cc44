use std::sync::Arc;

use mel_eval::{HostRegistry, Value};
use mel_ir::Mode;
use pretty_assertions::assert_eq;

use super::Runtime;
use crate::error::EngineError;

#[test]
fn compile_caches_by_exact_source() {
    let runtime = Runtime::new();
    let first = runtime.compile(Mode::Expression, "1 + 2").unwrap();
    let second = runtime.compile(Mode::Expression, "1 + 2").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn whitespace_changes_miss_the_cache() {
    let runtime = Runtime::new();
    let first = runtime.compile(Mode::Expression, "1 + 2").unwrap();
    let second = runtime.compile(Mode::Expression, "1 +  2").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn mode_is_part_of_the_cache_key() {
    let runtime = Runtime::new();
    let script = runtime.compile(Mode::Script, "$x = 1;").unwrap();
    let handler = runtime.compile(Mode::EventHandler, "$x = 1;").unwrap();
    assert!(!Arc::ptr_eq(&script, &handler));
    assert_eq!(script.mode(), Mode::Script);
    assert_eq!(handler.mode(), Mode::EventHandler);
}

#[test]
fn unit_remembers_its_source() {
    let runtime = Runtime::new();
    let unit = runtime.compile(Mode::Expression, "40 + 2").unwrap();
    assert_eq!(unit.source(), "40 + 2");
}

#[test]
fn lex_and_parse_failures_surface_as_engine_errors() {
    let runtime = Runtime::new();
    assert!(matches!(
        runtime.compile(Mode::Expression, "'unterminated"),
        Err(EngineError::Lex(_))
    ));
    assert!(matches!(
        runtime.compile(Mode::Expression, "1 +"),
        Err(EngineError::Parse(_))
    ));
    assert!(matches!(
        runtime.compile(Mode::Assign, "1 + 2"),
        Err(EngineError::Parse(_))
    ));
}

#[test]
fn evaluate_runs_a_cached_unit() {
    let runtime = Runtime::new();
    let host = HostRegistry::new();
    let unit = runtime.compile(Mode::Expression, "6 * 7").unwrap();
    assert_eq!(runtime.evaluate(&unit, &host).unwrap(), Value::Int(42));
    // A second engine over the same unit starts clean.
    assert_eq!(runtime.evaluate(&unit, &host).unwrap(), Value::Int(42));
}

#[test]
fn dispatch_event_binds_sender_and_args() {
    let runtime = Runtime::new();
    let host = HostRegistry::new();
    let unit = runtime
        .compile(Mode::EventHandler, "return $args[0] + $args[1];")
        .unwrap();
    let args = Value::list(vec![Value::Int(2), Value::Int(3)]);
    let result = runtime
        .dispatch_event(&unit, &host, Value::Null, args)
        .unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn script_state_does_not_leak_between_runs() {
    let runtime = Runtime::new();
    let host = HostRegistry::new();
    runtime.run_script("var $x = 1;", &host).unwrap();
    let err = runtime.run_script("return $x;", &host).unwrap_err();
    assert!(matches!(err, EngineError::Eval(_)));
}
