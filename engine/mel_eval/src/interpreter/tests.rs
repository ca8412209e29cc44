use super::Evaluator;
use crate::error::{EvalError, EvalErrorKind};
use crate::host::HostRegistry;
use crate::value::Value;
use mel_ir::{Interner, Mode};
use pretty_assertions::assert_eq;

fn run(source: &str, mode: Mode) -> Result<Value, EvalError> {
    let interner = Interner::new();
    let tokens = mel_lexer::tokenize(source, &interner).unwrap();
    let program = mel_parse::parse(&tokens, mode, &interner).unwrap();
    let host = HostRegistry::new();
    let mut evaluator = Evaluator::new(&host, &interner);
    evaluator.run(&program)
}

fn eval(source: &str) -> Value {
    run(source, Mode::Expression).unwrap()
}

fn script(source: &str) -> Value {
    run(source, Mode::Script).unwrap()
}

fn script_err(source: &str) -> EvalError {
    run(source, Mode::Script).unwrap_err()
}

// Expressions

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
    assert_eq!(eval("(1 + 2) * 3"), Value::Int(9));
}

#[test]
fn ternary_is_right_associative() {
    assert_eq!(eval("false ? 1 : false ? 2 : 3"), Value::Int(3));
    assert_eq!(eval("true ? 1 : true ? 2 : 3"), Value::Int(1));
}

#[test]
fn logical_operators_short_circuit() {
    // The division by zero on the right is never evaluated.
    assert_eq!(eval("false && 1 / 0 == 0"), Value::Bool(false));
    assert_eq!(eval("true || 1 / 0 == 0"), Value::Bool(true));
}

#[test]
fn comma_sequence_yields_the_last_value() {
    assert_eq!(eval("1, 3"), Value::Int(3));
}

#[test]
fn coalesce_takes_the_first_non_null() {
    assert_eq!(eval("null ?? 5"), Value::Int(5));
    assert_eq!(eval("3 ?? 5"), Value::Int(3));
}

#[test]
fn null_equality_short_circuits() {
    assert_eq!(eval("null == null"), Value::Bool(true));
    assert_eq!(eval("null == 0"), Value::Bool(false));
    assert_eq!(eval("null != 'x'"), Value::Bool(true));
}

#[test]
fn operator_aliases_evaluate() {
    assert_eq!(eval("2 @gt 1 @and 1 @lt 2"), Value::Bool(true));
    assert_eq!(eval("@not false"), Value::Bool(true));
}

#[test]
fn string_members_and_methods() {
    assert_eq!(eval("'hello'.Length"), Value::Int(5));
    assert_eq!(eval("'hello'.ToUpper()"), Value::str("HELLO"));
    assert_eq!(eval("'hello'.Substring(1, 3)"), Value::str("ell"));
}

#[test]
fn static_members_through_type_literals() {
    assert_eq!(eval("[Int32].MaxValue"), Value::Int(i64::from(i32::MAX)));
    assert_eq!(eval("[Math].Max(1.5, 2.5)"), Value::Float(2.5));
    assert_eq!(eval("[Int64].Parse('99')"), Value::Int(99));
}

#[test]
fn construction_with_initializers() {
    assert_eq!(eval("[Object] { X = 1 } .X"), Value::Int(1));
    assert_eq!(eval("[List<Int32>] { 5, 6 } [1]"), Value::Int(6));
    assert_eq!(eval("[List<Int32>] { 1, 2, 3 } .Count"), Value::Int(3));
    assert_eq!(
        eval("[Dictionary<String, Int32>] { { 'a', 1 } } ['a']"),
        Value::Int(1)
    );
}

#[test]
fn format_pseudo_operator() {
    assert_eq!(eval("@format('{0}+{1}', 1, 2)"), Value::str("1+2"));
}

#[test]
fn undefined_variable_is_an_error() {
    let err = run("$nope", Mode::Expression).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable { name: "nope".into() }
    );
}

// Scripts and control flow

#[test]
fn script_returns_through_top_level_return() {
    assert_eq!(script("var $x = 1 + 2; return 42 / 2;"), Value::Int(21));
}

#[test]
fn script_without_return_yields_null() {
    assert_eq!(script("var $x = 1;"), Value::Null);
}

#[test]
fn while_loop_counts_to_five() {
    assert_eq!(
        script("var $i = 0; while ($i < 5) { $i = $i + 1; } return $i;"),
        Value::Int(5)
    );
}

#[test]
fn for_loop_with_compound_assignment() {
    assert_eq!(
        script("var $sum = 0; for (var $i = 1; $i <= 3; $i++) { $sum += $i; } return $sum;"),
        Value::Int(6)
    );
}

#[test]
fn break_and_continue_in_loops() {
    // i=0 counts, i=1 continues (step still runs), i=2 counts, i=3 breaks.
    let source = "var $n = 0; \
                  for (var $i = 0; $i < 10; $i++) { \
                      if ($i == 3) break; \
                      if ($i == 1) continue; \
                      $n += 1; \
                  } \
                  return $n;";
    assert_eq!(script(source), Value::Int(2));
}

#[test]
fn foreach_iterates_lists_and_strings() {
    assert_eq!(
        script(
            "var $total = 0; foreach ($x in [List<Int32>] { 1, 2, 3 }) { $total += $x; } \
             return $total;"
        ),
        Value::Int(6)
    );
    assert_eq!(
        script("var $out = ''; foreach ($c in 'ab') { $out += $c; } return $out;"),
        Value::str("ab")
    );
}

#[test]
fn switch_selects_the_first_equal_case() {
    let source = "switch (2) { case 1: return 10; case 2: return 20; default: return 0; }";
    assert_eq!(script(source), Value::Int(20));
    let source = "switch (9) { case 1: return 10; default: return 0; }";
    assert_eq!(script(source), Value::Int(0));
}

#[test]
fn switch_consumes_break() {
    let source = "var $x = 0; switch (1) { case 1: $x = 5; break; } return $x;";
    assert_eq!(script(source), Value::Int(5));
}

#[test]
fn stray_break_at_the_boundary_is_an_error() {
    assert_eq!(
        script_err("break;").kind,
        EvalErrorKind::StrayLoopSignal { signal: "break" }
    );
    assert_eq!(
        script_err("continue;").kind,
        EvalErrorKind::StrayLoopSignal { signal: "continue" }
    );
}

// Functions

#[test]
fn function_declaration_and_call() {
    assert_eq!(
        script("var $Add($a, $b) { return $a + $b; } return $Add(1, 2);"),
        Value::Int(3)
    );
}

#[test]
fn function_falls_through_to_null() {
    assert_eq!(script("var $F() { } return $F();"), Value::Null);
}

#[test]
fn variadic_tail_packs_into_a_list() {
    let source = "var $Sum($first, ...$rest) { \
                      foreach ($x in $rest) { $first += $x; } \
                      return $first; \
                  } \
                  return $Sum(1, 2, 3, 4);";
    assert_eq!(script(source), Value::Int(10));
}

#[test]
fn function_arity_is_checked() {
    let err = script_err("var $F($a) { return $a; } return $F(1, 2);");
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "F".into(),
            expected: 1,
            got: 2
        }
    );
}

#[test]
fn function_bodies_are_scope_boundaries() {
    let err = script_err("var $x = 1; var $F() { return $x; } return $F();");
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable { name: "x".into() }
    );
}

#[test]
fn functions_are_first_class_by_name() {
    let source = "var $Inc($a) { return $a + 1; } var $f = $Inc; return $f(41);";
    assert_eq!(script(source), Value::Int(42));
}

#[test]
fn errors_carry_the_frame_trace() {
    let err = script_err("var $Boom() { return 1 / 0; } return $Boom();");
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(err.trace, vec!["Boom".to_string()]);
}

// Iterator and block expressions

#[test]
fn iterator_block_collects_yields() {
    assert_eq!(
        eval("@iterator: { yield 1; yield 2; yield 3; }"),
        Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn iterator_break_stops_collection() {
    assert_eq!(
        script(
            "return @iterator: { \
                 for (var $i = 0; $i < 10; $i++) { \
                     if ($i == 2) break; \
                     yield $i; \
                 } \
             };"
        ),
        Value::list(vec![Value::Int(0), Value::Int(1)])
    );
}

#[test]
fn iterator_block_sees_enclosing_locals() {
    assert_eq!(
        script("var $n = 2; return @iterator: { yield $n; yield $n * 2; };"),
        Value::list(vec![Value::Int(2), Value::Int(4)])
    );
}

#[test]
fn typed_iterator_converts_elements() {
    assert_eq!(
        eval("@iterator [Int32]: { yield '7'; yield 2.9; }"),
        Value::list(vec![Value::Int(7), Value::Int(2)])
    );
}

#[test]
fn yields_escape_function_calls_into_the_iterator() {
    let source = "var $Emit($n) { yield $n; } \
                  return @iterator: { $Emit(1); $Emit(2); };";
    assert_eq!(
        script(source),
        Value::list(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn yield_without_a_collector_is_an_error() {
    assert_eq!(
        script_err("yield 1;").kind,
        EvalErrorKind::YieldOutsideIterator
    );
}

#[test]
fn block_expression_yields_its_return() {
    assert_eq!(eval("@block: { return 1; }"), Value::Int(1));
    assert_eq!(eval("@block: { }"), Value::Null);
}

#[test]
fn block_expression_sees_enclosing_locals() {
    assert_eq!(
        script("var $x = 2; return @block: { return $x * 3; };"),
        Value::Int(6)
    );
}

#[test]
fn foreach_over_an_iterator_block() {
    assert_eq!(
        script(
            "var $total = 0; \
             foreach ($x in @iterator: { yield 1; yield 2; }) { $total += $x; } \
             return $total;"
        ),
        Value::Int(3)
    );
}

// Embedding hooks

#[test]
fn pre_bound_variables_are_visible() {
    let interner = Interner::new();
    let tokens = mel_lexer::tokenize("return $sender;", &interner).unwrap();
    let program = mel_parse::parse(&tokens, Mode::Script, &interner).unwrap();
    let host = HostRegistry::new();
    let mut evaluator = Evaluator::new(&host, &interner);
    evaluator.bind(interner.intern("sender"), Value::Int(7));
    assert_eq!(evaluator.run(&program).unwrap(), Value::Int(7));
}

#[test]
fn context_is_reachable_through_at_context() {
    let interner = Interner::new();
    let tokens = mel_lexer::tokenize("@context", &interner).unwrap();
    let program = mel_parse::parse(&tokens, Mode::Expression, &interner).unwrap();
    let host = HostRegistry::with_context(Value::Int(11));
    let mut evaluator = Evaluator::new(&host, &interner);
    assert_eq!(evaluator.run(&program).unwrap(), Value::Int(11));
}

#[test]
fn bare_members_resolve_on_the_context() {
    let interner = Interner::new();
    let tokens = mel_lexer::tokenize("Length", &interner).unwrap();
    let program = mel_parse::parse(&tokens, Mode::Expression, &interner).unwrap();
    let host = HostRegistry::with_context(Value::str("abcd"));
    let mut evaluator = Evaluator::new(&host, &interner);
    assert_eq!(evaluator.run(&program).unwrap(), Value::Int(4));
}
