use crate::{parse, ParseError};
use mel_ir::{
    BinaryOp, Expr, ExprKind, InitEntry, Interner, Mode, Program, Stmt, StmtKind, UnaryOp,
};
use mel_lexer::tokenize;
use pretty_assertions::assert_eq;

fn parse_expr(source: &str) -> Expr {
    let interner = Interner::new();
    let tokens = tokenize(source, &interner).unwrap();
    match parse(&tokens, Mode::Expression, &interner).unwrap() {
        Program::Expr(expr) => expr,
        Program::Script(_) => panic!("expected expression program"),
    }
}

fn parse_script(source: &str) -> Vec<Stmt> {
    let interner = Interner::new();
    let tokens = tokenize(source, &interner).unwrap();
    match parse(&tokens, Mode::Script, &interner).unwrap() {
        Program::Script(stmts) => stmts,
        Program::Expr(_) => panic!("expected script program"),
    }
}

fn parse_err(source: &str, mode: Mode) -> ParseError {
    let interner = Interner::new();
    let tokens = tokenize(source, &interner).unwrap();
    parse(&tokens, mode, &interner).unwrap_err()
}

// Precedence and associativity

#[test]
fn multiplication_binds_tighter_than_addition() {
    let ExprKind::Binary { op, rhs, .. } = parse_expr("1 + 2 * 3").kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn same_level_operators_are_left_associative() {
    // (1 - 2) + 3
    let ExprKind::Binary { op, lhs, .. } = parse_expr("1 - 2 + 3").kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
}

#[test]
fn ternary_nests_to_the_right() {
    // false ? 1 : (false ? 1 : 2)
    let ExprKind::Conditional { else_branch, .. } = parse_expr("false ? 1 : false ? 1 : 2").kind
    else {
        panic!("expected conditional root");
    };
    assert!(matches!(else_branch.kind, ExprKind::Conditional { .. }));
}

#[test]
fn assignment_is_right_associative() {
    // $a = ($b = 1)
    let ExprKind::Assign { target, value, .. } = parse_expr("$a = $b = 1").kind else {
        panic!("expected assignment root");
    };
    assert!(matches!(target.kind, ExprKind::Variable(_)));
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn compound_assignment_carries_its_operator() {
    let ExprKind::Assign { op, .. } = parse_expr("$a += 2").kind else {
        panic!("expected assignment root");
    };
    assert_eq!(op, Some(BinaryOp::Add));
}

#[test]
fn spaced_double_negation() {
    let ExprKind::Unary { op, operand } = parse_expr("- - 1").kind else {
        panic!("expected unary root");
    };
    assert_eq!(op, UnaryOp::Neg);
    assert!(matches!(
        operand.kind,
        ExprKind::Unary {
            op: UnaryOp::Neg,
            ..
        }
    ));
}

#[test]
fn comma_sequence_collects_items() {
    let ExprKind::Sequence(items) = parse_expr("1, 2, 3").kind else {
        panic!("expected sequence root");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn coalesce_is_loosest_binary_operator() {
    // ($a ?? ($b || $c))
    let ExprKind::Binary { op, rhs, .. } = parse_expr("$a ?? $b || $c").kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Coalesce);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Or,
            ..
        }
    ));
}

// Postfix chains

#[test]
fn member_index_call_chain() {
    // a.b.c(1,2)[0]
    let ExprKind::Index { target, args } = parse_expr("a.b.c(1,2)[0]").kind else {
        panic!("expected index root");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Call { callee, args } = target.kind else {
        panic!("expected call under index");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(callee.kind, ExprKind::Member { .. }));
}

#[test]
fn bare_identifier_is_context_member() {
    let ExprKind::Member { target, .. } = parse_expr("Count").kind else {
        panic!("expected member root");
    };
    assert!(target.is_none());
}

#[test]
fn postfix_increment_requires_assignable_target() {
    assert!(matches!(
        parse_err("1++", Mode::Expression),
        ParseError::NotAssignable { .. }
    ));
    let ExprKind::IncDec {
        increment, prefix, ..
    } = parse_expr("$i++").kind
    else {
        panic!("expected inc/dec root");
    };
    assert!(increment);
    assert!(!prefix);
}

// Type references

#[test]
fn closed_generic_type_reference() {
    let interner = Interner::new();
    let tokens = tokenize("[List<Int32>]", &interner).unwrap();
    let Program::Expr(expr) = parse(&tokens, Mode::Expression, &interner).unwrap() else {
        panic!("expected expression");
    };
    let ExprKind::TypeLit(ty) = expr.kind else {
        panic!("expected type literal");
    };
    assert_eq!(interner.lookup(ty.name), "List");
    assert_eq!(ty.arity, 1);
    assert_eq!(ty.args.len(), 1);
    assert_eq!(interner.lookup(ty.args[0].name), "Int32");
}

#[test]
fn open_generic_type_reference() {
    let interner = Interner::new();
    let tokens = tokenize("[Dictionary<,>]", &interner).unwrap();
    let Program::Expr(expr) = parse(&tokens, Mode::Expression, &interner).unwrap() else {
        panic!("expected expression");
    };
    let ExprKind::TypeLit(ty) = expr.kind else {
        panic!("expected type literal");
    };
    assert_eq!(ty.arity, 2);
    assert!(ty.args.is_empty());
}

#[test]
fn dotted_type_name_is_joined() {
    let interner = Interner::new();
    let tokens = tokenize("[System.Math]", &interner).unwrap();
    let Program::Expr(expr) = parse(&tokens, Mode::Expression, &interner).unwrap() else {
        panic!("expected expression");
    };
    let ExprKind::TypeLit(ty) = expr.kind else {
        panic!("expected type literal");
    };
    assert_eq!(interner.lookup(ty.name), "System.Math");
}

#[test]
fn partial_generic_arguments_are_rejected() {
    assert!(matches!(
        parse_err("[Dictionary<String,>]", Mode::Expression),
        ParseError::PartialGenericArgs { .. }
    ));
}

#[test]
fn nested_generic_arguments() {
    let interner = Interner::new();
    let tokens = tokenize("[Dictionary<String, List<Int32>>]", &interner).unwrap();
    let Program::Expr(expr) = parse(&tokens, Mode::Expression, &interner).unwrap() else {
        panic!("expected expression");
    };
    let ExprKind::TypeLit(ty) = expr.kind else {
        panic!("expected type literal");
    };
    assert_eq!(ty.args.len(), 2);
    assert_eq!(ty.args[1].args.len(), 1);
}

// Initializers

#[test]
fn object_initializer_distinguishes_properties_from_elements() {
    let ExprKind::New { init, .. } = parse_expr("[Point] { X = 1, Y = 2 }").kind else {
        panic!("expected construction");
    };
    assert_eq!(init.len(), 2);
    assert!(matches!(init[0], InitEntry::Property { .. }));
}

#[test]
fn collection_initializer_elements_may_start_with_identifiers() {
    // `Count` is an element (context property), not a property assignment:
    // the pushback path.
    let ExprKind::New { init, .. } = parse_expr("[List<Int32>] { Count, 2, 3 }").kind else {
        panic!("expected construction");
    };
    assert_eq!(init.len(), 3);
    assert!(matches!(init[0], InitEntry::Element(_)));
}

#[test]
fn dictionary_initializer_pairs() {
    let ExprKind::New { init, .. } =
        parse_expr("[Dictionary<String, Int32>] { { 'a', 1 }, { 'b', 2 } }").kind
    else {
        panic!("expected construction");
    };
    assert_eq!(init.len(), 2);
    assert!(matches!(init[0], InitEntry::Pair(..)));
}

#[test]
fn constructor_arguments_without_initializer() {
    let ExprKind::New { args, init, .. } = parse_expr("[Point](1, 2)").kind else {
        panic!("expected construction");
    };
    assert_eq!(args.len(), 2);
    assert!(init.is_empty());
}

// Embedded block forms

#[test]
fn iterator_block_with_type_annotation() {
    let ExprKind::IteratorBlock { ty, body } =
        parse_expr("@iterator [Int32]: { yield 1; yield 2; }").kind
    else {
        panic!("expected iterator block");
    };
    assert!(ty.is_some());
    assert_eq!(body.len(), 2);
}

#[test]
fn block_expression() {
    let ExprKind::BlockExpr { body } = parse_expr("@block: { return 1; }").kind else {
        panic!("expected block expression");
    };
    assert_eq!(body.len(), 1);
}

// Statements

#[test]
fn script_statements() {
    let stmts = parse_script("var $x = 1 + 2; return 42 / 2;");
    assert_eq!(stmts.len(), 2);
    assert!(matches!(stmts[0].kind, StmtKind::VarDecl { .. }));
    assert!(matches!(stmts[1].kind, StmtKind::Return(Some(_))));
}

#[test]
fn function_declaration_with_variadic_tail() {
    let stmts = parse_script("var $F($a, ...$rest) { return $a; }");
    let StmtKind::FuncDecl(ref decl) = stmts[0].kind else {
        panic!("expected function declaration");
    };
    assert_eq!(decl.params.len(), 2);
    assert!(!decl.params[0].variadic);
    assert!(decl.params[1].variadic);
}

#[test]
fn variadic_must_be_last() {
    assert!(matches!(
        parse_err("var $F(...$rest, $a) { }", Mode::Script),
        ParseError::VariadicNotLast { .. }
    ));
}

#[test]
fn for_statement_clauses() {
    let stmts = parse_script("for (var $i = 0; $i < 3; $i++) { }");
    let StmtKind::For {
        ref init,
        ref cond,
        ref step,
        ..
    } = stmts[0].kind
    else {
        panic!("expected for");
    };
    assert!(init.is_some());
    assert!(cond.is_some());
    assert!(step.is_some());
}

#[test]
fn foreach_statement() {
    let stmts = parse_script("foreach ($x in $items) { }");
    assert!(matches!(stmts[0].kind, StmtKind::ForEach { .. }));
}

#[test]
fn switch_statement_cases_and_default() {
    let stmts = parse_script("switch ($x) { case 1: return 1; case 2: return 2; default: return 0; }");
    let StmtKind::Switch {
        ref cases,
        ref default,
        ..
    } = stmts[0].kind
    else {
        panic!("expected switch");
    };
    assert_eq!(cases.len(), 2);
    assert!(default.is_some());
}

#[test]
fn if_else_chain() {
    let stmts = parse_script("if ($a) return 1; else if ($b) return 2; else return 3;");
    let StmtKind::If {
        ref else_branch, ..
    } = stmts[0].kind
    else {
        panic!("expected if");
    };
    assert!(matches!(
        else_branch.as_deref().map(|s| &s.kind),
        Some(StmtKind::If { .. })
    ));
}

// Modes

#[test]
fn trailing_tokens_are_an_error() {
    assert!(matches!(
        parse_err("1 + 2 3", Mode::Expression),
        ParseError::TrailingTokens { .. }
    ));
}

#[test]
fn assign_mode_requires_assignable_root() {
    assert!(matches!(
        parse_err("1 + 2", Mode::Assign),
        ParseError::NotAssignable { .. }
    ));
    let interner = Interner::new();
    let tokens = tokenize("$a.B", &interner).unwrap();
    assert!(parse(&tokens, Mode::Assign, &interner).is_ok());
}

#[test]
fn call_mode_requires_call_root() {
    assert!(matches!(
        parse_err("$f", Mode::Call),
        ParseError::NotCallable { .. }
    ));
    let interner = Interner::new();
    let tokens = tokenize("$f(1)", &interner).unwrap();
    assert!(parse(&tokens, Mode::Call, &interner).is_ok());
}

#[test]
fn operator_aliases_parse_like_their_operators() {
    let ExprKind::Binary { op, lhs, rhs } = parse_expr("1 @gt 2 @and 3 @lt 4").kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Gt,
            ..
        }
    ));
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
}
