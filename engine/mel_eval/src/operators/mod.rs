//! Scalar operator implementations.
//!
//! This is the numeric fallback layer of binary dispatch: it runs
//! after host operator-overload lookup has declined and after the
//! null-equality short-circuit. The type set is fixed, so enum
//! dispatch via pattern matching is used throughout. Integer
//! arithmetic is checked; overflow, division by zero and shift range
//! are runtime errors, never wrapping.

use mel_ir::BinaryOp;

use crate::error::{
    binary_type_mismatch, division_by_zero, integer_overflow, shift_out_of_range,
    unary_type_mismatch, EvalResult,
};
use crate::value::Value;


/// Checked arithmetic where the only failure is overflow.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Checked division with a zero guard.
#[inline]
fn checked_div<F>(is_zero: bool, op: F, op_name: &'static str) -> EvalResult
where
    F: FnOnce() -> Option<i64>,
{
    if is_zero {
        Err(division_by_zero())
    } else {
        op().map(Value::Int).ok_or_else(|| integer_overflow(op_name))
    }
}

/// Evaluate a binary operator over scalar operands.
///
/// Mixed int/float operands widen to float. `&&`, `||` and `??` never
/// reach here; the evaluator short-circuits them.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(op, *a, *b, left, right),
        (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
            // as_float is Some for both by the match above.
            let a = left.as_float().unwrap_or_default();
            let b = right.as_float().unwrap_or_default();
            eval_float_binary(op, a, b, left, right)
        }
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(op, *a, *b, left, right),
        (Value::Str(a), Value::Str(b)) => eval_str_binary(op, a, b, left, right),
        _ => match op {
            // Reference/value equality fallback for the remaining types.
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => Ok(Value::Bool(left != right)),
            _ => Err(binary_type_mismatch(op, left, right)),
        },
    }
}

fn eval_int_binary(op: BinaryOp, a: i64, b: i64, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => checked_div(b == 0, || a.checked_div(b), "division"),
        BinaryOp::Mod => checked_div(b == 0, || a.checked_rem(b), "remainder"),
        BinaryOp::Shl | BinaryOp::Shr => {
            let amount = u32::try_from(b).map_err(|_| shift_out_of_range(b))?;
            let result = if op == BinaryOp::Shl {
                a.checked_shl(amount)
            } else {
                a.checked_shr(amount)
            };
            result.map(Value::Int).ok_or_else(|| shift_out_of_range(b))
        }
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op, left, right)),
    }
}

#[expect(clippy::float_cmp, reason = "equality semantics are IEEE comparison")]
fn eval_float_binary(op: BinaryOp, a: f64, b: f64, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod => Ok(Value::Float(a % b)),
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op, left, right)),
    }
}

fn eval_bool_binary(op: BinaryOp, a: bool, b: bool, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::BitAnd => Ok(Value::Bool(a & b)),
        BinaryOp::BitOr => Ok(Value::Bool(a | b)),
        BinaryOp::BitXor => Ok(Value::Bool(a ^ b)),
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        _ => Err(binary_type_mismatch(op, left, right)),
    }
}

fn eval_str_binary(op: BinaryOp, a: &str, b: &str, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Value::str(out))
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op, left, right)),
    }
}

/// Arithmetic negation with int overflow checking.
pub fn evaluate_neg(operand: &Value) -> EvalResult {
    match operand {
        Value::Int(n) => checked_arith(n.checked_neg(), "negation"),
        Value::Float(n) => Ok(Value::Float(-n)),
        _ => Err(unary_type_mismatch("-", operand)),
    }
}

/// Logical not over the condition coercion.
pub fn evaluate_not(operand: &Value) -> EvalResult {
    operand
        .as_condition()
        .map(|b| Value::Bool(!b))
        .ok_or_else(|| unary_type_mismatch("!", operand))
}

/// Bitwise complement, integers only.
pub fn evaluate_bit_not(operand: &Value) -> EvalResult {
    match operand {
        Value::Int(n) => Ok(Value::Int(!n)),
        _ => Err(unary_type_mismatch("~", operand)),
    }
}
