//! Runtime error types.
//!
//! `EvalErrorKind` gives every failure a typed category so embedders
//! can match on it instead of parsing messages. Factory functions are
//! the construction API. As an error unwinds through function, loop
//! and block frames it accumulates their labels, letting the embedder
//! render a stack trace at the run boundary.

use mel_ir::BinaryOp;
use std::fmt;

use crate::value::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed category of a runtime failure.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    IntegerOverflow { operation: &'static str },
    ShiftOutOfRange { amount: i64 },

    // Operators
    BinaryTypeMismatch { op: BinaryOp, left: &'static str, right: &'static str },
    UnaryTypeMismatch { op: &'static str, operand: &'static str },
    ConditionNotBoolean { got: &'static str },

    // Names and members
    UndefinedVariable { name: String },
    UndefinedFunction { name: String },
    NoSuchMember { member: String, type_name: String },
    NoSuchType { name: String },

    // Calls and dispatch
    ArityMismatch { name: String, expected: usize, got: usize },
    NoOverload { name: String, type_name: String },
    AmbiguousOverload { name: String, type_name: String },
    NotCallable { type_name: &'static str },
    NotAssignable,

    // Data access
    IndexOutOfBounds { index: i64, len: usize },
    KeyNotFound { key: String },
    NotIterable { type_name: &'static str },
    ConversionFailed { value: String, target: String },
    FormatArgMissing { index: usize },

    // Control flow
    YieldOutsideIterator,
    /// `break` or `continue` reached the engine boundary without an
    /// enclosing loop to consume it.
    StrayLoopSignal { signal: &'static str },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::ShiftOutOfRange { amount } => {
                write!(f, "shift amount {amount} out of range")
            }
            Self::BinaryTypeMismatch { op, left, right } => write!(
                f,
                "operator `{}` cannot be applied to {left} and {right}",
                op.as_symbol()
            ),
            Self::UnaryTypeMismatch { op, operand } => {
                write!(f, "operator `{op}` cannot be applied to {operand}")
            }
            Self::ConditionNotBoolean { got } => {
                write!(f, "condition must be a boolean or number, got {got}")
            }
            Self::UndefinedVariable { name } => write!(f, "undefined variable: ${name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: ${name}"),
            Self::NoSuchMember { member, type_name } => {
                write!(f, "no member '{member}' on {type_name}")
            }
            Self::NoSuchType { name } => write!(f, "unknown type: {name}"),
            Self::ArityMismatch { name, expected, got } => {
                let word = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "{name} expects {expected} {word}, got {got}")
            }
            Self::NoOverload { name, type_name } => {
                write!(f, "no overload of '{name}' on {type_name} matches the arguments")
            }
            Self::AmbiguousOverload { name, type_name } => {
                write!(f, "ambiguous call to '{name}' on {type_name}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::NotAssignable => write!(f, "expression is not an assignment target"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds (length {len})")
            }
            Self::KeyNotFound { key } => write!(f, "key not found: {key}"),
            Self::NotIterable { type_name } => write!(f, "{type_name} is not iterable"),
            Self::ConversionFailed { value, target } => {
                write!(f, "cannot convert {value} to {target}")
            }
            Self::FormatArgMissing { index } => {
                write!(f, "format placeholder {{{index}}} has no argument")
            }
            Self::YieldOutsideIterator => {
                write!(f, "yield used outside an iterator block")
            }
            Self::StrayLoopSignal { signal } => {
                write!(f, "{signal} used outside a loop")
            }
        }
    }
}

/// A runtime failure with the frame labels it unwound through.
///
/// `trace` is innermost-first; labels are function names and the
/// markers pushed for loops, iterator blocks and event handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub trace: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            trace: Vec::new(),
        }
    }

    /// Record the label of a frame this error is unwinding through.
    pub fn push_frame(&mut self, label: impl Into<String>) {
        self.trace.push(label.into());
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for label in &self.trace {
            write!(f, "\n  in {label}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Factory constructors

pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::IntegerOverflow { operation })
}

pub fn shift_out_of_range(amount: i64) -> EvalError {
    EvalError::new(EvalErrorKind::ShiftOutOfRange { amount })
}

pub fn binary_type_mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::BinaryTypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    })
}

pub fn unary_type_mismatch(op: &'static str, operand: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::UnaryTypeMismatch {
        op,
        operand: operand.type_name(),
    })
}

pub fn condition_not_boolean(got: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::ConditionNotBoolean {
        got: got.type_name(),
    })
}

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedVariable { name: name.into() })
}

pub fn undefined_function(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedFunction { name: name.into() })
}

pub fn no_such_member(member: &str, type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoSuchMember {
        member: member.into(),
        type_name: type_name.into(),
    })
}

pub fn no_such_type(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoSuchType { name: name.into() })
}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::new(EvalErrorKind::ArityMismatch {
        name: name.into(),
        expected,
        got,
    })
}

pub fn no_overload(name: &str, type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoOverload {
        name: name.into(),
        type_name: type_name.into(),
    })
}

pub fn ambiguous_overload(name: &str, type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::AmbiguousOverload {
        name: name.into(),
        type_name: type_name.into(),
    })
}

pub fn not_callable(value: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable {
        type_name: value.type_name(),
    })
}

pub fn not_assignable() -> EvalError {
    EvalError::new(EvalErrorKind::NotAssignable)
}

pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index, len })
}

pub fn key_not_found(key: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

pub fn not_iterable(value: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::NotIterable {
        type_name: value.type_name(),
    })
}

pub fn conversion_failed(value: &Value, target: &str) -> EvalError {
    EvalError::new(EvalErrorKind::ConversionFailed {
        value: value.to_string(),
        target: target.into(),
    })
}

pub fn format_arg_missing(index: usize) -> EvalError {
    EvalError::new(EvalErrorKind::FormatArgMissing { index })
}

pub fn yield_outside_iterator() -> EvalError {
    EvalError::new(EvalErrorKind::YieldOutsideIterator)
}

pub fn stray_loop_signal(signal: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::StrayLoopSignal { signal })
}
