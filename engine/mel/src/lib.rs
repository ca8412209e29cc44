//! Embeddable Mel runtime.
//!
//! Mel is a small expression and statement language meant to be wired into
//! a host application: expressions in markup attributes, scripts behind
//! event handlers. This crate is the embedding surface over the engine
//! crates:
//!
//! ```text
//! mel_ir, mel_lexer, mel_parse, mel_eval
//!                 ↓
//!                mel  ← this crate
//! ```
//!
//! A [`Runtime`] holds the interner and a compile cache keyed by
//! `(mode, source text)`; compiled [`CodeUnit`]s are immutable and shared
//! by `Arc`. Each evaluation builds a fresh engine over a caller-supplied
//! [`HostAccessor`], so runs are independent by construction.
//!
//! # Usage
//!
//! ```ignore
//! use mel::{HostRegistry, Runtime, Value};
//!
//! let runtime = Runtime::new();
//! let host = HostRegistry::new();
//! let value = runtime.eval_expression("1 + 2 * 3", &host)?;
//! assert_eq!(value, Value::Int(7));
//! ```

mod error;
mod runtime;

pub use error::EngineError;
pub use runtime::{CodeUnit, Runtime};

pub use mel_eval::{
    EvalError, EvalErrorKind, Evaluator, HostAccessor, HostRegistry, TypeDescriptor, TypeHandle,
    Value,
};
pub use mel_ir::{Interner, Mode, Name, Program};
pub use mel_lexer::LexError;
pub use mel_parse::ParseError;
