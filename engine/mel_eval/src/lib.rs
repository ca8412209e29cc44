//! Tree-walking evaluator for the Mel engine.
//!
//! The crate is organized around four ideas:
//!
//! - [`Value`]: a small fixed value universe with reference-semantics
//!   containers.
//! - [`FrameStack`]: explicit frames with role flags; scoping,
//!   auto-vivification and `yield` collection all live here.
//! - [`Flow`]: statement execution returns an explicit control-signal
//!   sum type instead of carrying flags on the evaluator.
//! - [`HostAccessor`]: the single capability the embedding injects;
//!   [`HostRegistry`] is the default descriptor-table implementation.
//!
//! [`Evaluator`] ties them together for one program run.

pub mod dispatch;
pub mod error;
pub mod flow;
pub mod format;
pub mod frame;
pub mod host;
pub mod interpreter;
pub mod operators;
pub mod stack;
pub mod value;

pub use error::{EvalError, EvalErrorKind, EvalResult};
pub use flow::Flow;
pub use frame::{FrameFlags, FrameStack};
pub use host::{HostAccessor, HostRegistry, TypeDescriptor};
pub use interpreter::{Evaluator, FunctionDef};
pub use value::{ObjectData, Shared, TypeHandle, Value, ValueType};
