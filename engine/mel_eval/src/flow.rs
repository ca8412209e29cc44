//! Control-flow signals.

use crate::value::Value;

/// The outcome of executing one statement.
///
/// Statement sequencing stops the instant a non-`Normal` flow appears
/// and hands it to the caller unchanged; only the construct that owns
/// the signal consumes it. Loops consume `Break` and `Continue`,
/// function and block bodies consume `Return`. `yield` is not a flow
/// signal: it appends to the nearest collector frame and execution
/// continues.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

impl Flow {
    pub fn is_normal(&self) -> bool {
        matches!(self, Flow::Normal)
    }
}
