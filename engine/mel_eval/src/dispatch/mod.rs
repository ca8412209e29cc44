//! Overload selection and variadic argument packing.
//!
//! When a method name has several candidates and no explicit generic
//! arguments were supplied, candidates are filtered by matching the
//! runtime types of the arguments positionally. Exactly one applicable
//! candidate is required: zero is a no-overload error, more than one
//! is an ambiguity error.

use crate::error::{ambiguous_overload, no_overload, EvalError};
use crate::value::{Value, ValueType};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;

/// The matchable shape of one candidate: positional parameter types
/// plus whether the final parameter is variadic.
#[derive(Clone, Copy, Debug)]
pub struct Signature<'a> {
    pub params: &'a [ValueType],
    pub variadic: bool,
}

impl Signature<'_> {
    /// Whether the supplied arguments satisfy this signature.
    pub fn matches(&self, args: &[Value]) -> bool {
        if self.variadic {
            // params is never empty for a variadic signature.
            let Some((&tail, fixed)) = self.params.split_last() else {
                return false;
            };
            if args.len() < fixed.len() {
                return false;
            }
            fixed
                .iter()
                .zip(args)
                .all(|(&p, a)| ValueType::accepts(p, a.value_type()))
                && args[fixed.len()..]
                    .iter()
                    .all(|a| ValueType::accepts(tail, a.value_type()))
        } else {
            self.params.len() == args.len()
                && self
                    .params
                    .iter()
                    .zip(args)
                    .all(|(&p, a)| ValueType::accepts(p, a.value_type()))
        }
    }
}

/// Pick the single applicable candidate for `args`.
///
/// Returns the index into `candidates`. `name` and `type_name` are
/// only used to build the error.
pub fn select_overload(
    name: &str,
    type_name: &str,
    candidates: impl Iterator<Item = Signature<'static>>,
    args: &[Value],
) -> Result<usize, EvalError> {
    let mut selected = None;
    for (i, sig) in candidates.enumerate() {
        if sig.matches(args) {
            if selected.is_some() {
                return Err(ambiguous_overload(name, type_name));
            }
            selected = Some(i);
        }
    }
    selected.ok_or_else(|| no_overload(name, type_name))
}

/// Pack the argument tail of a variadic call into a single list, so
/// the callee sees exactly `param_count` arguments.
pub fn pack_variadic(param_count: usize, mut args: Vec<Value>) -> Vec<Value> {
    let fixed = param_count - 1;
    let tail: Vec<Value> = args.split_off(fixed);
    args.push(Value::list(tail));
    args
}
