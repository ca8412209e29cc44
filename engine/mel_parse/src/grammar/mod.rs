//! Grammar productions, split by construct family.
//!
//! - `expr` — sequences, assignment, ternary, precedence climbing,
//!   unary, postfix chains, atoms.
//! - `stmt` — statement forms and statement lists.
//! - `ty` — bracketed type references with generic arity.
//! - `init` — object/collection/dictionary initializer entries.

mod expr;
mod init;
mod stmt;
mod ty;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
