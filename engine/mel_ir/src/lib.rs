//! Mel IR — spans, interned names, tokens and the expression/statement AST.
//!
//! This crate is the shared vocabulary of the engine: the lexer produces
//! [`Token`]s, the parser consumes them and builds a [`Program`], and the
//! evaluator walks that tree. It has no knowledge of lexing, parsing or
//! evaluation itself.

pub mod ast;
mod interner;
mod name;
mod span;
mod token;

pub use ast::{
    BinaryOp, Expr, ExprKind, FuncDecl, InitEntry, Mode, Param, Program, Stmt, StmtKind,
    SwitchCase, TypeRef, UnaryOp,
};
pub use interner::Interner;
pub use name::Name;
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
