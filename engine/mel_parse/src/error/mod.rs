//! Parse error types.
//!
//! Every error names what the active production expected and what it
//! found, with the offending span. Errors are unrecoverable: the parser
//! reports the first failure and unwinds.

use mel_ir::{Span, TokenKind};
use std::fmt;

/// A malformed token sequence for the active grammar production.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The production needed one thing and saw another.
    Unexpected {
        expected: Box<str>,
        found: TokenKind,
        span: Span,
    },
    /// Tokens remained after the top-level production completed.
    TrailingTokens { found: TokenKind, span: Span },
    /// Assign mode requires the root to be an assignment target, or an
    /// assignment/increment was applied to a non-target.
    NotAssignable { span: Span },
    /// Call mode requires the root to be a call.
    NotCallable { span: Span },
    /// A generic type reference supplied some but not all of its type
    /// arguments (`[Dictionary<String,>]`).
    PartialGenericArgs { span: Span },
    /// A variadic parameter was not the final parameter.
    VariadicNotLast { span: Span },
}

impl ParseError {
    /// The source span the error points at.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { span, .. }
            | ParseError::TrailingTokens { span, .. }
            | ParseError::NotAssignable { span }
            | ParseError::NotCallable { span }
            | ParseError::PartialGenericArgs { span }
            | ParseError::VariadicNotLast { span } => *span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unexpected {
                expected,
                found,
                span,
            } => write!(f, "expected {expected}, found {found} at {span}"),
            ParseError::TrailingTokens { found, span } => {
                write!(f, "unexpected {found} after end of expression at {span}")
            }
            ParseError::NotAssignable { span } => {
                write!(f, "expression is not an assignment target at {span}")
            }
            ParseError::NotCallable { span } => {
                write!(f, "expression is not a call at {span}")
            }
            ParseError::PartialGenericArgs { span } => write!(
                f,
                "generic type arguments must all be supplied or all omitted at {span}"
            ),
            ParseError::VariadicNotLast { span } => {
                write!(f, "variadic parameter must be the final parameter at {span}")
            }
        }
    }
}

impl std::error::Error for ParseError {}
