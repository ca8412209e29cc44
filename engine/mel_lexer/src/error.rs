//! Lexical error types.

use mel_ir::Span;
use std::fmt;

/// A malformed token stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }
}

/// The ways tokenization can fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A string literal with no closing quote before end of input.
    UnterminatedString,
    /// A `/* ... */` comment still open at end of input (depth counts
    /// nested openers).
    UnterminatedBlockComment,
    /// An `@` word with no entry in the alias table.
    UnknownSpecialWord(Box<str>),
    /// A `$` sigil not followed by an identifier.
    BareVariableSigil,
    /// An escape sequence the grammar does not define.
    InvalidEscape(char),
    /// An integer literal that does not fit the engine's 64-bit tier.
    IntOutOfRange,
    /// A character that starts no valid token.
    InvalidCharacter(char),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::UnterminatedString => {
                write!(f, "unterminated string literal at {}", self.span)
            }
            LexErrorKind::UnterminatedBlockComment => {
                write!(f, "unterminated block comment at {}", self.span)
            }
            LexErrorKind::UnknownSpecialWord(word) => {
                write!(f, "unknown special word `@{}` at {}", word, self.span)
            }
            LexErrorKind::BareVariableSigil => {
                write!(f, "`$` must be followed by a variable name at {}", self.span)
            }
            LexErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape sequence `\\{}` at {}", c, self.span)
            }
            LexErrorKind::IntOutOfRange => {
                write!(f, "integer literal out of range at {}", self.span)
            }
            LexErrorKind::InvalidCharacter(c) => {
                write!(f, "unexpected character `{}` at {}", c.escape_debug(), self.span)
            }
        }
    }
}

impl std::error::Error for LexError {}
