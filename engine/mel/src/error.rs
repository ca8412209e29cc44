//! Umbrella error for the embedding surface.

use std::fmt;

use mel_eval::EvalError;
use mel_lexer::LexError;
use mel_parse::ParseError;

/// Any failure an embedder can see: tokenizing, parsing, or evaluating.
#[derive(Debug, PartialEq)]
pub enum EngineError {
    Lex(LexError),
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lex error: {err}"),
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Eval(err) => write!(f, "eval error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Eval(err) => Some(err),
        }
    }
}

impl From<LexError> for EngineError {
    fn from(err: LexError) -> Self {
        Self::Lex(err)
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalError> for EngineError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}
