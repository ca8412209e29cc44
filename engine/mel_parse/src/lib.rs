//! Parser for Mel.
//!
//! A hand-written recursive-descent parser with precedence climbing for
//! binary operators. Assignment operators and the ternary's branches bind
//! right-to-left; everything else is left-associative. Unary prefix
//! operators recurse at their own level, and postfix chains (member
//! access, indexing, calls, postfix `++`/`--`) are a suffix loop on an
//! atom.
//!
//! The token cursor supports exactly one token of pushback
//! ([`cursor::Cursor::retreat`]); the only consumer is the
//! object-initializer grammar, which must dequeue a candidate token and
//! peek for `=` to tell a property assignment from a positional element.
//!
//! Parsing is driven by a [`Mode`]: plain expression, assignable
//! expression, callable expression, statement script, or event handler.
//! The parser fails if tokens remain after the top-level production.

mod cursor;
mod error;
mod grammar;

pub use error::ParseError;

use cursor::Cursor;
use mel_ir::{Interner, Mode, Program, TokenList};
use tracing::trace;

/// Parse a token stream under the given mode.
pub fn parse(tokens: &TokenList, mode: Mode, interner: &Interner) -> Result<Program, ParseError> {
    trace!(?mode, token_count = tokens.len(), "parse");
    let mut parser = Parser::new(tokens, interner);
    let program = match mode {
        Mode::Expression | Mode::Assign | Mode::Call => {
            let expr = parser.parse_sequence()?;
            match mode {
                Mode::Assign if !expr.is_assignable() => {
                    return Err(ParseError::NotAssignable { span: expr.span });
                }
                Mode::Call if !expr.is_call() => {
                    return Err(ParseError::NotCallable { span: expr.span });
                }
                _ => {}
            }
            Program::Expr(expr)
        }
        Mode::Script | Mode::EventHandler => Program::Script(parser.parse_statement_list()?),
    };
    parser.expect_end()?;
    Ok(program)
}

/// Parser state: a token cursor plus the interner (needed to join dotted
/// type names into a single interned name).
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a Interner,
    /// Set when a generic close consumed only the first `>` of a `>>`
    /// token; the next close takes the second half. Nested type arguments
    /// are the only place `>>` can straddle two productions.
    half_shr: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList, interner: &'a Interner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            half_shr: false,
        }
    }

    /// Fail unless the whole stream was consumed.
    fn expect_end(&self) -> Result<(), ParseError> {
        if self.cursor.at_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingTokens {
                found: self.cursor.current_kind(),
                span: self.cursor.current_span(),
            })
        }
    }
}
