//! Token cursor with single-token pushback.
//!
//! The stream is monotonically consumed except for one pushback slot:
//! [`Cursor::retreat`] rewinds exactly one token, and at most one retreat
//! may follow each advance. The initializer grammar is the only caller.

use crate::error::ParseError;
use mel_ir::{Name, Span, Token, TokenKind, TokenList};

pub(crate) struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
    /// Set by `advance`, cleared by `retreat`; guards the single-slot
    /// pushback invariant in debug builds.
    #[cfg(debug_assertions)]
    can_retreat: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a TokenList) -> Self {
        debug_assert!(
            matches!(tokens.get(tokens.len().wrapping_sub(1)).map(|t| t.kind), Some(TokenKind::Eof)),
            "token list must end with Eof"
        );
        Cursor {
            tokens,
            pos: 0,
            #[cfg(debug_assertions)]
            can_retreat: false,
        }
    }

    /// Current token.
    ///
    /// Invariant: the position never passes the trailing `Eof` token.
    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Dequeue the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        #[cfg(debug_assertions)]
        {
            self.can_retreat = true;
        }
        token
    }

    /// Push the last dequeued token back. Only one token of pushback is
    /// available; a second retreat without an intervening advance is a bug.
    pub(crate) fn retreat(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.can_retreat, "double retreat without advance");
            self.can_retreat = false;
        }
        debug_assert!(self.pos > 0, "retreat at start of stream");
        self.pos -= 1;
    }

    /// Consume the current token if it matches `kind` (payload-free kinds
    /// only; payload kinds have dedicated accessors).
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail naming it.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Span, ParseError> {
        if self.current_kind() == kind {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Consume an identifier, returning its name and span.
    pub(crate) fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Consume a variable token, returning its name and span.
    pub(crate) fn expect_variable(&mut self) -> Result<(Name, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Variable(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected("variable")),
        }
    }

    /// Build an "expected X, found Y" error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            expected: expected.into(),
            found: self.current_kind(),
            span: self.current_span(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
