//! Object/collection/dictionary initializer entries.
//!
//! Within `{ ... }` the parser must tell a property assignment
//! (`Name = expr`) from a positional collection element (an expression
//! that may itself start with an identifier). One token of lookahead past
//! a dequeued candidate decides it: dequeue the identifier, peek for `=`,
//! and push the identifier back when the peek fails. This is the parser's
//! single use of the cursor's pushback slot.

use crate::error::ParseError;
use crate::Parser;
use mel_ir::{InitEntry, TokenKind};

impl Parser<'_> {
    /// `{ entry, entry, ... }` — permits a trailing comma.
    pub(crate) fn parse_initializer(&mut self) -> Result<Vec<InitEntry>, ParseError> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        loop {
            if self.cursor.eat(TokenKind::RBrace) {
                return Ok(entries);
            }
            entries.push(self.parse_init_entry()?);
            if !self.cursor.eat(TokenKind::Comma) {
                self.cursor.expect(TokenKind::RBrace)?;
                return Ok(entries);
            }
        }
    }

    fn parse_init_entry(&mut self) -> Result<InitEntry, ParseError> {
        // `{ key, value }` dictionary entry.
        if self.cursor.current_kind() == TokenKind::LBrace {
            self.cursor.advance();
            let key = self.parse_assign()?;
            self.cursor.expect(TokenKind::Comma)?;
            let value = self.parse_assign()?;
            self.cursor.expect(TokenKind::RBrace)?;
            return Ok(InitEntry::Pair(key, value));
        }

        // Property assignment vs. positional element.
        if let TokenKind::Ident(name) = self.cursor.current_kind() {
            self.cursor.advance();
            if self.cursor.eat(TokenKind::Eq) {
                let value = self.parse_assign()?;
                return Ok(InitEntry::Property { name, value });
            }
            // Not `Name =`: the identifier starts an ordinary expression.
            self.cursor.retreat();
        }

        Ok(InitEntry::Element(self.parse_assign()?))
    }
}
