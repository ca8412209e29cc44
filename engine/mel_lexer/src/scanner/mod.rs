//! The scanner: one pass over the byte cursor producing cooked tokens.
//!
//! Main dispatch matches on the current byte and calls a focused method
//! per token family. Identifier and string payloads are interned as they
//! are produced, so the parser never touches source text.

use crate::cursor::Cursor;
use crate::error::{LexError, LexErrorKind};
use crate::source_buffer::SourceBuffer;
use mel_ir::{Interner, Span, Token, TokenKind, TokenList};

pub(crate) struct Scanner<'a> {
    buffer: &'a SourceBuffer,
    cursor: Cursor<'a>,
    interner: &'a Interner,
    tokens: TokenList,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(buffer: &'a SourceBuffer, interner: &'a Interner) -> Self {
        Scanner {
            buffer,
            cursor: Cursor::new(buffer),
            interner,
            // Most markup expressions are short; half the source length is
            // a comfortable upper bound on token count.
            tokens: TokenList::with_capacity(buffer.source_len() / 2 + 1),
        }
    }

    pub(crate) fn run(mut self) -> Result<TokenList, LexError> {
        loop {
            self.skip_whitespace();
            let start = self.cursor.pos();
            if self.cursor.is_eof() {
                self.push(TokenKind::Eof, start);
                return Ok(self.tokens);
            }
            match self.cursor.current() {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(start),
                b'0'..=b'9' => self.number(start)?,
                b'\'' | b'"' => self.string(start)?,
                b'$' => self.variable(start)?,
                b'@' => self.special(start)?,
                b'/' => self.slash(start)?,
                b'.' => self.dot(start),
                b'(' => self.single(start, TokenKind::LParen),
                b')' => self.single(start, TokenKind::RParen),
                b'{' => self.single(start, TokenKind::LBrace),
                b'}' => self.single(start, TokenKind::RBrace),
                b'[' => self.single(start, TokenKind::LBracket),
                b']' => self.single(start, TokenKind::RBracket),
                b',' => self.single(start, TokenKind::Comma),
                b';' => self.single(start, TokenKind::Semicolon),
                b':' => self.single(start, TokenKind::Colon),
                b'~' => self.single(start, TokenKind::Tilde),
                b'=' => self.one_or_eq(start, TokenKind::Eq, TokenKind::EqEq),
                b'!' => self.one_or_eq(start, TokenKind::Bang, TokenKind::NotEq),
                b'*' => self.one_or_eq(start, TokenKind::Star, TokenKind::StarEq),
                b'%' => self.one_or_eq(start, TokenKind::Percent, TokenKind::PercentEq),
                b'^' => self.one_or_eq(start, TokenKind::Caret, TokenKind::CaretEq),
                b'<' => self.angle(start, b'<', TokenKind::Lt, TokenKind::LtEq, TokenKind::Shl),
                b'>' => self.angle(start, b'>', TokenKind::Gt, TokenKind::GtEq, TokenKind::Shr),
                b'+' => self.doubling(start, b'+', TokenKind::Plus, TokenKind::PlusPlus, TokenKind::PlusEq),
                b'-' => self.doubling(start, b'-', TokenKind::Minus, TokenKind::MinusMinus, TokenKind::MinusEq),
                b'&' => self.doubling(start, b'&', TokenKind::Amp, TokenKind::AmpAmp, TokenKind::AmpEq),
                b'|' => self.doubling(start, b'|', TokenKind::Pipe, TokenKind::PipePipe, TokenKind::PipeEq),
                b'?' => self.question(start),
                _ => return Err(self.invalid_character(start)),
            }
        }
    }

    // Token families

    fn identifier(&mut self, start: usize) {
        while matches!(self.cursor.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.cursor.advance();
        }
        let text = self.buffer.slice(start, self.cursor.pos());
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Ident(self.interner.intern(text)));
        self.push(kind, start);
    }

    fn number(&mut self, start: usize) -> Result<(), LexError> {
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
        // A `.` starts the fractional part only when a digit follows;
        // otherwise it is member access on an integer literal.
        let is_float = self.cursor.current() == b'.' && self.cursor.peek(1).is_ascii_digit();
        if is_float {
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let text = self.buffer.slice(start, self.cursor.pos());
        let kind = if is_float {
            // Digits-and-one-dot always parses as f64.
            TokenKind::float(text.parse::<f64>().unwrap_or(f64::NAN))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| LexError::new(LexErrorKind::IntOutOfRange, self.span_from(start)))?;
            TokenKind::Int(value)
        };
        self.push(kind, start);
        Ok(())
    }

    fn string(&mut self, start: usize) -> Result<(), LexError> {
        let quote = self.cursor.current();
        self.cursor.advance();
        let mut cooked: Vec<u8> = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedString,
                    self.span_from(start),
                ));
            }
            let byte = self.cursor.current();
            if byte == quote {
                self.cursor.advance();
                break;
            }
            if byte == b'\\' {
                self.cursor.advance();
                let escaped = self.cursor.current();
                let replacement = match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'0' => b'\0',
                    b'\\' => b'\\',
                    b'\'' => b'\'',
                    b'"' => b'"',
                    other => {
                        return Err(LexError::new(
                            LexErrorKind::InvalidEscape(char::from(other)),
                            self.span_from(start),
                        ));
                    }
                };
                cooked.push(replacement);
                self.cursor.advance();
            } else {
                cooked.push(byte);
                self.cursor.advance();
            }
        }
        let text = String::from_utf8_lossy(&cooked).into_owned();
        let name = self.interner.intern_owned(text);
        self.push(TokenKind::Str(name), start);
        Ok(())
    }

    fn variable(&mut self, start: usize) -> Result<(), LexError> {
        self.cursor.advance(); // $
        if !matches!(self.cursor.current(), b'a'..=b'z' | b'A'..=b'Z' | b'_') {
            return Err(LexError::new(
                LexErrorKind::BareVariableSigil,
                self.span_from(start),
            ));
        }
        let word_start = self.cursor.pos();
        while matches!(self.cursor.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.cursor.advance();
        }
        let text = self.buffer.slice(word_start, self.cursor.pos());
        let name = self.interner.intern(text);
        self.push(TokenKind::Variable(name), start);
        Ok(())
    }

    /// `@word` — resolve through the reserved-word alias table.
    fn special(&mut self, start: usize) -> Result<(), LexError> {
        self.cursor.advance(); // @
        let word_start = self.cursor.pos();
        while matches!(self.cursor.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.cursor.advance();
        }
        let word = self.buffer.slice(word_start, self.cursor.pos());
        let kind = match word {
            "iterator" => TokenKind::IteratorKw,
            "block" => TokenKind::BlockKw,
            "context" => TokenKind::ContextKw,
            "format" => TokenKind::FormatKw,
            // Operator aliases for characters that are awkward inside
            // markup attributes.
            "gt" => TokenKind::Gt,
            "lt" => TokenKind::Lt,
            "gte" => TokenKind::GtEq,
            "lte" => TokenKind::LtEq,
            "eq" => TokenKind::EqEq,
            "ne" => TokenKind::NotEq,
            "and" => TokenKind::AmpAmp,
            "or" => TokenKind::PipePipe,
            "not" => TokenKind::Bang,
            _ => {
                return Err(LexError::new(
                    LexErrorKind::UnknownSpecialWord(word.into()),
                    self.span_from(start),
                ));
            }
        };
        self.push(kind, start);
        Ok(())
    }

    fn slash(&mut self, start: usize) -> Result<(), LexError> {
        match self.cursor.peek(1) {
            b'/' => {
                self.cursor.advance_n(2);
                self.line_comment();
                Ok(())
            }
            b'*' => {
                self.cursor.advance_n(2);
                self.block_comment(start)
            }
            b'=' => {
                self.cursor.advance_n(2);
                self.push(TokenKind::SlashEq, start);
                Ok(())
            }
            _ => {
                self.cursor.advance();
                self.push(TokenKind::Slash, start);
                Ok(())
            }
        }
    }

    /// Line comment: runs to the next statement terminator `;`, which is
    /// consumed with the comment — not to end of line. At end of input the
    /// comment simply ends.
    fn line_comment(&mut self) {
        match memchr::memchr(b';', self.cursor.rest()) {
            Some(offset) => self.cursor.advance_n(offset + 1),
            None => self.cursor.set_pos(self.buffer.source_len()),
        }
    }

    /// Block comment with nesting: each `/*` increments depth, each `*/`
    /// decrements; the comment ends when depth returns to zero.
    fn block_comment(&mut self, start: usize) -> Result<(), LexError> {
        let mut depth = 1u32;
        while depth > 0 {
            if self.cursor.is_eof() {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedBlockComment,
                    self.span_from(start),
                ));
            }
            match (self.cursor.current(), self.cursor.peek(1)) {
                (b'/', b'*') => {
                    depth += 1;
                    self.cursor.advance_n(2);
                }
                (b'*', b'/') => {
                    depth -= 1;
                    self.cursor.advance_n(2);
                }
                _ => self.cursor.advance(),
            }
        }
        Ok(())
    }

    fn dot(&mut self, start: usize) {
        if self.cursor.peek(1) == b'.' && self.cursor.peek(2) == b'.' {
            self.cursor.advance_n(3);
            self.push(TokenKind::DotDotDot, start);
        } else {
            self.single(start, TokenKind::Dot);
        }
    }

    fn question(&mut self, start: usize) {
        if self.cursor.peek(1) == b'?' {
            self.cursor.advance_n(2);
            self.push(TokenKind::QuestionQuestion, start);
        } else {
            self.single(start, TokenKind::Question);
        }
    }

    // Operator helpers

    fn single(&mut self, start: usize, kind: TokenKind) {
        self.cursor.advance();
        self.push(kind, start);
    }

    /// `X` or `X=`.
    fn one_or_eq(&mut self, start: usize, plain: TokenKind, with_eq: TokenKind) {
        self.cursor.advance();
        if self.cursor.current() == b'=' {
            self.cursor.advance();
            self.push(with_eq, start);
        } else {
            self.push(plain, start);
        }
    }

    /// `<`/`>` family: doubled is a shift, `=` suffix a comparison.
    fn angle(&mut self, start: usize, byte: u8, plain: TokenKind, cmp: TokenKind, shift: TokenKind) {
        self.cursor.advance();
        if self.cursor.current() == byte {
            self.cursor.advance();
            self.push(shift, start);
        } else if self.cursor.current() == b'=' {
            self.cursor.advance();
            self.push(cmp, start);
        } else {
            self.push(plain, start);
        }
    }

    /// `X`, `XX`, or `X=` (e.g. `+`, `++`, `+=`).
    fn doubling(&mut self, start: usize, byte: u8, plain: TokenKind, doubled: TokenKind, with_eq: TokenKind) {
        self.cursor.advance();
        if self.cursor.current() == byte {
            self.cursor.advance();
            self.push(doubled, start);
        } else if self.cursor.current() == b'=' {
            self.cursor.advance();
            self.push(with_eq, start);
        } else {
            self.push(plain, start);
        }
    }

    // Infrastructure

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.current(), b' ' | b'\t' | b'\r' | b'\n') && !self.cursor.is_eof()
        {
            self.cursor.advance();
        }
    }

    fn invalid_character(&mut self, start: usize) -> LexError {
        // Decode the full character for the message; the cursor sits on
        // its first byte.
        let rest = self.buffer.slice(start, self.buffer.source_len());
        let c = rest.chars().next().unwrap_or('\u{FFFD}');
        LexError::new(LexErrorKind::InvalidCharacter(c), Span::point(start as u32))
    }

    fn span_from(&self, start: usize) -> Span {
        Span::from_range(start..self.cursor.pos())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = self.span_from(start);
        self.tokens.push(Token::new(kind, span));
    }
}

/// Bare-identifier keyword table. `true`/`false`/`null` are keyword
/// aliases for their literal values.
fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "var" => TokenKind::Var,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "in" => TokenKind::In,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "yield" => TokenKind::Yield,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => return None,
    })
}
