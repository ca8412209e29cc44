//! Bracketed type references: `[Name]`, `[Ns.Name]`, `[List<Int32>]`,
//! `[List<>]`, `[Dictionary<,>]`.
//!
//! A generic reference supplies all of its type arguments or none;
//! partial application (`[Dictionary<String,>]`) is a parse error.

use crate::error::ParseError;
use crate::Parser;
use mel_ir::{Expr, ExprKind, Name, Span, TokenKind, TypeRef};

impl Parser<'_> {
    /// Atom starting at `[`: a type reference, optionally followed by
    /// constructor arguments and/or an initializer.
    pub(crate) fn parse_type_atom(&mut self) -> Result<Expr, ParseError> {
        let ty = self.parse_type_reference()?;
        let start = ty.span;

        let mut args = Vec::new();
        let mut has_call = false;
        if self.cursor.eat(TokenKind::LParen) {
            has_call = true;
            args = self.parse_argument_list(TokenKind::RParen)?;
            self.cursor.expect(TokenKind::RParen)?;
        }

        if self.cursor.current_kind() == TokenKind::LBrace {
            let init = self.parse_initializer()?;
            let span = start.merge(self.cursor.previous_span());
            return Ok(Expr::new(ExprKind::New { ty, args, init }, span));
        }

        if has_call {
            let span = start.merge(self.cursor.previous_span());
            return Ok(Expr::new(
                ExprKind::New {
                    ty,
                    args,
                    init: Vec::new(),
                },
                span,
            ));
        }

        Ok(Expr::new(ExprKind::TypeLit(ty), start))
    }

    /// `[` dotted-name generic-suffix? `]`
    pub(crate) fn parse_type_reference(&mut self) -> Result<TypeRef, ParseError> {
        let open = self.cursor.expect(TokenKind::LBracket)?;
        let mut ty = self.parse_type_name()?;
        let close = self.cursor.expect(TokenKind::RBracket)?;
        ty.span = open.merge(close);
        Ok(ty)
    }

    /// A dotted type name with an optional `<...>` suffix. Used both for
    /// the bracketed form and for nested type arguments.
    fn parse_type_name(&mut self) -> Result<TypeRef, ParseError> {
        let (first, first_span) = self.cursor.expect_ident()?;
        let mut segments: Vec<Name> = vec![first];
        let mut span = first_span;
        while self.cursor.eat(TokenKind::Dot) {
            let (seg, seg_span) = self.cursor.expect_ident()?;
            segments.push(seg);
            span = span.merge(seg_span);
        }
        let name = self.join_segments(&segments);

        if !self.cursor.eat(TokenKind::Lt) {
            return Ok(TypeRef {
                name,
                arity: 0,
                args: Vec::new(),
                span,
            });
        }
        self.parse_generic_suffix(name, span)
    }

    /// After the `<` of a generic suffix: either an open form (`<>`,
    /// `<,>`, ...) giving only the arity, or a full closed argument list.
    fn parse_generic_suffix(&mut self, name: Name, span: Span) -> Result<TypeRef, ParseError> {
        // Open form: nothing but commas before `>`.
        if self.at_generic_close() || self.cursor.current_kind() == TokenKind::Comma {
            let mut commas = 0u32;
            while self.cursor.eat(TokenKind::Comma) {
                commas += 1;
            }
            let close = self.expect_generic_close()?;
            return Ok(TypeRef {
                name,
                arity: commas + 1,
                args: Vec::new(),
                span: span.merge(close),
            });
        }

        // Closed form: every slot must name a type.
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_name()?);
            if self.cursor.eat(TokenKind::Comma) {
                // A `>` or another comma right after a comma is a hole:
                // some arguments were supplied, some omitted.
                if self.at_generic_close() || self.cursor.current_kind() == TokenKind::Comma {
                    return Err(ParseError::PartialGenericArgs {
                        span: self.cursor.current_span(),
                    });
                }
                continue;
            }
            break;
        }
        let close = self.expect_generic_close()?;
        let arity = u32::try_from(args.len()).unwrap_or(u32::MAX);
        Ok(TypeRef {
            name,
            arity,
            args,
            span: span.merge(close),
        })
    }

    /// Whether the current position closes a generic suffix: a `>`, either
    /// half of a `>>`, counts.
    fn at_generic_close(&self) -> bool {
        self.half_shr || matches!(self.cursor.current_kind(), TokenKind::Gt | TokenKind::Shr)
    }

    /// Consume one generic close. The lexer folds adjacent `>` into `>>`,
    /// so nested suffixes like `List<List<Int32>>` end on a single `Shr`
    /// token; the first close takes its left half and leaves the token in
    /// place, the second consumes it.
    fn expect_generic_close(&mut self) -> Result<Span, ParseError> {
        if self.half_shr {
            self.half_shr = false;
            return Ok(self.cursor.advance().span);
        }
        match self.cursor.current_kind() {
            TokenKind::Gt => Ok(self.cursor.advance().span),
            TokenKind::Shr => {
                self.half_shr = true;
                Ok(self.cursor.current_span())
            }
            _ => Err(self.cursor.unexpected("`>`")),
        }
    }

    /// Join dotted segments into one interned name (`System` + `Math`
    /// becomes `System.Math`); single segments reuse their name.
    fn join_segments(&self, segments: &[Name]) -> Name {
        if segments.len() == 1 {
            return segments[0];
        }
        let joined = segments
            .iter()
            .map(|&s| self.interner.lookup(s))
            .collect::<Vec<_>>()
            .join(".");
        self.interner.intern_owned(joined)
    }
}
