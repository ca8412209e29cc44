//! Statement productions.

use crate::error::ParseError;
use crate::Parser;
use mel_ir::{FuncDecl, Param, Stmt, StmtKind, SwitchCase, TokenKind};
use tracing::trace;

impl Parser<'_> {
    /// Statements until end of input.
    pub(crate) fn parse_statement_list(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.cursor.at_end() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Semicolon => {
                self.cursor.advance();
                Ok(Stmt::new(StmtKind::Empty, start))
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                let mut stmts = Vec::new();
                while !self.cursor.eat(TokenKind::RBrace) {
                    if self.cursor.at_end() {
                        return Err(self.cursor.unexpected("`}`"));
                    }
                    stmts.push(self.parse_statement()?);
                }
                let span = start.merge(self.cursor.previous_span());
                Ok(Stmt::new(StmtKind::Block(stmts), span))
            }
            TokenKind::Var => self.parse_var_or_function(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::LParen)?;
                let cond = self.parse_sequence()?;
                self.cursor.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                let span = start.merge(body.span);
                Ok(Stmt::new(StmtKind::While { cond, body }, span))
            }
            TokenKind::For => self.parse_for(),
            TokenKind::Foreach => self.parse_foreach(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break => {
                self.cursor.advance();
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                Ok(Stmt::new(StmtKind::Break, start.merge(end)))
            }
            TokenKind::Continue => {
                self.cursor.advance();
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                Ok(Stmt::new(StmtKind::Continue, start.merge(end)))
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.current_kind() == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_sequence()?)
                };
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                Ok(Stmt::new(StmtKind::Return(value), start.merge(end)))
            }
            TokenKind::Yield => {
                self.cursor.advance();
                let value = self.parse_sequence()?;
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                Ok(Stmt::new(StmtKind::Yield(value), start.merge(end)))
            }
            _ => {
                let expr = self.parse_sequence()?;
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                let span = expr.span.merge(end);
                Ok(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    /// `var $x;`, `var $x = e;`, or a function declaration
    /// `var $F($a, ...$rest) { ... }`.
    fn parse_var_or_function(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // var
        let (name, _) = self.cursor.expect_variable()?;

        if self.cursor.eat(TokenKind::LParen) {
            trace!("function declaration");
            let params = self.parse_parameter_list()?;
            self.cursor.expect(TokenKind::LBrace)?;
            let mut body = Vec::new();
            while !self.cursor.eat(TokenKind::RBrace) {
                if self.cursor.at_end() {
                    return Err(self.cursor.unexpected("`}`"));
                }
                body.push(self.parse_statement()?);
            }
            let span = start.merge(self.cursor.previous_span());
            return Ok(Stmt::new(
                StmtKind::FuncDecl(FuncDecl { name, params, body }),
                span,
            ));
        }

        let init = if self.cursor.eat(TokenKind::Eq) {
            Some(self.parse_assign()?)
        } else {
            None
        };
        let end = self.cursor.expect(TokenKind::Semicolon)?;
        Ok(Stmt::new(
            StmtKind::VarDecl { name, init },
            start.merge(end),
        ))
    }

    /// Parameters after the opening paren; at most the final parameter may
    /// be variadic (`...$rest`).
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.cursor.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let variadic = self.cursor.eat(TokenKind::DotDotDot);
            let (name, span) = self.cursor.expect_variable()?;
            params.push(Param { name, variadic });
            if self.cursor.eat(TokenKind::Comma) {
                if variadic {
                    return Err(ParseError::VariadicNotLast { span });
                }
                continue;
            }
            self.cursor.expect(TokenKind::RParen)?;
            return Ok(params);
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // if
        self.cursor.expect(TokenKind::LParen)?;
        let cond = self.parse_sequence()?;
        self.cursor.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.cursor.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map_or(then_branch.span, |stmt| stmt.span);
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start.merge(end),
        ))
    }

    /// Full C-style three-clause `for`.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // for
        self.cursor.expect(TokenKind::LParen)?;

        // Init clause: empty, a var declaration, or an expression. The
        // var/expression paths consume the clause's `;` themselves.
        let init = match self.cursor.current_kind() {
            TokenKind::Semicolon => {
                self.cursor.advance();
                None
            }
            TokenKind::Var => Some(Box::new(self.parse_var_or_function()?)),
            _ => {
                let expr = self.parse_sequence()?;
                let end = self.cursor.expect(TokenKind::Semicolon)?;
                let span = expr.span.merge(end);
                Some(Box::new(Stmt::new(StmtKind::Expr(expr), span)))
            }
        };

        let cond = if self.cursor.current_kind() == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_sequence()?)
        };
        self.cursor.expect(TokenKind::Semicolon)?;

        let step = if self.cursor.current_kind() == TokenKind::RParen {
            None
        } else {
            Some(self.parse_sequence()?)
        };
        self.cursor.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        let span = start.merge(body.span);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                cond,
                step,
                body,
            },
            span,
        ))
    }

    fn parse_foreach(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // foreach
        self.cursor.expect(TokenKind::LParen)?;
        let (binding, _) = self.cursor.expect_variable()?;
        self.cursor.expect(TokenKind::In)?;
        let iterable = self.parse_sequence()?;
        self.cursor.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let span = start.merge(body.span);
        Ok(Stmt::new(
            StmtKind::ForEach {
                binding,
                iterable,
                body,
            },
            span,
        ))
    }

    /// `switch (e) { case v: stmts... default: stmts }` — case bodies run
    /// to the next `case`/`default`/`}`.
    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // switch
        self.cursor.expect(TokenKind::LParen)?;
        let subject = self.parse_sequence()?;
        self.cursor.expect(TokenKind::RParen)?;
        self.cursor.expect(TokenKind::LBrace)?;

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut default: Option<Vec<Stmt>> = None;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Case => {
                    self.cursor.advance();
                    let value = self.parse_assign()?;
                    self.cursor.expect(TokenKind::Colon)?;
                    cases.push(SwitchCase {
                        value,
                        body: self.parse_case_body()?,
                    });
                }
                TokenKind::Default => {
                    if default.is_some() {
                        return Err(self.cursor.unexpected("`case` or `}`"));
                    }
                    self.cursor.advance();
                    self.cursor.expect(TokenKind::Colon)?;
                    default = Some(self.parse_case_body()?);
                }
                TokenKind::RBrace => {
                    let end = self.cursor.advance().span;
                    return Ok(Stmt::new(
                        StmtKind::Switch {
                            subject,
                            cases,
                            default,
                        },
                        start.merge(end),
                    ));
                }
                _ => return Err(self.cursor.unexpected("`case`, `default`, or `}`")),
            }
        }
    }

    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace => return Ok(body),
                TokenKind::Eof => return Err(self.cursor.unexpected("`}`")),
                _ => body.push(self.parse_statement()?),
            }
        }
    }
}
