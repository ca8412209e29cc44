//! Expression productions.

use crate::error::ParseError;
use crate::Parser;
use mel_ir::{BinaryOp, Expr, ExprKind, TokenKind, UnaryOp};
use tracing::trace;

/// Binding powers for the precedence-climbing loop, loosest to tightest.
/// Assignment and the ternary live above this table (right-associative);
/// unary/postfix below it.
fn binding_power(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let pair = match kind {
        TokenKind::QuestionQuestion => (BinaryOp::Coalesce, 1),
        TokenKind::PipePipe => (BinaryOp::Or, 2),
        TokenKind::AmpAmp => (BinaryOp::And, 3),
        TokenKind::Pipe => (BinaryOp::BitOr, 4),
        TokenKind::Caret => (BinaryOp::BitXor, 5),
        TokenKind::Amp => (BinaryOp::BitAnd, 6),
        TokenKind::EqEq => (BinaryOp::Eq, 7),
        TokenKind::NotEq => (BinaryOp::NotEq, 7),
        TokenKind::Lt => (BinaryOp::Lt, 8),
        TokenKind::LtEq => (BinaryOp::LtEq, 8),
        TokenKind::Gt => (BinaryOp::Gt, 8),
        TokenKind::GtEq => (BinaryOp::GtEq, 8),
        TokenKind::Shl => (BinaryOp::Shl, 9),
        TokenKind::Shr => (BinaryOp::Shr, 9),
        TokenKind::Plus => (BinaryOp::Add, 10),
        TokenKind::Minus => (BinaryOp::Sub, 10),
        TokenKind::Star => (BinaryOp::Mul, 11),
        TokenKind::Slash => (BinaryOp::Div, 11),
        TokenKind::Percent => (BinaryOp::Mod, 11),
        _ => return None,
    };
    Some(pair)
}

/// Compound-assignment operator table.
fn compound_op(kind: TokenKind) -> Option<Option<BinaryOp>> {
    let op = match kind {
        TokenKind::Eq => None,
        TokenKind::PlusEq => Some(BinaryOp::Add),
        TokenKind::MinusEq => Some(BinaryOp::Sub),
        TokenKind::StarEq => Some(BinaryOp::Mul),
        TokenKind::SlashEq => Some(BinaryOp::Div),
        TokenKind::PercentEq => Some(BinaryOp::Mod),
        TokenKind::AmpEq => Some(BinaryOp::BitAnd),
        TokenKind::PipeEq => Some(BinaryOp::BitOr),
        TokenKind::CaretEq => Some(BinaryOp::BitXor),
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Comma sequence: `a, b, c` evaluates left to right, yields the last.
    pub(crate) fn parse_sequence(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assign()?;
        if self.cursor.current_kind() != TokenKind::Comma {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat(TokenKind::Comma) {
            items.push(self.parse_assign()?);
        }
        let span = items[0].span.merge(items[items.len() - 1].span);
        Ok(Expr::new(ExprKind::Sequence(items), span))
    }

    /// Assignment (right-associative), then the ternary.
    pub(crate) fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_conditional()?;
        let Some(op) = compound_op(self.cursor.current_kind()) else {
            return Ok(lhs);
        };
        if !lhs.is_assignable() {
            return Err(ParseError::NotAssignable { span: lhs.span });
        }
        self.cursor.advance();
        let value = self.parse_assign()?;
        let span = lhs.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(lhs),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// Ternary conditional; the else branch recurses at assignment level,
    /// so nested ternaries bind right-to-left.
    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.cursor.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_branch = self.parse_assign()?;
        self.cursor.expect(TokenKind::Colon)?;
        let else_branch = self.parse_assign()?;
        let span = cond.span.merge(else_branch.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    /// Precedence climbing over the static table; all table operators are
    /// left-associative.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, bp)) = binding_power(self.cursor.current_kind()) {
            if bp < min_bp {
                break;
            }
            self.cursor.advance();
            let rhs = self.parse_binary(bp + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Unary prefix operators recurse at their own level.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.cursor.advance().span;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        // Prefix increment/decrement.
        let increment = match self.cursor.current_kind() {
            TokenKind::PlusPlus => Some(true),
            TokenKind::MinusMinus => Some(false),
            _ => None,
        };
        if let Some(increment) = increment {
            let start = self.cursor.advance().span;
            let target = self.parse_unary()?;
            if !target.is_assignable() {
                return Err(ParseError::NotAssignable { span: target.span });
            }
            let span = start.merge(target.span);
            return Ok(Expr::new(
                ExprKind::IncDec {
                    increment,
                    prefix: true,
                    target: Box::new(target),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    /// Postfix suffix loop: member access, indexing, calls, `++`/`--`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (name, name_span) = self.cursor.expect_ident()?;
                    let span = expr.span.merge(name_span);
                    expr = Expr::new(
                        ExprKind::Member {
                            target: Some(Box::new(expr)),
                            name,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let args = self.parse_argument_list(TokenKind::RBracket)?;
                    let end = self.cursor.expect(TokenKind::RBracket)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_argument_list(TokenKind::RParen)?;
                    let end = self.cursor.expect(TokenKind::RParen)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let increment = self.cursor.current_kind() == TokenKind::PlusPlus;
                    if !expr.is_assignable() {
                        return Err(ParseError::NotAssignable { span: expr.span });
                    }
                    let end = self.cursor.advance().span;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::IncDec {
                            increment,
                            prefix: false,
                            target: Box::new(expr),
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma-separated argument list up to (not including) `close`.
    pub(crate) fn parse_argument_list(
        &mut self,
        close: TokenKind,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.cursor.current_kind() == close {
            return Ok(args);
        }
        loop {
            args.push(self.parse_assign()?);
            if !self.cursor.eat(TokenKind::Comma) {
                return Ok(args);
            }
        }
    }

    /// Atoms: literals, variables, context, parenthesized expressions,
    /// type references (with optional construction), `@format`, and the
    /// two embedded-block forms.
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current().clone();
        match token.kind {
            TokenKind::Int(value) => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Int(value), token.span))
            }
            TokenKind::Float(bits) => {
                self.cursor.advance();
                Ok(Expr::new(
                    ExprKind::Float(TokenKind::float_value(bits)),
                    token.span,
                ))
            }
            TokenKind::Str(name) => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Str(name), token.span))
            }
            TokenKind::True => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Bool(true), token.span))
            }
            TokenKind::False => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Bool(false), token.span))
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Null, token.span))
            }
            TokenKind::Variable(name) => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Variable(name), token.span))
            }
            TokenKind::Ident(name) => {
                // Bare identifier: a property on the ambient context.
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Member { target: None, name }, token.span))
            }
            TokenKind::ContextKw => {
                self.cursor.advance();
                Ok(Expr::new(ExprKind::Context, token.span))
            }
            TokenKind::FormatKw => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::LParen)?;
                let args = self.parse_argument_list(TokenKind::RParen)?;
                let end = self.cursor.expect(TokenKind::RParen)?;
                if args.is_empty() {
                    return Err(self.cursor.unexpected("format template"));
                }
                Ok(Expr::new(ExprKind::Format { args }, token.span.merge(end)))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_sequence()?;
                let end = self.cursor.expect(TokenKind::RParen)?;
                Ok(Expr::new(inner.kind, token.span.merge(end)))
            }
            TokenKind::LBracket => self.parse_type_atom(),
            TokenKind::IteratorKw => {
                trace!("iterator block");
                self.cursor.advance();
                let ty = if self.cursor.current_kind() == TokenKind::LBracket {
                    Some(self.parse_type_reference()?)
                } else {
                    None
                };
                self.cursor.expect(TokenKind::Colon)?;
                let body = self.parse_embedded_body()?;
                let span = token.span.merge(self.cursor.previous_span());
                Ok(Expr::new(ExprKind::IteratorBlock { ty, body }, span))
            }
            TokenKind::BlockKw => {
                trace!("block expression");
                self.cursor.advance();
                self.cursor.expect(TokenKind::Colon)?;
                let body = self.parse_embedded_body()?;
                let span = token.span.merge(self.cursor.previous_span());
                Ok(Expr::new(ExprKind::BlockExpr { body }, span))
            }
            _ => Err(self.cursor.unexpected("expression")),
        }
    }

    /// Statement body of an embedded block form: a brace block's contents,
    /// or a single statement.
    fn parse_embedded_body(&mut self) -> Result<Vec<mel_ir::Stmt>, ParseError> {
        let stmt = self.parse_statement()?;
        Ok(match stmt.kind {
            mel_ir::StmtKind::Block(stmts) => stmts,
            _ => vec![stmt],
        })
    }
}
