//! Expression parsing.
//!
//! Assignment and the conditional operator are handled directly; binary
//! operators go through a precedence-climbing loop driven by
//! [`binary_op`].

use ts2c_diagnostic::ErrorCode;
use ts2c_ir::stack::ensure_sufficient_stack;
use ts2c_ir::{BinaryOp, NodeId, NodeKind, UnaryOp, UpdateOp};
use ts2c_lexer::{parse_number, TokenKind};

use crate::{ParseError, Parser};

/// Binary operator and binding power for a token (higher binds tighter).
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, 1),
        TokenKind::AmpAmp => (BinaryOp::And, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Amp => (BinaryOp::BitAnd, 5),
        TokenKind::EqEq => (BinaryOp::Eq, 6),
        TokenKind::NotEq => (BinaryOp::NotEq, 6),
        TokenKind::EqEqEq => (BinaryOp::StrictEq, 6),
        TokenKind::NotEqEq => (BinaryOp::StrictNotEq, 6),
        TokenKind::Lt => (BinaryOp::Lt, 7),
        TokenKind::LtEq => (BinaryOp::LtEq, 7),
        TokenKind::Gt => (BinaryOp::Gt, 7),
        TokenKind::GtEq => (BinaryOp::GtEq, 7),
        TokenKind::Shl => (BinaryOp::Shl, 8),
        TokenKind::Shr => (BinaryOp::Shr, 8),
        TokenKind::UShr => (BinaryOp::UShr, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Sub, 9),
        TokenKind::Star => (BinaryOp::Mul, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Mod, 10),
        _ => return None,
    };
    Some(op)
}

/// Assignment operator for a token; `Some(None)` is plain `=`.
fn assign_op(kind: TokenKind) -> Option<Option<BinaryOp>> {
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
        TokenKind::ShlEq => Some(BinaryOp::Shl),
        TokenKind::ShrEq => Some(BinaryOp::Shr),
        TokenKind::UShrEq => Some(BinaryOp::UShr),
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` to survive deeply nested input.
    pub(crate) fn parse_expr(&mut self) -> Result<NodeId, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    /// Assignment is right associative: `a = b = c`.
    pub(crate) fn parse_assignment(&mut self) -> Result<NodeId, ParseError> {
        let target = self.parse_conditional()?;

        if self.cursor.check(&TokenKind::Arrow) {
            return Err(ParseError::new(
                ErrorCode::E1005,
                "arrow functions are not supported",
                self.cursor.current_span(),
            ));
        }

        let Some(op) = assign_op(self.cursor.current_kind()) else {
            return Ok(target);
        };
        self.check_assignment_target(target)?;
        self.cursor.advance();
        let value = ensure_sufficient_stack(|| self.parse_assignment())?;
        let span = self.ast.span(target).merge(self.ast.span(value));
        Ok(self
            .ast
            .alloc(NodeKind::Assign { op, target, value }, span))
    }

    fn check_assignment_target(&self, target: NodeId) -> Result<(), ParseError> {
        match self.ast.kind(self.ast.unparen(target)) {
            NodeKind::Ident { .. } | NodeKind::Member { .. } | NodeKind::Index { .. } => Ok(()),
            _ => Err(ParseError::new(
                ErrorCode::E1001,
                "invalid assignment target",
                self.ast.span(target),
            )),
        }
    }

    fn parse_conditional(&mut self) -> Result<NodeId, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_assignment()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let else_expr = self.parse_assignment()?;
        let span = self.ast.span(cond).merge(self.ast.span(else_expr));
        Ok(self.ast.alloc(
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            },
            span,
        ))
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_power: u8) -> Result<NodeId, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            // `expr as T` casts are erased.
            if self.cursor.check_contextual("as") && !self.cursor.newline_before() {
                self.cursor.advance();
                self.skip_type()?;
                continue;
            }

            let Some((op, power)) = binary_op(self.cursor.current_kind()) else {
                break;
            };
            if power < min_power {
                break;
            }
            self.cursor.advance();
            let right = ensure_sufficient_stack(|| self.parse_binary(power + 1))?;
            let span = self.ast.span(left).merge(self.ast.span(right));
            left = self.ast.alloc(NodeKind::Binary { op, left, right }, span);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let token = self.cursor.advance();
                let op = if matches!(token.kind, TokenKind::PlusPlus) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                self.check_assignment_target(operand)?;
                let span = self.span_from(token.span);
                return Ok(self.ast.alloc(
                    NodeKind::Update {
                        op,
                        prefix: true,
                        operand,
                    },
                    span,
                ));
            }
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_postfix();
        };
        let start = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = self.span_from(start);
        Ok(self.ast.alloc(NodeKind::Unary { op, operand }, span))
    }

    fn parse_postfix(&mut self) -> Result<NodeId, ParseError> {
        let operand = self.parse_call_member()?;
        let op = match self.cursor.current_kind() {
            TokenKind::PlusPlus if !self.cursor.newline_before() => UpdateOp::Increment,
            TokenKind::MinusMinus if !self.cursor.newline_before() => UpdateOp::Decrement,
            _ => return Ok(operand),
        };
        self.check_assignment_target(operand)?;
        self.cursor.advance();
        let span = self.span_from(self.ast.span(operand));
        Ok(self.ast.alloc(
            NodeKind::Update {
                op,
                prefix: false,
                operand,
            },
            span,
        ))
    }

    /// Primary expression followed by `.name`, `[index]` and `(args)`.
    fn parse_call_member(&mut self) -> Result<NodeId, ParseError> {
        let mut expr = self.parse_primary()?;
        let start = self.ast.span(expr);

        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (property, _) = self.cursor.expect_property_name()?;
                    let span = self.span_from(start);
                    expr = self.ast.alloc(
                        NodeKind::Member {
                            object: expr,
                            property,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    let span = self.span_from(start);
                    expr = self.ast.alloc(NodeKind::Index { object: expr, index }, span);
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_comma_list(&TokenKind::RParen)?;
                    let span = self.span_from(start);
                    expr = self.ast.alloc(NodeKind::Call { callee: expr, args }, span);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma separated expressions up to and including `close`; a trailing
    /// comma is allowed.
    fn parse_comma_list(&mut self, close: &TokenKind) -> Result<Vec<NodeId>, ParseError> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            items.push(self.parse_assignment()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::Number(raw) => {
                let text = self.interner().lookup(raw);
                let value = parse_number(text).unwrap_or(0.0);
                NodeKind::Number { value, raw }
            }
            TokenKind::Str(value) => NodeKind::Str { value },
            TokenKind::True => NodeKind::Bool { value: true },
            TokenKind::False => NodeKind::Bool { value: false },
            TokenKind::Null => NodeKind::Null,
            TokenKind::Undefined => NodeKind::Undefined,
            TokenKind::Ident(name) => NodeKind::Ident { name },
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::Function => {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    "function expressions are not supported",
                    token.span,
                )
                .with_context("declare a named function instead"));
            }
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    format!("expected expression, found {}", other.display_name()),
                    token.span,
                ));
            }
        };
        self.cursor.advance();
        Ok(self.ast.alloc(kind, token.span))
    }

    fn parse_paren(&mut self) -> Result<NodeId, ParseError> {
        let open = self.cursor.advance().span;
        let expr = self.parse_expr()?;
        if !self.cursor.check(&TokenKind::RParen) {
            return Err(ParseError::new(
                ErrorCode::E1003,
                format!(
                    "expected `)`, found {}",
                    self.cursor.current_kind().display_name()
                ),
                self.cursor.current_span(),
            )
            .with_context("unclosed `(`"));
        }
        self.cursor.advance();
        let span = self.span_from(open);
        Ok(self.ast.alloc(NodeKind::Paren { expr }, span))
    }

    fn parse_array(&mut self) -> Result<NodeId, ParseError> {
        let open = self.cursor.advance().span;
        let elements = self.parse_comma_list(&TokenKind::RBracket)?;
        let span = self.span_from(open);
        Ok(self.ast.alloc(NodeKind::Array { elements }, span))
    }

    /// `{ key: value, "key": value, shorthand }`
    fn parse_object(&mut self) -> Result<NodeId, ParseError> {
        let open = self.cursor.advance().span;
        let mut properties = Vec::new();

        while !self.cursor.check(&TokenKind::RBrace) {
            let shorthand = matches!(self.cursor.current_kind(), TokenKind::Ident(_));
            let (key, key_span) = self.cursor.expect_property_name()?;
            let value = if self.cursor.eat(&TokenKind::Colon) {
                self.parse_assignment()?
            } else if shorthand {
                self.ast.alloc(NodeKind::Ident { name: key }, key_span)
            } else {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!(
                        "expected `:`, found {}",
                        self.cursor.current_kind().display_name()
                    ),
                    self.cursor.current_span(),
                ));
            };
            let span = self.span_from(key_span);
            properties.push(self.ast.alloc(NodeKind::Property { key, value }, span));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.cursor.expect(&TokenKind::RBrace)?;
        let span = self.span_from(open);
        Ok(self.ast.alloc(NodeKind::Object { properties }, span))
    }
}
