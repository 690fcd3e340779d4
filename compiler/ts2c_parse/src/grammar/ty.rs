//! Type annotation skipping.
//!
//! Annotations carry no meaning for inference; the parser only needs to
//! step over them reliably. Covered forms: named types with dotted paths
//! and generic arguments, `T[]`, unions and intersections, object types,
//! tuple types, parenthesized and function types, literal types.

use ts2c_diagnostic::ErrorCode;
use ts2c_ir::Name;
use ts2c_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Skip `: Type` if present.
    pub(crate) fn skip_type_annotation(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&TokenKind::Colon) {
            self.skip_type()?;
        }
        Ok(())
    }

    pub(crate) fn skip_type(&mut self) -> Result<(), ParseError> {
        // Leading `|` is legal in unions.
        self.cursor.eat(&TokenKind::Pipe);
        loop {
            self.skip_type_primary()?;
            while self.cursor.check(&TokenKind::LBracket)
                && self.cursor.peek_is(1, &TokenKind::RBracket)
            {
                self.cursor.advance();
                self.cursor.advance();
            }
            if !(self.cursor.eat(&TokenKind::Pipe) || self.cursor.eat(&TokenKind::Amp)) {
                return Ok(());
            }
        }
    }

    fn skip_type_primary(&mut self) -> Result<(), ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Ident(_) => {
                self.cursor.advance();
                while self.cursor.check(&TokenKind::Dot)
                    && self.cursor.peek_is(1, &TokenKind::Ident(Name::EMPTY))
                {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                if self.cursor.check(&TokenKind::Lt) {
                    self.skip_generic_args()?;
                }
                Ok(())
            }
            TokenKind::Str(_)
            | TokenKind::Number(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Undefined => {
                self.cursor.advance();
                Ok(())
            }
            TokenKind::Typeof => {
                self.cursor.advance();
                self.cursor.expect_ident()?;
                Ok(())
            }
            TokenKind::LBrace => self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace),
            TokenKind::LBracket => self.skip_balanced(&TokenKind::LBracket, &TokenKind::RBracket),
            TokenKind::LParen => {
                self.skip_balanced(&TokenKind::LParen, &TokenKind::RParen)?;
                if self.cursor.eat(&TokenKind::Arrow) {
                    self.skip_type()?;
                }
                Ok(())
            }
            other => Err(ParseError::new(
                ErrorCode::E1001,
                format!("expected a type, found {}", other.display_name()),
                self.cursor.current_span(),
            )),
        }
    }

    /// Skip `<...>`, where closing may arrive fused as `>>` or `>>>`.
    fn skip_generic_args(&mut self) -> Result<(), ParseError> {
        let open = self.cursor.advance().span;
        let mut depth: i32 = 1;
        while depth > 0 {
            match self.cursor.current_kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::Shr => depth -= 2,
                TokenKind::UShr => depth -= 3,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "unclosed generic argument list",
                        open,
                    )
                    .with_context("opened here"));
                }
                _ => {}
            }
            self.cursor.advance();
        }
        Ok(())
    }

    /// Skip a bracketed group, including nested groups of the same kind.
    fn skip_balanced(&mut self, open: &TokenKind, close: &TokenKind) -> Result<(), ParseError> {
        let open_span = self.cursor.advance().span;
        let mut depth = 1usize;
        while depth > 0 {
            if self.cursor.check(open) {
                depth += 1;
            } else if self.cursor.check(close) {
                depth -= 1;
            } else if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1003,
                    format!("unclosed {} in type annotation", open.display_name()),
                    open_span,
                )
                .with_context("opened here"));
            }
            self.cursor.advance();
        }
        Ok(())
    }
}
