//! Statement parsing.

use ts2c_diagnostic::ErrorCode;
use ts2c_ir::stack::ensure_sufficient_stack;
use ts2c_ir::{DeclKind, NodeId, NodeKind, Span};
use ts2c_lexer::TokenKind;

use crate::recovery::synchronize;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse statements until `}` (or end of input at top level).
    ///
    /// Errors are recorded and parsing resumes at the next statement.
    pub(crate) fn parse_statement_list(&mut self, top_level: bool) -> Vec<NodeId> {
        let mut body = Vec::new();
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            if self.cursor.check(&TokenKind::RBrace) {
                if !top_level {
                    break;
                }
                self.errors.push(ParseError::new(
                    ErrorCode::E1001,
                    "unexpected `}`",
                    self.cursor.current_span(),
                ));
                self.cursor.advance();
                continue;
            }

            let before = self.cursor.position();
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(error) => {
                    self.errors.push(error);
                    synchronize(&mut self.cursor);
                    if self.cursor.position() == before {
                        self.cursor.advance();
                    }
                }
            }
        }
        body
    }

    pub(crate) fn parse_statement(&mut self) -> Result<NodeId, ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<NodeId, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon()?;
                Ok(decl)
            }
            TokenKind::Function => self.parse_function(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => self.parse_jump(NodeKind::Break),
            TokenKind::Continue => self.parse_jump(NodeKind::Continue),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semi => {
                let span = self.cursor.advance().span;
                Ok(self.ast.alloc(NodeKind::Empty, span))
            }
            TokenKind::Ident(name) if self.at_unsupported_declaration() => {
                let start = self.cursor.current_span();
                let word = self.interner().lookup(name);
                self.skip_declaration_body();
                let span = self.span_from(start);
                self.errors.push(ParseError::new(
                    ErrorCode::E1005,
                    format!("`{word}` declarations are not supported"),
                    span,
                ));
                Ok(self.ast.alloc(NodeKind::Empty, span))
            }
            TokenKind::Ident(_)
                if self.cursor.check_contextual("export")
                    && matches!(
                        self.cursor.peek(1).kind,
                        TokenKind::Function | TokenKind::Var | TokenKind::Let | TokenKind::Const
                    ) =>
            {
                // Module syntax is irrelevant for a single translation unit.
                self.cursor.advance();
                self.parse_statement_inner()
            }
            _ => {
                let start = self.cursor.current_span();
                let expr = self.parse_expr()?;
                self.consume_semicolon()?;
                let span = self.span_from(start);
                Ok(self.ast.alloc(NodeKind::ExprStmt { expr }, span))
            }
        }
    }

    /// `type X = ...`, `interface X {}`, `class X {}`, `enum X {}`.
    fn at_unsupported_declaration(&self) -> bool {
        ["type", "interface", "class", "enum", "import"]
            .iter()
            .any(|word| self.cursor.check_contextual(word))
            && matches!(
                self.cursor.peek(1).kind,
                TokenKind::Ident(_) | TokenKind::LBrace | TokenKind::Str(_)
            )
            && !self.cursor.peek(1).newline_before
    }

    /// Step over an unsupported declaration: up to the end of its first
    /// brace group, or to the end of the statement when it has none.
    fn skip_declaration_body(&mut self) {
        let mut depth = 0usize;
        self.cursor.advance();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth <= 1 {
                        self.cursor.advance();
                        self.cursor.eat(&TokenKind::Semi);
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Semi if depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                _ if depth == 0 && self.cursor.newline_before() => return,
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// Accept `;`, or insert one before `}`, end of input, or a line break.
    pub(crate) fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&TokenKind::Semi)
            || self.cursor.check(&TokenKind::RBrace)
            || self.cursor.is_at_end()
            || self.cursor.newline_before()
        {
            return Ok(());
        }
        Err(ParseError::new(
            ErrorCode::E1001,
            format!(
                "expected `;`, found {}",
                self.cursor.current_kind().display_name()
            ),
            self.cursor.current_span(),
        ))
    }

    fn decl_kind(kind: TokenKind) -> DeclKind {
        match kind {
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => DeclKind::Var,
        }
    }

    /// `var|let|const a [: T] [= init], ...` without the terminator.
    fn parse_var_decl(&mut self) -> Result<NodeId, ParseError> {
        let keyword = self.cursor.advance();
        let kind = Self::decl_kind(keyword.kind);
        let mut declarators = Vec::new();
        loop {
            declarators.push(self.parse_declarator()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let span = self.span_from(keyword.span);
        Ok(self.ast.alloc(NodeKind::VarDecl { kind, declarators }, span))
    }

    fn parse_declarator(&mut self) -> Result<NodeId, ParseError> {
        let (name, name_span) = self.cursor.expect_ident()?;
        self.skip_type_annotation()?;
        let init = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        let span = self.span_from(name_span);
        Ok(self.ast.alloc(NodeKind::Declarator { name, init }, span))
    }

    fn parse_function(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        let (name, _) = self.cursor.expect_ident()?;

        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let (param, span) = self.cursor.expect_ident()?;
            // Optional marker `x?: T`.
            self.cursor.eat(&TokenKind::Question);
            self.skip_type_annotation()?;
            if self.cursor.check(&TokenKind::Eq) {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    "default parameter values are not supported",
                    self.cursor.current_span(),
                ));
            }
            params.push(self.ast.alloc(NodeKind::Param { name: param }, span));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        self.skip_type_annotation()?;

        let body = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.ast.alloc(NodeKind::Function { name, params, body }, span))
    }

    fn parse_return(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        let value = if self.cursor.check(&TokenKind::Semi)
            || self.cursor.check(&TokenKind::RBrace)
            || self.cursor.is_at_end()
            || self.cursor.newline_before()
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume_semicolon()?;
        let span = self.span_from(start);
        Ok(self.ast.alloc(NodeKind::Return { value }, span))
    }

    fn parse_jump(&mut self, kind: NodeKind) -> Result<NodeId, ParseError> {
        let span = self.cursor.advance().span;
        self.consume_semicolon()?;
        Ok(self.ast.alloc(kind, span))
    }

    fn parse_paren_condition(&mut self) -> Result<NodeId, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(cond)
    }

    fn parse_if(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_paren_condition()?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.cursor.eat(&TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.ast.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(self.ast.alloc(NodeKind::While { cond, body }, span))
    }

    fn parse_do_while(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        let body = self.parse_statement()?;
        self.cursor.expect(&TokenKind::While)?;
        let cond = self.parse_paren_condition()?;
        // `do ... while (c)` may be followed by a statement on the same line.
        self.cursor.eat(&TokenKind::Semi);
        let span = self.span_from(start);
        Ok(self.ast.alloc(NodeKind::DoWhile { body, cond }, span))
    }

    /// C-style `for`, `for-of` and `for-in`.
    fn parse_for(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LParen)?;

        let init = match self.cursor.current_kind() {
            TokenKind::Semi => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                if let Some(binding) = self.try_parse_iteration_binding()? {
                    return self.parse_for_iteration(start, binding);
                }
                Some(self.parse_var_decl()?)
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.at_iteration_keyword() {
                    if !matches!(self.ast.kind(expr), NodeKind::Ident { .. }) {
                        return Err(ParseError::new(
                            ErrorCode::E1005,
                            "only a plain identifier may be bound by `for-of`/`for-in`",
                            self.ast.span(expr),
                        ));
                    }
                    return self.parse_for_iteration(start, expr);
                }
                Some(expr)
            }
        };
        self.cursor.expect(&TokenKind::Semi)?;

        let cond = if self.cursor.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::Semi)?;

        let update = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::RParen)?;

        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(self.ast.alloc(
            NodeKind::For {
                init,
                cond,
                update,
                body,
            },
            span,
        ))
    }

    fn at_iteration_keyword(&self) -> bool {
        self.cursor.check(&TokenKind::In) || self.cursor.check_contextual("of")
    }

    /// `let x of` / `const k in`: a single-declarator binding with no
    /// initializer. Returns `None` (consuming nothing) for a normal
    /// declaration list.
    fn try_parse_iteration_binding(&mut self) -> Result<Option<NodeId>, ParseError> {
        let is_binding = matches!(self.cursor.peek(1).kind, TokenKind::Ident(_))
            && match self.cursor.peek(2).kind {
                TokenKind::In => true,
                TokenKind::Ident(word) => self.interner().lookup(word) == "of",
                _ => false,
            };
        if !is_binding {
            return Ok(None);
        }

        let keyword = self.cursor.advance();
        let (name, name_span) = self.cursor.expect_ident()?;
        let declarator = self
            .ast
            .alloc(NodeKind::Declarator { name, init: None }, name_span);
        let span = self.span_from(keyword.span);
        Ok(Some(self.ast.alloc(
            NodeKind::VarDecl {
                kind: Self::decl_kind(keyword.kind),
                declarators: vec![declarator],
            },
            span,
        )))
    }

    fn parse_for_iteration(&mut self, start: Span, left: NodeId) -> Result<NodeId, ParseError> {
        let is_of = !self.cursor.check(&TokenKind::In);
        self.cursor.advance();
        let right = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        let kind = if is_of {
            NodeKind::ForOf { left, right, body }
        } else {
            NodeKind::ForIn { left, right, body }
        };
        Ok(self.ast.alloc(kind, span))
    }

    pub(crate) fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBrace)?.span;
        let body = self.parse_statement_list(false);
        if !self.cursor.check(&TokenKind::RBrace) {
            return Err(ParseError::new(ErrorCode::E1003, "unclosed block", open)
                .with_context("this `{` is never closed"));
        }
        self.cursor.advance();
        let span = self.span_from(open);
        Ok(self.ast.alloc(NodeKind::Block { body }, span))
    }
}
