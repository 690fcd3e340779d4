//! Recursive descent parser for the ts2c source subset.
//!
//! Produces the flat [`Ast`] arena. Type annotations are recognized and
//! skipped; they never reach the syntax tree.
//!
//! # Module Structure
//!
//! - `cursor.rs`: token access and expectation helpers
//! - `recovery.rs`: resynchronization after errors
//! - `grammar/stmt.rs`: statements and declarations
//! - `grammar/expr.rs`: expressions, precedence climbing
//! - `grammar/ty.rs`: annotation skipping

mod cursor;
mod error;
mod grammar;
mod recovery;

pub use cursor::Cursor;
pub use error::ParseError;

use ts2c_diagnostic::Diagnostic;
use ts2c_ir::{Ast, NodeKind, Span, StringInterner};
use ts2c_lexer::{LexError, TokenList};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    ast: Ast,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            ast: Ast::new(),
            errors: Vec::new(),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    fn interner(&self) -> &'a StringInterner {
        self.cursor.interner()
    }

    /// Parse a whole program.
    pub fn parse_program(mut self) -> ParseOutput {
        let start = self.cursor.current_span();
        let body = self.parse_statement_list(true);
        let end = self.cursor.current_span();
        let root = self.ast.alloc(
            NodeKind::Program { body },
            Span::new(start.start.min(end.end), end.end),
        );

        ParseOutput {
            ast: self.ast.finish(root),
            lex_errors: Vec::new(),
            errors: self.errors,
        }
    }
}

/// Parse result: the arena plus every error found on the way.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub ast: Ast,
    pub lex_errors: Vec<LexError>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.lex_errors.is_empty()
    }

    /// Lexer and parser errors as diagnostics, in source order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<(u32, Diagnostic)> = self
            .lex_errors
            .iter()
            .map(|e| (e.span.start, e.to_diagnostic()))
            .chain(self.errors.iter().map(|e| (e.span.start, e.to_diagnostic())))
            .collect();
        diagnostics.sort_by_key(|(start, _)| *start);
        diagnostics.into_iter().map(|(_, d)| d).collect()
    }
}

/// Parse tokens into a program.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &TokenList, interner: &StringInterner) -> ParseOutput {
    Parser::new(tokens, interner).parse_program()
}

/// Lex and parse source text in one step.
pub fn parse_source(source: &str, interner: &StringInterner) -> ParseOutput {
    let lexed = ts2c_lexer::lex(source, interner);
    let mut output = parse(&lexed.tokens, interner);
    output.lex_errors = lexed.errors;
    output
}

#[cfg(test)]
mod tests;
