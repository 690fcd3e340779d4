//! Lexer errors.

use ts2c_diagnostic::{Diagnostic, ErrorCode};
use ts2c_ir::Span;

/// A lexer error: where and what.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    /// Missing closing quote before end of line.
    UnterminatedString,
    /// Character that starts no token.
    InvalidCharacter(char),
    /// Numeric literal whose value cannot be represented.
    InvalidNumber,
    /// `/*` with no closing `*/`.
    UnterminatedComment,
}

impl LexError {
    pub fn new(span: Span, kind: LexErrorKind) -> Self {
        LexError { span, kind }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match &self.kind {
            LexErrorKind::UnterminatedString => Diagnostic::error(ErrorCode::E0001)
                .with_message("unterminated string literal")
                .with_label(self.span, "string starts here")
                .with_note("strings cannot span lines"),
            LexErrorKind::InvalidCharacter(c) => Diagnostic::error(ErrorCode::E0002)
                .with_message(format!("invalid character `{}`", c.escape_default()))
                .with_label(self.span, "not valid here"),
            LexErrorKind::InvalidNumber => Diagnostic::error(ErrorCode::E0003)
                .with_message("invalid number literal")
                .with_label(self.span, "cannot be represented"),
            LexErrorKind::UnterminatedComment => Diagnostic::error(ErrorCode::E0004)
                .with_message("unterminated block comment")
                .with_label(self.span, "comment starts here"),
        }
    }
}
