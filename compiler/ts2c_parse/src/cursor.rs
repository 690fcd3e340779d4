//! Token cursor for navigating the token stream.

use std::mem::discriminant;

use ts2c_diagnostic::ErrorCode;
use ts2c_ir::{Name, Span, StringInterner};
use ts2c_lexer::{Token, TokenKind, TokenList};

use crate::ParseError;

/// Cursor over a [`TokenList`].
///
/// The list always ends in `Eof`, and the cursor never moves past it.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        Cursor {
            tokens: tokens.as_slice(),
            interner,
            pos: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// Current position, used for progress checks during recovery.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.peek(0)
    }

    /// Token `n` ahead of the current one, clamped to `Eof`.
    pub fn peek(&self, n: usize) -> Token {
        let eof = Token::new(TokenKind::Eof, Span::DUMMY, true);
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(eof)
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens.get(self.pos - 1).map_or(Span::DUMMY, |t| t.span)
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// A line break precedes the current token.
    #[inline]
    pub fn newline_before(&self) -> bool {
        self.current().newline_before
    }

    /// Compare token kinds, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        discriminant(&self.current_kind()) == discriminant(kind)
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Identifier with a specific spelling (`of`, `as`, `type`, ...).
    pub fn check_contextual(&self, word: &str) -> bool {
        match self.current_kind() {
            TokenKind::Ident(name) => self.interner.lookup(name) == word,
            _ => false,
        }
    }

    pub fn peek_is(&self, n: usize, kind: &TokenKind) -> bool {
        discriminant(&self.peek(n).kind) == discriminant(kind)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let code = if matches!(self.current_kind(), TokenKind::Eof)
                && matches!(kind, TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket)
            {
                ErrorCode::E1003
            } else {
                ErrorCode::E1001
            };
            Err(ParseError::new(
                code,
                format!(
                    "expected {}, found {}",
                    kind.display_name(),
                    self.current_kind().display_name()
                ),
                self.current_span(),
            ))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            other => Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected identifier, found {}", other.display_name()),
                self.current_span(),
            )),
        }
    }

    /// Property name after `.` or as an object key; keywords are allowed.
    pub fn expect_property_name(&mut self) -> Result<(Name, Span), ParseError> {
        let kind = self.current_kind();
        let name = match kind {
            TokenKind::Ident(name) | TokenKind::Str(name) | TokenKind::Number(name) => Some(name),
            other => keyword_text(other).map(|text| self.interner.intern(text)),
        };
        match name {
            Some(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            None => Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected property name, found {}", kind.display_name()),
                self.current_span(),
            )),
        }
    }
}

/// Spelling of a keyword token, for keywords used as property names.
fn keyword_text(kind: TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::Var => "var",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::For => "for",
        TokenKind::In => "in",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Undefined => "undefined",
        TokenKind::Typeof => "typeof",
        _ => return None,
    };
    Some(text)
}
