//! Lexer for the ts2c source subset, using logos with string interning.
//!
//! Whitespace and comments are dropped; line breaks are folded into the
//! `newline_before` flag of the following token so the parser can insert
//! semicolons automatically.

mod escape;
mod lex_error;
mod raw_token;
mod token;

use logos::Logos;
use ts2c_ir::{Span, StringInterner};

pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind, TokenList};

use escape::unescape_string;
use raw_token::RawToken;

/// Result of lexing one source file.
#[derive(Clone, Debug, Default)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
}

/// Lex source code into a [`TokenList`].
pub fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    let mut output = LexOutput::default();
    let mut logos = RawToken::lexer(source);
    let mut newline_before = false;

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let kind = match token_result {
            Ok(RawToken::LineComment) => continue,
            Ok(RawToken::BlockComment) => {
                newline_before |= slice.contains('\n');
                continue;
            }
            Ok(RawToken::Newline) => {
                newline_before = true;
                continue;
            }
            Ok(RawToken::UnterminatedString) => {
                output
                    .errors
                    .push(LexError::new(span, LexErrorKind::UnterminatedString));
                // Keep the contents so later phases see a string.
                let body = slice.get(1..).unwrap_or("");
                TokenKind::Str(interner.intern(&unescape_string(body)))
            }
            Ok(raw) => match convert_token(raw, slice, interner) {
                Some(kind) => kind,
                None => {
                    output
                        .errors
                        .push(LexError::new(span, LexErrorKind::InvalidNumber));
                    TokenKind::Error
                }
            },
            Err(()) if slice.starts_with("/*") => {
                output
                    .errors
                    .push(LexError::new(span, LexErrorKind::UnterminatedComment));
                continue;
            }
            Err(()) => {
                let c = slice.chars().next().unwrap_or('\0');
                output
                    .errors
                    .push(LexError::new(span, LexErrorKind::InvalidCharacter(c)));
                TokenKind::Error
            }
        };

        output.tokens.push(Token::new(kind, span, newline_before));
        newline_before = false;
    }

    let eof = u32::try_from(source.len()).unwrap_or(u32::MAX);
    output
        .tokens
        .push(Token::new(TokenKind::Eof, Span::new(eof, eof), true));
    output
}

/// Numeric value of a literal as written in source.
///
/// Accepts decimal, fractional, exponent and hex forms.
pub fn parse_number(raw: &str) -> Option<f64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        #[allow(clippy::cast_precision_loss)]
        return u64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    let value: f64 = raw.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Convert a raw token to a [`TokenKind`], interning text.
///
/// Returns `None` for numeric literals that do not fit.
fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> Option<TokenKind> {
    let kind = match raw {
        RawToken::Number | RawToken::HexNumber => {
            parse_number(slice)?;
            TokenKind::Number(interner.intern(slice))
        }
        RawToken::String => {
            let body = slice.get(1..slice.len().saturating_sub(1)).unwrap_or("");
            TokenKind::Str(interner.intern(&unescape_string(body)))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::Var => TokenKind::Var,
        RawToken::Let => TokenKind::Let,
        RawToken::Const => TokenKind::Const,
        RawToken::Function => TokenKind::Function,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Undefined => TokenKind::Undefined,
        RawToken::Typeof => TokenKind::Typeof,

        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::ShlEq => TokenKind::ShlEq,
        RawToken::ShrEq => TokenKind::ShrEq,
        RawToken::UShrEq => TokenKind::UShrEq,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::UShr => TokenKind::UShr,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,

        // Trivia and error tokens are handled by the caller.
        RawToken::LineComment
        | RawToken::BlockComment
        | RawToken::Newline
        | RawToken::UnterminatedString => TokenKind::Error,
    };
    Some(kind)
}

#[cfg(test)]
mod tests;
