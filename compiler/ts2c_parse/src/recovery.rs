//! Error recovery for the parser.

use ts2c_lexer::TokenKind;

use crate::cursor::Cursor;

/// Tokens that begin a statement; recovery stops in front of them.
fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Return
            | TokenKind::If
            | TokenKind::While
            | TokenKind::Do
            | TokenKind::For
            | TokenKind::Break
            | TokenKind::Continue
    )
}

/// Skip to the start of the next statement.
///
/// Consumes a terminating `;`; stops before `}`, a statement keyword, or the
/// first token on a new line once at least one token was skipped.
pub(crate) fn synchronize(cursor: &mut Cursor<'_>) {
    let start = cursor.position();
    loop {
        let token = cursor.current();
        match token.kind {
            TokenKind::Eof | TokenKind::RBrace => return,
            TokenKind::Semi => {
                cursor.advance();
                return;
            }
            kind if cursor.position() > start
                && (starts_statement(kind) || token.newline_before) =>
            {
                return;
            }
            _ => {
                cursor.advance();
            }
        }
    }
}
