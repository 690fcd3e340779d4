#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> (Vec<TokenKind>, StringInterner) {
    let interner = StringInterner::new();
    let output = lex(source, &interner);
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    (output.tokens.kinds(), interner)
}

#[test]
fn test_declaration() {
    let (tokens, interner) = kinds("let a = 42;");
    let a = interner.get("a").unwrap();
    let n = interner.get("42").unwrap();
    assert_eq!(
        tokens,
        vec![
            TokenKind::Let,
            TokenKind::Ident(a),
            TokenKind::Eq,
            TokenKind::Number(n),
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_longest_operator_wins() {
    let (tokens, _) = kinds("a === b !== c >>> 1 >>>= 2 => x");
    assert!(tokens.contains(&TokenKind::EqEqEq));
    assert!(tokens.contains(&TokenKind::NotEqEq));
    assert!(tokens.contains(&TokenKind::UShr));
    assert!(tokens.contains(&TokenKind::UShrEq));
    assert!(tokens.contains(&TokenKind::Arrow));
}

#[test]
fn test_number_forms_keep_raw_text() {
    let (tokens, interner) = kinds("1 4.5 .5 1e3 0xFF 2.");
    let raws: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            TokenKind::Number(n) => Some(interner.lookup(*n)),
            _ => None,
        })
        .collect();
    assert_eq!(raws, vec!["1", "4.5", ".5", "1e3", "0xFF", "2."]);
}

#[test]
fn test_parse_number() {
    assert_eq!(parse_number("42"), Some(42.0));
    assert_eq!(parse_number("0x10"), Some(16.0));
    assert_eq!(parse_number(".25"), Some(0.25));
    assert_eq!(parse_number("1e2"), Some(100.0));
    assert_eq!(parse_number("abc"), None);
}

#[test]
fn test_strings_are_unescaped() {
    let (tokens, interner) = kinds(r#"'it\'s' "a\tb""#);
    let strings: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            TokenKind::Str(n) => Some(interner.lookup(*n)),
            _ => None,
        })
        .collect();
    assert_eq!(strings, vec!["it's", "a\tb"]);
}

#[test]
fn test_keywords_and_identifiers() {
    let (tokens, interner) = kinds("function typeof_x $el of");
    assert_eq!(tokens[0], TokenKind::Function);
    assert_eq!(tokens[1], TokenKind::Ident(interner.get("typeof_x").unwrap()));
    assert_eq!(tokens[2], TokenKind::Ident(interner.get("$el").unwrap()));
    // `of` is contextual and stays an identifier.
    assert_eq!(tokens[3], TokenKind::Ident(interner.get("of").unwrap()));
}

#[test]
fn test_comments_and_newlines() {
    let interner = StringInterner::new();
    let output = lex("a // one\n/* two\nthree */ b /* same line */ c", &interner);
    let tokens = output.tokens.as_slice();
    assert_eq!(tokens.len(), 4);
    assert!(!tokens[0].newline_before);
    assert!(tokens[1].newline_before);
    assert!(!tokens[2].newline_before);
    assert_eq!(tokens[3].kind, TokenKind::Eof);
}

#[test]
fn test_block_comment_with_stars_and_slashes() {
    let (tokens, interner) = kinds("x /** a * b / c **/ = /**/ 1 / 2;");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident(interner.get("x").unwrap()),
            TokenKind::Eq,
            TokenKind::Number(interner.get("1").unwrap()),
            TokenKind::Slash,
            TokenKind::Number(interner.get("2").unwrap()),
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let interner = StringInterner::new();
    let output = lex("let a = 1; /* never closed\nlet b;", &interner);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, LexErrorKind::UnterminatedComment);
    assert_eq!(output.errors[0].span, Span::new(11, 33));
    assert_eq!(
        output.errors[0].to_diagnostic().code,
        ts2c_diagnostic::ErrorCode::E0004
    );
    // The rest of the input is inside the comment.
    assert_eq!(output.tokens.kinds().last(), Some(&TokenKind::Eof));
    assert!(!output.tokens.kinds()[1..].contains(&TokenKind::Let));
}

#[test]
fn test_unterminated_string() {
    let interner = StringInterner::new();
    let output = lex("let s = \"abc\nlet t;", &interner);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, LexErrorKind::UnterminatedString);
    assert_eq!(output.errors[0].span, Span::new(8, 12));
    let diag = output.errors[0].to_diagnostic();
    assert_eq!(diag.code, ts2c_diagnostic::ErrorCode::E0001);
    // Lexing continues on the next line.
    assert!(output.tokens.kinds().contains(&TokenKind::Let));
}

#[test]
fn test_invalid_character() {
    let interner = StringInterner::new();
    let output = lex("a # b", &interner);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, LexErrorKind::InvalidCharacter('#'));
    assert_eq!(output.tokens.kinds()[1], TokenKind::Error);
}

#[test]
fn test_eof_span_at_end() {
    let interner = StringInterner::new();
    let output = lex("x", &interner);
    let eof = output.tokens.as_slice().last().copied().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span, Span::new(1, 1));
}
