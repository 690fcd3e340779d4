//! Escape Sequence Processing
//!
//! Recognized escapes: `\n`, `\r`, `\t`, `\b`, `\f`, `\v`, `\0`, `\\`,
//! `\"`, `\'`, `\xHH`, `\uHHHH`. Unknown escapes drop the backslash, the
//! way the source language treats them.

#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

fn take_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let lookahead = chars.clone();
    let hex: String = lookahead.take(digits).collect();
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(&hex, 16).ok()?;
    let c = char::from_u32(value)?;
    for _ in 0..digits {
        chars.next();
    }
    Some(c)
}

/// Process string escape sequences of a literal body (quotes removed).
pub(crate) fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('x') => match take_hex(&mut chars, 2) {
                Some(decoded) => result.push(decoded),
                None => result.push('x'),
            },
            Some('u') => match take_hex(&mut chars, 4) {
                Some(decoded) => result.push(decoded),
                None => result.push('u'),
            },
            Some(esc) => result.push(resolve_escape(esc).unwrap_or(esc)),
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape_string(r"a\nb"), "a\nb");
        assert_eq!(unescape_string(r"tab\there"), "tab\there");
        assert_eq!(unescape_string(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape_string(r"it\'s"), "it's");
        assert_eq!(unescape_string(r"back\\slash"), "back\\slash");
    }

    #[test]
    fn test_hex_and_unicode_escapes() {
        assert_eq!(unescape_string(r"\x41"), "A");
        assert_eq!(unescape_string(r"\u0042"), "B");
        assert_eq!(unescape_string(r"\xZZ"), "xZZ");
    }

    #[test]
    fn test_unknown_escape_drops_backslash() {
        assert_eq!(unescape_string(r"\q"), "q");
        assert_eq!(unescape_string("trailing\\"), "trailing\\");
    }
}
