//! Template parsing.
//!
//! Parsing never fails: anything that does not form a directive is
//! literal text, and an unterminated section runs to the end of the
//! template.

#[derive(Debug, PartialEq)]
pub(super) enum Segment<'t> {
    Text(&'t str),
    Field(&'t str),
    Repeat {
        name: &'t str,
        separator: &'t str,
        inner: Vec<Segment<'t>>,
    },
    If {
        branches: Vec<(Cond<'t>, Vec<Segment<'t>>)>,
        otherwise: Option<Vec<Segment<'t>>>,
    },
    Statements(Vec<Segment<'t>>),
}

#[derive(Debug, PartialEq)]
pub(super) enum Cond<'t> {
    Truthy(&'t str),
    Equals(&'t str, &'t str),
    NotEquals(&'t str, &'t str),
    Not(Box<Cond<'t>>),
    All(Vec<Cond<'t>>),
    Any(Vec<Cond<'t>>),
}

/// What ended a segment sequence.
enum Stop<'t> {
    End,
    ElseIf(Cond<'t>),
    Else,
    EndIf,
    EndStatements,
    /// The `}` closing a repeat's inner template.
    Close,
}

pub(super) fn parse(template: &str) -> Vec<Segment<'_>> {
    let mut parser = Parser {
        src: template,
        pos: 0,
    };
    let mut segments = Vec::new();
    loop {
        let (mut part, stop) = parser.sequence(false);
        segments.append(&mut part);
        match stop {
            Stop::End => return segments,
            // Stray closers are dropped.
            Stop::ElseIf(_) | Stop::Else | Stop::EndIf | Stop::EndStatements | Stop::Close => {}
        }
    }
}

struct Parser<'t> {
    src: &'t str,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn rest(&self) -> &'t str {
        &self.src[self.pos..]
    }

    /// Parse until a closer. Inside a repeat, an unbalanced `}` closes it.
    fn sequence(&mut self, in_repeat: bool) -> (Vec<Segment<'t>>, Stop<'t>) {
        let mut segments = Vec::new();
        let mut text_start = self.pos;
        let mut depth = 0usize;

        while self.pos < self.src.len() {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                break;
            };

            if c == '}' && in_repeat {
                if depth == 0 {
                    push_text(&mut segments, &self.src[text_start..self.pos]);
                    self.pos += 1;
                    return (segments, Stop::Close);
                }
                depth -= 1;
                self.pos += 1;
                continue;
            }

            if c != '{' {
                self.pos += c.len_utf8();
                continue;
            }

            let directive_start = self.pos;
            match self.directive() {
                Some(Directive::Segment(segment)) => {
                    push_text(&mut segments, &self.src[text_start..directive_start]);
                    segments.push(segment);
                    text_start = self.pos;
                }
                Some(Directive::Stop(stop)) => {
                    push_text(&mut segments, &self.src[text_start..directive_start]);
                    return (segments, stop);
                }
                None => {
                    self.pos = directive_start + 1;
                    if in_repeat {
                        depth += 1;
                    }
                }
            }
        }

        push_text(&mut segments, &self.src[text_start..]);
        (segments, Stop::End)
    }

    /// Parse a directive at `{`. On `None` the brace is literal text and
    /// the position is unspecified.
    fn directive(&mut self) -> Option<Directive<'t>> {
        let after = &self.rest()[1..];
        let first = after.chars().next()?;

        if first == '#' || first == '/' {
            let close = after.find('}')?;
            let body = &after[..close];
            self.pos += 1 + close + 1;
            return self.keyword(body);
        }

        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        let tail = &after[name_len..];

        if tail.starts_with('}') {
            self.pos += 1 + name_len + 1;
            return Some(Directive::Segment(Segment::Field(name)));
        }

        // `{name {SEP}=> inner}`
        let sep_body = tail.strip_prefix(" {")?;
        let sep_len = sep_body.find("}=>")?;
        let separator = &sep_body[..sep_len];
        self.pos += 1 + name_len + 2 + sep_len + 3;
        if self.rest().starts_with(' ') {
            self.pos += 1;
        }
        let (inner, _) = self.sequence(true);
        Some(Directive::Segment(Segment::Repeat {
            name,
            separator,
            inner,
        }))
    }

    fn keyword(&mut self, body: &'t str) -> Option<Directive<'t>> {
        if let Some(cond) = body.strip_prefix("#if ") {
            return Some(Directive::Segment(self.if_chain(parse_cond(cond))));
        }
        if let Some(cond) = body.strip_prefix("#elseif ") {
            return Some(Directive::Stop(Stop::ElseIf(parse_cond(cond))));
        }
        match body.trim() {
            "#else" => Some(Directive::Stop(Stop::Else)),
            "/if" => Some(Directive::Stop(Stop::EndIf)),
            "/statements" => Some(Directive::Stop(Stop::EndStatements)),
            "#statements" => {
                let (inner, _) = self.sequence(false);
                Some(Directive::Segment(Segment::Statements(inner)))
            }
            _ => None,
        }
    }

    fn if_chain(&mut self, first: Cond<'t>) -> Segment<'t> {
        let mut branches = Vec::new();
        let mut cond = first;
        loop {
            let (body, stop) = self.sequence(false);
            branches.push((cond, body));
            match stop {
                Stop::ElseIf(next) => cond = next,
                Stop::Else => {
                    let (otherwise, _) = self.sequence(false);
                    return Segment::If {
                        branches,
                        otherwise: Some(otherwise),
                    };
                }
                Stop::EndIf | Stop::End | Stop::EndStatements | Stop::Close => {
                    return Segment::If {
                        branches,
                        otherwise: None,
                    };
                }
            }
        }
    }
}

enum Directive<'t> {
    Segment(Segment<'t>),
    Stop(Stop<'t>),
}

fn push_text<'t>(segments: &mut Vec<Segment<'t>>, text: &'t str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

/// `a || b && !c == "x"`: `||` binds loosest.
fn parse_cond(src: &str) -> Cond<'_> {
    let any: Vec<Cond<'_>> = src.split("||").map(parse_all).collect();
    collapse(any, Cond::Any)
}

fn parse_all(src: &str) -> Cond<'_> {
    let all: Vec<Cond<'_>> = src.split("&&").map(parse_atom).collect();
    collapse(all, Cond::All)
}

fn collapse<'t>(mut parts: Vec<Cond<'t>>, wrap: fn(Vec<Cond<'t>>) -> Cond<'t>) -> Cond<'t> {
    if parts.len() == 1 {
        if let Some(only) = parts.pop() {
            return only;
        }
    }
    wrap(parts)
}

fn parse_atom(src: &str) -> Cond<'_> {
    let src = src.trim();
    if let Some(inner) = src.strip_prefix('!') {
        if !inner.starts_with('=') {
            return Cond::Not(Box::new(parse_atom(inner)));
        }
    }
    if let Some((name, text)) = src.split_once("==") {
        if let Some(name) = name.strip_suffix('!') {
            return Cond::NotEquals(name.trim(), unquote(text));
        }
        return Cond::Equals(name.trim(), unquote(text));
    }
    if let Some((name, text)) = src.split_once("!=") {
        return Cond::NotEquals(name.trim(), unquote(text));
    }
    Cond::Truthy(src)
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
