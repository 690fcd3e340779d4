//! The template interpreter.
//!
//! Every lowering rule is a value with a template and named fields. The
//! template language has four primitives:
//!
//! ```text
//! {field}                          substitution
//! {items {, }=> ({this})}          repetition with separator
//! {#if a && !b}..{#elseif c == "x"}..{#else}..{/if}
//! {#statements}..{/statements}     hoisting
//! ```
//!
//! Text produced inside `{#statements}` is not placed inline. It travels
//! upward with the result and is written before the statement that
//! (transitively) contains it.
//!
//! A `{` starts a directive only when followed by a letter, `_`, `#` or
//! `/`; C braces in templates stay literal. Lines left holding nothing but
//! directives or empty substitutions are dropped.

mod parse;

use std::borrow::Cow;

use parse::{Cond, Segment};

/// Placeholder for "something was here"; lines made only of markers and
/// whitespace are removed once a template is complete.
const MARK: char = '\u{1}';

/// Something with a template.
pub trait Renderable {
    fn template(&self) -> &str;
    fn field(&self, name: &str) -> Field<'_>;
}

/// A field value as seen by the interpreter.
pub enum Field<'a> {
    Empty,
    Text(Cow<'a, str>),
    Flag(bool),
    Node(&'a dyn Renderable),
    List(Vec<Field<'a>>),
    /// A statement list: each statement's hoisted text goes right before
    /// it instead of propagating further.
    Block(Vec<&'a dyn Renderable>),
}

impl Field<'_> {
    fn is_truthy(&self) -> bool {
        match self {
            Field::Empty => false,
            Field::Text(text) => !text.is_empty(),
            Field::Flag(flag) => *flag,
            Field::Node(_) => true,
            Field::List(items) => !items.is_empty(),
            Field::Block(items) => !items.is_empty(),
        }
    }

    /// Plain text of scalar fields, for `==` / `!=` conditions.
    fn plain_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Field::Text(text) => Some(Cow::Borrowed(text.as_ref())),
            Field::Flag(flag) => Some(Cow::Owned(flag.to_string())),
            Field::Empty => Some(Cow::Borrowed("")),
            _ => None,
        }
    }

    fn reborrow(&self) -> Field<'_> {
        match self {
            Field::Empty => Field::Empty,
            Field::Text(text) => Field::Text(Cow::Borrowed(text.as_ref())),
            Field::Flag(flag) => Field::Flag(*flag),
            Field::Node(node) => Field::Node(*node),
            Field::List(items) => Field::List(items.iter().map(Field::reborrow).collect()),
            Field::Block(items) => Field::Block(items.clone()),
        }
    }
}

/// Conversion of struct members into [`Field`]s.
pub trait ToField {
    fn to_field(&self) -> Field<'_>;
}

impl ToField for String {
    fn to_field(&self) -> Field<'_> {
        Field::Text(Cow::Borrowed(self.as_str()))
    }
}

impl ToField for &str {
    fn to_field(&self) -> Field<'_> {
        Field::Text(Cow::Borrowed(*self))
    }
}

impl ToField for bool {
    fn to_field(&self) -> Field<'_> {
        Field::Flag(*self)
    }
}

impl ToField for usize {
    fn to_field(&self) -> Field<'_> {
        Field::Text(Cow::Owned(self.to_string()))
    }
}

impl ToField for u32 {
    fn to_field(&self) -> Field<'_> {
        Field::Text(Cow::Owned(self.to_string()))
    }
}

impl ToField for Box<dyn Renderable> {
    fn to_field(&self) -> Field<'_> {
        Field::Node(self.as_ref())
    }
}

impl<T: ToField> ToField for Option<T> {
    fn to_field(&self) -> Field<'_> {
        match self {
            Some(value) => value.to_field(),
            None => Field::Empty,
        }
    }
}

impl<T: ToField> ToField for Vec<T> {
    fn to_field(&self) -> Field<'_> {
        Field::List(self.iter().map(ToField::to_field).collect())
    }
}

/// A list of lowered statements.
#[derive(Default)]
pub struct Block(pub Vec<Box<dyn Renderable>>);

impl Block {
    pub fn new() -> Self {
        Block(Vec::new())
    }

    pub fn push(&mut self, statement: Box<dyn Renderable>) {
        self.0.push(statement);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Box<dyn Renderable>> for Block {
    fn from_iter<I: IntoIterator<Item = Box<dyn Renderable>>>(iter: I) -> Self {
        Block(iter.into_iter().collect())
    }
}

impl ToField for Block {
    fn to_field(&self) -> Field<'_> {
        Field::Block(self.0.iter().map(AsRef::as_ref).collect())
    }
}

/// Declare a struct and implement [`Renderable`] for it.
///
/// ```ignore
/// renderable! {
///     pub struct Assignment = "{target} = {value}" {
///         pub target: String,
///         pub value: Box<dyn Renderable>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! renderable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident = $template:literal {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::Renderable for $name {
            fn template(&self) -> &str {
                $template
            }

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> $crate::Field<'_> {
                $(
                    if name == stringify!($field) {
                        return $crate::ToField::to_field(&self.$field);
                    }
                )*
                $crate::Field::Empty
            }
        }
    };
}

/// Result of rendering one value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub inline: String,
    /// Statements to place before the enclosing statement, in order.
    pub hoisted: Vec<String>,
}

impl Rendered {
    pub fn inline(text: impl Into<String>) -> Self {
        Rendered {
            inline: text.into(),
            hoisted: Vec::new(),
        }
    }

    /// Hoisted statements followed by the inline text, as one statement
    /// sequence.
    pub fn into_statements(self) -> String {
        let mut lines = self.hoisted;
        if !self.inline.trim().is_empty() {
            lines.push(self.inline);
        }
        lines.join("\n")
    }
}

/// Render a value and everything it refers to.
pub fn render(item: &dyn Renderable) -> Rendered {
    let segments = parse::parse(item.template());
    let scope = Scope { item, this: None };
    let mut out = Output::default();
    render_segments(&segments, &scope, &mut out);
    Rendered {
        inline: strip_marks(&out.text),
        hoisted: out.hoisted,
    }
}

/// Render a statement list.
pub fn render_block(statements: &[&dyn Renderable]) -> String {
    let mut lines = Vec::new();
    for statement in statements {
        let rendered = render(*statement);
        let text = rendered.into_statements();
        if !text.is_empty() {
            lines.push(text);
        }
    }
    lines.join("\n")
}

struct Scope<'s> {
    item: &'s dyn Renderable,
    this: Option<&'s Field<'s>>,
}

impl Scope<'_> {
    fn lookup(&self, name: &str) -> Field<'_> {
        if name == "this" {
            return self.this.map_or(Field::Empty, Field::reborrow);
        }
        self.item.field(name)
    }
}

#[derive(Default)]
struct Output {
    text: String,
    hoisted: Vec<String>,
}

fn render_segments(segments: &[Segment<'_>], scope: &Scope<'_>, out: &mut Output) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.text.push_str(text),
            Segment::Field(name) => {
                let value = field_text(&scope.lookup(name), &mut out.hoisted);
                insert(&mut out.text, &value);
            }
            Segment::Repeat {
                name,
                separator,
                inner,
            } => {
                let field = scope.lookup(name);
                let items: Vec<Field<'_>> = match field {
                    Field::List(items) => items,
                    Field::Block(items) => items.into_iter().map(Field::Node).collect(),
                    Field::Empty => Vec::new(),
                    single => vec![single],
                };
                let mut pieces = Vec::with_capacity(items.len());
                for item in &items {
                    let inner_scope = Scope {
                        item: scope.item,
                        this: Some(item),
                    };
                    let mut piece = Output::default();
                    render_segments(inner, &inner_scope, &mut piece);
                    out.hoisted.append(&mut piece.hoisted);
                    pieces.push(piece.text);
                }
                insert(&mut out.text, &pieces.join(separator));
            }
            Segment::If {
                branches,
                otherwise,
            } => {
                out.text.push(MARK);
                let chosen = branches
                    .iter()
                    .find(|(cond, _)| eval(cond, scope))
                    .map(|(_, body)| body)
                    .or(otherwise.as_ref());
                if let Some(body) = chosen {
                    render_segments(body, scope, out);
                }
                out.text.push(MARK);
            }
            Segment::Statements(body) => {
                let mut section = Output::default();
                render_segments(body, scope, &mut section);
                out.hoisted.append(&mut section.hoisted);
                let text = strip_marks(&section.text);
                let text = text.trim_matches('\n');
                if !text.trim().is_empty() {
                    out.hoisted.push(text.to_string());
                }
                out.text.push(MARK);
            }
        }
    }
}

fn field_text(field: &Field<'_>, hoisted: &mut Vec<String>) -> String {
    match field {
        Field::Empty => String::new(),
        Field::Text(text) => text.to_string(),
        Field::Flag(flag) => flag.to_string(),
        Field::Node(node) => {
            let mut rendered = render(*node);
            hoisted.append(&mut rendered.hoisted);
            rendered.inline
        }
        Field::List(items) => items
            .iter()
            .map(|item| field_text(item, hoisted))
            .collect::<Vec<_>>()
            .join("\n"),
        Field::Block(items) => render_block(items),
    }
}

fn eval(cond: &Cond<'_>, scope: &Scope<'_>) -> bool {
    match cond {
        Cond::Truthy(name) => scope.lookup(name).is_truthy(),
        Cond::Equals(name, text) => {
            let field = scope.lookup(name);
            field.plain_text().is_some_and(|value| value == *text)
        }
        Cond::NotEquals(name, text) => {
            let field = scope.lookup(name);
            !field.plain_text().is_some_and(|value| value == *text)
        }
        Cond::Not(inner) => !eval(inner, scope),
        Cond::All(parts) => parts.iter().all(|part| eval(part, scope)),
        Cond::Any(parts) => parts.iter().any(|part| eval(part, scope)),
    }
}

/// Append a substitution; continuation lines take the indentation of the
/// line the substitution lands on.
fn insert(out: &mut String, value: &str) {
    if value.is_empty() {
        out.push(MARK);
        return;
    }
    if !value.contains('\n') {
        out.push_str(value);
        return;
    }
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    let indent: String = out[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t' || *c == MARK)
        .filter(|c| *c != MARK)
        .collect();
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
}

fn strip_marks(text: &str) -> String {
    if !text.contains(MARK) {
        return text.to_string();
    }
    text.split('\n')
        .filter(|line| {
            !(line.contains(MARK) && line.chars().all(|c| c == MARK || c.is_whitespace()))
        })
        .map(|line| line.replace(MARK, ""))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests;
