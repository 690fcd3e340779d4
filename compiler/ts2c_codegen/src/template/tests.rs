#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

renderable! {
    struct Plain = "int main(void) {\n    return 0;\n}\n" {}
}

renderable! {
    struct Temp = "{#statements}{name} = malloc(4);{/statements}{name}" {
        name: String,
    }
}

renderable! {
    struct Assign = "{target} = {value};" {
        target: String,
        value: Box<dyn Renderable>,
    }
}

renderable! {
    struct Text = "{text}" {
        text: String,
    }
}

renderable! {
    struct Call = "{name}({args {, }=> {this}})" {
        name: String,
        args: Vec<String>,
    }
}

renderable! {
    struct Lines = "start\n{items {\n}=> item {this};}\nend" {
        items: Vec<String>,
    }
}

renderable! {
    struct Braced = "{items { }=> { {this} }}" {
        items: Vec<String>,
    }
}

renderable! {
    struct Choice = "a\n{#if kind == \"float\"}\nfloat\n{#elseif !flag && kind != \"int\"}\nother\n{#elseif flag || missing}\nflagged\n{#else}\nint\n{/if}\nb" {
        kind: String,
        flag: bool,
    }
}

renderable! {
    struct Braces = "if ({cond}) {\n    {body}\n}" {
        cond: String,
        body: Block,
    }
}

renderable! {
    struct Nested = "{#if inner}{inner}{/if}" {
        inner: Option<Box<dyn Renderable>>,
    }
}

fn text(s: &str) -> Box<dyn Renderable> {
    Box::new(Text { text: s.into() })
}

#[test]
fn test_identity_on_plain_text() {
    let rendered = render(&Plain {});
    assert_eq!(rendered.inline, "int main(void) {\n    return 0;\n}\n");
    assert!(rendered.hoisted.is_empty());
}

#[test]
fn test_field_substitution_is_not_reparsed() {
    let rendered = render(&Text {
        text: "printf(\"{x}\");".into(),
    });
    assert_eq!(rendered.inline, "printf(\"{x}\");");
}

#[test]
fn test_repeat_with_separator() {
    let call = Call {
        name: "f".into(),
        args: vec!["a".into(), "b".into(), "c".into()],
    };
    assert_eq!(render(&call).inline, "f(a, b, c)");
}

#[test]
fn test_empty_repeat_leaves_no_blank_line() {
    let lines = Lines { items: Vec::new() };
    assert_eq!(render(&lines).inline, "start\nend");

    let lines = Lines {
        items: vec!["x".into(), "y".into()],
    };
    assert_eq!(render(&lines).inline, "start\nitem x;\nitem y;\nend");
}

#[test]
fn test_repeat_inner_keeps_literal_braces() {
    let braced = Braced {
        items: vec!["1".into(), "2".into()],
    };
    assert_eq!(render(&braced).inline, "{ 1 } { 2 }");
}

#[test]
fn test_conditions() {
    let case = |kind: &str, flag: bool| {
        render(&Choice {
            kind: kind.into(),
            flag,
        })
        .inline
    };
    assert_eq!(case("float", false), "a\nfloat\nb");
    assert_eq!(case("str", false), "a\nother\nb");
    assert_eq!(case("str", true), "a\nflagged\nb");
    assert_eq!(case("int", false), "a\nint\nb");
}

#[test]
fn test_false_section_vanishes() {
    let nested = Nested { inner: None };
    assert_eq!(render(&nested).inline, "");
    let nested = Nested {
        inner: Some(text("x")),
    };
    assert_eq!(render(&nested).inline, "x");
}

#[test]
fn test_statements_are_hoisted() {
    let assign = Assign {
        target: "x".into(),
        value: Box::new(Temp { name: "tmp".into() }),
    };
    let rendered = render(&assign);
    assert_eq!(rendered.inline, "x = tmp;");
    assert_eq!(rendered.hoisted, vec!["tmp = malloc(4);".to_string()]);
}

#[test]
fn test_block_places_hoisted_text_before_statement() {
    let mut body = Block::new();
    body.push(text("a();"));
    body.push(Box::new(Assign {
        target: "x".into(),
        value: Box::new(Temp { name: "tmp".into() }),
    }));
    let braces = Braces {
        cond: "y".into(),
        body,
    };
    let rendered = render(&braces);
    assert_eq!(
        rendered.inline,
        "if (y) {\n    a();\n    tmp = malloc(4);\n    x = tmp;\n}"
    );
    assert!(rendered.hoisted.is_empty());
}

#[test]
fn test_empty_block_removes_its_line() {
    let braces = Braces {
        cond: "y".into(),
        body: Block::new(),
    };
    assert_eq!(render(&braces).inline, "if (y) {\n}");
}

#[test]
fn test_multiline_substitution_is_indented() {
    let mut body = Block::new();
    body.push(text("while (1) {\n    step();\n}"));
    let braces = Braces {
        cond: "go".into(),
        body,
    };
    assert_eq!(
        render(&braces).inline,
        "if (go) {\n    while (1) {\n        step();\n    }\n}"
    );
}

#[test]
fn test_rendering_is_idempotent() {
    let call = Call {
        name: "g".into(),
        args: vec!["1".into()],
    };
    assert_eq!(render(&call), render(&call));
}

#[test]
fn test_parse_keeps_c_braces_literal() {
    let segments = parse::parse("{ x } {}\n{\n");
    assert_eq!(segments, vec![parse::Segment::Text("{ x } {}\n{\n")]);
}

struct Raw(String);

impl Renderable for Raw {
    fn template(&self) -> &str {
        &self.0
    }

    fn field(&self, _: &str) -> Field<'_> {
        Field::Empty
    }
}

proptest! {
    #[test]
    fn prop_placeholder_free_text_is_identity(text in "[a-z0-9 ;()=+*/\n\t}-]*") {
        let rendered = render(&Raw(text.clone()));
        prop_assert_eq!(rendered.inline, text);
        prop_assert!(rendered.hoisted.is_empty());
    }

    #[test]
    fn prop_literal_braces_are_identity(body in "[a-z ;\n]*") {
        let text = format!("{{ {body} }}\n{{\n}}");
        let rendered = render(&Raw(text.clone()));
        prop_assert_eq!(rendered.inline, text);
    }
}
