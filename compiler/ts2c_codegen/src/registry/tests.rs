#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;

struct Fixed {
    key: &'static str,
    text: &'static str,
    requires: Vec<&'static str>,
}

impl Header for Fixed {
    fn type_key(&self) -> &str {
        self.key
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        for key in &self.requires {
            cx.require(key);
        }
        self.text.to_string()
    }
}

fn fixed(key: &'static str, text: &'static str, requires: &[&'static str]) -> Rc<dyn Header> {
    Rc::new(Fixed {
        key,
        text,
        requires: requires.to_vec(),
    })
}

/// Declares an unregistered header while rendering.
struct Declaring;

impl Header for Declaring {
    fn type_key(&self) -> &str {
        "declaring"
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        cx.declare(fixed("struct_point", "struct point { int16_t x; };", &["stdint"]));
        "void use_point(struct point *p);".to_string()
    }
}

fn registry() -> HeaderRegistry {
    let mut registry = HeaderRegistry::default();
    registry.register(fixed("stdint", "#include <stdint.h>", &[]));
    registry.register(fixed("stdlib", "#include <stdlib.h>", &[]));
    registry.register(fixed("array", "#define ARRAY_CREATE", &["stdlib", "stdint"]));
    registry.register(Rc::new(Declaring));
    registry
}

#[test]
fn test_each_key_is_rendered_once() {
    let mut set = HeaderSet::new();
    set.require("stdint");
    set.require("array");
    set.require("stdint");
    let texts = set.resolve(&registry()).unwrap();
    assert_eq!(
        texts,
        vec![
            "#include <stdint.h>".to_string(),
            "#include <stdlib.h>".to_string(),
            "#define ARRAY_CREATE".to_string(),
        ]
    );
}

#[test]
fn test_dependencies_come_first() {
    let mut set = HeaderSet::new();
    set.require("array");
    let texts = set.resolve(&registry()).unwrap();
    assert_eq!(texts.last().unwrap(), "#define ARRAY_CREATE");
    assert_eq!(texts.len(), 3);
}

#[test]
fn test_headers_declared_while_rendering_are_emitted() {
    let mut set = HeaderSet::new();
    set.require("declaring");
    let texts = set.resolve(&registry()).unwrap();
    assert_eq!(
        texts,
        vec![
            "#include <stdint.h>".to_string(),
            "struct point { int16_t x; };".to_string(),
            "void use_point(struct point *p);".to_string(),
        ]
    );
}

#[test]
fn test_first_declared_instance_wins() {
    let mut set = HeaderSet::new();
    set.declare(fixed("custom", "first", &[]));
    set.declare(fixed("custom", "second", &[]));
    assert!(set.contains("custom"));
    let texts = set.resolve(&HeaderRegistry::default()).unwrap();
    assert_eq!(texts, vec!["first".to_string()]);
}

#[test]
fn test_later_registration_replaces_earlier() {
    let mut registry = registry();
    registry.register(fixed("stdint", "#include \"platform_int.h\"", &[]));
    let mut set = HeaderSet::new();
    set.require("stdint");
    let texts = set.resolve(&registry).unwrap();
    assert_eq!(texts, vec!["#include \"platform_int.h\"".to_string()]);
}

#[test]
fn test_missing_header_names_its_dependent() {
    let mut registry = HeaderRegistry::default();
    registry.register(fixed("timer", "void timer_init(void);", &["hal_timer"]));
    let mut set = HeaderSet::new();
    set.require("timer");
    let error = set.resolve(&registry).unwrap_err();
    assert_eq!(
        error,
        CodegenError::MissingHeader {
            key: "hal_timer".to_string(),
            required_by: Some("timer".to_string()),
        }
    );
    assert_eq!(
        error.to_diagnostic().code,
        ts2c_diagnostic::ErrorCode::E9001
    );
}

#[test]
fn test_missing_top_level_header() {
    let mut set = HeaderSet::new();
    set.require("nowhere");
    let error = set.resolve(&HeaderRegistry::default()).unwrap_err();
    assert!(matches!(
        error,
        CodegenError::MissingHeader { required_by: None, .. }
    ));
}

#[test]
fn test_empty_headers_are_skipped() {
    let mut registry = HeaderRegistry::default();
    registry.register(fixed("marker", "   ", &["stdint"]));
    registry.register(fixed("stdint", "#include <stdint.h>", &[]));
    let mut set = HeaderSet::new();
    set.require("marker");
    let texts = set.resolve(&registry).unwrap();
    assert_eq!(texts, vec!["#include <stdint.h>".to_string()]);
}
