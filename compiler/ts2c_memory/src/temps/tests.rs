#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_ir::{Ast, NodeId, NodeKind, StringInterner};
use ts2c_types::SymbolTable;

use super::*;

fn parse(source: &str) -> (StringInterner, Ast) {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(source, &interner);
    assert!(!parsed.has_errors());
    (interner, parsed.ast)
}

fn functions(ast: &Ast) -> Vec<NodeId> {
    ast.ids()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Function { .. }))
        .collect()
}

#[test]
fn test_names_are_unique_and_avoid_taken() {
    let (_, ast) = parse("1;");
    let mut tracker = TempTracker::new(["tmp"]);
    let ids: Vec<NodeId> = ast.ids().collect();
    assert_eq!(tracker.track(ids[0], "tmp", NativeType::STR, ast.root()).name, "tmp_2");
    assert_eq!(tracker.track(ids[1], "tmp", NativeType::STR, ast.root()).name, "tmp_3");
    // Tracking again keeps the first name.
    assert_eq!(tracker.track(ids[0], "other", NativeType::STR, ast.root()).name, "tmp_2");
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_promote_widens_outward_only() {
    let (_, ast) = parse("function f() { if (true) { 1; } }");
    let f = functions(&ast)[0];
    let block = ast
        .ids()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Block { .. }))
        .find(|&id| ast.parent(id) != Some(f))
        .unwrap();

    let mut tracker = TempTracker::default();
    tracker.track(block, "t", NativeType::STR, block);
    tracker.promote(&ast, block, f, false);
    assert_eq!(tracker.get(block).unwrap().escape_node, f);

    // An inner scope never narrows it again.
    tracker.promote(&ast, block, block, false);
    assert_eq!(tracker.get(block).unwrap().escape_node, f);
    assert!(!tracker.get(block).unwrap().dispose_later);
}

#[test]
fn test_unrelated_scopes_promote_to_root() {
    let (_, ast) = parse("function f() {}\nfunction g() {}");
    let fs = functions(&ast);
    let mut tracker = TempTracker::default();
    tracker.track(fs[0], "t", NativeType::STR, fs[0]);
    tracker.promote(&ast, fs[0], fs[1], true);
    let temp = tracker.get(fs[0]).unwrap();
    assert_eq!(temp.escape_node, ast.root());
    assert_eq!(temp.scope_node, fs[0]);
    assert!(temp.dispose_later);
}

#[test]
fn test_resolve_follows_parens_and_variables() {
    let (interner, ast) = parse("let a = (\"x\" + 1);\nlet b = a;\nconsole.log(b);");
    let symbols = SymbolTable::build(&ast, &interner);
    let concat = ast
        .ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::Binary { .. }))
        .unwrap();
    let mut tracker = TempTracker::default();
    tracker.track(concat, "tmp_string", NativeType::STR, ast.root());

    let last_b = ast
        .ids()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Ident { name } if interner.lookup(*name) == "b"))
        .last()
        .unwrap();
    assert_eq!(tracker.resolve(&ast, &symbols, last_b).unwrap().name, "tmp_string");

    let console = ast
        .ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::Ident { name } if interner.lookup(*name) == "console"))
        .unwrap();
    assert!(tracker.resolve(&ast, &symbols, console).is_none());
}
