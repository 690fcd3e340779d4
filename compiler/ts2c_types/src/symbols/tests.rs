#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_ir::{Ast, NodeId, NodeKind, StringInterner};

use super::*;

fn build(source: &str) -> (Ast, StringInterner, SymbolTable) {
    let interner = StringInterner::new();
    let output = ts2c_parse::parse_source(source, &interner);
    assert!(!output.has_errors(), "{:?}", output.diagnostics());
    let symbols = SymbolTable::build(&output.ast, &interner);
    (output.ast, interner, symbols)
}

fn idents_named(ast: &Ast, interner: &StringInterner, name: &str) -> Vec<NodeId> {
    ast.ids()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Ident { name: n } if interner.lookup(*n) == name))
        .collect()
}

fn c_names(symbols: &SymbolTable) -> Vec<String> {
    symbols.vars().map(|(_, v)| v.c_name.clone()).collect()
}

#[test]
fn test_var_is_hoisted_let_is_block_scoped() {
    let (ast, interner, symbols) = build(
        "function f() {\n\
           if (true) { var a = 1; let b = 2; }\n\
           return a + b;\n\
         }",
    );
    let a_refs = idents_named(&ast, &interner, "a");
    let b_refs = idents_named(&ast, &interner, "b");
    assert!(symbols.resolve(a_refs[0]).is_some());
    assert!(symbols.resolve(b_refs[0]).is_none());
    assert_eq!(symbols.unresolved(), &[b_refs[0]][..]);
}

#[test]
fn test_shadowing_resolves_innermost() {
    let (ast, interner, symbols) = build("let x = 1;\n{ let x = \"s\"; x; }\nx;");
    let refs = idents_named(&ast, &interner, "x");
    let inner = symbols.resolve(refs[0]).unwrap();
    let outer = symbols.resolve(refs[1]).unwrap();
    assert_ne!(inner, outer);
    assert_eq!(symbols.var(outer).c_name, "x");
    assert_eq!(symbols.var(inner).c_name, "x_2");
}

#[test]
fn test_params_and_functions() {
    let (ast, interner, symbols) = build("function add(a, b) { return a + b; }\nadd(1, 2);");
    let add_ref = idents_named(&ast, &interner, "add")[0];
    let add = symbols.resolve(add_ref).unwrap();
    assert!(symbols.var(add).is_function());
    assert!(!symbols.var(add).is_global());

    let function = symbols.var(add).declaration;
    let params = symbols.params_of(&ast, function);
    assert_eq!(params.len(), 2);
    assert!(symbols.var(params[0]).is_param());
    assert_eq!(symbols.var(params[0]).function, Some(function));
    assert_eq!(symbols.called_function(&ast, add_ref), Some(add));
}

#[test]
fn test_c_names_avoid_keywords_and_globals() {
    let (_, _, symbols) = build(
        "let int = 1;\nlet x = 2;\n\
         function f() { let x = 3; let main = 4; }\n\
         function g() { let x = 5; }",
    );
    assert_eq!(
        c_names(&symbols),
        vec!["int_2", "x", "f", "x_2", "main_2", "g", "x_2"]
    );
}

#[test]
fn test_loop_bindings_have_own_scope() {
    let (ast, interner, symbols) = build("for (let i = 0; i < 2; i++) {}\nfor (let i of [1]) { i; }");
    let refs = idents_named(&ast, &interner, "i");
    let first = symbols.resolve(refs[0]).unwrap();
    let last = symbols.resolve(*refs.last().unwrap()).unwrap();
    assert_ne!(first, last);
    assert!(symbols.var(first).is_global());
}

#[test]
fn test_dollar_is_sanitized() {
    let (_, _, symbols) = build("let $el = 1;");
    assert_eq!(c_names(&symbols), vec!["_el"]);
}
