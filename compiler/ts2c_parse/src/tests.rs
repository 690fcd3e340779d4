#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_diagnostic::ErrorCode;
use ts2c_ir::{Ast, BinaryOp, DeclKind, NodeId, NodeKind, SyntaxKind, UpdateOp};

use super::*;

fn parse_ok(source: &str) -> (Ast, StringInterner) {
    let interner = StringInterner::new();
    let output = parse_source(source, &interner);
    assert!(
        !output.has_errors(),
        "unexpected errors: {:?}",
        output.diagnostics()
    );
    (output.ast, interner)
}

fn body(ast: &Ast) -> Vec<NodeId> {
    match ast.kind(ast.root()) {
        NodeKind::Program { body } => body.clone(),
        other => panic!("root is not a program: {other:?}"),
    }
}

fn stmt_expr(ast: &Ast, stmt: NodeId) -> NodeId {
    match ast.kind(stmt) {
        NodeKind::ExprStmt { expr } => *expr,
        other => panic!("not an expression statement: {other:?}"),
    }
}

#[test]
fn test_declaration_with_multiple_declarators() {
    let (ast, interner) = parse_ok("const a = 45.97, b = 4.32;");
    let stmts = body(&ast);
    assert_eq!(stmts.len(), 1);
    let NodeKind::VarDecl { kind, declarators } = ast.kind(stmts[0]) else {
        panic!("expected declaration");
    };
    assert_eq!(*kind, DeclKind::Const);
    assert_eq!(declarators.len(), 2);
    let NodeKind::Declarator { name, init } = ast.kind(declarators[1]) else {
        panic!("expected declarator");
    };
    assert_eq!(interner.lookup(*name), "b");
    let NodeKind::Number { value, raw } = ast.kind(init.unwrap()) else {
        panic!("expected number");
    };
    assert!((value - 4.32).abs() < f64::EPSILON);
    assert_eq!(interner.lookup(*raw), "4.32");
}

#[test]
fn test_precedence() {
    let (ast, _) = parse_ok("x = 1 + 2 * 3 == 7 && y;");
    let expr = stmt_expr(&ast, body(&ast)[0]);
    let NodeKind::Assign { op: None, value, .. } = ast.kind(expr) else {
        panic!("expected assignment");
    };
    let NodeKind::Binary { op, left, .. } = ast.kind(*value) else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::And);
    let NodeKind::Binary { op, left, .. } = ast.kind(*left) else {
        panic!("expected equality");
    };
    assert_eq!(*op, BinaryOp::Eq);
    let NodeKind::Binary { op, right, .. } = ast.kind(*left) else {
        panic!("expected addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        ast.kind(*right),
        NodeKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_assignment_is_right_associative() {
    let (ast, _) = parse_ok("a = b += 2");
    let expr = stmt_expr(&ast, body(&ast)[0]);
    let NodeKind::Assign { op: None, value, .. } = ast.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        ast.kind(*value),
        NodeKind::Assign {
            op: Some(BinaryOp::Add),
            ..
        }
    ));
}

#[test]
fn test_automatic_semicolons() {
    let (ast, _) = parse_ok("let a = 1\nlet b = a\na++\n--b");
    let stmts = body(&ast);
    assert_eq!(stmts.len(), 4);
    let update = stmt_expr(&ast, stmts[2]);
    assert!(matches!(
        ast.kind(update),
        NodeKind::Update {
            op: UpdateOp::Increment,
            prefix: false,
            ..
        }
    ));
    let update = stmt_expr(&ast, stmts[3]);
    assert!(matches!(
        ast.kind(update),
        NodeKind::Update {
            op: UpdateOp::Decrement,
            prefix: true,
            ..
        }
    ));
}

#[test]
fn test_method_call_chain() {
    let (ast, interner) = parse_ok("console.log(a.push(2), s[0]);");
    let call = stmt_expr(&ast, body(&ast)[0]);
    let NodeKind::Call { callee, args } = ast.kind(call) else {
        panic!("expected call");
    };
    let NodeKind::Member { property, .. } = ast.kind(*callee) else {
        panic!("expected member callee");
    };
    assert_eq!(interner.lookup(*property), "log");
    assert_eq!(args.len(), 2);
    assert_eq!(ast.syntax_kind(args[0]), SyntaxKind::Call);
    assert_eq!(ast.syntax_kind(args[1]), SyntaxKind::Index);
}

#[test]
fn test_object_literal_keys() {
    let (ast, interner) = parse_ok("const o = { hello: \"World\", 'k': 1, n, };");
    let decl = body(&ast)[0];
    let object = ast
        .descendants(decl)
        .into_iter()
        .find(|&id| ast.syntax_kind(id) == SyntaxKind::Object)
        .unwrap();
    let NodeKind::Object { properties } = ast.kind(object) else {
        panic!("expected object");
    };
    let keys: Vec<&str> = properties
        .iter()
        .map(|&p| match ast.kind(p) {
            NodeKind::Property { key, .. } => interner.lookup(*key),
            _ => "",
        })
        .collect();
    assert_eq!(keys, vec!["hello", "k", "n"]);
}

#[test]
fn test_function_with_annotations() {
    let source = "function add(a: number, b?: number): number { return a + b; }\n\
                  let xs: Array<Array<number>> = [];\n\
                  let m: { [k: string]: number } | null = null;\n\
                  let t = (x as number) + 1;";
    let (ast, interner) = parse_ok(source);
    let stmts = body(&ast);
    assert_eq!(stmts.len(), 4);
    let NodeKind::Function { name, params, body: fn_body } = ast.kind(stmts[0]) else {
        panic!("expected function");
    };
    assert_eq!(interner.lookup(*name), "add");
    assert_eq!(params.len(), 2);
    assert_eq!(ast.syntax_kind(*fn_body), SyntaxKind::Block);
}

#[test]
fn test_for_forms() {
    let (ast, _) = parse_ok(
        "for (let i = 0; i < 3; i++) {}\n\
         for (const x of xs) {}\n\
         for (var k in obj) {}\n\
         for (k in obj) {}\n\
         for (;;) break;",
    );
    let kinds: Vec<SyntaxKind> = body(&ast).iter().map(|&s| ast.syntax_kind(s)).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::For,
            SyntaxKind::ForOf,
            SyntaxKind::ForIn,
            SyntaxKind::ForIn,
            SyntaxKind::For,
        ]
    );
    let NodeKind::ForOf { left, .. } = ast.kind(body(&ast)[1]) else {
        panic!("expected for-of");
    };
    assert_eq!(ast.syntax_kind(*left), SyntaxKind::VarDecl);
}

#[test]
fn test_if_else_and_loops() {
    let (ast, _) = parse_ok(
        "if (a) b(); else if (c) { d(); } else e();\n\
         while (x) x--;\n\
         do { y++ } while (y < 10)\n\
         z = c ? 1 : 2;",
    );
    let kinds: Vec<SyntaxKind> = body(&ast).iter().map(|&s| ast.syntax_kind(s)).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::If,
            SyntaxKind::While,
            SyntaxKind::DoWhile,
            SyntaxKind::ExprStmt,
        ]
    );
}

#[test]
fn test_parents_are_linked() {
    let (ast, _) = parse_ok("let a = [1, 2];");
    let decl = body(&ast)[0];
    for id in ast.descendants(decl).into_iter().skip(1) {
        let parent = ast.parent(id).unwrap();
        assert!(ast.children(parent).contains(&id));
    }
    assert_eq!(ast.parent(decl), Some(ast.root()));
}

#[test]
fn test_recovers_after_error() {
    let interner = StringInterner::new();
    let output = parse_source("let a = ;\nlet b = 2;\nfoo(1 2);\nlet c = 3;", &interner);
    assert_eq!(output.errors.len(), 2);
    assert_eq!(output.errors[0].code, ErrorCode::E1002);
    assert_eq!(output.errors[1].code, ErrorCode::E1001);
    let decls = body(&output.ast)
        .iter()
        .filter(|&&s| output.ast.syntax_kind(s) == SyntaxKind::VarDecl)
        .count();
    assert_eq!(decls, 2);
}

#[test]
fn test_unclosed_block() {
    let interner = StringInterner::new();
    let output = parse_source("function f() {\n  let a = 1;\n", &interner);
    assert!(output.errors.iter().any(|e| e.code == ErrorCode::E1003));
}

#[test]
fn test_unsupported_syntax() {
    let interner = StringInterner::new();
    let output = parse_source("let f = (x) => x;\ninterface Foo { a: number }", &interner);
    let codes: Vec<ErrorCode> = output.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1005, ErrorCode::E1005]);
}

#[test]
fn test_lex_errors_become_diagnostics() {
    let interner = StringInterner::new();
    let output = parse_source("let s = \"abc\n", &interner);
    let diagnostics = output.diagnostics();
    assert_eq!(diagnostics[0].code, ErrorCode::E0001);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 2000;
    let source = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let (ast, _) = parse_ok(&source);
    assert_eq!(body(&ast).len(), 1);
}
