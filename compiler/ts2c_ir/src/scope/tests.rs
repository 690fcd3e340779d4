use super::*;
use crate::{Span, StringInterner};

struct Fixture {
    ast: Ast,
    function: NodeId,
    while_loop: NodeId,
    while_cond: NodeId,
    in_branch: NodeId,
    branch_stmt: NodeId,
    if_node: NodeId,
    for_loop: NodeId,
    for_init: NodeId,
    top_level: NodeId,
}

/// ```text
/// function f(p) {
///     while (x) { if (true) y; }
/// }
/// for (z; ; ) w;
/// ```
fn fixture() -> Fixture {
    let interner = StringInterner::new();
    let mut ast = Ast::new();
    let ident = |ast: &mut Ast, s: &str| {
        ast.alloc(
            NodeKind::Ident {
                name: interner.intern(s),
            },
            Span::DUMMY,
        )
    };

    let p = ast.alloc(
        NodeKind::Param {
            name: interner.intern("p"),
        },
        Span::DUMMY,
    );
    let while_cond = ident(&mut ast, "x");
    let cond = ast.alloc(NodeKind::Bool { value: true }, Span::DUMMY);
    let in_branch = ident(&mut ast, "y");
    let branch_stmt = ast.alloc(NodeKind::ExprStmt { expr: in_branch }, Span::DUMMY);
    let if_node = ast.alloc(
        NodeKind::If {
            cond,
            then_branch: branch_stmt,
            else_branch: None,
        },
        Span::DUMMY,
    );
    let loop_body = ast.alloc(NodeKind::Block { body: vec![if_node] }, Span::DUMMY);
    let while_loop = ast.alloc(
        NodeKind::While {
            cond: while_cond,
            body: loop_body,
        },
        Span::DUMMY,
    );
    let fn_body = ast.alloc(
        NodeKind::Block {
            body: vec![while_loop],
        },
        Span::DUMMY,
    );
    let function = ast.alloc(
        NodeKind::Function {
            name: interner.intern("f"),
            params: vec![p],
            body: fn_body,
        },
        Span::DUMMY,
    );

    let for_init = ident(&mut ast, "z");
    let top_level = ident(&mut ast, "w");
    let for_body = ast.alloc(NodeKind::ExprStmt { expr: top_level }, Span::DUMMY);
    let for_loop = ast.alloc(
        NodeKind::For {
            init: Some(for_init),
            cond: None,
            update: None,
            body: for_body,
        },
        Span::DUMMY,
    );
    let program = ast.alloc(
        NodeKind::Program {
            body: vec![function, for_loop],
        },
        Span::DUMMY,
    );

    Fixture {
        ast: ast.finish(program),
        function,
        while_loop,
        while_cond,
        in_branch,
        branch_stmt,
        if_node,
        for_loop,
        for_init,
        top_level,
    }
}

#[test]
fn test_enclosing_function() {
    let f = fixture();
    assert_eq!(enclosing_function(&f.ast, f.in_branch), Some(f.function));
    assert_eq!(enclosing_function(&f.ast, f.top_level), None);
    assert_eq!(defining_scope(&f.ast, f.top_level), f.ast.root());
    assert_eq!(defining_scope(&f.ast, f.while_cond), f.function);
}

#[test]
fn test_loop_condition_is_inside_loop() {
    let f = fixture();
    assert_eq!(enclosing_loop(&f.ast, f.while_cond), Some(f.while_loop));
    assert_eq!(enclosing_loop(&f.ast, f.in_branch), Some(f.while_loop));
    assert!(is_in_loop(&f.ast, f.top_level));
}

#[test]
fn test_for_initializer_is_outside_loop() {
    let f = fixture();
    assert_eq!(enclosing_loop(&f.ast, f.for_init), None);
    assert_eq!(enclosing_loop(&f.ast, f.top_level), Some(f.for_loop));
}

#[test]
fn test_loops_stop_at_function_boundary() {
    let f = fixture();
    assert_eq!(enclosing_loop(&f.ast, f.function), None);
    assert_eq!(enclosing_loops(&f.ast, f.in_branch), vec![f.while_loop]);
}

#[test]
fn test_enclosing_branch_and_statement() {
    let f = fixture();
    assert_eq!(enclosing_branch(&f.ast, f.in_branch), Some(f.if_node));
    assert_eq!(enclosing_branch(&f.ast, f.while_cond), None);
    assert_eq!(enclosing_statement(&f.ast, f.while_cond), Some(f.while_loop));
    assert_eq!(enclosing_statement(&f.ast, f.branch_stmt), Some(f.if_node));
}

#[test]
fn test_ancestry() {
    let f = fixture();
    assert!(is_ancestor(&f.ast, f.function, f.in_branch));
    assert!(is_ancestor(&f.ast, f.in_branch, f.in_branch));
    assert!(!is_ancestor(&f.ast, f.in_branch, f.function));
    assert_eq!(common_ancestor(&f.ast, f.in_branch, f.while_cond), f.while_loop);
    assert_eq!(common_ancestor(&f.ast, f.in_branch, f.top_level), f.ast.root());
}
