//! Loops.
//!
//! A condition that needs statements before it is moved into the body:
//! `while (1) { <statements> if (!(cond)) break; ... }`. A step that runs
//! at the end of the body (a `for` update or `do-while` condition with
//! statements) is repeated before every `continue`. Values allocated per
//! iteration are released at the end of the body and before every exit the
//! loop generates itself.

use ts2c_ir::{NodeId, NodeKind};
use ts2c_types::NativeType;

use super::stmt::lower_body;
use super::{LowerCx, Lowered};
use crate::renderable;
use crate::template::Block;

renderable! {
    struct LoopStatement = "{#statements}{setup}{/statements}{header} {\n    {prelude}\n    {body}\n    {cleanup}\n}{footer}" {
        setup: Vec<String>,
        header: String,
        prelude: Vec<String>,
        body: Block,
        cleanup: Vec<String>,
        footer: String,
    }
}

impl LoopStatement {
    fn new(header: String, body: Block) -> Self {
        LoopStatement {
            setup: Vec::new(),
            header,
            prelude: Vec::new(),
            body,
            cleanup: Vec::new(),
            footer: String::new(),
        }
    }
}

/// `if (!(cond)) { <releases> break; }`
fn exit_check(cond: &str, releases: &[String]) -> String {
    if releases.is_empty() {
        return format!("if (!({cond})) break;");
    }
    let mut lines = vec![format!("if (!({cond})) {{")];
    for release in releases {
        for line in release.lines() {
            lines.push(format!("    {line}"));
        }
    }
    lines.push("    break;".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

pub(super) fn lower_while(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::While { cond, body } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let cond = cx.render(cond);
    let releases = cx.releases(node);
    let body = lower_body(cx, body);

    let statement = if cond.hoisted.is_empty() {
        LoopStatement::new(format!("while ({})", cond.inline), body)
    } else {
        let mut statement = LoopStatement::new("while (1)".to_string(), body);
        statement.prelude = cond.hoisted;
        statement.prelude.push(exit_check(&cond.inline, &releases));
        statement
    };
    Box::new(LoopStatement {
        cleanup: releases,
        ..statement
    })
}

pub(super) fn lower_do_while(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::DoWhile { body, cond } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let cond = cx.render(cond);
    let releases = cx.releases(node);

    if cond.hoisted.is_empty() {
        let body = lower_body(cx, body);
        let mut statement = LoopStatement::new("do".to_string(), body);
        statement.cleanup = releases;
        statement.footer = format!(" while ({});", cond.inline);
        return Box::new(statement);
    }
    let mut check = cond.hoisted;
    check.push(exit_check(&cond.inline, &releases));
    cx.set_continue_steps(node, check.clone());
    let body = lower_body(cx, body);
    let mut statement = LoopStatement::new("while (1)".to_string(), body);
    statement.cleanup = check;
    statement.cleanup.extend(releases);
    Box::new(statement)
}

pub(super) fn lower_for(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::For {
        init,
        cond,
        update,
        body,
    } = *cx.ast.kind(node)
    else {
        return cx.unsupported(node);
    };
    let mut setup = Vec::new();
    let init = match init {
        Some(init) => cx.text(init, &mut setup),
        None => String::new(),
    };
    let cond = cond.map(|cond| cx.render(cond)).unwrap_or_default();
    let update = update.map(|update| cx.render(update)).unwrap_or_default();
    let releases = cx.releases(node);

    let mut prelude = Vec::new();
    let mut cleanup = Vec::new();
    let cond_text = if cond.hoisted.is_empty() {
        cond.inline
    } else {
        prelude = cond.hoisted;
        prelude.push(exit_check(&cond.inline, &releases));
        String::new()
    };
    // An update with statements of its own runs at the end of the body,
    // and every `continue` runs it too.
    let update_text = if update.hoisted.is_empty() {
        update.inline
    } else {
        cleanup = update.hoisted;
        cleanup.push(format!("{};", update.inline));
        cx.set_continue_steps(node, cleanup.clone());
        String::new()
    };
    let body = lower_body(cx, body);
    cleanup.extend(releases);

    let header = if cond_text.is_empty() && update_text.is_empty() {
        format!("for ({init};;)")
    } else {
        format!("for ({init}; {cond_text}; {update_text})")
    };
    Box::new(LoopStatement {
        setup,
        prelude,
        cleanup,
        ..LoopStatement::new(header, body)
    })
}

/// Variable receiving the item of a `for-of`/`for-in`.
fn loop_variable(cx: &LowerCx<'_>, left: NodeId) -> Option<String> {
    let ast = cx.ast;
    let types = cx.types;
    let var = match ast.kind(left) {
        NodeKind::VarDecl { declarators, .. } => {
            types.symbols().declared_by(*declarators.first()?)?
        }
        _ => types.symbols().resolve_expr(ast, left)?,
    };
    Some(types.var(var).c_name.clone())
}

pub(super) fn lower_for_of(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::ForOf { left, right, body } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let Some(item) = loop_variable(cx, left) else {
        return cx.unsupported(left);
    };
    let (size, element) = match cx.type_of(right) {
        NativeType::Array(array) if array.dynamic => ("->size".to_string(), "->data"),
        NativeType::Array(array) => (format!("{}", array.capacity), ""),
        _ => return cx.unsupported(right),
    };
    let mut setup = Vec::new();
    let iterable = cx.text(right, &mut setup);
    let index = cx.fresh_local(&format!("{item}_i"), &NativeType::INT);
    let bound = if element.is_empty() {
        size
    } else {
        format!("{iterable}{size}")
    };
    let header = format!("for ({index} = 0; {index} < {bound}; {index}++)");
    items_loop(cx, node, body, header, setup, format!("{item} = {iterable}{element}[{index}];"))
}

pub(super) fn lower_for_in(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::ForIn { left, right, body } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let Some(item) = loop_variable(cx, left) else {
        return cx.unsupported(left);
    };
    if !cx.type_of(right).is_dict() {
        return cx.unsupported(right);
    }
    let mut setup = Vec::new();
    let dict = cx.text(right, &mut setup);
    let index = cx.fresh_local(&format!("{item}_i"), &NativeType::INT);
    let header = format!("for ({index} = 0; {index} < {dict}->index->size; {index}++)");
    items_loop(cx, node, body, header, setup, format!("{item} = {dict}->index->data[{index}];"))
}

fn items_loop(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    body: NodeId,
    header: String,
    setup: Vec<String>,
    fetch: String,
) -> Lowered {
    let releases = cx.releases(node);
    let body = lower_body(cx, body);
    Box::new(LoopStatement {
        setup,
        prelude: vec![fetch],
        cleanup: releases,
        ..LoopStatement::new(header, body)
    })
}

/// `for (i = 0; i < bound; i++) { body }` around already rendered
/// statements.
pub(crate) fn index_loop(index: &str, bound: &str, body: &[String]) -> String {
    let mut lines = vec![format!("for ({index} = 0; {index} < {bound}; {index}++) {{")];
    for statement in body {
        for line in statement.lines() {
            lines.push(format!("    {line}"));
        }
    }
    lines.push("}".to_string());
    lines.join("\n")
}
