//! Statements.

use ts2c_ir::{NodeId, NodeKind};
use ts2c_memory::sites::contextual_type;

use super::{Code, LowerCx, Lowered};
use crate::renderable;
use crate::template::Block;

renderable! {
    struct StatementList = "{statements}" {
        statements: Block,
    }
}

renderable! {
    struct NestedBlock = "{\n    {statements}\n}" {
        statements: Block,
    }
}

renderable! {
    struct IfStatement = "if ({cond}) {\n    {then_body}\n}{#if else_if} else {else_if}{#elseif has_else} else {\n    {else_body}\n}{/if}" {
        cond: Lowered,
        then_body: Block,
        else_if: Option<String>,
        has_else: bool,
        else_body: Block,
    }
}

/// Statements of a body, each owning the statements its expressions
/// hoist.
pub(super) fn lower_body(cx: &mut LowerCx<'_>, node: NodeId) -> Block {
    let ast = cx.ast;
    match ast.kind(node) {
        NodeKind::Block { body } => body.iter().map(|&statement| cx.lower(statement)).collect(),
        _ => Block(vec![cx.lower(node)]),
    }
}

pub(super) fn lower_statement_list(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let ast = cx.ast;
    let body = match ast.kind(node) {
        NodeKind::Program { body } | NodeKind::Block { body } => body,
        _ => return cx.unsupported(node),
    };
    let statements: Block = body.iter().map(|&statement| cx.lower(statement)).collect();
    let nested = matches!(ast.kind(node), NodeKind::Block { .. })
        && ast.parent(node).is_some_and(|parent| {
            matches!(
                ast.kind(parent),
                NodeKind::Block { .. } | NodeKind::Program { .. }
            )
        });
    if nested {
        Box::new(NestedBlock { statements })
    } else {
        Box::new(StatementList { statements })
    }
}

pub(super) fn lower_var_decl(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let (ast, types) = (cx.ast, cx.types);
    let NodeKind::VarDecl { declarators, .. } = ast.kind(node) else {
        return cx.unsupported(node);
    };
    let in_for_init = ast
        .parent(node)
        .is_some_and(|parent| matches!(ast.kind(parent), NodeKind::For { init: Some(init), .. } if *init == node));

    let mut hoisted = Vec::new();
    let mut assignments = Vec::new();
    for &declarator in declarators {
        let NodeKind::Declarator {
            init: Some(init), ..
        } = *ast.kind(declarator)
        else {
            continue;
        };
        let Some(var) = types.symbols().declared_by(declarator) else {
            continue;
        };
        if types.var_type(var).is_boxed() {
            continue;
        }
        let name = types.var(var).c_name.as_str();
        let value = cx.text(init, &mut hoisted);
        if value.is_empty() || value == name || stored_in_place(cx, init) {
            continue;
        }
        assignments.push(format!("{name} = {value}"));
    }

    if in_for_init {
        return Code::with_hoisted(assignments.join(", "), hoisted).boxed();
    }
    hoisted.extend(assignments.into_iter().map(|assignment| format!("{assignment};")));
    Code::with_hoisted(String::new(), hoisted).boxed()
}

/// The initializer writes straight into its variable.
fn stored_in_place(cx: &LowerCx<'_>, init: NodeId) -> bool {
    let init = cx.ast.unparen(init);
    cx.plan.is_reused(init)
        || (matches!(cx.ast.kind(init), NodeKind::Array { .. })
            && contextual_type(cx.ast, cx.types, init).is_static_array())
}

pub(super) fn lower_expr_stmt(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::ExprStmt { expr } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let rendered = cx.render(expr);
    let text = if rendered.inline.trim().is_empty() {
        String::new()
    } else {
        format!("{};", rendered.inline)
    };
    Code::with_hoisted(text, rendered.hoisted).boxed()
}

pub(super) fn lower_return(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Return { value } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let releases = cx.return_releases(node);
    let mut hoisted = Vec::new();
    let Some(value) = value else {
        hoisted.extend(releases);
        return Code::with_hoisted("return;", hoisted).boxed();
    };
    let text = cx.text(value, &mut hoisted);
    if releases.is_empty() {
        return Code::with_hoisted(format!("return {text};"), hoisted).boxed();
    }
    let ty = cx.type_of(value);
    let result = cx.fresh_local("tmp_result", ty);
    hoisted.push(format!("{result} = {text};"));
    hoisted.extend(releases);
    Code::with_hoisted(format!("return {result};"), hoisted).boxed()
}

pub(super) fn lower_if(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::If {
        cond,
        then_branch,
        else_branch,
    } = *cx.ast.kind(node)
    else {
        return cx.unsupported(node);
    };
    let cond = cx.lower(cond);
    let then_body = lower_body(cx, then_branch);

    let mut statement = IfStatement {
        cond,
        then_body,
        else_if: None,
        has_else: false,
        else_body: Block::new(),
    };
    if let Some(else_branch) = else_branch {
        statement.has_else = true;
        if matches!(cx.ast.kind(else_branch), NodeKind::If { .. }) {
            // Statements hoisted out of an `else if` condition belong to
            // the else branch.
            let rendered = cx.render(else_branch);
            if rendered.hoisted.is_empty() {
                statement.else_if = Some(rendered.inline);
            } else {
                statement.else_body.push(Code::from(rendered).boxed());
            }
        } else {
            statement.else_body = lower_body(cx, else_branch);
        }
    }
    Box::new(statement)
}

pub(super) fn lower_jump(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let (keyword, mut hoisted) = match cx.ast.kind(node) {
        NodeKind::Break => ("break;", Vec::new()),
        NodeKind::Continue => ("continue;", cx.continue_steps(node)),
        _ => return cx.unsupported(node),
    };
    hoisted.extend(cx.loop_exit_releases(node));
    Code::with_hoisted(keyword, hoisted).boxed()
}

pub(super) fn lower_empty(_cx: &mut LowerCx<'_>, _node: NodeId) -> Lowered {
    Code::empty().boxed()
}
