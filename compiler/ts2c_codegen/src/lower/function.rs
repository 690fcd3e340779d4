//! Function definitions. C has no nested functions, so every function is
//! emitted at file scope and leaves nothing at its source position.

use ts2c_ir::{NodeId, NodeKind};
use ts2c_types::VarId;

use super::stmt::lower_body;
use super::{Code, LowerCx, Lowered};
use crate::ctype::{c_type, declaration, local_declaration, temp_c_type};
use crate::renderable;
use crate::template::{render, Block};

/// A lowered function: its prototype and its definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FunctionOutput {
    pub prototype: String,
    pub definition: String,
}

renderable! {
    struct FunctionDefinition = "{signature} {\n    {locals}\n    {body}\n    {epilogue}\n}" {
        signature: String,
        locals: Vec<String>,
        body: Block,
        epilogue: Vec<String>,
    }
}

pub(super) fn lower_function(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let ast = cx.ast;
    let NodeKind::Function { body, .. } = *ast.kind(node) else {
        return cx.unsupported(node);
    };
    let Some(function) = cx.types.symbols().declared_by(node) else {
        return cx.unsupported(node);
    };

    let previous = cx.enter_function(node);
    let statements = lower_body(cx, body);
    let ends_with_return = match ast.kind(body) {
        NodeKind::Block { body } => body
            .last()
            .is_some_and(|&last| matches!(ast.kind(last), NodeKind::Return { .. })),
        _ => false,
    };
    let epilogue = if ends_with_return {
        Vec::new()
    } else {
        cx.releases(node)
    };
    let locals = local_declarations(cx, node);
    cx.leave_function(previous);

    let signature = signature(cx, function, node);
    let definition = render(&FunctionDefinition {
        signature: signature.clone(),
        locals,
        body: statements,
        epilogue,
    });
    tracing::trace!(function = %signature, "lowered function");
    cx.functions.push(FunctionOutput {
        prototype: format!("{signature};"),
        definition: definition.into_statements(),
    });
    Code::empty().boxed()
}

/// `ret name(params)`
fn signature(cx: &mut LowerCx<'_>, function: VarId, node: NodeId) -> String {
    let types = cx.types;
    let info = types.var(function);
    let return_type = types.var_type(function);
    cx.require_type(return_type);

    let params: Vec<String> = types
        .symbols()
        .params_of(cx.ast, node)
        .into_iter()
        .map(|param| {
            let ty = types.var_type(param);
            cx.require_type(ty);
            declaration(ty, &types.var(param).c_name)
        })
        .collect();
    let params = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };
    format!("{} {}({params})", c_type(return_type), info.c_name)
}

/// Declarations at the top of `scope` (a function or the program):
/// source variables, planned temporaries, then locals lowering invented.
pub(crate) fn local_declarations(cx: &mut LowerCx<'_>, scope: NodeId) -> Vec<String> {
    let types = cx.types;
    let plan = cx.plan;
    let owner = (scope != cx.ast.root()).then_some(scope);
    let mut lines = Vec::new();

    for (id, var) in types.symbols().vars() {
        if var.function != owner || var.is_param() || var.is_function() {
            continue;
        }
        let ty = types.var_type(id);
        if ty.is_void() {
            continue;
        }
        cx.require_type(ty);
        lines.push(if owner.is_some() {
            local_declaration(ty, &var.c_name)
        } else {
            format!("{};", declaration(ty, &var.c_name))
        });
    }
    for info in plan.declarations(scope) {
        cx.require_type(&info.ty);
        lines.push(if owner.is_some() {
            format!("{} {} = NULL;", temp_c_type(&info.ty), info.var_name)
        } else {
            format!("{} {};", temp_c_type(&info.ty), info.var_name)
        });
    }
    for local in cx.take_locals(scope) {
        lines.push(if owner.is_some() {
            local_declaration(&local.ty, &local.name)
        } else {
            format!("{};", declaration(&local.ty, &local.name))
        });
    }
    lines
}
