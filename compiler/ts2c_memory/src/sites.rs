//! Finding the expressions that allocate.

use ts2c_ir::{Ast, BinaryOp, CallSite, NodeId, NodeKind, StringInterner};
use ts2c_types::{NativeType, TypeTable};

use crate::calls::CallEscapes;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SiteKind {
    ArrayLiteral,
    ObjectLiteral,
    /// Outermost `+` of a string concatenation chain, or string `+=`.
    Concat,
    /// `s[i]` on a string.
    StrIndex,
    /// A call whose resolver hands back a fresh value.
    Call,
}

#[derive(Clone, Debug)]
pub struct HeapSite {
    pub node: NodeId,
    pub kind: SiteKind,
    /// Representation of the allocated value.
    pub ty: NativeType,
    pub name_hint: String,
    pub owns_contents: bool,
}

pub(crate) fn find_sites(
    ast: &Ast,
    interner: &StringInterner,
    types: &TypeTable,
    calls: &dyn CallEscapes,
) -> Vec<HeapSite> {
    let mut sites = Vec::new();
    for id in ast.ids() {
        let site = match ast.kind(id) {
            NodeKind::Array { .. } => {
                let ty = contextual_type(ast, types, id);
                (!discarded(ast, id) && ty.is_dynamic_array())
                    .then(|| site(id, SiteKind::ArrayLiteral, ty, "arr"))
            }
            NodeKind::Object { .. } => {
                let ty = contextual_type(ast, types, id);
                (!discarded(ast, id) && (ty.is_struct() || ty.is_dict()))
                    .then(|| site(id, SiteKind::ObjectLiteral, ty, "obj"))
            }
            NodeKind::Binary {
                op: BinaryOp::Add, ..
            } if types.type_of(id).is_str() => (!discarded(ast, id)
                && !inside_concat(ast, types, id))
            .then(|| site(id, SiteKind::Concat, NativeType::STR, "tmp_string")),
            NodeKind::Assign {
                op: Some(BinaryOp::Add),
                ..
            } if types.type_of(id).is_str() => {
                Some(site(id, SiteKind::Concat, NativeType::STR, "tmp_string"))
            }
            NodeKind::Index { object, .. } if types.type_of(*object).is_str() => {
                Some(site(id, SiteKind::StrIndex, NativeType::STR, "tmp_char"))
            }
            NodeKind::Call { .. } => CallSite::from_node(ast, interner, id)
                .filter(|call| calls.needs_disposal(ast, types, call))
                .map(|call| HeapSite {
                    node: id,
                    kind: SiteKind::Call,
                    ty: types.type_of(id).clone(),
                    name_hint: calls
                        .temp_var_name(ast, types, &call)
                        .unwrap_or_else(|| "tmp_result".to_string()),
                    owns_contents: calls.owns_contents(ast, types, &call),
                }),
            _ => None,
        };
        sites.extend(site);
    }
    sites
}

fn site(node: NodeId, kind: SiteKind, ty: NativeType, hint: &str) -> HeapSite {
    HeapSite {
        node,
        kind,
        ty,
        name_hint: hint.to_string(),
        owns_contents: false,
    }
}

/// Type a literal takes where it is written: the variable it initializes
/// or is assigned to decides. Anywhere else arrays must grow.
pub fn contextual_type(ast: &Ast, types: &TypeTable, literal: NodeId) -> NativeType {
    let symbols = types.symbols();
    if let Some((parent, child)) = ast.parent_skipping_parens(literal) {
        match ast.kind(parent) {
            NodeKind::Declarator { init: Some(init), .. } if *init == child => {
                if let Some(var) = symbols.declared_by(parent) {
                    return types.var_type(var).clone();
                }
            }
            NodeKind::Assign {
                op: None,
                target,
                value,
            } if *value == child => {
                if let Some(var) = symbols.resolve_expr(ast, *target) {
                    return types.var_type(var).clone();
                }
                return types.type_of(*target).dynamize();
            }
            _ => {}
        }
    }
    types.type_of(literal).dynamize()
}

/// The value is computed only to be thrown away.
fn discarded(ast: &Ast, node: NodeId) -> bool {
    ast.parent_skipping_parens(node)
        .is_some_and(|(parent, _)| matches!(ast.kind(parent), NodeKind::ExprStmt { .. }))
}

/// Part of a longer concatenation that owns the buffer.
fn inside_concat(ast: &Ast, types: &TypeTable, node: NodeId) -> bool {
    ast.parent_skipping_parens(node)
        .is_some_and(|(parent, child)| match ast.kind(parent) {
            NodeKind::Binary {
                op: BinaryOp::Add, ..
            } => types.type_of(parent).is_str(),
            NodeKind::Assign {
                op: Some(BinaryOp::Add),
                value,
                ..
            } => *value == child && types.type_of(parent).is_str(),
            _ => false,
        })
}
