//! Literals. Container literals allocate into the name the memory plan
//! reserved for them and evaluate to that name.

use ts2c_ir::{NodeId, NodeKind};
use ts2c_memory::sites::contextual_type;
use ts2c_types::{ArrayType, NativeType, StructType};

use super::{Code, LowerCx, Lowered};
use crate::ctype::{number_literal, string_literal};
use crate::runtime::keys;

pub(super) fn lower_scalar(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let ast = cx.ast;
    let text = match ast.kind(node) {
        NodeKind::Number { value, raw } => number_literal(cx.lookup(*raw), *value),
        NodeKind::Str { value } => string_literal(cx.lookup(*value)),
        NodeKind::Bool { value } => {
            cx.require(keys::BOOL);
            if *value { "TRUE" } else { "FALSE" }.to_string()
        }
        NodeKind::Null | NodeKind::Undefined => {
            cx.require(keys::STDLIB);
            "NULL".to_string()
        }
        _ => return cx.unsupported(node),
    };
    Code::new(text).boxed()
}

pub(super) fn lower_array(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let ast = cx.ast;
    let NodeKind::Array { elements } = ast.kind(node) else {
        return cx.unsupported(node);
    };
    match contextual_type(cx.ast, cx.types, node) {
        NativeType::Array(array) if !array.dynamic => match literal_target(cx, node) {
            Some(target) => static_array(cx, &target, elements),
            None => cx.unsupported(node),
        },
        NativeType::Array(array) => dynamic_array(cx, node, &array, elements),
        _ => cx.unsupported(node),
    }
}

/// Variable a literal is written into: the declarator or plain assignment
/// it is the value of.
fn literal_target(cx: &LowerCx<'_>, node: NodeId) -> Option<String> {
    let (parent, _) = cx.ast.parent_skipping_parens(node)?;
    let symbols = cx.types.symbols();
    let var = match cx.ast.kind(parent) {
        NodeKind::Declarator { .. } => symbols.declared_by(parent)?,
        NodeKind::Assign {
            op: None, target, ..
        } => symbols.resolve_expr(cx.ast, *target)?,
        _ => return None,
    };
    Some(cx.types.var(var).c_name.clone())
}

/// `T name[n]`: the variable is the storage, only elements are set.
fn static_array(cx: &mut LowerCx<'_>, target: &str, elements: &[NodeId]) -> Lowered {
    let mut hoisted = Vec::new();
    for (index, &element) in elements.iter().enumerate() {
        let value = cx.text(element, &mut hoisted);
        hoisted.push(format!("{target}[{index}] = {value};"));
    }
    Code::with_hoisted(target, hoisted).boxed()
}

fn dynamic_array(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    array: &ArrayType,
    elements: &[NodeId],
) -> Lowered {
    if cx.plan.allocation(node).is_none() {
        return Code::empty().boxed();
    }
    let name = cx.allocation_name(node, "arr");
    cx.require(keys::ARRAY);
    cx.require_type(&NativeType::Array(Box::new(array.clone())));

    let mut hoisted = vec![format!(
        "ARRAY_CREATE({name}, {}, {});",
        elements.len().max(2),
        elements.len()
    )];
    cx.register_allocation(node, &mut hoisted);
    for (index, &element) in elements.iter().enumerate() {
        let value = cx.text(element, &mut hoisted);
        hoisted.push(format!("{name}->data[{index}] = {value};"));
    }
    Code::with_hoisted(name, hoisted).boxed()
}

pub(super) fn lower_object(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let ast = cx.ast;
    let NodeKind::Object { properties } = ast.kind(node) else {
        return cx.unsupported(node);
    };
    if cx.plan.allocation(node).is_none() {
        return Code::empty().boxed();
    }
    match contextual_type(cx.ast, cx.types, node) {
        NativeType::Struct(shape) => struct_literal(cx, node, &shape, properties),
        NativeType::Dict(element) => dict_literal(cx, node, &element, properties),
        _ => cx.unsupported(node),
    }
}

fn struct_literal(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    shape: &StructType,
    properties: &[NodeId],
) -> Lowered {
    let name = cx.allocation_name(node, "obj");
    cx.require(keys::STDLIB);
    cx.require(keys::ASSERT);
    cx.require_type(&NativeType::Struct(shape.clone()));

    let mut hoisted = vec![
        format!("{name} = malloc(sizeof(*{name}));"),
        format!("assert({name} != NULL);"),
    ];
    cx.register_allocation(node, &mut hoisted);
    let ast = cx.ast;
    for &property in properties {
        let NodeKind::Property { key, value } = ast.kind(property) else {
            continue;
        };
        let key = cx.lookup(*key);
        if shape.field(key).is_none() {
            continue;
        }
        let value = cx.text(*value, &mut hoisted);
        hoisted.push(format!("{name}->{key} = {value};"));
    }
    Code::with_hoisted(name, hoisted).boxed()
}

fn dict_literal(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    element: &NativeType,
    properties: &[NodeId],
) -> Lowered {
    let name = cx.allocation_name(node, "obj");
    cx.require(keys::DICT);
    cx.require_type(&NativeType::dict(element.clone()));

    let mut hoisted = vec![format!(
        "DICT_CREATE({name}, {});",
        properties.len().max(2)
    )];
    cx.register_allocation(node, &mut hoisted);
    let ast = cx.ast;
    for &property in properties {
        let NodeKind::Property { key, value } = ast.kind(property) else {
            continue;
        };
        let key = string_literal(cx.lookup(*key));
        let value = cx.text(*value, &mut hoisted);
        hoisted.push(format!("DICT_SET({name}, {key}, {value});"));
    }
    Code::with_hoisted(name, hoisted).boxed()
}
