//! Expressions.

use ts2c_ir::{BinaryOp, CallSite, NodeId, NodeKind, UnaryOp, UpdateOp};
use ts2c_types::{NativeType, Primitive, VarId};

use super::{Code, LowerCx, Lowered};
use crate::ctype::{js_type_name, string_literal, zero_value};
use crate::renderable;
use crate::runtime::keys;

renderable! {
    struct BinaryExpr = "{left} {op} {right}" {
        left: Lowered,
        op: &'static str,
        right: Lowered,
    }
}

renderable! {
    struct UnaryExpr = "{op}{operand}" {
        op: &'static str,
        operand: Lowered,
    }
}

renderable! {
    struct UpdateExpr = "{#if prefix}{op}{operand}{#else}{operand}{op}{/if}" {
        prefix: bool,
        op: &'static str,
        operand: Lowered,
    }
}

renderable! {
    struct AssignExpr = "{target} {op} {value}" {
        target: Lowered,
        op: String,
        value: Lowered,
    }
}

renderable! {
    struct ConditionalExpr = "{cond} ? {then_expr} : {else_expr}" {
        cond: Lowered,
        then_expr: Lowered,
        else_expr: Lowered,
    }
}

renderable! {
    struct ParenExpr = "({expr})" {
        expr: Lowered,
    }
}

renderable! {
    struct Cast = "({ty}){expr}" {
        ty: &'static str,
        expr: Lowered,
    }
}

renderable! {
    struct ArrowAccess = "{object}->{field}" {
        object: Lowered,
        field: String,
    }
}

renderable! {
    struct ElementAccess = "{object}{#if dynamic}->data{/if}[{index}]" {
        object: Lowered,
        dynamic: bool,
        index: Lowered,
    }
}

renderable! {
    /// `callee(arg, ...)`
    pub(crate) struct CallExpr = "{callee}({args {, }=> {this}})" {
        pub callee: String,
        pub args: Vec<Lowered>,
    }
}

pub(super) fn lower_ident(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    if let Some(name) = cx.var_name(node) {
        return Code::new(name).boxed();
    }
    let ast = cx.ast;
    let NodeKind::Ident { name } = ast.kind(node) else {
        return cx.unsupported(node);
    };
    let text = match cx.lookup(*name) {
        "NaN" => {
            cx.require(keys::MATH);
            "NAN"
        }
        "Infinity" => {
            cx.require(keys::MATH);
            "INFINITY"
        }
        "undefined" => {
            cx.require(keys::STDLIB);
            "NULL"
        }
        other => other,
    };
    Code::new(text).boxed()
}

pub(super) fn lower_paren(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Paren { expr } = cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let expr = cx.lower(*expr);
    Box::new(ParenExpr { expr })
}

pub(super) fn lower_binary(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Binary { op, left, right } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let (left_ty, right_ty) = (cx.type_of(left), cx.type_of(right));

    if op == BinaryOp::Add && cx.type_of(node).is_str() {
        return concat(cx, node);
    }
    if (op.is_equality() || op.is_relational()) && (left_ty.is_str() || right_ty.is_str()) {
        if let Some(lowered) = string_comparison(cx, op, left, right) {
            return lowered;
        }
    }

    let mut left_lowered = cx.lower(left);
    let right_lowered = cx.lower(right);
    if op == BinaryOp::Mod && (left_ty.is_float() || right_ty.is_float()) {
        cx.require(keys::MATH);
        return Box::new(CallExpr {
            callee: "fmod".to_string(),
            args: vec![left_lowered, right_lowered],
        });
    }
    if op == BinaryOp::Div
        && cx.type_of(node).is_float()
        && !left_ty.is_float()
        && !right_ty.is_float()
    {
        left_lowered = Box::new(Cast {
            ty: "float",
            expr: left_lowered,
        });
    }
    Box::new(BinaryExpr {
        left: left_lowered,
        op: op.c_symbol(),
        right: right_lowered,
    })
}

/// Comparisons with a string operand. `None` when the other side is
/// neither a string nor a number (pointer comparison).
fn string_comparison(
    cx: &mut LowerCx<'_>,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
) -> Option<Lowered> {
    let (left_ty, right_ty) = (cx.type_of(left), cx.type_of(right));
    let symbol = op.c_symbol();
    let mut hoisted = Vec::new();

    let text = if left_ty.is_str() && right_ty.is_str() {
        cx.require(keys::STRING);
        let (l, r) = (cx.text(left, &mut hoisted), cx.text(right, &mut hoisted));
        format!("strcmp({l}, {r}) {symbol} 0")
    } else if op.is_equality() && (left_ty.is_numeric() || right_ty.is_numeric()) {
        cx.require(keys::STR_INT16_T_CMP);
        let (l, r) = (cx.text(left, &mut hoisted), cx.text(right, &mut hoisted));
        if left_ty.is_str() {
            format!("str_int16_t_cmp({l}, {r}) {symbol} 0")
        } else {
            format!("str_int16_t_cmp({r}, {l}) {symbol} 0")
        }
    } else if left_ty.is_numeric() || right_ty.is_numeric() {
        cx.require(keys::STDLIB);
        let (l, r) = (cx.text(left, &mut hoisted), cx.text(right, &mut hoisted));
        if left_ty.is_str() {
            format!("atoi({l}) {symbol} {r}")
        } else {
            format!("{l} {symbol} atoi({r})")
        }
    } else {
        return None;
    };
    Some(Code::with_hoisted(text, hoisted).boxed())
}

/// Outermost `+` of a string concatenation: one buffer for the whole
/// chain.
fn concat(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    if cx.plan.allocation(node).is_none() {
        return Code::empty().boxed();
    }
    let mut leaves = Vec::new();
    concat_leaves(cx, node, &mut leaves);

    let mut hoisted = Vec::new();
    let parts: Vec<(String, NativeType)> = leaves
        .into_iter()
        .map(|leaf| (cx.text(leaf, &mut hoisted), cx.type_of(leaf).clone()))
        .collect();
    let name = cx.allocation_name(node, "tmp_string");
    hoisted.extend(build_string(cx, node, &name, &parts));
    Code::with_hoisted(name, hoisted).boxed()
}

/// Operands of a string `+` chain, left to right.
fn concat_leaves(cx: &LowerCx<'_>, node: NodeId, leaves: &mut Vec<NodeId>) {
    let ast = cx.ast;
    match ast.kind(ast.unparen(node)) {
        NodeKind::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } if cx.type_of(ast.unparen(node)).is_str() => {
            for &side in &[*left, *right] {
                let inner = ast.unparen(side);
                let nested = matches!(
                    ast.kind(inner),
                    NodeKind::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                ) && cx.type_of(inner).is_str()
                    && cx.plan.allocation(inner).is_none();
                if nested {
                    concat_leaves(cx, inner, leaves);
                } else {
                    leaves.push(side);
                }
            }
        }
        _ => leaves.push(node),
    }
}

/// Statements filling `name` with the concatenation of `parts`.
pub(crate) fn build_string(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    name: &str,
    parts: &[(String, NativeType)],
) -> Vec<String> {
    cx.require(keys::STDLIB);
    cx.require(keys::STRING);
    cx.require(keys::ASSERT);

    let mut lengths = Vec::with_capacity(parts.len() + 1);
    let mut appends = Vec::with_capacity(parts.len());
    for (text, ty) in parts {
        match ty.as_primitive() {
            Some(Primitive::Int | Primitive::Long) => {
                cx.require(keys::STR_INT16_T_CAT);
                lengths.push("STR_INT16_T_BUFLEN".to_string());
                appends.push(format!("str_int16_t_cat({name}, {text});"));
            }
            Some(Primitive::Float) => {
                cx.require(keys::STR_FLOAT_CAT);
                lengths.push("STR_FLOAT_BUFLEN".to_string());
                appends.push(format!("str_float_cat({name}, {text});"));
            }
            Some(Primitive::Bool) => {
                lengths.push("5".to_string());
                appends.push(format!("strcat({name}, {text} ? \"true\" : \"false\");"));
            }
            _ => {
                lengths.push(format!("strlen({text})"));
                appends.push(format!("strcat({name}, {text});"));
            }
        }
    }
    lengths.push("1".to_string());

    let mut lines = vec![
        format!("{name} = malloc({});", lengths.join(" + ")),
        format!("assert({name} != NULL);"),
        format!("{name}[0] = '\\0';"),
    ];
    cx.register_allocation(node, &mut lines);
    lines.extend(appends);
    lines
}

pub(super) fn lower_unary(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Unary { op, operand } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let symbol = match op {
        UnaryOp::Typeof => {
            let name = js_type_name(cx.type_of(operand));
            return Code::new(string_literal(name)).boxed();
        }
        UnaryOp::Neg | UnaryOp::Plus => {
            let inner = cx.ast.kind(cx.ast.unparen(operand));
            let doubled = matches!(
                inner,
                NodeKind::Unary {
                    op: UnaryOp::Neg | UnaryOp::Plus,
                    ..
                } | NodeKind::Update { prefix: true, .. }
            ) && cx.ast.unparen(operand) == operand;
            match (op, doubled) {
                (UnaryOp::Neg, false) => "-",
                (UnaryOp::Neg, true) => "- ",
                (_, false) => "+",
                (_, true) => "+ ",
            }
        }
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
    };
    let operand = cx.lower(operand);
    Box::new(UnaryExpr {
        op: symbol,
        operand,
    })
}

pub(super) fn lower_update(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Update {
        op,
        prefix,
        operand,
    } = *cx.ast.kind(node)
    else {
        return cx.unsupported(node);
    };
    let operand = cx.lower(operand);
    Box::new(UpdateExpr {
        prefix,
        op: match op {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        },
        operand,
    })
}

pub(super) fn lower_assign(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Assign { op, target, value } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    if op == Some(BinaryOp::Add) && cx.type_of(node).is_str() {
        return string_append(cx, node, target, value);
    }
    if let Some(write) = dict_write(cx, node, op, target, value) {
        return write;
    }
    if op.is_none() && writes_static_array(cx, value) {
        let rendered = cx.render(value);
        return Code::with_hoisted(String::new(), rendered.hoisted).boxed();
    }

    let target = cx.lower(target);
    let value = cx.lower(value);
    Box::new(AssignExpr {
        target,
        op: op.map_or_else(|| "=".to_string(), |op| format!("{}=", op.c_symbol())),
        value,
    })
}

/// `s += x` on strings: build a new buffer and point `s` at it.
fn string_append(cx: &mut LowerCx<'_>, node: NodeId, target: NodeId, value: NodeId) -> Lowered {
    let mut hoisted = Vec::new();
    let target_text = cx.text(target, &mut hoisted);
    let mut leaves = Vec::new();
    concat_leaves(cx, value, &mut leaves);

    let mut parts = vec![(target_text.clone(), NativeType::STR)];
    for leaf in leaves {
        let text = cx.text(leaf, &mut hoisted);
        parts.push((text, cx.type_of(leaf).clone()));
    }
    let name = cx.allocation_name(node, "tmp_string");
    hoisted.extend(build_string(cx, node, &name, &parts));
    Code::with_hoisted(format!("{target_text} = {name}"), hoisted).boxed()
}

/// The assigned value is an array literal stored in place.
fn writes_static_array(cx: &LowerCx<'_>, value: NodeId) -> bool {
    let value = cx.ast.unparen(value);
    matches!(cx.ast.kind(value), NodeKind::Array { .. })
        && ts2c_memory::sites::contextual_type(cx.ast, cx.types, value).is_static_array()
}

/// Writes through a dictionary: `d.k = v`, `d[k] = v`, `d.k += v`.
fn dict_write(
    cx: &mut LowerCx<'_>,
    node: NodeId,
    op: Option<BinaryOp>,
    target: NodeId,
    value: NodeId,
) -> Option<Lowered> {
    let (object, key) = dict_access(cx, target)?;
    let element = cx.type_of(object).element()?.clone();
    cx.require(keys::DICT);
    cx.require_type(cx.type_of(object));

    let mut hoisted = Vec::new();
    let dict = cx.text(object, &mut hoisted);
    let key = match key {
        DictKey::Name(name) => string_literal(name),
        DictKey::Expr(expr) => cx.text(expr, &mut hoisted),
    };
    let zero = zero_value(&element);
    let mut value_text = cx.text(value, &mut hoisted);
    if let Some(op) = op {
        value_text = format!("DICT_GET({dict}, {key}, {zero}) {} {value_text}", op.c_symbol());
    }
    let set = format!("DICT_SET({dict}, {key}, {value_text})");
    if cx.is_discarded(node) {
        return Some(Code::with_hoisted(set, hoisted).boxed());
    }
    hoisted.push(format!("{set};"));
    Some(Code::with_hoisted(format!("DICT_GET({dict}, {key}, {zero})"), hoisted).boxed())
}

enum DictKey {
    Name(&'static str),
    Expr(NodeId),
}

/// `(dict, key)` when `target` reads or writes a dictionary entry.
fn dict_access(cx: &LowerCx<'_>, target: NodeId) -> Option<(NodeId, DictKey)> {
    let target = cx.ast.unparen(target);
    match *cx.ast.kind(target) {
        NodeKind::Member { object, property } if cx.type_of(object).is_dict() => {
            Some((object, DictKey::Name(cx.lookup(property))))
        }
        NodeKind::Index { object, index } if cx.type_of(object).is_dict() => {
            Some((object, DictKey::Expr(index)))
        }
        _ => None,
    }
}

pub(super) fn lower_conditional(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Conditional {
        cond,
        then_expr,
        else_expr,
    } = *cx.ast.kind(node)
    else {
        return cx.unsupported(node);
    };
    let cond = cx.lower(cond);
    let then_expr = cx.lower(then_expr);
    let else_expr = cx.lower(else_expr);
    Box::new(ConditionalExpr {
        cond,
        then_expr,
        else_expr,
    })
}

pub(super) fn lower_call(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let Some(site) = CallSite::from_node(cx.ast, cx.interner, node) else {
        return cx.unsupported(node);
    };
    if let Some(function) = cx.types.symbols().called_function(cx.ast, site.callee) {
        return user_call(cx, &site, function);
    }
    let resolvers = cx.resolvers;
    if let Some(resolver) = resolvers.find(cx.ast, cx.types, &site) {
        return resolver.lower(cx, &site);
    }
    tracing::debug!(
        method = site.method,
        function = site.function,
        "unresolved call emitted as written"
    );
    let mut hoisted = Vec::new();
    let callee = cx.text(site.callee, &mut hoisted);
    let args: Vec<String> = site.args.iter().map(|&arg| cx.text(arg, &mut hoisted)).collect();
    Code::with_hoisted(format!("{callee}({})", args.join(", ")), hoisted).boxed()
}

/// Call of a function the program defines. Missing arguments are passed
/// as zero values; extra ones are dropped.
fn user_call(cx: &mut LowerCx<'_>, site: &CallSite, function: VarId) -> Lowered {
    let types = cx.types;
    let info = types.var(function);
    let params = types.symbols().params_of(cx.ast, info.declaration);
    let mut args: Vec<Lowered> = Vec::with_capacity(params.len());
    for (index, &param) in params.iter().enumerate() {
        match site.arg(index) {
            Some(arg) => args.push(cx.lower(arg)),
            None => args.push(Code::new(zero_value(types.var_type(param))).boxed()),
        }
    }
    Box::new(CallExpr {
        callee: info.c_name.clone(),
        args,
    })
}

pub(super) fn lower_member(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Member { object, property } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let property = cx.lookup(property);
    let object_ty = cx.type_of(object);

    if property == "length" {
        match object_ty {
            NativeType::Array(array) if array.dynamic => {
                let object = cx.lower(object);
                return Box::new(ArrowAccess {
                    object,
                    field: "size".to_string(),
                });
            }
            NativeType::Array(array) => return Code::new(array.capacity.to_string()).boxed(),
            NativeType::Dict(_) => {
                let object = cx.lower(object);
                return Box::new(ArrowAccess {
                    object,
                    field: "index->size".to_string(),
                });
            }
            ty if ty.is_str() => {
                cx.require(keys::STRING);
                let object = cx.lower(object);
                return Box::new(CallExpr {
                    callee: "strlen".to_string(),
                    args: vec![object],
                });
            }
            _ => {}
        }
    }

    match object_ty {
        NativeType::Struct(_) => {
            let object = cx.lower(object);
            Box::new(ArrowAccess {
                object,
                field: property.to_string(),
            })
        }
        NativeType::Dict(element) => {
            cx.require(keys::DICT);
            let mut hoisted = Vec::new();
            let dict = cx.text(object, &mut hoisted);
            let text = format!(
                "DICT_GET({dict}, {}, {})",
                string_literal(property),
                zero_value(element)
            );
            Code::with_hoisted(text, hoisted).boxed()
        }
        _ => {
            let mut hoisted = Vec::new();
            let object = cx.text(object, &mut hoisted);
            Code::with_hoisted(format!("{object}.{property}"), hoisted).boxed()
        }
    }
}

pub(super) fn lower_index(cx: &mut LowerCx<'_>, node: NodeId) -> Lowered {
    let NodeKind::Index { object, index } = *cx.ast.kind(node) else {
        return cx.unsupported(node);
    };
    let object_ty = cx.type_of(object);
    match object_ty {
        ty if ty.is_str() => {
            cx.require(keys::STR_CHAR_AT);
            let mut hoisted = Vec::new();
            let string = cx.text(object, &mut hoisted);
            let position = cx.text(index, &mut hoisted);
            let name = cx.allocation_name(node, "tmp_char");
            hoisted.push(format!("{name} = str_char_at({string}, {position});"));
            cx.register_allocation(node, &mut hoisted);
            Code::with_hoisted(name, hoisted).boxed()
        }
        NativeType::Array(array) => {
            let dynamic = array.dynamic;
            let object = cx.lower(object);
            let index = cx.lower(index);
            Box::new(ElementAccess {
                object,
                dynamic,
                index,
            })
        }
        NativeType::Dict(element) => {
            cx.require(keys::DICT);
            let mut hoisted = Vec::new();
            let dict = cx.text(object, &mut hoisted);
            let key = cx.text(index, &mut hoisted);
            let text = format!("DICT_GET({dict}, {key}, {})", zero_value(element));
            Code::with_hoisted(text, hoisted).boxed()
        }
        NativeType::Struct(shape) => match *cx.ast.kind(cx.ast.unparen(index)) {
            NodeKind::Str { value } if shape.field(cx.lookup(value)).is_some() => {
                let field = cx.lookup(value).to_string();
                let object = cx.lower(object);
                Box::new(ArrowAccess { object, field })
            }
            _ => cx.unsupported(node),
        },
        _ => cx.unsupported(node),
    }
}
