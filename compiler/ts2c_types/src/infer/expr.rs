//! Context-free expression typing.
//!
//! `infer` looks only at a node, its operands and the current variable
//! types. It never fails: anything it cannot type is `void *`.

use ts2c_ir::{stack::ensure_sufficient_stack, Ast, BinaryOp, CallSite, NodeId, NodeKind, StringInterner, UnaryOp};

use crate::numeric::{arithmetic_result, bitwise_result, in_integer_context, literal_type};
use crate::{merge, merge_all, CallOracle, NativeType, SymbolTable, TypeOverrides, TypeQuery};

/// Borrowed view of everything expression typing needs.
pub(crate) struct ExprTyper<'a> {
    pub ast: &'a Ast,
    pub interner: &'a StringInterner,
    pub oracle: &'a dyn CallOracle,
    pub symbols: &'a SymbolTable,
    pub overrides: &'a TypeOverrides,
}

impl TypeQuery for ExprTyper<'_> {
    fn node_type(&self, node: NodeId) -> NativeType {
        self.infer(node)
    }
}

impl ExprTyper<'_> {
    pub fn infer(&self, node: NodeId) -> NativeType {
        if let Some(ty) = self.overrides.get(node) {
            return ty.clone();
        }
        ensure_sufficient_stack(|| self.infer_kind(node))
    }

    fn infer_kind(&self, node: NodeId) -> NativeType {
        match self.ast.kind(node) {
            NodeKind::Number { value, raw } => literal_type(self.interner.lookup(*raw), *value),
            NodeKind::Str { .. } => NativeType::STR,
            NodeKind::Bool { .. } => NativeType::BOOL,
            NodeKind::Null | NodeKind::Undefined => NativeType::POINTER,
            NodeKind::Ident { name } => match self.symbols.resolve(node) {
                Some(var) => self.symbols.var(var).ty.clone(),
                None => match self.interner.lookup(*name) {
                    "NaN" | "Infinity" => NativeType::FLOAT,
                    _ => NativeType::POINTER,
                },
            },
            NodeKind::Paren { expr } => self.infer(*expr),
            NodeKind::Array { elements } => self.array_literal(elements),
            NodeKind::Object { properties } => self.object_literal(properties),
            NodeKind::Binary { op, left, right } => self.binary(node, *op, *left, *right),
            NodeKind::Unary { op, operand } => match op {
                UnaryOp::Neg | UnaryOp::Plus => {
                    arithmetic_result(&self.infer(*operand), &NativeType::POINTER)
                }
                UnaryOp::Not => NativeType::BOOL,
                UnaryOp::BitNot => bitwise_result(&self.infer(*operand), &NativeType::INT),
                UnaryOp::Typeof => NativeType::STR,
            },
            NodeKind::Update { operand, .. } => self.infer(*operand),
            NodeKind::Assign { op, target, value } => match op {
                None => self.infer(*value),
                Some(op) => self.binary(node, *op, *target, *value),
            },
            NodeKind::Conditional {
                then_expr,
                else_expr,
                ..
            } => merge(&self.infer(*then_expr), &self.infer(*else_expr)),
            NodeKind::Call { callee, .. } => self.call(node, *callee),
            NodeKind::Member { object, property } => {
                let object_ty = self.infer(*object);
                let property = self.interner.lookup(*property);
                member_type(&object_ty, property)
            }
            NodeKind::Index { object, index } => {
                let object_ty = self.infer(*object);
                match &object_ty {
                    NativeType::Array(a) => a.element.clone(),
                    NativeType::Dict(e) => (**e).clone(),
                    ty if ty.is_str() => NativeType::STR,
                    NativeType::Struct(s) => match self.ast.kind(self.ast.unparen(*index)) {
                        NodeKind::Str { value } => s
                            .field(self.interner.lookup(*value))
                            .cloned()
                            .unwrap_or(NativeType::POINTER),
                        _ => NativeType::POINTER,
                    },
                    _ => NativeType::POINTER,
                }
            }
            _ => NativeType::VOID,
        }
    }

    fn binary(&self, node: NodeId, op: BinaryOp, left: NodeId, right: NodeId) -> NativeType {
        if op.is_equality() || op.is_relational() || op.is_logical() {
            return NativeType::BOOL;
        }
        let l = self.infer(left);
        let r = self.infer(right);
        match op {
            BinaryOp::Add if l.is_str() || r.is_str() => NativeType::STR,
            BinaryOp::Div if !in_integer_context(self.ast, node) => {
                if l.is_boxed() || r.is_boxed() {
                    NativeType::BOXED
                } else {
                    NativeType::FLOAT
                }
            }
            op if op.is_bitwise() => bitwise_result(&l, &r),
            _ => arithmetic_result(&l, &r),
        }
    }

    fn call(&self, node: NodeId, callee: NodeId) -> NativeType {
        if let Some(function) = self.symbols.called_function(self.ast, callee) {
            return self.symbols.var(function).ty.clone();
        }
        CallSite::from_node(self.ast, self.interner, node)
            .and_then(|site| self.oracle.call_type(self.ast, self, &site))
            .unwrap_or(NativeType::POINTER)
    }

    fn array_literal(&self, elements: &[NodeId]) -> NativeType {
        let element_types: Vec<NativeType> =
            elements.iter().map(|&e| self.infer(e).dynamize()).collect();
        let element = merge_all(&element_types);
        let capacity = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        NativeType::array(element, capacity, elements.is_empty())
    }

    fn object_literal(&self, properties: &[NodeId]) -> NativeType {
        let mut fields: Vec<(String, NativeType)> = Vec::new();
        let mut open_keys = false;
        for &property in properties {
            let NodeKind::Property { key, value } = self.ast.kind(property) else {
                continue;
            };
            let key = self.interner.lookup(*key);
            open_keys |= !is_c_identifier(key);
            let ty = self.infer(*value).dynamize();
            match fields.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => *existing = merge(existing, &ty),
                None => fields.push((key.to_string(), ty)),
            }
        }
        if open_keys {
            NativeType::dict(merge_all(fields.iter().map(|(_, t)| t)))
        } else {
            NativeType::structure(fields)
        }
    }
}

/// Type of `object.property` for an object of type `object_ty`.
pub(crate) fn member_type(object_ty: &NativeType, property: &str) -> NativeType {
    match object_ty {
        NativeType::Array(_) if property == "length" => NativeType::INT,
        ty if ty.is_str() && property == "length" => NativeType::INT,
        NativeType::Struct(s) => s.field(property).cloned().unwrap_or(NativeType::POINTER),
        NativeType::Dict(e) => (**e).clone(),
        _ => NativeType::POINTER,
    }
}

/// Can `key` be used as a C struct field name?
pub(crate) fn is_c_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
