//! Numeric refinement.
//!
//! Numbers are one type in the source language; C needs a width. A literal
//! with a decimal point or exponent is `float`, an integer outside the
//! 16-bit range is `int32_t`, anything else `int16_t`. Division produces a
//! `float` unless its result only ever feeds a bitwise operator, which
//! truncates to an integer anyway.

use ts2c_ir::{Ast, BinaryOp, NodeId, NodeKind, UnaryOp};

use crate::NativeType;

/// Largest magnitude that still fits `int16_t`.
pub const INT16_LIMIT: f64 = 32767.0;

/// Type of a numeric literal from its source text and value.
pub fn literal_type(raw: &str, value: f64) -> NativeType {
    let is_hex = raw.starts_with("0x") || raw.starts_with("0X");
    if !is_hex && raw.contains(['.', 'e', 'E']) {
        NativeType::FLOAT
    } else if value.abs() > INT16_LIMIT {
        NativeType::LONG
    } else {
        NativeType::INT
    }
}

/// Wider of two numeric types, with booleans counting as `int16_t`.
///
/// Unknown operands are ignored; a boxed operand boxes the result.
pub fn arithmetic_result(left: &NativeType, right: &NativeType) -> NativeType {
    let normalize = |ty: &NativeType| -> Option<NativeType> {
        if ty.is_bool() {
            Some(NativeType::INT)
        } else if ty.is_numeric() || ty.is_boxed() {
            Some(ty.clone())
        } else {
            None
        }
    };
    match (normalize(left), normalize(right)) {
        (Some(l), Some(r)) => crate::merge(&l, &r),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => NativeType::INT,
    }
}

/// Integer type produced by a bitwise operator.
pub fn bitwise_result(left: &NativeType, right: &NativeType) -> NativeType {
    if matches!(left, NativeType::Primitive(crate::Primitive::Long))
        || matches!(right, NativeType::Primitive(crate::Primitive::Long))
    {
        NativeType::LONG
    } else {
        NativeType::INT
    }
}

/// Is the value of `node` consumed (through arithmetic and parentheses)
/// by a bitwise or shift operator?
pub fn in_integer_context(ast: &Ast, node: NodeId) -> bool {
    let mut current = node;
    while let Some(parent) = ast.parent(current) {
        match ast.kind(parent) {
            NodeKind::Paren { .. } => {}
            NodeKind::Unary {
                op: UnaryOp::Neg | UnaryOp::Plus,
                ..
            } => {}
            NodeKind::Unary {
                op: UnaryOp::BitNot,
                ..
            } => return true,
            NodeKind::Binary { op, .. } if op.is_bitwise() => return true,
            NodeKind::Binary { op, .. } if op.is_arithmetic() && *op != BinaryOp::Div => {}
            NodeKind::Assign {
                op: Some(op),
                value,
                ..
            } if *value == current => return op.is_bitwise(),
            _ => return false,
        }
        current = parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_types() {
        assert_eq!(literal_type("3", 3.0), NativeType::INT);
        assert_eq!(literal_type("45.97", 45.97), NativeType::FLOAT);
        assert_eq!(literal_type("1e3", 1000.0), NativeType::FLOAT);
        assert_eq!(literal_type("32767", 32767.0), NativeType::INT);
        assert_eq!(literal_type("32768", 32768.0), NativeType::LONG);
        assert_eq!(literal_type("0xFFFF", 65535.0), NativeType::LONG);
        assert_eq!(literal_type("0xE", 14.0), NativeType::INT);
    }

    #[test]
    fn test_arithmetic_result() {
        assert_eq!(
            arithmetic_result(&NativeType::INT, &NativeType::FLOAT),
            NativeType::FLOAT
        );
        assert_eq!(
            arithmetic_result(&NativeType::BOOL, &NativeType::INT),
            NativeType::INT
        );
        assert_eq!(
            arithmetic_result(&NativeType::POINTER, &NativeType::LONG),
            NativeType::LONG
        );
    }

    #[test]
    fn test_bitwise_result() {
        assert_eq!(bitwise_result(&NativeType::FLOAT, &NativeType::INT), NativeType::INT);
        assert_eq!(bitwise_result(&NativeType::LONG, &NativeType::INT), NativeType::LONG);
    }
}
