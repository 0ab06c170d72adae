//! Maps syntax-tree operator enums onto the runtime helper names
//! (`pywasm_runtime::numerics`/`strings`) codegen calls — an
//! operator-to-implementation-name table, the same job an
//! `AotBinOp::to_rust_op` method would do for a Rust-emitting backend.

use crate::syntax::{BinOp, CmpOp, UnaryOp};

/// The runtime dispatch function for a binary operator when at least one
/// operand might be Float (the generic path); integer-only fast paths are
/// chosen by `expressions.rs` using the type hints from analysis instead of
/// these names.
pub fn binop_dispatch_fn(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "$add_dispatch",
        BinOp::Sub => "$sub_dispatch",
        BinOp::Mul => "$mul_dispatch",
        BinOp::Div => "$true_div_dispatch",
        BinOp::FloorDiv => "$floor_div_dispatch",
        BinOp::Mod => "$mod_dispatch",
        BinOp::Pow => "$pow_dispatch",
        BinOp::MatMul => "$matmul_dispatch",
        BinOp::BitAnd => "$bitand_dispatch",
        BinOp::BitOr => "$bitor_dispatch",
        BinOp::BitXor => "$bitxor_dispatch",
        BinOp::LShift => "$lshift_dispatch",
        BinOp::RShift => "$rshift_dispatch",
    }
}

/// The direct integer-only runtime function for a binary operator, used
/// when analysis's type hint says both operands are known ints.
pub fn binop_int_fn(op: BinOp) -> Option<&'static str> {
    Some(match op {
        BinOp::Add => "$int_add",
        BinOp::Sub => "$int_sub",
        BinOp::Mul => "$int_mul",
        BinOp::FloorDiv => "$int_div",
        BinOp::Mod => "$int_mod",
        BinOp::Pow => "$int_pow",
        _ => return None,
    })
}

pub fn binop_float_fn(op: BinOp) -> Option<&'static str> {
    Some(match op {
        BinOp::Add => "$float_add",
        BinOp::Sub => "$float_sub",
        BinOp::Mul => "$float_mul",
        BinOp::Div => "$float_div",
        _ => return None,
    })
}

pub fn unary_dispatch_fn(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "$is_false",
        UnaryOp::Neg => "$neg_dispatch",
        UnaryOp::Pos => "$pos_dispatch",
        UnaryOp::Invert => "$invert_dispatch",
    }
}

/// `==`/`!=`/ordering all route through `$value_eq`/`$value_cmp` (universal
/// equality over an `int_cmp`-style three-way comparator);
/// `is`/`is not` use WASM `ref.eq` directly since identity never needs the
/// value-equality dispatch. `in`/`not in` are handled separately in
/// expressions.rs since they dispatch on the *container* type, not a
/// generic comparator.
pub fn compare_uses_identity(op: CmpOp) -> bool {
    matches!(op, CmpOp::Is | CmpOp::IsNot)
}

pub fn compare_is_membership(op: CmpOp) -> bool {
    matches!(op, CmpOp::In | CmpOp::NotIn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_has_both_a_generic_and_an_int_fast_path() {
        assert_eq!(binop_dispatch_fn(BinOp::Add), "$add_dispatch");
        assert_eq!(binop_int_fn(BinOp::Add), Some("$int_add"));
    }

    #[test]
    fn matmul_has_no_integer_fast_path() {
        assert_eq!(binop_int_fn(BinOp::MatMul), None);
    }

    #[test]
    fn is_and_is_not_use_identity_not_value_equality() {
        assert!(compare_uses_identity(CmpOp::Is));
        assert!(compare_uses_identity(CmpOp::IsNot));
        assert!(!compare_uses_identity(CmpOp::Eq));
    }
}
