//! Cheap structural type inference: used only to pick a faster
//! codegen path (e.g. a known-int loop counter skips the generic numeric
//! dispatch), never load-bearing for correctness — codegen must still
//! produce correct output if every hint comes back `Unknown`.

use crate::syntax::{BinOp, Expr, Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    String,
    Float,
    Bool,
    Int,
    List,
    Tuple,
    Dict,
    Unknown,
}

pub fn infer(expr: &Expr) -> TypeHint {
    match expr {
        Expr::Constant { value, .. } => match value {
            Literal::Str { .. } => TypeHint::String,
            Literal::Float { .. } => TypeHint::Float,
            Literal::Bool { .. } => TypeHint::Bool,
            Literal::Int { .. } => TypeHint::Int,
            Literal::Bytes { .. } | Literal::None | Literal::Ellipsis => TypeHint::Unknown,
        },
        Expr::List { .. } | Expr::ListComp { .. } => TypeHint::List,
        Expr::Tuple { .. } => TypeHint::Tuple,
        Expr::Dict { .. } | Expr::DictComp { .. } => TypeHint::Dict,
        Expr::FString { .. } => TypeHint::String,
        Expr::UnaryOp { operand, .. } => infer(operand),
        Expr::BinOp { left, op, right, .. } => infer_binop(left, *op, right),
        Expr::BoolOp { .. } | Expr::Compare { .. } => TypeHint::Bool,
        Expr::IfExp { body, orelse, .. } => {
            let b = infer(body);
            if b == infer(orelse) {
                b
            } else {
                TypeHint::Unknown
            }
        }
        Expr::Call { func, .. } => infer_call(func),
        _ => TypeHint::Unknown,
    }
}

fn infer_binop(left: &Expr, op: BinOp, right: &Expr) -> TypeHint {
    let (l, r) = (infer(left), infer(right));
    match op {
        BinOp::Add if l == TypeHint::String && r == TypeHint::String => TypeHint::String,
        BinOp::Add if l == TypeHint::List && r == TypeHint::List => TypeHint::List,
        BinOp::Add | BinOp::Sub | BinOp::Mul => {
            if l == TypeHint::Float || r == TypeHint::Float {
                TypeHint::Float
            } else if l == TypeHint::Int && r == TypeHint::Int {
                TypeHint::Int
            } else {
                TypeHint::Unknown
            }
        }
        BinOp::Div => TypeHint::Float,
        BinOp::FloorDiv | BinOp::Mod if l == TypeHint::Int && r == TypeHint::Int => TypeHint::Int,
        _ => TypeHint::Unknown,
    }
}

fn infer_call(func: &Expr) -> TypeHint {
    match func {
        Expr::Name { id, .. } => match id.as_str() {
            "str" => TypeHint::String,
            "float" => TypeHint::Float,
            "bool" => TypeHint::Bool,
            "int" | "len" | "ord" => TypeHint::Int,
            "list" | "sorted" => TypeHint::List,
            "tuple" => TypeHint::Tuple,
            "dict" => TypeHint::Dict,
            _ => TypeHint::Unknown,
        },
        _ => TypeHint::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn int_lit(text: &str) -> Expr {
        Expr::Constant { value: Literal::Int { text: text.into() }, span: Span::default() }
    }

    fn float_lit(v: f64) -> Expr {
        Expr::Constant { value: Literal::Float { value: v }, span: Span::default() }
    }

    #[test]
    fn int_plus_int_is_int() {
        let e = Expr::BinOp { left: Box::new(int_lit("1")), op: BinOp::Add, right: Box::new(int_lit("2")), span: Span::default() };
        assert_eq!(infer(&e), TypeHint::Int);
    }

    #[test]
    fn int_plus_float_promotes_to_float() {
        let e = Expr::BinOp { left: Box::new(int_lit("1")), op: BinOp::Add, right: Box::new(float_lit(2.0)), span: Span::default() };
        assert_eq!(infer(&e), TypeHint::Float);
    }

    #[test]
    fn true_division_is_always_float() {
        let e = Expr::BinOp { left: Box::new(int_lit("4")), op: BinOp::Div, right: Box::new(int_lit("2")), span: Span::default() };
        assert_eq!(infer(&e), TypeHint::Float);
    }

    #[test]
    fn unknown_call_target_is_unknown() {
        let e = Expr::Call { func: Box::new(Expr::Name { id: "mystery".into(), span: Span::default() }), args: vec![], keywords: vec![], span: Span::default() };
        assert_eq!(infer(&e), TypeHint::Unknown);
    }
}
