use serde::{Deserialize, Serialize};

use super::expr::{BinOp, Expr};
use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

impl From<AugOp> for BinOp {
    fn from(op: AugOp) -> Self {
        match op {
            AugOp::Add => BinOp::Add,
            AugOp::Sub => BinOp::Sub,
            AugOp::Mul => BinOp::Mul,
            AugOp::Div => BinOp::Div,
            AugOp::FloorDiv => BinOp::FloorDiv,
            AugOp::Mod => BinOp::Mod,
            AugOp::Pow => BinOp::Pow,
            AugOp::BitAnd => BinOp::BitAnd,
            AugOp::BitOr => BinOp::BitOr,
            AugOp::BitXor => BinOp::BitXor,
            AugOp::LShift => BinOp::LShift,
            AugOp::RShift => BinOp::RShift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptHandler {
    pub exc_type: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithItem {
    pub context_expr: Expr,
    pub optional_vars: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub is_star: bool,
    pub is_double_star: bool,
}

/// A subset of `match` pattern kinds: name binding, sequence,
/// mapping, class, or-pattern, as-pattern, star-pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchPattern {
    Capture { name: String },
    Wildcard,
    Value { expr: Expr },
    Sequence { patterns: Vec<MatchPattern> },
    Star { name: Option<String> },
    Mapping { keys: Vec<Expr>, patterns: Vec<MatchPattern> },
    Class { class: Expr, patterns: Vec<MatchPattern>, kwd_names: Vec<String>, kwd_patterns: Vec<MatchPattern> },
    Or { patterns: Vec<MatchPattern> },
    As { pattern: Option<Box<MatchPattern>>, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: MatchPattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// Every statement node kind. `async_function_def` is
/// folded into `FunctionDef { is_async: true, .. }` since both compile the
/// same way as a plain function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Assign { targets: Vec<Expr>, value: Expr, span: Span },
    AugAssign { target: Expr, op: AugOp, value: Expr, span: Span },
    AnnAssign { target: Expr, annotation: Expr, value: Option<Expr>, span: Span },
    ExprStmt { value: Expr, span: Span },
    If { test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span },
    While { test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span },
    For { target: Expr, iter: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    Return { value: Option<Expr>, span: Span },
    Pass { span: Span },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        span: Span,
    },
    With { items: Vec<WithItem>, body: Vec<Stmt>, span: Span },
    Raise { exc: Option<Expr>, cause: Option<Expr>, span: Span },
    Import { module: String, alias: Option<String>, span: Span },
    Global { names: Vec<String>, span: Span },
    Nonlocal { names: Vec<String>, span: Span },
    FunctionDef {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
        is_async: bool,
        span: Span,
    },
    ClassDef {
        name: String,
        bases: Vec<Expr>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
        span: Span,
    },
    Match { subject: Expr, cases: Vec<MatchCase>, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::AugAssign { span, .. }
            | Stmt::AnnAssign { span, .. }
            | Stmt::ExprStmt { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Return { span, .. }
            | Stmt::Pass { span }
            | Stmt::Try { span, .. }
            | Stmt::With { span, .. }
            | Stmt::Raise { span, .. }
            | Stmt::Import { span, .. }
            | Stmt::Global { span, .. }
            | Stmt::Nonlocal { span, .. }
            | Stmt::FunctionDef { span, .. }
            | Stmt::ClassDef { span, .. }
            | Stmt::Match { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aug_op_maps_onto_matching_bin_op() {
        assert_eq!(BinOp::from(AugOp::FloorDiv), BinOp::FloorDiv);
        assert_eq!(BinOp::from(AugOp::Pow), BinOp::Pow);
    }
}
