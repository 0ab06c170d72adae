use serde::{Deserialize, Serialize};

use super::literal::Literal;
use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

/// One formatted-value or literal-text part of an f-string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FStringPart {
    Literal { text: String },
    Formatted { value: Box<Expr>, format_spec: Option<String> },
}

/// Every expression node kind the parser produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Constant { value: Literal, span: Span },
    Name { id: String, span: Span },
    UnaryOp { op: UnaryOp, operand: Box<Expr>, span: Span },
    BinOp { left: Box<Expr>, op: BinOp, right: Box<Expr>, span: Span },
    BoolOp { op: BoolOp, values: Vec<Expr>, span: Span },
    Compare { left: Box<Expr>, ops: Vec<CmpOp>, comparators: Vec<Expr>, span: Span },
    IfExp { test: Box<Expr>, body: Box<Expr>, orelse: Box<Expr>, span: Span },
    Attribute { value: Box<Expr>, attr: String, span: Span },
    Subscript { value: Box<Expr>, index: Box<Expr>, span: Span },
    Slice { lower: Option<Box<Expr>>, upper: Option<Box<Expr>>, step: Option<Box<Expr>>, span: Span },
    Call { func: Box<Expr>, args: Vec<Expr>, keywords: Vec<Keyword>, span: Span },
    Lambda { params: Vec<String>, defaults: Vec<Expr>, body: Box<Expr>, span: Span },
    List { elements: Vec<Expr>, span: Span },
    Set { elements: Vec<Expr>, span: Span },
    Dict { keys: Vec<Option<Expr>>, values: Vec<Expr>, span: Span },
    Tuple { elements: Vec<Expr>, span: Span },
    FString { parts: Vec<FStringPart>, span: Span },
    ListComp { element: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    SetComp { element: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    DictComp { key: Box<Expr>, value: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    GeneratorExp { element: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    Starred { value: Box<Expr>, span: Span },
    Yield { value: Option<Box<Expr>>, span: Span },
    YieldFrom { value: Box<Expr>, span: Span },
    NamedExpr { target: String, value: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Constant { span, .. }
            | Expr::Name { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::BinOp { span, .. }
            | Expr::BoolOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::IfExp { span, .. }
            | Expr::Attribute { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Call { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::List { span, .. }
            | Expr::Set { span, .. }
            | Expr::Dict { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::FString { span, .. }
            | Expr::ListComp { span, .. }
            | Expr::SetComp { span, .. }
            | Expr::DictComp { span, .. }
            | Expr::GeneratorExp { span, .. }
            | Expr::Starred { span, .. }
            | Expr::Yield { span, .. }
            | Expr::YieldFrom { span, .. }
            | Expr::NamedExpr { span, .. } => *span,
        }
    }

    /// Whether the subtree contains a `yield`/`yield from`, not recursing
    /// into nested function/lambda/class bodies — the exact generator-
    /// detection rule analysis uses.
    pub fn contains_yield(&self) -> bool {
        match self {
            Expr::Yield { .. } | Expr::YieldFrom { .. } => true,
            Expr::Lambda { .. } => false,
            Expr::UnaryOp { operand, .. } => operand.contains_yield(),
            Expr::BinOp { left, right, .. } => left.contains_yield() || right.contains_yield(),
            Expr::BoolOp { values, .. } => values.iter().any(Expr::contains_yield),
            Expr::Compare { left, comparators, .. } => {
                left.contains_yield() || comparators.iter().any(Expr::contains_yield)
            }
            Expr::IfExp { test, body, orelse, .. } => {
                test.contains_yield() || body.contains_yield() || orelse.contains_yield()
            }
            Expr::Attribute { value, .. } => value.contains_yield(),
            Expr::Subscript { value, index, .. } => value.contains_yield() || index.contains_yield(),
            Expr::Slice { lower, upper, step, .. } => {
                [lower, upper, step].into_iter().flatten().any(|e| e.contains_yield())
            }
            Expr::Call { func, args, keywords, .. } => {
                func.contains_yield()
                    || args.iter().any(Expr::contains_yield)
                    || keywords.iter().any(|k| k.value.contains_yield())
            }
            Expr::List { elements, .. } | Expr::Set { elements, .. } | Expr::Tuple { elements, .. } => {
                elements.iter().any(Expr::contains_yield)
            }
            Expr::Dict { keys, values, .. } => {
                keys.iter().flatten().any(Expr::contains_yield) || values.iter().any(Expr::contains_yield)
            }
            Expr::FString { parts, .. } => parts.iter().any(|p| match p {
                FStringPart::Literal { .. } => false,
                FStringPart::Formatted { value, .. } => value.contains_yield(),
            }),
            Expr::ListComp { element, generators, .. }
            | Expr::SetComp { element, generators, .. }
            | Expr::GeneratorExp { element, generators, .. } => {
                element.contains_yield() || generators.iter().any(comprehension_contains_yield)
            }
            Expr::DictComp { key, value, generators, .. } => {
                key.contains_yield() || value.contains_yield() || generators.iter().any(comprehension_contains_yield)
            }
            Expr::Starred { value, .. } => value.contains_yield(),
            Expr::NamedExpr { value, .. } => value.contains_yield(),
            Expr::Constant { .. } | Expr::Name { .. } => false,
        }
    }
}

fn comprehension_contains_yield(c: &Comprehension) -> bool {
    c.iter.contains_yield() || c.ifs.iter().any(Expr::contains_yield)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.to_string(), span: Span::default() }
    }

    #[test]
    fn yield_is_detected_through_binop() {
        let e = Expr::BinOp {
            left: Box::new(Expr::Yield { value: None, span: Span::default() }),
            op: BinOp::Add,
            right: Box::new(name("x")),
            span: Span::default(),
        };
        assert!(e.contains_yield());
    }

    #[test]
    fn yield_inside_nested_lambda_does_not_count() {
        let e = Expr::Lambda {
            params: vec![],
            defaults: vec![],
            body: Box::new(Expr::Yield { value: None, span: Span::default() }),
            span: Span::default(),
        };
        assert!(!e.contains_yield());
    }

    #[test]
    fn plain_name_has_no_yield() {
        assert!(!name("x").contains_yield());
    }
}
