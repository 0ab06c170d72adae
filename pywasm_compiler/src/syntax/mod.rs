//! The syntax tree this compiler consumes. The parser that produces it is
//! an external collaborator; this module only defines the node
//! shapes and the handful of tree-walking queries analysis needs.

pub mod expr;
pub mod literal;
pub mod span;
pub mod stmt;

pub use expr::{BinOp, BoolOp, CmpOp, Comprehension, Expr, FStringPart, Keyword, UnaryOp};
pub use literal::Literal;
pub use span::Span;
pub use stmt::{AugOp, ExceptHandler, MatchCase, MatchPattern, Param, Stmt, WithItem};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}
