use serde::{Deserialize, Serialize};

/// Source position, carried on every node for diagnostics. The parser that
/// produces the tree this crate consumes is responsible for populating
/// these; codegen never inspects them beyond plumbing them into
/// `CompileError` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}
