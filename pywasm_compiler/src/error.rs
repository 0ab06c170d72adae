use thiserror::Error;

/// Compile-time error taxonomy: ill-formed syntax is the parser's
/// problem and never reaches this crate, but unknown loop-variable shapes
/// and AST forms this pipeline doesn't implement are fatal here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("unimplemented AST node: {0}")]
    Unimplemented(String),

    #[error("complex generator for-loop target must be a single name, found: {0}")]
    UnsupportedGeneratorForTarget(String),

    #[error("`__slots__` value must be a tuple or list of string literals")]
    MalformedSlots,

    #[error("name `{0}` referenced before assignment and not declared global/nonlocal")]
    UnresolvedName(String),

    #[error("`global`/`nonlocal` declaration for `{0}` conflicts with a parameter of the same name")]
    ConflictingScopeDeclaration(String),

    #[error("match pattern kind not supported: {0}")]
    UnsupportedMatchPattern(String),
}

pub type CompileResult<T> = Result<T, CompileError>;
