use thiserror::Error;

/// Failures that can occur while assembling the runtime library text itself,
/// as opposed to errors in the program being compiled (those live in
/// `pywasm_compiler::error::CompileError`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("host bridge import `{0}` was requested but is not defined")]
    UnknownImport(String),

    #[error("runtime section `{0}` was assembled twice")]
    DuplicateSection(&'static str),

    #[error("function arity {0} has no specialized call type ($FUNC_SPEC_0..=$FUNC_SPEC_5)")]
    UnsupportedSpecializedArity(u32),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
