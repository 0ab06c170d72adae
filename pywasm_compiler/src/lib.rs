//! Ahead-of-time compiler from a syntax tree to WebAssembly Text,
//! split by pipeline stage: `syntax` holds the node types a front end
//! hands us, `analyze` is the static pre-pass, `codegen` walks the tree
//! into WAT text, embedding `pywasm_runtime`'s library functions into
//! the assembled module.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod analyze;
pub mod codegen;
pub mod error;
pub mod syntax;

pub use error::{CompileError, CompileResult};

use pywasm_runtime::HostBridgeOptions;
use syntax::Module;

/// Compiles a whole module to WAT text using the given host-bridge
/// configuration. This is the entry point `bin/pywasmc.rs` calls; tests
/// that only need one function's output should call into `codegen`
/// directly instead of paying for a full module assembly.
pub fn compile(module: &Module, host: HostBridgeOptions) -> CompileResult<String> {
    codegen::program::compile_module(module, host).map(|compiled| compiled.wat_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiling_an_empty_module_produces_a_wat_module() {
        let module = Module { body: vec![] };
        let wat = compile(&module, HostBridgeOptions::default()).unwrap();
        assert!(wat.starts_with("(module"));
        assert!(wat.trim_end().ends_with(')'));
    }
}
