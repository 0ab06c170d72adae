//! Code generation: walks the syntax tree emitting
//! textual WAT into a per-function string buffer, the same
//! `write_line`/`indent`/`dedent` plus a family of `emit_*` methods split
//! across submodules by concern that `AotCodeGenerator` uses to emit
//! Rust text.

pub mod classes;
pub mod comprehensions;
pub mod control_flow;
pub mod expressions;
pub mod generators;
pub mod match_stmt;
pub mod operations;
pub mod program;
pub mod resolve;
pub mod statements;

use crate::analyze::ScopeInfo;
use crate::syntax::Expr;

/// A lambda encountered during codegen, queued up for compilation as its own
/// top-level function once the enclosing function body finishes emitting —
/// mirrors how `codegen::program` already lifts nested `def`s, but lambdas
/// are only discovered while walking expressions, not in the statement
/// pre-pass, so they're collected lazily instead.
#[derive(Debug, Clone)]
pub struct PendingLambda {
    pub name: String,
    pub params: Vec<String>,
    pub defaults: Vec<Expr>,
    pub body: Expr,
}

/// Controls pretty-printing and which runtime-checked vs. trusted-input
/// code paths get emitted.
#[derive(Debug, Clone)]
pub struct CodegenConfig {
    pub indent: String,
    pub emit_comments: bool,
    pub runtime_checks: bool,
    pub host_bridge: pywasm_runtime::HostBridgeOptions,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            emit_comments: false,
            runtime_checks: true,
            host_bridge: pywasm_runtime::HostBridgeOptions::default(),
        }
    }
}

/// Per-function codegen state: the string buffer, indentation, a counter
/// for synthetic locals/labels (e.g. comprehension accumulators, `finally`
/// re-throw locals), and the current scope's `ScopeInfo` for name
/// resolution.
#[derive(Debug)]
pub struct CodeGenerator {
    pub config: CodegenConfig,
    buf: String,
    indent_level: usize,
    pub scope: ScopeInfo,
    temp_counter: usize,
    pub loop_labels: Vec<(String, String, Option<String>)>, // (break_label, continue_label, broke_flag_local)
    lambda_counter: usize,
    pub pending_lambdas: Vec<PendingLambda>,
}

impl CodeGenerator {
    pub fn new(config: CodegenConfig, scope: ScopeInfo) -> Self {
        Self {
            config,
            buf: String::new(),
            indent_level: 0,
            scope,
            temp_counter: 0,
            loop_labels: Vec::new(),
            lambda_counter: 0,
            pending_lambdas: Vec::new(),
        }
    }

    /// Queues a lambda body for compilation as its own top-level function
    /// and returns the synthetic name the caller will find it under in the
    /// function table once `codegen::program` drains `pending_lambdas`.
    pub fn next_lambda_name(&mut self, params: &[String], defaults: &[Expr], body: &Expr) -> String {
        let name = format!("__lambda_{}__", self.lambda_counter);
        self.lambda_counter += 1;
        self.pending_lambdas.push(PendingLambda {
            name: name.clone(),
            params: params.to_vec(),
            defaults: defaults.to_vec(),
            body: body.clone(),
        });
        name
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn current_indent(&self) -> String {
        self.config.indent.repeat(self.indent_level)
    }

    pub fn write_line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
        } else {
            self.buf.push_str(&self.current_indent());
            self.buf.push_str(text);
            self.buf.push('\n');
        }
    }

    pub fn blank_line(&mut self) {
        self.buf.push('\n');
    }

    pub fn comment(&mut self, text: &str) {
        if self.config.emit_comments {
            self.write_line(&format!(";; {text}"));
        }
    }

    pub fn fresh_temp(&mut self, prefix: &str) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("${prefix}_{n}")
    }

    pub fn finish(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_line_respects_indent_level() {
        let mut g = CodeGenerator::new(CodegenConfig::default(), ScopeInfo::default());
        g.indent();
        g.write_line("(nop)");
        assert_eq!(g.finish(), "  (nop)\n");
    }

    #[test]
    fn comments_are_suppressed_by_default() {
        let mut g = CodeGenerator::new(CodegenConfig::default(), ScopeInfo::default());
        g.comment("hello");
        assert_eq!(g.finish(), "");
    }

    #[test]
    fn fresh_temp_names_are_unique() {
        let mut g = CodeGenerator::new(CodegenConfig::default(), ScopeInfo::default());
        let a = g.fresh_temp("t");
        let b = g.fresh_temp("t");
        assert_ne!(a, b);
    }
}
