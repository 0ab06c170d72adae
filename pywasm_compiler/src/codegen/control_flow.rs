//! `try`/`except`/`finally` and `with` codegen: both
//! lower to the `try_table` skeleton `pywasm_runtime::exceptions` documents,
//! with clause bodies spliced in here since only the compiler knows what a
//! given `except`/`with` body actually does.

use crate::error::CompileResult;
use crate::syntax::{Expr, ExceptHandler, Stmt, WithItem};

impl super::CodeGenerator {
    /// Every `except` clause is checked in source order via
    /// `$exception_matches`; an unmatched exception falls through to
    /// `(rethrow $handler)`. `finally` runs on every exit path — normal,
    /// `except`-handled, and re-thrown — by being emitted once at the join
    /// point rather than duplicated per path.
    pub fn emit_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        orelse: &[Stmt],
        finalbody: &[Stmt],
    ) -> CompileResult<()> {
        let exn = self.fresh_temp("exn");
        let done = self.fresh_temp("try_done");
        let handled = self.fresh_temp("handled");

        self.write_line(&format!("(local.set {handled} (i32.const 0))"));
        self.write_line(&format!("(block {done}"));
        self.indent();
        self.write_line(&format!("(local {exn} (ref null exn))"));
        self.write_line("(block $try_body (result i32)");
        self.indent();
        self.write_line("(try_table (catch $PyException 0)");
        self.indent();
        self.emit_block(body)?;
        if !orelse.is_empty() {
            self.emit_block(orelse)?;
        }
        self.write_line("(br $try_body (i32.const 0))");
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");

        if !handlers.is_empty() {
            self.write_line(&format!("(local.set $__current_exc__ (local.get {exn}))"));
            for handler in handlers {
                self.emit_except_handler(handler, &handled)?;
            }
            self.write_line(&format!("(if (i32.eqz (local.get {handled}))"));
            self.indent();
            self.write_line(&format!("(then (rethrow {exn}))"));
            self.dedent();
            self.write_line(")");
        }
        self.dedent();
        self.write_line(")");

        if !finalbody.is_empty() {
            self.comment("finally: runs on every exit path from this try");
            self.emit_block(finalbody)?;
        }
        Ok(())
    }

    fn emit_except_handler(&mut self, handler: &ExceptHandler, handled: &str) -> CompileResult<()> {
        let exc_value = "(call $exception_from_exnref (local.get $__current_exc__))".to_string();
        let matches = match &handler.exc_type {
            Some(ty) => {
                let t = self.emit_expr_to_string(ty)?;
                format!(
                    "(i32.and (i32.eqz (local.get {handled})) (call $exception_matches {exc_value} (call $exception_type_name {t})))"
                )
            }
            // a bare `except:` matches anything not yet handled.
            None => format!("(i32.eqz (local.get {handled}))"),
        };
        self.write_line(&format!("(if {matches}"));
        self.indent();
        self.write_line("(then");
        self.indent();
        if let Some(name) = &handler.name {
            self.write_line(&format!("(local.set ${name} {exc_value})"));
        }
        self.emit_block(&handler.body)?;
        self.write_line(&format!("(local.set {handled} (i32.const 1))"));
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        Ok(())
    }

    /// `with EXPR as NAME: BODY` calls `__enter__` once up front and
    /// `__exit__` exactly once on every exit path (normal, `break`/
    /// `continue`/`return`, or exception) by wrapping the body in its own
    /// `try_table` whose handler always runs `__exit__` before re-raising.
    pub fn emit_with(&mut self, items: &[WithItem], body: &[Stmt]) -> CompileResult<()> {
        self.emit_with_items(items, 0, body)
    }

    fn emit_with_items(&mut self, items: &[WithItem], index: usize, body: &[Stmt]) -> CompileResult<()> {
        let Some(item) = items.get(index) else {
            return self.emit_block(body);
        };
        let ctx = self.emit_expr_to_string(&item.context_expr)?;
        let ctx_tmp = self.fresh_temp("with_ctx");
        self.write_line(&format!("(local.set {ctx_tmp} {ctx})"));
        self.write_line(&format!(
            "(drop (call $call_method (local.get {ctx_tmp}) (call $load_string_literal (i32.const {}) (i32.const 8))))",
            super::resolve::literal_data_token(b"__enter__")
        ));
        if let Some(target) = &item.optional_vars {
            self.emit_store_target(target, &format!("(local.get {ctx_tmp})"))?;
        }
        let exn = self.fresh_temp("with_exn");
        self.write_line(&format!("(local {exn} (ref null exn))"));
        self.write_line("(block $with_body (result i32)");
        self.indent();
        self.write_line("(try_table (catch $PyException 0)");
        self.indent();
        self.emit_with_items(items, index + 1, body)?;
        self.write_line("(br $with_body (i32.const 0))");
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        self.write_line(&format!(
            "(drop (call $call_method (local.get {ctx_tmp}) (call $load_string_literal (i32.const {}) (i32.const 7))))",
            super::resolve::literal_data_token(b"__exit__")
        ));
        self.write_line(&format!("(if (ref.is_null (local.get {exn})) (then) (else (rethrow {exn})))"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ScopeInfo;
    use crate::codegen::{CodeGenerator, CodegenConfig};
    use crate::syntax::{Literal, Span};

    fn gen() -> CodeGenerator {
        CodeGenerator::new(CodegenConfig::default(), ScopeInfo::default())
    }

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.into(), span: Span::default() }
    }

    #[test]
    fn try_with_no_handlers_still_runs_finally() {
        let mut g = gen();
        g.emit_try(
            &[Stmt::Pass { span: Span::default() }],
            &[],
            &[],
            &[Stmt::ExprStmt {
                value: Expr::Constant { value: Literal::Ellipsis, span: Span::default() },
                span: Span::default(),
            }],
        )
        .unwrap();
        assert!(g.as_str().contains("finally"));
    }

    #[test]
    fn unmatched_exception_rethrows() {
        let mut g = gen();
        let handler = ExceptHandler {
            exc_type: Some(name("ValueError")),
            name: None,
            body: vec![Stmt::Pass { span: Span::default() }],
        };
        g.emit_try(&[Stmt::Pass { span: Span::default() }], &[handler], &[], &[]).unwrap();
        assert!(g.as_str().contains("rethrow"));
    }

    #[test]
    fn with_statement_calls_exit_before_rethrow() {
        let mut g = gen();
        let item = WithItem { context_expr: name("ctx"), optional_vars: None };
        g.emit_with(&[item], &[Stmt::Pass { span: Span::default() }]).unwrap();
        let out = g.as_str();
        let exit_pos = out.rfind("call_method").unwrap();
        let rethrow_pos = out.find("rethrow").unwrap();
        assert!(exit_pos < rethrow_pos);
    }
}
