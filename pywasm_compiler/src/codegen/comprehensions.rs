//! Comprehension codegen: list/set/dict/generator
//! comprehensions all lower to an accumulator built up in a loop, using the
//! numbered `__comp_N_*` locals `analyze::collector` reserved so nested
//! comprehensions never collide on names.

use crate::error::CompileResult;
use crate::syntax::{Comprehension, Expr};

impl super::CodeGenerator {
    pub fn emit_comprehension(&mut self, expr: &Expr) -> CompileResult<String> {
        match expr {
            Expr::ListComp { element, generators, span } => {
                self.emit_comprehension_loop(element, None, generators, "$list_new", "$list_append", *span)
            }
            Expr::SetComp { element, generators, span } => {
                self.emit_comprehension_loop(element, None, generators, "$set_new", "$set_add", *span)
            }
            Expr::DictComp { key, value, generators, span } => {
                self.emit_dict_comprehension_loop(key, value, generators, *span)
            }
            Expr::GeneratorExp { element, generators, span } => {
                // Without a lazy-evaluation pipeline, a generator expression
                // is eagerly materialized into a list, matching the
                // "generator expressions degrade to eager lists" note.
                self.emit_comprehension_loop(element, None, generators, "$list_new", "$list_append", *span)
            }
            _ => unreachable!("emit_comprehension only called for comprehension expr kinds"),
        }
    }

    fn emit_comprehension_loop(
        &mut self,
        element: &Expr,
        _unused: Option<()>,
        generators: &[Comprehension],
        new_fn: &str,
        add_fn: &str,
        _span: crate::syntax::Span,
    ) -> CompileResult<String> {
        let result = self.fresh_temp("comp_result");
        self.write_line(&format!("(local.set {result} (call {new_fn}))"));
        self.emit_generator_chain(generators, 0, &mut |gen_self| {
            let v = gen_self.emit_expr_to_string(element)?;
            gen_self.write_line(&format!("(drop (call {add_fn} (local.get {result}) {v}))"));
            Ok(())
        })?;
        Ok(format!("(local.get {result})"))
    }

    fn emit_dict_comprehension_loop(
        &mut self,
        key: &Expr,
        value: &Expr,
        generators: &[Comprehension],
        _span: crate::syntax::Span,
    ) -> CompileResult<String> {
        let result = self.fresh_temp("comp_result");
        self.write_line(&format!("(local.set {result} (call $dict_new))"));
        self.emit_generator_chain(generators, 0, &mut |gen_self| {
            let k = gen_self.emit_expr_to_string(key)?;
            let v = gen_self.emit_expr_to_string(value)?;
            gen_self.write_line(&format!("(call $dict_set (local.get {result}) {k} {v})"));
            Ok(())
        })?;
        Ok(format!("(local.get {result})"))
    }

    /// Emits the nested `for`/`if` loop chain a multi-clause comprehension
    /// describes (`[x for xs in a for x in xs if cond]`), invoking `body`
    /// once per innermost iteration — plain recursive descent over the
    /// clause list, one loop nested inside the last.
    fn emit_generator_chain(
        &mut self,
        generators: &[Comprehension],
        index: usize,
        body: &mut dyn FnMut(&mut Self) -> CompileResult<()>,
    ) -> CompileResult<()> {
        let Some(comp) = generators.get(index) else {
            return body(self);
        };
        let iter_local = self.fresh_temp("comp_iter");
        let item = self.fresh_temp("comp_item");
        let loop_label = self.fresh_temp("comp_loop");
        let exit_label = self.fresh_temp("comp_exit");
        let iterable = self.emit_expr_to_string(&comp.iter)?;
        self.write_line(&format!("(local.set {iter_local} (call $get_iter {iterable}))"));
        self.write_line(&format!("(block {exit_label}"));
        self.indent();
        self.write_line(&format!("(loop {loop_label}"));
        self.indent();
        self.write_line(&format!("(local.set {item} (call $iter_next (local.get {iter_local})))"));
        self.write_line(&format!("(br_if {exit_label} (call $iter_exhausted (local.get {item})))"));
        self.emit_store_target(&comp.target, &format!("(local.get {item})"))?;

        if comp.ifs.is_empty() {
            self.emit_generator_chain(generators, index + 1, body)?;
        } else {
            let mut guard = "(i32.const 1)".to_string();
            for cond in &comp.ifs {
                let c = self.emit_expr_to_string(cond)?;
                guard = format!("(i32.and {guard} (i32.eqz (call $is_false {c})))");
            }
            self.write_line(&format!("(if {guard}"));
            self.indent();
            self.write_line("(then");
            self.indent();
            self.emit_generator_chain(generators, index + 1, body)?;
            self.dedent();
            self.write_line(")");
            self.dedent();
            self.write_line(")");
        }

        self.write_line(&format!("(br {loop_label})"));
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
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
        let mut scope = ScopeInfo::default();
        scope.locals.insert("x".into());
        CodeGenerator::new(CodegenConfig::default(), scope)
    }

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.into(), span: Span::default() }
    }

    #[test]
    fn list_comp_accumulates_via_list_append() {
        let mut g = gen();
        let comp = Comprehension { target: name("x"), iter: name("xs"), ifs: vec![], is_async: false };
        let e = Expr::ListComp { element: Box::new(name("x")), generators: vec![comp], span: Span::default() };
        let out = g.emit_expr_to_string(&e).unwrap();
        assert!(g.as_str().contains("$list_append"));
        assert!(out.contains("comp_result"));
    }

    #[test]
    fn comprehension_if_clause_guards_the_body() {
        let mut g = gen();
        let cond = Expr::Constant { value: Literal::Bool { value: true }, span: Span::default() };
        let comp = Comprehension { target: name("x"), iter: name("xs"), ifs: vec![cond], is_async: false };
        let e = Expr::SetComp { element: Box::new(name("x")), generators: vec![comp], span: Span::default() };
        g.emit_expr_to_string(&e).unwrap();
        assert!(g.as_str().contains("i32.and"));
    }

    #[test]
    fn generator_expression_eagerly_materializes_as_a_list() {
        let mut g = gen();
        let comp = Comprehension { target: name("x"), iter: name("xs"), ifs: vec![], is_async: false };
        let e = Expr::GeneratorExp { element: Box::new(name("x")), generators: vec![comp], span: Span::default() };
        g.emit_expr_to_string(&e).unwrap();
        assert!(g.as_str().contains("$list_append"));
    }
}
