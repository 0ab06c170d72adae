//! Statement codegen: each `emit_stmt` call writes zero or more
//! full lines into the generator's buffer via `write_line`, a
//! dispatch-over-enum shape matching `AotCodeGenerator::emit_statement`.

use crate::analyze::NameClass;
use crate::error::{CompileError, CompileResult};
use crate::syntax::{Expr, Stmt};

impl super::CodeGenerator {
    pub fn emit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Assign { targets, value, .. } => self.emit_assign(targets, value),
            Stmt::AugAssign { target, op, value, .. } => self.emit_aug_assign(target, *op, value),
            Stmt::AnnAssign { target, value, .. } => self.emit_ann_assign(target, value.as_ref()),
            Stmt::ExprStmt { value, .. } => self.emit_expr_stmt(value),
            Stmt::If { test, body, orelse, .. } => self.emit_if(test, body, orelse),
            Stmt::While { test, body, orelse, .. } => self.emit_while(test, body, orelse),
            Stmt::For { target, iter, body, orelse, .. } => self.emit_for(target, iter, body, orelse),
            Stmt::Break { .. } => self.emit_break(),
            Stmt::Continue { .. } => self.emit_continue(),
            Stmt::Return { value, .. } => self.emit_return(value.as_ref()),
            Stmt::Pass { .. } => {
                self.write_line("(nop)");
                Ok(())
            }
            Stmt::Try { body, handlers, orelse, finalbody, .. } => {
                self.emit_try(body, handlers, orelse, finalbody)
            }
            Stmt::With { items, body, .. } => self.emit_with(items, body),
            Stmt::Raise { exc, cause, .. } => self.emit_raise(exc.as_ref(), cause.as_ref()),
            Stmt::Import { .. } => {
                // Modules outside the compiled unit are not modeled; a bare
                // `import` only needs to bind *some* name so later attribute
                // lookups resolve on a best-effort basis.
                self.comment("import is a no-op name binding");
                Ok(())
            }
            Stmt::Global { .. } | Stmt::Nonlocal { .. } => Ok(()),
            Stmt::FunctionDef { name, .. } => self.emit_function_def_binding(name),
            Stmt::ClassDef { name, bases, body, .. } => self.emit_class_def_binding(name, bases, body),
            Stmt::Match { subject, cases, .. } => self.emit_match(subject, cases),
        }
    }

    pub fn emit_block(&mut self, body: &[Stmt]) -> CompileResult<()> {
        for s in body {
            self.emit_stmt(s)?;
        }
        Ok(())
    }

    /// `Local` writes mirror into this function's own `$__frame__` as well
    /// as the plain wasm local, so that any closure created later in this
    /// same scope sees the current value through the env chain (`$env_get`)
    /// instead of the value the env frame was created with at function
    /// entry. Every function gets this mirror unconditionally, whether or
    /// not any closure actually captures the name — simpler than tracking
    /// per-name capture and costs only a handful of unused array slots.
    pub(super) fn emit_store_target(&mut self, target: &Expr, value_src: &str) -> CompileResult<()> {
        match target {
            Expr::Name { id, .. } => {
                let line = match self.scope.classify(id) {
                    NameClass::Local => format!("(local.set ${id} {value_src})"),
                    NameClass::Global => format!("(global.set ${id} {value_src})"),
                    _ => format!(
                        "(call $env_set (local.get $env) (i32.const {}) {value_src})",
                        env_slot_index(id)
                    ),
                };
                self.write_line(&line);
                if self.scope.classify(id) == NameClass::Local {
                    self.write_line(&format!(
                        "(call $env_set (local.get $__frame__) (i32.const {}) (local.get ${id}))",
                        env_slot_index(id)
                    ));
                }
                Ok(())
            }
            Expr::Attribute { value, attr, .. } => {
                let obj = self.emit_expr_to_string(value)?;
                self.write_line(&format!(
                    "(call $setattr (ref.cast (ref $OBJECT) {obj}) (call $load_string_literal (i32.const {}) (i32.const {})) {value_src})",
                    super::resolve::literal_data_token(attr.as_bytes()),
                    attr.len()
                ));
                Ok(())
            }
            Expr::Subscript { value, index, .. } => {
                let obj = self.emit_expr_to_string(value)?;
                let idx = self.emit_expr_to_string(index)?;
                self.write_line(&format!("(call $setitem {obj} {idx} {value_src})"));
                Ok(())
            }
            Expr::Tuple { elements, .. } | Expr::List { elements, .. } => {
                let tmp = self.fresh_temp("unpack");
                self.write_line(&format!("(local.set {tmp} {value_src})"));
                for (i, elem) in elements.iter().enumerate() {
                    if let Expr::Starred { value: inner, .. } = elem {
                        let rest = format!("(call $unpack_rest (local.get {tmp}) (i32.const {i}) (i32.const {}))", elements.len());
                        self.emit_store_target(inner, &rest)?;
                    } else {
                        let item = format!("(call $unpack_get (local.get {tmp}) (i32.const {i}))");
                        self.emit_store_target(elem, &item)?;
                    }
                }
                Ok(())
            }
            _ => Err(CompileError::Unimplemented(format!("assignment target {target:?}"))),
        }
    }

    fn emit_assign(&mut self, targets: &[Expr], value: &Expr) -> CompileResult<()> {
        let v = self.emit_expr_to_string(value)?;
        if targets.len() == 1 {
            return self.emit_store_target(&targets[0], &v);
        }
        // `a = b = expr`: evaluate once, store into every target.
        let tmp = self.fresh_temp("chained");
        self.write_line(&format!("(local.set {tmp} {v})"));
        for t in targets {
            self.emit_store_target(t, &format!("(local.get {tmp})"))?;
        }
        Ok(())
    }

    fn emit_aug_assign(&mut self, target: &Expr, op: crate::syntax::AugOp, value: &Expr) -> CompileResult<()> {
        use super::operations::{binop_dispatch_fn, binop_float_fn, binop_int_fn};
        use crate::analyze::{infer_type_hint, TypeHint};
        use crate::syntax::BinOp;

        let cur = self.emit_expr_to_string(target)?;
        let rhs = self.emit_expr_to_string(value)?;
        let binop: BinOp = op.into();
        let lhint = infer_type_hint(target);
        let rhint = infer_type_hint(value);
        let result = if lhint == TypeHint::Int && rhint == TypeHint::Int {
            binop_int_fn(binop).map(|f| format!("(call {f} {cur} {rhs})"))
        } else if lhint == TypeHint::Float || rhint == TypeHint::Float {
            binop_float_fn(binop).map(|f| format!("(call {f} {cur} {rhs})"))
        } else {
            None
        }
        .unwrap_or_else(|| format!("(call {} {cur} {rhs})", binop_dispatch_fn(binop)));
        self.emit_store_target(target, &result)
    }

    fn emit_ann_assign(&mut self, target: &Expr, value: Option<&Expr>) -> CompileResult<()> {
        // Annotations carry no runtime meaning (spec's "annotations are not
        // type-checked"); an unassigned `x: int` is a pure declaration.
        match value {
            Some(v) => self.emit_assign(std::slice::from_ref(target), v),
            None => Ok(()),
        }
    }

    fn emit_expr_stmt(&mut self, value: &Expr) -> CompileResult<()> {
        let v = self.emit_expr_to_string(value)?;
        self.write_line(&format!("(drop {v})"));
        Ok(())
    }

    fn emit_if(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> CompileResult<()> {
        let t = self.emit_expr_to_string(test)?;
        self.write_line(&format!("(if (call $is_false {t})"));
        self.indent();
        self.write_line("(then");
        self.indent();
        self.emit_block(orelse)?;
        self.dedent();
        self.write_line(")");
        self.write_line("(else");
        self.indent();
        self.emit_block(body)?;
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        Ok(())
    }

    /// `while`'s `else` clause runs only when the loop finishes by the
    /// condition going false, not via `break` — tracked with a
    /// synthetic "did we break" flag local, set just before the `br` that
    /// implements `break`.
    fn emit_while(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> CompileResult<()> {
        let broke = self.fresh_temp("broke");
        let loop_label = self.fresh_temp("loop");
        let exit_label = self.fresh_temp("exit");
        self.write_line(&format!("(local.set {broke} (i32.const 0))"));
        self.loop_labels.push((exit_label.clone(), loop_label.clone(), Some(broke.clone())));
        self.write_line(&format!("(block {exit_label}"));
        self.indent();
        self.write_line(&format!("(loop {loop_label}"));
        self.indent();
        let t = self.emit_expr_to_string(test)?;
        self.write_line(&format!("(br_if {exit_label} (call $is_false {t}))"));
        self.emit_block(body)?;
        self.write_line(&format!("(br {loop_label})"));
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        self.loop_labels.pop();
        if !orelse.is_empty() {
            self.write_line(&format!("(if (i32.eqz (local.get {broke}))"));
            self.indent();
            self.write_line("(then");
            self.indent();
            self.emit_block(orelse)?;
            self.dedent();
            self.write_line(")");
            self.dedent();
            self.write_line(")");
        }
        Ok(())
    }

    /// `for x in range(...)`: a pure counter loop with no iterator object
    /// range loops do not reserve an iterator. Everything
    /// else runs `$iter`/`$iter_next` over the reserved `__iter_<name>__`
    /// local that analysis set aside.
    fn emit_for(&mut self, target: &Expr, iter: &Expr, body: &[Stmt], orelse: &[Stmt]) -> CompileResult<()> {
        if let Some((lo, hi, step)) = self.range_call_bounds(iter)? {
            return self.emit_range_for(target, &lo, &hi, &step, body, orelse);
        }

        let name = match target {
            Expr::Name { id, .. } => id.clone(),
            _ => "unpack".to_string(),
        };
        let iter_local = format!("$__iter_{name}__");
        let iterable = self.emit_expr_to_string(iter)?;
        self.write_line(&format!("(local.set {iter_local} (call $get_iter {iterable}))"));

        let broke = self.fresh_temp("broke");
        let loop_label = self.fresh_temp("loop");
        let exit_label = self.fresh_temp("exit");
        let item = self.fresh_temp("item");
        self.write_line(&format!("(local.set {broke} (i32.const 0))"));
        self.loop_labels.push((exit_label.clone(), loop_label.clone(), Some(broke.clone())));
        self.write_line(&format!("(block {exit_label}"));
        self.indent();
        self.write_line(&format!("(loop {loop_label}"));
        self.indent();
        self.write_line(&format!(
            "(local.set {item} (call $iter_next (local.get {iter_local})))"
        ));
        self.write_line(&format!("(br_if {exit_label} (call $iter_exhausted (local.get {item})))"));
        let item_value = format!("(local.get {item})");
        self.emit_store_target(target, &item_value)?;
        self.emit_block(body)?;
        self.write_line(&format!("(br {loop_label})"));
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        self.loop_labels.pop();
        if !orelse.is_empty() {
            self.write_line(&format!("(if (i32.eqz (local.get {broke}))"));
            self.indent();
            self.write_line("(then");
            self.indent();
            self.emit_block(orelse)?;
            self.dedent();
            self.write_line(")");
            self.dedent();
            self.write_line(")");
        }
        Ok(())
    }

    fn emit_range_for(
        &mut self,
        target: &Expr,
        lo: &str,
        hi: &str,
        step: &str,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> CompileResult<()> {
        let name = match target {
            Expr::Name { id, .. } => id.clone(),
            other => return Err(CompileError::Unimplemented(format!("range() for-target {other:?}"))),
        };
        let cursor = format!("$__range_cursor_{name}__");
        let loop_label = self.fresh_temp("loop");
        let exit_label = self.fresh_temp("exit");
        let broke = self.fresh_temp("broke");
        self.write_line(&format!("(local.set {broke} (i32.const 0))"));
        self.write_line(&format!("(local.set {cursor} {lo})"));
        self.loop_labels.push((exit_label.clone(), loop_label.clone(), Some(broke.clone())));
        self.write_line(&format!("(block {exit_label}"));
        self.indent();
        self.write_line(&format!("(loop {loop_label}"));
        self.indent();
        self.write_line(&format!(
            "(br_if {exit_label} (call $range_done (local.get {cursor}) {hi} {step}))"
        ));
        self.write_line(&format!("(local.set ${name} (call $pack_int (local.get {cursor})))"));
        self.emit_block(body)?;
        self.write_line(&format!(
            "(local.set {cursor} (i64.add (local.get {cursor}) {step}))"
        ));
        self.write_line(&format!("(br {loop_label})"));
        self.dedent();
        self.write_line(")");
        self.dedent();
        self.write_line(")");
        self.loop_labels.pop();
        if !orelse.is_empty() {
            self.write_line(&format!("(if (i32.eqz (local.get {broke}))"));
            self.indent();
            self.write_line("(then");
            self.indent();
            self.emit_block(orelse)?;
            self.dedent();
            self.write_line(")");
            self.dedent();
            self.write_line(")");
        }
        Ok(())
    }

    /// Recognizes `range(n)` / `range(a, b)` / `range(a, b, c)` by shape, the
    /// same literal-call-site sniff `analyze::collector::is_range_call` uses
    /// to decide whether to reserve an iterator local.
    fn range_call_bounds(&mut self, iter: &Expr) -> CompileResult<Option<(String, String, String)>> {
        let Expr::Call { func, args, keywords, .. } = iter else { return Ok(None) };
        let Expr::Name { id, .. } = func.as_ref() else { return Ok(None) };
        if id != "range" || !keywords.is_empty() || args.is_empty() || args.len() > 3 {
            return Ok(None);
        }
        let vals: Vec<String> = args
            .iter()
            .map(|a| Ok(format!("(call $to_i64 {})", self.emit_expr_to_string(a)?)))
            .collect::<CompileResult<_>>()?;
        Ok(Some(match vals.len() {
            1 => ("(i64.const 0)".to_string(), vals[0].clone(), "(i64.const 1)".to_string()),
            2 => (vals[0].clone(), vals[1].clone(), "(i64.const 1)".to_string()),
            _ => (vals[0].clone(), vals[1].clone(), vals[2].clone()),
        }))
    }

    fn emit_break(&mut self) -> CompileResult<()> {
        let (exit_label, _, broke) = self
            .loop_labels
            .last()
            .cloned()
            .ok_or_else(|| CompileError::Unimplemented("break outside of a loop".into()))?;
        if let Some(broke) = broke {
            self.write_line(&format!("(local.set {broke} (i32.const 1))"));
        }
        self.write_line(&format!("(br {exit_label})"));
        Ok(())
    }

    fn emit_continue(&mut self) -> CompileResult<()> {
        let (_, loop_label, _) = self
            .loop_labels
            .last()
            .cloned()
            .ok_or_else(|| CompileError::Unimplemented("continue outside of a loop".into()))?;
        self.write_line(&format!("(br {loop_label})"));
        Ok(())
    }

    fn emit_return(&mut self, value: Option<&Expr>) -> CompileResult<()> {
        let v = match value {
            Some(e) => self.emit_expr_to_string(e)?,
            None => "(ref.null any)".to_string(),
        };
        self.write_line(&format!("(return {v})"));
        Ok(())
    }

    fn emit_raise(&mut self, exc: Option<&Expr>, cause: Option<&Expr>) -> CompileResult<()> {
        match exc {
            Some(e) => {
                let v = self.emit_expr_to_string(e)?;
                match cause {
                    Some(c) => {
                        let cv = self.emit_expr_to_string(c)?;
                        self.write_line(&format!("(call $raise_from {v} {cv})"));
                    }
                    None => self.write_line(&format!("(call $raise {v})")),
                }
            }
            // bare `raise` re-throws the exception currently being handled;
            // the enclosing except clause stashes it into `$__current_exc__`.
            None => self.write_line("(call $raise (local.get $__current_exc__))"),
        }
        Ok(())
    }

    fn emit_function_def_binding(&mut self, name: &str) -> CompileResult<()> {
        // The function body itself is lifted to a top-level WAT function by
        // codegen::program's pre-pass; a nested `def` only needs to bind the
        // resulting closure value into this scope under its name.
        self.write_line(&format!(
            "(local.set ${name} (call $make_closure (local.get $__frame__) (i32.const __FUNC_INDEX_{name}__)))"
        ));
        Ok(())
    }

    /// Builds the class's method chain and `$CLASS` value at the point the
    /// `class` statement executes, matching Python's own class-statement
    /// execution order, then binds the name to the freshly built class.
    fn emit_class_def_binding(&mut self, name: &str, bases: &[Expr], body: &[Stmt]) -> CompileResult<()> {
        let plan = self.plan_class(name, bases, body)?;
        self.emit_class_init(&plan)?;
        self.write_line(&format!(
            "(local.set ${name} (global.get $__class_{name}__))"
        ));
        Ok(())
    }
}

fn env_slot_index(name: &str) -> String {
    format!("__ENV_SLOT_{name}__")
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

    fn int_lit(text: &str) -> Expr {
        Expr::Constant { value: Literal::Int { text: text.into() }, span: Span::default() }
    }

    #[test]
    fn pass_emits_nop() {
        let mut g = gen();
        g.emit_stmt(&Stmt::Pass { span: Span::default() }).unwrap();
        assert_eq!(g.as_str(), "(nop)\n");
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let mut g = gen();
        assert!(g.emit_break().is_err());
    }

    #[test]
    fn break_inside_loop_branches_to_exit_label() {
        let mut g = gen();
        g.loop_labels.push(("$exit_0".into(), "$loop_0".into(), None));
        g.emit_break().unwrap();
        assert_eq!(g.as_str(), "(br $exit_0)\n");
    }

    #[test]
    fn break_inside_while_sets_broke_flag_before_branching() {
        let mut g = gen();
        g.emit_stmt(&Stmt::While {
            test: name("cond"),
            body: vec![Stmt::Break { span: Span::default() }],
            orelse: vec![Stmt::Pass { span: Span::default() }],
            span: Span::default(),
        })
        .unwrap();
        assert!(g.as_str().contains("(i32.const 1)"));
    }

    #[test]
    fn range_for_loop_reserves_no_iterator_local() {
        let mut scope = ScopeInfo::default();
        scope.locals.insert("i".into());
        let mut g = CodeGenerator::new(CodegenConfig::default(), scope);
        let iter = Expr::Call {
            func: Box::new(name("range")),
            args: vec![int_lit("10")],
            keywords: vec![],
            span: Span::default(),
        };
        g.emit_stmt(&Stmt::For {
            target: name("i"),
            iter,
            body: vec![Stmt::Pass { span: Span::default() }],
            orelse: vec![],
            span: Span::default(),
        })
        .unwrap();
        assert!(!g.as_str().contains("$get_iter"));
        assert!(g.as_str().contains("$range_done"));
    }

    #[test]
    fn assign_to_attribute_uses_setattr() {
        let mut g = gen();
        let target = Expr::Attribute { value: Box::new(name("obj")), attr: "x".into(), span: Span::default() };
        g.emit_stmt(&Stmt::Assign { targets: vec![target], value: int_lit("1"), span: Span::default() })
            .unwrap();
        assert!(g.as_str().contains("$setattr"));
    }
}
