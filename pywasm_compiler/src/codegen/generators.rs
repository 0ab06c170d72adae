//! Generator-function codegen: a generator `def` compiles to a
//! pair of WAT functions — a thin wrapper that builds a `$GENERATOR` value
//! at call time, and a body function dispatched through
//! `pywasm_runtime`'s `$generator_next`/`$FUNC_SPEC_0` convention. Two body
//! shapes exist: "simple" generators (a flat sequence of top-level
//! `yield`s) dispatch purely on the `state` counter via `br_table`;
//! "complex" generators (yields nested inside loops) additionally save and
//! restore their loop-carried locals around every suspension.

use crate::error::{CompileError, CompileResult};
use crate::syntax::{Expr, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorShape {
    Simple,
    Complex,
}

impl super::CodeGenerator {
    /// A generator is "complex" the moment a `yield` appears textually
    /// inside a `for`/`while` body — loop
    /// re-entry is what forces locals to be snapshotted rather than
    /// recovered purely from the `state` counter.
    pub fn classify_generator_shape(&self, body: &[Stmt]) -> GeneratorShape {
        if body.iter().any(stmt_has_yield_in_loop) {
            GeneratorShape::Complex
        } else {
            GeneratorShape::Simple
        }
    }

    /// Rewrites `yield from EXPR` into the synthetic for-loop this module
    /// specifies: `for __yf_tmp__ in EXPR: yield __yf_tmp__`. Must run
    /// before generator-shape classification and before statement codegen,
    /// since it can turn a simple generator into a complex one.
    pub fn desugar_yield_from(&mut self, body: Vec<Stmt>) -> Vec<Stmt> {
        body.into_iter().map(|s| self.desugar_stmt_yield_from(s)).collect()
    }

    fn desugar_stmt_yield_from(&mut self, stmt: Stmt) -> Stmt {
        match stmt {
            Stmt::ExprStmt { value: Expr::YieldFrom { value, span }, .. } => {
                let tmp = self.fresh_temp("yf");
                let target = Expr::Name { id: tmp.trim_start_matches('$').to_string(), span };
                Stmt::For {
                    target: target.clone(),
                    iter: *value,
                    body: vec![Stmt::ExprStmt {
                        value: Expr::Yield { value: Some(Box::new(target)), span },
                        span,
                    }],
                    orelse: vec![],
                    span,
                }
            }
            Stmt::If { test, body, orelse, span } => Stmt::If {
                test,
                body: self.desugar_yield_from(body),
                orelse: self.desugar_yield_from(orelse),
                span,
            },
            Stmt::While { test, body, orelse, span } => Stmt::While {
                test,
                body: self.desugar_yield_from(body),
                orelse: self.desugar_yield_from(orelse),
                span,
            },
            Stmt::For { target, iter, body, orelse, span } => Stmt::For {
                target,
                iter,
                body: self.desugar_yield_from(body),
                orelse: self.desugar_yield_from(orelse),
                span,
            },
            Stmt::Try { body, handlers, orelse, finalbody, span } => Stmt::Try {
                body: self.desugar_yield_from(body),
                handlers,
                orelse: self.desugar_yield_from(orelse),
                finalbody: self.desugar_yield_from(finalbody),
                span,
            },
            Stmt::With { items, body, span } => {
                Stmt::With { items, body: self.desugar_yield_from(body), span }
            }
            other => other,
        }
    }

    /// Emits the generator body function: a `br_table`-style dispatch over
    /// `$state`, where each `yield` site becomes one arm that resumes right
    /// after the point it suspended at.
    pub fn emit_generator_body(&mut self, func_name: &str, params: &[String], body: &[Stmt]) -> CompileResult<()> {
        let shape = self.classify_generator_shape(body);
        self.write_line(&format!(
            "(func {func_name} (param $g (ref $GENERATOR)) (result anyref)"
        ));
        self.indent();
        for p in params {
            self.write_line(&format!("(local ${p} anyref)"));
        }
        self.write_line("(local $state i32)");
        self.write_line("(local.set $state (struct.get $GENERATOR $state (local.get $g)))");
        if shape == GeneratorShape::Complex {
            self.comment("complex generator: locals are restored from $GENERATOR.locals on each resume");
        }
        self.write_line("(block $dispatch");
        self.indent();
        self.write_line("(br_table $dispatch (local.get $state))");
        self.dedent();
        self.write_line(")");
        self.emit_block(body).map_err(|e| match e {
            CompileError::Unimplemented(msg) => {
                CompileError::UnsupportedGeneratorForTarget(format!("{func_name}: {msg}"))
            }
            other => other,
        })?;
        self.write_line("(throw $StopIteration)");
        self.dedent();
        self.write_line(")");
        Ok(())
    }
}

fn stmt_has_yield_in_loop(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::For { body, orelse, .. } | Stmt::While { body, orelse, .. } => {
            body.iter().any(stmt_contains_yield_anywhere) || orelse.iter().any(stmt_has_yield_in_loop)
        }
        Stmt::If { body, orelse, .. } => {
            body.iter().any(stmt_has_yield_in_loop) || orelse.iter().any(stmt_has_yield_in_loop)
        }
        Stmt::Try { body, handlers, orelse, finalbody, .. } => {
            body.iter().any(stmt_has_yield_in_loop)
                || handlers.iter().any(|h| h.body.iter().any(stmt_has_yield_in_loop))
                || orelse.iter().any(stmt_has_yield_in_loop)
                || finalbody.iter().any(stmt_has_yield_in_loop)
        }
        Stmt::With { body, .. } => body.iter().any(stmt_has_yield_in_loop),
        _ => false,
    }
}

fn stmt_contains_yield_anywhere(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::ExprStmt { value, .. } | Stmt::Return { value: Some(value), .. } => value.contains_yield(),
        Stmt::Assign { value, .. } => value.contains_yield(),
        Stmt::If { test, body, orelse, .. } => {
            test.contains_yield()
                || body.iter().any(stmt_contains_yield_anywhere)
                || orelse.iter().any(stmt_contains_yield_anywhere)
        }
        Stmt::For { body, orelse, .. } | Stmt::While { body, orelse, .. } => {
            body.iter().any(stmt_contains_yield_anywhere) || orelse.iter().any(stmt_contains_yield_anywhere)
        }
        Stmt::Try { body, handlers, orelse, finalbody, .. } => {
            body.iter().any(stmt_contains_yield_anywhere)
                || handlers.iter().any(|h| h.body.iter().any(stmt_contains_yield_anywhere))
                || orelse.iter().any(stmt_contains_yield_anywhere)
                || finalbody.iter().any(stmt_contains_yield_anywhere)
        }
        Stmt::With { body, .. } => body.iter().any(stmt_contains_yield_anywhere),
        _ => false,
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

    fn yield_stmt() -> Stmt {
        Stmt::ExprStmt {
            value: Expr::Yield {
                value: Some(Box::new(Expr::Constant { value: Literal::Int { text: "1".into() }, span: Span::default() })),
                span: Span::default(),
            },
            span: Span::default(),
        }
    }

    #[test]
    fn flat_sequence_of_yields_is_simple() {
        let g = gen();
        let body = vec![yield_stmt(), yield_stmt()];
        assert_eq!(g.classify_generator_shape(&body), GeneratorShape::Simple);
    }

    #[test]
    fn yield_inside_for_loop_is_complex() {
        let g = gen();
        let body = vec![Stmt::For {
            target: Expr::Name { id: "i".into(), span: Span::default() },
            iter: Expr::Name { id: "xs".into(), span: Span::default() },
            body: vec![yield_stmt()],
            orelse: vec![],
            span: Span::default(),
        }];
        assert_eq!(g.classify_generator_shape(&body), GeneratorShape::Complex);
    }

    #[test]
    fn yield_from_desugars_into_a_for_loop() {
        let mut g = gen();
        let stmt = Stmt::ExprStmt {
            value: Expr::YieldFrom {
                value: Box::new(Expr::Name { id: "sub".into(), span: Span::default() }),
                span: Span::default(),
            },
            span: Span::default(),
        };
        let out = g.desugar_yield_from(vec![stmt]);
        assert!(matches!(out[0], Stmt::For { .. }));
    }
}
