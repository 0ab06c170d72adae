//! `match` statement codegen: patterns decompose into the same
//! `$subscript`/`$getattr`/`ref.test`/`$value_eq` primitives expression
//! codegen already uses — no dedicated pattern-matching runtime type is
//! introduced. Cases are tried in source order; the first whose pattern
//! test *and* guard both pass wins, matching normal Python `match`
//! fall-through semantics.

use crate::error::{CompileError, CompileResult};
use crate::syntax::{Expr, MatchCase, MatchPattern};

impl super::CodeGenerator {
    pub fn emit_match(&mut self, subject: &Expr, cases: &[MatchCase]) -> CompileResult<()> {
        let subj = self.emit_expr_to_string(subject)?;
        let subj_tmp = self.fresh_temp("match_subject");
        self.write_line(&format!("(local.set {subj_tmp} {subj})"));
        let subj_ref = format!("(local.get {subj_tmp})");
        let matched = self.fresh_temp("match_done");
        self.write_line(&format!("(local.set {matched} (i32.const 0))"));

        for case in cases {
            let test = self.emit_pattern_test(&case.pattern, &subj_ref)?;
            self.write_line(&format!(
                "(if (i32.and (i32.eqz (local.get {matched})) {test})"
            ));
            self.indent();
            self.write_line("(then");
            self.indent();
            self.emit_pattern_bind(&case.pattern, &subj_ref)?;
            match &case.guard {
                Some(guard) => {
                    let g = self.emit_expr_to_string(guard)?;
                    self.write_line(&format!("(if (i32.eqz (call $is_false {g}))"));
                    self.indent();
                    self.write_line("(then");
                    self.indent();
                    self.emit_block(&case.body)?;
                    self.write_line(&format!("(local.set {matched} (i32.const 1))"));
                    self.dedent();
                    self.write_line(")");
                    self.dedent();
                    self.write_line(")");
                }
                None => {
                    self.emit_block(&case.body)?;
                    self.write_line(&format!("(local.set {matched} (i32.const 1))"));
                }
            }
            self.dedent();
            self.write_line(")");
            self.dedent();
            self.write_line(")");
        }
        Ok(())
    }

    fn emit_pattern_test(&mut self, pattern: &MatchPattern, subj: &str) -> CompileResult<String> {
        Ok(match pattern {
            MatchPattern::Capture { .. } | MatchPattern::Wildcard | MatchPattern::Star { .. } => {
                "(i32.const 1)".to_string()
            }
            MatchPattern::Value { expr } => {
                let v = self.emit_expr_to_string(expr)?;
                format!("(call $value_eq {subj} {v})")
            }
            MatchPattern::As { pattern, .. } => match pattern {
                Some(inner) => self.emit_pattern_test(inner, subj)?,
                None => "(i32.const 1)".to_string(),
            },
            MatchPattern::Or { patterns } => {
                let mut acc = "(i32.const 0)".to_string();
                for p in patterns {
                    let t = self.emit_pattern_test(p, subj)?;
                    acc = format!("(i32.or {acc} {t})");
                }
                acc
            }
            MatchPattern::Sequence { patterns } => self.emit_sequence_pattern_test(patterns, subj)?,
            MatchPattern::Mapping { keys, patterns } => self.emit_mapping_pattern_test(keys, patterns, subj)?,
            MatchPattern::Class { patterns, kwd_names, kwd_patterns, class, .. } => {
                if !patterns.is_empty() {
                    return Err(CompileError::UnsupportedMatchPattern(
                        "positional class patterns (require __match_args__)".into(),
                    ));
                }
                let class_v = self.emit_expr_to_string(class)?;
                let mut acc = format!("(call $isinstance {subj} {class_v})");
                for (name, p) in kwd_names.iter().zip(kwd_patterns) {
                    let attr = format!(
                        "(call $getattr (ref.cast (ref $OBJECT) {subj}) (call $load_string_literal (i32.const {}) (i32.const {})))",
                        super::resolve::literal_data_token(name.as_bytes()),
                        name.len()
                    );
                    let t = self.emit_pattern_test(p, &attr)?;
                    acc = format!("(i32.and {acc} {t})");
                }
                acc
            }
        })
    }

    fn emit_sequence_pattern_test(&mut self, patterns: &[MatchPattern], subj: &str) -> CompileResult<String> {
        let star_index = patterns.iter().position(|p| matches!(p, MatchPattern::Star { .. }));
        let fixed_count = match star_index {
            Some(_) => patterns.len() - 1,
            None => patterns.len(),
        };
        let len_expr = format!("(call $to_i64 (call $builtin_len {subj}))");
        let mut acc = match star_index {
            Some(_) => format!("(i64.ge_s {len_expr} (i64.const {fixed_count}))"),
            None => format!("(i64.eq {len_expr} (i64.const {fixed_count}))"),
        };
        for (i, p) in patterns.iter().enumerate() {
            if Some(i) == star_index {
                continue;
            }
            // indices after the star count from the end, since the star
            // absorbs an unknown number of middle elements.
            let index_expr = if let Some(si) = star_index {
                if i < si {
                    format!("(ref.i31 (i32.const {i}))")
                } else {
                    let from_end = patterns.len() - i;
                    format!("(call $pack_int (i64.sub {len_expr} (i64.const {from_end})))")
                }
            } else {
                format!("(ref.i31 (i32.const {i}))")
            };
            let elem = format!("(call $subscript {subj} {index_expr})");
            let t = self.emit_pattern_test(p, &elem)?;
            acc = format!("(i32.and {acc} {t})");
        }
        Ok(acc)
    }

    fn emit_mapping_pattern_test(&mut self, keys: &[Expr], patterns: &[MatchPattern], subj: &str) -> CompileResult<String> {
        let mut acc = "(i32.const 1)".to_string();
        for (key, p) in keys.iter().zip(patterns) {
            let k = self.emit_expr_to_string(key)?;
            let value = format!("(call $dict_get (ref.cast (ref $DICT) {subj}) {k})");
            let present = format!("(i32.eqz (ref.is_null {value}))");
            let t = self.emit_pattern_test(p, &value)?;
            acc = format!("(i32.and {acc} (i32.and {present} {t}))");
        }
        Ok(acc)
    }

    /// Binds every capture in a pattern once its test has already passed;
    /// called separately from `emit_pattern_test` since a failed match must
    /// never evaluate bindings for a pattern that didn't actually match.
    fn emit_pattern_bind(&mut self, pattern: &MatchPattern, subj: &str) -> CompileResult<()> {
        match pattern {
            MatchPattern::Capture { name } => {
                self.emit_store_target(&Expr::Name { id: name.clone(), span: Default::default() }, subj)
            }
            MatchPattern::Wildcard | MatchPattern::Value { .. } => Ok(()),
            MatchPattern::As { pattern, name } => {
                if let Some(inner) = pattern {
                    self.emit_pattern_bind(inner, subj)?;
                }
                self.emit_store_target(&Expr::Name { id: name.clone(), span: Default::default() }, subj)
            }
            MatchPattern::Or { patterns } => {
                // Binding from an or-pattern is only well-defined when every
                // alternative binds the same names; this codegen binds
                // whichever alternative's test the caller already selected,
                // which for capture-free alternatives is a no-op.
                for p in patterns {
                    self.emit_pattern_bind(p, subj)?;
                }
                Ok(())
            }
            MatchPattern::Sequence { patterns } => {
                let star_index = patterns.iter().position(|p| matches!(p, MatchPattern::Star { .. }));
                for (i, p) in patterns.iter().enumerate() {
                    if Some(i) == star_index {
                        if let MatchPattern::Star { name: Some(name) } = p {
                            let rest = format!(
                                "(call $unpack_rest {subj} (i32.const {i}) (i32.wrap_i64 (call $to_i64 (call $builtin_len {subj}))))"
                            );
                            self.emit_store_target(&Expr::Name { id: name.clone(), span: Default::default() }, &rest)?;
                        }
                        continue;
                    }
                    let index_expr = match star_index {
                        Some(si) if i >= si => {
                            let from_end = patterns.len() - i;
                            format!("(call $pack_int (i64.sub (call $to_i64 (call $builtin_len {subj})) (i64.const {from_end})))")
                        }
                        _ => format!("(ref.i31 (i32.const {i}))"),
                    };
                    let elem = format!("(call $subscript {subj} {index_expr})");
                    self.emit_pattern_bind(p, &elem)?;
                }
                Ok(())
            }
            MatchPattern::Mapping { keys, patterns } => {
                for (key, p) in keys.iter().zip(patterns) {
                    let k = self.emit_expr_to_string(key)?;
                    let value = format!("(call $dict_get (ref.cast (ref $DICT) {subj}) {k})");
                    self.emit_pattern_bind(p, &value)?;
                }
                Ok(())
            }
            MatchPattern::Class { kwd_names, kwd_patterns, .. } => {
                for (name, p) in kwd_names.iter().zip(kwd_patterns) {
                    let attr = format!(
                        "(call $getattr (ref.cast (ref $OBJECT) {subj}) (call $load_string_literal (i32.const {}) (i32.const {})))",
                        super::resolve::literal_data_token(name.as_bytes()),
                        name.len()
                    );
                    self.emit_pattern_bind(p, &attr)?;
                }
                Ok(())
            }
            MatchPattern::Star { name: None } => Ok(()),
            MatchPattern::Star { name: Some(name) } => {
                self.emit_store_target(&Expr::Name { id: name.clone(), span: Default::default() }, subj)
            }
        }
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
        scope.locals.insert("rest".into());
        CodeGenerator::new(CodegenConfig::default(), scope)
    }

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.into(), span: Span::default() }
    }

    #[test]
    fn wildcard_case_always_matches() {
        let mut g = gen();
        let case = MatchCase {
            pattern: MatchPattern::Wildcard,
            guard: None,
            body: vec![crate::syntax::Stmt::Pass { span: Span::default() }],
        };
        g.emit_match(&name("subject"), std::slice::from_ref(&case)).unwrap();
        assert!(g.as_str().contains("match_done"));
    }

    #[test]
    fn capture_pattern_binds_the_name() {
        let mut g = gen();
        let case = MatchCase {
            pattern: MatchPattern::Capture { name: "x".into() },
            guard: None,
            body: vec![crate::syntax::Stmt::Pass { span: Span::default() }],
        };
        g.emit_match(&name("subject"), std::slice::from_ref(&case)).unwrap();
        assert!(g.as_str().contains("local.set $x"));
    }

    fn literal_int() -> Expr {
        Expr::Constant { value: Literal::Int { text: "1".into() }, span: Span::default() }
    }

    #[test]
    fn positional_class_pattern_is_unsupported() {
        let mut g = gen();
        let positional = MatchPattern::Value { expr: literal_int() };
        let pattern = MatchPattern::Class {
            class: name("Point"),
            patterns: vec![positional],
            kwd_names: vec![],
            kwd_patterns: vec![],
        };
        assert!(g.emit_pattern_test(&pattern, "(local.get $x)").is_err());
    }

    #[test]
    fn sequence_pattern_with_star_checks_minimum_length() {
        let mut g = gen();
        let pattern = MatchPattern::Sequence {
            patterns: vec![
                MatchPattern::Capture { name: "x".into() },
                MatchPattern::Star { name: Some("rest".into()) },
            ],
        };
        let test = g.emit_pattern_test(&pattern, "(local.get $x)").unwrap();
        assert!(test.contains("i64.ge_s"));
    }
}
