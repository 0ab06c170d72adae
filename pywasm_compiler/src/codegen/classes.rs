//! `class` statement codegen: builds a `$CLASS` value at
//! module init time with a method dict collected from the body's `def`s,
//! wraps `@staticmethod`/`@classmethod`/`@property` in their descriptor
//! structs, and emits a dedicated struct type when `__slots__` is present.

use crate::analyze::extract_slots;
use crate::error::CompileResult;
use crate::syntax::{Expr, Stmt};

/// Everything `codegen::program`'s module-init pass needs to build one
/// class's `$CLASS` value and register its compiled methods.
pub struct ClassPlan {
    pub name: String,
    pub base: Option<String>,
    pub methods: Vec<MethodPlan>,
    pub slots: Option<Vec<String>>,
}

pub struct MethodPlan {
    pub name: String,
    pub kind: MethodKind,
    pub func_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Plain,
    Static,
    Class,
    PropertyGetter,
}

impl super::CodeGenerator {
    /// Builds the plan `program.rs` assembles into init-time WAT; does not
    /// itself emit any function bodies (those are lifted and emitted as
    /// ordinary top-level functions by the same pass that handles nested
    /// `def`s, same as top-level function lifting).
    pub fn plan_class(&mut self, name: &str, bases: &[Expr], body: &[Stmt]) -> CompileResult<ClassPlan> {
        let base = bases.first().and_then(|b| match b {
            Expr::Name { id, .. } => Some(id.clone()),
            _ => None,
        });
        let slots = extract_slots(body)?;

        let mut methods = Vec::new();
        for stmt in body {
            if let Stmt::FunctionDef { name: method_name, decorators, .. } = stmt {
                let kind = method_kind(decorators);
                methods.push(MethodPlan {
                    name: method_name.clone(),
                    kind,
                    func_ref: format!("__FUNC_INDEX_{name}_{method_name}__"),
                });
            }
        }

        Ok(ClassPlan { name: name.to_string(), base, methods, slots })
    }

    /// Emits the init-time sequence that builds this class's method
    /// association list and `$CLASS` value, wrapping each method per its
    /// descriptor kind. The chain is built head-first by repeated
    /// `$alist_cons`, so `$method_lookup`'s walk sees methods in reverse
    /// declaration order — irrelevant since names don't repeat within a
    /// class body.
    pub fn emit_class_init(&mut self, plan: &ClassPlan) -> CompileResult<()> {
        let methods_tmp = self.fresh_temp(&format!("{}_methods", plan.name));
        self.write_line(&format!("(local.set {methods_tmp} (ref.null $PAIR))"));
        for method in &plan.methods {
            let closure = format!(
                "(call $make_closure (local.get $__frame__) (i32.const {}))",
                method.func_ref
            );
            let wrapped = match method.kind {
                MethodKind::Plain => closure,
                MethodKind::Static => format!("(struct.new $STATICMETHOD {closure})"),
                MethodKind::Class => format!("(struct.new $CLASSMETHOD {closure})"),
                MethodKind::PropertyGetter => format!("(struct.new $PROPERTY {closure} (ref.null any))"),
            };
            self.write_line(&format!(
                "(local.set {methods_tmp} (call $alist_cons (local.get {methods_tmp}) (call $load_string_literal (i32.const {}) (i32.const {})) {wrapped}))",
                super::resolve::literal_data_token(method.name.as_bytes()),
                method.name.len()
            ));
        }
        let base_ref = match &plan.base {
            Some(b) => format!("(ref.cast (ref null $CLASS) (global.get $__class_{b}__))"),
            None => "(ref.null $CLASS)".to_string(),
        };
        self.write_line(&format!(
            "(global.set $__class_{}__ (call $class_new (call $load_string_literal (i32.const {}) (i32.const {})) (local.get {methods_tmp}) {base_ref}))",
            plan.name,
            super::resolve::literal_data_token(plan.name.as_bytes()),
            plan.name.len()
        ));
        Ok(())
    }
}

fn method_kind(decorators: &[Expr]) -> MethodKind {
    for d in decorators {
        if let Expr::Name { id, .. } = d {
            match id.as_str() {
                "staticmethod" => return MethodKind::Static,
                "classmethod" => return MethodKind::Class,
                "property" => return MethodKind::PropertyGetter,
                _ => {}
            }
        }
    }
    MethodKind::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ScopeInfo;
    use crate::codegen::{CodeGenerator, CodegenConfig};
    use crate::syntax::Span;

    fn gen() -> CodeGenerator {
        CodeGenerator::new(CodegenConfig::default(), ScopeInfo::default())
    }

    fn method(name: &str, decorators: Vec<Expr>) -> Stmt {
        Stmt::FunctionDef {
            name: name.into(),
            params: vec![],
            body: vec![Stmt::Pass { span: Span::default() }],
            decorators,
            is_async: false,
            span: Span::default(),
        }
    }

    #[test]
    fn plain_method_has_no_descriptor_wrapper() {
        let mut g = gen();
        let plan = g.plan_class("Point", &[], &[method("dist", vec![])]).unwrap();
        assert_eq!(plan.methods[0].kind, MethodKind::Plain);
    }

    #[test]
    fn staticmethod_decorator_is_detected() {
        let mut g = gen();
        let deco = Expr::Name { id: "staticmethod".into(), span: Span::default() };
        let plan = g.plan_class("Point", &[], &[method("make", vec![deco])]).unwrap();
        assert_eq!(plan.methods[0].kind, MethodKind::Static);
    }

    #[test]
    fn base_class_name_is_captured_from_first_base() {
        let mut g = gen();
        let base = Expr::Name { id: "Animal".into(), span: Span::default() };
        let plan = g.plan_class("Dog", &[base], &[]).unwrap();
        assert_eq!(plan.base.as_deref(), Some("Animal"));
    }

    #[test]
    fn class_init_wraps_classmethod_in_descriptor_struct() {
        let mut g = gen();
        let deco = Expr::Name { id: "classmethod".into(), span: Span::default() };
        let plan = g.plan_class("Point", &[], &[method("make", vec![deco])]).unwrap();
        g.emit_class_init(&plan).unwrap();
        assert!(g.as_str().contains("$CLASSMETHOD"));
    }
}
