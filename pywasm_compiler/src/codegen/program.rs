//! Top-level module assembly: imports, types,
//! module-scope globals plus the string heap, the embedded runtime library,
//! then every user-defined function, a function table, and an exported
//! `main` entry point.

use pywasm_runtime::{HostBridgeOptions, RuntimeLibrary};

use crate::analyze::analyze_body;
use crate::error::CompileResult;
use crate::syntax::{Expr, Module, Param, Span, Stmt};

use super::{CodeGenerator, CodegenConfig};

pub struct CompiledModule {
    pub wat_text: String,
}

/// Compiles a whole program: the module body runs as an implicit `main`
/// function, and every top-level `def`/`class` is hoisted into its own WAT
/// function ahead of `main`.
pub fn compile_module(module: &Module, host: HostBridgeOptions) -> CompileResult<CompiledModule> {
    let runtime = RuntimeLibrary::build(host);
    let config = CodegenConfig { host_bridge: host, ..CodegenConfig::default() };

    let mut user_functions = String::new();
    let mut function_table_entries = Vec::new();
    collect_and_emit_functions(&module.body, &config, &mut user_functions, &mut function_table_entries)?;

    let top_scope = analyze_body(&module.body, &[]);
    let mut main_gen = CodeGenerator::new(config.clone(), top_scope);
    main_gen.write_line("(func $main (export \"main\")");
    main_gen.indent();
    main_gen.write_line("(local $__frame__ (ref null $ENV))");
    for local in main_gen.scope.locals.clone() {
        main_gen.write_line(&format!("(local ${local} anyref)"));
    }
    main_gen.write_line(
        "(local.set $__frame__ (struct.new $ENV (ref.null $ENV) (array.new $ARRAY_ANY (ref.null any) (i32.const __ENV_SLOT_COUNT__))))"
    );
    main_gen.emit_block(&module.body)?;
    main_gen.dedent();
    main_gen.write_line(")");
    let main_pending = std::mem::take(&mut main_gen.pending_lambdas);
    let main_fn = main_gen.finish();
    drain_pending_lambdas(main_pending, &config, &mut user_functions, &mut function_table_entries)?;

    let mut wat_text = String::new();
    wat_text.push_str("(module\n");
    wat_text.push_str(&runtime.imports);
    wat_text.push_str(&runtime.types);
    wat_text.push_str(&runtime.globals);
    wat_text.push_str(&emit_module_scope_globals(&top_scope_names(module)));
    wat_text.push_str(&runtime.functions);
    wat_text.push_str(&user_functions);
    wat_text.push_str(&emit_function_table(&function_table_entries));
    wat_text.push_str(&main_fn);
    wat_text.push_str(")\n");

    let wat_text = super::resolve::resolve_placeholders(&wat_text, &function_table_entries)?;

    Ok(CompiledModule { wat_text })
}

/// Walks top-level `def`/`class` statements, hoisting each into its own WAT
/// function emitted ahead of `main`, same as any other lifted `def`.
/// Nested `def`s are lifted the same way by recursing into function bodies;
/// only the innermost lexical scope's locals live in that function's own
/// `(local ...)` list.
fn collect_and_emit_functions(
    body: &[Stmt],
    config: &CodegenConfig,
    out: &mut String,
    table: &mut Vec<String>,
) -> CompileResult<()> {
    for stmt in body {
        match stmt {
            Stmt::FunctionDef { name, params, body: fn_body, .. } => {
                emit_one_function(name, params, fn_body, config, out, table)?;
                table.push(format!("$__func_{name}__"));
                collect_and_emit_functions(fn_body, config, out, table)?;
            }
            Stmt::ClassDef { name, body: class_body, .. } => {
                // The class's method chain and `$CLASS` value are built
                // in-line where the `class` statement executes (see
                // `statements::emit_class_def_binding`); this pass only
                // needs to hoist each method body to its own top-level
                // function ahead of `main`, the same as a nested `def`.
                for method in class_body {
                    if let Stmt::FunctionDef { name: m_name, params, body: m_body, .. } = method {
                        let qualified = format!("{name}_{m_name}");
                        emit_one_function(&qualified, params, m_body, config, out, table)?;
                        table.push(format!("$__func_{qualified}__"));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Builds a synthetic parameter list for a hoisted lambda: defaults line up
/// against the trailing parameters the way Python's own `def`/`lambda`
/// default binding does.
fn build_lambda_params(names: &[String], defaults: &[Expr]) -> Vec<Param> {
    let n = names.len();
    let d = defaults.len();
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let default = if i + d >= n { defaults.get(i + d - n).cloned() } else { None };
            Param { name: name.clone(), default, is_star: false, is_double_star: false }
        })
        .collect()
}

/// Compiles every lambda queued onto `gen` (in `next_lambda_name` order)
/// into its own top-level function, the same way a hoisted `def` is.
/// Recurses so lambdas nested inside a lambda body are drained too.
fn drain_pending_lambdas(
    pending: Vec<super::PendingLambda>,
    config: &CodegenConfig,
    out: &mut String,
    table: &mut Vec<String>,
) -> CompileResult<()> {
    for lambda in pending {
        let params = build_lambda_params(&lambda.params, &lambda.defaults);
        let body = vec![Stmt::Return { value: Some(lambda.body), span: Span::default() }];
        emit_one_function(&lambda.name, &params, &body, config, out, table)?;
        table.push(format!("$__func_{}__", lambda.name));
    }
    Ok(())
}

/// Every compiled function — plain `def`, method, or hoisted lambda — shares
/// one call-indirect-compatible signature: `$env` plus a single PAIR-chain
/// `$args` list, matching `$call_closure`'s `call_indirect (type $FUNC)`.
/// The prologue destructures that chain positionally into each declared
/// parameter's own local, falling back to the parameter's default expression
/// (evaluated in the callee's own scope, not the caller's — a documented
/// simplification) or `ref.null any` once the chain runs out early.
/// `*args`/`**kwargs` parameters are not walked further; `*args` collects
/// whatever remains of the chain into a list, `**kwargs` is always empty,
/// since this codegen never threads keyword names through the call site.
fn emit_one_function(
    name: &str,
    params: &[Param],
    body: &[Stmt],
    config: &CodegenConfig,
    out: &mut String,
    table: &mut Vec<String>,
) -> CompileResult<()> {
    let mut scope = analyze_body(body, params);
    let is_generator = scope.is_generator;
    let mut gen = CodeGenerator::new(config.clone(), std::mem::take(&mut scope));

    if is_generator {
        let desugared = gen.desugar_yield_from(body.to_vec());
        gen.write_line(&format!("(func $__func_{name}_wrapper__ (param $env (ref null $ENV)) (result (ref $GENERATOR))"));
        gen.indent();
        gen.write_line(&format!(
            "(call $generator_new (i32.const 0) (local.get $env) (i32.const {}))",
            gen.scope.locals.len()
        ));
        gen.dedent();
        gen.write_line(")");
        gen.emit_generator_body(&format!("$__func_{name}__"), &param_names(params), &desugared)?;
        out.push_str(&gen.finish());
    } else {
        gen.write_line(&format!(
            "(func $__func_{name}__ (param $env (ref null $ENV)) (param $args (ref null $PAIR)) (result anyref)"
        ));
        gen.indent();
        gen.write_line("(local $__cursor__ (ref null $PAIR))");
        gen.write_line("(local $__frame__ (ref null $ENV))");
        for local in gen.scope.locals.clone() {
            if !params.iter().any(|p| p.name == local) {
                gen.write_line(&format!("(local ${local} anyref)"));
            }
        }
        for p in params {
            gen.write_line(&format!("(local ${} anyref)", p.name));
        }
        gen.write_line("(local.set $__cursor__ (local.get $args))");
        emit_param_prologue(&mut gen, params)?;
        gen.write_line(
            "(local.set $__frame__ (struct.new $ENV (local.get $env) (array.new $ARRAY_ANY (ref.null any) (i32.const __ENV_SLOT_COUNT__))))"
        );
        for p in params {
            gen.write_line(&format!(
                "(call $env_set (local.get $__frame__) (i32.const __ENV_SLOT_{}__) (local.get ${}))",
                p.name, p.name
            ));
        }
        gen.emit_block(body)?;
        gen.write_line("(ref.null any)");
        gen.dedent();
        gen.write_line(")");
        let pending = std::mem::take(&mut gen.pending_lambdas);
        out.push_str(&gen.finish());
        drain_pending_lambdas(pending, config, out, table)?;
    }
    Ok(())
}

fn emit_param_prologue(gen: &mut CodeGenerator, params: &[Param]) -> CompileResult<()> {
    for p in params {
        if p.is_star {
            gen.write_line(&format!("(local.set ${} (call $rest_args (local.get $__cursor__)))", p.name));
            gen.write_line("(local.set $__cursor__ (ref.null $PAIR))");
            continue;
        }
        if p.is_double_star {
            gen.write_line(&format!("(local.set ${} (call $dict_new))", p.name));
            continue;
        }
        let default = match &p.default {
            Some(d) => gen.emit_expr_to_string(d)?,
            None => "(ref.null any)".to_string(),
        };
        gen.write_line(&format!(
            "(local.set ${} (if (result anyref) (ref.is_null (local.get $__cursor__)) (then {default}) (else (struct.get $PAIR $car (local.get $__cursor__)))))",
            p.name
        ));
        gen.write_line(
            "(local.set $__cursor__ (if (result (ref null $PAIR)) (ref.is_null (local.get $__cursor__)) (then (ref.null $PAIR)) (else (ref.cast (ref null $PAIR) (struct.get $PAIR $cdr (local.get $__cursor__))))))"
        );
    }
    Ok(())
}

fn param_names(params: &[Param]) -> Vec<String> {
    params.iter().map(|p| p.name.clone()).collect()
}

fn top_scope_names(module: &Module) -> Vec<String> {
    module
        .body
        .iter()
        .filter_map(|s| match s {
            Stmt::FunctionDef { name, .. } | Stmt::ClassDef { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn emit_module_scope_globals(names: &[String]) -> String {
    let mut out = String::new();
    for name in names {
        out.push_str(&format!("(global ${name} (mut anyref) (ref.null any))\n"));
        out.push_str(&format!("(global $__class_{name}__ (mut (ref null $CLASS)) (ref.null $CLASS))\n"));
    }
    out
}

fn emit_function_table(entries: &[String]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = format!("(table $functions {} funcref)\n", entries.len());
    out.push_str(&format!("(elem (i32.const 0) {})\n", entries.join(" ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    #[test]
    fn empty_module_still_emits_main_export() {
        let module = Module { body: vec![] };
        let out = compile_module(&module, HostBridgeOptions::default()).unwrap();
        assert!(out.wat_text.contains("(export \"main\")"));
    }

    #[test]
    fn toplevel_function_is_hoisted_ahead_of_main() {
        let module = Module {
            body: vec![Stmt::FunctionDef {
                name: "greet".into(),
                params: vec![],
                body: vec![Stmt::Pass { span: Span::default() }],
                decorators: vec![],
                is_async: false,
                span: Span::default(),
            }],
        };
        let out = compile_module(&module, HostBridgeOptions::default()).unwrap();
        let func_pos = out.wat_text.find("$__func_greet__").unwrap();
        let main_pos = out.wat_text.find("(export \"main\")").unwrap();
        assert!(func_pos < main_pos);
    }

    #[test]
    fn module_output_orders_imports_before_functions() {
        let module = Module { body: vec![] };
        let out = compile_module(&module, HostBridgeOptions::default()).unwrap();
        let import_pos = out.wat_text.find("(import").unwrap();
        let func_pos = out.wat_text.find("(export \"main\")").unwrap();
        assert!(import_pos < func_pos);
    }
}
