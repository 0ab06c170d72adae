//! Whole-program compilation tests: build a small syntax tree directly
//! (there is no parser in this crate — see `syntax`'s module doc) and
//! assert the assembled module is placeholder-free and calls only runtime
//! functions the embedded library actually defines.

use pywasm_compiler::compile;
use pywasm_compiler::syntax::{
    BinOp, Expr, Literal, Module, Param, Span, Stmt,
};
use pywasm_runtime::HostBridgeOptions;

fn name(id: &str) -> Expr {
    Expr::Name { id: id.into(), span: Span::default() }
}

fn int(text: &str) -> Expr {
    Expr::Constant { value: Literal::Int { text: text.into() }, span: Span::default() }
}

fn call(func: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call { func: Box::new(func), args, keywords: vec![], span: Span::default() }
}

/// No unresolved `__LIT_`/`__FUNC_INDEX_`/`__ENV_SLOT_`/`__BUILTIN_INDEX_`
/// token should ever reach the final text; each is only valid mid-assembly.
fn assert_fully_resolved(wat: &str) {
    for prefix in ["__LIT_", "__FUNC_INDEX_", "__ENV_SLOT_", "__BUILTIN_INDEX_"] {
        assert!(!wat.contains(prefix), "unresolved placeholder {prefix} left in output:\n{wat}");
    }
}

/// Every function name `(call $foo ...)` references in the user-generated
/// portion of the module must be defined somewhere in the module — either
/// by the embedded runtime library or by the compiled program itself.
fn assert_every_called_function_is_defined(wat: &str) {
    // Matches both `(func $name ...)` definitions and the `(func $name ...)`
    // signature nested inside an `(import ...)` form — imported host
    // functions are just as "defined" from a call site's point of view.
    let defined: std::collections::HashSet<&str> = wat
        .match_indices("(func $")
        .map(|(idx, _)| {
            let rest = &wat[idx + "(func $".len()..];
            rest.split(|c: char| c == ' ' || c == '(' || c == ')').next().unwrap()
        })
        .collect();
    for (idx, _) in wat.match_indices("(call $") {
        let rest = &wat[idx + "(call $".len()..];
        let called = rest.split(|c: char| c == ' ' || c == ')').next().unwrap();
        assert!(
            defined.contains(called),
            "call to undefined function ${called} in compiled output"
        );
    }
}

#[test]
fn print_of_an_arithmetic_expression_compiles_with_no_loose_ends() {
    // print(2 + 3 * 4)
    let module = Module {
        body: vec![Stmt::ExprStmt {
            value: call(
                name("print"),
                vec![Expr::BinOp {
                    left: Box::new(int("2")),
                    op: BinOp::Add,
                    right: Box::new(Expr::BinOp {
                        left: Box::new(int("3")),
                        op: BinOp::Mul,
                        right: Box::new(int("4")),
                        span: Span::default(),
                    }),
                    span: Span::default(),
                }],
            ),
            span: Span::default(),
        }],
    };
    let wat = compile(&module, HostBridgeOptions::default()).unwrap();
    assert!(wat.contains("$builtin_print"));
    assert!(wat.contains("$int_add"));
    assert!(wat.contains("$int_mul"));
    assert_fully_resolved(&wat);
    assert_every_called_function_is_defined(&wat);
}

#[test]
fn calling_a_hoisted_function_compiles_through_the_closure_abi() {
    // def add(a, b):
    //     return a + b
    // print(add(1, 2))
    let module = Module {
        body: vec![
            Stmt::FunctionDef {
                name: "add".into(),
                params: vec![
                    Param { name: "a".into(), default: None, is_star: false, is_double_star: false },
                    Param { name: "b".into(), default: None, is_star: false, is_double_star: false },
                ],
                body: vec![Stmt::Return {
                    value: Some(Expr::BinOp {
                        left: Box::new(name("a")),
                        op: BinOp::Add,
                        right: Box::new(name("b")),
                        span: Span::default(),
                    }),
                    span: Span::default(),
                }],
                decorators: vec![],
                is_async: false,
                span: Span::default(),
            },
            Stmt::ExprStmt {
                value: call(name("print"), vec![call(name("add"), vec![int("1"), int("2")])]),
                span: Span::default(),
            },
        ],
    };
    let wat = compile(&module, HostBridgeOptions::default()).unwrap();
    assert!(wat.contains("$__func_add__"));
    assert!(wat.contains("(table $functions"));
    assert_fully_resolved(&wat);
    assert_every_called_function_is_defined(&wat);
}

#[test]
fn for_loop_over_a_list_literal_uses_the_iterator_protocol() {
    // for x in [1, 2, 3]:
    //     print(x)
    let module = Module {
        body: vec![Stmt::For {
            target: name("x"),
            iter: Expr::List { elements: vec![int("1"), int("2"), int("3")], span: Span::default() },
            body: vec![Stmt::ExprStmt {
                value: call(name("print"), vec![name("x")]),
                span: Span::default(),
            }],
            orelse: vec![],
            span: Span::default(),
        }],
    };
    let wat = compile(&module, HostBridgeOptions::default()).unwrap();
    assert!(wat.contains("$get_iter"));
    assert!(wat.contains("$iter_next"));
    assert!(wat.contains("$iter_exhausted"));
    assert_fully_resolved(&wat);
    assert_every_called_function_is_defined(&wat);
}
