//! Walks a function or module body to build its `ScopeInfo`.
//! Every collector here stops at the boundary of a nested function/lambda
//! body — per spec, "nested function bodies are not recursed into"; their
//! own locals are computed separately when that body is analyzed in turn,
//! and only their *free variables* flow back up into the enclosing scope.

use std::collections::BTreeSet;

use crate::syntax::{Comprehension, Expr, FStringPart, MatchPattern, Param, Stmt};

use super::scope::ScopeInfo;

/// Build the full `ScopeInfo` for one body (a function body or the module
/// body). `params` seeds the local set so references to parameters are
/// never mistaken for free variables.
pub fn analyze_body(body: &[Stmt], params: &[Param]) -> ScopeInfo {
    let mut info = ScopeInfo::default();
    for p in params {
        info.locals.insert(p.name.clone());
    }

    collect_locals_into(body, &mut info.locals);
    collect_global_nonlocal_into(body, &mut info.globals, &mut info.nonlocals);
    collect_iterator_locals_into(body, &mut info.iterator_locals);
    collect_with_locals_into(body, &mut info.with_locals);

    let mut comp_counter = 0usize;
    collect_comprehension_locals_into(body, &mut info.comprehension_locals, &mut comp_counter);

    let mut bound: BTreeSet<String> = info.locals.clone();
    bound.extend(info.iterator_locals.iter().cloned());
    bound.extend(info.comprehension_locals.iter().cloned());
    bound.extend(info.with_locals.iter().cloned());
    collect_free_vars_into(body, &bound, &mut info.free_vars);
    // a name declared global/nonlocal is resolved through that channel, not
    // treated as a captured free variable.
    for g in info.globals.iter().chain(info.nonlocals.iter()) {
        info.free_vars.remove(g);
    }

    info.is_generator = body.iter().any(stmt_contains_yield);

    info
}

fn stmt_contains_yield(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::ExprStmt { value, .. } => value.contains_yield(),
        Stmt::Assign { value, .. } => value.contains_yield(),
        Stmt::AugAssign { value, .. } => value.contains_yield(),
        Stmt::AnnAssign { value, .. } => value.as_ref().is_some_and(Expr::contains_yield),
        Stmt::Return { value, .. } => value.as_ref().is_some_and(Expr::contains_yield),
        Stmt::If { test, body, orelse, .. } => {
            test.contains_yield() || body.iter().any(stmt_contains_yield) || orelse.iter().any(stmt_contains_yield)
        }
        Stmt::While { test, body, orelse, .. } => {
            test.contains_yield() || body.iter().any(stmt_contains_yield) || orelse.iter().any(stmt_contains_yield)
        }
        Stmt::For { iter, body, orelse, .. } => {
            iter.contains_yield() || body.iter().any(stmt_contains_yield) || orelse.iter().any(stmt_contains_yield)
        }
        Stmt::Try { body, handlers, orelse, finalbody, .. } => {
            body.iter().any(stmt_contains_yield)
                || handlers.iter().any(|h| h.body.iter().any(stmt_contains_yield))
                || orelse.iter().any(stmt_contains_yield)
                || finalbody.iter().any(stmt_contains_yield)
        }
        Stmt::With { items, body, .. } => {
            items.iter().any(|i| i.context_expr.contains_yield()) || body.iter().any(stmt_contains_yield)
        }
        Stmt::Raise { exc, cause, .. } => {
            exc.as_ref().is_some_and(Expr::contains_yield) || cause.as_ref().is_some_and(Expr::contains_yield)
        }
        Stmt::Match { subject, cases, .. } => {
            subject.contains_yield() || cases.iter().any(|c| c.body.iter().any(stmt_contains_yield))
        }
        // FunctionDef/ClassDef are a scope boundary: their own yields don't
        // make *this* scope a generator.
        Stmt::FunctionDef { .. } | Stmt::ClassDef { .. } => false,
        Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Pass { .. }
        | Stmt::Import { .. }
        | Stmt::Global { .. }
        | Stmt::Nonlocal { .. } => false,
    }
}

fn bind_target(target: &Expr, out: &mut BTreeSet<String>) {
    match target {
        Expr::Name { id, .. } => {
            out.insert(id.clone());
        }
        Expr::Tuple { elements, .. } | Expr::List { elements, .. } => {
            for e in elements {
                bind_target(e, out);
            }
        }
        Expr::Starred { value, .. } => bind_target(value, out),
        // subscript/attribute targets bind nothing new locally — they
        // mutate an existing object.
        Expr::Subscript { .. } | Expr::Attribute { .. } => {}
        _ => {}
    }
}

fn collect_locals_into(body: &[Stmt], out: &mut BTreeSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Assign { targets, value, .. } => {
                for t in targets {
                    bind_target(t, out);
                }
                collect_walrus_in_expr(value, out);
            }
            Stmt::AugAssign { target, value, .. } => {
                bind_target(target, out);
                collect_walrus_in_expr(value, out);
            }
            Stmt::AnnAssign { target, value, .. } => {
                bind_target(target, out);
                if let Some(v) = value {
                    collect_walrus_in_expr(v, out);
                }
            }
            Stmt::For { target, iter, body, orelse, .. } => {
                bind_target(target, out);
                collect_walrus_in_expr(iter, out);
                collect_locals_into(body, out);
                collect_locals_into(orelse, out);
            }
            Stmt::If { test, body, orelse, .. } => {
                collect_walrus_in_expr(test, out);
                collect_locals_into(body, out);
                collect_locals_into(orelse, out);
            }
            Stmt::While { test, body, orelse, .. } => {
                collect_walrus_in_expr(test, out);
                collect_locals_into(body, out);
                collect_locals_into(orelse, out);
            }
            Stmt::Try { body, handlers, orelse, finalbody, .. } => {
                collect_locals_into(body, out);
                for h in handlers {
                    if let Some(name) = &h.name {
                        out.insert(name.clone());
                    }
                    collect_locals_into(&h.body, out);
                }
                collect_locals_into(orelse, out);
                collect_locals_into(finalbody, out);
            }
            Stmt::With { items, body, .. } => {
                for item in items {
                    if let Some(v) = &item.optional_vars {
                        bind_target(v, out);
                    }
                }
                collect_locals_into(body, out);
            }
            Stmt::FunctionDef { name, .. } => {
                out.insert(name.clone());
            }
            Stmt::ClassDef { name, .. } => {
                out.insert(name.clone());
            }
            Stmt::Import { alias, module, .. } => {
                out.insert(alias.clone().unwrap_or_else(|| module.clone()));
            }
            Stmt::Match { subject, cases, .. } => {
                collect_walrus_in_expr(subject, out);
                for case in cases {
                    collect_pattern_bindings(&case.pattern, out);
                    collect_locals_into(&case.body, out);
                }
            }
            Stmt::ExprStmt { value, .. } => collect_walrus_in_expr(value, out),
            Stmt::Return { value, .. } => {
                if let Some(v) = value {
                    collect_walrus_in_expr(v, out);
                }
            }
            Stmt::Raise { .. } | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Pass { .. } => {}
            Stmt::Global { .. } | Stmt::Nonlocal { .. } => {}
        }
    }
}

fn collect_pattern_bindings(pattern: &MatchPattern, out: &mut BTreeSet<String>) {
    match pattern {
        MatchPattern::Capture { name } => {
            out.insert(name.clone());
        }
        MatchPattern::Star { name: Some(name) } => {
            out.insert(name.clone());
        }
        MatchPattern::Sequence { patterns } | MatchPattern::Or { patterns } => {
            for p in patterns {
                collect_pattern_bindings(p, out);
            }
        }
        MatchPattern::Mapping { patterns, .. } => {
            for p in patterns {
                collect_pattern_bindings(p, out);
            }
        }
        MatchPattern::Class { patterns, kwd_patterns, .. } => {
            for p in patterns.iter().chain(kwd_patterns.iter()) {
                collect_pattern_bindings(p, out);
            }
        }
        MatchPattern::As { pattern, name } => {
            if let Some(inner) = pattern {
                collect_pattern_bindings(inner, out);
            }
            out.insert(name.clone());
        }
        MatchPattern::Star { name: None } | MatchPattern::Wildcard | MatchPattern::Value { .. } => {}
    }
}

/// Walrus targets (`x := expr`) bind a name in the *enclosing* scope, not a
/// comprehension's own scope, even when they appear inside one — this walk
/// intentionally does recurse into comprehension sub-expressions for that
/// reason, unlike the nested-function boundary elsewhere.
fn collect_walrus_in_expr(expr: &Expr, out: &mut BTreeSet<String>) {
    if let Expr::NamedExpr { target, value, .. } = expr {
        out.insert(target.clone());
        collect_walrus_in_expr(value, out);
        return;
    }
    walk_expr_children(expr, &mut |e| collect_walrus_in_expr(e, out));
}

/// Generic child-expression visitor used by the handful of passes that
/// don't care about node kind, only about "every sub-expression".
fn walk_expr_children(expr: &Expr, f: &mut impl FnMut(&Expr)) {
    match expr {
        Expr::Constant { .. } | Expr::Name { .. } => {}
        Expr::UnaryOp { operand, .. } => f(operand),
        Expr::BinOp { left, right, .. } => {
            f(left);
            f(right);
        }
        Expr::BoolOp { values, .. } => values.iter().for_each(f),
        Expr::Compare { left, comparators, .. } => {
            f(left);
            comparators.iter().for_each(f);
        }
        Expr::IfExp { test, body, orelse, .. } => {
            f(test);
            f(body);
            f(orelse);
        }
        Expr::Attribute { value, .. } => f(value),
        Expr::Subscript { value, index, .. } => {
            f(value);
            f(index);
        }
        Expr::Slice { lower, upper, step, .. } => {
            [lower, upper, step].into_iter().flatten().for_each(|e| f(e));
        }
        Expr::Call { func, args, keywords, .. } => {
            f(func);
            args.iter().for_each(&mut *f);
            keywords.iter().for_each(|k| f(&k.value));
        }
        Expr::Lambda { .. } => {
            // scope boundary: walrus/free-var walks don't cross it.
        }
        Expr::List { elements, .. } | Expr::Set { elements, .. } | Expr::Tuple { elements, .. } => {
            elements.iter().for_each(f)
        }
        Expr::Dict { keys, values, .. } => {
            keys.iter().flatten().for_each(&mut *f);
            values.iter().for_each(f);
        }
        Expr::FString { parts, .. } => {
            for p in parts {
                if let FStringPart::Formatted { value, .. } = p {
                    f(value);
                }
            }
        }
        Expr::ListComp { element, generators, .. }
        | Expr::SetComp { element, generators, .. }
        | Expr::GeneratorExp { element, generators, .. } => {
            f(element);
            walk_comprehensions(generators, f);
        }
        Expr::DictComp { key, value, generators, .. } => {
            f(key);
            f(value);
            walk_comprehensions(generators, f);
        }
        Expr::Starred { value, .. } => f(value),
        Expr::Yield { value, .. } => {
            if let Some(v) = value {
                f(v);
            }
        }
        Expr::YieldFrom { value, .. } => f(value),
        Expr::NamedExpr { value, .. } => f(value),
    }
}

fn walk_comprehensions(generators: &[Comprehension], f: &mut impl FnMut(&Expr)) {
    for g in generators {
        f(&g.iter);
        g.ifs.iter().for_each(&mut *f);
    }
}

fn collect_global_nonlocal_into(body: &[Stmt], globals: &mut BTreeSet<String>, nonlocals: &mut BTreeSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Global { names, .. } => globals.extend(names.iter().cloned()),
            Stmt::Nonlocal { names, .. } => nonlocals.extend(names.iter().cloned()),
            Stmt::If { body, orelse, .. } | Stmt::While { body, orelse, .. } | Stmt::For { body, orelse, .. } => {
                collect_global_nonlocal_into(body, globals, nonlocals);
                collect_global_nonlocal_into(orelse, globals, nonlocals);
            }
            Stmt::Try { body, handlers, orelse, finalbody, .. } => {
                collect_global_nonlocal_into(body, globals, nonlocals);
                for h in handlers {
                    collect_global_nonlocal_into(&h.body, globals, nonlocals);
                }
                collect_global_nonlocal_into(orelse, globals, nonlocals);
                collect_global_nonlocal_into(finalbody, globals, nonlocals);
            }
            Stmt::With { body, .. } => collect_global_nonlocal_into(body, globals, nonlocals),
            Stmt::Match { cases, .. } => {
                for c in cases {
                    collect_global_nonlocal_into(&c.body, globals, nonlocals);
                }
            }
            // nested function/class bodies have their own global/nonlocal
            // declarations, scanned when they are analyzed in turn.
            Stmt::FunctionDef { .. } | Stmt::ClassDef { .. } => {}
            _ => {}
        }
    }
}

/// Reserves a synthetic iterator local for every `for` loop over a
/// non-`range(...)` iterable; `range` loops compile to a counter loop with
/// no iterator object, so they reserve nothing here.
fn collect_iterator_locals_into(body: &[Stmt], out: &mut BTreeSet<String>) {
    for stmt in body {
        if let Stmt::For { target, iter, body: inner, orelse, .. } = stmt {
            if !is_range_call(iter) {
                let synthetic = iterator_local_name(target);
                out.insert(synthetic);
            }
            collect_iterator_locals_into(inner, out);
            collect_iterator_locals_into(orelse, out);
        } else {
            for_each_nested_block(stmt, |block| collect_iterator_locals_into(block, out));
        }
    }
}

fn is_range_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call { func, .. } if matches!(&**func, Expr::Name { id, .. } if id == "range"))
}

fn iterator_local_name(target: &Expr) -> String {
    match target {
        Expr::Name { id, .. } => format!("__iter_{id}__"),
        _ => "__iter_unpack__".to_string(),
    }
}

fn collect_with_locals_into(body: &[Stmt], out: &mut BTreeSet<String>) {
    for stmt in body {
        if let Stmt::With { items, body: inner, .. } = stmt {
            for (i, _item) in items.iter().enumerate() {
                out.insert(format!("__with_ctx_{i}__"));
                out.insert(format!("__with_exit_{i}__"));
            }
            collect_with_locals_into(inner, out);
        } else {
            for_each_nested_block(stmt, |block| collect_with_locals_into(block, out));
        }
    }
}

/// Per comprehension (numbered in traversal order): a loop variable and
/// iterator local per generator clause (plus N extras for tuple-unpacking
/// targets), and one result-accumulator local for the comprehension itself.
fn collect_comprehension_locals_into(body: &[Stmt], out: &mut BTreeSet<String>, counter: &mut usize) {
    for stmt in body {
        walk_stmt_exprs(stmt, &mut |expr| collect_comprehension_locals_in_expr(expr, out, counter));
        for_each_nested_block(stmt, |block| collect_comprehension_locals_into(block, out, counter));
    }
}

fn collect_comprehension_locals_in_expr(expr: &Expr, out: &mut BTreeSet<String>, counter: &mut usize) {
    let generators = match expr {
        Expr::ListComp { generators, .. }
        | Expr::SetComp { generators, .. }
        | Expr::DictComp { generators, .. }
        | Expr::GeneratorExp { generators, .. } => Some(generators),
        _ => None,
    };
    if let Some(generators) = generators {
        let n = *counter;
        *counter += 1;
        out.insert(format!("__comp_{n}_result__"));
        for (gi, g) in generators.iter().enumerate() {
            out.insert(format!("__comp_{n}_loopvar_{gi}__"));
            out.insert(format!("__comp_{n}_iter_{gi}__"));
            if let Expr::Tuple { elements, .. } = &g.target {
                for (ti, _) in elements.iter().enumerate() {
                    out.insert(format!("__comp_{n}_unpack_{gi}_{ti}__"));
                }
            }
        }
    }
    walk_expr_children(expr, &mut |child| collect_comprehension_locals_in_expr(child, out, counter));
}

/// Names referenced anywhere in `body` that are not in `bound` and not
/// themselves a nested-def/class name bound at this level (those count as
/// locals, already in `bound`). Nested function bodies contribute their
/// *own* free variables back, intersected with this scope's bindings.
fn collect_free_vars_into(body: &[Stmt], bound: &BTreeSet<String>, out: &mut BTreeSet<String>) {
    for stmt in body {
        walk_stmt_exprs(stmt, &mut |expr| collect_free_names_in_expr(expr, bound, out));
        match stmt {
            Stmt::FunctionDef { params, body: inner, .. } => {
                let nested = analyze_body(inner, params);
                for fv in nested.free_vars {
                    if bound.contains(&fv) {
                        continue; // resolved locally here, not a capture
                    }
                    out.insert(fv);
                }
            }
            Stmt::ClassDef { body: inner, bases, .. } => {
                for b in bases {
                    collect_free_names_in_expr(b, bound, out);
                }
                let nested = analyze_body(inner, &[]);
                for fv in nested.free_vars {
                    if !bound.contains(&fv) {
                        out.insert(fv);
                    }
                }
            }
            _ => {}
        }
        for_each_nested_block(stmt, |block| collect_free_vars_into(block, bound, out));
    }
}

fn collect_free_names_in_expr(expr: &Expr, bound: &BTreeSet<String>, out: &mut BTreeSet<String>) {
    if let Expr::Name { id, .. } = expr {
        if !bound.contains(id) {
            out.insert(id.clone());
        }
    }
    if let Expr::Lambda { params, body, defaults, .. } = expr {
        let mut lambda_bound = bound.clone();
        lambda_bound.extend(params.iter().cloned());
        collect_free_names_in_expr(body, &lambda_bound, out);
        for d in defaults {
            collect_free_names_in_expr(d, bound, out);
        }
        return;
    }
    walk_expr_children(expr, &mut |child| collect_free_names_in_expr(child, bound, out));
}

/// Visits every direct `Expr` field of a statement (not recursing into
/// nested statement blocks — callers that want that pass this into
/// `for_each_nested_block` themselves).
fn walk_stmt_exprs(stmt: &Stmt, f: &mut impl FnMut(&Expr)) {
    match stmt {
        Stmt::Assign { targets, value, .. } => {
            targets.iter().for_each(&mut *f);
            f(value);
        }
        Stmt::AugAssign { target, value, .. } => {
            f(target);
            f(value);
        }
        Stmt::AnnAssign { target, annotation, value, .. } => {
            f(target);
            f(annotation);
            if let Some(v) = value {
                f(v);
            }
        }
        Stmt::ExprStmt { value, .. } => f(value),
        Stmt::If { test, .. } | Stmt::While { test, .. } => f(test),
        Stmt::For { target, iter, .. } => {
            f(target);
            f(iter);
        }
        Stmt::Return { value, .. } => {
            if let Some(v) = value {
                f(v);
            }
        }
        Stmt::Raise { exc, cause, .. } => {
            if let Some(e) = exc {
                f(e);
            }
            if let Some(c) = cause {
                f(c);
            }
        }
        Stmt::With { items, .. } => {
            for item in items {
                f(&item.context_expr);
                if let Some(v) = &item.optional_vars {
                    f(v);
                }
            }
        }
        Stmt::Match { subject, .. } => f(subject),
        Stmt::Try { handlers, .. } => {
            for h in handlers {
                if let Some(t) = &h.exc_type {
                    f(t);
                }
            }
        }
        Stmt::FunctionDef { decorators, params, .. } => {
            decorators.iter().for_each(&mut *f);
            for p in params {
                if let Some(d) = &p.default {
                    f(d);
                }
            }
        }
        Stmt::ClassDef { decorators, bases, .. } => {
            decorators.iter().for_each(&mut *f);
            bases.iter().for_each(f);
        }
        Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Pass { .. }
        | Stmt::Import { .. }
        | Stmt::Global { .. }
        | Stmt::Nonlocal { .. } => {}
    }
}

/// Calls `f` on every nested statement block *at the same scope* — i.e.
/// everything except a nested `FunctionDef`/`ClassDef` body, which is its
/// own scope and is analyzed separately.
fn for_each_nested_block<'a>(stmt: &'a Stmt, mut f: impl FnMut(&'a [Stmt])) {
    match stmt {
        Stmt::If { body, orelse, .. } | Stmt::While { body, orelse, .. } | Stmt::For { body, orelse, .. } => {
            f(body);
            f(orelse);
        }
        Stmt::Try { body, handlers, orelse, finalbody, .. } => {
            f(body);
            for h in handlers {
                f(&h.body);
            }
            f(orelse);
            f(finalbody);
        }
        Stmt::With { body, .. } => f(body),
        Stmt::Match { cases, .. } => {
            for c in cases {
                f(&c.body);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.to_string(), span: Span::default() }
    }

    fn const_int(text: &str) -> Expr {
        Expr::Constant { value: crate::syntax::Literal::Int { text: text.to_string() }, span: Span::default() }
    }

    #[test]
    fn plain_assignment_is_a_local() {
        let body = vec![Stmt::Assign { targets: vec![name("x")], value: const_int("1"), span: Span::default() }];
        let info = analyze_body(&body, &[]);
        assert!(info.locals.contains("x"));
    }

    #[test]
    fn for_over_range_reserves_no_iterator_local() {
        let body = vec![Stmt::For {
            target: name("i"),
            iter: Expr::Call { func: Box::new(name("range")), args: vec![const_int("5")], keywords: vec![], span: Span::default() },
            body: vec![],
            orelse: vec![],
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(info.iterator_locals.is_empty());
    }

    #[test]
    fn for_over_other_iterable_reserves_iterator_local() {
        let body = vec![Stmt::For {
            target: name("x"),
            iter: name("items"),
            body: vec![],
            orelse: vec![],
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(info.iterator_locals.contains("__iter_x__"));
    }

    #[test]
    fn nested_function_does_not_leak_its_locals() {
        let inner = vec![Stmt::Assign { targets: vec![name("y")], value: const_int("1"), span: Span::default() }];
        let body = vec![Stmt::FunctionDef {
            name: "f".into(),
            params: vec![],
            body: inner,
            decorators: vec![],
            is_async: false,
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(info.locals.contains("f"));
        assert!(!info.locals.contains("y"));
    }

    #[test]
    fn closure_captures_outer_variable_as_free_var() {
        let outer_body = vec![
            Stmt::Assign { targets: vec![name("x")], value: const_int("1"), span: Span::default() },
            Stmt::FunctionDef {
                name: "inner".into(),
                params: vec![],
                body: vec![Stmt::Return { value: Some(name("x")), span: Span::default() }],
                decorators: vec![],
                is_async: false,
                span: Span::default(),
            },
        ];
        let info = analyze_body(&outer_body, &[]);
        // inner's own free_vars would include "x"; that resolves to a
        // local in this enclosing scope, so it is not a free var *here*.
        assert!(!info.free_vars.contains("x"));
        assert!(info.locals.contains("x"));
    }

    #[test]
    fn walrus_binds_into_enclosing_scope() {
        let body = vec![Stmt::If {
            test: Expr::NamedExpr { target: "n".into(), value: Box::new(const_int("1")), span: Span::default() },
            body: vec![],
            orelse: vec![],
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(info.locals.contains("n"));
    }

    #[test]
    fn generator_detection_ignores_nested_function_yields() {
        let body = vec![Stmt::FunctionDef {
            name: "f".into(),
            params: vec![],
            body: vec![Stmt::ExprStmt { value: Expr::Yield { value: None, span: Span::default() }, span: Span::default() }],
            decorators: vec![],
            is_async: false,
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(!info.is_generator);
    }

    #[test]
    fn comprehension_reserves_loopvar_iter_and_result_locals() {
        let body = vec![Stmt::Assign {
            targets: vec![name("out")],
            value: Expr::ListComp {
                element: Box::new(name("i")),
                generators: vec![Comprehension { target: name("i"), iter: name("range5"), ifs: vec![], is_async: false }],
                span: Span::default(),
            },
            span: Span::default(),
        }];
        let info = analyze_body(&body, &[]);
        assert!(info.comprehension_locals.contains("__comp_0_result__"));
        assert!(info.comprehension_locals.contains("__comp_0_loopvar_0__"));
        assert!(info.comprehension_locals.contains("__comp_0_iter_0__"));
    }
}
