//! Exceptions are all routed through a single WASM exception tag,
//! `$PyException`, carrying an `$EXCEPTION` struct; the language-level
//! exception type hierarchy lives in the `$ty` string field, not in
//! distinct WASM tags. `StopIteration` is the one exception that doubles
//! as generator-loop control flow (see generators.rs) rather than
//! surfacing to user `except` clauses in the common case.

use crate::text::WatWriter;

pub fn emit_exception_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $exception_new (param $ty (ref $STRING)) (param $message anyref) (result (ref $EXCEPTION))",
        ")",
        |w| {
            w.line("(struct.new $EXCEPTION (local.get $ty) (local.get $message) (ref.null any) (ref.null any))");
        },
    );
    w.block(
        "(func $raise (param $exc (ref $EXCEPTION))",
        ")",
        |w| {
            w.line("(throw $PyException (local.get $exc))");
        },
    );
    // `$raise_from`: sets `$cause` before throwing, matching `raise X from Y`.
    w.block(
        "(func $raise_from (param $exc (ref $EXCEPTION)) (param $cause anyref)",
        ")",
        |w| {
            w.line("(struct.set $EXCEPTION $cause (local.get $exc) (local.get $cause))");
            w.line("(throw $PyException (local.get $exc))");
        },
    );
    w.block(
        "(func $exception_matches (param $exc (ref $EXCEPTION)) (param $ty (ref $STRING)) (result i32)",
        ")",
        |w| {
            w.line("(call $string_eq (struct.get $EXCEPTION $ty (local.get $exc)) (local.get $ty))");
        },
    );
    // WASM's exception-handling proposal hands a `catch` clause the payload
    // already bound to its declared type, so this cast only ever runs on an
    // `exnref` a `catch_all_ref` caught without unpacking it first.
    w.block(
        "(func $exception_from_exnref (param $e (ref null exn)) (result (ref $EXCEPTION))",
        ")",
        |w| {
            w.line("(ref.cast (ref $EXCEPTION) (local.get $e))");
        },
    );
    w.finish()
}

/// `$exception_type_name`: the display name `except ... as e` and traceback
/// formatting show for a caught value — the exception's own `$ty` field if
/// it's an `$EXCEPTION`, otherwise a user class's `$name`.
pub fn emit_exception_type_name() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $exception_type_name (param $v anyref) (result (ref $STRING))",
        ")",
        |w| {
            w.block("(if (result (ref $STRING)) (ref.test (ref $EXCEPTION) (local.get $v))", ")", |w| {
                w.line("(then (struct.get $EXCEPTION $ty (ref.cast (ref $EXCEPTION) (local.get $v))))");
                w.line("(else (struct.get $CLASS $name (ref.cast (ref $CLASS) (local.get $v))))");
            });
        },
    );
    w.finish()
}

/// The shape every compiled `try`/`except`/`finally` lowers to: a
/// `try_table` catching `$PyException` into an `exnref` local, dispatching
/// each `except` clause by `$exception_matches`, and re-throwing via
/// `exnref` if nothing matched so an enclosing handler (or a `finally`-only
/// frame) still sees it. This function documents the fixed skeleton; actual
/// clause bodies are spliced in by `pywasm_compiler::codegen::control_flow`.
pub fn try_table_skeleton(catch_body: &str, finally_body: &str) -> String {
    let mut w = WatWriter::default();
    w.block("(block $try_done", ")", |w| {
        w.line("(local $pending_exn (ref null exn))");
        w.block(
            "(try_table (catch $PyException $handler) (catch_all_ref $handler_any)",
            ")",
            |w| {
                w.line("(br $try_done)");
            },
        );
        w.line(";; $handler: dispatch except clauses over the caught exnref");
        w.line(catch_body);
        if !finally_body.is_empty() {
            w.line(";; finally");
            w.line(finally_body);
        }
    });
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_from_sets_cause_before_throw() {
        let out = emit_exception_ops();
        let set_pos = out.find("raise_from").unwrap();
        let body = &out[set_pos..];
        let cause_pos = body.find("struct.set $EXCEPTION $cause").unwrap();
        let throw_pos = body.find("throw $PyException").unwrap();
        assert!(cause_pos < throw_pos);
    }

    #[test]
    fn try_table_skeleton_includes_both_bodies() {
        let out = try_table_skeleton("(call $handle_value_error)", "(call $close_file)");
        assert!(out.contains("handle_value_error"));
        assert!(out.contains("close_file"));
        assert!(out.contains("try_table"));
    }

    #[test]
    fn exception_type_name_falls_back_to_class_name() {
        let out = emit_exception_type_name();
        assert!(out.contains("struct.get $EXCEPTION $ty"));
        assert!(out.contains("struct.get $CLASS $name"));
    }
}
