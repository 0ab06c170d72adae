//! Environment frames and closure calling. Every compiled function shares
//! one call-indirect-compatible signature (`$env`, `$args` PAIR chain,
//! result `anyref`), so a closure value is just a function-table index plus
//! the `$ENV` frame it captured — calling one is a single `call_indirect`.

use crate::text::WatWriter;

/// `$env_get`/`$env_set` read or write the current frame's own slot array;
/// `$env_get_nonlocal` walks up through `$parent` until it finds a frame
/// whose slot at that index isn't `ref.null any`, matching Python's
/// closure-cell lookup for `nonlocal`/free-variable reads without needing a
/// separate cell-box type.
pub fn emit_env_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $env_get (param $env (ref null $ENV)) (param $idx i32) (result anyref)",
        ")",
        |w| {
            w.line("(array.get $ARRAY_ANY (struct.get $ENV $slots (local.get $env)) (local.get $idx))");
        },
    );
    w.block(
        "(func $env_set (param $env (ref null $ENV)) (param $idx i32) (param $v anyref)",
        ")",
        |w| {
            w.line("(array.set $ARRAY_ANY (struct.get $ENV $slots (local.get $env)) (local.get $idx) (local.get $v))");
        },
    );
    w.block(
        "(func $env_get_nonlocal (param $env (ref null $ENV)) (param $idx i32) (result anyref)",
        ")",
        |w| {
            w.line("(local $cur (ref null $ENV)) (local $v anyref)");
            w.line("(local.set $cur (local.get $env))");
            w.block("(block $done (result anyref)", ")", |w| {
                w.block("(loop $walk (result anyref)", ")", |w| {
                    w.line("(br_if $done (ref.is_null (local.get $cur)) (ref.null any))");
                    w.line("(local.set $v (call $env_get (local.get $cur) (local.get $idx)))");
                    w.line("(br_if $done (i32.eqz (ref.is_null (local.get $v))) (local.get $v))");
                    w.line("(local.set $cur (struct.get $ENV $parent (local.get $cur)))");
                    w.line("(br $walk)");
                });
            });
        },
    );
    w.finish()
}

/// `$make_closure`/`$make_lambda_closure`: identical — a `def` and a
/// `lambda` both hoist to their own table-indexed function and capture the
/// frame they were defined in, so there is nothing lambda-specific left to
/// do once the body has its own table slot.
pub fn emit_closure_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $make_closure (param $env (ref null $ENV)) (param $func_idx i32) (result (ref $CLOSURE))",
        ")",
        |w| {
            w.line("(struct.new $CLOSURE (local.get $func_idx) (local.get $env))");
        },
    );
    w.block(
        "(func $make_lambda_closure (param $env (ref null $ENV)) (param $func_idx i32) (result (ref $CLOSURE))",
        ")",
        |w| {
            w.line("(call $make_closure (local.get $env) (local.get $func_idx))");
        },
    );
    w.block(
        "(func $call_closure (param $c (ref $CLOSURE)) (param $args (ref null $PAIR)) (result anyref)",
        ")",
        |w| {
            w.line(
                "(call_indirect $functions (type $FUNC) (struct.get $CLOSURE $env (local.get $c)) (local.get $args) (struct.get $CLOSURE $func_idx (local.get $c)))",
            );
        },
    );
    w.block(
        "(func $call_closure_1 (param $c (ref $CLOSURE)) (param $a0 anyref) (result anyref)",
        ")",
        |w| {
            w.line("(call $call_closure (local.get $c) (struct.new $PAIR (local.get $a0) (ref.null $PAIR)))");
        },
    );
    w.block(
        "(func $call_closure_2 (param $c (ref $CLOSURE)) (param $a0 anyref) (param $a1 anyref) (result anyref)",
        ")",
        |w| {
            w.line(
                "(call $call_closure (local.get $c) (struct.new $PAIR (local.get $a0) (struct.new $PAIR (local.get $a1) (ref.null $PAIR))))",
            );
        },
    );
    w.finish()
}

/// `$rest_args`: materializes the remainder of a `$PAIR` argument chain into
/// a `$LIST`, backing `*args` parameter binding.
pub fn emit_rest_args() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $rest_args (param $cursor (ref null $PAIR)) (result (ref $LIST))",
        ")",
        |w| {
            w.line("(local $out (ref $LIST)) (local $cur (ref null $PAIR))");
            w.line("(local.set $out (call $list_new))");
            w.line("(local.set $cur (local.get $cursor))");
            w.block("(block $done", ")", |w| {
                w.block("(loop $walk", ")", |w| {
                    w.line("(br_if $done (ref.is_null (local.get $cur)))");
                    w.line("(call $list_append (local.get $out) (struct.get $PAIR $car (local.get $cur)))");
                    w.line("(local.set $cur (ref.cast (ref null $PAIR) (struct.get $PAIR $cdr (local.get $cur))))");
                    w.line("(br $walk)");
                });
            });
            w.line("(local.get $out)");
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_get_nonlocal_walks_parent_chain() {
        let out = emit_env_ops();
        assert!(out.contains("$env_get_nonlocal"));
        assert!(out.contains("struct.get $ENV $parent"));
    }

    #[test]
    fn call_closure_uses_call_indirect_on_functions_table() {
        let out = emit_closure_ops();
        assert!(out.contains("call_indirect $functions (type $FUNC)"));
    }

    #[test]
    fn rest_args_builds_a_list() {
        let out = emit_rest_args();
        assert!(out.contains("call $list_new"));
        assert!(out.contains("call $list_append"));
    }
}
