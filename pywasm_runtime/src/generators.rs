//! Generators are stackless state machines: a `$GENERATOR` struct holds a
//! `state` counter, a snapshot of locals, and enough of a closure to resume
//! the compiled function body at the right `br_table` arm. Two codegen
//! shapes exist on the compiler side (simple generators dispatch over
//! `state` directly; generators with yields inside loops save/restore
//! locals around re-entry) but both land on the same runtime shape here.

use crate::text::WatWriter;

pub fn emit_generator_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $generator_new (param $func_idx i32) (param $env (ref null $ENV)) (param $n_locals i32) (result (ref $GENERATOR))",
        ")",
        |w| {
            w.line("(struct.new $GENERATOR");
            w.line("  (i32.const 0)");
            w.line("  (ref.null any)");
            w.line("  (array.new $ARRAY_ANY (ref.null any) (local.get $n_locals))");
            w.line("  (local.get $func_idx)");
            w.line("  (local.get $env)");
            w.line("  (ref.null any))");
        },
    );

    // `$generator_next`: resumes the compiled body via the generator's
    // stashed `$func_idx`. `StopIteration` raised inside the body is
    // translated here into the runtime's own "exhausted" signal (state -1)
    // rather than re-thrown, so a `for` loop over the generator doesn't need
    // its own try_table around every iteration.
    w.block(
        "(func $generator_next (param $g (ref $GENERATOR)) (result anyref)",
        ")",
        |w| {
            w.block(
                "(if (result anyref) (i32.eq (struct.get $GENERATOR $state (local.get $g)) (i32.const -1))",
                ")",
                |w| {
                    w.line("(then (throw $StopIteration))");
                    w.block("(else", ")", |w| {
                        w.block("(block $resumed (result anyref)", ")", |w| {
                            w.block(
                                "(try_table (catch $StopIteration $exhausted) (result anyref)",
                                ")",
                                |w| {
                                    w.line("(call_ref $FUNC_SPEC_0 (struct.get $GENERATOR $func_idx (local.get $g)))");
                                },
                            );
                            w.line(";; $exhausted:");
                            w.line("(struct.set $GENERATOR $state (local.get $g) (i32.const -1))");
                            w.line("(throw $StopIteration)");
                        });
                    });
                },
            );
        },
    );

    w.block(
        "(func $generator_send (param $g (ref $GENERATOR)) (param $value anyref) (result anyref)",
        ")",
        |w| {
            w.line("(struct.set $GENERATOR $sent_value (local.get $g) (local.get $value))");
            w.line("(call $generator_next (local.get $g))");
        },
    );

    w.finish()
}

/// `$generator_save_locals`/`$generator_restore_locals`: used only by the
/// "complex" generator shape (yields nested inside loops), where the
/// compiled body must snapshot loop-carried locals into `$GENERATOR.locals`
/// before yielding and restore them on the next `br_table` re-entry. Simple
/// generators (a flat sequence of yields with no enclosing loop) never call
/// these — their state fits entirely in the `state` counter itself.
pub fn emit_locals_save_restore() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $generator_save_local (param $g (ref $GENERATOR)) (param $slot i32) (param $v anyref)",
        ")",
        |w| {
            w.line("(array.set $ARRAY_ANY (struct.get $GENERATOR $locals (local.get $g)) (local.get $slot) (local.get $v))");
        },
    );
    w.block(
        "(func $generator_restore_local (param $g (ref $GENERATOR)) (param $slot i32) (result anyref)",
        ")",
        |w| {
            w.line("(array.get $ARRAY_ANY (struct.get $GENERATOR $locals (local.get $g)) (local.get $slot))");
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_on_exhausted_generator_rethrows_stop_iteration() {
        let out = emit_generator_ops();
        assert!(out.contains("i32.const -1"));
        assert!(out.contains("throw $StopIteration"));
    }

    #[test]
    fn send_stashes_value_before_resuming() {
        let out = emit_generator_ops();
        let send_pos = out.find("generator_send").unwrap();
        let body = &out[send_pos..];
        let set_pos = body.find("$sent_value").unwrap();
        let call_pos = body.find("call $generator_next").unwrap();
        assert!(set_pos < call_pos);
    }
}
