//! Integer and float arithmetic. Every integer op round-trips through
//! `$to_i64`/`$pack_int` so SmallInt/BigInt promotion is invisible to the
//! codegen layer — it just emits `call $int_add` and never branches on
//! which representation either operand happens to be in.

use crate::text::WatWriter;

/// `$int_add`/`$int_sub`/`$int_mul`: all `to_i64 -> wasm op -> pack_int`.
pub fn emit_basic_int_ops() -> String {
    let mut w = WatWriter::default();
    for (name, op) in [("int_add", "i64.add"), ("int_sub", "i64.sub"), ("int_mul", "i64.mul")] {
        w.block(
            &format!("(func ${name} (param $a anyref) (param $b anyref) (result anyref)"),
            ")",
            |w| {
                w.line(&format!(
                    "(call $pack_int ({op} (call $to_i64 (local.get $a)) (call $to_i64 (local.get $b))))"
                ));
            },
        );
    }
    w.finish()
}

/// `$int_div`: WASM's `i64.div_s` truncates toward zero; Python floor
/// division rounds toward negative infinity. Adjust by subtracting one
/// whenever the operands' signs differ and the remainder is nonzero.
pub fn emit_int_div() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $int_div (param $a anyref) (param $b anyref) (result anyref)",
        ")",
        |w| {
            w.line("(local $a64 i64) (local $b64 i64) (local $q i64) (local $r i64)");
            w.line("(local.set $a64 (call $to_i64 (local.get $a)))");
            w.line("(local.set $b64 (call $to_i64 (local.get $b)))");
            w.line("(local.set $q (i64.div_s (local.get $a64) (local.get $b64)))");
            w.line("(local.set $r (i64.rem_s (local.get $a64) (local.get $b64)))");
            w.block(
                "(if (result i64) (i32.and (i64.ne (local.get $r) (i64.const 0))\
 (i32.ne (i64.lt_s (local.get $a64) (i64.const 0)) (i64.lt_s (local.get $b64) (i64.const 0))))",
                ")",
                |w| {
                    w.line("(then (call $pack_int (i64.sub (local.get $q) (i64.const 1))))");
                    w.line("(else (call $pack_int (local.get $q)))");
                },
            );
        },
    );
    w.finish()
}

/// `$int_mod`: WASM's `i64.rem_s` takes the sign of the dividend; Python's
/// `%` takes the sign of the divisor. Add the divisor back when the signs
/// disagree and the remainder is nonzero.
pub fn emit_int_mod() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $int_mod (param $a anyref) (param $b anyref) (result anyref)",
        ")",
        |w| {
            w.line("(local $a64 i64) (local $b64 i64) (local $r i64)");
            w.line("(local.set $a64 (call $to_i64 (local.get $a)))");
            w.line("(local.set $b64 (call $to_i64 (local.get $b)))");
            w.line("(local.set $r (i64.rem_s (local.get $a64) (local.get $b64)))");
            w.block(
                "(if (result i64) (i32.and (i64.ne (local.get $r) (i64.const 0))\
 (i32.ne (i64.lt_s (local.get $r) (i64.const 0)) (i64.lt_s (local.get $b64) (i64.const 0))))",
                ")",
                |w| {
                    w.line("(then (call $pack_int (i64.add (local.get $r) (local.get $b64))))");
                    w.line("(else (call $pack_int (local.get $r)))");
                },
            );
        },
    );
    w.finish()
}

pub fn emit_int_neg_cmp_eq() -> String {
    let mut w = WatWriter::default();
    w.block("(func $int_neg (param $a anyref) (result anyref)", ")", |w| {
        w.line("(call $pack_int (i64.sub (i64.const 0) (call $to_i64 (local.get $a))))");
    });
    w.block(
        "(func $int_cmp (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.line("(local $a64 i64) (local $b64 i64)");
            w.line("(local.set $a64 (call $to_i64 (local.get $a)))");
            w.line("(local.set $b64 (call $to_i64 (local.get $b)))");
            w.block("(if (result i32) (i64.lt_s (local.get $a64) (local.get $b64))", ")", |w| {
                w.line("(then (i32.const -1))");
                w.block("(else", ")", |w| {
                    w.line("(if (result i32) (i64.gt_s (local.get $a64) (local.get $b64))");
                    w.line("  (then (i32.const 1))");
                    w.line("  (else (i32.const 0)))");
                });
            });
        },
    );
    w.block(
        "(func $int_eq (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.line("(i64.eq (call $to_i64 (local.get $a)) (call $to_i64 (local.get $b)))");
        },
    );
    w.finish()
}

/// `$i32_pow`: simple repeated-squaring-free loop, matching the modest
/// integer exponentiation needed for `**` on SmallInt exponents; floats go
/// through the imported `env.math_pow` host shim instead (see host_bridge).
pub fn emit_i32_pow() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $int_pow (param $base anyref) (param $exp anyref) (result anyref)",
        ")",
        |w| {
            w.line("(local $b64 i64) (local $n i64) (local $acc i64)");
            w.line("(local.set $b64 (call $to_i64 (local.get $base)))");
            w.line("(local.set $n (call $to_i64 (local.get $exp)))");
            w.line("(local.set $acc (i64.const 1))");
            w.block("(block $done", ")", |w| {
                w.block("(loop $loop", ")", |w| {
                    w.line("(br_if $done (i64.le_s (local.get $n) (i64.const 0)))");
                    w.line("(local.set $acc (i64.mul (local.get $acc) (local.get $b64)))");
                    w.line("(local.set $n (i64.sub (local.get $n) (i64.const 1)))");
                    w.line("(br $loop)");
                });
            });
            w.line("(call $pack_int (local.get $acc))");
        },
    );
    w.finish()
}

/// `$float_add`/`$float_sub`/`$float_mul`/`$float_div`/`$float_neg`: unbox
/// via `$to_f64`, apply the WASM `f64` op, rebox as `$FLOAT`.
pub fn emit_float_ops() -> String {
    let mut w = WatWriter::default();
    for (name, op) in [
        ("add", "f64.add"),
        ("sub", "f64.sub"),
        ("mul", "f64.mul"),
        ("div", "f64.div"),
    ] {
        w.block(
            &format!("(func $float_{name} (param $a anyref) (param $b anyref) (result anyref)"),
            ")",
            |w| {
                w.line(&format!(
                    "(struct.new $FLOAT ({op} (call $to_f64 (local.get $a)) (call $to_f64 (local.get $b))))"
                ));
            },
        );
    }
    w.block("(func $float_neg (param $a anyref) (result anyref)", ")", |w| {
        w.line("(struct.new $FLOAT (f64.neg (call $to_f64 (local.get $a))))");
    });
    w.block(
        "(func $float_cmp (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.line("(local $a64 f64) (local $b64 f64)");
            w.line("(local.set $a64 (call $to_f64 (local.get $a)))");
            w.line("(local.set $b64 (call $to_f64 (local.get $b)))");
            w.block("(if (result i32) (f64.lt (local.get $a64) (local.get $b64))", ")", |w| {
                w.line("(then (i32.const -1))");
                w.block("(else", ")", |w| {
                    w.line("(if (result i32) (f64.gt (local.get $a64) (local.get $b64))");
                    w.line("  (then (i32.const 1))");
                    w.line("  (else (i32.const 0)))");
                });
            });
        },
    );
    w.finish()
}

/// `int.to_bytes(length, byteorder)`: pack an i64 into a newly allocated
/// `$BYTES` region on the string heap, big- or little-endian.
pub fn emit_int_to_bytes() -> String {
    let mut w = WatWriter::default();
    for endian in ["big", "little"] {
        w.block(
            &format!(
                "(func $int_to_bytes_{endian} (param $v anyref) (param $length i32) (result anyref)"
            ),
            ")",
            |w| {
                w.line("(local $n i64) (local $i i32) (local $base i32) (local $shift i32)");
                w.line("(call $ensure_memory (local.get $length))");
                w.line("(local.set $base (global.get $string_heap))");
                w.line("(local.set $n (call $to_i64 (local.get $v)))");
                w.block("(block $done", ")", |w| {
                    w.block("(loop $loop", ")", |w| {
                        w.line("(br_if $done (i32.ge_u (local.get $i) (local.get $length)))");
                        if endian == "big" {
                            w.line(
                                "(local.set $shift (i32.mul (i32.sub (i32.sub (local.get $length) (i32.const 1)) (local.get $i)) (i32.const 8)))",
                            );
                        } else {
                            w.line("(local.set $shift (i32.mul (local.get $i) (i32.const 8)))");
                        }
                        w.line("(i32.store8");
                        w.line("  (i32.add (local.get $base) (local.get $i))");
                        w.line("  (i32.wrap_i64 (i64.shr_u (local.get $n) (i64.extend_i32_u (local.get $shift)))))");
                        w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                        w.line("(br $loop)");
                    });
                });
                w.line("(global.set $string_heap (i32.add (local.get $base) (local.get $length)))");
                w.line("(struct.new $BYTES (local.get $base) (local.get $length) (i32.const 1))");
            },
        );
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_add_calls_pack_int_and_to_i64() {
        let out = emit_basic_int_ops();
        assert!(out.contains("(func $int_add"));
        assert!(out.contains("call $pack_int"));
        assert!(out.contains("i64.add"));
    }

    #[test]
    fn int_div_adjusts_for_floor_semantics() {
        let out = emit_int_div();
        assert!(out.contains("i64.sub (local.get $q) (i64.const 1)"));
    }

    #[test]
    fn int_mod_takes_sign_of_divisor() {
        let out = emit_int_mod();
        assert!(out.contains("i64.add (local.get $r) (local.get $b64)"));
    }

    #[test]
    fn int_to_bytes_big_and_little_both_emitted() {
        let out = emit_int_to_bytes();
        assert!(out.contains("$int_to_bytes_big"));
        assert!(out.contains("$int_to_bytes_little"));
    }

    #[test]
    fn float_ops_round_trip_through_to_f64() {
        let out = emit_float_ops();
        assert!(out.contains("(func $float_add"));
        assert!(out.contains("call $to_f64"));
    }
}
