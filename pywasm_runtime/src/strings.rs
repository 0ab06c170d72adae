//! String-heap operations. Strings and bytes are `(offset, length)` slices
//! into an append-only region of linear memory; nothing is ever freed or
//! mutated in place, matching the data model's "append-only" invariant.

use crate::text::WatWriter;

/// `$string_concat`: allocate `len_a + len_b` bytes at the heap cursor,
/// copy both operands in, advance the cursor, return a new `$STRING`.
pub fn emit_string_concat() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $string_concat (param $a (ref $STRING)) (param $b (ref $STRING)) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(local $base i32) (local $total i32)");
            w.line("(local.set $total (i32.add (struct.get $STRING $len (local.get $a)) (struct.get $STRING $len (local.get $b))))");
            w.line("(call $ensure_memory (local.get $total))");
            w.line("(local.set $base (global.get $string_heap))");
            w.line("(call $memcpy (local.get $base) (struct.get $STRING $offset (local.get $a)) (struct.get $STRING $len (local.get $a)))");
            w.line("(call $memcpy");
            w.line("  (i32.add (local.get $base) (struct.get $STRING $len (local.get $a)))");
            w.line("  (struct.get $STRING $offset (local.get $b))");
            w.line("  (struct.get $STRING $len (local.get $b)))");
            w.line("(global.set $string_heap (i32.add (local.get $base) (local.get $total)))");
            w.line("(struct.new $STRING (local.get $base) (local.get $total))");
        },
    );
    w.finish()
}

/// `$string_slice`: Python-style `s[start:stop]` on byte offsets (ASCII/byte
/// semantics only — the data model does not specify full Unicode codepoint
/// indexing, so slicing operates on the same bytes the heap stores).
pub fn emit_string_slice() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $string_slice (param $s (ref $STRING)) (param $start i32) (param $stop i32) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(local $len i32)");
            w.line("(local.set $len (i32.sub (local.get $stop) (local.get $start)))");
            w.line("(struct.new $STRING (i32.add (struct.get $STRING $offset (local.get $s)) (local.get $start)) (local.get $len))");
        },
    );
    w.finish()
}

/// `$string_eq`: byte-for-byte comparison, short-circuiting on length.
pub fn emit_string_eq() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $string_eq (param $a (ref $STRING)) (param $b (ref $STRING)) (result i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $len i32)");
            w.line("(local.set $len (struct.get $STRING $len (local.get $a)))");
            w.block("(if (result i32) (i32.ne (local.get $len) (struct.get $STRING $len (local.get $b)))", ")", |w| {
                w.line("(then (i32.const 0))");
                w.block("(else", ")", |w| {
                    w.block("(block $mismatch (result i32)", ")", |w| {
                        w.block("(loop $loop (result i32)", ")", |w| {
                            w.line("(br_if $mismatch (i32.ge_u (local.get $i) (local.get $len)) (i32.const 1))");
                            w.line("(br_if $mismatch");
                            w.line("  (i32.ne");
                            w.line("    (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $a)) (local.get $i)))");
                            w.line("    (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $b)) (local.get $i))))");
                            w.line("  (i32.const 0))");
                            w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                            w.line("(br $loop)");
                        });
                    });
                });
            });
        },
    );
    w.finish()
}

/// `$fnv1a`: the string-hash function used by the dict/set hash table's
/// separate chaining (`$ENTRY.hash`). Identity hashing is used for ints
/// directly at the call site in collections.rs, not through this function.
pub fn emit_fnv1a() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $fnv1a (param $s (ref $STRING)) (result i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $h i32)");
            w.line("(local.set $h (i32.const -2128831035))"); // 0x811c9dc5 as i32
            w.block("(block $done", ")", |w| {
                w.block("(loop $loop", ")", |w| {
                    w.line("(br_if $done (i32.ge_u (local.get $i) (struct.get $STRING $len (local.get $s))))");
                    w.line("(local.set $h (i32.xor (local.get $h)");
                    w.line("  (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $s)) (local.get $i)))))");
                    w.line("(local.set $h (i32.mul (local.get $h) (i32.const 16777619)))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $loop)");
                });
            });
            w.line("(local.get $h)");
        },
    );
    w.finish()
}

/// `$f64_to_string`/`$f64_format_precision`/`$write_char`/`$write_i32`/
/// `$write_i64`/`$write_f64` are host imports (see host_bridge.rs), not
/// defined here; this module only owns the in-WASM string-heap mechanics
/// those shims write their output bytes into via `$string_heap`.
pub fn emit_int_to_string() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $int_to_string (param $v anyref) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(local $base i32) (local $len i32)");
            w.line("(local.set $base (global.get $string_heap))");
            w.line("(local.set $len (call $write_i64 (local.get $base) (call $to_i64 (local.get $v))))");
            w.line("(global.set $string_heap (i32.add (local.get $base) (local.get $len)))");
            w.line("(struct.new $STRING (local.get $base) (local.get $len))");
        },
    );
    w.finish()
}

/// `$load_string_literal`/`$load_bytes_literal`: wrap a fixed `(offset,
/// len)` slice that codegen has already placed in a `data` segment (see
/// `codegen::resolve`'s literal-placeholder pass) as a `$STRING`/`$BYTES`
/// value. No heap allocation happens here — literals live at their data
/// segment's address for the lifetime of the module.
pub fn emit_load_literal_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $load_string_literal (param $offset i32) (param $len i32) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(struct.new $STRING (local.get $offset) (local.get $len))");
        },
    );
    w.block(
        "(func $load_bytes_literal (param $offset i32) (param $len i32) (result (ref $BYTES))",
        ")",
        |w| {
            w.line("(struct.new $BYTES (local.get $offset) (local.get $len) (i32.const 1))");
        },
    );
    w.finish()
}

/// `$float_to_string`: bridges the host's `$f64_to_string` shim (see
/// host_bridge.rs) into a `$STRING`, the way `$int_to_string` bridges
/// `$write_i64`.
pub fn emit_float_to_string() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $float_to_string (param $v anyref) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(local $base i32) (local $len i32)");
            w.line("(local.set $base (global.get $string_heap))");
            w.line("(local.set $len (call $f64_to_string (local.get $base) (call $to_f64 (local.get $v))))");
            w.line("(global.set $string_heap (i32.add (local.get $base) (local.get $len)))");
            w.line("(struct.new $STRING (local.get $base) (local.get $len))");
        },
    );
    w.finish()
}

/// `$format_float_precision`: `"{:.Nf}"`-style fixed-precision formatting,
/// delegating the actual digit generation to the host's `$f64_format_precision`
/// shim (floating-point formatting is delegated to the host the same way
/// `$float_to_string` is, rather than reimplementing Grisu/Ryu in WAT).
pub fn emit_format_float_precision() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $format_float_precision (param $v anyref) (param $precision i32) (result (ref $STRING))",
        ")",
        |w| {
            w.line("(local $base i32) (local $len i32)");
            w.line("(local.set $base (global.get $string_heap))");
            w.line("(local.set $len (call $f64_format_precision (local.get $base) (call $to_f64 (local.get $v)) (local.get $precision)))");
            w.line("(global.set $string_heap (i32.add (local.get $base) (local.get $len)))");
            w.line("(struct.new $STRING (local.get $base) (local.get $len))");
        },
    );
    w.finish()
}

/// `$string_cmp`: byte-lexicographic ordering, the same scan `$string_eq`
/// does but returning -1/0/1 instead of a boolean.
pub fn emit_string_cmp() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $string_cmp (param $a (ref $STRING)) (param $b (ref $STRING)) (result i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $alen i32) (local $blen i32) (local $ac i32) (local $bc i32)");
            w.line("(local.set $alen (struct.get $STRING $len (local.get $a)))");
            w.line("(local.set $blen (struct.get $STRING $len (local.get $b)))");
            w.block("(block $done (result i32)", ")", |w| {
                w.block("(loop $loop (result i32)", ")", |w| {
                    w.line("(br_if $done (i32.and (i32.ge_u (local.get $i) (local.get $alen)) (i32.ge_u (local.get $i) (local.get $blen))) (i32.const 0))");
                    w.line("(br_if $done (i32.ge_u (local.get $i) (local.get $alen)) (i32.const -1))");
                    w.line("(br_if $done (i32.ge_u (local.get $i) (local.get $blen)) (i32.const 1))");
                    w.line("(local.set $ac (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $a)) (local.get $i))))");
                    w.line("(local.set $bc (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $b)) (local.get $i))))");
                    w.line("(br_if $done (i32.ne (local.get $ac) (local.get $bc)) (select (result i32) (i32.const -1) (i32.const 1) (i32.lt_u (local.get $ac) (local.get $bc))))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $loop)");
                });
            });
        },
    );
    w.finish()
}

/// `$string_contains`: naive substring scan (spec's data model does not
/// call for anything fancier than `in` over short scripted strings).
pub fn emit_string_contains() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $string_contains (param $haystack (ref $STRING)) (param $needle (ref $STRING)) (result i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $hlen i32) (local $nlen i32) (local $j i32)");
            w.line("(local.set $hlen (struct.get $STRING $len (local.get $haystack)))");
            w.line("(local.set $nlen (struct.get $STRING $len (local.get $needle)))");
            w.block("(if (result i32) (i32.eqz (local.get $nlen))", ")", |w| {
                w.line("(then (i32.const 1))");
                w.block("(else", ")", |w| {
                    w.block("(block $found (result i32)", ")", |w| {
                        w.block("(loop $outer (result i32)", ")", |w| {
                            w.line("(br_if $found (i32.gt_u (i32.add (local.get $i) (local.get $nlen)) (local.get $hlen)) (i32.const 0))");
                            w.line("(local.set $j (i32.const 0))");
                            w.block("(block $mismatch", ")", |w| {
                                w.block("(loop $inner", ")", |w| {
                                    w.line("(br_if $mismatch (i32.ge_u (local.get $j) (local.get $nlen)))");
                                    w.line("(br_if $mismatch");
                                    w.line("  (i32.ne");
                                    w.line("    (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $haystack)) (i32.add (local.get $i) (local.get $j))))");
                                    w.line("    (i32.load8_u (i32.add (struct.get $STRING $offset (local.get $needle)) (local.get $j)))))");
                                    w.line("(local.set $j (i32.add (local.get $j) (i32.const 1)))");
                                    w.line("(br $inner)");
                                });
                            });
                            w.line("(br_if $found (i32.ge_u (local.get $j) (local.get $nlen)) (i32.const 1))");
                            w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                            w.line("(br $outer)");
                        });
                    });
                });
            });
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_advances_heap_cursor() {
        let out = emit_string_concat();
        assert!(out.contains("global.set $string_heap"));
        assert!(out.contains("call $memcpy"));
    }

    #[test]
    fn string_eq_short_circuits_on_length() {
        let out = emit_string_eq();
        assert!(out.contains("i32.ne (local.get $len)"));
    }

    #[test]
    fn fnv1a_uses_offset_basis() {
        let out = emit_fnv1a();
        assert!(out.contains("i32.const -2128831035"));
    }
}
