//! Dict/Set (separate-chaining hash table) and List/Tuple (flat array)
//! runtime operations, plus `sorted()`/`list.sort()`.
//!
//! The hash table never resizes or rehashes — the data model accepts
//! O(n) chain length under adversarial key sets as a stated limitation
//! rather than implementing incremental rehashing.

use crate::text::WatWriter;

const INITIAL_BUCKET_COUNT: u32 = 16;

pub fn emit_hashtable_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $hashtable_new (result (ref $HASHTABLE))",
        ")",
        |w| {
            w.line(&format!(
                "(struct.new $HASHTABLE (array.new $BUCKET_ARRAY (ref.null $ENTRY) (i32.const {INITIAL_BUCKET_COUNT})) (i32.const 0))"
            ));
        },
    );
    w.block(
        "(func $hash_key (param $k anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (ref.test (ref $STRING) (local.get $k))", ")", |w| {
                w.line("(then (call $fnv1a (ref.cast (ref $STRING) (local.get $k))))");
                w.block("(else", ")", |w| {
                    w.line("(if (result i32) (call $is_integer (local.get $k))");
                    w.line("  (then (i32.wrap_i64 (call $to_i64 (local.get $k))))");
                    w.block("  (else", "  )", |w| {
                        // Floats hash by their bit pattern, xor-folded into
                        // 32 bits, so equal float values always land in the
                        // same bucket regardless of identity.
                        w.line("(if (result i32) (ref.test (ref $FLOAT) (local.get $k))");
                        w.line("  (then");
                        w.line("    (local $bits i64)");
                        w.line("    (local.set $bits (i64.reinterpret_f64 (struct.get $FLOAT $value (ref.cast (ref $FLOAT) (local.get $k)))))");
                        w.line("    (i32.xor (i32.wrap_i64 (local.get $bits)) (i32.wrap_i64 (i64.shr_u (local.get $bits) (i64.const 32)))))");
                        // identity hash for any other reference kind: WASM GC
                        // has no address-of, so fall back to a fixed bucket and
                        // let equality comparison do the real work in that chain.
                        w.line("  (else (i32.const 0)))");
                    });
                });
            });
        },
    );
    w.block(
        "(func $key_eq (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (ref.test (ref $STRING) (local.get $a))", ")", |w| {
                w.line("(then (call $string_eq (ref.cast (ref $STRING) (local.get $a)) (ref.cast (ref $STRING) (local.get $b))))");
                w.block("(else", ")", |w| {
                    w.line("(if (result i32) (call $is_integer (local.get $a))");
                    w.line("  (then (call $int_eq (local.get $a) (local.get $b)))");
                    w.block("  (else", "  )", |w| {
                        w.line("(if (result i32) (ref.test (ref $FLOAT) (local.get $a))");
                        w.line("  (then (if (result i32) (ref.test (ref $FLOAT) (local.get $b))");
                        w.line("    (then (f64.eq (struct.get $FLOAT $value (ref.cast (ref $FLOAT) (local.get $a))) (struct.get $FLOAT $value (ref.cast (ref $FLOAT) (local.get $b)))))");
                        w.line("    (else (i32.const 0))))");
                        w.line("  (else (ref.eq (local.get $a) (local.get $b))))");
                    });
                });
            });
        },
    );
    w.block(
        "(func $hashtable_set (param $t (ref $HASHTABLE)) (param $k anyref) (param $v anyref)",
        ")",
        |w| {
            w.line("(local $h i32) (local $idx i32) (local $bucket (ref null $ENTRY)) (local $cur (ref null $ENTRY))");
            w.line("(local.set $h (call $hash_key (local.get $k)))");
            w.line("(local.set $idx (i32.rem_u (local.get $h) (array.len (struct.get $HASHTABLE $buckets (local.get $t)))))");
            w.line("(local.set $cur (array.get $BUCKET_ARRAY (struct.get $HASHTABLE $buckets (local.get $t)) (local.get $idx)))");
            w.block("(block $inserted", ")", |w| {
                w.block("(loop $scan", ")", |w| {
                    w.line("(br_if $inserted (ref.is_null (local.get $cur)))");
                    w.block(
                        "(if (call $key_eq (struct.get $ENTRY $key (local.get $cur)) (local.get $k))",
                        ")",
                        |w| {
                            w.line("(then");
                            w.line("  (struct.set $ENTRY $value (local.get $cur) (local.get $v))");
                            w.line("  (br $inserted))");
                        },
                    );
                    w.line("(local.set $cur (struct.get $ENTRY $next (local.get $cur)))");
                    w.line("(br $scan)");
                });
            });
            // cur is null here only when no existing entry matched; chain a
            // fresh one at the bucket head.
            w.line("(local.set $bucket (array.get $BUCKET_ARRAY (struct.get $HASHTABLE $buckets (local.get $t)) (local.get $idx)))");
            w.line("(array.set $BUCKET_ARRAY (struct.get $HASHTABLE $buckets (local.get $t)) (local.get $idx)");
            w.line("  (struct.new $ENTRY (local.get $h) (local.get $k) (local.get $v) (local.get $bucket)))");
            w.line("(struct.set $HASHTABLE $count (local.get $t) (i32.add (struct.get $HASHTABLE $count (local.get $t)) (i32.const 1)))");
        },
    );
    w.block(
        "(func $hashtable_get (param $t (ref $HASHTABLE)) (param $k anyref) (result anyref)",
        ")",
        |w| {
            w.line("(local $idx i32) (local $cur (ref null $ENTRY))");
            w.line("(local.set $idx (i32.rem_u (call $hash_key (local.get $k)) (array.len (struct.get $HASHTABLE $buckets (local.get $t)))))");
            w.line("(local.set $cur (array.get $BUCKET_ARRAY (struct.get $HASHTABLE $buckets (local.get $t)) (local.get $idx)))");
            w.block("(block $miss (result anyref)", ")", |w| {
                w.block("(loop $scan (result anyref)", ")", |w| {
                    w.line("(br_if $miss (ref.is_null (local.get $cur)) (ref.null any))");
                    w.block(
                        "(if (result anyref) (call $key_eq (struct.get $ENTRY $key (local.get $cur)) (local.get $k))",
                        ")",
                        |w| {
                            w.line("(then (struct.get $ENTRY $value (local.get $cur)))");
                            w.block("(else", ")", |w| {
                                w.line("(local.set $cur (struct.get $ENTRY $next (local.get $cur)))");
                                w.line("(br $scan)");
                            });
                        },
                    );
                });
            });
        },
    );
    w.finish()
}

pub fn emit_dict_set_wrappers() -> String {
    let mut w = WatWriter::default();
    w.block("(func $dict_new (result (ref $DICT))", ")", |w| {
        w.line("(struct.new $DICT (call $hashtable_new))");
    });
    w.block(
        "(func $dict_set (param $d (ref $DICT)) (param $k anyref) (param $v anyref)",
        ")",
        |w| {
            w.line("(call $hashtable_set (struct.get $DICT $table (local.get $d)) (local.get $k) (local.get $v))");
        },
    );
    w.block(
        "(func $dict_get (param $d (ref $DICT)) (param $k anyref) (result anyref)",
        ")",
        |w| {
            w.line("(call $hashtable_get (struct.get $DICT $table (local.get $d)) (local.get $k))");
        },
    );
    w.block("(func $set_new (result (ref $SET))", ")", |w| {
        w.line("(struct.new $SET (call $hashtable_new))");
    });
    w.block(
        "(func $set_add (param $s (ref $SET)) (param $v anyref)",
        ")",
        |w| {
            w.line("(call $hashtable_set (struct.get $SET $table (local.get $s)) (local.get $v) (local.get $v))");
        },
    );
    w.block(
        "(func $set_contains (param $s (ref $SET)) (param $v anyref) (result i32)",
        ")",
        |w| {
            w.line("(i32.eqz (ref.is_null (call $hashtable_get (struct.get $SET $table (local.get $s)) (local.get $v))))");
        },
    );
    w.finish()
}

/// `$list_new`/`$list_append`/`$list_get`/`$list_set`, growing the backing
/// `$ARRAY_ANY` by doubling capacity when full — the one place this runtime
/// does amortized-growth bookkeeping (unlike the hash table, which never
/// resizes).
pub fn emit_list_ops() -> String {
    let mut w = WatWriter::default();
    w.block("(func $list_new (result (ref $LIST))", ")", |w| {
        w.line("(struct.new $LIST (array.new $ARRAY_ANY (ref.null any) (i32.const 8)) (i32.const 0) (i32.const 8))");
    });
    w.block(
        "(func $list_append (param $l (ref $LIST)) (param $v anyref)",
        ")",
        |w| {
            w.line("(local $len i32) (local $cap i32) (local $grown (ref $ARRAY_ANY))");
            w.line("(local.set $len (struct.get $LIST $len (local.get $l)))");
            w.line("(local.set $cap (struct.get $LIST $cap (local.get $l)))");
            w.block("(if (i32.ge_u (local.get $len) (local.get $cap))", ")", |w| {
                w.line("(then");
                w.line("  (local.set $cap (i32.mul (local.get $cap) (i32.const 2)))");
                w.line("  (local.set $grown (array.new $ARRAY_ANY (ref.null any) (local.get $cap)))");
                w.line("  (array.copy $ARRAY_ANY $ARRAY_ANY (local.get $grown) (i32.const 0)");
                w.line("    (struct.get $LIST $data (local.get $l)) (i32.const 0) (local.get $len))");
                w.line("  (struct.set $LIST $data (local.get $l) (local.get $grown))");
                w.line("  (struct.set $LIST $cap (local.get $l) (local.get $cap)))");
            });
            w.line("(array.set $ARRAY_ANY (struct.get $LIST $data (local.get $l)) (local.get $len) (local.get $v))");
            w.line("(struct.set $LIST $len (local.get $l) (i32.add (local.get $len) (i32.const 1)))");
        },
    );
    w.block(
        "(func $list_get (param $l (ref $LIST)) (param $i i32) (result anyref)",
        ")",
        |w| {
            w.line("(array.get $ARRAY_ANY (struct.get $LIST $data (local.get $l)) (local.get $i))");
        },
    );
    w.block(
        "(func $list_set (param $l (ref $LIST)) (param $i i32) (param $v anyref)",
        ")",
        |w| {
            w.line("(array.set $ARRAY_ANY (struct.get $LIST $data (local.get $l)) (local.get $i) (local.get $v))");
        },
    );
    w.finish()
}

/// `$tuple_new`: tuples are fixed-length once built, so no growth path is
/// needed — the caller supplies the exact backing array up front.
pub fn emit_tuple_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $tuple_new (param $data (ref $ARRAY_ANY)) (param $len i32) (result (ref $TUPLE))",
        ")",
        |w| {
            w.line("(struct.new $TUPLE (local.get $data) (local.get $len))");
        },
    );
    // `$list_new_tuple`: tuple literal construction builds through the same
    // growable list as `[...]` does, then the caller appends each element via
    // `$list_append`. A tuple's own immutability is enforced by never routing
    // a `$LIST` built this way through `$setitem`, not by a distinct backing
    // type — the real `$TUPLE`/`$tuple_new` above still backs values that
    // genuinely need the fixed-length representation (e.g. dict keys).
    w.block("(func $list_new_tuple (result (ref $LIST))", ")", |w| {
        w.line("(call $list_new)");
    });
    w.finish()
}

/// `$list_concat`: `+` between two lists builds a fresh list rather than
/// mutating either operand, matching Python's own `list.__add__`.
pub fn emit_list_concat() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $list_concat (param $a (ref $LIST)) (param $b (ref $LIST)) (result (ref $LIST))",
        ")",
        |w| {
            w.line("(local $out (ref $LIST)) (local $i i32) (local $alen i32) (local $blen i32)");
            w.line("(local.set $out (call $list_new))");
            w.line("(local.set $alen (struct.get $LIST $len (local.get $a)))");
            w.line("(local.set $blen (struct.get $LIST $len (local.get $b)))");
            w.block("(block $a_done", ")", |w| {
                w.block("(loop $a_loop", ")", |w| {
                    w.line("(br_if $a_done (i32.ge_u (local.get $i) (local.get $alen)))");
                    w.line("(call $list_append (local.get $out) (call $list_get (local.get $a) (local.get $i)))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $a_loop)");
                });
            });
            w.line("(local.set $i (i32.const 0))");
            w.block("(block $b_done", ")", |w| {
                w.block("(loop $b_loop", ")", |w| {
                    w.line("(br_if $b_done (i32.ge_u (local.get $i) (local.get $blen)))");
                    w.line("(call $list_append (local.get $out) (call $list_get (local.get $b) (local.get $i)))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $b_loop)");
                });
            });
            w.line("(local.get $out)");
        },
    );
    w.finish()
}

/// `$list_sort`: insertion sort over the backing array using a supplied
/// three-way comparator closure index, stable and in place. Insertion sort
/// (not a divide-and-conquer sort) keeps codegen simple and is adequate for
/// the list sizes this runtime targets; `reverse` just flips the final scan
/// direction rather than the comparator.
pub fn emit_list_sort() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $list_sort (param $l (ref $LIST)) (param $cmp (ref $CLOSURE)) (param $reverse i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $j i32) (local $len i32) (local $key anyref) (local $cmp_result i32)");
            w.line("(local.set $len (struct.get $LIST $len (local.get $l)))");
            w.line("(local.set $i (i32.const 1))");
            w.block("(block $outer_done", ")", |w| {
                w.block("(loop $outer", ")", |w| {
                    w.line("(br_if $outer_done (i32.ge_u (local.get $i) (local.get $len)))");
                    w.line("(local.set $key (call $list_get (local.get $l) (local.get $i)))");
                    w.line("(local.set $j (local.get $i))");
                    w.block("(block $inner_done", ")", |w| {
                        w.block("(loop $inner", ")", |w| {
                            w.line("(br_if $inner_done (i32.le_s (local.get $j) (i32.const 0)))");
                            w.line("(local.set $cmp_result (call $call_closure_2 (local.get $cmp) (call $list_get (local.get $l) (i32.sub (local.get $j) (i32.const 1))) (local.get $key)))");
                            w.block(
                                "(if (i32.eqz (i32.xor (i32.gt_s (local.get $cmp_result) (i32.const 0)) (local.get $reverse)))",
                                ")",
                                |w| {
                                    w.line("(then (br $inner_done))");
                                },
                            );
                            w.line("(call $list_set (local.get $l) (local.get $j) (call $list_get (local.get $l) (i32.sub (local.get $j) (i32.const 1))))");
                            w.line("(local.set $j (i32.sub (local.get $j) (i32.const 1)))");
                            w.line("(br $inner)");
                        });
                    });
                    w.line("(call $list_set (local.get $l) (local.get $j) (local.get $key))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $outer)");
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
    fn hashtable_new_uses_initial_bucket_count() {
        let out = emit_hashtable_ops();
        assert!(out.contains(&format!("i32.const {INITIAL_BUCKET_COUNT}")));
    }

    #[test]
    fn hashtable_set_chains_on_collision() {
        let out = emit_hashtable_ops();
        assert!(out.contains("struct.new $ENTRY"));
        assert!(out.contains("$next"));
    }

    #[test]
    fn list_append_doubles_capacity_when_full() {
        let out = emit_list_ops();
        assert!(out.contains("i32.mul (local.get $cap) (i32.const 2)"));
    }

    #[test]
    fn sort_never_resizes_the_table_itself() {
        let out = emit_list_sort();
        assert!(!out.contains("hashtable"));
    }

    #[test]
    fn float_keys_hash_and_compare_by_value_not_identity() {
        let out = emit_hashtable_ops();
        assert!(out.contains("i64.reinterpret_f64"));
        assert!(out.contains("f64.eq (struct.get $FLOAT $value"));
    }

    #[test]
    fn list_concat_builds_a_fresh_list() {
        let out = emit_list_concat();
        assert!(out.contains("call $list_new"));
        assert!(out.contains("call $list_append (local.get $out)"));
    }
}
