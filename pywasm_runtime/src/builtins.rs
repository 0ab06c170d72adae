//! Free-standing builtin functions (`len`, `print`, `str`, ...), the
//! container-agnostic `$subscript`/`$setitem`/`$get_iter` family every
//! `[]`/`for`/comprehension lowers to, and the sequence-unpacking helpers
//! tuple/list-target assignment and starred `match` patterns call.

use crate::text::{literal_data_token, WatWriter};

fn raise_type_error(w: &mut WatWriter, message: &str) {
    let token = literal_data_token(message.as_bytes());
    w.line(&format!(
        "(call $raise (call $exception_new (call $load_string_literal (i32.const {token}) (i32.const {})) (ref.null any)))",
        message.len()
    ));
}

/// `$seq_len`/`$seq_get`: the list/tuple/string dispatch shared by
/// `$subscript`, `$builtin_len`, and sequence iteration. Dicts and sets are
/// deliberately excluded — callers that can see either (`$subscript`,
/// `$builtin_len`) check for them first, since dict/set "length" and
/// "indexing" aren't the same operation as a sequence's.
pub fn emit_seq_ops() -> String {
    let mut w = WatWriter::default();
    w.block("(func $seq_len (param $v anyref) (result i32)", ")", |w| {
        w.block("(if (result i32) (ref.test (ref $LIST) (local.get $v))", ")", |w| {
            w.line("(then (struct.get $LIST $len (ref.cast (ref $LIST) (local.get $v))))");
            w.block("(else", ")", |w| {
                w.block("(if (result i32) (ref.test (ref $TUPLE) (local.get $v))", ")", |w| {
                    w.line("(then (struct.get $TUPLE $len (ref.cast (ref $TUPLE) (local.get $v))))");
                    w.line("(else (struct.get $STRING $len (ref.cast (ref $STRING) (local.get $v))))");
                });
            });
        });
    });
    w.block(
        "(func $seq_get (param $v anyref) (param $i i32) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (ref.test (ref $LIST) (local.get $v))", ")", |w| {
                w.line("(then (call $list_get (ref.cast (ref $LIST) (local.get $v)) (local.get $i)))");
                w.block("(else", ")", |w| {
                    w.block("(if (result anyref) (ref.test (ref $TUPLE) (local.get $v))", ")", |w| {
                        w.line("(then (array.get $ARRAY_ANY (struct.get $TUPLE $data (ref.cast (ref $TUPLE) (local.get $v))) (local.get $i)))");
                        w.line("(else (call $string_slice (ref.cast (ref $STRING) (local.get $v)) (local.get $i) (i32.add (local.get $i) (i32.const 1))))");
                    });
                });
            });
        },
    );
    // Python negative indices count from the end; every caller that takes a
    // signed logical index normalizes through this first.
    w.block(
        "(func $normalize_index (param $v anyref) (param $idx i32) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (i32.lt_s (local.get $idx) (i32.const 0))", ")", |w| {
                w.line("(then (i32.add (local.get $idx) (call $seq_len (local.get $v))))");
                w.line("(else (local.get $idx))");
            });
        },
    );
    w.finish()
}

/// `$subscript`/`$setitem`: unified `[]` get/set, dispatching on the
/// container's runtime type (dict key lookup vs. bounded sequence indexing
/// with negative-index support). Tuples and strings have no `$setitem`
/// path — both are immutable in the data model.
pub fn emit_subscript_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $subscript (param $v anyref) (param $index anyref) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (ref.test (ref $DICT) (local.get $v))", ")", |w| {
                w.line("(then (call $dict_get (ref.cast (ref $DICT) (local.get $v)) (local.get $index)))");
                w.block("(else", ")", |w| {
                    w.block("(if (result anyref) (i32.or (i32.or (ref.test (ref $LIST) (local.get $v)) (ref.test (ref $TUPLE) (local.get $v))) (ref.test (ref $STRING) (local.get $v)))", ")", |w| {
                        w.line("(then (call $seq_get (local.get $v) (call $normalize_index (local.get $v) (i32.wrap_i64 (call $to_i64 (local.get $index))))))");
                        w.block("(else", ")", |w| {
                            raise_type_error(w, "object is not subscriptable");
                            w.line("(ref.null any)");
                        });
                    });
                });
            });
        },
    );
    w.block(
        "(func $setitem (param $v anyref) (param $index anyref) (param $value anyref)",
        ")",
        |w| {
            w.block("(if (ref.test (ref $DICT) (local.get $v))", ")", |w| {
                w.line("(then (call $dict_set (ref.cast (ref $DICT) (local.get $v)) (local.get $index) (local.get $value)))");
                w.block("(else", ")", |w| {
                    w.block("(if (ref.test (ref $LIST) (local.get $v))", ")", |w| {
                        w.line("(then (call $list_set (ref.cast (ref $LIST) (local.get $v)) (call $normalize_index (local.get $v) (i32.wrap_i64 (call $to_i64 (local.get $index)))) (local.get $value)))");
                        w.block("(else", ")", |w| {
                            raise_type_error(w, "object does not support item assignment");
                        });
                    });
                });
            });
        },
    );
    w.finish()
}

/// `$dict_update`: merges another mapping's entries in, backing `**other`
/// unpacking inside a dict literal.
pub fn emit_dict_update() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $dict_update (param $d (ref $DICT)) (param $other anyref)",
        ")",
        |w| {
            w.line("(local $buckets (ref $BUCKET_ARRAY)) (local $i i32) (local $cur (ref null $ENTRY)) (local $other_t (ref $HASHTABLE))");
            w.line("(local.set $other_t (struct.get $DICT $table (ref.cast (ref $DICT) (local.get $other))))");
            w.line("(local.set $buckets (struct.get $HASHTABLE $buckets (local.get $other_t)))");
            w.block("(block $outer_done", ")", |w| {
                w.block("(loop $outer", ")", |w| {
                    w.line("(br_if $outer_done (i32.ge_u (local.get $i) (array.len (local.get $buckets))))");
                    w.line("(local.set $cur (array.get $BUCKET_ARRAY (local.get $buckets) (local.get $i)))");
                    w.block("(block $inner_done", ")", |w| {
                        w.block("(loop $inner", ")", |w| {
                            w.line("(br_if $inner_done (ref.is_null (local.get $cur)))");
                            w.line("(call $dict_set (local.get $d) (struct.get $ENTRY $key (local.get $cur)) (struct.get $ENTRY $value (local.get $cur)))");
                            w.line("(local.set $cur (struct.get $ENTRY $next (local.get $cur)))");
                            w.line("(br $inner)");
                        });
                    });
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $outer)");
                });
            });
        },
    );
    w.finish()
}

/// `$hashtable_keys`: materializes a hash table's keys into a fresh `$LIST`
/// in bucket-chain order, backing dict/set iteration (`for k in d`, `for v
/// in s`) without threading the hash table's internal layout through
/// `$ITERATOR` itself.
pub fn emit_hashtable_keys() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $hashtable_keys (param $t (ref $HASHTABLE)) (result (ref $LIST))",
        ")",
        |w| {
            w.line("(local $out (ref $LIST)) (local $buckets (ref $BUCKET_ARRAY)) (local $i i32) (local $cur (ref null $ENTRY))");
            w.line("(local.set $out (call $list_new))");
            w.line("(local.set $buckets (struct.get $HASHTABLE $buckets (local.get $t)))");
            w.block("(block $outer_done", ")", |w| {
                w.block("(loop $outer", ")", |w| {
                    w.line("(br_if $outer_done (i32.ge_u (local.get $i) (array.len (local.get $buckets))))");
                    w.line("(local.set $cur (array.get $BUCKET_ARRAY (local.get $buckets) (local.get $i)))");
                    w.block("(block $inner_done", ")", |w| {
                        w.block("(loop $inner", ")", |w| {
                            w.line("(br_if $inner_done (ref.is_null (local.get $cur)))");
                            w.line("(call $list_append (local.get $out) (struct.get $ENTRY $key (local.get $cur)))");
                            w.line("(local.set $cur (struct.get $ENTRY $next (local.get $cur)))");
                            w.line("(br $inner)");
                        });
                    });
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $outer)");
                });
            });
            w.line("(local.get $out)");
        },
    );
    w.finish()
}

/// `$sequence_contains`: the `in`/`not in` fallback for lists/tuples once
/// `$contains` has already ruled out string/dict/set containers.
pub fn emit_sequence_contains() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $sequence_contains (param $container anyref) (param $item anyref) (result i32)",
        ")",
        |w| {
            w.line("(local $i i32) (local $len i32)");
            w.line("(local.set $len (call $seq_len (local.get $container)))");
            w.block("(block $found (result i32)", ")", |w| {
                w.block("(loop $loop (result i32)", ")", |w| {
                    w.line("(br_if $found (i32.ge_u (local.get $i) (local.get $len)) (i32.const 0))");
                    w.line("(br_if $found (call $value_eq (call $seq_get (local.get $container) (local.get $i)) (local.get $item)) (i32.const 1))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $loop)");
                });
            });
        },
    );
    w.finish()
}

/// `$unpack_get`/`$unpack_rest`: tuple/list-target destructuring assignment
/// and starred `match` patterns both read a fixed prefix positionally and
/// collect the remainder (if any) into a `$LIST`.
pub fn emit_unpack_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $unpack_get (param $v anyref) (param $i i32) (result anyref)",
        ")",
        |w| {
            w.line("(call $seq_get (local.get $v) (local.get $i))");
        },
    );
    w.block(
        "(func $unpack_rest (param $v anyref) (param $start i32) (param $total_len i32) (result (ref $LIST))",
        ")",
        |w| {
            w.line("(local $out (ref $LIST)) (local $i i32)");
            w.line("(local.set $out (call $list_new))");
            w.line("(local.set $i (local.get $start))");
            w.block("(block $done", ")", |w| {
                w.block("(loop $loop", ")", |w| {
                    w.line("(br_if $done (i32.ge_u (local.get $i) (local.get $total_len)))");
                    w.line("(call $list_append (local.get $out) (call $seq_get (local.get $v) (local.get $i)))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $loop)");
                });
            });
            w.line("(local.get $out)");
        },
    );
    w.finish()
}

/// `$get_iter`/`$iter_next`/`$iter_exhausted`: unifies `for`/comprehension
/// iteration over sequences, dict/set keys (eagerly materialized, see
/// `$hashtable_keys`), and generators behind one `$ITERATOR` shape.
pub fn emit_iterator_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $get_iter (param $v anyref) (result (ref $ITERATOR))",
        ")",
        |w| {
            w.block("(if (result (ref $ITERATOR)) (ref.test (ref $GENERATOR) (local.get $v))", ")", |w| {
                w.line("(then (struct.new $ITERATOR (i32.const 2) (local.get $v) (i32.const 0)))");
                w.block("(else", ")", |w| {
                    w.block("(if (result (ref $ITERATOR)) (ref.test (ref $DICT) (local.get $v))", ")", |w| {
                        w.line("(then (struct.new $ITERATOR (i32.const 0) (call $hashtable_keys (struct.get $DICT $table (ref.cast (ref $DICT) (local.get $v)))) (i32.const 0)))");
                        w.block("(else", ")", |w| {
                            w.block("(if (result (ref $ITERATOR)) (ref.test (ref $SET) (local.get $v))", ")", |w| {
                                w.line("(then (struct.new $ITERATOR (i32.const 0) (call $hashtable_keys (struct.get $SET $table (ref.cast (ref $SET) (local.get $v)))) (i32.const 0)))");
                                w.line("(else (struct.new $ITERATOR (i32.const 0) (local.get $v) (i32.const 0)))");
                            });
                        });
                    });
                });
            });
        },
    );
    w.block(
        "(func $iter_next (param $it (ref $ITERATOR)) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (i32.eq (struct.get $ITERATOR $kind (local.get $it)) (i32.const 2))", ")", |w| {
                w.line("(then");
                w.line("  (local $result anyref) (local $exn (ref null exn))");
                w.line("  (block $exhausted (result anyref)");
                w.line("    (try_table (catch $StopIteration $exhausted)");
                w.line("      (local.set $result (call $generator_next (ref.cast (ref $GENERATOR) (struct.get $ITERATOR $container (local.get $it)))))");
                w.line("      (br $exhausted (local.get $result)))");
                w.line("    (global.get $iter_done)))");
                w.block("(else", ")", |w| {
                    w.line("(local $idx i32) (local $len i32)");
                    w.line("(local.set $idx (struct.get $ITERATOR $index (local.get $it)))");
                    w.line("(local.set $len (call $seq_len (struct.get $ITERATOR $container (local.get $it))))");
                    w.block("(if (result anyref) (i32.ge_u (local.get $idx) (local.get $len))", ")", |w| {
                        w.line("(then (global.get $iter_done))");
                        w.block("(else", ")", |w| {
                            w.line("(struct.set $ITERATOR $index (local.get $it) (i32.add (local.get $idx) (i32.const 1)))");
                            w.line("(call $seq_get (struct.get $ITERATOR $container (local.get $it)) (local.get $idx))");
                        });
                    });
                });
            });
        },
    );
    w.block(
        "(func $iter_exhausted (param $v anyref) (result i32)",
        ")",
        |w| {
            w.line("(ref.test (ref $ITER_DONE) (local.get $v))");
        },
    );
    w.finish()
}

/// `$range_done`: the bound test a `range()`-specialized `for` loop checks
/// each iteration — cursor is a raw `i64` advanced by the loop's own `step`
/// each pass rather than going through `$ITERATOR`, since the range's bounds
/// are known without materializing a sequence.
pub fn emit_range_done() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $range_done (param $cursor i64) (param $hi anyref) (param $step anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (i64.lt_s (call $to_i64 (local.get $step)) (i64.const 0))", ")", |w| {
                w.line("(then (i64.le_s (local.get $cursor) (call $to_i64 (local.get $hi))))");
                w.line("(else (i64.ge_s (local.get $cursor) (call $to_i64 (local.get $hi))))");
            });
        },
    );
    w.finish()
}

/// `$to_str`/`$to_repr`: runtime-type dispatch producing a printable
/// `$STRING`. User classes get one chance at `__str__`/`__repr__` before
/// falling back to a generic `<ClassName object>` rendering.
pub fn emit_str_repr_ops() -> String {
    let mut w = WatWriter::default();
    for name in ["to_str", "to_repr"] {
        let dunder = if name == "to_str" { "__str__" } else { "__repr__" };
        let dunder_token = literal_data_token(dunder.as_bytes());
        w.block(
            &format!("(func ${name} (param $v anyref) (result (ref $STRING))"),
            ")",
            |w| {
                w.block("(if (result (ref $STRING)) (ref.is_null (local.get $v))", ")", |w| {
                    let token = literal_data_token(b"None");
                    w.line(&format!("(then (call $load_string_literal (i32.const {token}) (i32.const 4)))"));
                    w.block("(else", ")", |w| {
                        w.block("(if (result (ref $STRING)) (ref.test (ref $BOOL) (local.get $v))", ")", |w| {
                            let true_token = literal_data_token(b"True");
                            let false_token = literal_data_token(b"False");
                            w.line(&format!(
                                "(then (if (result (ref $STRING)) (struct.get $BOOL $value (ref.cast (ref $BOOL) (local.get $v))) (then (call $load_string_literal (i32.const {true_token}) (i32.const 4))) (else (call $load_string_literal (i32.const {false_token}) (i32.const 5)))))"
                            ));
                            w.block("(else", ")", |w| {
                                w.block("(if (result (ref $STRING)) (call $is_integer (local.get $v))", ")", |w| {
                                    w.line("(then (call $int_to_string (local.get $v)))");
                                    w.block("(else", ")", |w| {
                                        w.block("(if (result (ref $STRING)) (ref.test (ref $FLOAT) (local.get $v))", ")", |w| {
                                            w.line("(then (call $float_to_string (local.get $v)))");
                                            w.block("(else", ")", |w| {
                                                w.block("(if (result (ref $STRING)) (ref.test (ref $STRING) (local.get $v))", ")", |w| {
                                                    w.line("(then (ref.cast (ref $STRING) (local.get $v)))");
                                                    w.block("(else", ")", |w| {
                                                        w.block("(if (result (ref $STRING)) (ref.test (ref $OBJECT) (local.get $v))", ")", |w| {
                                                            w.line("(then");
                                                            w.line("  (local $found anyref)");
                                                            w.line(&format!(
                                                                "  (local.set $found (call $method_lookup (struct.get $OBJECT $class (ref.cast (ref $OBJECT) (local.get $v))) (call $load_string_literal (i32.const {dunder_token}) (i32.const {}))))",
                                                                dunder.len()
                                                            ));
                                                            w.line("  (if (result (ref $STRING)) (ref.is_null (local.get $found))");
                                                            let class_str_token = literal_data_token(b" object");
                                                            w.line(&format!(
                                                                "    (then (call $string_concat (struct.get $CLASS $name (struct.get $OBJECT $class (ref.cast (ref $OBJECT) (local.get $v)))) (call $load_string_literal (i32.const {class_str_token}) (i32.const 7))))"
                                                            ));
                                                            w.line("    (else (ref.cast (ref $STRING) (call $call_closure_1 (ref.cast (ref $CLOSURE) (local.get $found)) (local.get $v))))))");
                                                            let fallback_token = literal_data_token(b"<object>");
                                                            w.line(&format!(
                                                                "(else (call $load_string_literal (i32.const {fallback_token}) (i32.const 8)))"
                                                            ));
                                                        });
                                                    });
                                                });
                                            });
                                        });
                                    });
                                });
                            });
                        });
                    });
                });
            },
        );
    }
    w.finish()
}

/// `$builtin_len`/`$builtin_abs`/`$builtin_bool`/`$builtin_ord`/
/// `$builtin_callable`/`$builtin_int`/`$builtin_float`: the arity-1 builtins
/// `expressions.rs` calls directly rather than through the closure-value
/// machinery.
pub fn emit_simple_builtins() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $builtin_len (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (i32.or (ref.test (ref $DICT) (local.get $v)) (ref.test (ref $SET) (local.get $v)))", ")", |w| {
                w.line("(then (call $pack_int (i64.extend_i32_s (struct.get $HASHTABLE $count (call $container_table (local.get $v))))))");
                w.line("(else (call $pack_int (i64.extend_i32_s (call $seq_len (local.get $v)))))");
            });
        },
    );
    // `$container_table`: shared by `$builtin_len` to read either a `$DICT`
    // or `$SET`'s backing table without duplicating the ref.test dispatch.
    w.block(
        "(func $container_table (param $v anyref) (result (ref $HASHTABLE))",
        ")",
        |w| {
            w.block("(if (result (ref $HASHTABLE)) (ref.test (ref $DICT) (local.get $v))", ")", |w| {
                w.line("(then (struct.get $DICT $table (ref.cast (ref $DICT) (local.get $v))))");
                w.line("(else (struct.get $SET $table (ref.cast (ref $SET) (local.get $v))))");
            });
        },
    );
    w.block(
        "(func $builtin_abs (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (call $is_integer (local.get $v))", ")", |w| {
                w.line("(then (call $pack_int (i64.extend_i32_s (i32.wrap_i64 (select (result i64) (i64.sub (i64.const 0) (call $to_i64 (local.get $v))) (call $to_i64 (local.get $v)) (i64.lt_s (call $to_i64 (local.get $v)) (i64.const 0)))))))");
                w.line("(else (struct.new $FLOAT (f64.abs (call $to_f64 (local.get $v)))))");
            });
        },
    );
    w.block(
        "(func $builtin_bool (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.line("(call $bool_wrap (i32.eqz (call $is_false (local.get $v))))");
        },
    );
    w.block(
        "(func $builtin_ord (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.line("(call $pack_int (i64.extend_i32_s (i32.load8_u (struct.get $STRING $offset (ref.cast (ref $STRING) (local.get $v))))))");
        },
    );
    w.block(
        "(func $builtin_callable (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.line(
                "(call $bool_wrap (i32.or (ref.test (ref $CLOSURE) (local.get $v)) (ref.test (ref $PAIR) (local.get $v))))",
            );
        },
    );
    w.block(
        "(func $builtin_int (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (call $is_integer (local.get $v))", ")", |w| {
                w.line("(then (local.get $v))");
                w.line("(else (call $pack_int (i64.trunc_f64_s (call $to_f64 (local.get $v)))))");
            });
        },
    );
    w.block(
        "(func $builtin_float (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.line("(struct.new $FLOAT (call $to_f64 (local.get $v)))");
        },
    );
    w.block(
        "(func $builtin_print (param $v anyref) (result anyref)",
        ")",
        |w| {
            w.line("(call $console_log (call $to_str (local.get $v)))");
            w.line("(ref.null any)");
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscript_checks_dict_before_sequences() {
        let out = emit_subscript_ops();
        let dict_pos = out.find("ref.test (ref $DICT)").unwrap();
        let list_pos = out.find("ref.test (ref $LIST)").unwrap();
        assert!(dict_pos < list_pos);
    }

    #[test]
    fn setitem_has_no_tuple_or_string_mutation_path() {
        let out = emit_subscript_ops();
        assert!(!out.contains("ref.test (ref $TUPLE)"));
        assert!(!out.contains("ref.test (ref $STRING)"));
    }

    #[test]
    fn iter_next_handles_generator_kind_via_stop_iteration_catch() {
        let out = emit_iterator_ops();
        assert!(out.contains("catch $StopIteration"));
        assert!(out.contains("global.get $iter_done"));
    }

    #[test]
    fn unpack_rest_collects_remaining_elements_into_a_list() {
        let out = emit_unpack_ops();
        assert!(out.contains("call $list_new"));
        assert!(out.contains("call $seq_get"));
    }

    #[test]
    fn range_done_flips_comparison_by_step_sign() {
        let out = emit_range_done();
        assert!(out.contains("i64.lt_s (call $to_i64 (local.get $step))"));
        assert!(out.contains("i64.le_s"));
        assert!(out.contains("i64.ge_s"));
    }

    #[test]
    fn to_str_checks_none_before_numerics() {
        let out = emit_str_repr_ops();
        let none_pos = out.find("ref.is_null (local.get $v)").unwrap();
        let int_pos = out.find("call $is_integer").unwrap();
        assert!(none_pos < int_pos);
    }

    #[test]
    fn builtin_print_writes_through_to_str() {
        let out = emit_simple_builtins();
        assert!(out.contains("call $console_log (call $to_str"));
    }
}
