//! The tagged-value universe: WASM GC struct/array type declarations and the
//! handful of helper functions every other runtime module builds on
//! (truthiness, the SmallInt/BigInt boundary, the string heap, the
//! specialized call-site function types).

use crate::text::WatWriter;

/// Arity ceiling for the specialized, PAIR-chain-free call types.
/// Calls above this arity fall back to marshaling arguments through a
/// `$PAIR` chain rooted at `$ENV`.
pub const MAX_SPECIALIZED_ARITY: u32 = 5;

/// Emit the full GC type section: the disjoint value union plus every
/// struct/array shape named in the data model (Pair, Bool, Float, Int64,
/// String, Bytes, Env, Closure, the specialized function types, EmptyList,
/// Ellipsis, the hashtable family, class/instance/descriptor types, list,
/// tuple, exception, and generator).
pub fn emit_types() -> String {
    let mut w = WatWriter::default();

    w.line(";; -- core boxed scalars --");
    w.block("(type $PAIR (sub (struct", "))", |w| {
        w.line("(field $car (mut anyref))");
        w.line("(field $cdr (mut anyref))");
    });
    w.block("(type $BOOL (sub (struct", "))", |w| {
        w.line("(field $value i32)");
    });
    w.block("(type $FLOAT (sub (struct", "))", |w| {
        w.line("(field $value f64)");
    });
    w.block("(type $INT64 (sub (struct", "))", |w| {
        w.line("(field $value i64)");
    });
    w.block("(type $STRING (sub (struct", "))", |w| {
        w.line("(field $offset i32)");
        w.line("(field $len i32)");
    });
    w.block("(type $BYTES (sub (struct", "))", |w| {
        w.line("(field $offset i32)");
        w.line("(field $len i32)");
        // extra tag field so $BYTES is structurally distinct from $STRING
        w.line("(field $tag i32)");
    });
    w.blank();

    w.line(";; -- closures --");
    w.block("(type $ENV (sub (struct", "))", |w| {
        w.line("(field $parent (ref null $ENV))");
        w.line("(field $slots (ref $ARRAY_ANY))");
    });
    w.block("(type $CLOSURE (sub (struct", "))", |w| {
        w.line("(field $func_idx i32)");
        w.line("(field $env (ref null $ENV))");
    });
    emit_function_types(&mut w);
    w.blank();

    w.line(";; -- singletons --");
    w.block("(type $EMPTY_LIST (sub (struct", "))", |w| {
        w.line("(field $unused i32)");
    });
    w.block("(type $ELLIPSIS (sub (struct", "))", |w| {
        // f32 field keeps this structurally distinct from every other
        // zero/one-field struct in the universe.
        w.line("(field $unused f32)");
    });
    w.blank();

    emit_hashtable_types(&mut w);
    w.blank();
    emit_object_types(&mut w);
    w.blank();
    emit_sequence_types(&mut w);
    w.blank();
    emit_exception_types(&mut w);
    w.blank();
    emit_generator_types(&mut w);
    w.blank();
    emit_iterator_types(&mut w);

    w.finish()
}

fn emit_function_types(w: &mut WatWriter) {
    w.line(";; specialized call types avoid marshaling args through $PAIR for");
    w.line(";; known low arities; arity > 5 goes through $FUNC's env-chain call.");
    w.block("(type $FUNC (func", "))", |w| {
        w.line("(param $env (ref null $ENV))");
        w.line("(param $args (ref null $PAIR))");
        w.line("(result anyref)");
    });
    for arity in 0..=MAX_SPECIALIZED_ARITY {
        w.block(&format!("(type $FUNC_SPEC_{arity} (func"), "))", |w| {
            w.line("(param $env (ref null $ENV))");
            for i in 0..arity {
                w.line(&format!("(param $a{i} anyref)"));
            }
            w.line("(result anyref)");
        });
    }
}

fn emit_hashtable_types(w: &mut WatWriter) {
    w.line(";; separate-chaining hash table backing both Dict and Set");
    w.block("(type $ENTRY (sub (struct", "))", |w| {
        w.line("(field $hash i32)");
        w.line("(field $key anyref)");
        w.line("(field $value anyref)");
        w.line("(field $next (ref null $ENTRY))");
    });
    w.line("(type $BUCKET_ARRAY (array (mut (ref null $ENTRY))))");
    w.block("(type $HASHTABLE (sub (struct", "))", |w| {
        w.line("(field $buckets (mut (ref $BUCKET_ARRAY)))");
        w.line("(field $count (mut i32))");
    });
    w.block("(type $DICT (sub (struct", "))", |w| {
        w.line("(field $table (ref $HASHTABLE))");
    });
    w.block("(type $SET (sub (struct", "))", |w| {
        w.line("(field $table (ref $HASHTABLE))");
    });
}

fn emit_object_types(w: &mut WatWriter) {
    w.line(";; classes, instances, descriptors");
    // `$methods`/`$attrs` are PAIR-chain association lists, not hash tables:
    // each node's car is itself a `(name . value)` pair and cdr is the rest
    // of the chain, walked by `$alist_get`/consed onto by `$alist_cons` in
    // objects.rs. A handful of attributes per object never justifies hash
    // table overhead, and it keeps instance state structurally simple.
    w.block("(type $CLASS (sub (struct", "))", |w| {
        w.line("(field $name (ref $STRING))");
        w.line("(field $methods (mut (ref null $PAIR)))");
        w.line("(field $base (ref null $CLASS))");
    });
    // $INSTANCE_BASE is deliberately `sub` (open) so it can be extended by
    // both the ordinary $OBJECT shape and any future non-slotted variant;
    // $OBJECT itself is `sub final` since nothing subclasses it in WAT.
    w.block("(type $INSTANCE_BASE (sub (struct", "))", |w| {
        w.line("(field $class (ref $CLASS))");
    });
    w.block("(type $OBJECT (sub final $INSTANCE_BASE (struct", "))", |w| {
        w.line("(field $class (ref $CLASS))");
        w.line("(field $attrs (mut (ref null $PAIR)))");
    });
    w.block("(type $SUPER (sub (struct", "))", |w| {
        w.line("(field $class (ref $CLASS))");
        w.line("(field $self anyref)");
    });
    w.block("(type $STATICMETHOD (sub (struct", "))", |w| {
        w.line("(field $func anyref)");
    });
    w.block("(type $CLASSMETHOD (sub (struct", "))", |w| {
        w.line("(field $func anyref)");
        // padding field keeps the struct's field list structurally distinct
        // from $STATICMETHOD under WASM GC's structural typing.
        w.line("(field $unused i32)");
    });
    w.block("(type $PROPERTY (sub (struct", "))", |w| {
        w.line("(field $getter anyref)");
        w.line("(field $setter anyref)");
        w.line("(field $deleter anyref)");
    });
}

fn emit_sequence_types(w: &mut WatWriter) {
    w.line("(type $ARRAY_ANY (array (mut anyref)))");
    w.block("(type $LIST (sub (struct", "))", |w| {
        w.line("(field $data (mut (ref $ARRAY_ANY)))");
        w.line("(field $len (mut i32))");
        w.line("(field $cap (mut i32))");
    });
    w.block("(type $TUPLE (sub (struct", "))", |w| {
        w.line("(field $data (ref $ARRAY_ANY))");
        w.line("(field $len i32)");
    });
}

fn emit_exception_types(w: &mut WatWriter) {
    w.block("(type $EXCEPTION (sub (struct", "))", |w| {
        w.line("(field $ty (ref $STRING))");
        w.line("(field $message anyref)");
        w.line("(field $cause anyref)");
        w.line("(field $context anyref)");
    });
    w.line("(tag $PyException (param (ref $EXCEPTION)))");
}

fn emit_generator_types(w: &mut WatWriter) {
    w.block("(type $GENERATOR (sub (struct", "))", |w| {
        w.line("(field $state (mut i32))");
        w.line("(field $value (mut anyref))");
        w.line("(field $locals (mut (ref $ARRAY_ANY)))");
        w.line("(field $func_idx i32)");
        w.line("(field $env (ref null $ENV))");
        w.line("(field $sent_value (mut anyref))");
    });
    w.line("(tag $StopIteration)");
}

/// `$ITERATOR` wraps whatever `for`/comprehension codegen iterates over into
/// one uniform shape: `$kind` 0 means `$container` is a sequence (list,
/// tuple, string, or a dict/set's materialized keys list) walked by
/// `$index`; `$kind` 2 means `$container` is a `$GENERATOR` and `$index` is
/// unused. `$ITER_DONE` is the sentinel `$iter_next` returns on exhaustion —
/// a dedicated singleton rather than `ref.null any`, since `None` is already
/// a live, reachable value this runtime must tell apart from "iterator
/// exhausted".
fn emit_iterator_types(w: &mut WatWriter) {
    w.block("(type $ITERATOR (sub (struct", "))", |w| {
        w.line("(field $kind i32)");
        w.line("(field $container anyref)");
        w.line("(field $index (mut i32))");
    });
    w.block("(type $ITER_DONE (sub (struct", "))", |w| {
        w.line("(field $unused i32)");
    });
}

/// The shared singletons (`$ellipsis`, `$TRUE`, `$FALSE`, `$iter_done`) plus
/// the string-heap cursor global. Must be emitted after the type section and
/// before any function bodies that reference them.
pub fn emit_post_type_globals() -> String {
    let mut w = WatWriter::default();
    w.line("(global $ellipsis (ref $ELLIPSIS) (struct.new $ELLIPSIS (f32.const 0)))");
    w.line("(global $TRUE (ref $BOOL) (struct.new $BOOL (i32.const 1)))");
    w.line("(global $FALSE (ref $BOOL) (struct.new $BOOL (i32.const 0)))");
    w.line("(global $iter_done (ref $ITER_DONE) (struct.new $ITER_DONE (i32.const 0)))");
    w.line("(global $string_heap (mut i32) (i32.const 65536))");
    w.line("(global $tmp_pop_dict (mut anyref) (ref.null any))");
    w.finish()
}

/// `$is_false`: the single truthiness dispatch used by every conditional
/// branch the codegen emits. Order matters here exactly as in the data
/// model's falsy list: null, False, zero SmallInt, zero BigInt, empty
/// string, empty dict/set, zero-length list — everything else is truthy.
pub fn emit_is_false() -> String {
    let mut w = WatWriter::default();
    w.block("(func $is_false (param $v anyref) (result i32)", ")", |w| {
        w.line("(if (result i32) (ref.is_null (local.get $v))");
        w.line("  (then (i32.const 1))");
        w.block("  (else", "  )", |w| {
            w.block("(if (result i32) (ref.test (ref $BOOL) (local.get $v))", ")", |w| {
                w.line("(then (i32.eqz (struct.get $BOOL $value (ref.cast (ref $BOOL) (local.get $v)))))");
                w.block("(else", ")", |w| {
                    w.block("(if (result i32) (ref.test i31ref (local.get $v))", ")", |w| {
                        w.line("(then (i32.eqz (i31.get_s (ref.cast i31ref (local.get $v)))))");
                        w.block("(else", ")", |w| {
                            w.block("(if (result i32) (ref.test (ref $INT64) (local.get $v))", ")", |w| {
                                w.line("(then (i64.eqz (struct.get $INT64 $value (ref.cast (ref $INT64) (local.get $v)))))");
                                w.block("(else", ")", |w| {
                                    w.block("(if (result i32) (ref.test (ref $STRING) (local.get $v))", ")", |w| {
                                        w.line("(then (i32.eqz (struct.get $STRING $len (ref.cast (ref $STRING) (local.get $v)))))");
                                        w.block("(else", ")", |w| {
                                            w.block("(if (result i32) (ref.test (ref $DICT) (local.get $v))", ")", |w| {
                                                w.line("(then (i32.eqz (struct.get $HASHTABLE $count (struct.get $DICT $table (ref.cast (ref $DICT) (local.get $v))))))");
                                                w.block("(else", ")", |w| {
                                                    w.block("(if (result i32) (ref.test (ref $LIST) (local.get $v))", ")", |w| {
                                                        w.line("(then (i32.eqz (struct.get $LIST $len (ref.cast (ref $LIST) (local.get $v)))))");
                                                        w.line("(else (ref.test (ref $EMPTY_LIST) (local.get $v)))");
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
        });
    });
    w.finish()
}

/// SmallInt/BigInt boundary helpers: `$fits_i31` (does an i64 round-trip
/// through the 31-bit tagged-int range), `$pack_int` (box as `i31` when it
/// fits, else as `$INT64`), `$to_i64` (unbox either representation), and
/// `$is_integer`.
pub fn emit_int_boundary_helpers() -> String {
    let mut w = WatWriter::default();
    w.block("(func $fits_i31 (param $v i64) (result i32)", ")", |w| {
        w.line("(i32.and");
        w.line("  (i64.ge_s (local.get $v) (i64.const -1073741824))");
        w.line("  (i64.le_s (local.get $v) (i64.const 1073741823)))");
    });
    w.block("(func $pack_int (param $v i64) (result anyref)", ")", |w| {
        w.block("(if (result anyref) (call $fits_i31 (local.get $v))", ")", |w| {
            w.line("(then (ref.i31 (i32.wrap_i64 (local.get $v))))");
            w.line("(else (struct.new $INT64 (local.get $v)))");
        });
    });
    w.block("(func $to_i64 (param $v anyref) (result i64)", ")", |w| {
        w.block("(if (result i64) (ref.test i31ref (local.get $v))", ")", |w| {
            w.line("(then (i64.extend_i32_s (i31.get_s (ref.cast i31ref (local.get $v)))))");
            w.line("(else (struct.get $INT64 $value (ref.cast (ref $INT64) (local.get $v))))");
        });
    });
    w.block("(func $is_integer (param $v anyref) (result i32)", ")", |w| {
        w.line("(i32.or");
        w.line("  (ref.test i31ref (local.get $v))");
        w.line("  (ref.test (ref $INT64) (local.get $v)))");
    });
    w.block("(func $to_f64 (param $v anyref) (result f64)", ")", |w| {
        w.block("(if (result f64) (ref.test (ref $FLOAT) (local.get $v))", ")", |w| {
            w.line("(then (struct.get $FLOAT $value (ref.cast (ref $FLOAT) (local.get $v))))");
            w.line("(else (f64.convert_i64_s (call $to_i64 (local.get $v))))");
        });
    });
    w.finish()
}

/// `$is_dict`: recognizes both the current `$DICT` wrapper and the legacy
/// PAIR-chain-of-PAIRs encoding some call sites may still hand in (e.g. a
/// literal built before the hash-table rewrite lands at a call boundary).
pub fn emit_is_dict() -> String {
    let mut w = WatWriter::default();
    w.block("(func $is_dict (param $v anyref) (result i32)", ")", |w| {
        w.line("(ref.test (ref $DICT) (local.get $v))");
    });
    w.finish()
}

/// `$memcpy` (byte-by-byte copy within linear memory) and `$ensure_memory`
/// (grow linear memory in whole-page units so the next `n` bytes of heap
/// writes are safe). Growth failure is intentionally left unhandled per the
/// data model's noted limitation — a `memory.grow` returning -1 here simply
/// corrupts subsequent heap writes rather than raising a catchable error.
pub fn emit_memory_helpers() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $memcpy (param $dst i32) (param $src i32) (param $n i32)",
        ")",
        |w| {
            w.line("(local $i i32)");
            w.block("(block $done", ")", |w| {
                w.block("(loop $loop", ")", |w| {
                    w.line("(br_if $done (i32.ge_u (local.get $i) (local.get $n)))");
                    w.line("(i32.store8");
                    w.line("  (i32.add (local.get $dst) (local.get $i))");
                    w.line("  (i32.load8_u (i32.add (local.get $src) (local.get $i))))");
                    w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                    w.line("(br $loop)");
                });
            });
        },
    );
    w.block("(func $ensure_memory (param $extra i32)", ")", |w| {
        w.line("(local $needed i32)");
        w.line("(local $have i32)");
        w.line("(local.set $needed (i32.add (global.get $string_heap) (local.get $extra)))");
        w.line("(local.set $have (i32.mul (memory.size) (i32.const 65536)))");
        w.block("(if (i32.gt_u (local.get $needed) (local.get $have))", ")", |w| {
            w.line("(then");
            w.line("  (drop (memory.grow (i32.div_u");
            w.line("    (i32.add (i32.sub (local.get $needed) (local.get $have)) (i32.const 65535))");
            w.line("    (i32.const 65536))))");
            w.line(")");
        });
    });
    w.finish()
}

/// `$value_eq`/`$value_cmp`: the universal equality/ordering dispatch every
/// `==`/`<`/`<=`/`>`/`>=` comparison routes through. Numbers
/// compare by value across the int/float/bool boundary, strings compare
/// byte-for-byte, sequences compare elementwise; anything else falls back to
/// `ref.eq` identity for equality and a stable-but-unordered `0` for `$cmp`,
/// since WASM GC gives no address to order arbitrary references by.
pub fn emit_value_ops() -> String {
    let mut w = WatWriter::default();
    w.block("(func $is_numeric (param $v anyref) (result i32)", ")", |w| {
        w.line("(i32.or (call $is_integer (local.get $v)) (ref.test (ref $FLOAT) (local.get $v)))");
    });
    w.block(
        "(func $value_eq (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (i32.and (ref.is_null (local.get $a)) (ref.is_null (local.get $b)))", ")", |w| {
                w.line("(then (i32.const 1))");
                w.block("(else", ")", |w| {
                    w.block("(if (result i32) (i32.or (ref.is_null (local.get $a)) (ref.is_null (local.get $b)))", ")", |w| {
                        w.line("(then (i32.const 0))");
                        w.block("(else", ")", |w| {
                            w.block("(if (result i32) (i32.and (call $is_numeric (local.get $a)) (call $is_numeric (local.get $b)))", ")", |w| {
                                w.line("(then (f64.eq (call $to_f64 (local.get $a)) (call $to_f64 (local.get $b))))");
                                w.block("(else", ")", |w| {
                                    w.block("(if (result i32) (ref.test (ref $STRING) (local.get $a))", ")", |w| {
                                        w.line("(then (if (result i32) (ref.test (ref $STRING) (local.get $b)) (then (call $string_eq (ref.cast (ref $STRING) (local.get $a)) (ref.cast (ref $STRING) (local.get $b)))) (else (i32.const 0))))");
                                        w.block("(else", ")", |w| {
                                            w.line("(if (result i32) (i32.and (ref.test (ref $LIST) (local.get $a)) (ref.test (ref $LIST) (local.get $b)))");
                                            w.line("  (then (call $list_eq (ref.cast (ref $LIST) (local.get $a)) (ref.cast (ref $LIST) (local.get $b))))");
                                            w.line("  (else (if (result i32) (i32.and (ref.test (ref $TUPLE) (local.get $a)) (ref.test (ref $TUPLE) (local.get $b)))");
                                            w.line("    (then (call $tuple_eq (ref.cast (ref $TUPLE) (local.get $a)) (ref.cast (ref $TUPLE) (local.get $b))))");
                                            w.line("    (else (ref.eq (local.get $a) (local.get $b))))))");
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
    // `$list_eq`/`$tuple_eq`: same-length plus elementwise `$value_eq`.
    for (name, ty) in [("list_eq", "LIST"), ("tuple_eq", "TUPLE")] {
        w.block(
            &format!("(func ${name} (param $a (ref ${ty})) (param $b (ref ${ty})) (result i32)"),
            ")",
            |w| {
                w.line("(local $i i32) (local $len i32)");
                w.line(&format!("(local.set $len (struct.get ${ty} $len (local.get $a)))"));
                w.block(&format!("(if (result i32) (i32.ne (local.get $len) (struct.get ${ty} $len (local.get $b)))"), ")", |w| {
                    w.line("(then (i32.const 0))");
                    w.block("(else", ")", |w| {
                        w.block("(block $mismatch (result i32)", ")", |w| {
                            w.block("(loop $loop (result i32)", ")", |w| {
                                w.line("(br_if $mismatch (i32.ge_u (local.get $i) (local.get $len)) (i32.const 1))");
                                w.line(&format!(
                                    "(br_if $mismatch (i32.eqz (call $value_eq (array.get $ARRAY_ANY (struct.get ${ty} $data (local.get $a)) (local.get $i)) (array.get $ARRAY_ANY (struct.get ${ty} $data (local.get $b)) (local.get $i)))) (i32.const 0))"
                                ));
                                w.line("(local.set $i (i32.add (local.get $i) (i32.const 1)))");
                                w.line("(br $loop)");
                            });
                        });
                    });
                });
            },
        );
    }
    w.block(
        "(func $value_cmp (param $a anyref) (param $b anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (i32.and (call $is_numeric (local.get $a)) (call $is_numeric (local.get $b)))", ")", |w| {
                w.line("(then (call $float_cmp (local.get $a) (local.get $b)))");
                w.block("(else", ")", |w| {
                    w.block("(if (result i32) (i32.and (ref.test (ref $STRING) (local.get $a)) (ref.test (ref $STRING) (local.get $b)))", ")", |w| {
                        w.line("(then (call $string_cmp (ref.cast (ref $STRING) (local.get $a)) (ref.cast (ref $STRING) (local.get $b))))");
                        w.line("(else (i32.const 0))");
                    });
                });
            });
        },
    );
    w.block("(func $bool_wrap (param $v i32) (result anyref)", ")", |w| {
        w.line("(select (result anyref) (global.get $TRUE) (global.get $FALSE) (local.get $v))");
    });
    // `$isinstance`: walks the object's own class chain, not the class's
    // method-dict lookup path, since this answers "is-a", not "has method".
    w.block(
        "(func $isinstance (param $v anyref) (param $class anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (ref.test (ref $OBJECT) (local.get $v))", ")", |w| {
                w.line("(then");
                w.line("  (local $cur (ref null $CLASS))");
                w.line("  (local.set $cur (struct.get $OBJECT $class (ref.cast (ref $OBJECT) (local.get $v))))");
                w.block("  (block $done (result i32)", "  )", |w| {
                    w.block("  (loop $walk (result i32)", "  )", |w| {
                        w.line("  (br_if $done (ref.is_null (local.get $cur)) (i32.const 0))");
                        w.line("  (br_if $done (ref.eq (local.get $cur) (local.get $class)) (i32.const 1))");
                        w.line("  (local.set $cur (struct.get $CLASS $base (local.get $cur)))");
                        w.line("  (br $walk)");
                    });
                });
                w.line(")");
                w.line("(else (i32.const 0))");
            });
        },
    );
    // `$contains`: dispatches on the *container*'s runtime type —
    // membership test); strings search for a substring, everything else
    // searches for an equal element/key.
    w.block(
        "(func $contains (param $container anyref) (param $item anyref) (result i32)",
        ")",
        |w| {
            w.block("(if (result i32) (ref.test (ref $STRING) (local.get $container))", ")", |w| {
                w.line("(then (call $string_contains (ref.cast (ref $STRING) (local.get $container)) (ref.cast (ref $STRING) (local.get $item))))");
                w.block("(else", ")", |w| {
                    w.block("(if (result i32) (ref.test (ref $DICT) (local.get $container))", ")", |w| {
                        w.line("(then (i32.eqz (ref.is_null (call $dict_get (ref.cast (ref $DICT) (local.get $container)) (local.get $item)))))");
                        w.block("(else", ")", |w| {
                            w.block("(if (result i32) (ref.test (ref $SET) (local.get $container))", ")", |w| {
                                w.line("(then (call $set_contains (ref.cast (ref $SET) (local.get $container)) (local.get $item)))");
                                w.block("(else", ")", |w| {
                                    w.line("(call $sequence_contains (local.get $container) (local.get $item))");
                                });
                            });
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
    fn emits_pair_and_bool_structs() {
        let types = emit_types();
        assert!(types.contains("(type $PAIR (sub (struct"));
        assert!(types.contains("(field $value i32)"));
    }

    #[test]
    fn emits_all_specialized_function_arities() {
        let types = emit_types();
        for arity in 0..=MAX_SPECIALIZED_ARITY {
            assert!(types.contains(&format!("(type $FUNC_SPEC_{arity}")));
        }
    }

    #[test]
    fn object_has_final_and_base_is_open() {
        let types = emit_types();
        assert!(types.contains("(type $OBJECT (sub final $INSTANCE_BASE"));
        assert!(types.contains("(type $INSTANCE_BASE (sub (struct"));
    }

    #[test]
    fn is_false_checks_null_first() {
        let out = emit_is_false();
        assert!(out.starts_with("(func $is_false"));
        assert!(out.contains("ref.is_null"));
    }

    #[test]
    fn pack_int_round_trips_through_fits_i31() {
        let out = emit_int_boundary_helpers();
        assert!(out.contains("(func $fits_i31"));
        assert!(out.contains("(func $pack_int"));
        assert!(out.contains("call $fits_i31"));
    }

    #[test]
    fn ensure_memory_computes_whole_pages() {
        let out = emit_memory_helpers();
        assert!(out.contains("i32.const 65536"));
        assert!(out.contains("memory.grow"));
    }
}
