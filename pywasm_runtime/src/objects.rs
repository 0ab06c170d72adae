//! Classes, instances, and attribute/method lookup. Single inheritance
//! only — `$CLASS.base` is a single optional parent, not an MRO list — so
//! lookup simply walks the base chain, matching the data model's stated
//! "single inheritance only" design note.

use crate::text::WatWriter;

/// `$alist_get`/`$alist_cons`: shared helpers for every PAIR-chain
/// association list this module walks (`$CLASS.methods`, `$OBJECT.attrs`).
/// Each node's car is itself a `(name . value)` pair, cdr is the rest of the
/// chain. `$alist_cons` always prepends a fresh node rather than updating an
/// existing one in place — a handful of attributes per object never
/// justifies hash-table overhead or mutation-in-place bookkeeping, and
/// `$alist_get`'s first-match-wins scan makes the newest binding visible.
pub fn emit_alist_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $alist_get (param $chain (ref null $PAIR)) (param $name (ref $STRING)) (result anyref)",
        ")",
        |w| {
            w.line("(local $cur (ref null $PAIR)) (local $entry (ref $PAIR))");
            w.line("(local.set $cur (local.get $chain))");
            w.block("(block $done (result anyref)", ")", |w| {
                w.block("(loop $walk (result anyref)", ")", |w| {
                    w.line("(br_if $done (ref.is_null (local.get $cur)) (ref.null any))");
                    w.line("(local.set $entry (ref.cast (ref $PAIR) (struct.get $PAIR $car (local.get $cur))))");
                    w.block(
                        "(if (result anyref) (call $string_eq (ref.cast (ref $STRING) (struct.get $PAIR $car (local.get $entry))) (local.get $name))",
                        ")",
                        |w| {
                            w.line("(then (struct.get $PAIR $cdr (local.get $entry)))");
                            w.block("(else", ")", |w| {
                                w.line("(local.set $cur (ref.cast (ref null $PAIR) (struct.get $PAIR $cdr (local.get $cur))))");
                                w.line("(br $walk)");
                            });
                        },
                    );
                });
            });
        },
    );
    w.block(
        "(func $alist_cons (param $chain (ref null $PAIR)) (param $name (ref $STRING)) (param $value anyref) (result (ref $PAIR))",
        ")",
        |w| {
            w.line("(struct.new $PAIR (struct.new $PAIR (local.get $name) (local.get $value)) (local.get $chain))");
        },
    );
    w.finish()
}

pub fn emit_class_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $class_new (param $name (ref $STRING)) (param $methods (ref null $PAIR)) (param $base (ref null $CLASS)) (result (ref $CLASS))",
        ")",
        |w| {
            w.line("(struct.new $CLASS (local.get $name) (local.get $methods) (local.get $base))");
        },
    );

    // `$method_lookup` walks the base chain looking in each class's own
    // methods alist; the first hit wins, exactly like Python's attribute
    // resolution under single inheritance.
    w.block(
        "(func $method_lookup (param $class (ref null $CLASS)) (param $name (ref $STRING)) (result anyref)",
        ")",
        |w| {
            w.line("(local $cur (ref null $CLASS)) (local $found anyref)");
            w.line("(local.set $cur (local.get $class))");
            w.block("(block $done (result anyref)", ")", |w| {
                w.block("(loop $walk (result anyref)", ")", |w| {
                    w.line("(br_if $done (ref.is_null (local.get $cur)) (ref.null any))");
                    w.line("(local.set $found (call $alist_get (struct.get $CLASS $methods (local.get $cur)) (local.get $name)))");
                    w.block("(if (result anyref) (ref.is_null (local.get $found))", ")", |w| {
                        w.line("(then");
                        w.line("  (local.set $cur (struct.get $CLASS $base (local.get $cur)))");
                        w.line("  (br $walk))");
                        w.line("(else (local.get $found))");
                    });
                });
            });
        },
    );
    w.finish()
}

pub fn emit_instance_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $object_new (param $class (ref $CLASS)) (result (ref $OBJECT))",
        ")",
        |w| {
            w.line("(struct.new $OBJECT (local.get $class) (ref.null $PAIR))");
        },
    );
    w.block(
        "(func $getattr (param $obj (ref $OBJECT)) (param $name (ref $STRING)) (result anyref)",
        ")",
        |w| {
            w.line("(local $v anyref)");
            w.line("(local.set $v (call $alist_get (struct.get $OBJECT $attrs (local.get $obj)) (local.get $name)))");
            w.block("(if (result anyref) (ref.is_null (local.get $v))", ")", |w| {
                w.line("(then (call $bind_descriptor (local.get $obj) (call $method_lookup (struct.get $OBJECT $class (local.get $obj)) (local.get $name))))");
                w.line("(else (local.get $v))");
            });
        },
    );
    w.block(
        "(func $setattr (param $obj (ref $OBJECT)) (param $name (ref $STRING)) (param $v anyref)",
        ")",
        |w| {
            w.line("(struct.set $OBJECT $attrs (local.get $obj) (call $alist_cons (struct.get $OBJECT $attrs (local.get $obj)) (local.get $name) (local.get $v)))");
        },
    );
    w.finish()
}

/// `$bind_descriptor`: `$STATICMETHOD`/`$CLASSMETHOD`/`$PROPERTY` are
/// structurally distinguished by field order/padding (WASM GC has no
/// nominal tagging for struct kinds), so binding dispatches with `ref.test`
/// in that order before falling through to a plain instance-method bind.
pub fn emit_descriptor_binding() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $bind_descriptor (param $obj (ref $OBJECT)) (param $found anyref) (result anyref)",
        ")",
        |w| {
            w.block("(if (result anyref) (ref.is_null (local.get $found))", ")", |w| {
                w.line("(then (ref.null any))");
                w.block("(else", ")", |w| {
                    w.block("(if (result anyref) (ref.test (ref $STATICMETHOD) (local.get $found))", ")", |w| {
                        w.line("(then (struct.get $STATICMETHOD $func (ref.cast (ref $STATICMETHOD) (local.get $found))))");
                        w.block("(else", ")", |w| {
                            w.block("(if (result anyref) (ref.test (ref $CLASSMETHOD) (local.get $found))", ")", |w| {
                                w.line("(then (call $bind_method (struct.get $CLASSMETHOD $func (ref.cast (ref $CLASSMETHOD) (local.get $found))) (struct.get $OBJECT $class (local.get $obj))))");
                                w.block("(else", ")", |w| {
                                    w.block("(if (result anyref) (ref.test (ref $PROPERTY) (local.get $found))", ")", |w| {
                                        w.line("(then (call $call_closure_1 (ref.cast (ref $CLOSURE) (struct.get $PROPERTY $getter (ref.cast (ref $PROPERTY) (local.get $found)))) (local.get $obj)))");
                                        w.line("(else (call $bind_method (local.get $found) (local.get $obj)))");
                                    });
                                });
                            });
                        });
                    });
                });
            });
        },
    );
    // `$bind_method`: wraps a plain closure so its first call argument is
    // fixed to `self`/`cls`, the same shape `property` getters bind to.
    w.block(
        "(func $bind_method (param $func anyref) (param $self anyref) (result anyref)",
        ")",
        |w| {
            w.line("(struct.new $PAIR (local.get $func) (local.get $self))");
        },
    );
    w.finish()
}

/// `$super_new`: `super(Class, self)` captures the class and instance so
/// method lookup starts at `Class.base` instead of `self`'s own class.
pub fn emit_super_ops() -> String {
    let mut w = WatWriter::default();
    w.block(
        "(func $super_new (param $class (ref $CLASS)) (param $self anyref) (result (ref $SUPER))",
        ")",
        |w| {
            w.line("(struct.new $SUPER (local.get $class) (local.get $self))");
        },
    );
    w.block(
        "(func $super_getattr (param $s (ref $SUPER)) (param $name (ref $STRING)) (result anyref)",
        ")",
        |w| {
            w.line("(call $bind_method");
            w.line("  (call $method_lookup (struct.get $CLASS $base (struct.get $SUPER $class (local.get $s))) (local.get $name))");
            w.line("  (struct.get $SUPER $self (local.get $s)))");
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_lookup_walks_base_chain() {
        let out = emit_class_ops();
        assert!(out.contains("struct.get $CLASS $base"));
        assert!(out.contains("br $walk"));
        assert!(out.contains("call $alist_get"));
    }

    #[test]
    fn alist_cons_prepends_rather_than_mutates() {
        let out = emit_alist_ops();
        assert!(out.contains("struct.new $PAIR (struct.new $PAIR (local.get $name) (local.get $value)) (local.get $chain))"));
    }

    #[test]
    fn setattr_conses_a_new_attrs_head() {
        let out = emit_instance_ops();
        assert!(out.contains("call $alist_cons"));
        assert!(!out.contains("dict_set"));
    }

    #[test]
    fn bind_descriptor_checks_staticmethod_before_classmethod() {
        let out = emit_descriptor_binding();
        let static_pos = out.find("$STATICMETHOD").unwrap();
        let class_pos = out.find("$CLASSMETHOD").unwrap();
        assert!(static_pos < class_pos);
    }

    #[test]
    fn super_getattr_starts_lookup_at_base() {
        let out = emit_super_ops();
        assert!(out.contains("struct.get $CLASS $base"));
    }
}
