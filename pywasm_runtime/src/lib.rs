//! Generates the WAT source of the runtime library the AoT compiler embeds
//! into every compiled module: the tagged-value type declarations and the
//! functions that implement numerics, strings, collections, objects,
//! exceptions, generators, and the host ABI bridge.
//!
//! This crate never sees a syntax tree. Its job ends at handing
//! `pywasm_compiler::codegen::program` a `RuntimeLibrary` whose pieces get
//! spliced between the module's own generated globals/functions.

pub mod builtins;
pub mod closures;
pub mod collections;
pub mod dispatch;
pub mod error;
pub mod exceptions;
pub mod generators;
pub mod host_bridge;
pub mod numerics;
pub mod objects;
pub mod strings;
pub mod text;
pub mod values;

pub use error::{RuntimeError, RuntimeResult};

/// Which optional host-ABI groups to include. A headless compile target
/// (e.g. the test suite, or a CLI-only script) only needs `console`;
/// a browser target turns on `dom`/`canvas`/`events` too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostBridgeOptions {
    pub dom: bool,
    pub canvas: bool,
    pub events: bool,
}

impl Default for HostBridgeOptions {
    fn default() -> Self {
        Self {
            dom: true,
            canvas: true,
            events: true,
        }
    }
}

/// The fully assembled runtime library, split into the pieces a module
/// assembler needs in order: imports first, then types, then the
/// post-type-section globals, then every helper function body.
#[derive(Debug, Clone)]
pub struct RuntimeLibrary {
    pub imports: String,
    pub types: String,
    pub globals: String,
    pub functions: String,
}

impl RuntimeLibrary {
    pub fn build(host: HostBridgeOptions) -> Self {
        let mut imports = host_bridge::emit_numeric_and_console_imports();
        if host.dom {
            imports.push_str(&host_bridge::emit_dom_imports());
        }
        if host.canvas {
            imports.push_str(&host_bridge::emit_canvas_imports());
        }
        if host.events {
            imports.push_str(&host_bridge::emit_event_and_fallback_imports());
        }

        let types = values::emit_types();
        let globals = values::emit_post_type_globals();

        let mut functions = String::new();
        functions.push_str(&values::emit_is_false());
        functions.push_str(&values::emit_int_boundary_helpers());
        functions.push_str(&values::emit_is_dict());
        functions.push_str(&values::emit_memory_helpers());
        functions.push_str(&values::emit_value_ops());
        functions.push_str(&numerics::emit_basic_int_ops());
        functions.push_str(&numerics::emit_int_div());
        functions.push_str(&numerics::emit_int_mod());
        functions.push_str(&numerics::emit_int_neg_cmp_eq());
        functions.push_str(&numerics::emit_i32_pow());
        functions.push_str(&numerics::emit_float_ops());
        functions.push_str(&numerics::emit_int_to_bytes());
        functions.push_str(&strings::emit_fnv1a());
        functions.push_str(&strings::emit_string_concat());
        functions.push_str(&strings::emit_string_slice());
        functions.push_str(&strings::emit_string_eq());
        functions.push_str(&strings::emit_int_to_string());
        functions.push_str(&strings::emit_load_literal_ops());
        functions.push_str(&strings::emit_float_to_string());
        functions.push_str(&strings::emit_format_float_precision());
        functions.push_str(&strings::emit_string_cmp());
        functions.push_str(&strings::emit_string_contains());
        functions.push_str(&collections::emit_hashtable_ops());
        functions.push_str(&collections::emit_dict_set_wrappers());
        functions.push_str(&collections::emit_list_ops());
        functions.push_str(&collections::emit_tuple_ops());
        functions.push_str(&collections::emit_list_concat());
        functions.push_str(&collections::emit_list_sort());
        functions.push_str(&objects::emit_alist_ops());
        functions.push_str(&objects::emit_class_ops());
        functions.push_str(&objects::emit_instance_ops());
        functions.push_str(&objects::emit_descriptor_binding());
        functions.push_str(&objects::emit_super_ops());
        functions.push_str(&exceptions::emit_exception_ops());
        functions.push_str(&exceptions::emit_exception_type_name());
        functions.push_str(&generators::emit_generator_ops());
        functions.push_str(&generators::emit_locals_save_restore());
        functions.push_str(&closures::emit_env_ops());
        functions.push_str(&closures::emit_closure_ops());
        functions.push_str(&closures::emit_rest_args());
        functions.push_str(&dispatch::emit_arith_dispatch());
        functions.push_str(&dispatch::emit_bitwise_dispatch());
        functions.push_str(&dispatch::emit_unary_dispatch());
        functions.push_str(&builtins::emit_seq_ops());
        functions.push_str(&builtins::emit_subscript_ops());
        functions.push_str(&builtins::emit_dict_update());
        functions.push_str(&builtins::emit_hashtable_keys());
        functions.push_str(&builtins::emit_sequence_contains());
        functions.push_str(&builtins::emit_unpack_ops());
        functions.push_str(&builtins::emit_iterator_ops());
        functions.push_str(&builtins::emit_range_done());
        functions.push_str(&builtins::emit_str_repr_ops());
        functions.push_str(&builtins::emit_simple_builtins());

        Self {
            imports,
            types,
            globals,
            functions,
        }
    }

    /// Concatenate all four sections in module order. Most callers want the
    /// split form so they can interleave their own globals/functions, but a
    /// standalone runtime-only module (used by this crate's own tests and by
    /// `pywasmc --runtime-only`) just wants the whole thing.
    pub fn to_wat_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.imports);
        out.push_str(&self.types);
        out.push_str(&self.globals);
        out.push_str(&self.functions);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_host_bridge_includes_everything() {
        let lib = RuntimeLibrary::build(HostBridgeOptions::default());
        assert!(lib.imports.contains("canvas_fill_rect"));
        assert!(lib.imports.contains("query_selector"));
        assert!(lib.imports.contains("add_event_listener"));
    }

    #[test]
    fn headless_host_bridge_drops_dom_canvas_events() {
        let lib = RuntimeLibrary::build(HostBridgeOptions {
            dom: false,
            canvas: false,
            events: false,
        });
        assert!(!lib.imports.contains("canvas_fill_rect"));
        assert!(!lib.imports.contains("query_selector"));
        assert!(lib.imports.contains("write_i32"));
    }

    #[test]
    fn assembled_library_orders_imports_before_types() {
        let lib = RuntimeLibrary::build(HostBridgeOptions::default());
        let text = lib.to_wat_text();
        let import_pos = text.find("(import").unwrap();
        let type_pos = text.find("(type $PAIR").unwrap();
        assert!(import_pos < type_pos);
    }

    #[test]
    fn globals_follow_type_section() {
        let lib = RuntimeLibrary::build(HostBridgeOptions::default());
        let type_pos = lib.types.len();
        assert!(lib.globals.contains("$string_heap"));
        let _ = type_pos;
    }
}
