//! Host ABI import declarations. Every function the compiled module calls
//! out to the embedding engine for — console/alert, numeric-to-string
//! formatting shims, DOM, canvas 2D, and event listeners — is declared
//! here as a plain WASM `import`; `CodegenConfig::host_bridge` (see the
//! compiler crate) controls whether the DOM/canvas/event groups are
//! emitted at all, since a headless target only needs the first two.

use crate::text::WatWriter;

pub fn emit_numeric_and_console_imports() -> String {
    let mut w = WatWriter::default();
    w.line("(import \"env\" \"write_char\" (func $write_char (param i32) (param i32)))");
    w.line("(import \"env\" \"write_i32\" (func $write_i32 (param i32) (param i32) (result i32)))");
    w.line("(import \"env\" \"write_i64\" (func $write_i64 (param i32) (param i64) (result i32)))");
    w.line("(import \"env\" \"write_f64\" (func $write_f64 (param i32) (param f64) (result i32)))");
    w.line("(import \"env\" \"f64_to_string\" (func $f64_to_string (param i32) (param f64) (result i32)))");
    w.line("(import \"env\" \"f64_format_precision\" (func $f64_format_precision (param i32) (param f64) (param i32) (result i32)))");
    w.line("(import \"env\" \"math_pow\" (func $math_pow (param f64) (param f64) (result f64)))");
    w.line("(import \"js\" \"console_log\" (func $console_log (param (ref $STRING))))");
    w.line("(import \"js\" \"alert\" (func $js_alert (param (ref $STRING))))");
    w.finish()
}

/// DOM access: query/mutate element text, HTML, form values, and class
/// lists. Import names carry no `dom_` prefix in the original ABI, matching
/// the host's own namespacing of the `js` module.
pub fn emit_dom_imports() -> String {
    let mut w = WatWriter::default();
    for (name, params, result) in [
        ("query_selector", "(param (ref $STRING))", "(result i32)"),
        ("get_text_content", "(param i32)", "(result (ref $STRING))"),
        ("set_text_content", "(param i32) (param (ref $STRING))", ""),
        ("get_inner_html", "(param i32)", "(result (ref $STRING))"),
        ("set_inner_html", "(param i32) (param (ref $STRING))", ""),
        ("get_value", "(param i32)", "(result (ref $STRING))"),
        ("set_value", "(param i32) (param (ref $STRING))", ""),
        ("add_class", "(param i32) (param (ref $STRING))", ""),
        ("remove_class", "(param i32) (param (ref $STRING))", ""),
        ("toggle_class", "(param i32) (param (ref $STRING))", ""),
    ] {
        w.line(&format!(
            "(import \"js\" \"{name}\" (func ${name} {params} {result}))"
        ));
    }
    w.finish()
}

/// Canvas 2D drawing primitives. Import names carry a `canvas_` prefix
/// (unlike the plain DOM group above) since the host namespaces the 2D
/// context API separately from generic element access.
pub fn emit_canvas_imports() -> String {
    let mut w = WatWriter::default();
    for (name, params) in [
        ("canvas_fill_rect", "(param f64) (param f64) (param f64) (param f64)"),
        ("canvas_stroke_rect", "(param f64) (param f64) (param f64) (param f64)"),
        ("canvas_clear_rect", "(param f64) (param f64) (param f64) (param f64)"),
        ("canvas_begin_path", ""),
        ("canvas_move_to", "(param f64) (param f64)"),
        ("canvas_line_to", "(param f64) (param f64)"),
        ("canvas_arc", "(param f64) (param f64) (param f64) (param f64) (param f64)"),
        ("canvas_fill", ""),
        ("canvas_stroke", ""),
        ("canvas_set_fill_style", "(param (ref $STRING))"),
        ("canvas_set_stroke_style", "(param (ref $STRING))"),
    ] {
        w.line(&format!("(import \"js\" \"{name}\" (func ${name} {params}))"));
    }
    w.finish()
}

/// Event listeners and the generic fallback dispatch (`call_method`) used
/// for host-object method calls the compiler has no dedicated import for.
pub fn emit_event_and_fallback_imports() -> String {
    let mut w = WatWriter::default();
    w.line("(import \"js\" \"add_event_listener\" (func $add_event_listener (param i32) (param (ref $STRING)) (param (ref $CLOSURE))))");
    w.line("(import \"js\" \"prevent_default\" (func $prevent_default (param i32)))");
    w.line("(import \"js\" \"call_method\" (func $call_method (param i32) (param (ref $STRING)) (param (ref $ARRAY_ANY)) (result anyref)))");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_imports_cover_every_scalar_write_shim() {
        let out = emit_numeric_and_console_imports();
        for shim in ["write_char", "write_i32", "write_i64", "write_f64", "f64_to_string", "f64_format_precision", "math_pow"] {
            assert!(out.contains(shim), "missing {shim}");
        }
    }

    #[test]
    fn canvas_imports_are_namespaced_with_prefix() {
        let out = emit_canvas_imports();
        assert!(out.contains("\"canvas_fill_rect\""));
        assert!(!out.contains("\"fill_rect\" (func $fill_rect"));
    }

    #[test]
    fn dom_imports_have_no_prefix() {
        let out = emit_dom_imports();
        assert!(out.contains("\"query_selector\""));
    }
}
