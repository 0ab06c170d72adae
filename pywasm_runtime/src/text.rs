//! Small indentation-aware string builder shared by every runtime module.
//!
//! Mirrors the write_line/indent/dedent helpers used on the compiler side:
//! each runtime section builds its WAT fragment by pushing lines into a
//! `WatWriter` rather than hand-concatenating strings, so indentation stays
//! consistent when fragments are spliced into the final module.

#[derive(Debug, Clone)]
pub struct WatWriter {
    out: String,
    indent_level: usize,
    indent_unit: String,
}

impl Default for WatWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

impl WatWriter {
    pub fn new(indent_unit: &str) -> Self {
        Self {
            out: String::new(),
            indent_level: 0,
            indent_unit: indent_unit.to_string(),
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            self.out.push('\n');
        } else {
            for _ in 0..self.indent_level {
                self.out.push_str(&self.indent_unit);
            }
            self.out.push_str(text);
            self.out.push('\n');
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Push a block delimited by a header line, an indented body, and a
    /// fixed closer (the pattern every `(func ...)`/`(type ...)` form uses).
    pub fn block(&mut self, header: &str, closer: &str, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(header);
        self.indent();
        body(self);
        self.dedent();
        self.line(closer);
        self
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }
}

/// Embeds a literal's raw bytes directly in a placeholder token that the
/// compiler's final assembly pass resolves into a `(data ...)` segment.
/// That pass scans the whole assembled module text for `__LIT_<hex>__`
/// regardless of which crate produced it, so runtime functions can embed
/// their own string literals (error messages, type names) the same way
/// compiler-generated code embeds source string/bytes literals.
pub fn literal_data_token(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        hex.push_str(&format!("{b:02x}"));
    }
    format!("__LIT_{hex}__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_blocks() {
        let mut w = WatWriter::default();
        w.block("(func $f", ")", |w| {
            w.line("(local.get 0)");
        });
        assert_eq!(w.finish(), "(func $f\n  (local.get 0)\n)\n");
    }

    #[test]
    fn blank_line_has_no_indentation() {
        let mut w = WatWriter::default();
        w.indent();
        w.blank();
        assert_eq!(w.finish(), "\n");
    }
}
