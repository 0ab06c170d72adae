//! Final assembly pass: resolves every placeholder token codegen leaves in
//! the text it emits, since none of `__LIT_<hex>__`/`__BUILTIN_INDEX_*__`/
//! `__FUNC_INDEX_*__`/`__ENV_SLOT_*__` are valid WAT on their own. Runs once
//! over the fully assembled module text, after every function/`main` body
//! has already been written, so every token that will ever appear has
//! already appeared.
//!
//! Env-slot indices and builtin indices are resolved to a *global*
//! alphabetical rank over every distinct name the whole module references,
//! not a per-scope packed index — every function's `$__frame__` is sized to
//! cover any name the program ever captures rather than just the ones that
//! scope itself closes over. Simpler than scope-aware slot packing, at the
//! cost of some unused array slots in functions that capture only a few
//! names.

use crate::error::{CompileError, CompileResult};

const LOW_MEMORY_RESERVED: u32 = 1024;

pub fn resolve_placeholders(text: &str, function_table_entries: &[String]) -> CompileResult<String> {
    let mut out = text.to_string();

    let builtin_names = collect_distinct(&out, "__BUILTIN_INDEX_");
    for (i, name) in builtin_names.iter().enumerate() {
        out = out.replace(&format!("__BUILTIN_INDEX_{name}__"), &i.to_string());
    }

    let func_names = collect_distinct(&out, "__FUNC_INDEX_");
    for name in &func_names {
        let target = format!("$__func_{name}__");
        let idx = function_table_entries
            .iter()
            .position(|e| e == &target)
            .ok_or_else(|| CompileError::Unimplemented(format!("no function table entry for {target}")))?;
        out = out.replace(&format!("__FUNC_INDEX_{name}__"), &idx.to_string());
    }

    let mut env_names = collect_distinct(&out, "__ENV_SLOT_");
    env_names.retain(|n| n != "COUNT");
    env_names.sort();
    out = out.replace("__ENV_SLOT_COUNT__", &env_names.len().to_string());
    for (i, name) in env_names.iter().enumerate() {
        out = out.replace(&format!("__ENV_SLOT_{name}__"), &i.to_string());
    }

    let literal_tokens = collect_distinct(&out, "__LIT_");
    let mut cursor = LOW_MEMORY_RESERVED;
    let mut data_segments = String::new();
    for hex in &literal_tokens {
        let bytes = decode_hex(hex)?;
        let offset = cursor;
        out = out.replace(&format!("__LIT_{hex}__"), &offset.to_string());
        data_segments.push_str(&format!("(data (i32.const {offset}) \"{}\")\n", escape_bytes(&bytes)));
        cursor += bytes.len() as u32;
    }
    out.push_str(&data_segments);

    Ok(out)
}

/// Embeds a literal's raw bytes directly in the placeholder token so
/// resolution is a stateless, deduplicating text substitution rather than
/// needing a separate literal table threaded through codegen.
pub fn literal_data_token(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        hex.push_str(&format!("{b:02x}"));
    }
    format!("__LIT_{hex}__")
}

fn collect_distinct(text: &str, prefix: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut start = 0;
    while let Some(pos) = text[start..].find(prefix) {
        let abs = start + pos + prefix.len();
        match text[abs..].find("__") {
            Some(end_rel) => {
                let name = text[abs..abs + end_rel].to_string();
                if !found.contains(&name) {
                    found.push(name);
                }
                start = abs + end_rel + 2;
            }
            None => break,
        }
    }
    found
}

fn decode_hex(hex: &str) -> CompileResult<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(CompileError::Unimplemented(format!("malformed literal token __LIT_{hex}__")));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| CompileError::Unimplemented(format!("malformed literal token __LIT_{hex}__")))
        })
        .collect()
}

fn escape_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_token_round_trips_through_resolution() {
        let token = literal_data_token(b"hi");
        let text = format!("(call $load_string_literal (i32.const {token}) (i32.const 2))");
        let out = resolve_placeholders(&text, &[]).unwrap();
        assert!(out.contains("(i32.const 1024)"));
        assert!(out.contains("(data (i32.const 1024) \"\\68\\69\")"));
    }

    #[test]
    fn repeated_literal_reuses_the_same_offset() {
        let token = literal_data_token(b"x");
        let text = format!("(i32.const {token}) (i32.const {token})");
        let out = resolve_placeholders(&text, &[]).unwrap();
        assert_eq!(out.matches("(i32.const 1024)").count(), 2);
        assert_eq!(out.matches("(data").count(), 1);
    }

    #[test]
    fn builtin_index_ranks_alphabetically() {
        let text = "(i32.const __BUILTIN_INDEX_print__) (i32.const __BUILTIN_INDEX_abs__)";
        let out = resolve_placeholders(text, &[]).unwrap();
        assert!(out.contains("(i32.const 1)"));
        assert!(out.contains("(i32.const 0)"));
    }

    #[test]
    fn func_index_resolves_against_table_order() {
        let table = vec!["$__func_a__".to_string(), "$__func_b__".to_string()];
        let text = "(i32.const __FUNC_INDEX_b__)";
        let out = resolve_placeholders(text, &table).unwrap();
        assert!(out.contains("(i32.const 1)"));
    }

    #[test]
    fn missing_func_table_entry_is_an_error() {
        let text = "(i32.const __FUNC_INDEX_missing__)";
        assert!(resolve_placeholders(text, &[]).is_err());
    }

    #[test]
    fn env_slot_count_excludes_the_count_token_itself() {
        let text = "(local.set $x (i32.const __ENV_SLOT_x__)) (local $f (array.new $ARRAY_ANY (ref.null any) (i32.const __ENV_SLOT_COUNT__)))";
        let out = resolve_placeholders(text, &[]).unwrap();
        assert!(out.contains("(i32.const 1)"));
        assert!(!out.contains("ENV_SLOT"));
    }
}
