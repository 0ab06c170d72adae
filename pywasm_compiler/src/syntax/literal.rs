use serde::{Deserialize, Serialize};

/// Constant node payloads ("constants (int, float, string, bool,
/// None, Ellipsis, bytes)"). `Int` carries the literal's decimal text
/// rather than a parsed `i64` so codegen can decide the SmallInt/BigInt
/// boundary itself via the same `fits_i31` check the runtime uses, instead
/// of trusting a value the front end already parsed into a fixed width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Literal {
    Int { text: String },
    Float { value: f64 },
    Str { value: String },
    Bytes { value: Vec<u8> },
    Bool { value: bool },
    None,
    Ellipsis,
}

impl Literal {
    /// Parses `Int.text` and reports whether it fits the SmallInt range,
    /// mirroring `pywasm_runtime::values::emit_int_boundary_helpers`'s
    /// `$fits_i31` so the compiler and the runtime agree on the boundary.
    pub fn int_fits_small(text: &str) -> bool {
        match text.parse::<i64>() {
            Ok(v) => (-1_073_741_824..=1_073_741_823).contains(&v),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_int_boundary_matches_runtime_i31_range() {
        assert!(Literal::int_fits_small("1073741823"));
        assert!(!Literal::int_fits_small("1073741824"));
        assert!(Literal::int_fits_small("-1073741824"));
        assert!(!Literal::int_fits_small("-1073741825"));
    }
}
