use std::collections::BTreeSet;

/// Everything analysis produces for one function body or the module body
/// Local/free-variable sets use `BTreeSet` so codegen's
/// iteration order — and therefore the WASM local-index assignment it
/// drives — is deterministic across runs, which matters for reproducible
/// output and for tests that assert on emitted local indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeInfo {
    pub locals: BTreeSet<String>,
    pub globals: BTreeSet<String>,
    pub nonlocals: BTreeSet<String>,
    pub iterator_locals: BTreeSet<String>,
    pub comprehension_locals: BTreeSet<String>,
    pub with_locals: BTreeSet<String>,
    pub free_vars: BTreeSet<String>,
    pub is_generator: bool,
    pub slots: Option<Vec<String>>,
}

impl ScopeInfo {
    /// Where a name resolves, in lookup order: local →
    /// nonlocal (via the env chain) → global → builtin (closure table).
    pub fn classify(&self, name: &str) -> NameClass {
        if self.globals.contains(name) {
            NameClass::Global
        } else if self.nonlocals.contains(name) {
            NameClass::Nonlocal
        } else if self.locals.contains(name)
            || self.iterator_locals.contains(name)
            || self.comprehension_locals.contains(name)
            || self.with_locals.contains(name)
        {
            NameClass::Local
        } else if self.free_vars.contains(name) {
            NameClass::Captured
        } else {
            NameClass::Builtin
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass {
    Local,
    Captured,
    Nonlocal,
    Global,
    Builtin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_declaration_wins_over_local_shadow() {
        let mut s = ScopeInfo::default();
        s.locals.insert("x".into());
        s.globals.insert("x".into());
        assert_eq!(s.classify("x"), NameClass::Global);
    }

    #[test]
    fn unbound_name_falls_back_to_builtin() {
        let s = ScopeInfo::default();
        assert_eq!(s.classify("len"), NameClass::Builtin);
    }
}
