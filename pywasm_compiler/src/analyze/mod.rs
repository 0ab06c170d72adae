//! Static pre-emission analysis: variable collection,
//! free-variable analysis for closures, generator detection, slot
//! detection, and the cheap structural type hints codegen consults.

pub mod collector;
pub mod scope;
pub mod slots;
pub mod type_hint;

pub use collector::analyze_body;
pub use scope::{NameClass, ScopeInfo};
pub use slots::extract_slots;
pub use type_hint::{infer as infer_type_hint, TypeHint};
