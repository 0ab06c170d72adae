//! `__slots__` extraction: a class body assignment of the
//! form `__slots__ = (...)` or `__slots__ = [...]` whose elements are all
//! string literals triggers generation of a dedicated struct type with
//! named fields instead of the generic `$OBJECT` attrs-dict shape.

use crate::error::{CompileError, CompileResult};
use crate::syntax::{Expr, Literal, Stmt};

/// Returns `Ok(Some(names))` if the class body declares `__slots__` with a
/// well-formed literal sequence, `Ok(None)` if no `__slots__` assignment is
/// present, and `Err` if one is present but malformed (e.g. a name instead
/// of a string literal, or a non-sequence value).
pub fn extract_slots(class_body: &[Stmt]) -> CompileResult<Option<Vec<String>>> {
    for stmt in class_body {
        if let Stmt::Assign { targets, value, .. } = stmt {
            let is_slots_target = targets
                .iter()
                .any(|t| matches!(t, Expr::Name { id, .. } if id == "__slots__"));
            if !is_slots_target {
                continue;
            }
            return Ok(Some(parse_slot_names(value)?));
        }
    }
    Ok(None)
}

fn parse_slot_names(value: &Expr) -> CompileResult<Vec<String>> {
    let elements = match value {
        Expr::Tuple { elements, .. } | Expr::List { elements, .. } => elements,
        _ => return Err(CompileError::MalformedSlots),
    };
    elements
        .iter()
        .map(|e| match e {
            Expr::Constant { value: Literal::Str { value }, .. } => Ok(value.clone()),
            _ => Err(CompileError::MalformedSlots),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn str_lit(s: &str) -> Expr {
        Expr::Constant { value: Literal::Str { value: s.to_string() }, span: Span::default() }
    }

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.to_string(), span: Span::default() }
    }

    #[test]
    fn tuple_of_strings_is_accepted() {
        let body = vec![Stmt::Assign {
            targets: vec![name("__slots__")],
            value: Expr::Tuple { elements: vec![str_lit("x"), str_lit("y")], span: Span::default() },
            span: Span::default(),
        }];
        assert_eq!(extract_slots(&body).unwrap(), Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn no_slots_assignment_returns_none() {
        let body = vec![Stmt::Pass { span: Span::default() }];
        assert_eq!(extract_slots(&body).unwrap(), None);
    }

    #[test]
    fn non_string_element_is_malformed() {
        let body = vec![Stmt::Assign {
            targets: vec![name("__slots__")],
            value: Expr::Tuple { elements: vec![name("x")], span: Span::default() },
            span: Span::default(),
        }];
        assert_eq!(extract_slots(&body), Err(CompileError::MalformedSlots));
    }
}
