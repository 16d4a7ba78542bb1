//! Type references.

use super::Ident;
use mjc_core::Span;

/// A reference to a named type: `int`, `Point`, `geo::Point`.
///
/// Array-ness is not part of the reference; declarations carry an
/// `is_array` flag instead, as in the source grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef<'ast> {
    /// Optional namespace qualifier.
    pub namespace: Option<Ident<'ast>>,
    /// The type name.
    pub name: Ident<'ast>,
    /// Source location.
    pub span: Span,
}

impl<'ast> TypeRef<'ast> {
    /// The name as it is looked up in the symbol table.
    pub fn qualified_name(&self) -> String {
        match self.namespace {
            Some(ns) => format!("{}::{}", ns.name, self.name.name),
            None => self.name.name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name() {
        let plain = TypeRef {
            namespace: None,
            name: Ident::new("int", Span::default()),
            span: Span::default(),
        };
        assert_eq!(plain.qualified_name(), "int");

        let qualified = TypeRef {
            namespace: Some(Ident::new("geo", Span::default())),
            name: Ident::new("Point", Span::default()),
            span: Span::default(),
        };
        assert_eq!(qualified.qualified_name(), "geo::Point");
    }
}
