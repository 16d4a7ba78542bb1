//! Abstract Syntax Tree (AST) for MicroJava.
//!
//! All nodes are allocated in a [`bumpalo::Bump`] arena and reference their
//! children as `&'ast` borrows, so every node is `Copy`. Nodes the passes
//! annotate (expressions, designators, methods, classes) carry a [`NodeId`].
//!
//! The tree mirrors the grammar of the language:
//!
//! ```text
//! program P
//!     namespace N { decls { methods } }
//!     decls
//! { methods }
//! ```

pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use stmt::*;
pub use types::*;

use mjc_core::Span;

/// Identity of an annotated AST node.
///
/// Ids are handed out by [`crate::AstBuilder`] and are unique within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// An identifier as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The identifier text.
    pub name: &'ast str,
    /// Source location.
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A whole compilation unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// The program name.
    pub name: Ident<'ast>,
    /// Namespaces, in source order (they precede global declarations).
    pub namespaces: &'ast [Namespace<'ast>],
    /// Global constant, variable and class declarations.
    pub decls: &'ast [Decl<'ast>],
    /// Global methods.
    pub methods: &'ast [MethodDecl<'ast>],
    /// Source location of the program header.
    pub span: Span,
}

/// A namespace block: its members are declared as `name::member`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Namespace<'ast> {
    /// Namespace name.
    pub name: Ident<'ast>,
    /// Declarations inside the namespace.
    pub decls: &'ast [Decl<'ast>],
    /// Methods inside the namespace.
    pub methods: &'ast [MethodDecl<'ast>],
    /// Source location.
    pub span: Span,
}
