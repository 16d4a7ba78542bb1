//! Analyzer output keyed by AST node.
//!
//! The tree is immutable, so resolved symbols and computed types are kept in
//! side tables indexed by [`NodeId`] instead of being written into the nodes.

use mjc_ast::NodeId;
use mjc_core::{GenerationError, Span};
use rustc_hash::FxHashMap;

use crate::symbols::{SymbolId, TypeId};

/// Resolved symbols and computed types for one tree.
#[derive(Debug, Default, Clone)]
pub struct Annotations {
    /// Designators, methods, static initializers.
    symbols: FxHashMap<NodeId, SymbolId>,
    /// Expressions and classes.
    types: FxHashMap<NodeId, TypeId>,
}

impl Annotations {
    /// Create empty annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the symbol a node resolves to.
    pub fn set_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.symbols.insert(node, symbol);
    }

    /// Record the type of a node.
    pub fn set_type(&mut self, node: NodeId, ty: TypeId) {
        self.types.insert(node, ty);
    }

    /// The symbol a node resolves to.
    pub fn symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.symbols.get(&node).copied()
    }

    /// The type of a node.
    pub fn ty(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    /// The symbol of a node the generator needs, or an internal error.
    pub fn require_symbol(&self, node: NodeId, span: Span) -> Result<SymbolId, GenerationError> {
        self.symbol(node).ok_or(GenerationError::MissingAnnotation {
            node: node.0,
            what: "symbol",
            span,
        })
    }

    /// The type of a node the generator needs, or an internal error.
    pub fn require_type(&self, node: NodeId, span: Span) -> Result<TypeId, GenerationError> {
        self.ty(node).ok_or(GenerationError::MissingAnnotation {
            node: node.0,
            what: "type",
            span,
        })
    }

    /// Number of annotated nodes.
    pub fn len(&self) -> usize {
        self.symbols.len() + self.types.len()
    }

    /// Whether nothing has been annotated.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.types.is_empty()
    }
}
