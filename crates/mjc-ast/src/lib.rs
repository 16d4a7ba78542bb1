//! MicroJava abstract syntax tree.
//!
//! This crate defines the tree the parser hands to the compiler passes. Nodes
//! live in a [`bumpalo::Bump`] arena; [`AstBuilder`] is the only way to create
//! annotated nodes so their [`NodeId`]s stay unique.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use mjc_ast::AstBuilder;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.method(None, "main", &[], &[], &[b.print(b.int(42), None)]);
//! let program = b.program("P", &[], &[], &[main]);
//! assert_eq!(program.methods.len(), 1);
//! ```

pub mod ast;
mod builder;

pub use ast::*;
pub use builder::AstBuilder;
