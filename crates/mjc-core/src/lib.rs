//! Shared vocabulary for the MicroJava compiler back end.
//!
//! - [`Span`]: source locations carried by AST nodes and diagnostics
//! - [`CompilationError`], [`GenerationError`], [`MjcError`]: error taxonomy
//! - [`Diagnostic`], [`Severity`]: messages reported to the driver

mod diagnostic;
mod error;
mod span;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{CompilationError, GenerationError, MjcError};
pub use span::Span;
