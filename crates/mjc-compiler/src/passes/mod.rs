//! Compiler passes.
//!
//! - [`analysis`]: Pass 1 - declare names, resolve designators, check types
//! - [`codegen`]: Pass 2 - emit bytecode from the annotated tree
//!
//! Pass 2 only runs when pass 1 recorded no errors.

pub mod analysis;
pub mod codegen;

pub use analysis::{AnalysisOutput, AnalysisPass, Builtins};
pub use codegen::CodegenPass;
