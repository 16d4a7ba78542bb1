//! MicroJava Compiler
//!
//! The back end of the MicroJava compiler: a checked, annotated tree in, an
//! object file for the MicroJava VM out.
//!
//! ## Architecture
//!
//! - **Pass 1 (Analysis)**: Declare every name, resolve every designator and
//!   type, check the static semantics and record the results by node id
//! - **Pass 2 (Code generation)**: Walk the tree again and emit bytecode from
//!   the recorded symbols and types
//!
//! ## Modules
//!
//! - [`annotations`]: Per-node analyzer output
//! - [`bytecode`]: Bytecode types (OpCode, BytecodeChunk, ObjectFile)
//! - [`emit`]: High-level bytecode emitter and construct fix-up lists
//! - [`options`]: Compiler configuration
//! - [`passes`]: The analysis and code generation passes
//! - [`scope`]: Lexical scope stack
//! - [`symbols`]: Symbol and type arena

pub mod annotations;
pub mod bytecode;
pub mod emit;
pub mod options;
pub mod passes;
pub mod scope;
pub mod symbols;

pub use annotations::Annotations;
pub use bytecode::{BytecodeChunk, ObjectFile, OpCode};
pub use emit::{BytecodeEmitter, JumpLabel};
pub use options::CompilerOptions;
pub use passes::{AnalysisOutput, AnalysisPass, Builtins, CodegenPass};
pub use scope::{Declared, ScopeStack};
pub use symbols::{Obj, ObjKind, Struct, StructKind, SymbolId, SymbolTable, TypeId};

// Re-export the error types from core for convenience
pub use mjc_core::{CompilationError, Diagnostic, GenerationError};
