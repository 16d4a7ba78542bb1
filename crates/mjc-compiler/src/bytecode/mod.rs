//! Bytecode types for the MicroJava compiler.
//!
//! - [`OpCode`] - The instruction set of the VM
//! - [`BytecodeChunk`] - The code buffer of a program
//! - [`ObjectFile`] - Code plus the header the VM loads

mod chunk;
mod object;
mod opcode;

pub use chunk::BytecodeChunk;
pub use object::{HEADER_SIZE, MAGIC, ObjectFile};
pub use opcode::OpCode;
