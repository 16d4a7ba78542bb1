//! The object file handed to the VM.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! "MJ" | code size: u32 | data size: u32 | entry address: u32 | code
//! ```

use std::io::{self, Write};

use super::BytecodeChunk;

/// File signature.
pub const MAGIC: [u8; 2] = *b"MJ";

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 14;

/// A compiled program: code, global data size and entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    /// The code of every method.
    pub chunk: BytecodeChunk,
    /// Global data words: variables plus dispatch tables.
    pub data_size: u32,
    /// Code address of `main`.
    pub main_pc: u32,
}

impl ObjectFile {
    /// Raw code bytes.
    pub fn code(&self) -> &[u8] {
        self.chunk.code()
    }

    /// Serialize header and code.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.chunk.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&(self.chunk.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data_size.to_be_bytes());
        out.extend_from_slice(&self.main_pc.to_be_bytes());
        out.extend_from_slice(self.chunk.code());
        out
    }

    /// Serialize into a writer.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;

    #[test]
    fn header_layout() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Return, 1);
        let object = ObjectFile {
            chunk,
            data_size: 3,
            main_pc: 0x0102,
        };

        let bytes = object.to_bytes();
        assert_eq!(&bytes[0..2], b"MJ");
        assert_eq!(&bytes[2..6], &[0, 0, 0, 1]);
        assert_eq!(&bytes[6..10], &[0, 0, 0, 3]);
        assert_eq!(&bytes[10..14], &[0, 0, 1, 2]);
        assert_eq!(bytes[14], OpCode::Return as u8);
        assert_eq!(bytes.len(), HEADER_SIZE + 1);
    }

    #[test]
    fn write_to_matches_bytes() {
        let object = ObjectFile {
            chunk: BytecodeChunk::new(),
            data_size: 0,
            main_pc: 0,
        };
        let mut sink = Vec::new();
        object.write_to(&mut sink).unwrap();
        assert_eq!(sink, object.to_bytes());
    }
}
