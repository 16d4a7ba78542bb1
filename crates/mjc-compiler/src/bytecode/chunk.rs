//! Bytecode chunk for a compiled program.
//!
//! A `BytecodeChunk` holds the code of every method of the program in one
//! buffer (calls are relative, so methods must share it), along with line
//! number information for debugging.

use std::fmt::Write as _;

use mjc_core::GenerationError;

use super::OpCode;

/// The code buffer of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeChunk {
    /// The bytecode instructions.
    code: Vec<u8>,
    /// Line numbers for debugging (parallel to code).
    /// Each entry corresponds to a byte in `code`.
    lines: Vec<u32>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bytecode chunk with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
        }
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.code.push(op as u8);
        self.lines.push(line);
    }

    /// Write a byte operand.
    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Write a signed 16-bit operand (big-endian).
    pub fn write_i16(&mut self, value: i16, line: u32) {
        self.write_u16(value as u16, line);
    }

    /// Write a 32-bit operand (big-endian).
    pub fn write_i32(&mut self, value: i32, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Get current code offset (for jump patching).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Overwrite the 16-bit operand at `offset`.
    pub fn patch_i16(&mut self, offset: usize, value: i16) -> Result<(), GenerationError> {
        let [hi, lo] = value.to_be_bytes();
        self.patch_bytes(offset, &[hi, lo])
    }

    /// Overwrite the byte operand at `offset`.
    pub fn patch_byte(&mut self, offset: usize, value: u8) -> Result<(), GenerationError> {
        self.patch_bytes(offset, &[value])
    }

    fn patch_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), GenerationError> {
        let len = self.code.len();
        let slot = self
            .code
            .get_mut(offset..offset + bytes.len())
            .ok_or_else(|| GenerationError::FixupImbalance {
                detail: format!("patch at {offset} is past the end of the code ({len} bytes)"),
            })?;
        slot.copy_from_slice(bytes);
        Ok(())
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// Get the length of the bytecode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a byte at the given offset.
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at the given offset (big-endian).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read an i16 at the given offset (big-endian).
    pub fn read_i16(&self, offset: usize) -> Option<i16> {
        self.read_u16(offset).map(|v| v as i16)
    }

    /// Read an i32 at the given offset (big-endian).
    pub fn read_i32(&self, offset: usize) -> Option<i32> {
        let bytes = self.code.get(offset..offset + 4)?;
        Some(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an opcode at the given offset.
    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    /// Total length of the instruction at `offset`, opcode included.
    pub fn instruction_len(&self, offset: usize) -> Option<usize> {
        let op = self.read_op(offset)?;
        if op != OpCode::InvokeVirtual {
            return Some(1 + op.operand_size());
        }
        let mut cursor = offset + 1;
        loop {
            let word = self.read_i32(cursor)?;
            cursor += 4;
            if word == -1 {
                return Some(cursor - offset);
            }
        }
    }

    /// Absolute target of the jump or call at `offset`.
    pub fn jump_target(&self, offset: usize) -> Option<usize> {
        let op = self.read_op(offset)?;
        if !op.is_jump() && op != OpCode::Call {
            return None;
        }
        let displacement = self.read_i16(offset + 1)? as isize;
        usize::try_from(offset as isize + displacement).ok()
    }

    /// Offsets of every instruction, in order.
    pub fn instruction_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut offset = 0;
        while offset < self.code.len() {
            offsets.push(offset);
            offset += self.instruction_len(offset).unwrap_or(1);
        }
        offsets
    }

    /// Extract all opcodes from the chunk, skipping operands.
    ///
    /// This is useful for testing bytecode sequences without worrying about
    /// specific operand values or instruction offsets.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instruction_offsets()
            .into_iter()
            .filter_map(|offset| self.read_op(offset))
            .collect()
    }

    /// Opcodes of the instructions in `start..end`.
    pub fn opcodes_in(&self, start: usize, end: usize) -> Vec<OpCode> {
        self.instruction_offsets()
            .into_iter()
            .filter(|&offset| offset >= start && offset < end)
            .filter_map(|offset| self.read_op(offset))
            .collect()
    }

    /// Render the chunk as one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for offset in self.instruction_offsets() {
            let Some(op) = self.read_op(offset) else {
                let _ = writeln!(out, "{offset:5}: ??? {}", self.code[offset]);
                continue;
            };
            let _ = write!(out, "{offset:5}: {}", op.name());
            match op {
                OpCode::Const => {
                    let _ = write!(out, " {}", self.read_i32(offset + 1).unwrap_or(0));
                }
                OpCode::InvokeVirtual => {
                    let len = self.instruction_len(offset).unwrap_or(5);
                    let name: String = (offset + 1..offset + len - 4)
                        .step_by(4)
                        .filter_map(|at| self.read_i32(at))
                        .filter_map(|w| char::from_u32(w as u32))
                        .collect();
                    let _ = write!(out, " {name}");
                }
                _ if op.is_jump() || op == OpCode::Call => {
                    let _ = write!(out, " -> {}", self.jump_target(offset).unwrap_or(0));
                }
                OpCode::Inc | OpCode::Enter => {
                    let a = self.read_byte(offset + 1).unwrap_or(0);
                    let b = self.read_byte(offset + 2).unwrap_or(0);
                    let _ = write!(out, " {a} {}", b as i8);
                }
                _ => match op.operand_size() {
                    1 => {
                        let _ = write!(out, " {}", self.read_byte(offset + 1).unwrap_or(0));
                    }
                    2 => {
                        let _ = write!(out, " {}", self.read_u16(offset + 1).unwrap_or(0));
                    }
                    _ => {}
                },
            }
            out.push('\n');
        }
        out
    }

    /// Consume the chunk, returning the raw code.
    pub fn into_code(self) -> Vec<u8> {
        self.code
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// This ignores operand values, only checking the opcodes themselves.
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes (in order, but not necessarily contiguous).
    ///
    /// Useful for verifying key opcodes are present without checking every instruction.
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}
