//! Bytecode emitter for the MicroJava compiler.
//!
//! The [`BytecodeEmitter`] provides a high-level API for generating bytecode:
//! compact encodings for constants and locals, relative jumps and calls, and
//! the fix-up lists of control constructs.
//!
//! # Example
//!
//! ```
//! use mjc_compiler::bytecode::OpCode;
//! use mjc_compiler::emit::BytecodeEmitter;
//!
//! let mut emitter = BytecodeEmitter::new();
//! emitter.set_line(1);
//! emitter.emit_const(42);
//! emitter.emit_const(10);
//! emitter.emit(OpCode::Add);
//!
//! let chunk = emitter.finish().unwrap();
//! chunk.assert_opcodes(&[OpCode::Const, OpCode::Const, OpCode::Add]);
//! ```

mod jumps;

pub use jumps::{ConstructKind, ConstructState, JumpManager};

use mjc_ast::RelOp;
use mjc_core::GenerationError;

use crate::bytecode::{BytecodeChunk, OpCode};

/// Emits bytecode instructions into one program-wide chunk.
#[derive(Debug)]
pub struct BytecodeEmitter {
    /// The bytecode chunk being built
    chunk: BytecodeChunk,

    /// Jump management for control flow
    jumps: JumpManager,

    /// Current source line for debug info
    current_line: u32,
}

impl BytecodeEmitter {
    /// Create a new bytecode emitter.
    pub fn new() -> Self {
        Self {
            chunk: BytecodeChunk::with_capacity(1024),
            jumps: JumpManager::new(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    ///
    /// All subsequent instructions will be associated with this line number.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.current_line);
    }

    /// Emit opcode with 8-bit operand.
    pub fn emit_byte(&mut self, op: OpCode, byte: u8) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_byte(byte, self.current_line);
    }

    /// Emit opcode with 16-bit operand.
    pub fn emit_u16(&mut self, op: OpCode, value: u16) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_u16(value, self.current_line);
    }

    /// Emit opcode with two 8-bit operands.
    pub fn emit_bytes(&mut self, op: OpCode, a: u8, b: u8) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_byte(a, self.current_line);
        self.chunk.write_byte(b, self.current_line);
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit an integer constant.
    ///
    /// Uses `const_0`..`const_5` and `const_m1` where possible.
    pub fn emit_const(&mut self, value: i32) {
        match value {
            0 => self.emit(OpCode::Const0),
            1 => self.emit(OpCode::Const1),
            2 => self.emit(OpCode::Const2),
            3 => self.emit(OpCode::Const3),
            4 => self.emit(OpCode::Const4),
            5 => self.emit(OpCode::Const5),
            -1 => self.emit(OpCode::ConstM1),
            _ => {
                self.emit(OpCode::Const);
                self.chunk.write_i32(value, self.current_line);
            }
        }
    }

    // ==========================================================================
    // Variables
    // ==========================================================================

    /// Emit load of a local slot.
    pub fn emit_load_local(&mut self, slot: i32) -> Result<(), GenerationError> {
        match slot {
            0 => self.emit(OpCode::Load0),
            1 => self.emit(OpCode::Load1),
            2 => self.emit(OpCode::Load2),
            3 => self.emit(OpCode::Load3),
            _ => self.emit_byte(OpCode::Load, operand("local slot", slot)?),
        }
        Ok(())
    }

    /// Emit store into a local slot.
    pub fn emit_store_local(&mut self, slot: i32) -> Result<(), GenerationError> {
        match slot {
            0 => self.emit(OpCode::Store0),
            1 => self.emit(OpCode::Store1),
            2 => self.emit(OpCode::Store2),
            3 => self.emit(OpCode::Store3),
            _ => self.emit_byte(OpCode::Store, operand("local slot", slot)?),
        }
        Ok(())
    }

    /// Emit load of a global data word.
    pub fn emit_get_static(&mut self, slot: i32) -> Result<(), GenerationError> {
        self.emit_u16(OpCode::GetStatic, operand("global slot", slot)?);
        Ok(())
    }

    /// Emit store into a global data word.
    pub fn emit_put_static(&mut self, slot: i32) -> Result<(), GenerationError> {
        self.emit_u16(OpCode::PutStatic, operand("global slot", slot)?);
        Ok(())
    }

    /// Emit field load.
    pub fn emit_get_field(&mut self, offset: i32) -> Result<(), GenerationError> {
        self.emit_u16(OpCode::GetField, operand("field offset", offset)?);
        Ok(())
    }

    /// Emit field store.
    pub fn emit_put_field(&mut self, offset: i32) -> Result<(), GenerationError> {
        self.emit_u16(OpCode::PutField, operand("field offset", offset)?);
        Ok(())
    }

    /// Emit `inc slot, delta`.
    pub fn emit_inc(&mut self, slot: i32, delta: i8) -> Result<(), GenerationError> {
        let slot = operand("local slot", slot)?;
        self.emit_bytes(OpCode::Inc, slot, u8::from_be_bytes(delta.to_be_bytes()));
        Ok(())
    }

    /// Emit `new size` for an object of `size` bytes.
    pub fn emit_new(&mut self, size: u32) -> Result<(), GenerationError> {
        self.emit_u16(OpCode::New, operand("object size", size)?);
        Ok(())
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    /// Emit a frame setup and return the offset of the `enter`.
    pub fn emit_enter(&mut self, params: u32, frame_size: u32) -> Result<usize, GenerationError> {
        let at = self.chunk.current_offset();
        let params = operand("parameter count", params)?;
        let frame_size = operand("frame size", frame_size)?;
        self.emit_bytes(OpCode::Enter, params, frame_size);
        Ok(at)
    }

    /// Grow the frame of the `enter` at `at` to `frame_size` slots.
    pub fn patch_frame_size(&mut self, at: usize, frame_size: u32) -> Result<(), GenerationError> {
        let frame_size = operand("frame size", frame_size)?;
        self.chunk.patch_byte(at + 2, frame_size)
    }

    /// Emit `exit; return`.
    pub fn emit_return(&mut self) {
        self.emit(OpCode::Exit);
        self.emit(OpCode::Return);
    }

    /// Emit a direct call to the method at `target`.
    pub fn emit_call(&mut self, target: usize) -> Result<(), GenerationError> {
        self.emit_jump_to(OpCode::Call, target)
    }

    /// Emit a call through the dispatch table whose pointer is on the stack.
    pub fn emit_invoke_virtual(&mut self, name: &str) {
        self.emit(OpCode::InvokeVirtual);
        for c in name.chars() {
            self.chunk.write_i32(c as i32, self.current_line);
        }
        self.chunk.write_i32(-1, self.current_line);
    }

    /// Emit a runtime trap.
    pub fn emit_trap(&mut self, code: u8) {
        self.emit_byte(OpCode::Trap, code);
    }

    // ==========================================================================
    // Jumps and Control Flow
    // ==========================================================================

    /// Emit a forward jump (target unknown).
    ///
    /// Returns a label that must be patched later with [`Self::patch_jump`].
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        self.emit(op);
        let offset = self.chunk.current_offset();
        self.chunk.write_i16(0, self.current_line); // Placeholder
        JumpLabel(offset)
    }

    /// Patch a forward jump to the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) -> Result<(), GenerationError> {
        let target = self.chunk.current_offset();
        self.patch_jump_to(label, target)
    }

    /// Patch a forward jump to `target`.
    pub fn patch_jump_to(&mut self, label: JumpLabel, target: usize) -> Result<(), GenerationError> {
        let displacement = displacement(label.instruction(), target)?;
        self.chunk.patch_i16(label.0, displacement)
    }

    /// Emit a jump or call to a known target.
    pub fn emit_jump_to(&mut self, op: OpCode, target: usize) -> Result<(), GenerationError> {
        let at = self.chunk.current_offset();
        let displacement = displacement(at, target)?;
        self.emit(op);
        self.chunk.write_i16(displacement, self.current_line);
        Ok(())
    }

    /// Get current bytecode offset.
    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    // ==========================================================================
    // Construct Fix-up Lists
    // ==========================================================================

    /// Open the fix-up lists of an `if` or `for`.
    pub fn open_construct(&mut self, kind: ConstructKind) {
        self.jumps.open_construct(kind);
    }

    /// Emit the jump taken when `lhs op rhs` is false.
    pub fn emit_false_jump(&mut self, op: RelOp) -> Result<(), GenerationError> {
        let label = self.emit_jump(condition_jump(op.inverse()));
        self.jumps.add_false(label)
    }

    /// Emit an unconditional jump into the statement body.
    pub fn emit_body_jump(&mut self) -> Result<(), GenerationError> {
        let label = self.emit_jump(OpCode::Jmp);
        self.jumps.add_body(label)
    }

    /// Patch the current false list to here.
    pub fn patch_false_list(&mut self) -> Result<usize, GenerationError> {
        let labels = self.jumps.take_false()?;
        let count = labels.len();
        for label in labels {
            self.patch_jump(label)?;
        }
        Ok(count)
    }

    /// Patch the current body list to here.
    pub fn patch_body_list(&mut self) -> Result<usize, GenerationError> {
        let labels = self.jumps.take_body()?;
        let count = labels.len();
        for label in labels {
            self.patch_jump(label)?;
        }
        Ok(count)
    }

    /// Access the construct state machine.
    pub fn jumps(&mut self) -> &mut JumpManager {
        &mut self.jumps
    }

    // ==========================================================================
    // Loop Control (Break/Continue)
    // ==========================================================================

    /// Enter a loop context.
    ///
    /// # Arguments
    /// * `continue_target` - The bytecode offset for continue statements
    pub fn enter_loop(&mut self, continue_target: usize) {
        self.jumps.enter_loop(continue_target);
    }

    /// Exit a loop context.
    ///
    /// Patches all exit jumps to the current position and returns how many
    /// there were.
    pub fn exit_loop(&mut self) -> Result<usize, GenerationError> {
        let labels = self.jumps.exit_loop()?;
        let count = labels.len();
        for label in labels {
            self.patch_jump(label)?;
        }
        Ok(count)
    }

    /// Emit a break statement.
    pub fn emit_break(&mut self) -> Result<(), GenerationError> {
        if !self.jumps.in_loop() {
            return Err(GenerationError::FixupImbalance {
                detail: "break emitted outside a loop".to_string(),
            });
        }
        let label = self.emit_jump(OpCode::Jmp);
        self.jumps.add_break(label)
    }

    /// Emit a continue statement.
    pub fn emit_continue(&mut self) -> Result<(), GenerationError> {
        let target = self.jumps.continue_target()?;
        self.emit_jump_to(OpCode::Jmp, target)
    }

    /// Get current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.jumps.loop_depth()
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Finish and return the bytecode chunk.
    pub fn finish(self) -> Result<BytecodeChunk, GenerationError> {
        if !self.jumps.is_balanced() {
            return Err(GenerationError::FixupImbalance {
                detail: "constructs left open at end of program".to_string(),
            });
        }
        Ok(self.chunk)
    }

    /// Get current chunk size.
    pub fn code_size(&self) -> usize {
        self.chunk.len()
    }

    /// The code emitted so far.
    pub fn chunk(&self) -> &BytecodeChunk {
        &self.chunk
    }
}

impl Default for BytecodeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow `value` to the type of the operand that encodes it.
fn operand<T, V>(what: &'static str, value: V) -> Result<T, GenerationError>
where
    T: TryFrom<V>,
    V: Copy + Into<i64>,
{
    T::try_from(value).map_err(|_| GenerationError::OperandOutOfRange {
        what,
        value: value.into(),
    })
}

/// Displacement of a jump or call at `from` to `to`.
fn displacement(from: usize, to: usize) -> Result<i16, GenerationError> {
    let value = to as i64 - from as i64;
    i16::try_from(value).map_err(|_| GenerationError::OperandOutOfRange {
        what: "jump displacement",
        value,
    })
}

/// The conditional jump taken when `op` holds.
pub fn condition_jump(op: RelOp) -> OpCode {
    match op {
        RelOp::Eq => OpCode::Jeq,
        RelOp::Ne => OpCode::Jne,
        RelOp::Lt => OpCode::Jlt,
        RelOp::Le => OpCode::Jle,
        RelOp::Gt => OpCode::Jgt,
        RelOp::Ge => OpCode::Jge,
    }
}

/// A label for a forward jump that needs patching.
///
/// Holds the offset of the jump's operand; the instruction starts one byte
/// earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub(crate) usize);

impl JumpLabel {
    /// Get the bytecode offset of the operand.
    pub fn offset(&self) -> usize {
        self.0
    }

    /// Get the bytecode offset of the jump instruction.
    pub fn instruction(&self) -> usize {
        self.0 - 1
    }
}
