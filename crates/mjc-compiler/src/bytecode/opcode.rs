//! Bytecode operation codes.
//!
//! This module defines the instruction set of the MicroJava VM. Each opcode
//! is a single byte, with big-endian operands following inline.

use num_enum::TryFromPrimitive;

/// Bytecode operation codes.
///
/// The VM is a stack machine with a separate frame of local slots per call.
/// Jump and call operands are signed 16-bit displacements from the address
/// of the instruction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Locals
    // =========================================================================
    /// Push local slot. Operand: u8 slot
    Load = 1,
    /// Push local slot 0.
    Load0,
    /// Push local slot 1.
    Load1,
    /// Push local slot 2.
    Load2,
    /// Push local slot 3.
    Load3,
    /// Pop into local slot. Operand: u8 slot
    Store,
    /// Pop into local slot 0.
    Store0,
    /// Pop into local slot 1.
    Store1,
    /// Pop into local slot 2.
    Store2,
    /// Pop into local slot 3.
    Store3,

    // =========================================================================
    // Globals and Fields
    // =========================================================================
    /// Push global data word. Operand: u16 slot
    GetStatic,
    /// Pop into global data word. Operand: u16 slot
    PutStatic,
    /// Pop object, push its field. Operand: u16 field offset
    GetField,
    /// Pop value and object, store the field. Operand: u16 field offset
    PutField,

    // =========================================================================
    // Constants
    // =========================================================================
    /// Push 0.
    Const0,
    /// Push 1.
    Const1,
    /// Push 2.
    Const2,
    /// Push 3.
    Const3,
    /// Push 4.
    Const4,
    /// Push 5.
    Const5,
    /// Push -1.
    ConstM1,
    /// Push a word. Operand: i32
    Const,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division.
    Div,
    /// Integer remainder.
    Rem,
    /// Integer negation.
    Neg,
    /// Shift left.
    Shl,
    /// Arithmetic shift right.
    Shr,
    /// Add a signed byte to a local. Operands: u8 slot, i8 delta
    Inc,

    // =========================================================================
    // Objects and Arrays
    // =========================================================================
    /// Allocate an object. Operand: u16 size in bytes
    New,
    /// Pop length, allocate an array. Operand: u8 (0 = bytes, 1 = words)
    NewArray,
    /// Pop index and array, push the word element.
    ALoad,
    /// Pop value, index and array, store the word element.
    AStore,
    /// Pop index and array, push the byte element.
    BALoad,
    /// Pop value, index and array, store the byte element.
    BAStore,
    /// Pop array, push its length.
    ArrayLength,

    // =========================================================================
    // Stack
    // =========================================================================
    /// Discard top of stack.
    Pop,
    /// Duplicate top of stack.
    Dup,
    /// Duplicate the top two words.
    Dup2,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional jump. Operand: i16 displacement
    Jmp,
    /// Pop two, jump if equal. Operand: i16 displacement
    Jeq,
    /// Pop two, jump if not equal.
    Jne,
    /// Pop two, jump if less.
    Jlt,
    /// Pop two, jump if less or equal.
    Jle,
    /// Pop two, jump if greater.
    Jgt,
    /// Pop two, jump if greater or equal.
    Jge,
    /// Call a method. Operand: i16 displacement
    Call,
    /// Return to the caller.
    Return,
    /// Build a frame. Operands: u8 parameter count, u8 frame size
    Enter,
    /// Tear the frame down.
    Exit,

    // =========================================================================
    // I/O and Traps
    // =========================================================================
    /// Read an int and push it.
    Read,
    /// Pop width and value, print the int.
    Print,
    /// Read a char and push it.
    BRead,
    /// Pop width and value, print the char.
    BPrint,
    /// Halt with a runtime error. Operand: u8 code
    Trap,
    /// Call through a dispatch table. Operands: the method name, one i32 per
    /// character, terminated by an i32 `-1`. Pops the table pointer.
    InvokeVirtual,
    /// Duplicate top of stack below the second word.
    DupX1,
    /// Duplicate top of stack below the third word.
    DupX2,
}

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Get the size of operands for this opcode in bytes.
    ///
    /// `InvokeVirtual` has a variable-length operand; this returns only the
    /// size of its terminator word.
    pub fn operand_size(&self) -> usize {
        match self {
            OpCode::Load
            | OpCode::Store
            | OpCode::NewArray
            | OpCode::Trap => 1,

            OpCode::GetStatic
            | OpCode::PutStatic
            | OpCode::GetField
            | OpCode::PutField
            | OpCode::Inc
            | OpCode::New
            | OpCode::Jmp
            | OpCode::Jeq
            | OpCode::Jne
            | OpCode::Jlt
            | OpCode::Jle
            | OpCode::Jgt
            | OpCode::Jge
            | OpCode::Call
            | OpCode::Enter => 2,

            OpCode::Const | OpCode::InvokeVirtual => 4,

            _ => 0,
        }
    }

    /// Whether this opcode takes a jump displacement.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            OpCode::Jmp
                | OpCode::Jeq
                | OpCode::Jne
                | OpCode::Jlt
                | OpCode::Jle
                | OpCode::Jgt
                | OpCode::Jge
        )
    }

    /// Get the mnemonic for disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Load => "load",
            OpCode::Load0 => "load_0",
            OpCode::Load1 => "load_1",
            OpCode::Load2 => "load_2",
            OpCode::Load3 => "load_3",
            OpCode::Store => "store",
            OpCode::Store0 => "store_0",
            OpCode::Store1 => "store_1",
            OpCode::Store2 => "store_2",
            OpCode::Store3 => "store_3",
            OpCode::GetStatic => "getstatic",
            OpCode::PutStatic => "putstatic",
            OpCode::GetField => "getfield",
            OpCode::PutField => "putfield",
            OpCode::Const0 => "const_0",
            OpCode::Const1 => "const_1",
            OpCode::Const2 => "const_2",
            OpCode::Const3 => "const_3",
            OpCode::Const4 => "const_4",
            OpCode::Const5 => "const_5",
            OpCode::ConstM1 => "const_m1",
            OpCode::Const => "const",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Rem => "rem",
            OpCode::Neg => "neg",
            OpCode::Shl => "shl",
            OpCode::Shr => "shr",
            OpCode::Inc => "inc",
            OpCode::New => "new",
            OpCode::NewArray => "newarray",
            OpCode::ALoad => "aload",
            OpCode::AStore => "astore",
            OpCode::BALoad => "baload",
            OpCode::BAStore => "bastore",
            OpCode::ArrayLength => "arraylength",
            OpCode::Pop => "pop",
            OpCode::Dup => "dup",
            OpCode::Dup2 => "dup2",
            OpCode::Jmp => "jmp",
            OpCode::Jeq => "jeq",
            OpCode::Jne => "jne",
            OpCode::Jlt => "jlt",
            OpCode::Jle => "jle",
            OpCode::Jgt => "jgt",
            OpCode::Jge => "jge",
            OpCode::Call => "call",
            OpCode::Return => "return",
            OpCode::Enter => "enter",
            OpCode::Exit => "exit",
            OpCode::Read => "read",
            OpCode::Print => "print",
            OpCode::BRead => "bread",
            OpCode::BPrint => "bprint",
            OpCode::Trap => "trap",
            OpCode::InvokeVirtual => "invokevirtual",
            OpCode::DupX1 => "dup_x1",
            OpCode::DupX2 => "dup_x2",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_numbering() {
        assert_eq!(OpCode::Load as u8, 1);
        assert_eq!(OpCode::Store0 as u8, 7);
        assert_eq!(OpCode::GetStatic as u8, 11);
        assert_eq!(OpCode::Const0 as u8, 15);
        assert_eq!(OpCode::ConstM1 as u8, 21);
        assert_eq!(OpCode::Const as u8, 22);
        assert_eq!(OpCode::Add as u8, 23);
        assert_eq!(OpCode::Inc as u8, 31);
        assert_eq!(OpCode::New as u8, 32);
        assert_eq!(OpCode::ArrayLength as u8, 38);
        assert_eq!(OpCode::Pop as u8, 39);
        assert_eq!(OpCode::Jmp as u8, 42);
        assert_eq!(OpCode::Jeq as u8, 43);
        assert_eq!(OpCode::Jge as u8, 48);
        assert_eq!(OpCode::Call as u8, 49);
        assert_eq!(OpCode::Enter as u8, 51);
        assert_eq!(OpCode::Trap as u8, 57);
        assert_eq!(OpCode::InvokeVirtual as u8, 58);
        assert_eq!(OpCode::DupX2 as u8, 60);
    }

    #[test]
    fn decode_bytes() {
        assert_eq!(OpCode::from_u8(42), Some(OpCode::Jmp));
        assert_eq!(OpCode::from_u8(0), None);
        assert_eq!(OpCode::from_u8(61), None);
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OpCode::Pop.operand_size(), 0);
        assert_eq!(OpCode::Load.operand_size(), 1);
        assert_eq!(OpCode::Trap.operand_size(), 1);
        assert_eq!(OpCode::Jmp.operand_size(), 2);
        assert_eq!(OpCode::Enter.operand_size(), 2);
        assert_eq!(OpCode::Const.operand_size(), 4);
    }

    #[test]
    fn jump_classification() {
        assert!(OpCode::Jmp.is_jump());
        assert!(OpCode::Jle.is_jump());
        assert!(!OpCode::Call.is_jump());
    }
}
