//! Array unpack: `[t0, t1, .., *d] = s`.
//!
//! With `n` list positions (blanks included):
//!
//! 1. trap 2 unless `len(s) >= len(d) + n`
//! 2. `ti = s[i]` for every named target, last position first
//! 3. `d[j] = s[n + j]` for every `j < len(d)`
//!
//! The copy loop keeps its counters on the expression stack as
//! `j, k, j` where `k = n + j` is the source index; the top copy of `j` is
//! consumed by the exit test.

use mjc_ast::{Designator, Unpack};

use crate::bytecode::OpCode;
use crate::symbols::TypeId;

use super::{CodegenPass, Result};

/// Runtime error raised when the source array is too short.
const TRAP_UNPACK_BOUNDS: u8 = 2;

impl CodegenPass<'_> {
    pub(super) fn emit_unpack(&mut self, unpack: &Unpack<'_>) -> Result<()> {
        let n = unpack.targets.len() as i32;
        let src_elem = self.element_type(unpack.source)?;
        let dst_elem = self.element_type(unpack.rest)?;

        // bounds check
        self.emit_load_designator(unpack.rest)?;
        self.emitter.emit(OpCode::ArrayLength);
        self.emitter.emit_const(n);
        self.emitter.emit(OpCode::Add);
        self.emit_load_designator(unpack.source)?;
        self.emitter.emit(OpCode::ArrayLength);
        let in_bounds = self.emitter.emit_jump(OpCode::Jle);
        self.emitter.emit_trap(TRAP_UNPACK_BOUNDS);
        self.emitter.patch_jump(in_bounds)?;

        for (i, target) in unpack.targets.iter().enumerate().rev() {
            let Some(target) = target else { continue };
            let sym = self.emit_designator_prefix(target)?;
            self.emit_load_designator(unpack.source)?;
            self.emitter.emit_const(i as i32);
            self.emitter.emit(element_load(src_elem));
            self.emit_store(sym)?;
        }

        self.emitter.emit_const(0);
        self.emitter.emit_const(n);
        self.emitter.emit_const(0);

        let cond = self.emitter.current_offset();
        self.emit_load_designator(unpack.rest)?;
        self.emitter.emit(OpCode::ArrayLength);
        let beyond = self.emitter.emit_jump(OpCode::Jge);
        let to_copy = self.emitter.emit_jump(OpCode::Jmp);

        // j, k -> j + 1, k + 1, j + 1
        let update = self.emitter.current_offset();
        self.emitter.emit_const(1);
        self.emitter.emit(OpCode::Add);
        self.emitter.emit(OpCode::DupX1);
        self.emitter.emit(OpCode::Pop);
        self.emitter.emit_const(1);
        self.emitter.emit(OpCode::Add);
        self.emitter.emit(OpCode::DupX1);
        self.emitter.emit_jump_to(OpCode::Jmp, cond)?;

        // j, k -> j, k with d[j] = s[k]
        self.emitter.patch_jump(to_copy)?;
        self.emitter.emit(OpCode::Dup2);
        self.emit_load_designator(unpack.source)?;
        self.emitter.emit(OpCode::DupX1);
        self.emitter.emit(OpCode::Pop);
        self.emitter.emit(element_load(src_elem));
        self.emit_load_designator(unpack.rest)?;
        self.emitter.emit(OpCode::DupX2);
        self.emitter.emit(OpCode::Pop);
        self.emitter.emit(element_store(dst_elem));
        self.emitter.emit_jump_to(OpCode::Jmp, update)?;

        self.emitter.patch_jump(beyond)?;
        self.emitter.emit(OpCode::Pop);
        self.emitter.emit(OpCode::Pop);
        Ok(())
    }

    fn element_type(&self, array: &Designator<'_>) -> Result<TypeId> {
        let sym = self.symbol(array)?;
        Ok(self.table.elem(self.obj(sym).ty))
    }
}

fn element_load(elem: TypeId) -> OpCode {
    if elem == TypeId::CHAR {
        OpCode::BALoad
    } else {
        OpCode::ALoad
    }
}

fn element_store(elem: TypeId) -> OpCode {
    if elem == TypeId::CHAR {
        OpCode::BAStore
    } else {
        OpCode::AStore
    }
}
