//! Predefined methods.

use crate::bytecode::OpCode;

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Emit `chr`, `ord` and `len` at the start of the code.
    ///
    /// `chr` and `ord` return their argument unchanged; `len` returns the
    /// length of the array it receives.
    pub(super) fn emit_builtins(&mut self) -> Result<()> {
        for method in self.builtins.all() {
            let is_len = method == self.builtins.len;
            self.table.obj_mut(method).address = self.emitter.current_offset() as i32;

            self.emitter.emit_enter(1, 1)?;
            self.emitter.emit_load_local(0)?;
            if is_len {
                self.emitter.emit(OpCode::ArrayLength);
            }
            self.emitter.emit_return();
        }
        Ok(())
    }
}
