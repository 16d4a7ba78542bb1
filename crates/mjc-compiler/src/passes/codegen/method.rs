//! Method bodies.

use mjc_ast::MethodDecl;

use crate::symbols::TypeId;

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Emit one method. Its address becomes the position of its `enter`.
    pub(super) fn emit_method(&mut self, method: &MethodDecl<'_>) -> Result<()> {
        let sym = self.annotations.require_symbol(method.id, method.span)?;
        self.emitter.set_line(method.span.line);
        self.table.obj_mut(sym).address = self.emitter.current_offset() as i32;

        let obj = self.obj(sym);
        let params = obj.param_count;
        let frame_size = obj.locals.len() as u32;
        let returns_value = obj.ty != TypeId::NONE;
        log::trace!(
            "method '{}' at {} (params {}, frame {})",
            obj.name,
            obj.address,
            params,
            frame_size
        );

        let enter = self.open_frame(params, frame_size)?;
        if self.main == Some(sym) {
            self.emit_main_prologue()?;
        }

        self.emit_stmts(method.body)?;
        self.close_frame(enter)?;

        if returns_value {
            // falling off the end of a function
            self.emitter.emit_trap(1);
        } else {
            self.emitter.emit_return();
        }
        Ok(())
    }

    /// Emit `enter` for a frame of `locals` declared slots.
    pub(super) fn open_frame(&mut self, params: u32, locals: u32) -> Result<usize> {
        self.frame_base = locals;
        self.receiver_depth = 0;
        self.receiver_peak = 0;
        self.emitter.emit_enter(params, locals)
    }

    /// Grow the frame opened at `enter` by the receiver slots its body used.
    pub(super) fn close_frame(&mut self, enter: usize) -> Result<()> {
        if self.receiver_peak > 0 {
            self.emitter
                .patch_frame_size(enter, self.frame_base + self.receiver_peak)?;
        }
        Ok(())
    }
}
