//! Classes: dispatch tables and static initializers.
//!
//! Each class reserves `vft_size` global words right after the global
//! variables (and after the tables of earlier classes). The table itself is
//! written by `main`'s prologue, once every method address is known:
//!
//! ```text
//! per method:  name[0] .. name[n-1]  -1  address
//! end:         -2
//! ```

use mjc_ast::ClassDecl;

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Reserve the class's dispatch table, then emit its static initializers
    /// and methods.
    pub(super) fn emit_class(&mut self, class: &ClassDecl<'_>) -> Result<()> {
        let ty = self.annotations.require_type(class.id, class.span)?;

        let vft_pointer = self.data_size as i32;
        self.data_size += self.table.vft_size(ty);
        self.table.ty_mut(ty).vft_pointer = Some(vft_pointer);

        log::trace!(
            "class '{}': dispatch table at data word {}",
            self.table.ty(ty).name,
            vft_pointer
        );

        for init in class.static_inits {
            let sym = self.annotations.require_symbol(init.id, init.span)?;
            self.emitter.set_line(init.span.line);
            self.table.obj_mut(sym).address = self.emitter.current_offset() as i32;

            let frame_size = self.obj(sym).locals.len() as u32;
            let enter = self.open_frame(0, frame_size)?;
            self.emit_stmts(init.body)?;
            self.close_frame(enter)?;
            self.emitter.emit_return();
        }

        for method in class.methods {
            self.emit_method(method)?;
        }
        Ok(())
    }

    /// Write every dispatch table and run every static initializer.
    ///
    /// Emitted at the start of `main`, after its `enter`.
    pub(super) fn emit_main_prologue(&mut self) -> Result<()> {
        for ty in self.classes.clone() {
            let Some(mut slot) = self.table.ty(ty).vft_pointer else {
                continue;
            };

            let mut words = Vec::new();
            for method in self.table.methods_of(ty).collect::<Vec<_>>() {
                words.extend(self.obj(method).name.chars().map(|c| c as i32));
                words.push(-1);
                words.push(self.code_address(method)? as i32);
            }
            words.push(-2);

            for word in words {
                self.emitter.emit_const(word);
                self.emitter.emit_put_static(slot)?;
                slot += 1;
            }
        }

        for init in self.static_inits.clone() {
            let target = self.code_address(init)?;
            self.emitter.emit_call(target)?;
        }
        Ok(())
    }
}
