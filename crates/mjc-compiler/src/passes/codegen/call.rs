//! Method calls.

use mjc_ast::{Call, Designator, DesignatorKind};
use mjc_core::GenerationError;

use crate::bytecode::OpCode;
use crate::symbols::TypeId;

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Emit a call and return the callee's return type.
    ///
    /// Instance methods receive the receiver as argument 0 and are
    /// dispatched through the receiver's table. The receiver is evaluated
    /// once and parked in a frame slot until the arguments are on the stack.
    /// Everything else is a direct relative call.
    pub(super) fn emit_call(&mut self, call: &Call<'_>) -> Result<TypeId> {
        let sym = self.symbol(call.callee)?;
        let obj = self.obj(sym);
        let (ret, is_virtual) = (obj.ty, obj.is_virtual());

        if is_virtual {
            self.emit_receiver(call.callee)?;
            let slot = self.hold_receiver();
            self.emitter.emit(OpCode::Dup);
            self.emitter.emit_store_local(slot)?;
            for arg in call.args {
                self.emit_expr(arg)?;
            }
            self.emitter.emit_load_local(slot)?;
            self.receiver_depth -= 1;
            self.emitter.emit_get_field(0)?;
            let name = self.obj(sym).name.clone();
            self.emitter.emit_invoke_virtual(&name);
        } else {
            for arg in call.args {
                self.emit_expr(arg)?;
            }
            let target = self.code_address(sym)?;
            self.emitter.emit_call(target)?;
        }
        Ok(ret)
    }

    /// The next free receiver slot; nested calls in the arguments take the
    /// ones after it.
    fn hold_receiver(&mut self) -> i32 {
        let slot = self.frame_base + self.receiver_depth;
        self.receiver_depth += 1;
        self.receiver_peak = self.receiver_peak.max(self.receiver_depth);
        slot as i32
    }

    /// Push the object an instance method is called on.
    fn emit_receiver(&mut self, callee: &Designator<'_>) -> Result<()> {
        match callee.kind {
            DesignatorKind::Field { base, .. } => self.emit_load_designator(base),
            DesignatorKind::Ident(_) => self.emitter.emit_load_local(0),
            _ => Err(GenerationError::MissingAttribute {
                name: callee.display_name(),
                detail: "is an instance method without a receiver".to_string(),
            }),
        }
    }
}
