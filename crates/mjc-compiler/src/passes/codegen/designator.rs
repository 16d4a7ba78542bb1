//! Loads and stores through designators.
//!
//! A designator is emitted in two halves: the prefix pushes whatever the
//! access needs below the value (object reference, or array and index), and
//! the load or store instruction completes it.

use mjc_ast::{Designator, DesignatorKind};
use mjc_core::GenerationError;

use crate::bytecode::OpCode;
use crate::symbols::{ObjKind, SymbolId, TypeId};

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Push the operands of an access to `d` and return its symbol.
    pub(super) fn emit_designator_prefix(&mut self, d: &Designator<'_>) -> Result<SymbolId> {
        let sym = self.symbol(d)?;
        match d.kind {
            DesignatorKind::Ident(_) => {
                // a bare field name reads through `this`
                if self.obj(sym).kind == ObjKind::Field {
                    self.emitter.emit_load_local(0)?;
                }
            }
            DesignatorKind::Qualified { .. } => {}
            DesignatorKind::Index { base, index } => {
                self.emit_load_designator(base)?;
                self.emit_expr(index)?;
            }
            DesignatorKind::Field { base, .. } => {
                let owner = self.symbol(base)?;
                if self.obj(owner).kind != ObjKind::Type {
                    self.emit_load_designator(base)?;
                }
            }
        }
        Ok(sym)
    }

    /// Push the value of `d`.
    pub(super) fn emit_load_designator(&mut self, d: &Designator<'_>) -> Result<()> {
        let sym = self.emit_designator_prefix(d)?;
        self.emit_load(sym)
    }

    /// Complete a load whose prefix is already on the stack.
    pub(super) fn emit_load(&mut self, sym: SymbolId) -> Result<()> {
        let obj = self.obj(sym);
        let (kind, address, ty, global) = (obj.kind, obj.address, obj.ty, obj.is_global());
        match kind {
            ObjKind::Const => self.emitter.emit_const(address),
            ObjKind::Var if global => self.emitter.emit_get_static(address)?,
            ObjKind::Var => self.emitter.emit_load_local(address)?,
            ObjKind::Field => self.emitter.emit_get_field(address)?,
            ObjKind::Elem if ty == TypeId::CHAR => self.emitter.emit(OpCode::BALoad),
            ObjKind::Elem => self.emitter.emit(OpCode::ALoad),
            _ => return Err(self.not_storage(sym, "cannot be loaded")),
        }
        Ok(())
    }

    /// Complete a store whose prefix and value are already on the stack.
    pub(super) fn emit_store(&mut self, sym: SymbolId) -> Result<()> {
        let obj = self.obj(sym);
        let (kind, address, ty, global) = (obj.kind, obj.address, obj.ty, obj.is_global());
        match kind {
            ObjKind::Var if global => self.emitter.emit_put_static(address)?,
            ObjKind::Var => self.emitter.emit_store_local(address)?,
            ObjKind::Field => self.emitter.emit_put_field(address)?,
            ObjKind::Elem if ty == TypeId::CHAR => self.emitter.emit(OpCode::BAStore),
            ObjKind::Elem => self.emitter.emit(OpCode::AStore),
            _ => return Err(self.not_storage(sym, "cannot be stored into")),
        }
        Ok(())
    }

    fn not_storage(&self, sym: SymbolId, detail: &str) -> GenerationError {
        let obj = self.obj(sym);
        GenerationError::MissingAttribute {
            name: obj.name.clone(),
            detail: format!("is a {} and {detail}", obj.kind.describe()),
        }
    }
}
