//! Method calls.

use mjc_ast::{Call, Designator, DesignatorKind};
use mjc_core::CompilationError;

use crate::symbols::{ObjKind, SymbolId, TypeId};

use super::AnalysisPass;

impl AnalysisPass {
    /// Check a call. Returns the method symbol ([`SymbolId::ABSENT`] when
    /// the callee is not a method) and its return type.
    ///
    /// The receiver of an instance method counts as argument 0.
    pub(super) fn visit_call(&mut self, call: &Call<'_>) -> (SymbolId, TypeId) {
        let callee = self.resolve_designator(call.callee);
        let arg_types: Vec<TypeId> = call.args.iter().map(|arg| self.visit_expr(arg)).collect();
        if callee.is_absent() {
            return (SymbolId::ABSENT, TypeId::NONE);
        }

        let obj = self.table.obj(callee);
        if obj.kind != ObjKind::Method {
            self.error(CompilationError::NotAMethod {
                name: call.callee.display_name(),
                span: call.span,
            });
            return (SymbolId::ABSENT, TypeId::NONE);
        }

        let ret = obj.ty;
        let expected = obj.param_count as usize;
        let is_virtual = obj.is_virtual();
        let formals: Vec<TypeId> = obj
            .locals
            .iter()
            .take(expected)
            .map(|&p| self.table.obj(p).ty)
            .collect();

        let mut actuals = Vec::with_capacity(arg_types.len() + 1);
        if is_virtual {
            actuals.push(self.receiver_type(call.callee));
        }
        actuals.extend(arg_types);

        if actuals.len() != expected {
            self.error(CompilationError::ArgumentCountMismatch {
                name: call.callee.display_name(),
                expected,
                got: actuals.len(),
                span: call.span,
            });
            return (callee, ret);
        }

        for (position, (&actual, &formal)) in actuals.iter().zip(&formals).enumerate() {
            if !self.table.assignable_to(actual, formal) {
                self.error(CompilationError::ArgumentTypeMismatch {
                    name: call.callee.display_name(),
                    position,
                    span: call.span,
                });
            }
        }

        (callee, ret)
    }

    /// Type of the object an instance method is called on: the base of
    /// `o.m(...)`, or the current class for a bare `m(...)`.
    fn receiver_type(&self, callee: &Designator<'_>) -> TypeId {
        match callee.kind {
            DesignatorKind::Field { base, .. } => self
                .annotations
                .symbol(base.id)
                .map(|s| self.table.obj(s).ty)
                .unwrap_or(TypeId::NONE),
            _ => self.class.as_ref().map(|c| c.ty).unwrap_or(TypeId::NONE),
        }
    }
}
