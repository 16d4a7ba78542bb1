//! Statement checking.

use mjc_ast::{Designator, DesignatorStmt, DesignatorStmtKind, Expr, Stmt, Unpack};
use mjc_core::{CompilationError, Span};

use crate::symbols::{StructKind, SymbolId, TypeId};

use super::AnalysisPass;

impl AnalysisPass {
    pub(super) fn visit_stmts(&mut self, stmts: &[Stmt<'_>]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Designator(ds) => self.visit_designator_stmt(ds),
            Stmt::If(if_stmt) => {
                self.visit_condition(&if_stmt.condition);
                self.visit_stmt(if_stmt.then_stmt);
                if let Some(else_stmt) = if_stmt.else_stmt {
                    self.visit_stmt(else_stmt);
                }
            }
            Stmt::For(for_stmt) => {
                for ds in for_stmt.init {
                    self.visit_designator_stmt(ds);
                }
                if let Some(condition) = &for_stmt.condition {
                    self.visit_condition(condition);
                }
                for ds in for_stmt.update {
                    self.visit_designator_stmt(ds);
                }
                self.loop_depth += 1;
                self.visit_stmt(for_stmt.body);
                self.loop_depth -= 1;
            }
            Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.error(CompilationError::BreakOutsideLoop { span: *span });
                }
            }
            Stmt::Continue(span) => {
                if self.loop_depth == 0 {
                    self.error(CompilationError::ContinueOutsideLoop { span: *span });
                }
            }
            Stmt::Return(ret) => self.visit_return(ret.value, ret.span),
            Stmt::Read(read) => {
                let target = self.resolve_target(read.target);
                let ty = self.table.obj(target).ty;
                if !matches!(ty, TypeId::INT | TypeId::CHAR | TypeId::BOOL | TypeId::NONE) {
                    self.mismatch(
                        format!("cannot read a value of type {}", self.type_name(ty)),
                        read.span,
                    );
                }
            }
            Stmt::Print(print) => {
                let ty = self.visit_expr(print.value);
                if !matches!(ty, TypeId::INT | TypeId::CHAR | TypeId::BOOL | TypeId::NONE) {
                    self.mismatch(
                        format!("cannot print a value of type {}", self.type_name(ty)),
                        print.span,
                    );
                }
            }
            Stmt::Block(block) => self.visit_stmts(block.stmts),
        }
    }

    fn visit_return(&mut self, value: Option<&Expr<'_>>, span: Span) {
        let Some(method) = self.method else {
            return;
        };
        let expected = method.return_type;

        match value {
            None if expected != TypeId::NONE => {
                self.error(CompilationError::InvalidReturn {
                    message: format!(
                        "method must return a value of type {}",
                        self.type_name(expected)
                    ),
                    span,
                });
            }
            None => {}
            Some(expr) => {
                let ty = self.visit_expr(expr);
                if let Some(ctx) = self.method.as_mut() {
                    ctx.has_return = true;
                }
                if expected == TypeId::NONE {
                    self.error(CompilationError::InvalidReturn {
                        message: "void method cannot return a value".to_string(),
                        span,
                    });
                } else if !self.table.assignable_to(ty, expected) {
                    self.error(CompilationError::InvalidReturn {
                        message: format!(
                            "cannot return {} from a method returning {}",
                            self.type_name(ty),
                            self.type_name(expected)
                        ),
                        span,
                    });
                }
            }
        }
    }

    pub(super) fn visit_designator_stmt(&mut self, ds: &DesignatorStmt<'_>) {
        match ds.kind {
            DesignatorStmtKind::Assign { target, value } => {
                let target_sym = self.resolve_target(target);
                let value_ty = self.visit_expr(value);
                let target_ty = self.table.obj(target_sym).ty;
                if !self.table.assignable_to(value_ty, target_ty) {
                    self.mismatch(
                        format!(
                            "cannot assign {} to {}",
                            self.type_name(value_ty),
                            self.type_name(target_ty)
                        ),
                        ds.span,
                    );
                }
            }
            DesignatorStmtKind::Increment(target) | DesignatorStmtKind::Decrement(target) => {
                let sym = self.resolve_target(target);
                let ty = self.table.obj(sym).ty;
                if ty != TypeId::INT && ty != TypeId::NONE {
                    self.mismatch(
                        format!("'{}' must be of type int", target.display_name()),
                        ds.span,
                    );
                }
            }
            DesignatorStmtKind::Call(call) => {
                self.visit_call(call);
            }
            DesignatorStmtKind::Unpack(unpack) => self.visit_unpack(unpack),
        }
    }

    /// Resolve the destination of a store.
    fn resolve_target(&mut self, target: &Designator<'_>) -> SymbolId {
        let sym = self.resolve_designator(target);
        if !sym.is_absent() && !self.table.obj(sym).is_assignable() {
            self.error(CompilationError::NotAssignable {
                name: target.display_name(),
                span: target.span,
            });
            return SymbolId::ABSENT;
        }
        sym
    }

    /// `[a, , b, *rest] = source`: both arrays of one element type, named
    /// targets assignable from that element type. Blanks are skipped.
    fn visit_unpack(&mut self, unpack: &Unpack<'_>) {
        let rest = self.resolve_target(unpack.rest);
        let source = self.resolve_designator(unpack.source);
        let rest_ty = self.table.obj(rest).ty;
        let source_ty = self.table.obj(source).ty;

        for (ty, d) in [(rest_ty, unpack.rest), (source_ty, unpack.source)] {
            if ty != TypeId::NONE && self.table.kind(ty) != StructKind::Array {
                self.mismatch(format!("'{}' is not an array", d.display_name()), d.span);
            }
        }
        let elem = self.table.elem(source_ty);
        if self.table.kind(source_ty) == StructKind::Array
            && self.table.kind(rest_ty) == StructKind::Array
            && !self.table.assignable_to(source_ty, rest_ty)
        {
            self.mismatch(
                format!(
                    "cannot unpack {} into {}",
                    self.type_name(source_ty),
                    self.type_name(rest_ty)
                ),
                unpack.span,
            );
        }

        for target in unpack.targets.iter().flatten() {
            let sym = self.resolve_target(target);
            let ty = self.table.obj(sym).ty;
            if elem != TypeId::NONE && !self.table.assignable_to(elem, ty) {
                self.mismatch(
                    format!(
                        "cannot assign {} to {}",
                        self.type_name(elem),
                        self.type_name(ty)
                    ),
                    target.span,
                );
            }
        }
    }
}
