//! Expression typing.

use mjc_ast::{Designator, Expr, ExprKind, LiteralKind};

use crate::symbols::{ObjKind, StructKind, TypeId};

use super::AnalysisPass;

/// Type of a literal.
pub(super) fn literal_type(kind: LiteralKind) -> TypeId {
    match kind {
        LiteralKind::Int(_) => TypeId::INT,
        LiteralKind::Char(_) => TypeId::CHAR,
        LiteralKind::Bool(_) => TypeId::BOOL,
    }
}

impl AnalysisPass {
    /// Type an expression and record the result.
    pub(super) fn visit_expr(&mut self, expr: &Expr<'_>) -> TypeId {
        let ty = match expr.kind {
            ExprKind::Literal(literal) => literal_type(literal.kind),
            ExprKind::Designator(d) => self.visit_value(d),
            ExprKind::Call(call) => {
                let (method, ret) = self.visit_call(call);
                if !method.is_absent() && ret == TypeId::NONE {
                    self.mismatch(
                        format!(
                            "void method '{}' used in an expression",
                            call.callee.display_name()
                        ),
                        call.span,
                    );
                }
                ret
            }
            ExprKind::NewArray { element, len } => {
                let elem = self.resolve_type(&element, false);
                let len_ty = self.visit_expr(len);
                if len_ty != TypeId::INT && len_ty != TypeId::NONE {
                    self.mismatch("array length must be of type int", len.span);
                }
                if elem == TypeId::NONE {
                    TypeId::NONE
                } else {
                    self.table.array_of(elem)
                }
            }
            ExprKind::NewObject(tref) => {
                let ty = self.resolve_type(&tref, false);
                if ty != TypeId::NONE
                    && (self.table.kind(ty) != StructKind::Class || ty == TypeId::NULL)
                {
                    self.mismatch(
                        format!("cannot instantiate '{}': not a class", self.type_name(ty)),
                        tref.span,
                    );
                    TypeId::NONE
                } else {
                    ty
                }
            }
            ExprKind::Neg(operand) => match self.visit_expr(operand) {
                TypeId::INT => TypeId::INT,
                TypeId::NONE => TypeId::NONE,
                _ => {
                    self.mismatch("negation requires an int operand", expr.span);
                    TypeId::NONE
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_ty = self.visit_expr(lhs);
                let rhs_ty = self.visit_expr(rhs);
                match (lhs_ty, rhs_ty) {
                    (TypeId::INT, TypeId::INT) => TypeId::INT,
                    (TypeId::NONE, _) | (_, TypeId::NONE) => TypeId::NONE,
                    _ => {
                        self.mismatch(
                            format!("operator '{}' requires int operands", op.as_str()),
                            expr.span,
                        );
                        TypeId::NONE
                    }
                }
            }
        };

        self.annotations.set_type(expr.id, ty);
        ty
    }

    /// A designator read as a value: anything but a type, method or program.
    fn visit_value(&mut self, d: &Designator<'_>) -> TypeId {
        let sym = self.resolve_designator(d);
        let (kind, ty) = {
            let obj = self.table.obj(sym);
            (obj.kind, obj.ty)
        };
        match kind {
            ObjKind::Type | ObjKind::Method | ObjKind::Program => {
                self.mismatch(
                    format!("{} '{}' used as a value", kind.describe(), d.display_name()),
                    d.span,
                );
                TypeId::NONE
            }
            _ => ty,
        }
    }
}
