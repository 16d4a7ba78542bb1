//! Expressions.

use mjc_ast::{BinaryOp, Expr, ExprKind};
use mjc_core::GenerationError;

use crate::bytecode::OpCode;
use crate::symbols::TypeId;

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    /// Emit an expression, leaving its value on the stack.
    pub(super) fn emit_expr(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr.kind {
            ExprKind::Literal(literal) => self.emitter.emit_const(literal.kind.as_word()),
            ExprKind::Designator(d) => self.emit_load_designator(d)?,
            ExprKind::Call(call) => {
                self.emit_call(call)?;
            }
            ExprKind::NewArray { len, .. } => {
                let array = self.annotations.require_type(expr.id, expr.span)?;
                self.emit_expr(len)?;
                let words = u8::from(self.table.elem(array) != TypeId::CHAR);
                self.emitter.emit_byte(OpCode::NewArray, words);
            }
            ExprKind::NewObject(_) => {
                let class = self.annotations.require_type(expr.id, expr.span)?;
                let ty = self.table.ty(class);
                let Some(vft_pointer) = ty.vft_pointer else {
                    return Err(GenerationError::MissingAttribute {
                        name: ty.name.clone(),
                        detail: "has no dispatch table".to_string(),
                    });
                };
                let size = (ty.field_count + 1) * 4;

                self.emitter.emit_new(size)?;
                self.emitter.emit(OpCode::Dup);
                self.emitter.emit_const(vft_pointer);
                self.emitter.emit_put_field(0)?;
            }
            ExprKind::Neg(operand) => {
                self.emit_expr(operand)?;
                self.emitter.emit(OpCode::Neg);
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit_expr(lhs)?;
                self.emit_expr(rhs)?;
                self.emitter.emit(arithmetic(op));
            }
        }
        Ok(())
    }
}

fn arithmetic(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Rem => OpCode::Rem,
    }
}
