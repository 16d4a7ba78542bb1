//! Short-circuit conditions.
//!
//! Every factor jumps to the construct's false list when it does not hold.
//! Between two terms the body jump is emitted and the false list of the
//! finished term is patched to the start of the next one; the last term's
//! false list stays open for the caller.

use mjc_ast::{CondFact, Condition, RelOp};

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    pub(super) fn emit_condition(&mut self, condition: &Condition<'_>) -> Result<()> {
        for (i, term) in condition.terms.iter().enumerate() {
            if i > 0 {
                self.emitter.emit_body_jump()?;
                self.emitter.patch_false_list()?;
            }
            for fact in term.factors {
                self.emit_fact(fact)?;
            }
        }
        Ok(())
    }

    fn emit_fact(&mut self, fact: &CondFact<'_>) -> Result<()> {
        match *fact {
            CondFact::Expr(expr) => {
                self.emit_expr(expr)?;
                self.emitter.emit_const(0);
                self.emitter.emit_false_jump(RelOp::Ne)
            }
            CondFact::Relation { lhs, op, rhs, .. } => {
                self.emit_expr(lhs)?;
                self.emit_expr(rhs)?;
                self.emitter.emit_false_jump(op)
            }
        }
    }
}
