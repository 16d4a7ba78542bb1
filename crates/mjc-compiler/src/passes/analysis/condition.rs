//! Conditions of `if` and `for`.

use mjc_ast::{CondFact, Condition};
use mjc_core::CompilationError;

use crate::symbols::TypeId;

use super::AnalysisPass;

impl AnalysisPass {
    pub(super) fn visit_condition(&mut self, condition: &Condition<'_>) {
        for term in condition.terms {
            for fact in term.factors {
                self.visit_cond_fact(fact);
            }
        }
    }

    /// A lone expression must be bool. Relations need compatible operands,
    /// and references only compare with `==` and `!=`.
    fn visit_cond_fact(&mut self, fact: &CondFact<'_>) {
        match *fact {
            CondFact::Expr(expr) => {
                let ty = self.visit_expr(expr);
                if ty != TypeId::BOOL && ty != TypeId::NONE {
                    self.error(CompilationError::NonBoolCondition { span: expr.span });
                }
            }
            CondFact::Relation { lhs, op, rhs, span } => {
                let lhs_ty = self.visit_expr(lhs);
                let rhs_ty = self.visit_expr(rhs);
                if lhs_ty == TypeId::NONE || rhs_ty == TypeId::NONE {
                    return;
                }
                if !self.table.compatible(lhs_ty, rhs_ty) {
                    self.mismatch(
                        format!(
                            "cannot compare {} with {} using '{}'",
                            self.type_name(lhs_ty),
                            self.type_name(rhs_ty),
                            op
                        ),
                        span,
                    );
                } else if !op.is_equality()
                    && (self.table.is_reference(lhs_ty) || self.table.is_reference(rhs_ty))
                {
                    self.error(CompilationError::ReferenceComparison { span });
                }
            }
        }
    }
}
