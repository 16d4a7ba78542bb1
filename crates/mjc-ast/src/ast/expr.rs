//! Expression, designator and condition AST nodes.

use super::ops::{BinaryOp, RelOp};
use super::types::TypeRef;
use super::{Ident, NodeId};
use mjc_core::Span;

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    /// The literal's value.
    pub kind: LiteralKind,
    /// Source location.
    pub span: Span,
}

/// The value of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Integer literal.
    Int(i32),
    /// Character literal.
    Char(u8),
    /// `true` / `false`.
    Bool(bool),
}

impl LiteralKind {
    /// The value as a machine word.
    pub fn as_word(&self) -> i32 {
        match *self {
            LiteralKind::Int(v) => v,
            LiteralKind::Char(c) => c as i32,
            LiteralKind::Bool(b) => b as i32,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expr<'ast> {
    /// The expression.
    pub kind: ExprKind<'ast>,
    /// Annotation key for the expression's type.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// The different expression forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprKind<'ast> {
    /// A literal constant.
    Literal(Literal),
    /// Value of a designator.
    Designator(&'ast Designator<'ast>),
    /// Value returned by a call.
    Call(&'ast Call<'ast>),
    /// `new T[len]`
    NewArray {
        /// Element type.
        element: TypeRef<'ast>,
        /// Array length.
        len: &'ast Expr<'ast>,
    },
    /// `new C`
    NewObject(TypeRef<'ast>),
    /// `-e`
    Neg(&'ast Expr<'ast>),
    /// `lhs op rhs`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: &'ast Expr<'ast>,
        /// Right operand.
        rhs: &'ast Expr<'ast>,
    },
}

/// A method call: `callee(args)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Call<'ast> {
    /// The called method.
    pub callee: &'ast Designator<'ast>,
    /// Actual arguments, excluding any implicit receiver.
    pub args: &'ast [&'ast Expr<'ast>],
    /// Source location.
    pub span: Span,
}

/// A designator: something that names a storage location or a method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Designator<'ast> {
    /// The designator form.
    pub kind: DesignatorKind<'ast>,
    /// Annotation key for the resolved symbol.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// The different designator forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesignatorKind<'ast> {
    /// `x`
    Ident(Ident<'ast>),
    /// `ns::x`
    Qualified {
        /// The namespace.
        namespace: Ident<'ast>,
        /// The member name.
        name: Ident<'ast>,
    },
    /// `a[i]`
    Index {
        /// The array.
        base: &'ast Designator<'ast>,
        /// The index.
        index: &'ast Expr<'ast>,
    },
    /// `o.f`
    Field {
        /// The object (or class, for static members).
        base: &'ast Designator<'ast>,
        /// The member name.
        name: Ident<'ast>,
    },
}

impl<'ast> Designator<'ast> {
    /// A printable name for diagnostics.
    pub fn display_name(&self) -> String {
        match self.kind {
            DesignatorKind::Ident(id) => id.name.to_string(),
            DesignatorKind::Qualified { namespace, name } => {
                format!("{}::{}", namespace.name, name.name)
            }
            DesignatorKind::Index { base, .. } => format!("{}[]", base.display_name()),
            DesignatorKind::Field { base, name } => {
                format!("{}.{}", base.display_name(), name.name)
            }
        }
    }
}

/// A condition: OR of terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition<'ast> {
    /// The `||`-separated terms.
    pub terms: &'ast [CondTerm<'ast>],
    /// Source location.
    pub span: Span,
}

/// A condition term: AND of factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondTerm<'ast> {
    /// The `&&`-separated factors.
    pub factors: &'ast [CondFact<'ast>],
    /// Source location.
    pub span: Span,
}

/// A condition factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CondFact<'ast> {
    /// A lone boolean expression.
    Expr(&'ast Expr<'ast>),
    /// A comparison.
    Relation {
        /// Left operand.
        lhs: &'ast Expr<'ast>,
        /// The operator.
        op: RelOp,
        /// Right operand.
        rhs: &'ast Expr<'ast>,
        /// Source location.
        span: Span,
    },
}

impl<'ast> CondFact<'ast> {
    /// Get the source location.
    pub fn span(&self) -> Span {
        match self {
            CondFact::Expr(e) => e.span,
            CondFact::Relation { span, .. } => *span,
        }
    }
}
