//! Statement AST nodes.

use super::expr::{Call, Condition, Designator, Expr};
use mjc_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Assignment, increment, call or unpack.
    Designator(DesignatorStmt<'ast>),
    /// `if (c) s [else s]`
    If(&'ast IfStmt<'ast>),
    /// `for (init; cond; update) s`
    For(&'ast ForStmt<'ast>),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// `return [e];`
    Return(ReturnStmt<'ast>),
    /// `read(d);`
    Read(ReadStmt<'ast>),
    /// `print(e [, width]);`
    Print(PrintStmt<'ast>),
    /// `{ stmts }`
    Block(Block<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the source location.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Designator(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Break(span) => *span,
            Stmt::Continue(span) => *span,
            Stmt::Return(s) => s.span,
            Stmt::Read(s) => s.span,
            Stmt::Print(s) => s.span,
            Stmt::Block(s) => s.span,
        }
    }
}

/// A statement that starts with a designator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignatorStmt<'ast> {
    /// The statement form.
    pub kind: DesignatorStmtKind<'ast>,
    /// Source location.
    pub span: Span,
}

/// The different designator statement forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesignatorStmtKind<'ast> {
    /// `d = e`
    Assign {
        /// Destination.
        target: &'ast Designator<'ast>,
        /// Value.
        value: &'ast Expr<'ast>,
    },
    /// `d++`
    Increment(&'ast Designator<'ast>),
    /// `d--`
    Decrement(&'ast Designator<'ast>),
    /// `m(args)`; a returned value is discarded.
    Call(&'ast Call<'ast>),
    /// `[a, , b, *d] = s`
    Unpack(&'ast Unpack<'ast>),
}

/// An array unpack statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unpack<'ast> {
    /// Targets in list order; `None` for a blank position.
    pub targets: &'ast [Option<&'ast Designator<'ast>>],
    /// The `*d` array receiving the rest.
    pub rest: &'ast Designator<'ast>,
    /// The source array.
    pub source: &'ast Designator<'ast>,
    /// Source location.
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// The condition.
    pub condition: Condition<'ast>,
    /// Taken when the condition holds.
    pub then_stmt: &'ast Stmt<'ast>,
    /// Taken otherwise.
    pub else_stmt: Option<&'ast Stmt<'ast>>,
    /// Source location.
    pub span: Span,
}

/// A for loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Initialisers, run once.
    pub init: &'ast [DesignatorStmt<'ast>],
    /// The loop condition; `None` loops until `break`.
    pub condition: Option<Condition<'ast>>,
    /// Update statements, run after the body and on `continue`.
    pub update: &'ast [DesignatorStmt<'ast>],
    /// The loop body.
    pub body: &'ast Stmt<'ast>,
    /// Source location.
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// The returned value.
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location.
    pub span: Span,
}

/// A read statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadStmt<'ast> {
    /// Where the value is stored.
    pub target: &'ast Designator<'ast>,
    /// Source location.
    pub span: Span,
}

/// A print statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintStmt<'ast> {
    /// The printed value.
    pub value: &'ast Expr<'ast>,
    /// Explicit field width.
    pub width: Option<i32>,
    /// Source location.
    pub span: Span,
}

/// A statement block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// The statements.
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location.
    pub span: Span,
}
