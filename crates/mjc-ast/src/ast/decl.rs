//! Declaration AST nodes: constants, variables, classes and methods.

use super::expr::Literal;
use super::stmt::Stmt;
use super::types::TypeRef;
use super::{Ident, NodeId};
use mjc_core::Span;

/// A program- or namespace-level declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    /// `const int a = 1, b = 2;`
    Const(ConstDecl<'ast>),
    /// `int x, arr[];`
    Var(VarDecl<'ast>),
    /// `class C extends P { ... }`
    Class(&'ast ClassDecl<'ast>),
}

/// A constant declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstDecl<'ast> {
    /// Declared type of every constant in the list.
    pub ty: TypeRef<'ast>,
    /// The constants.
    pub items: &'ast [ConstItem<'ast>],
    /// Source location.
    pub span: Span,
}

/// One `name = literal` entry of a constant declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstItem<'ast> {
    /// Constant name.
    pub name: Ident<'ast>,
    /// Constant value.
    pub value: Literal,
    /// Source location.
    pub span: Span,
}

/// A variable declaration list; also used for fields and locals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    /// Declared element type.
    pub ty: TypeRef<'ast>,
    /// The declared names.
    pub items: &'ast [VarItem<'ast>],
    /// Source location.
    pub span: Span,
}

/// One declared name, optionally an array (`name[]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarItem<'ast> {
    /// Variable name.
    pub name: Ident<'ast>,
    /// Whether `[]` followed the name.
    pub is_array: bool,
    /// Source location.
    pub span: Span,
}

/// A class declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    /// Class name.
    pub name: Ident<'ast>,
    /// Parent class, if any.
    pub extends: Option<TypeRef<'ast>>,
    /// `static` variables, stored as globals named `Class.name`.
    pub static_vars: &'ast [VarDecl<'ast>],
    /// `static { ... }` initializer blocks, run before `main`.
    pub static_inits: &'ast [StaticInit<'ast>],
    /// Instance fields.
    pub fields: &'ast [VarDecl<'ast>],
    /// Methods, static and instance.
    pub methods: &'ast [MethodDecl<'ast>],
    /// Annotation key.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// A `static { ... }` block inside a class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticInit<'ast> {
    /// The statements of the block.
    pub body: &'ast [Stmt<'ast>],
    /// Annotation key.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// A method declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    /// Whether the method is `static` (only meaningful inside a class).
    pub is_static: bool,
    /// Return type, `None` for `void`.
    pub return_type: Option<TypeRef<'ast>>,
    /// Whether the return type is an array (`int[] f()`).
    pub returns_array: bool,
    /// Method name.
    pub name: Ident<'ast>,
    /// Formal parameters, excluding the implicit receiver.
    pub params: &'ast [Param<'ast>],
    /// Local variable declarations.
    pub locals: &'ast [VarDecl<'ast>],
    /// Statements of the body.
    pub body: &'ast [Stmt<'ast>],
    /// Annotation key.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter element type.
    pub ty: TypeRef<'ast>,
    /// Parameter name.
    pub name: Ident<'ast>,
    /// Whether the parameter is an array.
    pub is_array: bool,
    /// Source location.
    pub span: Span,
}
