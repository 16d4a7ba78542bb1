//! Arena-backed construction of AST nodes.
//!
//! The parser (and tests) build trees through [`AstBuilder`], which owns the
//! `NodeId` counter so ids stay unique within one tree. Every node gets the
//! builder's current line; call [`AstBuilder::at`] to move it.

use std::cell::Cell;

use bumpalo::Bump;
use mjc_core::Span;

use crate::ast::*;

/// Builds AST nodes into a [`Bump`] arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder allocating into `arena`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
            line: Cell::new(1),
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Set the source line for nodes built from now on.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    fn span(&self) -> Span {
        Span::line(self.line.get())
    }

    /// Copy a slice into the arena.
    pub fn slice<T: Copy>(&self, items: &[T]) -> &'ast [T] {
        self.arena.alloc_slice_copy(items)
    }

    // ------------------------------------------------------------------
    // Names and types
    // ------------------------------------------------------------------

    /// An identifier.
    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    /// A type reference `name`.
    pub fn ty(&self, name: &str) -> TypeRef<'ast> {
        TypeRef {
            namespace: None,
            name: self.ident(name),
            span: self.span(),
        }
    }

    /// A type reference `ns::name`.
    pub fn ty_in(&self, ns: &str, name: &str) -> TypeRef<'ast> {
        TypeRef {
            namespace: Some(self.ident(ns)),
            name: self.ident(name),
            span: self.span(),
        }
    }

    // ------------------------------------------------------------------
    // Designators
    // ------------------------------------------------------------------

    fn designator(&self, kind: DesignatorKind<'ast>) -> &'ast Designator<'ast> {
        self.arena.alloc(Designator {
            kind,
            id: self.id(),
            span: self.span(),
        })
    }

    /// `name`
    pub fn var(&self, name: &str) -> &'ast Designator<'ast> {
        self.designator(DesignatorKind::Ident(self.ident(name)))
    }

    /// `ns::name`
    pub fn qualified(&self, ns: &str, name: &str) -> &'ast Designator<'ast> {
        self.designator(DesignatorKind::Qualified {
            namespace: self.ident(ns),
            name: self.ident(name),
        })
    }

    /// `base[index]`
    pub fn index(
        &self,
        base: &'ast Designator<'ast>,
        index: &'ast Expr<'ast>,
    ) -> &'ast Designator<'ast> {
        self.designator(DesignatorKind::Index { base, index })
    }

    /// `base.name`
    pub fn field(&self, base: &'ast Designator<'ast>, name: &str) -> &'ast Designator<'ast> {
        self.designator(DesignatorKind::Field {
            base,
            name: self.ident(name),
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&self, kind: ExprKind<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr {
            kind,
            id: self.id(),
            span: self.span(),
        })
    }

    /// A literal value, for constant declarations.
    pub fn literal(&self, kind: LiteralKind) -> Literal {
        Literal {
            kind,
            span: self.span(),
        }
    }

    /// Integer literal expression.
    pub fn int(&self, value: i32) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Literal(self.literal(LiteralKind::Int(value))))
    }

    /// Character literal expression.
    pub fn chr(&self, value: u8) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Literal(self.literal(LiteralKind::Char(value))))
    }

    /// Boolean literal expression.
    pub fn bool(&self, value: bool) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Literal(self.literal(LiteralKind::Bool(value))))
    }

    /// The value of a designator.
    pub fn load(&self, designator: &'ast Designator<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Designator(designator))
    }

    /// The value of variable `name`.
    pub fn name(&self, name: &str) -> &'ast Expr<'ast> {
        let designator = self.var(name);
        self.load(designator)
    }

    /// A call node.
    pub fn call(
        &self,
        callee: &'ast Designator<'ast>,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Call<'ast> {
        self.arena.alloc(Call {
            callee,
            args: self.slice(args),
            span: self.span(),
        })
    }

    /// A call used as an expression.
    pub fn call_expr(
        &self,
        callee: &'ast Designator<'ast>,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        let call = self.call(callee, args);
        self.expr(ExprKind::Call(call))
    }

    /// `new element[len]`
    pub fn new_array(&self, element: TypeRef<'ast>, len: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::NewArray { element, len })
    }

    /// `new class`
    pub fn new_object(&self, class: TypeRef<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::NewObject(class))
    }

    /// `-operand`
    pub fn neg(&self, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Neg(operand))
    }

    /// `lhs op rhs`
    pub fn binary(
        &self,
        op: BinaryOp,
        lhs: &'ast Expr<'ast>,
        rhs: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    /// A lone boolean factor.
    pub fn fact(&self, expr: &'ast Expr<'ast>) -> CondFact<'ast> {
        CondFact::Expr(expr)
    }

    /// `lhs op rhs` as a factor.
    pub fn rel(&self, lhs: &'ast Expr<'ast>, op: RelOp, rhs: &'ast Expr<'ast>) -> CondFact<'ast> {
        CondFact::Relation {
            lhs,
            op,
            rhs,
            span: self.span(),
        }
    }

    /// AND of factors.
    pub fn term(&self, factors: &[CondFact<'ast>]) -> CondTerm<'ast> {
        CondTerm {
            factors: self.slice(factors),
            span: self.span(),
        }
    }

    /// OR of terms.
    pub fn cond(&self, terms: &[CondTerm<'ast>]) -> Condition<'ast> {
        Condition {
            terms: self.slice(terms),
            span: self.span(),
        }
    }

    /// A condition with a single factor.
    pub fn cond1(&self, fact: CondFact<'ast>) -> Condition<'ast> {
        let term = self.term(&[fact]);
        self.cond(&[term])
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn designator_stmt(&self, kind: DesignatorStmtKind<'ast>) -> DesignatorStmt<'ast> {
        DesignatorStmt {
            kind,
            span: self.span(),
        }
    }

    /// `target = value` as a designator statement.
    pub fn assign_ds(
        &self,
        target: &'ast Designator<'ast>,
        value: &'ast Expr<'ast>,
    ) -> DesignatorStmt<'ast> {
        self.designator_stmt(DesignatorStmtKind::Assign { target, value })
    }

    /// `target++` as a designator statement.
    pub fn inc_ds(&self, target: &'ast Designator<'ast>) -> DesignatorStmt<'ast> {
        self.designator_stmt(DesignatorStmtKind::Increment(target))
    }

    /// `target--` as a designator statement.
    pub fn dec_ds(&self, target: &'ast Designator<'ast>) -> DesignatorStmt<'ast> {
        self.designator_stmt(DesignatorStmtKind::Decrement(target))
    }

    /// `target = value;`
    pub fn assign(&self, target: &'ast Designator<'ast>, value: &'ast Expr<'ast>) -> Stmt<'ast> {
        Stmt::Designator(self.assign_ds(target, value))
    }

    /// `target++;`
    pub fn inc(&self, target: &'ast Designator<'ast>) -> Stmt<'ast> {
        Stmt::Designator(self.inc_ds(target))
    }

    /// `target--;`
    pub fn dec(&self, target: &'ast Designator<'ast>) -> Stmt<'ast> {
        Stmt::Designator(self.dec_ds(target))
    }

    /// `callee(args);`
    pub fn call_stmt(
        &self,
        callee: &'ast Designator<'ast>,
        args: &[&'ast Expr<'ast>],
    ) -> Stmt<'ast> {
        let call = self.call(callee, args);
        Stmt::Designator(self.designator_stmt(DesignatorStmtKind::Call(call)))
    }

    /// `[targets, *rest] = source;`
    pub fn unpack(
        &self,
        targets: &[Option<&'ast Designator<'ast>>],
        rest: &'ast Designator<'ast>,
        source: &'ast Designator<'ast>,
    ) -> Stmt<'ast> {
        let unpack = self.arena.alloc(Unpack {
            targets: self.slice(targets),
            rest,
            source,
            span: self.span(),
        });
        Stmt::Designator(self.designator_stmt(DesignatorStmtKind::Unpack(unpack)))
    }

    /// `if (condition) then_stmt [else else_stmt]`
    pub fn if_stmt(
        &self,
        condition: Condition<'ast>,
        then_stmt: Stmt<'ast>,
        else_stmt: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let then_stmt = &*self.arena.alloc(then_stmt);
        let else_stmt = else_stmt.map(|s| &*self.arena.alloc(s));
        Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: self.span(),
        }))
    }

    /// `for (init; condition; update) body`
    pub fn for_stmt(
        &self,
        init: &[DesignatorStmt<'ast>],
        condition: Option<Condition<'ast>>,
        update: &[DesignatorStmt<'ast>],
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        let body = &*self.arena.alloc(body);
        Stmt::For(self.arena.alloc(ForStmt {
            init: self.slice(init),
            condition,
            update: self.slice(update),
            body,
            span: self.span(),
        }))
    }

    /// `break;`
    pub fn break_stmt(&self) -> Stmt<'ast> {
        Stmt::Break(self.span())
    }

    /// `continue;`
    pub fn continue_stmt(&self) -> Stmt<'ast> {
        Stmt::Continue(self.span())
    }

    /// `return [value];`
    pub fn ret(&self, value: Option<&'ast Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span(),
        })
    }

    /// `read(target);`
    pub fn read(&self, target: &'ast Designator<'ast>) -> Stmt<'ast> {
        Stmt::Read(ReadStmt {
            target,
            span: self.span(),
        })
    }

    /// `print(value [, width]);`
    pub fn print(&self, value: &'ast Expr<'ast>, width: Option<i32>) -> Stmt<'ast> {
        Stmt::Print(PrintStmt {
            value,
            width,
            span: self.span(),
        })
    }

    /// `{ stmts }`
    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(Block {
            stmts: self.slice(stmts),
            span: self.span(),
        })
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `ty names;` where each name is `(name, is_array)`.
    pub fn var_decl(&self, ty: TypeRef<'ast>, names: &[(&str, bool)]) -> VarDecl<'ast> {
        let items: Vec<VarItem<'ast>> = names
            .iter()
            .map(|&(name, is_array)| VarItem {
                name: self.ident(name),
                is_array,
                span: self.span(),
            })
            .collect();
        VarDecl {
            ty,
            items: self.slice(&items),
            span: self.span(),
        }
    }

    /// `const ty name = value, ...;`
    pub fn const_decl(&self, ty: TypeRef<'ast>, items: &[(&str, LiteralKind)]) -> ConstDecl<'ast> {
        let items: Vec<ConstItem<'ast>> = items
            .iter()
            .map(|&(name, value)| ConstItem {
                name: self.ident(name),
                value: self.literal(value),
                span: self.span(),
            })
            .collect();
        ConstDecl {
            ty,
            items: self.slice(&items),
            span: self.span(),
        }
    }

    /// A scalar parameter.
    pub fn param(&self, ty: TypeRef<'ast>, name: &str) -> Param<'ast> {
        Param {
            ty,
            name: self.ident(name),
            is_array: false,
            span: self.span(),
        }
    }

    /// An array parameter.
    pub fn array_param(&self, ty: TypeRef<'ast>, name: &str) -> Param<'ast> {
        Param {
            is_array: true,
            ..self.param(ty, name)
        }
    }

    /// A method with a scalar (or `void`) return type.
    pub fn method(
        &self,
        return_type: Option<TypeRef<'ast>>,
        name: &str,
        params: &[Param<'ast>],
        locals: &[VarDecl<'ast>],
        body: &[Stmt<'ast>],
    ) -> MethodDecl<'ast> {
        MethodDecl {
            is_static: false,
            return_type,
            returns_array: false,
            name: self.ident(name),
            params: self.slice(params),
            locals: self.slice(locals),
            body: self.slice(body),
            id: self.id(),
            span: self.span(),
        }
    }

    /// `static` variant of [`AstBuilder::method`].
    pub fn static_method(
        &self,
        return_type: Option<TypeRef<'ast>>,
        name: &str,
        params: &[Param<'ast>],
        locals: &[VarDecl<'ast>],
        body: &[Stmt<'ast>],
    ) -> MethodDecl<'ast> {
        MethodDecl {
            is_static: true,
            ..self.method(return_type, name, params, locals, body)
        }
    }

    /// `static { body }`
    pub fn static_init(&self, body: &[Stmt<'ast>]) -> StaticInit<'ast> {
        StaticInit {
            body: self.slice(body),
            id: self.id(),
            span: self.span(),
        }
    }

    /// A class with only fields and methods.
    pub fn class(
        &self,
        name: &str,
        extends: Option<TypeRef<'ast>>,
        fields: &[VarDecl<'ast>],
        methods: &[MethodDecl<'ast>],
    ) -> Decl<'ast> {
        self.class_with_statics(name, extends, &[], &[], fields, methods)
    }

    /// A class with static members.
    pub fn class_with_statics(
        &self,
        name: &str,
        extends: Option<TypeRef<'ast>>,
        static_vars: &[VarDecl<'ast>],
        static_inits: &[StaticInit<'ast>],
        fields: &[VarDecl<'ast>],
        methods: &[MethodDecl<'ast>],
    ) -> Decl<'ast> {
        Decl::Class(self.arena.alloc(ClassDecl {
            name: self.ident(name),
            extends,
            static_vars: self.slice(static_vars),
            static_inits: self.slice(static_inits),
            fields: self.slice(fields),
            methods: self.slice(methods),
            id: self.id(),
            span: self.span(),
        }))
    }

    /// `namespace name { decls { methods } }`
    pub fn namespace(
        &self,
        name: &str,
        decls: &[Decl<'ast>],
        methods: &[MethodDecl<'ast>],
    ) -> Namespace<'ast> {
        Namespace {
            name: self.ident(name),
            decls: self.slice(decls),
            methods: self.slice(methods),
            span: self.span(),
        }
    }

    /// `program name namespaces decls { methods }`
    pub fn program(
        &self,
        name: &str,
        namespaces: &[Namespace<'ast>],
        decls: &[Decl<'ast>],
        methods: &[MethodDecl<'ast>],
    ) -> &'ast Program<'ast> {
        self.arena.alloc(Program {
            name: self.ident(name),
            namespaces: self.slice(namespaces),
            decls: self.slice(decls),
            methods: self.slice(methods),
            span: self.span(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let x = b.var("x");
        let e = b.load(x);
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, e, one);

        let ids = [x.id, e.id, one.id, sum.id];
        for (i, a) in ids.iter().enumerate() {
            for other in &ids[i + 1..] {
                assert_ne!(a, other);
            }
        }
        assert_eq!(b.node_count(), 4);
    }

    #[test]
    fn line_tracking() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let first = b.var("a");
        b.at(7);
        let second = b.var("b");

        assert_eq!(first.span.line, 1);
        assert_eq!(second.span.line, 7);
    }

    #[test]
    fn if_with_else() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let cond = b.cond1(b.fact(b.bool(true)));
        let stmt = b.if_stmt(cond, b.break_stmt(), Some(b.continue_stmt()));

        match stmt {
            Stmt::If(if_stmt) => {
                assert!(matches!(if_stmt.then_stmt, Stmt::Break(_)));
                assert!(matches!(if_stmt.else_stmt, Some(Stmt::Continue(_))));
            }
            _ => panic!("Expected if statement"),
        }
    }

    #[test]
    fn unpack_keeps_blanks() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let stmt = b.unpack(&[Some(b.var("x")), None, Some(b.var("y"))], b.var("d"), b.var("s"));
        match stmt {
            Stmt::Designator(DesignatorStmt {
                kind: DesignatorStmtKind::Unpack(unpack),
                ..
            }) => {
                assert_eq!(unpack.targets.len(), 3);
                assert!(unpack.targets[1].is_none());
            }
            _ => panic!("Expected unpack statement"),
        }
    }
}
