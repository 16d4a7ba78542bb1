//! Constant and variable declarations.

use mjc_ast::{ConstDecl, Decl, VarDecl};

use crate::symbols::{ObjKind, TypeId};

use super::AnalysisPass;
use super::expr::literal_type;

impl AnalysisPass {
    /// Visit the declarations of the program or of a namespace.
    pub(super) fn visit_decls(&mut self, decls: &[Decl<'_>]) {
        for decl in decls {
            match decl {
                Decl::Const(c) => self.visit_const_decl(c),
                Decl::Var(v) => self.visit_var_decl(v, ObjKind::Var),
                Decl::Class(class) => self.visit_class(class),
            }
        }
    }

    /// Declare named constants. A constant's address holds its value.
    fn visit_const_decl(&mut self, decl: &ConstDecl<'_>) {
        let ty = self.resolve_type(&decl.ty, false);

        for item in decl.items {
            let value_ty = literal_type(item.value.kind);
            if ty != TypeId::NONE && value_ty != ty {
                self.mismatch(
                    format!(
                        "constant '{}' of type {} initialized with a {} literal",
                        item.name.name,
                        self.type_name(ty),
                        self.type_name(value_ty)
                    ),
                    item.span,
                );
            }

            let name = self.qualify(item.name.name);
            let sym = self.declare(ObjKind::Const, &name, ty, item.span);
            if !sym.is_absent() {
                self.table.obj_mut(sym).address = item.value.kind.as_word();
            }
        }
    }

    /// Declare variables (`Var`) or fields (`Field`) in the innermost frame.
    pub(super) fn visit_var_decl(&mut self, decl: &VarDecl<'_>, kind: ObjKind) {
        let base = self.resolve_type(&decl.ty, false);

        for item in decl.items {
            let ty = if item.is_array && base != TypeId::NONE {
                self.table.array_of(base)
            } else {
                base
            };
            let name = self.qualify(item.name.name);
            self.declare(kind, &name, ty, item.span);
        }
    }
}
