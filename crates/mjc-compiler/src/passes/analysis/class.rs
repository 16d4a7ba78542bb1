//! Class declarations: inheritance, static members, fields.
//!
//! A class frame starts with the parent's members bound in it, so lookups
//! inside the body see inherited fields and methods, and every inherited
//! method starts out as a pending override. Field offsets continue after
//! the parent's fields; offset 0 is the dispatch-table pointer.

use mjc_ast::{ClassDecl, StaticInit, TypeRef, VarDecl};

use crate::symbols::{Obj, ObjKind, StructKind, TypeId};

use super::{AnalysisPass, ClassContext, MethodContext};

impl AnalysisPass {
    /// Visit a class declaration.
    pub(super) fn visit_class(&mut self, class: &ClassDecl<'_>) {
        let name = self.qualify(class.name.name);
        let parent = class.extends.and_then(|ext| self.resolve_parent(&ext));

        let ty = self.table.new_class(&name);
        self.table.ty_mut(ty).parent = parent;
        self.annotations.set_type(class.id, ty);
        self.declare(ObjKind::Type, &name, ty, class.span);
        self.classes.push(ty);

        self.scopes.open();
        let mut first_field = 1;
        if let Some(parent) = parent {
            for member in self.table.ty(parent).members.clone() {
                let obj = self.table.obj(member);
                let is_method = obj.kind == ObjKind::Method;
                let member_name = obj.name.clone();
                self.scopes.bind_existing(&member_name, member);
                if is_method {
                    self.table.ty_mut(ty).pending_overrides.insert(member);
                }
            }
            first_field += self.table.ty(parent).field_count as i32;
        }
        self.scopes.set_next_slot(first_field);

        let outer = self.class.replace(ClassContext {
            ty,
            frame: self.scopes.depth() - 1,
        });

        for decl in class.static_vars {
            self.visit_static_var_decl(decl, &name);
        }
        for (index, init) in class.static_inits.iter().enumerate() {
            self.visit_static_init(init, &name, index);
        }
        for decl in class.fields {
            self.visit_var_decl(decl, ObjKind::Field);
        }
        for method in class.methods {
            self.visit_method(method);
        }

        let members = self.scopes.chain_and_close();
        let field_count = members
            .iter()
            .filter(|&&m| self.table.obj(m).kind == ObjKind::Field)
            .count() as u32;
        let method_count = members.len() - field_count as usize;

        let class_ty = self.table.ty_mut(ty);
        class_ty.members = members;
        class_ty.field_count = field_count;
        class_ty.pending_overrides.clear();
        self.class = outer;

        self.info(
            format!("class '{name}' has {field_count} field(s) and {method_count} method(s)"),
            class.span,
        );
    }

    fn resolve_parent(&mut self, ext: &TypeRef<'_>) -> Option<TypeId> {
        let parent = self.resolve_type(ext, false);
        if parent == TypeId::NONE {
            return None;
        }
        if self.table.kind(parent) != StructKind::Class || parent == TypeId::NULL {
            self.mismatch(
                format!("cannot extend '{}': not a class", self.type_name(parent)),
                ext.span,
            );
            return None;
        }
        Some(parent)
    }

    /// Static variables are globals named `Class.x`.
    fn visit_static_var_decl(&mut self, decl: &VarDecl<'_>, class_name: &str) {
        let base = self.resolve_type(&decl.ty, false);

        for item in decl.items {
            let ty = if item.is_array && base != TypeId::NONE {
                self.table.array_of(base)
            } else {
                base
            };
            let name = format!("{class_name}.{}", item.name.name);
            self.declare_outer(ObjKind::Var, &name, ty, item.span);
        }
    }

    /// A `static { ... }` block is a parameterless void method that `main`
    /// calls before its own body.
    fn visit_static_init(&mut self, init: &StaticInit<'_>, class_name: &str, index: usize) {
        let sym = self.table.add_obj(Obj::new(
            ObjKind::Method,
            format!("{class_name}.static#{index}"),
            TypeId::NONE,
            0,
        ));
        self.annotations.set_symbol(init.id, sym);
        self.static_inits.push(sym);

        self.scopes.open();
        let outer = self.method.replace(MethodContext {
            symbol: sym,
            return_type: TypeId::NONE,
            is_static: true,
            has_return: false,
        });
        self.visit_stmts(init.body);
        self.table.obj_mut(sym).locals = self.scopes.chain_and_close();
        self.method = outer;
    }
}
