//! Designator resolution.
//!
//! Plain names resolve through the scope chain first, then as static
//! members (`Class.x`) of the current class and its ancestors, then inside
//! the current namespace (`ns::x`). Indexing yields a fresh element symbol;
//! member access searches the class members, own and inherited.

use mjc_ast::{Designator, DesignatorKind, Ident};
use mjc_core::{CompilationError, Span};

use crate::symbols::{Obj, ObjKind, StructKind, SymbolId, TypeId};

use super::AnalysisPass;

impl AnalysisPass {
    /// Resolve a designator and record its symbol.
    ///
    /// Returns [`SymbolId::ABSENT`] (type `NONE`) when resolution failed.
    pub(super) fn resolve_designator(&mut self, d: &Designator<'_>) -> SymbolId {
        let sym = match d.kind {
            DesignatorKind::Ident(ident) => self.resolve_name(ident.name, ident.span),
            DesignatorKind::Qualified { namespace, name } => {
                let qualified = format!("{}::{}", namespace.name, name.name);
                let found = self.scopes.find(&qualified);
                if found.is_absent() {
                    self.error(CompilationError::UndeclaredName {
                        name: qualified,
                        span: d.span,
                    });
                }
                found
            }
            DesignatorKind::Index { base, index } => {
                let array = self.resolve_designator(base);
                let array_ty = self.table.obj(array).ty;
                let index_ty = self.visit_expr(index);
                if index_ty != TypeId::INT && index_ty != TypeId::NONE {
                    self.mismatch("array index must be of type int", index.span);
                }

                if self.table.kind(array_ty) == StructKind::Array {
                    let elem = self.table.elem(array_ty);
                    self.table.add_obj(Obj::new(ObjKind::Elem, "", elem, 0))
                } else {
                    if array_ty != TypeId::NONE {
                        self.mismatch(format!("'{}' is not an array", base.display_name()), d.span);
                    }
                    SymbolId::ABSENT
                }
            }
            DesignatorKind::Field { base, name } => {
                let owner = self.resolve_designator(base);
                self.resolve_member(owner, base, name)
            }
        };

        self.annotations.set_symbol(d.id, sym);
        if !sym.is_absent() {
            let obj = self.table.obj(sym);
            let message = format!("usage of {} '{}'", obj.kind.describe(), d.display_name());
            self.info(message, d.span);
        }
        sym
    }

    /// Resolve an unqualified name.
    fn resolve_name(&mut self, name: &str, span: Span) -> SymbolId {
        let found = self.scopes.find(name);
        if !found.is_absent() {
            if self.is_instance_member_in_static_context(name, found) {
                self.error(CompilationError::InstanceMemberInStaticContext {
                    name: name.to_string(),
                    span,
                });
                return SymbolId::ABSENT;
            }
            return found;
        }

        let static_member = self
            .class
            .as_ref()
            .and_then(|ctx| self.find_static_member(ctx.ty, name));
        if let Some(found) = static_member {
            return found;
        }

        if let Some(ns) = &self.namespace {
            let found = self.scopes.find(&format!("{ns}::{name}"));
            if !found.is_absent() {
                return found;
            }
        }

        self.error(CompilationError::UndeclaredName {
            name: name.to_string(),
            span,
        });
        SymbolId::ABSENT
    }

    /// A field or instance method of the current class, named from a method
    /// without a receiver.
    fn is_instance_member_in_static_context(&self, name: &str, found: SymbolId) -> bool {
        let (Some(class), Some(method)) = (&self.class, &self.method) else {
            return false;
        };
        let obj = self.table.obj(found);
        method.is_static
            && (obj.kind == ObjKind::Field || obj.is_virtual())
            && self.scopes.frame_of(name) == Some(class.frame)
    }

    /// Resolve `base.name`: a static member when `base` names a class, an
    /// instance member when it is an object.
    fn resolve_member(
        &mut self,
        owner: SymbolId,
        base: &Designator<'_>,
        name: Ident<'_>,
    ) -> SymbolId {
        if owner.is_absent() {
            return SymbolId::ABSENT;
        }
        let owner_obj = self.table.obj(owner);
        let owner_ty = owner_obj.ty;
        let names_type = owner_obj.kind == ObjKind::Type;

        if self.table.kind(owner_ty) != StructKind::Class || owner_ty == TypeId::NULL {
            if owner_ty != TypeId::NONE {
                self.mismatch(
                    format!("'{}' is not an object", base.display_name()),
                    base.span,
                );
            }
            return SymbolId::ABSENT;
        }

        let found = if names_type {
            self.find_static_member(owner_ty, name.name)
        } else {
            self.find_instance_member(owner_ty, name.name)
        };
        found.unwrap_or_else(|| {
            self.error(CompilationError::UnknownMember {
                owner: self.type_name(owner_ty),
                name: name.name.to_string(),
                span: name.span,
            });
            SymbolId::ABSENT
        })
    }

    fn find_static_member(&self, class: TypeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(class);
        while let Some(ty) = current {
            let class_ty = self.table.ty(ty);
            let found = self.scopes.find(&format!("{}.{}", class_ty.name, name));
            if !found.is_absent() {
                return Some(found);
            }
            current = class_ty.parent;
        }
        None
    }

    /// The class being declared has no member list yet; its frame is
    /// searched instead.
    fn find_instance_member(&self, class: TypeId, name: &str) -> Option<SymbolId> {
        match &self.class {
            Some(ctx) if ctx.ty == class => self.scopes.find_in_frame(ctx.frame, name),
            _ => self.table.member(class, name),
        }
    }
}
