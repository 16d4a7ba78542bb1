//! Method declarations and override checking.

use mjc_ast::MethodDecl;
use mjc_core::CompilationError;

use crate::symbols::{Obj, ObjKind, SymbolId, TypeId};

use super::{AnalysisPass, MethodContext};

impl AnalysisPass {
    /// Visit a global, static or instance method.
    ///
    /// Instance methods receive `this` as parameter 0. The method's `locals`
    /// hold its parameters as soon as they are declared, so recursive calls
    /// inside the body can be checked, and the full frame once it closes.
    pub(super) fn visit_method(&mut self, method: &MethodDecl<'_>) {
        let return_type = match &method.return_type {
            Some(ty) => self.resolve_type(ty, method.returns_array),
            None => TypeId::NONE,
        };
        let param_types: Vec<TypeId> = method
            .params
            .iter()
            .map(|p| self.resolve_type(&p.ty, p.is_array))
            .collect();

        let class = self.class.clone();
        let is_instance = class.is_some() && !method.is_static;

        let (declared, overridden) = match &class {
            Some(_) if is_instance => self.declare_instance_method(method, return_type, &param_types),
            Some(ctx) => {
                let name = format!("{}.{}", self.table.ty(ctx.ty).name, method.name.name);
                let sym = self.declare_outer(ObjKind::Method, &name, return_type, method.span);
                (sym, None)
            }
            None => {
                let name = self.qualify(method.name.name);
                (self.declare(ObjKind::Method, &name, return_type, method.span), None)
            }
        };
        // A rejected declaration still has its body checked.
        let sym = if declared.is_absent() {
            let level = if is_instance { 1 } else { 0 };
            self.table.add_obj(Obj::new(ObjKind::Method, method.name.name, return_type, level))
        } else {
            declared
        };
        self.annotations.set_symbol(method.id, sym);

        self.scopes.open();
        let outer = self.method.replace(MethodContext {
            symbol: sym,
            return_type,
            is_static: !is_instance,
            has_return: false,
        });

        if let (true, Some(ctx)) = (is_instance, &class) {
            self.declare(ObjKind::Var, "this", ctx.ty, method.span);
        }
        for (param, &ty) in method.params.iter().zip(&param_types) {
            self.declare(ObjKind::Var, param.name.name, ty, param.span);
        }
        let params = self.scopes.current_symbols();
        let obj = self.table.obj_mut(sym);
        obj.param_count = params.len() as u32;
        obj.locals = params;
        if let Some(parent) = overridden {
            self.inherit_param_layout(sym, parent);
        }

        for decl in method.locals {
            self.visit_var_decl(decl, ObjKind::Var);
        }
        self.visit_stmts(method.body);

        let has_return = self.method.is_some_and(|m| m.has_return);
        if return_type != TypeId::NONE && !has_return {
            self.error(CompilationError::MissingReturn {
                name: method.name.name.to_string(),
                span: method.span,
            });
        }

        self.table.obj_mut(sym).locals = self.scopes.chain_and_close();
        self.method = outer;
    }

    /// Declare an instance method, or override a pending inherited one.
    ///
    /// Returns the symbol and, for a valid override, the parent's symbol. A
    /// failed override yields a detached symbol that is never bound.
    fn declare_instance_method(
        &mut self,
        method: &MethodDecl<'_>,
        return_type: TypeId,
        param_types: &[TypeId],
    ) -> (SymbolId, Option<SymbolId>) {
        let name = method.name.name;
        let pending = match (self.scopes.find_local(name), &self.class) {
            (Some(existing), Some(ctx))
                if self.table.ty(ctx.ty).pending_overrides.contains(&existing) =>
            {
                Some((existing, ctx.ty))
            }
            _ => None,
        };

        let Some((inherited, class_ty)) = pending else {
            let sym = self.declare(ObjKind::Method, name, return_type, method.span);
            return (sym, None);
        };

        let sym = self
            .table
            .add_obj(Obj::new(ObjKind::Method, name, return_type, 1));
        if !self.check_override(inherited, return_type, param_types, method) {
            return (sym, None);
        }

        self.scopes.replace(name, sym);
        self.table.ty_mut(class_ty).pending_overrides.remove(&inherited);
        self.info(format!("method '{name}' overrides an inherited method"), method.span);
        (sym, Some(inherited))
    }

    /// Same return type, same parameter count, each parameter assignable to
    /// the inherited one.
    fn check_override(
        &mut self,
        inherited: SymbolId,
        return_type: TypeId,
        param_types: &[TypeId],
        method: &MethodDecl<'_>,
    ) -> bool {
        let parent = self.table.obj(inherited);
        let parent_return = parent.ty;
        let parent_params = parent.param_count as usize;
        let parent_param_types: Vec<TypeId> = parent
            .locals
            .iter()
            .skip(1)
            .map(|&l| self.table.obj(l).ty)
            .collect();

        let message = if parent_return != return_type {
            Some(format!(
                "return type {} differs from {}",
                self.type_name(return_type),
                self.type_name(parent_return)
            ))
        } else if parent_params != param_types.len() + 1 {
            Some(format!(
                "expected {} parameter(s), found {}",
                parent_params.saturating_sub(1),
                param_types.len()
            ))
        } else {
            param_types
                .iter()
                .zip(&parent_param_types)
                .position(|(&own, &theirs)| !self.table.assignable_to(own, theirs))
                .map(|i| {
                    format!(
                        "parameter {} of type {} is not compatible with {}",
                        i + 1,
                        self.type_name(param_types[i]),
                        self.type_name(parent_param_types[i])
                    )
                })
        };

        match message {
            Some(message) => {
                self.error(CompilationError::InvalidOverride {
                    name: method.name.name.to_string(),
                    message,
                    span: method.span,
                });
                false
            }
            None => true,
        }
    }

    /// An override uses the slots of the method it replaces.
    fn inherit_param_layout(&mut self, sym: SymbolId, inherited: SymbolId) {
        let own = self.table.obj(sym).locals.clone();
        let slots: Vec<i32> = self
            .table
            .obj(inherited)
            .locals
            .iter()
            .map(|&l| self.table.obj(l).address)
            .collect();
        for (local, slot) in own.into_iter().zip(slots) {
            self.table.obj_mut(local).address = slot;
        }
    }
}
