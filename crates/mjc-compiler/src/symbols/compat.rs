//! Type compatibility rules.

use super::{StructKind, SymbolTable, TypeId};

impl SymbolTable {
    /// Whether `ancestor` is `class` itself or one of its parents.
    pub fn is_ancestor(&self, class: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.ty(id).parent;
        }
        false
    }

    /// Whether a value of type `src` may be stored where `dst` is expected.
    ///
    /// `NONE` on either side is accepted so a failed check does not cascade.
    pub fn assignable_to(&self, src: TypeId, dst: TypeId) -> bool {
        if src == dst || src == TypeId::NONE || dst == TypeId::NONE {
            return true;
        }
        let (s, d) = (self.ty(src), self.ty(dst));
        match (s.kind, d.kind) {
            (StructKind::Class, StructKind::Class | StructKind::Array) if src == TypeId::NULL => {
                true
            }
            (StructKind::Class, StructKind::Class) => self.is_ancestor(src, dst),
            (StructKind::Array, StructKind::Array) => d.elem == TypeId::NONE || s.elem == d.elem,
            _ => false,
        }
    }

    /// Whether two operands may be compared with each other.
    pub fn compatible(&self, a: TypeId, b: TypeId) -> bool {
        self.assignable_to(a, b) || self.assignable_to(b, a)
    }

    /// Whether values of this type are references.
    pub fn is_reference(&self, id: TypeId) -> bool {
        self.ty(id).is_reference()
    }
}
