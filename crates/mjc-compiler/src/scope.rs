//! Lexical scope management for semantic analysis.
//!
//! This module provides `ScopeStack`, the stack of frames the analyzer opens
//! for the universe, the program, each class and each method. It handles:
//! - Declaration with duplicate detection per frame
//! - Address allocation for globals, locals and fields
//! - Lookup walking outward through the frames
//! - Chaining a frame's bindings into its owner when the frame closes

use rustc_hash::FxHashMap;

use crate::symbols::{Obj, ObjKind, SymbolId, SymbolTable, TypeId};

// ============================================================================
// Types
// ============================================================================

/// Outcome of [`ScopeStack::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// The name was free; this is the new symbol.
    New(SymbolId),
    /// The name was already bound in the current frame to this symbol.
    Duplicate(SymbolId),
}

impl Declared {
    /// The symbol the name is bound to.
    pub fn symbol(self) -> SymbolId {
        match self {
            Declared::New(id) | Declared::Duplicate(id) => id,
        }
    }
}

/// One frame of the stack.
#[derive(Debug, Default)]
struct Frame {
    /// Bindings by name.
    bindings: FxHashMap<String, SymbolId>,
    /// Bound symbols in declaration order.
    order: Vec<SymbolId>,
    /// Next free local slot or field offset.
    next_slot: i32,
}

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of lexical scopes.
///
/// Frame 0 is the universe and frame 1 the program; both sit at level 0.
/// A class body or global method is level 1, a method inside a class level 2.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Frame Management
    // ==========================================================================

    /// Open a new innermost frame.
    pub fn open(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Discard the innermost frame.
    pub fn close(&mut self) {
        self.frames.pop();
    }

    /// Close the innermost frame, returning its bindings in declaration order.
    ///
    /// The caller stores the result in the owner's `locals` or `members`.
    pub fn chain_and_close(&mut self) -> Vec<SymbolId> {
        self.frames.pop().map(|f| f.order).unwrap_or_default()
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Scope level of the innermost frame.
    pub fn level(&self) -> u32 {
        self.frames.len().saturating_sub(2) as u32
    }

    /// Set the next slot of the innermost frame (field offsets start after
    /// the inherited fields).
    pub fn set_next_slot(&mut self, slot: i32) {
        if let Some(frame) = self.frames.last_mut() {
            frame.next_slot = slot;
        }
    }

    /// Bindings of the innermost frame so far, in declaration order.
    pub fn current_symbols(&self) -> Vec<SymbolId> {
        self.frames.last().map(|f| f.order.clone()).unwrap_or_default()
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Declare `name` in the innermost frame.
    ///
    /// Variables get a global slot at level 0 and a frame slot elsewhere;
    /// fields get the frame's next offset. Other kinds start at address 0.
    pub fn insert(
        &mut self,
        table: &mut SymbolTable,
        kind: ObjKind,
        name: &str,
        ty: TypeId,
    ) -> Declared {
        let index = self.frames.len().saturating_sub(1);
        self.insert_at(index, table, kind, name, ty)
    }

    /// Declare `name` in the frame enclosing the innermost one.
    ///
    /// Used for static class members, which live at program level under a
    /// `Class.name` name while the class frame is open.
    pub fn insert_outer(
        &mut self,
        table: &mut SymbolTable,
        kind: ObjKind,
        name: &str,
        ty: TypeId,
    ) -> Declared {
        let index = self.frames.len().saturating_sub(2);
        self.insert_at(index, table, kind, name, ty)
    }

    fn insert_at(
        &mut self,
        index: usize,
        table: &mut SymbolTable,
        kind: ObjKind,
        name: &str,
        ty: TypeId,
    ) -> Declared {
        let level = index.saturating_sub(1) as u32;
        let Some(frame) = self.frames.get_mut(index) else {
            return Declared::Duplicate(SymbolId::ABSENT);
        };
        if let Some(&existing) = frame.bindings.get(name) {
            return Declared::Duplicate(existing);
        }

        let mut obj = Obj::new(kind, name, ty, level);
        match kind {
            ObjKind::Var if level == 0 => obj.address = table.alloc_global(),
            ObjKind::Var | ObjKind::Field => {
                obj.address = frame.next_slot;
                frame.next_slot += 1;
            }
            _ => {}
        }

        let id = table.add_obj(obj);
        frame.bindings.insert(name.to_string(), id);
        frame.order.push(id);
        Declared::New(id)
    }

    /// Bind an existing symbol in the innermost frame (inherited members).
    pub fn bind_existing(&mut self, name: &str, id: SymbolId) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.bindings.insert(name.to_string(), id).is_none() {
                frame.order.push(id);
            }
        }
    }

    /// Rebind `name` in the innermost frame, keeping its declaration position.
    ///
    /// Returns the previous binding. Used when a method overrides an
    /// inherited one.
    pub fn replace(&mut self, name: &str, id: SymbolId) -> Option<SymbolId> {
        let frame = self.frames.last_mut()?;
        let old = frame.bindings.insert(name.to_string(), id)?;
        if let Some(slot) = frame.order.iter_mut().find(|s| **s == old) {
            *slot = id;
        }
        Some(old)
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find `name`, innermost frame first. Returns [`SymbolId::ABSENT`] when
    /// nothing is bound.
    pub fn find(&self, name: &str) -> SymbolId {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.bindings.get(name).copied())
            .unwrap_or(SymbolId::ABSENT)
    }

    /// Find `name` in the innermost frame only.
    pub fn find_local(&self, name: &str) -> Option<SymbolId> {
        self.frames.last()?.bindings.get(name).copied()
    }

    /// Find `name` in the frame at `depth` (0 = universe).
    pub fn find_in_frame(&self, depth: usize, name: &str) -> Option<SymbolId> {
        self.frames.get(depth)?.bindings.get(name).copied()
    }

    /// Depth of the frame `name` is bound in, searching outward.
    pub fn frame_of(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .find(|(_, f)| f.bindings.contains_key(name))
            .map(|(depth, _)| depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_scope() -> (ScopeStack, SymbolTable) {
        let mut scopes = ScopeStack::new();
        scopes.open(); // universe
        scopes.open(); // program
        (scopes, SymbolTable::new())
    }

    #[test]
    fn declare_global_variable() {
        let (mut scopes, mut table) = program_scope();
        let x = scopes.insert(&mut table, ObjKind::Var, "x", TypeId::INT);
        let y = scopes.insert(&mut table, ObjKind::Var, "y", TypeId::INT);

        let (Declared::New(x), Declared::New(y)) = (x, y) else {
            panic!("Expected fresh declarations");
        };
        assert_eq!(table.obj(x).address, 0);
        assert_eq!(table.obj(y).address, 1);
        assert_eq!(table.obj(x).level, 0);
        assert_eq!(table.global_count(), 2);
    }

    #[test]
    fn duplicate_in_same_frame() {
        let (mut scopes, mut table) = program_scope();
        let first = scopes.insert(&mut table, ObjKind::Var, "x", TypeId::INT);
        let second = scopes.insert(&mut table, ObjKind::Const, "x", TypeId::INT);
        assert_eq!(second, Declared::Duplicate(first.symbol()));
    }

    #[test]
    fn shadowing_allowed() {
        let (mut scopes, mut table) = program_scope();
        let outer = scopes.insert(&mut table, ObjKind::Var, "x", TypeId::INT).symbol();

        scopes.open();
        let inner = scopes.insert(&mut table, ObjKind::Var, "x", TypeId::CHAR);
        assert!(matches!(inner, Declared::New(_)));
        assert_eq!(scopes.find("x"), inner.symbol());
        assert_eq!(table.obj(inner.symbol()).level, 1);
        assert_eq!(table.obj(inner.symbol()).address, 0);

        scopes.close();
        assert_eq!(scopes.find("x"), outer);
    }

    #[test]
    fn find_missing_is_absent() {
        let (scopes, _) = program_scope();
        assert!(scopes.find("nope").is_absent());
    }

    #[test]
    fn chain_and_close_keeps_order() {
        let (mut scopes, mut table) = program_scope();
        scopes.open();
        let a = scopes.insert(&mut table, ObjKind::Var, "a", TypeId::INT).symbol();
        let b = scopes.insert(&mut table, ObjKind::Var, "b", TypeId::INT).symbol();
        let c = scopes.insert(&mut table, ObjKind::Var, "c", TypeId::INT).symbol();

        let chained = scopes.chain_and_close();
        assert_eq!(chained, vec![a, b, c]);
        assert_eq!(scopes.depth(), 2);
    }

    #[test]
    fn fields_start_after_inherited() {
        let (mut scopes, mut table) = program_scope();
        scopes.open();
        scopes.set_next_slot(3);
        let f = scopes.insert(&mut table, ObjKind::Field, "f", TypeId::INT).symbol();
        assert_eq!(table.obj(f).address, 3);
        assert_eq!(table.obj(f).level, 1);
    }

    #[test]
    fn static_member_goes_outward() {
        let (mut scopes, mut table) = program_scope();
        scopes.open(); // class
        let s = scopes
            .insert_outer(&mut table, ObjKind::Var, "C.count", TypeId::INT)
            .symbol();
        assert_eq!(table.obj(s).level, 0);
        assert!(scopes.find_local("C.count").is_none());
        scopes.close();
        assert_eq!(scopes.find("C.count"), s);
    }

    #[test]
    fn replace_keeps_position() {
        let (mut scopes, mut table) = program_scope();
        scopes.open();
        let f = scopes.insert(&mut table, ObjKind::Method, "f", TypeId::NONE).symbol();
        let g = scopes.insert(&mut table, ObjKind::Method, "g", TypeId::NONE).symbol();
        let replacement = table.add_obj(Obj::new(ObjKind::Method, "f", TypeId::NONE, 1));

        assert_eq!(scopes.replace("f", replacement), Some(f));
        assert_eq!(scopes.find_local("f"), Some(replacement));
        assert_eq!(scopes.chain_and_close(), vec![replacement, g]);
    }
}
