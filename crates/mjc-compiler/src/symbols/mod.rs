//! Symbol and type model shared by both passes.
//!
//! Symbols ([`Obj`]) and types ([`Struct`]) live in a [`SymbolTable`] arena and
//! are referred to by [`SymbolId`] / [`TypeId`]. Index 0 of each arena is a
//! sentinel: [`SymbolId::ABSENT`] is what a failed lookup returns, and
//! [`TypeId::NONE`] is the no-type marker used for `void` and for nodes whose
//! checks failed.

mod compat;
mod table;

pub use table::SymbolTable;

use rustc_hash::FxHashSet;

/// Index of a symbol in the [`SymbolTable`]. Defaults to [`SymbolId::ABSENT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// The sentinel returned by failed lookups: kind `Var`, type `NONE`.
    pub const ABSENT: SymbolId = SymbolId(0);

    /// Whether this is the absent sentinel.
    pub fn is_absent(self) -> bool {
        self == Self::ABSENT
    }

    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a type in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// No type: `void`, and the result of a failed check.
    pub const NONE: TypeId = TypeId(0);
    /// `int`
    pub const INT: TypeId = TypeId(1);
    /// `char`
    pub const CHAR: TypeId = TypeId(2);
    /// `bool`
    pub const BOOL: TypeId = TypeId(3);
    /// The type of `null`.
    pub const NULL: TypeId = TypeId(4);
    /// Array of no type; accepts every array (parameter of `len`).
    pub const ANY_ARRAY: TypeId = TypeId(5);

    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjKind {
    /// The program itself.
    Program,
    /// A type name.
    Type,
    /// A named constant; its address is its value.
    Const,
    /// A global or local variable.
    Var,
    /// An instance field; its address is the field offset.
    Field,
    /// A method; its address is the code address of its `enter`.
    Method,
    /// An array element produced by indexing.
    Elem,
}

impl ObjKind {
    /// Lower-case description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ObjKind::Program => "program",
            ObjKind::Type => "type",
            ObjKind::Const => "constant",
            ObjKind::Var => "variable",
            ObjKind::Field => "field",
            ObjKind::Method => "method",
            ObjKind::Elem => "array element",
        }
    }
}

/// One declared name.
#[derive(Debug, Clone)]
pub struct Obj {
    /// What the name denotes.
    pub kind: ObjKind,
    /// Declared name (qualified for namespace and static members).
    pub name: String,
    /// The symbol's type; the return type for methods.
    pub ty: TypeId,
    /// Slot, offset, value or code address depending on `kind`.
    /// Methods start at [`Obj::NO_ADDRESS`] until their code is emitted.
    pub address: i32,
    /// Scope level at declaration (0 = global).
    pub level: u32,
    /// Declared parameter count, receiver included.
    pub param_count: u32,
    /// Parameters and locals (methods), or program-level symbols.
    pub locals: Vec<SymbolId>,
}

impl Obj {
    /// Address of a method whose code has not been emitted yet.
    pub const NO_ADDRESS: i32 = -1;

    /// Create a symbol with address 0 and no locals.
    pub fn new(kind: ObjKind, name: impl Into<String>, ty: TypeId, level: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            ty,
            address: if kind == ObjKind::Method { Self::NO_ADDRESS } else { 0 },
            level,
            param_count: 0,
            locals: Vec::new(),
        }
    }

    /// Whether a store into this symbol is legal.
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind, ObjKind::Var | ObjKind::Field | ObjKind::Elem)
    }

    /// Whether this is an instance method, called through the dispatch table.
    pub fn is_virtual(&self) -> bool {
        self.kind == ObjKind::Method && self.level == 1
    }

    /// Whether this is a global variable.
    pub fn is_global(&self) -> bool {
        self.kind == ObjKind::Var && self.level == 0
    }
}

/// The shape of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// No type.
    None,
    /// `int`
    Int,
    /// `char`
    Char,
    /// `bool`
    Bool,
    /// `T[]`
    Array,
    /// A class, or the `null` type.
    Class,
}

/// One type.
#[derive(Debug, Clone)]
pub struct Struct {
    /// The shape.
    pub kind: StructKind,
    /// Element type for arrays.
    pub elem: TypeId,
    /// Parent class.
    pub parent: Option<TypeId>,
    /// Members, own and inherited, in dispatch-table order.
    pub members: Vec<SymbolId>,
    /// Display name.
    pub name: String,
    /// Global data offset of the dispatch table, once reserved.
    pub vft_pointer: Option<i32>,
    /// Inherited methods not yet overridden (only while the class is open).
    pub pending_overrides: FxHashSet<SymbolId>,
    /// Number of declared fields, inherited ones included; field 0 is extra.
    pub field_count: u32,
}

impl Struct {
    /// Create a type of the given shape.
    pub fn new(kind: StructKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            elem: TypeId::NONE,
            parent: None,
            members: Vec::new(),
            name: name.into(),
            vft_pointer: None,
            pending_overrides: FxHashSet::default(),
            field_count: 0,
        }
    }

    /// Whether values of this type are references.
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, StructKind::Array | StructKind::Class)
    }
}
