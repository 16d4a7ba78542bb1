//! The symbol and type arena.

use rustc_hash::FxHashMap;

use super::{Obj, ObjKind, Struct, StructKind, SymbolId, TypeId};

/// Arena owning every symbol and type of one compilation.
///
/// The table is created with the sentinels and the predefined types in place;
/// the universe *names* (`int`, `chr`, ...) are bound by the analyzer.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    objs: Vec<Obj>,
    types: Vec<Struct>,
    /// One array type per element type.
    arrays: FxHashMap<TypeId, TypeId>,
    /// Next free global data slot.
    global_count: u32,
}

impl SymbolTable {
    /// Create a table holding the sentinels and predefined types.
    pub fn new() -> Self {
        let mut table = Self {
            objs: Vec::new(),
            types: Vec::new(),
            arrays: FxHashMap::default(),
            global_count: 0,
        };

        table.objs.push(Obj::new(ObjKind::Var, "", TypeId::NONE, 0));

        table.types.push(Struct::new(StructKind::None, "void"));
        table.types.push(Struct::new(StructKind::Int, "int"));
        table.types.push(Struct::new(StructKind::Char, "char"));
        table.types.push(Struct::new(StructKind::Bool, "bool"));
        table.types.push(Struct::new(StructKind::Class, "null"));
        let any_array = table.array_of(TypeId::NONE);
        debug_assert_eq!(any_array, TypeId::ANY_ARRAY);

        table
    }

    // ==========================================================================
    // Symbols
    // ==========================================================================

    /// Add a symbol.
    pub fn add_obj(&mut self, obj: Obj) -> SymbolId {
        let id = SymbolId(self.objs.len() as u32);
        self.objs.push(obj);
        id
    }

    /// Get a symbol. Out-of-range ids yield the absent sentinel.
    pub fn obj(&self, id: SymbolId) -> &Obj {
        self.objs.get(id.index()).unwrap_or(&self.objs[0])
    }

    /// Get a symbol for mutation.
    ///
    /// The sentinel is shared, so callers never mutate [`SymbolId::ABSENT`].
    pub fn obj_mut(&mut self, id: SymbolId) -> &mut Obj {
        debug_assert!(!id.is_absent(), "mutating the absent symbol");
        let index = if id.index() < self.objs.len() { id.index() } else { 0 };
        &mut self.objs[index]
    }

    /// Number of symbols, sentinel included.
    pub fn obj_count(&self) -> usize {
        self.objs.len()
    }

    /// Allocate the next global data slot.
    pub fn alloc_global(&mut self) -> i32 {
        let slot = self.global_count;
        self.global_count += 1;
        slot as i32
    }

    /// Number of global data slots allocated so far.
    pub fn global_count(&self) -> u32 {
        self.global_count
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Add a type.
    pub fn add_type(&mut self, ty: Struct) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Get a type. Out-of-range ids yield the no-type marker.
    pub fn ty(&self, id: TypeId) -> &Struct {
        self.types.get(id.index()).unwrap_or(&self.types[0])
    }

    /// Get a type for mutation.
    pub fn ty_mut(&mut self, id: TypeId) -> &mut Struct {
        let index = if id.index() < self.types.len() { id.index() } else { 0 };
        &mut self.types[index]
    }

    /// Shape of a type.
    pub fn kind(&self, id: TypeId) -> StructKind {
        self.ty(id).kind
    }

    /// The array type with the given element type, created on first use.
    pub fn array_of(&mut self, elem: TypeId) -> TypeId {
        if let Some(&id) = self.arrays.get(&elem) {
            return id;
        }
        let mut array = Struct::new(StructKind::Array, "");
        array.elem = elem;
        let id = self.add_type(array);
        self.arrays.insert(elem, id);
        id
    }

    /// Create an empty class type.
    pub fn new_class(&mut self, name: impl Into<String>) -> TypeId {
        self.add_type(Struct::new(StructKind::Class, name))
    }

    /// Element type of an array, `NONE` for anything else.
    pub fn elem(&self, id: TypeId) -> TypeId {
        let ty = self.ty(id);
        if ty.kind == StructKind::Array {
            ty.elem
        } else {
            TypeId::NONE
        }
    }

    /// Printable name of a type.
    pub fn type_name(&self, id: TypeId) -> String {
        let ty = self.ty(id);
        match ty.kind {
            StructKind::Array if ty.elem == TypeId::NONE => "array".to_string(),
            StructKind::Array => format!("{}[]", self.type_name(ty.elem)),
            _ => ty.name.clone(),
        }
    }

    /// Find a member of a class by name, own and inherited.
    pub fn member(&self, class: TypeId, name: &str) -> Option<SymbolId> {
        self.ty(class)
            .members
            .iter()
            .copied()
            .find(|&m| self.obj(m).name == name)
    }

    /// Methods of a class in dispatch-table order.
    pub fn methods_of(&self, class: TypeId) -> impl Iterator<Item = SymbolId> + '_ {
        self.ty(class)
            .members
            .iter()
            .copied()
            .filter(|&m| self.obj(m).kind == ObjKind::Method)
    }

    /// Number of words the dispatch table of a class occupies.
    ///
    /// Each method takes its name (one word per character), a `-1` separator
    /// and its address; the table ends with a `-2` word.
    pub fn vft_size(&self, class: TypeId) -> u32 {
        self.methods_of(class)
            .map(|m| self.obj(m).name.chars().count() as u32 + 2)
            .sum::<u32>()
            + 1
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
