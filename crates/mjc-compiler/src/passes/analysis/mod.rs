//! Analysis Pass (Pass 1) - Declare names and check the static semantics.
//!
//! This pass walks the tree once, in source order. At each node it either
//! declares a name, resolves a designator or type, or checks a rule. Results
//! are recorded in [`Annotations`] keyed by node id; violations are recorded
//! as diagnostics and the walk continues with the node typed as
//! [`TypeId::NONE`] so dependent checks stay quiet.
//!
//! ## Responsibilities
//!
//! - Seed the universe (`int`, `char`, `bool`, `eol`, `null`, `chr`, `ord`, `len`)
//! - Declare constants, globals, classes, fields, methods and locals
//! - Allocate global slots, field offsets and local slots
//! - Build class member lists, detect overrides, size dispatch tables
//! - Resolve designators and types, type-check expressions and statements
//!
//! ## Scope levels
//!
//! ```text
//! frame 0  universe        level 0
//! frame 1  program         level 0   globals, classes, global methods
//! frame 2  class | method  level 1   fields and instance methods | locals
//! frame 3  class method    level 2   receiver, parameters, locals
//! ```

mod call;
mod class;
mod condition;
mod decl;
mod designator;
mod expr;
mod method;
mod stmt;

use mjc_ast::{Program, TypeRef};
use mjc_core::{CompilationError, Diagnostic, Span};

use crate::annotations::Annotations;
use crate::options::CompilerOptions;
use crate::scope::{Declared, ScopeStack};
use crate::symbols::{Obj, ObjKind, SymbolId, SymbolTable, TypeId};

/// Symbols of the predefined methods, emitted ahead of user code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Builtins {
    /// `char chr(int i)`
    pub chr: SymbolId,
    /// `int ord(char ch)`
    pub ord: SymbolId,
    /// `int len(arr)` for any array
    pub len: SymbolId,
}

impl Builtins {
    /// The built-ins in emission order.
    pub fn all(&self) -> [SymbolId; 3] {
        [self.chr, self.ord, self.len]
    }
}

/// Output of the analysis pass.
#[derive(Debug)]
pub struct AnalysisOutput {
    /// Every symbol and type of the program.
    pub table: SymbolTable,
    /// Symbols and types recorded per node.
    pub annotations: Annotations,
    /// Errors, plus infos when enabled, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of error diagnostics.
    pub error_count: usize,
    /// The program symbol; its locals are the program-level symbols.
    pub program: SymbolId,
    /// The `void main()` entry point, when declared correctly.
    pub main: Option<SymbolId>,
    /// The predefined methods.
    pub builtins: Builtins,
    /// Class types in declaration order.
    pub classes: Vec<TypeId>,
    /// Static initializer methods in declaration order.
    pub static_inits: Vec<SymbolId>,
}

impl AnalysisOutput {
    /// Whether any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// The recorded errors.
    pub fn errors(&self) -> impl Iterator<Item = &CompilationError> + '_ {
        self.diagnostics.iter().filter_map(|d| d.error.as_ref())
    }
}

/// The class whose body is being analyzed.
#[derive(Debug, Clone)]
struct ClassContext {
    ty: TypeId,
    /// Depth of the class frame in the scope stack.
    frame: usize,
}

/// The method (or static initializer) whose body is being analyzed.
#[derive(Debug, Clone, Copy)]
struct MethodContext {
    symbol: SymbolId,
    return_type: TypeId,
    /// No receiver: static methods, static initializers, global methods.
    is_static: bool,
    /// A `return <expr>` was seen.
    has_return: bool,
}

/// Pass 1: declare every name and check every rule.
pub struct AnalysisPass {
    table: SymbolTable,
    scopes: ScopeStack,
    annotations: Annotations,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    report_info: bool,
    require_main: bool,
    builtins: Builtins,
    /// Namespace whose members are being declared.
    namespace: Option<String>,
    class: Option<ClassContext>,
    method: Option<MethodContext>,
    loop_depth: u32,
    classes: Vec<TypeId>,
    static_inits: Vec<SymbolId>,
}

impl AnalysisPass {
    /// Create a new analysis pass.
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            table: SymbolTable::new(),
            scopes: ScopeStack::new(),
            annotations: Annotations::new(),
            diagnostics: Vec::new(),
            error_count: 0,
            report_info: options.report_info,
            require_main: options.require_main,
            builtins: Builtins::default(),
            namespace: None,
            class: None,
            method: None,
            loop_depth: 0,
            classes: Vec::new(),
            static_inits: Vec::new(),
        }
    }

    /// Run the analysis pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> AnalysisOutput {
        log::debug!("analysis of program '{}' started", program.name.name);

        self.seed_universe();
        let program_sym = self
            .scopes
            .insert(&mut self.table, ObjKind::Program, program.name.name, TypeId::NONE)
            .symbol();
        self.scopes.open();

        for namespace in program.namespaces {
            self.namespace = Some(namespace.name.name.to_string());
            self.visit_decls(namespace.decls);
            for method in namespace.methods {
                self.visit_method(method);
            }
            self.namespace = None;
        }

        self.visit_decls(program.decls);
        for method in program.methods {
            self.visit_method(method);
        }

        let main = self.check_main(program.span);

        self.table.obj_mut(program_sym).locals = self.scopes.chain_and_close();
        self.scopes.close();

        log::debug!(
            "analysis finished: {} symbol(s), {} error(s)",
            self.table.obj_count(),
            self.error_count
        );

        AnalysisOutput {
            table: self.table,
            annotations: self.annotations,
            diagnostics: self.diagnostics,
            error_count: self.error_count,
            program: program_sym,
            main,
            builtins: self.builtins,
            classes: self.classes,
            static_inits: self.static_inits,
        }
    }

    // ==========================================================================
    // Universe
    // ==========================================================================

    fn seed_universe(&mut self) {
        self.scopes.open();

        for (name, ty) in [
            ("int", TypeId::INT),
            ("char", TypeId::CHAR),
            ("bool", TypeId::BOOL),
        ] {
            self.scopes.insert(&mut self.table, ObjKind::Type, name, ty);
        }

        let eol = self
            .scopes
            .insert(&mut self.table, ObjKind::Const, "eol", TypeId::CHAR)
            .symbol();
        self.table.obj_mut(eol).address = 10;
        self.scopes
            .insert(&mut self.table, ObjKind::Const, "null", TypeId::NULL);

        self.builtins = Builtins {
            chr: self.builtin("chr", TypeId::CHAR, "i", TypeId::INT),
            ord: self.builtin("ord", TypeId::INT, "ch", TypeId::CHAR),
            len: self.builtin("len", TypeId::INT, "arr", TypeId::ANY_ARRAY),
        };
    }

    fn builtin(&mut self, name: &str, ret: TypeId, param: &str, param_ty: TypeId) -> SymbolId {
        let method = self
            .scopes
            .insert(&mut self.table, ObjKind::Method, name, ret)
            .symbol();
        let param = self
            .table
            .add_obj(Obj::new(ObjKind::Var, param, param_ty, 1));
        let obj = self.table.obj_mut(method);
        obj.param_count = 1;
        obj.locals = vec![param];
        method
    }

    fn check_main(&mut self, span: Span) -> Option<SymbolId> {
        let main = self.scopes.find_local("main");
        let valid = main.filter(|&id| {
            let obj = self.table.obj(id);
            obj.kind == ObjKind::Method && obj.ty == TypeId::NONE && obj.param_count == 0
        });
        if valid.is_none() && self.require_main {
            self.error(CompilationError::MissingMain { span });
        }
        valid
    }

    // ==========================================================================
    // Declaration helpers
    // ==========================================================================

    /// Name under which a program-level declaration is bound.
    fn qualify(&self, name: &str) -> String {
        match (&self.namespace, &self.class, &self.method) {
            (Some(ns), None, None) => format!("{ns}::{name}"),
            _ => name.to_string(),
        }
    }

    /// Declare in the innermost frame. Returns [`SymbolId::ABSENT`] when the
    /// declaration was rejected.
    fn declare(&mut self, kind: ObjKind, name: &str, ty: TypeId, span: Span) -> SymbolId {
        self.declare_in(false, kind, name, ty, span)
    }

    /// Declare in the frame enclosing the class frame (static members).
    fn declare_outer(&mut self, kind: ObjKind, name: &str, ty: TypeId, span: Span) -> SymbolId {
        self.declare_in(true, kind, name, ty, span)
    }

    fn declare_in(
        &mut self,
        outer: bool,
        kind: ObjKind,
        name: &str,
        ty: TypeId,
        span: Span,
    ) -> SymbolId {
        let bare = name.rsplit([':', '.']).next().unwrap_or(name);
        let already_local = if outer {
            self.scopes.find_in_frame(self.scopes.depth().saturating_sub(2), name)
        } else {
            self.scopes.find_local(name)
        };
        if already_local.is_none() && (self.is_type_name(bare) || self.is_type_name(name)) {
            self.error(CompilationError::NameMasksType {
                name: name.to_string(),
                span,
            });
            return SymbolId::ABSENT;
        }

        let declared = if outer {
            self.scopes.insert_outer(&mut self.table, kind, name, ty)
        } else {
            self.scopes.insert(&mut self.table, kind, name, ty)
        };
        match declared {
            Declared::New(id) => {
                self.info(format!("declared {} '{}'", kind.describe(), name), span);
                id
            }
            Declared::Duplicate(_) => {
                self.error(CompilationError::DuplicateName {
                    name: name.to_string(),
                    span,
                });
                SymbolId::ABSENT
            }
        }
    }

    fn is_type_name(&self, name: &str) -> bool {
        let found = self.scopes.find(name);
        !found.is_absent() && self.table.obj(found).kind == ObjKind::Type
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Resolve a type reference, falling back to the current namespace.
    fn resolve_type(&mut self, tref: &TypeRef<'_>, is_array: bool) -> TypeId {
        let name = tref.qualified_name();
        let mut found = self.scopes.find(&name);
        if found.is_absent() && tref.namespace.is_none() {
            if let Some(ns) = &self.namespace {
                found = self.scopes.find(&format!("{ns}::{name}"));
            }
        }

        let (kind, ty) = {
            let obj = self.table.obj(found);
            (obj.kind, obj.ty)
        };
        if found.is_absent() || kind != ObjKind::Type {
            self.error(CompilationError::UnknownType {
                name,
                span: tref.span,
            });
            return TypeId::NONE;
        }

        if is_array { self.table.array_of(ty) } else { ty }
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.table.type_name(ty)
    }

    // ==========================================================================
    // Reporting
    // ==========================================================================

    fn error(&mut self, error: CompilationError) {
        let diagnostic = Diagnostic::error(error);
        diagnostic.log();
        self.diagnostics.push(diagnostic);
        self.error_count += 1;
    }

    fn mismatch(&mut self, message: impl Into<String>, span: Span) {
        self.error(CompilationError::TypeMismatch {
            message: message.into(),
            span,
        });
    }

    fn info(&mut self, message: String, span: Span) {
        if !self.report_info {
            return;
        }
        let diagnostic = Diagnostic::info(message, span);
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }
}
