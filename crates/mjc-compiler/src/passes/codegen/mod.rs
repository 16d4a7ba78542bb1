//! Code Generation Pass (Pass 2) - Emit bytecode for an analyzed program.
//!
//! This pass walks the tree a second time and emits one program-wide code
//! buffer, reading every decision from the symbols and types recorded by the
//! analysis pass. It only runs on programs without semantic errors, so any
//! inconsistency it meets is an internal error and stops generation.
//!
//! ## Layout
//!
//! ```text
//! code:  chr | ord | len | <classes: static inits, methods> | <global methods>
//! data:  global variables | dispatch table of each class, in declaration order
//! ```
//!
//! Method addresses are assigned as their `enter` is emitted. `main` starts
//! by writing every dispatch table and calling every static initializer.

mod builtins;
mod call;
mod class;
mod condition;
mod designator;
mod expr;
mod method;
mod stmt;
mod unpack;

use mjc_ast::{Decl, Designator, Program};
use mjc_core::GenerationError;

use crate::annotations::Annotations;
use crate::bytecode::ObjectFile;
use crate::emit::BytecodeEmitter;
use crate::options::CompilerOptions;
use crate::passes::analysis::{AnalysisOutput, Builtins};
use crate::symbols::{Obj, SymbolId, SymbolTable, TypeId};

type Result<T> = std::result::Result<T, GenerationError>;

/// Pass 2: emit bytecode.
pub struct CodegenPass<'a> {
    table: &'a mut SymbolTable,
    annotations: &'a Annotations,
    emitter: BytecodeEmitter,
    builtins: Builtins,
    main: Option<SymbolId>,
    /// Class types in declaration order, as analysis found them.
    classes: Vec<TypeId>,
    /// Static initializers in declaration order; `main` calls them in turn.
    static_inits: Vec<SymbolId>,
    /// Global data words reserved so far.
    data_size: u32,
    code_limit: usize,
    /// Declared locals of the frame being emitted; receiver slots follow.
    frame_base: u32,
    /// Virtual calls currently holding a receiver slot.
    receiver_depth: u32,
    /// Most receiver slots held at once in the current frame.
    receiver_peak: u32,
}

impl<'a> CodegenPass<'a> {
    /// Create a code generation pass over the result of analysis.
    pub fn new(analysis: &'a mut AnalysisOutput, options: &CompilerOptions) -> Self {
        let data_size = analysis.table.global_count();
        Self {
            table: &mut analysis.table,
            annotations: &analysis.annotations,
            emitter: BytecodeEmitter::new(),
            builtins: analysis.builtins,
            main: analysis.main,
            classes: analysis.classes.clone(),
            static_inits: analysis.static_inits.clone(),
            data_size,
            code_limit: options.code_limit,
            frame_base: 0,
            receiver_depth: 0,
            receiver_peak: 0,
        }
    }

    /// Run the code generation pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> Result<ObjectFile> {
        log::debug!("code generation of program '{}' started", program.name.name);

        self.emit_builtins()?;

        for namespace in program.namespaces {
            self.emit_decls(namespace.decls)?;
            for method in namespace.methods {
                self.emit_method(method)?;
            }
        }
        self.emit_decls(program.decls)?;
        for method in program.methods {
            self.emit_method(method)?;
        }

        let main_pc = match self.main {
            Some(main) => self.code_address(main)? as u32,
            None => 0,
        };

        let chunk = self.emitter.finish()?;
        if chunk.len() > self.code_limit {
            return Err(GenerationError::ProgramTooLarge {
                size: chunk.len(),
                limit: self.code_limit,
            });
        }

        log::debug!(
            "code generation finished: {} byte(s) of code, {} word(s) of data, entry at {}",
            chunk.len(),
            self.data_size,
            main_pc
        );

        Ok(ObjectFile {
            chunk,
            data_size: self.data_size,
            main_pc,
        })
    }

    fn emit_decls(&mut self, decls: &[Decl<'_>]) -> Result<()> {
        for decl in decls {
            if let Decl::Class(class) = decl {
                self.emit_class(class)?;
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Symbol access
    // ==========================================================================

    fn obj(&self, id: SymbolId) -> &Obj {
        self.table.obj(id)
    }

    /// The symbol the analyzer recorded for a designator.
    fn symbol(&self, d: &Designator<'_>) -> Result<SymbolId> {
        self.annotations.require_symbol(d.id, d.span)
    }

    /// Code address of an emitted method.
    fn code_address(&self, method: SymbolId) -> Result<usize> {
        let obj = self.obj(method);
        if obj.address < 0 {
            return Err(GenerationError::MissingAttribute {
                name: obj.name.clone(),
                detail: "has no code address".to_string(),
            });
        }
        Ok(obj.address as usize)
    }
}
