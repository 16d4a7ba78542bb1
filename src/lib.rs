//! MicroJava compiler back end.
//!
//! Takes a parsed [`Program`] through semantic analysis and, when the
//! program is free of errors, code generation for the MicroJava VM.
//!
//! ```
//! use bumpalo::Bump;
//! use mjc::ast::AstBuilder;
//! use mjc::Compiler;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.method(None, "main", &[], &[], &[b.print(b.int(42), None)]);
//! let program = b.program("Hello", &[], &[], &[main]);
//!
//! let result = Compiler::new().compile(program).unwrap();
//! assert!(result.is_success());
//! let object = result.into_object().unwrap();
//! assert_eq!(&object.to_bytes()[..2], b"MJ");
//! ```

pub use mjc_ast as ast;
pub use mjc_ast::Program;
pub use mjc_compiler::{
    AnalysisOutput, AnalysisPass, BytecodeChunk, CodegenPass, CompilerOptions, ObjectFile, OpCode,
    bytecode, emit, symbols,
};
pub use mjc_core::{
    CompilationError, Diagnostic, GenerationError, MjcError, Severity, Span,
};

/// Result of compiling one program.
#[derive(Debug)]
pub struct CompilationResult {
    /// The object file; `None` when analysis reported errors.
    pub object: Option<ObjectFile>,
    /// Every diagnostic in the order it was reported.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of error diagnostics.
    pub error_count: usize,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.error_count == 0 && self.object.is_some()
    }

    /// The error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// The object file, or the number of semantic errors that prevented it.
    pub fn into_object(self) -> Result<ObjectFile, MjcError> {
        self.object.ok_or(MjcError::Semantic {
            count: self.error_count,
        })
    }
}

/// The main compiler entry point.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// A compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler with the given options.
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a program.
    ///
    /// Semantic errors are reported in the result and suppress code
    /// generation. A `GenerationError` means the generator itself failed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &Program<'_>) -> Result<CompilationResult, GenerationError> {
        let mut analysis = AnalysisPass::new(&self.options).run(program);

        if analysis.has_errors() {
            log::warn!(
                "'{}': {} error(s), no code generated",
                program.name.name,
                analysis.error_count
            );
            return Ok(CompilationResult {
                object: None,
                diagnostics: analysis.diagnostics,
                error_count: analysis.error_count,
            });
        }

        let object = CodegenPass::new(&mut analysis, &self.options).run(program)?;
        log::info!(
            "'{}' compiled: {} byte(s) of code",
            program.name.name,
            object.chunk.len()
        );

        Ok(CompilationResult {
            object: Some(object),
            diagnostics: analysis.diagnostics,
            error_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use mjc_ast::AstBuilder;

    #[test]
    fn errors_suppress_the_object() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.method(None, "main", &[], &[], &[b.print(b.name("nope"), None)]);
        let result = Compiler::new().compile(b.program("P", &[], &[], &[main])).unwrap();

        assert!(!result.is_success());
        assert_eq!(result.errors().count(), 1);
        assert!(matches!(
            result.into_object(),
            Err(MjcError::Semantic { count: 1 })
        ));
    }

    #[test]
    fn missing_main_can_be_allowed() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("Lib", &[], &[], &[]);

        let strict = Compiler::new().compile(program).unwrap();
        assert!(!strict.is_success());

        let lenient = Compiler::with_options(CompilerOptions::without_main())
            .compile(program)
            .unwrap();
        let object = lenient.into_object().unwrap();
        assert_eq!(object.main_pc, 0);
    }
}
