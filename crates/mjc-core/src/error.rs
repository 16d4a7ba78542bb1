//! Error types for the MicroJava back end.
//!
//! ## Error Hierarchy
//!
//! ```text
//! MjcError (top-level wrapper)
//! ├── CompilationError - static-semantics violations, accumulated by the analyzer
//! └── GenerationError  - code generator failures, fatal on first occurrence
//! ```
//!
//! `CompilationError`s are user input errors: the analyzer records every one of
//! them and keeps walking the tree. `GenerationError`s (apart from
//! `ProgramTooLarge`) are broken internal invariants and stop the run.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors found while checking the static semantics of a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    // ------------------------------------------------------------------
    // Declaration errors
    // ------------------------------------------------------------------
    /// A name was declared twice in the same scope.
    #[error("name '{name}' already declared")]
    DuplicateName {
        /// The duplicated name.
        name: String,
        /// Where the second declaration occurred.
        span: Span,
    },

    /// A declaration reuses the name of a visible type.
    #[error("name '{name}' masks a type")]
    NameMasksType {
        /// The offending name.
        name: String,
        /// Where the declaration occurred.
        span: Span,
    },

    /// A referenced name is not declared anywhere in scope.
    #[error("name '{name}' is not declared")]
    UndeclaredName {
        /// The name that wasn't found.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    /// The program has no `void main()` entry point.
    #[error("program has no 'void main()' method")]
    MissingMain {
        /// Location of the program header.
        span: Span,
    },

    // ------------------------------------------------------------------
    // Type errors
    // ------------------------------------------------------------------
    /// A type reference could not be resolved.
    #[error("type '{name}' does not exist")]
    UnknownType {
        /// The type name as written.
        name: String,
        /// Where the type was referenced.
        span: Span,
    },

    /// Operand or value types do not fit the construct.
    #[error("{message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Where the mismatch occurred.
        span: Span,
    },

    /// The destination of a store is not a variable, field or array element.
    #[error("'{name}' cannot be assigned to")]
    NotAssignable {
        /// The designator's name.
        name: String,
        /// Where the store occurred.
        span: Span,
    },

    /// A condition factor is not of type bool.
    #[error("condition must be of type bool")]
    NonBoolCondition {
        /// Where the condition occurred.
        span: Span,
    },

    /// A call passes the wrong number of arguments.
    #[error("'{name}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        /// The method name.
        name: String,
        /// Declared parameter count (receiver included).
        expected: usize,
        /// Actual argument count (receiver included).
        got: usize,
        /// Where the call occurred.
        span: Span,
    },

    /// An argument is not assignable to its parameter.
    #[error("argument {position} of '{name}' has an incompatible type")]
    ArgumentTypeMismatch {
        /// The method name.
        name: String,
        /// Zero-based parameter position (receiver is position 0).
        position: usize,
        /// Where the call occurred.
        span: Span,
    },

    /// A method redeclares an inherited method with a different signature.
    #[error("method '{name}' does not match the overridden signature: {message}")]
    InvalidOverride {
        /// The method name.
        name: String,
        /// What differs.
        message: String,
        /// Where the method was declared.
        span: Span,
    },

    /// Something other than a method was called.
    #[error("'{name}' is not a method")]
    NotAMethod {
        /// The callee's name.
        name: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A member access names a member the class does not have.
    #[error("'{owner}' has no member '{name}'")]
    UnknownMember {
        /// The class (or type) that was searched.
        owner: String,
        /// The missing member.
        name: String,
        /// Where the access occurred.
        span: Span,
    },

    /// Reference operands compared with an ordering operator.
    #[error("references can only be compared with '==' or '!='")]
    ReferenceComparison {
        /// Where the comparison occurred.
        span: Span,
    },

    /// An instance member was used from a static method.
    #[error("instance member '{name}' used in a static context")]
    InstanceMemberInStaticContext {
        /// The member name.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    // ------------------------------------------------------------------
    // Control flow errors
    // ------------------------------------------------------------------
    /// `break` outside of any loop.
    #[error("break statement not inside a loop")]
    BreakOutsideLoop {
        /// Where the statement occurred.
        span: Span,
    },

    /// `continue` outside of any loop.
    #[error("continue statement not inside a loop")]
    ContinueOutsideLoop {
        /// Where the statement occurred.
        span: Span,
    },

    /// A non-void method never returns a value.
    #[error("method '{name}' must return a value")]
    MissingReturn {
        /// The method name.
        name: String,
        /// Where the method was declared.
        span: Span,
    },

    /// A return statement does not fit the method's return type.
    #[error("{message}")]
    InvalidReturn {
        /// Description of the problem.
        message: String,
        /// Where the return occurred.
        span: Span,
    },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::DuplicateName { span, .. } => *span,
            CompilationError::NameMasksType { span, .. } => *span,
            CompilationError::UndeclaredName { span, .. } => *span,
            CompilationError::MissingMain { span } => *span,
            CompilationError::UnknownType { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::NotAssignable { span, .. } => *span,
            CompilationError::NonBoolCondition { span } => *span,
            CompilationError::ArgumentCountMismatch { span, .. } => *span,
            CompilationError::ArgumentTypeMismatch { span, .. } => *span,
            CompilationError::InvalidOverride { span, .. } => *span,
            CompilationError::NotAMethod { span, .. } => *span,
            CompilationError::UnknownMember { span, .. } => *span,
            CompilationError::ReferenceComparison { span } => *span,
            CompilationError::InstanceMemberInStaticContext { span, .. } => *span,
            CompilationError::BreakOutsideLoop { span } => *span,
            CompilationError::ContinueOutsideLoop { span } => *span,
            CompilationError::MissingReturn { span, .. } => *span,
            CompilationError::InvalidReturn { span, .. } => *span,
        }
    }
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Errors raised by the code generator.
///
/// Everything except [`GenerationError::ProgramTooLarge`] and
/// [`GenerationError::OperandOutOfRange`] means the analyzer let through a
/// tree it should have rejected, or the generator itself lost track of its
/// jump bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A fix-up list was popped when none was open, or left open at the end.
    #[error("internal: fix-up stack imbalance: {detail}")]
    FixupImbalance {
        /// Which list and what went wrong.
        detail: String,
    },

    /// A control construct was driven through its states out of order.
    #[error("internal: construct in state {state} cannot {action}")]
    InvalidConstructState {
        /// The state the construct was in.
        state: &'static str,
        /// The transition that was attempted.
        action: &'static str,
    },

    /// A symbol lacks something the generator needs to emit code for it.
    #[error("internal: symbol '{name}' {detail}")]
    MissingAttribute {
        /// The symbol's name.
        name: String,
        /// What is missing.
        detail: String,
    },

    /// An AST node was never annotated by the analyzer.
    #[error("internal: node {node} at {span} has no {what} annotation")]
    MissingAnnotation {
        /// The node id.
        node: u32,
        /// Which annotation was expected.
        what: &'static str,
        /// Location of the node.
        span: Span,
    },

    /// The emitted code exceeds the configured size limit.
    #[error("program too large: {size} bytes of code, limit is {limit}")]
    ProgramTooLarge {
        /// Emitted code size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A value does not fit the operand that encodes it: a jump or call
    /// displacement beyond 16 bits, a slot beyond a byte.
    #[error("{what} {value} does not fit its operand")]
    OperandOutOfRange {
        /// What the operand encodes.
        what: &'static str,
        /// The value that did not fit.
        value: i64,
    },
}

impl GenerationError {
    /// Whether this error is an internal invariant violation rather than a
    /// property of the input program.
    pub fn is_internal(&self) -> bool {
        !matches!(
            self,
            GenerationError::ProgramTooLarge { .. } | GenerationError::OperandOutOfRange { .. }
        )
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for a compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MjcError {
    /// Semantic analysis found errors; no object output was produced.
    #[error("semantic analysis failed with {count} error(s)")]
    Semantic {
        /// Number of reported errors.
        count: usize,
    },

    /// Code generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl MjcError {
    /// Check if this is a semantic failure.
    pub fn is_semantic(&self) -> bool {
        matches!(self, MjcError::Semantic { .. })
    }

    /// Check if this is a generation failure.
    pub fn is_generation(&self) -> bool {
        matches!(self, MjcError::Generation(_))
    }
}
