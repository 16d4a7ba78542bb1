//! Compiler configuration.

/// Knobs for a compiler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Maximum size of the emitted code in bytes.
    pub code_limit: usize,
    /// Record info diagnostics (declarations, resolved usages).
    pub report_info: bool,
    /// Reject programs without a global `void main()`.
    pub require_main: bool,
}

impl CompilerOptions {
    /// Default code size limit of the MicroJava VM.
    pub const DEFAULT_CODE_LIMIT: usize = 8192;

    /// Options for compiling library-like fragments without an entry point.
    pub fn without_main() -> Self {
        Self {
            require_main: false,
            ..Self::default()
        }
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            code_limit: Self::DEFAULT_CODE_LIMIT,
            report_info: false,
            require_main: true,
        }
    }
}
