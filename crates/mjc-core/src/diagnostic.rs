//! Diagnostics produced by the compiler passes.
//!
//! A [`Diagnostic`] pairs a message with a severity and the source line it
//! refers to. Every diagnostic is also routed to the `log` facade when it is
//! recorded, so a driver only has to install a logger to see them.

use std::fmt;

use crate::{CompilationError, Span};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational note (declarations recognised, usages resolved).
    Info,
    /// A static-semantics violation; the compile fails.
    Error,
}

/// A message reported by the analyzer or generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the message.
    pub severity: Severity,
    /// The message text, without location.
    pub message: String,
    /// Where the message points.
    pub span: Span,
    /// The structured error, for error diagnostics.
    pub error: Option<CompilationError>,
}

impl Diagnostic {
    /// Create an info diagnostic.
    pub fn info(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            span,
            error: None,
        }
    }

    /// Create an error diagnostic from a compilation error.
    pub fn error(error: CompilationError) -> Self {
        Self {
            severity: Severity::Error,
            message: error.to_string(),
            span: error.span(),
            error: Some(error),
        }
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The source line, 0 if unknown.
    pub fn line(&self) -> u32 {
        self.span.line
    }

    /// Send this diagnostic to the `log` facade.
    pub fn log(&self) {
        match self.severity {
            Severity::Info => log::info!("{}", self),
            Severity::Error => log::error!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_known() {
            write!(f, "{} on line {}", self.message, self.span.line)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_line() {
        let diag = Diagnostic::info("Variable declared", Span::line(12));
        assert_eq!(diag.to_string(), "Variable declared on line 12");
        assert!(!diag.is_error());
    }

    #[test]
    fn display_without_line() {
        let diag = Diagnostic::error(CompilationError::BreakOutsideLoop {
            span: Span::default(),
        });
        assert_eq!(diag.to_string(), "break statement not inside a loop");
        assert!(diag.is_error());
        assert_eq!(diag.line(), 0);
    }

    #[test]
    fn error_keeps_structured_value() {
        let err = CompilationError::UndeclaredName {
            name: "y".to_string(),
            span: Span::line(3),
        };
        let diag = Diagnostic::error(err.clone());
        assert_eq!(diag.error, Some(err));
        assert_eq!(diag.line(), 3);
    }
}
