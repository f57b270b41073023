//! Driver-level diagnostics: everything that can go wrong building and
//! ordering the module graph itself, before any per-module pipeline
//! stage runs. Per-stage failures (lex, parse, canon, typeck, extern,
//! codegen) convert straight to `Diagnostic` via each crate's own
//! `From` impl and pass through unchanged.

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::module_graph::CycleError;
use sigil_common::span::Span;

#[derive(Clone, Debug)]
pub enum DriverError {
    /// A module's import path resolves to itself.
    SelfImport { module: String, span: Span },
    /// The dependency graph contains a cycle.
    Cycle(CycleError),
    /// A resolved module path could not be read from disk.
    Io { path: String, message: String },
}

impl DriverError {
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::SelfImport { .. } => "SIGIL-LINK-MODULE-SELF-IMPORT",
            DriverError::Cycle(_) => "SIGIL-LINK-MODULE-CYCLE",
            DriverError::Io { .. } => "SIGIL-LINK-MODULE-IO",
        }
    }
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::SelfImport { module, .. } => write!(f, "module '{}' imports itself", module),
            DriverError::Cycle(cycle) => write!(f, "import cycle: {}", cycle),
            DriverError::Io { path, message } => write!(f, "failed to read '{}': {}", path, message),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<DriverError> for Diagnostic {
    fn from(err: DriverError) -> Self {
        let code = err.code();
        let span = match &err {
            DriverError::SelfImport { span, .. } => Some(*span),
            _ => None,
        };
        let mut diag = Diagnostic::new(code, Phase::Linker, err.to_string());
        if let Some(span) = span {
            diag = diag.with_span(span);
        }
        diag
    }
}
