//! Codegen diagnostics (spec §4.7). Emission runs over an already
//! canonical, type-checked AST, so failures here are rare — they cover
//! shapes the earlier stages don't themselves forbid (an unannotated
//! empty list reaching emission, an unresolved qualified path).

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum CodegenError {
    UnresolvedQualifiedPath { path: String, span: Span },
}

impl CodegenError {
    pub fn code(&self) -> &'static str {
        match self {
            CodegenError::UnresolvedQualifiedPath { .. } => "SIGIL-CODEGEN-UNRESOLVED-PATH",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CodegenError::UnresolvedQualifiedPath { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenError::UnresolvedQualifiedPath { path, .. } => write!(f, "cannot resolve qualified path '{}'", path),
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<CodegenError> for Diagnostic {
    fn from(err: CodegenError) -> Self {
        let code = err.code();
        let span = err.span();
        Diagnostic::new(code, Phase::Codegen, err.to_string()).with_span(span)
    }
}
