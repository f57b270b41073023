//! Link-time extern diagnostics (spec §4.6).

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum ExternError {
    /// The host module named by an `ExternDecl` could not be dynamically
    /// loaded (missing file, syntax error, thrown top-level exception).
    ModuleLoadFailed { specifier: String, message: String, span: Span },
    /// A namespace-member access has no matching export on the loaded
    /// module object.
    UnknownMember { namespace: String, member: String, candidates: Vec<String>, span: Span },
}

impl ExternError {
    pub fn code(&self) -> &'static str {
        match self {
            ExternError::ModuleLoadFailed { .. } => "SIGIL-LINK-MODULE-LOAD-FAILED",
            ExternError::UnknownMember { .. } => "SIGIL-LINK-UNKNOWN-MEMBER",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ExternError::ModuleLoadFailed { span, .. } => *span,
            ExternError::UnknownMember { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for ExternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExternError::ModuleLoadFailed { specifier, message, .. } => {
                write!(f, "failed to load host module '{}': {}", specifier, message)
            }
            ExternError::UnknownMember { namespace, member, .. } => {
                write!(f, "'{}' has no member '{}'", namespace, member)
            }
        }
    }
}

impl std::error::Error for ExternError {}

impl From<ExternError> for Diagnostic {
    fn from(err: ExternError) -> Self {
        let code = err.code();
        let span = err.span();
        let message = err.to_string();
        let mut diag = Diagnostic::new(code, Phase::Linker, message).with_span(span);
        if let ExternError::UnknownMember { member, candidates, .. } = &err {
            diag = diag.with_found_expected(member.clone(), candidates.join(", "));
            for candidate in candidates {
                diag = diag.with_suggestion("replace_symbol", format!("did you mean '{}'?", candidate), None);
            }
        }
        diag
    }
}
