//! Type error types (spec §4.5, §7). Every variant carries enough context
//! to build one of the stable `SIGIL-TYPE-*` diagnostics.

use std::fmt;

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::effect::Effect;
use sigil_common::span::Span;

use crate::ty::Ty;

#[derive(Clone, Debug)]
pub enum TypeError {
    Mismatch { expected: Ty, found: Ty, span: Span },
    ArityMismatch { expected: usize, found: usize, span: Span },
    UnboundVariable { name: String, span: Span },
    UnboundType { name: String, span: Span },
    NotAFunction { found: Ty, span: Span },
    EmptyListNeedsAnnotation { span: Span },
    EffectMismatch { undeclared: Vec<Effect>, span: Span },
    NonExhaustiveMatch { missing: Vec<String>, span: Span },
    MutableAlias { name: String, span: Span },
    ModuleNotExported { module: String, member: String, candidates: Vec<String>, span: Span },
    UnknownConstructor { name: String, span: Span },
    MissingRecordField { field: String, span: Span },
}

impl TypeError {
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::Mismatch { .. } => "SIGIL-TYPE-MISMATCH",
            TypeError::ArityMismatch { .. } => "SIGIL-TYPE-ARITY-MISMATCH",
            TypeError::UnboundVariable { .. } => "SIGIL-TYPE-UNBOUND-VARIABLE",
            TypeError::UnboundType { .. } => "SIGIL-TYPE-UNBOUND-TYPE",
            TypeError::NotAFunction { .. } => "SIGIL-TYPE-NOT-A-FUNCTION",
            TypeError::EmptyListNeedsAnnotation { .. } => "SIGIL-TYPE-EMPTY-LIST-UNANNOTATED",
            TypeError::EffectMismatch { .. } => "SIGIL-TYPE-EFFECT-MISMATCH",
            TypeError::NonExhaustiveMatch { .. } => "SIGIL-TYPE-NON-EXHAUSTIVE-MATCH",
            TypeError::MutableAlias { .. } => "SIGIL-TYPE-MUTABLE-ALIAS",
            TypeError::ModuleNotExported { .. } => "SIGIL-TYPE-MODULE-NOT-EXPORTED",
            TypeError::UnknownConstructor { .. } => "SIGIL-TYPE-UNKNOWN-CONSTRUCTOR",
            TypeError::MissingRecordField { .. } => "SIGIL-TYPE-MISSING-FIELD",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::UnboundVariable { span, .. }
            | TypeError::UnboundType { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::EmptyListNeedsAnnotation { span }
            | TypeError::EffectMismatch { span, .. }
            | TypeError::NonExhaustiveMatch { span, .. }
            | TypeError::MutableAlias { span, .. }
            | TypeError::ModuleNotExported { span, .. }
            | TypeError::UnknownConstructor { span, .. }
            | TypeError::MissingRecordField { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch { expected, found, .. } => write!(f, "expected `{expected}`, found `{found}`"),
            TypeError::ArityMismatch { expected, found, .. } => {
                write!(f, "expected {expected} argument(s), found {found}")
            }
            TypeError::UnboundVariable { name, .. } => write!(f, "unbound variable `{name}`"),
            TypeError::UnboundType { name, .. } => write!(f, "unbound type `{name}`"),
            TypeError::NotAFunction { found, .. } => write!(f, "`{found}` is not callable"),
            TypeError::EmptyListNeedsAnnotation { .. } => {
                write!(f, "empty list literal needs a type ascription, e.g. `([] : List[T])`")
            }
            TypeError::EffectMismatch { undeclared, .. } => {
                write!(f, "undeclared effects: {}", undeclared.iter().map(|e| e.name()).collect::<Vec<_>>().join(", "))
            }
            TypeError::NonExhaustiveMatch { missing, .. } => {
                write!(f, "non-exhaustive match, missing: {}", missing.join(", "))
            }
            TypeError::MutableAlias { name, .. } => write!(f, "cannot alias mutable parameter `{name}` via a let binding"),
            TypeError::ModuleNotExported { module, member, .. } => {
                write!(f, "`{module}` does not export `{member}`")
            }
            TypeError::UnknownConstructor { name, .. } => write!(f, "unknown constructor `{name}`"),
            TypeError::MissingRecordField { field, .. } => write!(f, "missing record field `{field}`"),
        }
    }
}

impl std::error::Error for TypeError {}

impl From<TypeError> for Diagnostic {
    fn from(err: TypeError) -> Self {
        let code = err.code();
        let span = err.span();
        match &err {
            TypeError::Mismatch { expected, found, .. } => Diagnostic::new(code, Phase::Typechecker, err.to_string())
                .with_span(span)
                .with_found_expected(found.to_string(), expected.to_string()),
            TypeError::EffectMismatch { undeclared, .. } => Diagnostic::new(code, Phase::Typechecker, err.to_string())
                .with_span(span)
                .with_details(serde_json::json!({
                    "undeclaredEffects": undeclared.iter().map(|e| e.name()).collect::<Vec<_>>(),
                })),
            TypeError::NonExhaustiveMatch { missing, .. } => Diagnostic::new(code, Phase::Typechecker, err.to_string())
                .with_span(span)
                .with_details(serde_json::json!({ "missingPatterns": missing })),
            TypeError::ModuleNotExported { member, candidates, .. } => {
                let mut diag = Diagnostic::new(code, Phase::Typechecker, err.to_string()).with_span(span);
                diag = diag.with_suggestion("export_member", format!("export `{member}`"), None);
                diag = diag.with_suggestion(
                    "select_exported_member",
                    format!("choose one of: {}", candidates.join(", ")),
                    None,
                );
                diag
            }
            _ => Diagnostic::new(code, Phase::Typechecker, err.to_string()).with_span(span),
        }
    }
}
