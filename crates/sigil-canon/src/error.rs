//! Canonical-validator diagnostics (spec §4.4). Each rule has a stable
//! `SIGIL-CANON-*` code; the validator reports the first violation in
//! traversal order rather than collecting every defect.

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum CanonError {
    /// A declaration's category (type/extern/import/const/function/test)
    /// appears out of the mandated order.
    DeclOrder { name: String, span: Span },
    /// An exported declaration precedes a non-exported one in the same
    /// category.
    DeclVisibility { name: String, span: Span },
    /// Two declarations in the same visibility bucket are not in
    /// code-point order.
    DeclAlphabetical { name: String, previous: String, span: Span },
    /// Two imports are not sorted by canonical dotted path.
    ImportOrder { path: String, previous: String, span: Span },
    /// A typed extern's members are not alphabetical.
    ExternMemberOrder { member: String, previous: String, span: Span },
    /// Two declarations in the same category share a name.
    DuplicateDecl { name: String, span: Span },
    /// A recursive parameter is combined with another parameter through
    /// `*`, `+`, or concatenation on some call site.
    RecursionAccumulator { function: String, param: String, span: Span },
    /// A single collection-typed parameter is threaded through recursion
    /// without being destructured, or via a fixed-size pattern.
    RecursionCollectionState { function: String, span: Span },
    /// A recursive function returns a function type.
    RecursionCps { function: String, span: Span },
    /// A match scrutinizes a boolean expression over a parameter instead
    /// of matching the parameter's value directly.
    PatternBoolean { function: String, span: Span },
    /// A `.lib.sig` file declares `main`.
    LibDeclaresMain { span: Span },
    /// An entry file does not declare `main`.
    EntryMissingMain,
}

impl CanonError {
    pub fn code(&self) -> &'static str {
        match self {
            CanonError::DeclOrder { .. } => "SIGIL-CANON-DECL-ORDER",
            CanonError::DeclVisibility { .. } => "SIGIL-CANON-DECL-VISIBILITY",
            CanonError::DeclAlphabetical { .. } => "SIGIL-CANON-DECL-ALPHABETICAL",
            CanonError::ImportOrder { .. } => "SIGIL-CANON-IMPORT-ORDER",
            CanonError::ExternMemberOrder { .. } => "SIGIL-CANON-EXTERN-MEMBER-ORDER",
            CanonError::DuplicateDecl { .. } => "SIGIL-CANON-DUPLICATE-DECL",
            CanonError::RecursionAccumulator { .. } => "SIGIL-CANON-RECURSION-ACCUMULATOR",
            CanonError::RecursionCollectionState { .. } => "SIGIL-CANON-RECURSION-COLLECTION-STATE",
            CanonError::RecursionCps { .. } => "SIGIL-CANON-RECURSION-CPS",
            CanonError::PatternBoolean { .. } => "SIGIL-CANON-PATTERN-BOOLEAN",
            CanonError::LibDeclaresMain { .. } => "SIGIL-CANON-LIB-NO-MAIN",
            CanonError::EntryMissingMain => "SIGIL-CANON-ENTRY-NO-MAIN",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CanonError::DeclOrder { span, .. }
            | CanonError::DeclVisibility { span, .. }
            | CanonError::DeclAlphabetical { span, .. }
            | CanonError::ImportOrder { span, .. }
            | CanonError::ExternMemberOrder { span, .. }
            | CanonError::DuplicateDecl { span, .. }
            | CanonError::RecursionAccumulator { span, .. }
            | CanonError::RecursionCollectionState { span, .. }
            | CanonError::RecursionCps { span, .. }
            | CanonError::PatternBoolean { span, .. }
            | CanonError::LibDeclaresMain { span } => Some(*span),
            CanonError::EntryMissingMain => None,
        }
    }
}

impl std::fmt::Display for CanonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonError::DeclOrder { name, .. } => write!(f, "'{}' is out of declaration-category order", name),
            CanonError::DeclVisibility { name, .. } => write!(f, "exported declaration '{}' precedes a non-exported one in its category", name),
            CanonError::DeclAlphabetical { name, previous, .. } => {
                write!(f, "'{}' must sort before '{}' by code-point order", previous, name)
            }
            CanonError::ImportOrder { path, previous, .. } => write!(f, "import '{}' must sort before '{}'", previous, path),
            CanonError::ExternMemberOrder { member, previous, .. } => {
                write!(f, "extern member '{}' must sort before '{}'", previous, member)
            }
            CanonError::DuplicateDecl { name, .. } => write!(f, "'{}' is declared more than once", name),
            CanonError::RecursionAccumulator { function, param, .. } => {
                write!(f, "parameter '{}' of '{}' is used as an accumulator", param, function)
            }
            CanonError::RecursionCollectionState { function, .. } => {
                write!(f, "'{}' threads its collection parameter as encoded state instead of structural recursion", function)
            }
            CanonError::RecursionCps { function, .. } => write!(f, "'{}' is recursive and returns a function type", function),
            CanonError::PatternBoolean { function, .. } => {
                write!(f, "'{}' matches a boolean expression where direct value matching is possible", function)
            }
            CanonError::LibDeclaresMain { .. } => write!(f, "library file declares 'main'"),
            CanonError::EntryMissingMain => write!(f, "entry file does not declare 'main'"),
        }
    }
}

impl std::error::Error for CanonError {}

impl From<CanonError> for Diagnostic {
    fn from(err: CanonError) -> Self {
        let code = err.code();
        let span = err.span();
        let message = err.to_string();
        let mut diag = Diagnostic::new(code, Phase::Canonical, message);
        if let Some(span) = span {
            diag = diag.with_span(span);
        }
        match &err {
            CanonError::RecursionAccumulator { param, .. } => {
                diag = diag
                    .with_details(serde_json::json!({ "accumulatorParams": [param] }))
                    .with_suggestion("remove_accumulator_parameter", format!("rewrite '{}' without threading an accumulator", param), None);
            }
            CanonError::DeclAlphabetical { .. } | CanonError::ImportOrder { .. } | CanonError::ExternMemberOrder { .. } => {
                diag = diag.with_suggestion("reorder_declaration", "reorder to match the canonical sort", None);
            }
            CanonError::PatternBoolean { .. } => {
                diag = diag.with_suggestion("use_direct_value_match", "match the parameter's value directly", None);
            }
            _ => {}
        }
        diag
    }
}
