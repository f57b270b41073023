//! Parse error types for the Sigil parser.

use std::fmt;

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::Span;

/// A parse error with a stable code, location, and optional related span.
///
/// Parse errors carry the primary span where the problem was detected, a
/// human-readable message, and an optional related span for context (e.g.,
/// "opened here" for unclosed delimiters).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Stable `SIGIL-PARSE-*` code identifying the rule that was violated.
    pub code: &'static str,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Primary source location where the error was detected.
    pub span: Span,
    /// Optional related location with context message (e.g., "block started here").
    pub related: Option<(String, Span)>,
}

impl ParseError {
    /// Create a new parse error with a code, message and span.
    pub fn new(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            related: None,
        }
    }

    /// Create a parse error with a related span for additional context.
    pub fn with_related(
        code: &'static str,
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        let mut diag = Diagnostic::new(err.code, Phase::Parser, err.message).with_span(err.span);
        if let Some((msg, span)) = err.related {
            diag = diag.with_suggestion("related", msg, Some(span));
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_new() {
        let err = ParseError::new("SIGIL-PARSE-EXPECTED-EXPR", "expected expression", Span::new(5, 10));
        assert_eq!(err.message, "expected expression");
        assert_eq!(err.span, Span::new(5, 10));
        assert!(err.related.is_none());
    }

    #[test]
    fn parse_error_with_related() {
        let err = ParseError::with_related(
            "SIGIL-PARSE-UNCLOSED-DELIM",
            "expected `)` to close parameter list",
            Span::new(50, 53),
            "opened here",
            Span::new(10, 12),
        );
        assert_eq!(err.message, "expected `)` to close parameter list");
        assert_eq!(err.span, Span::new(50, 53));
        let (msg, span) = err.related.unwrap();
        assert_eq!(msg, "opened here");
        assert_eq!(span, Span::new(10, 12));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::new("SIGIL-PARSE-UNEXPECTED-TOKEN", "unexpected token", Span::new(0, 1));
        assert_eq!(err.to_string(), "unexpected token");
    }

    #[test]
    fn parse_error_converts_to_diagnostic() {
        let err = ParseError::new("SIGIL-PARSE-EXPECTED-EXPR", "expected expression", Span::new(5, 10));
        let diag: Diagnostic = err.into();
        assert_eq!(diag.code, "SIGIL-PARSE-EXPECTED-EXPR");
        assert_eq!(diag.phase, Phase::Parser);
    }
}
