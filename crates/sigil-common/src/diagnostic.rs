//! The stable diagnostic envelope shared by every compiler phase and
//! surfaced verbatim by the CLI (spec §7).

use serde::Serialize;

use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Surface,
    Lexer,
    Parser,
    Canonical,
    Typechecker,
    Linker,
    Codegen,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Surface => "surface",
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Canonical => "canonical",
            Phase::Typechecker => "typechecker",
            Phase::Linker => "linker",
            Phase::Codegen => "codegen",
        }
    }
}

/// A machine-readable recovery hint attached to a diagnostic.
#[derive(Clone, Debug, Serialize)]
pub struct Suggestion {
    pub kind: String,
    pub message: String,
    pub span: Option<Span>,
}

/// An exact text edit a tool could apply to fix a diagnostic.
#[derive(Clone, Debug, Serialize)]
pub struct Fixit {
    pub span: Span,
    pub replacement: String,
}

/// A single structured diagnostic, per spec §7's `error` shape.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub span: Option<Span>,
    pub found: Option<String>,
    pub expected: Option<String>,
    pub details: Option<serde_json::Value>,
    pub fixits: Vec<Fixit>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Diagnostic {
            code: code.into(),
            phase,
            message: message.into(),
            span: None,
            found: None,
            expected: None,
            details: None,
            fixits: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_found_expected(mut self, found: impl Into<String>, expected: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self.expected = Some(expected.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, kind: impl Into<String>, message: impl Into<String>, span: Option<Span>) -> Self {
        self.suggestions.push(Suggestion { kind: kind.into(), message: message.into(), span });
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Status of one executed test (spec §6 `TestResult`).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct Assertion {
    pub kind: String,
    pub operator: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Failure {
    #[serde(rename = "assert_false")]
    AssertFalse,
    #[serde(rename = "comparison_mismatch")]
    ComparisonMismatch {
        operator: String,
        actual: String,
        expected: String,
        diff_hint: Option<String>,
    },
    #[serde(rename = "exception")]
    Exception { message: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub file: String,
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub location: Span,
    pub declared_effects: Vec<String>,
    pub assertion: Option<Assertion>,
    pub failure: Option<Failure>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files: usize,
    pub discovered: usize,
    pub selected: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// The top-level stable JSON contract written to stdout by the CLI.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub format_version: u32,
    pub command: String,
    pub ok: bool,
    pub phase: Option<Phase>,
    pub data: Option<serde_json::Value>,
    pub error: Option<Diagnostic>,
    pub summary: Option<Summary>,
    pub results: Option<Vec<TestResult>>,
}

impl Envelope {
    pub fn success(command: impl Into<String>, data: serde_json::Value) -> Self {
        Envelope {
            format_version: 1,
            command: command.into(),
            ok: true,
            phase: None,
            data: Some(data),
            error: None,
            summary: None,
            results: None,
        }
    }

    pub fn failure(command: impl Into<String>, error: Diagnostic) -> Self {
        let phase = error.phase;
        Envelope {
            format_version: 1,
            command: command.into(),
            ok: false,
            phase: Some(phase),
            data: None,
            error: Some(error),
            summary: None,
            results: None,
        }
    }

    pub fn test_run(command: impl Into<String>, summary: Summary, results: Vec<TestResult>) -> Self {
        Envelope {
            format_version: 1,
            command: command.into(),
            ok: summary.failed == 0 && summary.errored == 0,
            phase: None,
            data: None,
            error: None,
            summary: Some(summary),
            results: Some(results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_serializes_ok_true() {
        let env = Envelope::success("lex", serde_json::json!({"tokens": []}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["formatVersion"], 1);
    }

    #[test]
    fn envelope_failure_carries_phase_and_code() {
        let diag = Diagnostic::new("SIGIL-CANON-RECURSION-ACCUMULATOR", Phase::Canonical, "accumulator detected")
            .with_details(serde_json::json!({"accumulatorParams": ["acc"]}));
        let env = Envelope::failure("compile", diag);
        assert!(!env.ok);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["error"]["code"], "SIGIL-CANON-RECURSION-ACCUMULATOR");
        assert_eq!(v["phase"], "canonical");
    }
}
