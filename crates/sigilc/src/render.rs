//! Human-readable stderr rendering of a single diagnostic against its
//! originating source text, for commands that hold both in hand.

use ariadne::{Label, Report, ReportKind, Source};

use sigil_common::diagnostic::Diagnostic;

pub fn eprint_diagnostic(source: &str, diag: &Diagnostic) {
    let (start, end) = match diag.span {
        Some(span) => (span.start as usize, (span.end as usize).max(span.start as usize + 1)),
        None => (0, source.len().max(1)),
    };
    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message(format!("{} {}", diag.code, diag.message))
        .with_label(Label::new(start..end).with_message(&diag.message))
        .finish()
        .eprint(Source::from(source));
}
