//! Surface-form validator (spec §4.1): whole-file textual rules that run
//! before tokenization. Failure is fatal -- the lexer never sees
//! non-canonical source.

use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::{LineIndex, Span};

pub fn validate(source: &str) -> Result<(), Diagnostic> {
    if source.is_empty() || !source.ends_with('\n') {
        let end = source.len() as u32;
        return Err(surface_error(
            "SIGIL-SURFACE-EOF-NEWLINE",
            "file must end with a single newline",
            Span::new(end, end),
        ));
    }
    if source.ends_with("\n\n") {
        let end = source.len() as u32;
        return Err(surface_error(
            "SIGIL-SURFACE-EOF-NEWLINE",
            "file must end with exactly one newline, not multiple",
            Span::new(end - 1, end),
        ));
    }

    let mut blank_run = 0u32;
    let mut line_start = 0usize;
    let bytes = source.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\t' => {
                return Err(surface_error(
                    "SIGIL-SURFACE-TAB",
                    "tab characters are forbidden",
                    Span::new(i as u32, i as u32 + 1),
                ));
            }
            b'\r' => {
                let followed_by_newline = bytes.get(i + 1) == Some(&b'\n');
                if !followed_by_newline {
                    return Err(surface_error(
                        "SIGIL-SURFACE-CRLF",
                        "lone carriage return is forbidden",
                        Span::new(i as u32, i as u32 + 1),
                    ));
                }
            }
            b'\n' => {
                let line = &source[line_start..i];
                if line.ends_with(' ') || line.ends_with('\t') {
                    return Err(surface_error(
                        "SIGIL-SURFACE-TRAILING-WHITESPACE",
                        "line must not end with space or tab",
                        Span::new(i as u32, i as u32 + 1),
                    ));
                }
                if line.is_empty() {
                    blank_run += 1;
                    if blank_run >= 2 {
                        return Err(surface_error(
                            "SIGIL-SURFACE-BLANK-LINES",
                            "no two consecutive blank lines",
                            Span::new(i as u32, i as u32 + 1),
                        ));
                    }
                } else {
                    blank_run = 0;
                }
                line_start = i + 1;
            }
            _ => {}
        }
    }

    Ok(())
}

fn surface_error(code: &str, message: &str, span: Span) -> Diagnostic {
    Diagnostic::new(code, Phase::Surface, message).with_span(span)
}

/// Resolve a diagnostic's byte span into line/column, for human-mode output.
pub fn locate(source: &str, diag: &Diagnostic) -> Option<(sigil_common::LineCol, sigil_common::LineCol)> {
    let span = diag.span?;
    Some(LineIndex::new(source).resolve(span))
}
