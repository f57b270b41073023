//! Canonical-form validator (spec §4.4). Runs after parsing, before type
//! checking, and rejects any program that is not its unique canonical
//! form. The first violation found in a deterministic traversal order is
//! the one reported; there is no local recovery.

pub mod error;
pub mod file_purpose;
pub mod ordering;
pub mod recursion;
pub mod patterns;

pub use error::CanonError;

use sigil_parser::ast::decl::{Decl, SourceFile};

/// Runs every canonical-form rule over `file`, in the order the spec
/// lists them, stopping at the first violation. `path` is the file's
/// project-relative path, used for the `.lib.sig` rule.
pub fn check_source_file(file: &SourceFile, path: &str) -> Result<(), CanonError> {
    ordering::check_declaration_order(&file.decls)?;
    ordering::check_duplicates(&file.decls)?;

    for decl in &file.decls {
        if let Decl::Function(f) = decl {
            recursion::check_function(f)?;
            patterns::check_function(f)?;
        }
    }

    file_purpose::check_lib_file(file, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_lexer::lex;

    fn parse(src: &str) -> SourceFile {
        let tokens = lex(src).expect("lex");
        sigil_parser::parse(src, tokens).expect("parse")
    }

    #[test]
    fn factorial_module_is_canonical() {
        let file = parse("λfactorial(n:ℤ)→ℤ≡n{0→1|1→1|n→n*factorial(n-1)}\n");
        assert!(check_source_file(&file, "factorial.sig").is_ok());
    }

    #[test]
    fn out_of_order_declarations_are_rejected() {
        let file = parse("λb()→ℤ=1\nc d:ℤ=2\n");
        let err = check_source_file(&file, "m.sig").unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-DECL-ORDER");
    }
}
