//! File-purpose rule (spec §4.4 "File purpose"). Library units (paths
//! ending `.lib.sig`) must not declare `main`; the entry-file-must-have-
//! `main` half of the rule lives at the driver layer, which knows which
//! file is the compilation entry point.

use sigil_parser::ast::decl::{Decl, SourceFile};

use crate::error::CanonError;

fn is_lib_file(path: &str) -> bool {
    path.ends_with(".lib.sig")
}

fn declares_main(file: &SourceFile) -> Option<sigil_common::span::Span> {
    file.decls.iter().find_map(|d| match d {
        Decl::Function(f) if f.name == "main" => Some(f.span),
        _ => None,
    })
}

/// Rejects a `.lib.sig` file that declares `main`. Non-library paths are
/// always accepted here.
pub fn check_lib_file(file: &SourceFile, path: &str) -> Result<(), CanonError> {
    if !is_lib_file(path) {
        return Ok(());
    }
    match declares_main(file) {
        Some(span) => Err(CanonError::LibDeclaresMain { span }),
        None => Ok(()),
    }
}

/// Rejects a designated entry file that does not declare `main`. Called
/// by the driver, which alone knows which module is the compilation
/// entry point.
pub fn check_entry_file(file: &SourceFile) -> Result<(), CanonError> {
    match declares_main(file) {
        Some(_) => Ok(()),
        None => Err(CanonError::EntryMissingMain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::effect::Effect;
    use sigil_common::span::Span;
    use sigil_parser::ast::decl::FunctionDecl;
    use sigil_parser::ast::expr::Literal;
    use sigil_parser::ast::{Expr, Type};

    fn main_fn() -> Decl {
        Decl::Function(FunctionDecl {
            name: "main".to_string(),
            generics: Vec::new(),
            params: Vec::new(),
            ret: Type::Unit(Span::new(0, 1)),
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body: Expr::Literal(Literal::Unit, Span::new(0, 1)),
            span: Span::new(0, 1),
        })
    }

    #[test]
    fn lib_file_with_main_is_rejected() {
        let file = SourceFile { decls: vec![main_fn()], span: Span::new(0, 1) };
        let err = check_lib_file(&file, "math.lib.sig").unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-LIB-NO-MAIN");
    }

    #[test]
    fn non_lib_file_with_main_is_accepted() {
        let file = SourceFile { decls: vec![main_fn()], span: Span::new(0, 1) };
        assert!(check_lib_file(&file, "main.sig").is_ok());
    }

    #[test]
    fn entry_file_without_main_is_rejected() {
        let file = SourceFile { decls: Vec::new(), span: Span::new(0, 1) };
        let err = check_entry_file(&file).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-ENTRY-NO-MAIN");
    }
}
