//! Declaration ordering and duplicate detection (spec §4.4 "Declaration
//! ordering" and "Duplicate declarations").

use rustc_hash::FxHashMap;
use sigil_parser::ast::decl::Decl;

use crate::error::CanonError;

fn import_path(decl: &Decl) -> Option<String> {
    match decl {
        Decl::Import(import) => Some(import.module_path.join(".")),
        _ => None,
    }
}

/// Checks category order, the non-exported-before-exported bucketing
/// within each category, alphabetical order within each bucket, and
/// extern-member alphabetical order. Stops at the first violation, in
/// the declarations' own order.
pub fn check_declaration_order(decls: &[Decl]) -> Result<(), CanonError> {
    let mut prev_rank: Option<u8> = None;
    let mut prev_exported: Option<bool> = None;
    let mut prev_key: Option<String> = None;

    for decl in decls {
        let rank = decl.category_rank();
        let exported = is_exported(decl);
        let key = import_path(decl).unwrap_or_else(|| decl.name().to_string());

        if let Some(pr) = prev_rank {
            if rank < pr {
                return Err(CanonError::DeclOrder { name: decl.name().to_string(), span: decl.span() });
            }
            if rank == pr {
                let pe = prev_exported.unwrap();
                if exported != pe {
                    if exported && !pe {
                        // transitioning from non-exported to exported bucket: fine
                    } else {
                        return Err(CanonError::DeclVisibility { name: decl.name().to_string(), span: decl.span() });
                    }
                } else if key < *prev_key.as_ref().unwrap() {
                    if let Decl::Import(_) = decl {
                        return Err(CanonError::ImportOrder {
                            path: key,
                            previous: prev_key.unwrap(),
                            span: decl.span(),
                        });
                    }
                    return Err(CanonError::DeclAlphabetical {
                        name: key,
                        previous: prev_key.unwrap(),
                        span: decl.span(),
                    });
                }
            }
        }

        if let Decl::Extern(ext) = decl {
            let mut prev_member: Option<&str> = None;
            for member in &ext.members {
                if let Some(pm) = prev_member {
                    if member.name.as_str() < pm {
                        return Err(CanonError::ExternMemberOrder {
                            member: member.name.clone(),
                            previous: pm.to_string(),
                            span: member.span,
                        });
                    }
                }
                prev_member = Some(member.name.as_str());
            }
        }

        prev_rank = Some(rank);
        prev_exported = Some(exported);
        prev_key = Some(key);
    }
    Ok(())
}

fn is_exported(decl: &Decl) -> bool {
    match decl {
        Decl::Type(d) => d.is_exported,
        Decl::Extern(d) => d.is_exported,
        Decl::Import(_) => false,
        Decl::Const(d) => d.is_exported,
        Decl::Function(d) => d.is_exported,
        Decl::Test(_) => false,
    }
}

/// Rejects two declarations in the same category sharing a name (imports
/// are keyed by their dotted path since they have no name).
pub fn check_duplicates(decls: &[Decl]) -> Result<(), CanonError> {
    let mut seen: FxHashMap<(u8, String), ()> = FxHashMap::default();
    for decl in decls {
        let key = (decl.category_rank(), import_path(decl).unwrap_or_else(|| decl.name().to_string()));
        if seen.contains_key(&key) {
            return Err(CanonError::DuplicateDecl { name: key.1, span: decl.span() });
        }
        seen.insert(key, ());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::effect::Effect;
    use sigil_common::span::Span;
    use sigil_parser::ast::decl::{ConstDecl, FunctionDecl};
    use sigil_parser::ast::expr::Literal;
    use sigil_parser::ast::{Expr, Type};

    fn const_decl(name: &str, exported: bool) -> Decl {
        Decl::Const(ConstDecl {
            name: name.to_string(),
            ty: None,
            value: Expr::Literal(Literal::Int(1), Span::new(0, 1)),
            is_exported: exported,
            span: Span::new(0, 1),
        })
    }

    fn fn_decl(name: &str) -> Decl {
        Decl::Function(FunctionDecl {
            name: name.to_string(),
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
    fn accepts_sorted_categories_and_names() {
        let decls = vec![const_decl("a", false), const_decl("b", false), fn_decl("c")];
        assert!(check_declaration_order(&decls).is_ok());
    }

    #[test]
    fn rejects_category_out_of_order() {
        let decls = vec![fn_decl("a"), const_decl("b", false)];
        let err = check_declaration_order(&decls).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-DECL-ORDER");
    }

    #[test]
    fn rejects_unsorted_names_in_same_bucket() {
        let decls = vec![const_decl("b", false), const_decl("a", false)];
        let err = check_declaration_order(&decls).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-DECL-ALPHABETICAL");
    }

    #[test]
    fn rejects_exported_before_non_exported() {
        let decls = vec![const_decl("a", true), const_decl("b", false)];
        let err = check_declaration_order(&decls).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-DECL-VISIBILITY");
    }

    #[test]
    fn rejects_duplicate_names() {
        let decls = vec![const_decl("a", false), const_decl("a", false)];
        let err = check_duplicates(&decls).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-DUPLICATE-DECL");
    }
}
