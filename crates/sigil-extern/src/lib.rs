//! Link-time extern validator (spec §4.6). Runs after type checking and
//! before emission: it dynamically loads every `ExternDecl`'s host module
//! and structurally verifies that each namespace-member access in the
//! program actually exists on the loaded object. This is the compiler's
//! "linker" for foreign imports — the type checker trusts extern members
//! are whatever was declared (or `Any` if untyped); this stage checks
//! that trust against the real runtime export list.

pub mod error;
pub mod loader;

pub use error::ExternError;
pub use loader::{ExternLoader, NodeExternLoader};

use rustc_hash::FxHashMap;
use sigil_parser::ast::decl::{Decl, SourceFile};
use sigil_parser::ast::expr::Expr;

/// Loads every extern in `file` and checks all namespace-member accesses
/// against the loaded modules' actual exports. Stops at the first
/// violation, per the propagation policy in spec §7.
pub fn check_externs(file: &SourceFile, loader: &mut dyn ExternLoader) -> Result<(), ExternError> {
    let mut namespaces: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for decl in &file.decls {
        if let Decl::Extern(ext) = decl {
            let members = loader
                .load(&ext.module_specifier)
                .map_err(|message| ExternError::ModuleLoadFailed { specifier: ext.module_specifier.clone(), message, span: ext.span })?;
            namespaces.insert(ext.name.clone(), members);
        }
    }

    for decl in &file.decls {
        match decl {
            Decl::Function(f) => check_expr(&f.body, &namespaces)?,
            Decl::Const(c) => check_expr(&c.value, &namespaces)?,
            Decl::Test(t) => check_expr(&t.body, &namespaces)?,
            Decl::Type(_) | Decl::Extern(_) | Decl::Import(_) => {}
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, namespaces: &FxHashMap<String, Vec<String>>) -> Result<(), ExternError> {
    if let Expr::QualifiedAccess { path, member, span } = expr {
        if let Some(namespace) = path.first() {
            if let Some(members) = namespaces.get(namespace) {
                if !members.iter().any(|m| m == member) {
                    let mut candidates: Vec<String> = members.clone();
                    candidates.sort();
                    candidates.truncate(8);
                    return Err(ExternError::UnknownMember {
                        namespace: namespace.clone(),
                        member: member.clone(),
                        candidates,
                        span: *span,
                    });
                }
            }
        }
    }
    for child in children(expr) {
        check_expr(child, namespaces)?;
    }
    Ok(())
}

fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Literal(..) | Expr::Identifier(..) | Expr::QualifiedAccess { .. } => Vec::new(),
        Expr::FieldAccess { base, .. } => vec![base],
        Expr::Index { base, index, .. } => vec![base, index],
        Expr::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        Expr::Unary { operand, .. } => vec![operand],
        Expr::Apply { callee, args, .. } => {
            let mut v = vec![callee.as_ref()];
            v.extend(args.iter());
            v
        }
        Expr::Lambda { body, .. } => vec![body],
        Expr::Match { scrutinee, arms, .. } => {
            let mut v = vec![scrutinee.as_ref()];
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    v.push(guard);
                }
                v.push(&arm.body);
            }
            v
        }
        Expr::If { cond, then_branch, else_branch, .. } => vec![cond, then_branch, else_branch],
        Expr::Let { value, body, .. } => vec![value, body],
        Expr::List { elements, rest, .. } => {
            let mut v: Vec<&Expr> = elements.iter().collect();
            if let Some(rest) = rest {
                v.push(rest);
            }
            v
        }
        Expr::Tuple(elements, _) => elements.iter().collect(),
        Expr::Record { fields, .. } => fields.iter().map(|(_, e)| e).collect(),
        Expr::MapOp { source, func, .. } => vec![source, func],
        Expr::FilterOp { source, predicate, .. } => vec![source, predicate],
        Expr::FoldOp { source, func, init, .. } => vec![source, func, init],
        Expr::Pipeline { value, func, .. } => vec![value, func],
        Expr::WithMock { target, mock, body, .. } => vec![target, mock, body],
        Expr::Ascription { expr, .. } => vec![expr],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::span::Span;

    struct MockLoader(FxHashMap<String, Vec<String>>);

    impl ExternLoader for MockLoader {
        fn load(&mut self, specifier: &str) -> Result<Vec<String>, String> {
            self.0.get(specifier).cloned().ok_or_else(|| format!("no such module: {}", specifier))
        }
    }

    fn file_with(ext: Decl, body: Expr) -> SourceFile {
        use sigil_common::effect::Effect;
        use sigil_parser::ast::decl::FunctionDecl;
        use sigil_parser::ast::ty::Type;
        let main = Decl::Function(FunctionDecl {
            name: "main".to_string(),
            generics: Vec::new(),
            params: Vec::new(),
            ret: Type::Unit(Span::new(0, 1)),
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body,
            span: Span::new(0, 1),
        });
        SourceFile { decls: vec![ext, main], span: Span::new(0, 1) }
    }

    fn extern_decl(name: &str, specifier: &str) -> Decl {
        use sigil_parser::ast::decl::ExternDecl;
        Decl::Extern(ExternDecl { name: name.to_string(), module_specifier: specifier.to_string(), members: Vec::new(), is_exported: false, span: Span::new(0, 1) })
    }

    #[test]
    fn known_member_access_is_accepted() {
        let mut loader = MockLoader(FxHashMap::from_iter([("node:fs".to_string(), vec!["readFile".to_string()])]));
        let body = Expr::QualifiedAccess { path: vec!["fs".to_string()], member: "readFile".to_string(), span: Span::new(0, 1) };
        let file = file_with(extern_decl("fs", "node:fs"), body);
        assert!(check_externs(&file, &mut loader).is_ok());
    }

    #[test]
    fn unknown_member_access_is_rejected_with_candidates() {
        let mut loader = MockLoader(FxHashMap::from_iter([("node:fs".to_string(), vec!["readFile".to_string(), "writeFile".to_string()])]));
        let body = Expr::QualifiedAccess { path: vec!["fs".to_string()], member: "readFyle".to_string(), span: Span::new(0, 1) };
        let file = file_with(extern_decl("fs", "node:fs"), body);
        let err = check_externs(&file, &mut loader).unwrap_err();
        assert_eq!(err.code(), "SIGIL-LINK-UNKNOWN-MEMBER");
        if let ExternError::UnknownMember { candidates, .. } = err {
            assert!(candidates.contains(&"readFile".to_string()));
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn failed_module_load_is_reported() {
        let mut loader = MockLoader(FxHashMap::default());
        let file = file_with(extern_decl("fs", "node:fs"), Expr::Literal(sigil_parser::ast::expr::Literal::Unit, Span::new(0, 1)));
        let err = check_externs(&file, &mut loader).unwrap_err();
        assert_eq!(err.code(), "SIGIL-LINK-MODULE-LOAD-FAILED");
    }
}
