//! Recursion-shape classification (spec §4.4 "Recursion shapes",
//! "Collection-encoded state", "CPS").

use rustc_hash::FxHashSet;
use sigil_parser::ast::decl::FunctionDecl;
use sigil_parser::ast::expr::{BinaryOp, Expr};
use sigil_parser::ast::pat::Pattern;
use sigil_parser::ast::ty::Type;

use crate::error::CanonError;

/// Runs every recursion-shape rule against one function declaration.
/// Structural/query classification (spec's own terms for the role a
/// parameter plays across recursive call sites) only changes the
/// diagnostic here through the accumulator case, which is fatal wherever
/// it appears; the other two roles are informative only.
pub fn check_function(f: &FunctionDecl) -> Result<(), CanonError> {
    let param_names: FxHashSet<String> = f.params.iter().map(|p| p.name.clone()).collect();
    let mut calls: Vec<&[Expr]> = Vec::new();
    collect_recursive_calls(&f.body, &f.name, &mut calls);

    if calls.is_empty() {
        return Ok(());
    }

    if matches!(f.ret, Type::Function { .. }) {
        return Err(CanonError::RecursionCps { function: f.name.clone(), span: f.span });
    }

    for (i, param) in f.params.iter().enumerate() {
        for args in &calls {
            let Some(arg) = args.get(i) else { continue };
            if is_accumulator(arg, &param_names) {
                return Err(CanonError::RecursionAccumulator { function: f.name.clone(), param: param.name.clone(), span: f.span });
            }
        }
    }

    check_collection_encoded_state(f, &calls)?;
    Ok(())
}

fn is_unchanged(arg: &Expr, param_name: &str) -> bool {
    matches!(arg, Expr::Identifier(name, _) if name == param_name)
}

/// A binary combination of two parameters: `a*b`, `a+b`, list-cons,
/// `++`/`⧺` concatenation.
fn is_accumulator(arg: &Expr, param_names: &FxHashSet<String>) -> bool {
    match arg {
        Expr::Binary { op: BinaryOp::Mul | BinaryOp::Add | BinaryOp::ListConcat | BinaryOp::StringConcat, lhs, rhs, .. } => {
            is_param_ref(lhs, param_names) && is_param_ref(rhs, param_names)
        }
        Expr::List { elements, rest: Some(rest), .. } if !elements.is_empty() => {
            elements.iter().any(|e| is_param_ref(e, param_names)) && is_param_ref(rest, param_names)
        }
        _ => false,
    }
}

fn is_param_ref(expr: &Expr, param_names: &FxHashSet<String>) -> bool {
    matches!(expr, Expr::Identifier(name, _) if param_names.contains(name))
}

/// When the function takes a single collection-shaped parameter, it must
/// destructure that parameter through a `match` rather than thread it
/// through recursion unchanged.
fn check_collection_encoded_state(f: &FunctionDecl, calls: &[&[Expr]]) -> Result<(), CanonError> {
    if f.params.len() != 1 {
        return Ok(());
    }
    let param = &f.params[0];
    if !is_collection_like(&param.ty) {
        return Ok(());
    }

    let mut matches_param = false;
    let mut destructures = false;
    let mut fixed_size_state = false;
    walk_matches(&f.body, &param.name, &mut matches_param, &mut destructures, &mut fixed_size_state);

    let passes_unchanged = calls.iter().any(|args| args.first().map(|a| is_unchanged(a, &param.name)).unwrap_or(false));

    if !matches_param || !destructures || fixed_size_state || passes_unchanged {
        return Err(CanonError::RecursionCollectionState { function: f.name.clone(), span: f.span });
    }
    Ok(())
}

fn is_collection_like(ty: &Type) -> bool {
    match ty {
        Type::List(..) | Type::Tuple(..) | Type::Map(..) => true,
        Type::Record { fields, .. } => fields.len() >= 2,
        _ => false,
    }
}

fn walk_matches(expr: &Expr, param_name: &str, matches_param: &mut bool, destructures: &mut bool, fixed_size_state: &mut bool) {
    if let Expr::Match { scrutinee, arms, .. } = expr {
        if matches!(scrutinee.as_ref(), Expr::Identifier(name, _) if name == param_name) {
            *matches_param = true;
            for arm in arms {
                if matches!(arm.pattern, Pattern::List { .. } | Pattern::Tuple(..) | Pattern::Record { .. } | Pattern::Constructor { .. }) {
                    *destructures = true;
                }
                if let Pattern::List { elements, rest: None, .. } = &arm.pattern {
                    if !elements.is_empty() {
                        *fixed_size_state = true;
                    }
                }
            }
        }
    }
    for child in children(expr) {
        walk_matches(child, param_name, matches_param, destructures, fixed_size_state);
    }
}

fn collect_recursive_calls<'a>(expr: &'a Expr, fn_name: &str, out: &mut Vec<&'a [Expr]>) {
    if let Expr::Apply { callee, args, .. } = expr {
        if matches!(callee.as_ref(), Expr::Identifier(name, _) if name == fn_name) {
            out.push(args.as_slice());
        }
    }
    for child in children(expr) {
        collect_recursive_calls(child, fn_name, out);
    }
}

pub(crate) fn children(expr: &Expr) -> Vec<&Expr> {
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
    use sigil_common::effect::Effect;
    use sigil_common::span::Span;
    use sigil_parser::ast::expr::{Literal, Param};

    fn span() -> Span {
        Span::new(0, 1)
    }

    fn int_param(name: &str) -> Param {
        Param { name: name.to_string(), ty: Type::Int(span()), is_mutable: false, span: span() }
    }

    #[test]
    fn structural_decrease_is_accepted() {
        let body = Expr::Apply {
            callee: Box::new(Expr::Identifier("fact".to_string(), span())),
            args: vec![Expr::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Expr::Identifier("n".to_string(), span())),
                rhs: Box::new(Expr::Literal(Literal::Int(1), span())),
                span: span(),
            }],
            span: span(),
        };
        let f = FunctionDecl {
            name: "fact".to_string(),
            generics: Vec::new(),
            params: vec![int_param("n")],
            ret: Type::Int(span()),
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body,
            span: span(),
        };
        assert!(check_function(&f).is_ok());
    }

    #[test]
    fn accumulator_combination_is_rejected() {
        let body = Expr::Apply {
            callee: Box::new(Expr::Identifier("go".to_string(), span())),
            args: vec![
                Expr::Binary { op: BinaryOp::Sub, lhs: Box::new(Expr::Identifier("n".to_string(), span())), rhs: Box::new(Expr::Literal(Literal::Int(1), span())), span: span() },
                Expr::Binary { op: BinaryOp::Mul, lhs: Box::new(Expr::Identifier("n".to_string(), span())), rhs: Box::new(Expr::Identifier("acc".to_string(), span())), span: span() },
            ],
            span: span(),
        };
        let f = FunctionDecl {
            name: "go".to_string(),
            generics: Vec::new(),
            params: vec![int_param("n"), int_param("acc")],
            ret: Type::Int(span()),
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body,
            span: span(),
        };
        let err = check_function(&f).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-RECURSION-ACCUMULATOR");
    }

    #[test]
    fn cps_return_type_is_rejected() {
        let f = FunctionDecl {
            name: "go".to_string(),
            generics: Vec::new(),
            params: vec![int_param("n")],
            ret: Type::Function { params: vec![Type::Int(span())], ret: Box::new(Type::Int(span())), effects: Vec::new(), span: span() },
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body: Expr::Apply {
                callee: Box::new(Expr::Identifier("go".to_string(), span())),
                args: vec![Expr::Identifier("n".to_string(), span())],
                span: span(),
            },
            span: span(),
        };
        let err = check_function(&f).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-RECURSION-CPS");
    }

    #[test]
    fn list_param_passed_unchanged_is_rejected() {
        use sigil_parser::ast::Pattern;

        let list_ty = Type::List(Box::new(Type::Int(span())), span());
        let body = Expr::Match {
            scrutinee: Box::new(Expr::Identifier("xs".to_string(), span())),
            arms: vec![
                sigil_parser::ast::expr::MatchArm {
                    pattern: Pattern::List { elements: Vec::new(), rest: None, span: span() },
                    guard: None,
                    body: Expr::Literal(Literal::Int(0), span()),
                    span: span(),
                },
                sigil_parser::ast::expr::MatchArm {
                    pattern: Pattern::Wildcard(span()),
                    guard: None,
                    body: Expr::Apply {
                        callee: Box::new(Expr::Identifier("sum".to_string(), span())),
                        args: vec![Expr::Identifier("xs".to_string(), span())],
                        span: span(),
                    },
                    span: span(),
                },
            ],
            span: span(),
        };
        let f = FunctionDecl {
            name: "sum".to_string(),
            generics: Vec::new(),
            params: vec![Param { name: "xs".to_string(), ty: list_ty, is_mutable: false, span: span() }],
            ret: Type::Int(span()),
            effects: Vec::<Effect>::new(),
            is_mockable: false,
            is_exported: false,
            body,
            span: span(),
        };
        let err = check_function(&f).unwrap_err();
        assert_eq!(err.code(), "SIGIL-CANON-RECURSION-COLLECTION-STATE");
    }
}
