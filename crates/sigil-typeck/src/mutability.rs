//! Mutability pass (spec §4.5 "After type checking, run the mutability
//! pass: a scope walker that refuses to (a) alias a parameter declared
//! `mut` via a let binding and (b) propagate mutability in ways the spec
//! forbids.").

use std::collections::HashSet;

use sigil_parser::ast::{Expr, Pattern};

use crate::error::TypeError;

/// Walks `body`, failing if a `mut` parameter (or anything bound to one)
/// is re-bound through a `let`. `mut_params` seeds the tainted set with
/// the function's own `mut`-flagged parameters.
pub fn check_mutability(body: &Expr, mut_params: &HashSet<String>) -> Result<(), TypeError> {
    walk(body, mut_params)
}

fn walk(expr: &Expr, tainted: &HashSet<String>) -> Result<(), TypeError> {
    match expr {
        Expr::Literal(..) | Expr::Identifier(..) | Expr::QualifiedAccess { .. } => Ok(()),
        Expr::FieldAccess { base, .. } => walk(base, tainted),
        Expr::Index { base, index, .. } => {
            walk(base, tainted)?;
            walk(index, tainted)
        }
        Expr::Binary { lhs, rhs, .. } => {
            walk(lhs, tainted)?;
            walk(rhs, tainted)
        }
        Expr::Unary { operand, .. } => walk(operand, tainted),
        Expr::Apply { callee, args, .. } => {
            walk(callee, tainted)?;
            for a in args {
                walk(a, tainted)?;
            }
            Ok(())
        }
        Expr::Lambda { params, body, .. } => {
            let mut inner = HashSet::new();
            for p in params {
                if p.is_mutable {
                    inner.insert(p.name.clone());
                }
            }
            walk(body, &inner)
        }
        Expr::Match { scrutinee, arms, .. } => {
            walk(scrutinee, tainted)?;
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    walk(guard, tainted)?;
                }
                walk(&arm.body, tainted)?;
            }
            Ok(())
        }
        Expr::If { cond, then_branch, else_branch, .. } => {
            walk(cond, tainted)?;
            walk(then_branch, tainted)?;
            walk(else_branch, tainted)
        }
        Expr::Let { pattern, value, body, .. } => {
            walk(value, tainted)?;
            if let Pattern::Identifier(bound_name, span) = pattern {
                if let Expr::Identifier(source_name, _) = value.as_ref() {
                    if tainted.contains(source_name) {
                        return Err(TypeError::MutableAlias { name: source_name.clone(), span: *span });
                    }
                    let mut next = tainted.clone();
                    next.insert(bound_name.clone());
                    return walk(body, &next);
                }
            }
            walk(body, tainted)
        }
        Expr::List { elements, rest, .. } => {
            for e in elements {
                walk(e, tainted)?;
            }
            if let Some(rest) = rest {
                walk(rest, tainted)?;
            }
            Ok(())
        }
        Expr::Tuple(elements, _) => {
            for e in elements {
                walk(e, tainted)?;
            }
            Ok(())
        }
        Expr::Record { fields, .. } => {
            for (_, e) in fields {
                walk(e, tainted)?;
            }
            Ok(())
        }
        Expr::MapOp { source, func, .. } => {
            walk(source, tainted)?;
            walk(func, tainted)
        }
        Expr::FilterOp { source, predicate, .. } => {
            walk(source, tainted)?;
            walk(predicate, tainted)
        }
        Expr::FoldOp { source, func, init, .. } => {
            walk(source, tainted)?;
            walk(func, tainted)?;
            walk(init, tainted)
        }
        Expr::Pipeline { value, func, .. } => {
            walk(value, tainted)?;
            walk(func, tainted)
        }
        Expr::WithMock { target, mock, body, .. } => {
            walk(target, tainted)?;
            walk(mock, tainted)?;
            walk(body, tainted)
        }
        Expr::Ascription { expr, .. } => walk(expr, tainted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::span::Span;

    #[test]
    fn direct_alias_of_mut_param_is_rejected() {
        let mut_params: HashSet<String> = ["buf".to_string()].into_iter().collect();
        let body = Expr::Let {
            pattern: Pattern::Identifier("alias".to_string(), Span::new(0, 1)),
            ty: None,
            value: Box::new(Expr::Identifier("buf".to_string(), Span::new(0, 1))),
            body: Box::new(Expr::Identifier("alias".to_string(), Span::new(0, 1))),
            span: Span::new(0, 1),
        };
        let err = check_mutability(&body, &mut_params).unwrap_err();
        assert_eq!(err.code(), "SIGIL-TYPE-MUTABLE-ALIAS");
    }

    #[test]
    fn unrelated_let_is_accepted() {
        let mut_params: HashSet<String> = ["buf".to_string()].into_iter().collect();
        let body = Expr::Let {
            pattern: Pattern::Identifier("n".to_string(), Span::new(0, 1)),
            ty: None,
            value: Box::new(Expr::Literal(sigil_parser::ast::Literal::Int(1), Span::new(0, 1))),
            body: Box::new(Expr::Identifier("n".to_string(), Span::new(0, 1))),
            span: Span::new(0, 1),
        };
        assert!(check_mutability(&body, &mut_params).is_ok());
    }

    #[test]
    fn transitive_alias_is_rejected() {
        let mut_params: HashSet<String> = ["buf".to_string()].into_iter().collect();
        let inner = Expr::Let {
            pattern: Pattern::Identifier("b".to_string(), Span::new(0, 1)),
            ty: None,
            value: Box::new(Expr::Identifier("a".to_string(), Span::new(0, 1))),
            body: Box::new(Expr::Identifier("b".to_string(), Span::new(0, 1))),
            span: Span::new(0, 1),
        };
        let body = Expr::Let {
            pattern: Pattern::Identifier("a".to_string(), Span::new(0, 1)),
            ty: None,
            value: Box::new(Expr::Identifier("buf".to_string(), Span::new(0, 1))),
            body: Box::new(inner),
            span: Span::new(0, 1),
        };
        let err = check_mutability(&body, &mut_params).unwrap_err();
        assert_eq!(err.code(), "SIGIL-TYPE-MUTABLE-ALIAS");
    }
}
