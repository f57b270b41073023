//! Pattern-match canonicality (spec §4.4 "Pattern-match canonicality").
//!
//! When matching a single parameter, the scrutinee must be the parameter
//! itself. Matching a boolean comparison over that parameter (or a tuple
//! of such comparisons) is rejected since the comparison could instead
//! become a direct value pattern.

use sigil_parser::ast::decl::FunctionDecl;
use sigil_parser::ast::expr::{BinaryOp, Expr};

use crate::error::CanonError;

pub fn check_function(f: &FunctionDecl) -> Result<(), CanonError> {
    walk(&f.body, f)
}

fn walk(expr: &Expr, f: &FunctionDecl) -> Result<(), CanonError> {
    if let Expr::Match { scrutinee, arms, .. } = expr {
        if is_boolean_over_param(scrutinee, f) {
            return Err(CanonError::PatternBoolean { function: f.name.clone(), span: f.span });
        }
        for arm in arms {
            if let Some(guard) = &arm.guard {
                walk(guard, f)?;
            }
            walk(&arm.body, f)?;
        }
    }
    for child in crate::recursion::children(expr) {
        walk(child, f)?;
    }
    Ok(())
}

fn is_comparison(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge)
}

fn references_param(expr: &Expr, f: &FunctionDecl) -> bool {
    matches!(expr, Expr::Identifier(name, _) if f.params.iter().any(|p| &p.name == name))
}

fn is_boolean_over_param(scrutinee: &Expr, f: &FunctionDecl) -> bool {
    match scrutinee {
        Expr::Binary { op, lhs, rhs, .. } => is_comparison(*op) && (references_param(lhs, f) || references_param(rhs, f)),
        Expr::Tuple(elements, _) => !elements.is_empty() && elements.iter().all(|e| is_boolean_over_param(e, f)),
        _ => false,
    }
}
