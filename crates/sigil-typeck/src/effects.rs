//! Effect inference (spec §4.5 "Effects"). The checker infers the effect
//! set of an expression by unioning over its sub-expressions; the effect
//! of an application is the callee's declared effects. Extern applications
//! are currently inferred as pure (a documented trust-mode relaxation).

use sigil_common::effect::{undeclared_effects, Effect, EffectSet};
use sigil_parser::ast::Expr;

use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::ty::Ty;

/// Unions the effects performed by `expr`, looking up callee effect sets
/// in `env` where needed.
pub fn infer_effects(expr: &Expr, env: &TypeEnv) -> EffectSet {
    match expr {
        Expr::Literal(..) | Expr::Identifier(..) | Expr::QualifiedAccess { .. } => EffectSet::new(),
        Expr::FieldAccess { base, .. } => infer_effects(base, env),
        Expr::Index { base, index, .. } => union(infer_effects(base, env), infer_effects(index, env)),
        Expr::Binary { lhs, rhs, .. } => union(infer_effects(lhs, env), infer_effects(rhs, env)),
        Expr::Unary { operand, .. } => infer_effects(operand, env),
        Expr::Apply { callee, args, .. } => {
            let mut set = callee_effects(callee, env);
            for a in args {
                set = union(set, infer_effects(a, env));
            }
            set
        }
        Expr::Lambda { .. } => EffectSet::new(),
        Expr::Match { scrutinee, arms, .. } => {
            let mut set = infer_effects(scrutinee, env);
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    set = union(set, infer_effects(guard, env));
                }
                set = union(set, infer_effects(&arm.body, env));
            }
            set
        }
        Expr::If { cond, then_branch, else_branch, .. } => {
            let mut set = infer_effects(cond, env);
            set = union(set, infer_effects(then_branch, env));
            union(set, infer_effects(else_branch, env))
        }
        Expr::Let { value, body, .. } => union(infer_effects(value, env), infer_effects(body, env)),
        Expr::List { elements, rest, .. } => {
            let mut set = elements.iter().fold(EffectSet::new(), |acc, e| union(acc, infer_effects(e, env)));
            if let Some(rest) = rest {
                set = union(set, infer_effects(rest, env));
            }
            set
        }
        Expr::Tuple(elements, _) => elements.iter().fold(EffectSet::new(), |acc, e| union(acc, infer_effects(e, env))),
        Expr::Record { fields, .. } => fields.iter().fold(EffectSet::new(), |acc, (_, e)| union(acc, infer_effects(e, env))),
        Expr::MapOp { source, func, .. } => union(infer_effects(source, env), infer_effects(func, env)),
        Expr::FilterOp { source, predicate, .. } => union(infer_effects(source, env), infer_effects(predicate, env)),
        Expr::FoldOp { source, func, init, .. } => {
            let mut set = infer_effects(source, env);
            set = union(set, infer_effects(func, env));
            union(set, infer_effects(init, env))
        }
        Expr::Pipeline { value, func, .. } => union(infer_effects(value, env), infer_effects(func, env)),
        Expr::WithMock { target, mock, body, .. } => {
            let mut set = infer_effects(target, env);
            set = union(set, infer_effects(mock, env));
            union(set, infer_effects(body, env))
        }
        Expr::Ascription { expr, .. } => infer_effects(expr, env),
    }
}

fn union(mut a: EffectSet, b: EffectSet) -> EffectSet {
    a.extend(b);
    a
}

/// The effect set contributed by calling `callee`. Extern namespace
/// members are trusted as pure (spec §4.5's documented relaxation);
/// anything else resolving to a `Function` type contributes its
/// declared effects; unresolved callees contribute nothing (their own
/// mismatch is reported separately as an unbound-variable error).
fn callee_effects(callee: &Expr, env: &TypeEnv) -> EffectSet {
    if let Expr::QualifiedAccess { path, .. } = callee {
        if let Some(first) = path.first() {
            if env.lookup(first).map(|b| b.is_extern_namespace).unwrap_or(false) {
                return EffectSet::new();
            }
        }
    }
    if let Expr::Identifier(name, _) = callee {
        if let Some(binding) = env.lookup(name) {
            if let Ty::Function { effects, .. } = &binding.ty {
                return effects.clone();
            }
        }
    }
    EffectSet::new()
}

/// Checks that a function body's inferred effects are a subset of its
/// declared effects, per spec §4.5.
pub fn check_declared_effects(declared: &EffectSet, body: &Expr, env: &TypeEnv, span: sigil_common::span::Span) -> Result<(), TypeError> {
    let inferred = infer_effects(body, env);
    let undeclared: Vec<Effect> = undeclared_effects(declared, &inferred);
    if undeclared.is_empty() {
        Ok(())
    } else {
        Err(TypeError::EffectMismatch { undeclared, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::span::Span;

    #[test]
    fn pure_body_has_no_effects() {
        let expr = Expr::Literal(sigil_parser::ast::Literal::Int(1), Span::new(0, 1));
        assert!(infer_effects(&expr, &TypeEnv::new()).is_empty());
    }

    #[test]
    fn application_inherits_callee_declared_effects() {
        let mut env = TypeEnv::new();
        env.bind(
            "readFile",
            crate::env::Binding::value(Ty::Function {
                params: vec![Ty::String],
                ret: Box::new(Ty::String),
                effects: [Effect::IO].into_iter().collect(),
            }),
        );
        let expr = Expr::Apply {
            callee: Box::new(Expr::Identifier("readFile".to_string(), Span::new(0, 1))),
            args: vec![Expr::Literal(sigil_parser::ast::Literal::String("x".to_string()), Span::new(0, 1))],
            span: Span::new(0, 1),
        };
        let effects = infer_effects(&expr, &env);
        assert!(effects.contains(&Effect::IO));
    }

    #[test]
    fn undeclared_effect_in_body_is_rejected() {
        let mut env = TypeEnv::new();
        env.bind(
            "readFile",
            crate::env::Binding::value(Ty::Function {
                params: vec![Ty::String],
                ret: Box::new(Ty::String),
                effects: [Effect::IO].into_iter().collect(),
            }),
        );
        let body = Expr::Apply {
            callee: Box::new(Expr::Identifier("readFile".to_string(), Span::new(0, 1))),
            args: vec![Expr::Literal(sigil_parser::ast::Literal::String("x".to_string()), Span::new(0, 1))],
            span: Span::new(0, 1),
        };
        let declared = EffectSet::new();
        let err = check_declared_effects(&declared, &body, &env, Span::new(0, 1)).unwrap_err();
        assert_eq!(err.code(), "SIGIL-TYPE-EFFECT-MISMATCH");
    }
}
