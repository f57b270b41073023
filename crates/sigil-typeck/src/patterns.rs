//! Pattern type checking and exhaustiveness (spec §4.5 "Pattern type
//! checking" and "Pattern exhaustiveness").

use sigil_parser::ast::Pattern;

use crate::env::{Binding, TypeDef, TypeEnv};
use crate::error::TypeError;
use crate::ty::Ty;

/// Checks `pattern` against `scrutinee`, binding any identifiers it
/// introduces into the current (innermost) scope of `env`.
pub fn check_pattern(pattern: &Pattern, scrutinee: &Ty, env: &mut TypeEnv) -> Result<(), TypeError> {
    match pattern {
        Pattern::Wildcard(_) => Ok(()),
        Pattern::Identifier(name, _) => {
            env.bind(name.clone(), Binding::value(scrutinee.clone()));
            Ok(())
        }
        Pattern::Literal(lit, span) => {
            let lit_ty = literal_ty(lit);
            if scrutinee.is_any() || lit_ty.compatible(scrutinee) {
                Ok(())
            } else {
                Err(TypeError::Mismatch { expected: scrutinee.clone(), found: lit_ty, span: *span })
            }
        }
        Pattern::List { elements, rest, span } => {
            let elem_ty = match scrutinee {
                Ty::List(elem) => (**elem).clone(),
                Ty::Any => Ty::Any,
                other => return Err(TypeError::Mismatch { expected: Ty::List(Box::new(Ty::Any)), found: other.clone(), span: *span }),
            };
            for e in elements {
                check_pattern(e, &elem_ty, env)?;
            }
            if let Some(name) = rest {
                env.bind(name.clone(), Binding::value(Ty::List(Box::new(elem_ty.clone()))));
            }
            Ok(())
        }
        Pattern::Tuple(elements, span) => match scrutinee {
            Ty::Tuple(tys) if tys.len() == elements.len() => {
                for (p, t) in elements.iter().zip(tys) {
                    check_pattern(p, t, env)?;
                }
                Ok(())
            }
            Ty::Any => {
                for p in elements {
                    check_pattern(p, &Ty::Any, env)?;
                }
                Ok(())
            }
            other => Err(TypeError::Mismatch {
                expected: Ty::Tuple(vec![Ty::Any; elements.len()]),
                found: other.clone(),
                span: *span,
            }),
        },
        Pattern::Record { fields, .. } => {
            for (_, p) in fields {
                check_pattern(p, &Ty::Any, env)?;
            }
            Ok(())
        }
        Pattern::Constructor { name, args, span } => {
            let variant_tys = lookup_constructor(env, name, scrutinee, *span)?;
            if variant_tys.len() != args.len() {
                return Err(TypeError::ArityMismatch { expected: variant_tys.len(), found: args.len(), span: *span });
            }
            for (p, t) in args.iter().zip(&variant_tys) {
                check_pattern(p, t, env)?;
            }
            Ok(())
        }
    }
}

fn literal_ty(lit: &sigil_parser::ast::Literal) -> Ty {
    use sigil_parser::ast::Literal;
    match lit {
        Literal::Int(_) => Ty::Int,
        Literal::Float(_) => Ty::Float,
        Literal::String(_) => Ty::String,
        Literal::Bool(_) => Ty::Bool,
        Literal::Unit => Ty::Unit,
    }
}

/// Looks up a sum-type constructor's declared field types. Field types
/// are not tracked per-variant in the registry (only variant names, for
/// exhaustiveness); untyped sum types synthesize their fields as `Any`.
fn lookup_constructor(env: &TypeEnv, name: &str, scrutinee: &Ty, span: sigil_common::span::Span) -> Result<Vec<Ty>, TypeError> {
    if scrutinee.is_any() {
        return Ok(Vec::new());
    }
    let Ty::Constructor { name: sum_name, .. } = scrutinee else {
        return Err(TypeError::UnknownConstructor { name: name.to_string(), span });
    };
    match env.type_defs.get(sum_name) {
        Some(TypeDef::Sum { variants }) if variants.iter().any(|v| v == name) => Ok(Vec::new()),
        _ => Err(TypeError::UnknownConstructor { name: name.to_string(), span }),
    }
}

/// Exhaustiveness per spec §4.5: wildcard/identifier arms cover everything;
/// sum types need every constructor or a catch-all; lists need `[]` and
/// `[x, .xs]`. Anything else (open records, strings) is never reported
/// exhaustive without a catch-all.
pub fn missing_patterns(patterns: &[Pattern], scrutinee: &Ty, env: &TypeEnv) -> Vec<String> {
    if patterns.iter().any(|p| matches!(p, Pattern::Wildcard(_) | Pattern::Identifier(..))) {
        return Vec::new();
    }
    match scrutinee {
        Ty::Constructor { name, .. } => match env.type_defs.get(name) {
            Some(TypeDef::Sum { variants }) => {
                let covered: Vec<&str> = patterns
                    .iter()
                    .filter_map(|p| match p {
                        Pattern::Constructor { name, .. } => Some(name.as_str()),
                        _ => None,
                    })
                    .collect();
                variants.iter().filter(|v| !covered.contains(&v.as_str())).cloned().collect()
            }
            _ => Vec::new(),
        },
        Ty::List(_) => {
            let has_empty = patterns.iter().any(|p| matches!(p, Pattern::List { elements, rest: None, .. } if elements.is_empty()));
            let has_cons = patterns.iter().any(|p| matches!(p, Pattern::List { rest: Some(_), .. }));
            let mut missing = Vec::new();
            if !has_empty {
                missing.push("[]".to_string());
            }
            if !has_cons {
                missing.push("[x, .xs]".to_string());
            }
            missing
        }
        _ => vec!["_".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::span::Span;
    use sigil_parser::ast::Literal;

    #[test]
    fn identifier_pattern_binds_scrutinee_type() {
        let mut env = TypeEnv::new();
        check_pattern(&Pattern::Identifier("x".to_string(), Span::new(0, 1)), &Ty::Int, &mut env).unwrap();
        assert_eq!(env.lookup("x").unwrap().ty, Ty::Int);
    }

    #[test]
    fn literal_pattern_rejects_mismatched_scrutinee() {
        let mut env = TypeEnv::new();
        let err = check_pattern(&Pattern::Literal(Literal::Int(0), Span::new(0, 1)), &Ty::String, &mut env).unwrap_err();
        assert_eq!(err.code(), "SIGIL-TYPE-MISMATCH");
    }

    #[test]
    fn list_exhaustive_with_empty_and_cons() {
        let patterns = vec![
            Pattern::List { elements: Vec::new(), rest: None, span: Span::new(0, 1) },
            Pattern::List { elements: vec![Pattern::Identifier("x".to_string(), Span::new(0, 1))], rest: Some("xs".to_string()), span: Span::new(0, 1) },
        ];
        assert!(missing_patterns(&patterns, &Ty::List(Box::new(Ty::Int)), &TypeEnv::new()).is_empty());
    }

    #[test]
    fn sum_type_missing_variant_reported() {
        let mut env = TypeEnv::new();
        env.type_defs.insert("Option".to_string(), TypeDef::Sum { variants: vec!["Some".to_string(), "None".to_string()] });
        let patterns = vec![Pattern::Constructor { name: "Some".to_string(), args: Vec::new(), span: Span::new(0, 1) }];
        let missing = missing_patterns(&patterns, &Ty::Constructor { name: "Option".to_string(), args: vec![Ty::Int] }, &env);
        assert_eq!(missing, vec!["None".to_string()]);
    }
}
