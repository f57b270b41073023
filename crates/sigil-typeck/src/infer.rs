//! Bidirectional synthesize/check engine and two-pass module check
//! (spec §4.5).

use std::collections::HashSet;

use sigil_parser::ast::{Decl, Expr, FunctionDecl, Literal, MatchArm, SourceFile, TypeDeclBody};

use crate::builtins::{binary_op_type, unary_op_type};
use crate::effects::check_declared_effects;
use crate::env::{Binding, ModuleExports, TypeDef, TypeEnv};
use crate::error::TypeError;
use crate::mutability::check_mutability;
use crate::patterns::{check_pattern, missing_patterns};
use crate::ty::{self, Ty};

/// Type-checks an entire module, given the exports of the modules it
/// imports (keyed by dotted import path, e.g. `"stdlib.list"`). Returns
/// this module's own exports for use by its importers, plus every error
/// collected (checking does not stop at the first).
pub fn check_module(file: &SourceFile, imports: &std::collections::HashMap<String, ModuleExports>) -> (ModuleExports, Vec<TypeError>) {
    let mut env = TypeEnv::new();
    let mut errors = Vec::new();

    first_pass(file, imports, &mut env, &mut errors);

    for decl in &file.decls {
        match decl {
            Decl::Const(c) => {
                let result = if let Some(ann) = &c.ty {
                    let expected = ty::from_ast(ann, &[]);
                    check(&c.value, &expected, &mut env).map(|_| expected)
                } else {
                    synthesize(&c.value, &mut env)
                };
                match result {
                    Ok(t) => env.bind(c.name.clone(), Binding::value(t)),
                    Err(e) => errors.push(e),
                }
            }
            Decl::Function(f) => {
                if let Err(e) = check_function(f, &mut env) {
                    errors.push(e);
                }
            }
            Decl::Test(t) => {
                if let Err(e) = synthesize(&t.body, &mut env) {
                    errors.push(e);
                }
            }
            Decl::Type(_) | Decl::Extern(_) | Decl::Import(_) => {}
        }
    }

    let exports = ModuleExports {
        members: file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Function(f) if f.is_exported => env.lookup(&f.name).map(|b| (f.name.clone(), b.ty.clone())),
                Decl::Const(c) if c.is_exported => env.lookup(&c.name).map(|b| (c.name.clone(), b.ty.clone())),
                Decl::Type(t) if t.is_exported => Some((t.name.clone(), Ty::Constructor { name: t.name.clone(), args: Vec::new() })),
                _ => None,
            })
            .collect(),
    };

    (exports, errors)
}

fn first_pass(file: &SourceFile, imports: &std::collections::HashMap<String, ModuleExports>, env: &mut TypeEnv, errors: &mut Vec<TypeError>) {
    for decl in &file.decls {
        match decl {
            Decl::Type(t) => match &t.body {
                TypeDeclBody::Alias(ty) => {
                    env.type_defs.insert(t.name.clone(), TypeDef::Alias(ty::from_ast(ty, &t.generics)));
                }
                TypeDeclBody::Sum { variants } => {
                    env.type_defs.insert(
                        t.name.clone(),
                        TypeDef::Sum { variants: variants.iter().map(|(name, _)| name.clone()).collect() },
                    );
                    for (variant_name, field_tys) in variants {
                        let params: Vec<Ty> = field_tys.iter().map(|ty| ty::from_ast(ty, &t.generics)).collect();
                        let ret = Ty::Constructor {
                            name: t.name.clone(),
                            args: t.generics.iter().map(|g| Ty::Variable(g.clone())).collect(),
                        };
                        env.bind(
                            variant_name.clone(),
                            Binding::value(Ty::Function { params, ret: Box::new(ret), effects: Default::default() }),
                        );
                    }
                }
            },
            Decl::Extern(e) => {
                let ty = if e.members.is_empty() {
                    Ty::Any
                } else {
                    Ty::Record(e.members.iter().map(|m| (m.name.clone(), ty::from_ast(&m.ty, &[]))).collect())
                };
                env.bind(e.name.clone(), Binding::extern_namespace(ty));
            }
            Decl::Import(i) => {
                let key = i.module_path.join(".");
                let local_name = i.module_path.last().cloned().unwrap_or_default();
                match imports.get(&key) {
                    Some(exports) => {
                        env.modules.insert(local_name.clone(), exports.clone());
                        env.bind(local_name, Binding::value(Ty::Record(exports.members.iter().map(|(n, t)| (n.clone(), t.clone())).collect())));
                    }
                    None => env.bind(local_name, Binding::value(Ty::Any)),
                }
            }
            Decl::Function(f) => {
                let generics = &f.generics;
                let params: Vec<Ty> = f.params.iter().map(|p| ty::from_ast(&p.ty, generics)).collect();
                let ret = ty::from_ast(&f.ret, generics);
                let binding = Ty::Function { params, ret: Box::new(ret), effects: f.effects.iter().copied().collect() };
                if f.is_mockable {
                    env.bind(f.name.clone(), Binding::mockable(binding));
                } else {
                    env.bind(f.name.clone(), Binding::value(binding));
                }
            }
            Decl::Const(_) | Decl::Test(_) => {}
        }
    }
    let _ = errors;
}

fn check_function(f: &FunctionDecl, env: &mut TypeEnv) -> Result<(), TypeError> {
    env.push_scope();
    let mut mut_params = HashSet::new();
    for p in &f.params {
        let param_ty = ty::from_ast(&p.ty, &f.generics);
        if p.is_mutable {
            mut_params.insert(p.name.clone());
            env.bind(p.name.clone(), Binding::mutable(param_ty));
        } else {
            env.bind(p.name.clone(), Binding::value(param_ty));
        }
    }
    let ret = ty::from_ast(&f.ret, &f.generics);
    let check_result = check(&f.body, &ret, env);
    let declared_effects = f.effects.iter().copied().collect();
    let effect_result = check_declared_effects(&declared_effects, &f.body, env, f.span);
    let mutability_result = check_mutability(&f.body, &mut_params);
    env.pop_scope();
    check_result?;
    effect_result?;
    mutability_result
}

/// Synthesize (⇒): compute a type from the expression and environment
/// alone.
pub fn synthesize(expr: &Expr, env: &mut TypeEnv) -> Result<Ty, TypeError> {
    match expr {
        Expr::Literal(lit, _) => Ok(literal_ty(lit)),
        Expr::Identifier(name, span) => env
            .lookup(name)
            .map(|b| b.ty.clone())
            .ok_or_else(|| TypeError::UnboundVariable { name: name.clone(), span: *span }),
        Expr::QualifiedAccess { path, member, span } => {
            let namespace = path.last().cloned().unwrap_or_default();
            match env.lookup(&namespace).map(|b| b.ty.clone()) {
                Some(Ty::Any) => Ok(Ty::Any),
                Some(Ty::Record(fields)) => fields
                    .iter()
                    .find(|(n, _)| n == member)
                    .map(|(_, t)| t.clone())
                    .ok_or_else(|| TypeError::ModuleNotExported {
                        module: namespace.clone(),
                        member: member.clone(),
                        candidates: fields.iter().map(|(n, _)| n.clone()).collect(),
                        span: *span,
                    }),
                _ => Err(TypeError::UnboundVariable { name: namespace, span: *span }),
            }
        }
        Expr::FieldAccess { base, field, span } => match synthesize(base, env)? {
            Ty::Any => Ok(Ty::Any),
            Ty::Record(fields) => fields
                .iter()
                .find(|(n, _)| n == field)
                .map(|(_, t)| t.clone())
                .ok_or_else(|| TypeError::MissingRecordField { field: field.clone(), span: *span }),
            other => Err(TypeError::Mismatch { expected: Ty::Record(Vec::new()), found: other, span: *span }),
        },
        Expr::Index { base, index, span } => {
            check(index, &Ty::Int, env)?;
            match synthesize(base, env)? {
                Ty::List(elem) => Ok(*elem),
                Ty::Map(_, value) => Ok(*value),
                Ty::Any => Ok(Ty::Any),
                other => Err(TypeError::Mismatch { expected: Ty::List(Box::new(Ty::Any)), found: other, span: *span }),
            }
        }
        Expr::Binary { op, lhs, rhs, span } => {
            let lhs_ty = synthesize(lhs, env)?;
            let rhs_ty = synthesize(rhs, env)?;
            binary_op_type(*op, &lhs_ty, &rhs_ty, *span)
        }
        Expr::Unary { op, operand, span } => {
            let operand_ty = synthesize(operand, env)?;
            unary_op_type(*op, &operand_ty, *span)
        }
        Expr::Apply { callee, args, span } => {
            let callee_ty = synthesize(callee, env)?;
            match callee_ty {
                Ty::Any => {
                    for a in args {
                        synthesize(a, env)?;
                    }
                    Ok(Ty::Any)
                }
                Ty::Function { params, ret, .. } => {
                    if params.len() != args.len() {
                        return Err(TypeError::ArityMismatch { expected: params.len(), found: args.len(), span: *span });
                    }
                    for (arg, param_ty) in args.iter().zip(&params) {
                        check(arg, param_ty, env)?;
                    }
                    Ok(*ret)
                }
                other => Err(TypeError::NotAFunction { found: other, span: *span }),
            }
        }
        Expr::Lambda { generics, params, ret, body, .. } => {
            env.push_scope();
            for p in params {
                env.bind(p.name.clone(), Binding::value(ty::from_ast(&p.ty, generics)));
            }
            let ret_ty = ty::from_ast(ret, generics);
            let result = check(body, &ret_ty, env);
            env.pop_scope();
            result?;
            Ok(Ty::Function {
                params: params.iter().map(|p| ty::from_ast(&p.ty, generics)).collect(),
                ret: Box::new(ret_ty),
                effects: Default::default(),
            })
        }
        Expr::Match { scrutinee, arms, span } => synthesize_match(scrutinee, arms, *span, env),
        Expr::If { cond, then_branch, else_branch, .. } => {
            check(cond, &Ty::Bool, env)?;
            let then_ty = synthesize(then_branch, env)?;
            check(else_branch, &then_ty, env)?;
            Ok(then_ty)
        }
        Expr::Let { pattern, ty: ascription, value, body, .. } => {
            let value_ty = if let Some(ann) = ascription {
                let expected = ty::from_ast(ann, &[]);
                check(value, &expected, env)?;
                expected
            } else {
                synthesize(value, env)?
            };
            env.push_scope();
            check_pattern(pattern, &value_ty, env)?;
            let result = synthesize(body, env);
            env.pop_scope();
            result
        }
        Expr::List { elements, rest, element_type, span } => {
            if elements.is_empty() && rest.is_none() {
                return element_type
                    .as_ref()
                    .map(|t| Ty::List(Box::new(ty::from_ast(t, &[]))))
                    .ok_or(TypeError::EmptyListNeedsAnnotation { span: *span });
            }
            let elem_ty = if let Some(t) = element_type {
                ty::from_ast(t, &[])
            } else if let Some(first) = elements.first() {
                synthesize(first, env)?
            } else {
                match synthesize(rest.as_ref().expect("non-empty per outer guard"), env)? {
                    Ty::List(elem) => *elem,
                    other => other,
                }
            };
            for e in elements {
                check(e, &elem_ty, env)?;
            }
            if let Some(rest) = rest {
                check(rest, &Ty::List(Box::new(elem_ty.clone())), env)?;
            }
            Ok(Ty::List(Box::new(elem_ty)))
        }
        Expr::Tuple(elements, _) => {
            let tys = elements.iter().map(|e| synthesize(e, env)).collect::<Result<Vec<_>, _>>()?;
            Ok(Ty::Tuple(tys))
        }
        Expr::Record { fields, .. } => {
            let tys = fields
                .iter()
                .map(|(name, e)| synthesize(e, env).map(|t| (name.clone(), t)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ty::Record(tys))
        }
        Expr::MapOp { source, func, span } => {
            let source_ty = synthesize(source, env)?;
            let elem_ty = match source_ty {
                Ty::List(elem) => *elem,
                Ty::Any => Ty::Any,
                other => return Err(TypeError::Mismatch { expected: Ty::List(Box::new(Ty::Any)), found: other, span: *span }),
            };
            let func_ty = synthesize(func, env)?;
            match func_ty {
                Ty::Function { params, ret, .. } if params.len() == 1 => {
                    if !params[0].compatible(&elem_ty) {
                        return Err(TypeError::Mismatch { expected: params[0].clone(), found: elem_ty, span: *span });
                    }
                    Ok(Ty::List(ret))
                }
                Ty::Any => Ok(Ty::List(Box::new(Ty::Any))),
                other => Err(TypeError::NotAFunction { found: other, span: *span }),
            }
        }
        Expr::FilterOp { source, predicate, span } => {
            let source_ty = synthesize(source, env)?;
            let elem_ty = match &source_ty {
                Ty::List(elem) => (**elem).clone(),
                Ty::Any => Ty::Any,
                other => return Err(TypeError::Mismatch { expected: Ty::List(Box::new(Ty::Any)), found: other.clone(), span: *span }),
            };
            let predicate_ty = synthesize(predicate, env)?;
            match predicate_ty {
                Ty::Function { params, ret, .. } if params.len() == 1 && *ret == Ty::Bool => {
                    if !params[0].compatible(&elem_ty) {
                        return Err(TypeError::Mismatch { expected: params[0].clone(), found: elem_ty, span: *span });
                    }
                    Ok(source_ty)
                }
                Ty::Any => Ok(source_ty),
                other => Err(TypeError::NotAFunction { found: other, span: *span }),
            }
        }
        Expr::FoldOp { source, func, init, span } => {
            let source_ty = synthesize(source, env)?;
            let elem_ty = match &source_ty {
                Ty::List(elem) => (**elem).clone(),
                Ty::Any => Ty::Any,
                other => return Err(TypeError::Mismatch { expected: Ty::List(Box::new(Ty::Any)), found: other.clone(), span: *span }),
            };
            let init_ty = synthesize(init, env)?;
            let func_ty = synthesize(func, env)?;
            match func_ty {
                Ty::Function { params, ret, .. } if params.len() == 2 => {
                    if !params[0].compatible(&init_ty) || !params[1].compatible(&elem_ty) {
                        return Err(TypeError::Mismatch { expected: params[0].clone(), found: init_ty, span: *span });
                    }
                    Ok(*ret)
                }
                Ty::Any => Ok(Ty::Any),
                other => Err(TypeError::NotAFunction { found: other, span: *span }),
            }
        }
        Expr::Pipeline { value, func, span } => {
            let value_ty = synthesize(value, env)?;
            let func_ty = synthesize(func, env)?;
            match func_ty {
                Ty::Function { params, ret, .. } if params.len() == 1 => {
                    if !params[0].compatible(&value_ty) {
                        return Err(TypeError::Mismatch { expected: params[0].clone(), found: value_ty, span: *span });
                    }
                    Ok(*ret)
                }
                Ty::Any => Ok(Ty::Any),
                other => Err(TypeError::NotAFunction { found: other, span: *span }),
            }
        }
        Expr::WithMock { target, mock, body, span } => {
            check_with_mock(target, mock, env, *span)?;
            synthesize(body, env)
        }
        Expr::Ascription { expr, ty: ann, .. } => {
            let expected = ty::from_ast(ann, &[]);
            check(expr, &expected, env)?;
            Ok(expected)
        }
    }
}

/// Check (⇐): verify `expr` against `expected`.
pub fn check(expr: &Expr, expected: &Ty, env: &mut TypeEnv) -> Result<(), TypeError> {
    match expr {
        Expr::List { elements, rest, element_type, span } if elements.is_empty() && rest.is_none() && element_type.is_none() => {
            match expected {
                Ty::List(_) | Ty::Any => Ok(()),
                other => Err(TypeError::Mismatch { expected: other.clone(), found: Ty::List(Box::new(Ty::Any)), span: *span }),
            }
        }
        Expr::Lambda { generics, params, ret, body, span } => match expected {
            Ty::Function { params: expected_params, ret: expected_ret, .. } => {
                if params.len() != expected_params.len() {
                    return Err(TypeError::ArityMismatch { expected: expected_params.len(), found: params.len(), span: *span });
                }
                for (p, expected_p) in params.iter().zip(expected_params) {
                    let declared = ty::from_ast(&p.ty, generics);
                    if !declared.compatible(expected_p) {
                        return Err(TypeError::Mismatch { expected: expected_p.clone(), found: declared, span: *span });
                    }
                }
                env.push_scope();
                for p in params {
                    env.bind(p.name.clone(), Binding::value(ty::from_ast(&p.ty, generics)));
                }
                let declared_ret = ty::from_ast(ret, generics);
                let target_ret = if declared_ret.compatible(expected_ret) { &declared_ret } else { expected_ret.as_ref() };
                let result = check(body, target_ret, env);
                env.pop_scope();
                result
            }
            Ty::Any => Ok(()),
            other => Err(TypeError::Mismatch { expected: other.clone(), found: Ty::Function { params: Vec::new(), ret: Box::new(Ty::Any), effects: Default::default() }, span: *span }),
        },
        Expr::If { cond, then_branch, else_branch, .. } => {
            check(cond, &Ty::Bool, env)?;
            check(then_branch, expected, env)?;
            check(else_branch, expected, env)
        }
        Expr::Match { scrutinee, arms, span } => check_match(scrutinee, arms, *span, expected, env),
        Expr::Let { pattern, ty: ascription, value, body, .. } => {
            let value_ty = if let Some(ann) = ascription {
                let ann_ty = ty::from_ast(ann, &[]);
                check(value, &ann_ty, env)?;
                ann_ty
            } else {
                synthesize(value, env)?
            };
            env.push_scope();
            check_pattern(pattern, &value_ty, env)?;
            let result = check(body, expected, env);
            env.pop_scope();
            result
        }
        Expr::Record { fields, .. } => match expected {
            Ty::Record(expected_fields) => {
                for (name, field_ty) in expected_fields {
                    let value = fields
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, e)| e)
                        .ok_or_else(|| TypeError::MissingRecordField { field: name.clone(), span: expr.span() })?;
                    check(value, field_ty, env)?;
                }
                Ok(())
            }
            Ty::Any => Ok(()),
            other => {
                let found = synthesize(expr, env)?;
                if found.compatible(other) {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch { expected: other.clone(), found, span: expr.span() })
                }
            }
        },
        _ => {
            let found = synthesize(expr, env)?;
            if found.compatible(expected) {
                Ok(())
            } else {
                Err(TypeError::Mismatch { expected: expected.clone(), found, span: expr.span() })
            }
        }
    }
}

fn synthesize_match(scrutinee: &Expr, arms: &[MatchArm], span: sigil_common::span::Span, env: &mut TypeEnv) -> Result<Ty, TypeError> {
    let scrutinee_ty = synthesize(scrutinee, env)?;
    let mut branch_ty: Option<Ty> = None;
    for arm in arms {
        env.push_scope();
        let result = (|| -> Result<Ty, TypeError> {
            check_pattern(&arm.pattern, &scrutinee_ty, env)?;
            if let Some(guard) = &arm.guard {
                check(guard, &Ty::Bool, env)?;
            }
            match &branch_ty {
                Some(t) => {
                    check(&arm.body, t, env)?;
                    Ok(t.clone())
                }
                None => synthesize(&arm.body, env),
            }
        })();
        env.pop_scope();
        let t = result?;
        if branch_ty.is_none() {
            branch_ty = Some(t);
        }
    }
    let patterns: Vec<_> = arms.iter().map(|a| a.pattern.clone()).collect();
    let missing = missing_patterns(&patterns, &scrutinee_ty, env);
    if !missing.is_empty() {
        return Err(TypeError::NonExhaustiveMatch { missing, span });
    }
    branch_ty.ok_or(TypeError::EmptyListNeedsAnnotation { span })
}

fn check_match(scrutinee: &Expr, arms: &[MatchArm], span: sigil_common::span::Span, expected: &Ty, env: &mut TypeEnv) -> Result<(), TypeError> {
    let scrutinee_ty = synthesize(scrutinee, env)?;
    for arm in arms {
        env.push_scope();
        let result = (|| -> Result<(), TypeError> {
            check_pattern(&arm.pattern, &scrutinee_ty, env)?;
            if let Some(guard) = &arm.guard {
                check(guard, &Ty::Bool, env)?;
            }
            check(&arm.body, expected, env)
        })();
        env.pop_scope();
        result?;
    }
    let patterns: Vec<_> = arms.iter().map(|a| a.pattern.clone()).collect();
    let missing = missing_patterns(&patterns, &scrutinee_ty, env);
    if !missing.is_empty() {
        return Err(TypeError::NonExhaustiveMatch { missing, span });
    }
    Ok(())
}

/// `with_mock(target, replacement, body)`: target must be an extern
/// namespace member access (replacement must be Sigil-typed, not `Any`)
/// or a reference to a `mockable` function (replacement must match its
/// type exactly).
fn check_with_mock(target: &Expr, mock: &Expr, env: &mut TypeEnv, span: sigil_common::span::Span) -> Result<(), TypeError> {
    match target {
        Expr::QualifiedAccess { path, member, .. } => {
            let namespace = path.first().cloned().unwrap_or_default();
            let is_extern = env.lookup(&namespace).map(|b| b.is_extern_namespace).unwrap_or(false);
            if !is_extern {
                return Err(TypeError::UnboundVariable { name: namespace, span });
            }
            let mock_ty = synthesize(mock, env)?;
            if mock_ty.is_any() {
                return Err(TypeError::Mismatch { expected: Ty::Function { params: Vec::new(), ret: Box::new(Ty::Any), effects: Default::default() }, found: Ty::Any, span });
            }
            let _ = member;
            Ok(())
        }
        Expr::Identifier(name, _) => {
            let binding = env.lookup(name).cloned().ok_or_else(|| TypeError::UnboundVariable { name: name.clone(), span })?;
            if !binding.is_mockable {
                return Err(TypeError::Mismatch { expected: binding.ty.clone(), found: binding.ty, span });
            }
            check(mock, &binding.ty, env)
        }
        _ => Err(TypeError::NotAFunction { found: Ty::Any, span }),
    }
}

fn literal_ty(lit: &Literal) -> Ty {
    match lit {
        Literal::Int(_) => Ty::Int,
        Literal::Float(_) => Ty::Float,
        Literal::String(_) => Ty::String,
        Literal::Bool(_) => Ty::Bool,
        Literal::Unit => Ty::Unit,
    }
}
