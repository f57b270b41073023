//! Expression-to-JS lowering (spec §4.7).

use sigil_parser::ast::expr::{BinaryOp, Expr, Literal, UnaryOp};

use super::pattern::{emit_irrefutable_bindings, emit_pattern};
use super::{sanitize_ident, EmitCtx};

fn literal_js(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) => n.to_string(),
        Literal::Float(n) => n.to_string(),
        Literal::String(s) => serde_json::to_string(s).expect("string literal serializes"),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "undefined".to_string(),
    }
}

fn binary_js(op: BinaryOp, lhs: &str, rhs: &str) -> String {
    match op {
        BinaryOp::Add | BinaryOp::StringConcat => format!("({} + {})", lhs, rhs),
        BinaryOp::Sub => format!("({} - {})", lhs, rhs),
        BinaryOp::Mul => format!("({} * {})", lhs, rhs),
        BinaryOp::Div => format!("({} / {})", lhs, rhs),
        BinaryOp::Mod => format!("({} % {})", lhs, rhs),
        BinaryOp::Pow => format!("({} ** {})", lhs, rhs),
        BinaryOp::ListConcat => format!("[...({}), ...({})]", lhs, rhs),
        BinaryOp::Eq => format!("({} === {})", lhs, rhs),
        BinaryOp::Ne => format!("({} !== {})", lhs, rhs),
        BinaryOp::Lt => format!("({} < {})", lhs, rhs),
        BinaryOp::Gt => format!("({} > {})", lhs, rhs),
        BinaryOp::Le => format!("({} <= {})", lhs, rhs),
        BinaryOp::Ge => format!("({} >= {})", lhs, rhs),
        BinaryOp::And => format!("({} && {})", lhs, rhs),
        BinaryOp::Or => format!("({} || {})", lhs, rhs),
    }
}

fn unary_js(op: UnaryOp, operand: &str) -> String {
    match op {
        UnaryOp::Neg => format!("(-{})", operand),
        UnaryOp::Not => format!("(!{})", operand),
        UnaryOp::Len => format!("({}).length", operand),
    }
}

/// JS identifier for a qualified namespace path. Matches the alias
/// `emit_import` binds the namespace under -- its last path segment,
/// not the full joined path.
pub fn namespace_js_name(path: &[String]) -> String {
    sanitize_ident(path.last().map(String::as_str).unwrap_or_default())
}

pub fn emit_expr(expr: &Expr, ctx: &EmitCtx) -> String {
    match expr {
        Expr::Literal(lit, _) => literal_js(lit),
        Expr::Identifier(name, _) => sanitize_ident(name),
        Expr::QualifiedAccess { path, member, .. } => {
            format!("{}.{}", namespace_js_name(path), sanitize_ident(member))
        }
        Expr::FieldAccess { base, field, .. } => format!("{}.{}", emit_expr(base, ctx), sanitize_ident(field)),
        Expr::Index { base, index, .. } => format!("{}[{}]", emit_expr(base, ctx), emit_expr(index, ctx)),
        Expr::Binary { op, lhs, rhs, .. } => binary_js(*op, &emit_expr(lhs, ctx), &emit_expr(rhs, ctx)),
        Expr::Unary { op, operand, .. } => unary_js(*op, &emit_expr(operand, ctx)),
        Expr::Apply { callee, args, .. } => emit_apply(callee, args, ctx),
        Expr::Lambda { params, body, .. } => {
            let params_js = params.iter().map(|p| sanitize_ident(&p.name)).collect::<Vec<_>>().join(", ");
            format!("(async ({}) => ({}))", params_js, emit_expr(body, ctx))
        }
        Expr::Match { scrutinee, arms, .. } => emit_match(scrutinee, arms, ctx),
        Expr::If { cond, then_branch, else_branch, .. } => {
            format!("({} ? ({}) : ({}))", emit_expr(cond, ctx), emit_expr(then_branch, ctx), emit_expr(else_branch, ctx))
        }
        Expr::Let { pattern, value, body, .. } => {
            let mut stmts = vec![format!("const __let = {};", emit_expr(value, ctx))];
            stmts.extend(emit_irrefutable_bindings(pattern, "__let"));
            format!("(await (async () => {{ {} return ({}); }})())", stmts.join(" "), emit_expr(body, ctx))
        }
        Expr::List { elements, rest, .. } => {
            let items: Vec<String> = elements.iter().map(|e| emit_expr(e, ctx)).collect();
            match rest {
                Some(rest) => format!("[{}, ...({})]", items.join(", "), emit_expr(rest, ctx)),
                None => format!("[{}]", items.join(", ")),
            }
        }
        Expr::Tuple(elements, _) => {
            let items: Vec<String> = elements.iter().map(|e| emit_expr(e, ctx)).collect();
            format!("[{}]", items.join(", "))
        }
        Expr::Record { fields, .. } => {
            let items: Vec<String> = fields.iter().map(|(name, value)| format!("{}: {}", sanitize_ident(name), emit_expr(value, ctx))).collect();
            format!("{{ {} }}", items.join(", "))
        }
        Expr::MapOp { source, func, .. } => {
            format!(
                "(await Promise.all(({}).map(async (__item) => await ({})(__item))))",
                emit_expr(source, ctx),
                emit_expr(func, ctx)
            )
        }
        Expr::FilterOp { source, predicate, .. } => {
            format!("(await __sigil_filter({}, {}))", emit_expr(source, ctx), emit_expr(predicate, ctx))
        }
        Expr::FoldOp { source, func, init, .. } => {
            format!("(await __sigil_fold({}, {}, {}))", emit_expr(source, ctx), emit_expr(func, ctx), emit_expr(init, ctx))
        }
        Expr::Pipeline { value, func, .. } => format!("(await ({})({}))", emit_expr(func, ctx), emit_expr(value, ctx)),
        Expr::WithMock { target, mock, body, .. } => emit_with_mock(target, mock, body, ctx),
        Expr::Ascription { expr, .. } => emit_expr(expr, ctx),
    }
}

fn emit_apply(callee: &Expr, args: &[Expr], ctx: &EmitCtx) -> String {
    let args_js: Vec<String> = args.iter().map(|a| emit_expr(a, ctx)).collect();
    if let Expr::Identifier(name, _) = callee {
        if ctx.mockable.contains(name) {
            let ident = sanitize_ident(name);
            return format!("(await __sigil_call({}, {}, [{}]))", serde_json::to_string(name).unwrap(), ident, args_js.join(", "));
        }
    }
    format!("(await ({})({}))", emit_expr(callee, ctx), args_js.join(", "))
}

fn emit_with_mock(target: &Expr, mock: &Expr, body: &Expr, ctx: &EmitCtx) -> String {
    let mock_js = emit_expr(mock, ctx);
    let body_js = format!("(async () => ({}))", emit_expr(body, ctx));
    match target {
        Expr::QualifiedAccess { path, member, .. } => {
            let original = format!("{}.{}", namespace_js_name(path), sanitize_ident(member));
            let label = format!("{}.{}", path.join("."), member);
            format!("(await __sigil_with_mock_extern({}, {}, {}, {}))", serde_json::to_string(&label).unwrap(), original, mock_js, body_js)
        }
        Expr::Identifier(name, _) => {
            format!("(await __sigil_with_mock({}, {}, {}))", serde_json::to_string(name).unwrap(), mock_js, body_js)
        }
        other => format!("(await __sigil_with_mock({}, {}, {}))", serde_json::to_string(&emit_expr(other, ctx)).unwrap(), mock_js, body_js),
    }
}

/// Lowers a `match` to the IIFE shape from spec §4.7: a `__match` const
/// holding the scrutinee, arms as sequential `if` tests, and a throw if
/// nothing matched.
fn emit_match(scrutinee: &Expr, arms: &[sigil_parser::ast::expr::MatchArm], ctx: &EmitCtx) -> String {
    let mut body = String::new();
    body.push_str(&format!("const __match = {};", emit_expr(scrutinee, ctx)));
    for arm in arms {
        let compiled = emit_pattern(&arm.pattern, "__match");
        let mut test = compiled.test;
        let mut preamble = compiled.bindings.join(" ");
        if let Some(guard) = &arm.guard {
            if !preamble.is_empty() {
                body.push_str(&format!(
                    " if ({}) {{ {} if ({}) {{ return ({}); }} }}",
                    test,
                    preamble,
                    emit_expr(guard, ctx),
                    emit_expr(&arm.body, ctx)
                ));
            } else {
                test = format!("({}) && ({})", test, emit_expr(guard, ctx));
                body.push_str(&format!(" if ({}) {{ return ({}); }}", test, emit_expr(&arm.body, ctx)));
            }
        } else {
            if !preamble.is_empty() {
                preamble.push(' ');
            }
            body.push_str(&format!(" if ({}) {{ {}return ({}); }}", test, preamble, emit_expr(&arm.body, ctx)));
        }
    }
    body.push_str(" throw new Error('Match failed: no pattern matched');");
    format!("(await (async () => {{ {} }})())", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;
    use sigil_common::span::Span;
    use sigil_parser::ast::pat::Pattern;

    fn ctx() -> EmitCtx {
        EmitCtx { mockable: FxHashSet::default() }
    }

    fn sp() -> Span {
        Span::new(0, 1)
    }

    #[test]
    fn literal_and_binary_roundtrip() {
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expr::Literal(Literal::Int(1), sp())),
            rhs: Box::new(Expr::Literal(Literal::Int(2), sp())),
            span: sp(),
        };
        assert_eq!(emit_expr(&expr, &ctx()), "(1 + 2)");
    }

    #[test]
    fn plain_call_is_awaited() {
        let expr = Expr::Apply { callee: Box::new(Expr::Identifier("helper".to_string(), sp())), args: vec![Expr::Literal(Literal::Int(1), sp())], span: sp() };
        assert_eq!(emit_expr(&expr, &ctx()), "(await (helper)(1))");
    }

    #[test]
    fn mockable_call_routes_through_sigil_call() {
        let mut mockable = FxHashSet::default();
        mockable.insert("fetchUser".to_string());
        let c = EmitCtx { mockable };
        let expr = Expr::Apply { callee: Box::new(Expr::Identifier("fetchUser".to_string(), sp())), args: vec![], span: sp() };
        let js = emit_expr(&expr, &c);
        assert!(js.contains("__sigil_call(\"fetchUser\", fetchUser, [])"));
    }

    #[test]
    fn match_lowers_to_iife_with_fallthrough_throw() {
        let expr = Expr::Match {
            scrutinee: Box::new(Expr::Identifier("x".to_string(), sp())),
            arms: vec![sigil_parser::ast::expr::MatchArm {
                pattern: Pattern::Literal(Literal::Int(0), sp()),
                guard: None,
                body: Expr::Literal(Literal::Int(100), sp()),
                span: sp(),
            }],
            span: sp(),
        };
        let js = emit_expr(&expr, &ctx());
        assert!(js.contains("const __match = x;"));
        assert!(js.contains("Match failed: no pattern matched"));
    }

    #[test]
    fn list_concat_uses_spread() {
        let expr = Expr::Binary {
            op: BinaryOp::ListConcat,
            lhs: Box::new(Expr::Identifier("a".to_string(), sp())),
            rhs: Box::new(Expr::Identifier("b".to_string(), sp())),
            span: sp(),
        };
        assert_eq!(emit_expr(&expr, &ctx()), "[...(a), ...(b)]");
    }

    #[test]
    fn qualified_access_uses_last_segment_as_namespace() {
        let expr = Expr::QualifiedAccess { path: vec!["stdlib".to_string(), "list".to_string()], member: "map".to_string(), span: sp() };
        assert_eq!(emit_expr(&expr, &ctx()), "list.map");
    }
}
