//! Declaration-level emission: each top-level `Decl` becomes an ES module
//! statement. Type aliases are erased entirely; sum types become tagged
//! factory functions; tests are collected into a single exported array
//! rather than emitted as standalone functions (spec §4.7).

use sigil_common::span::{LineIndex, Span};
use sigil_parser::ast::decl::{ConstDecl, Decl, ExternDecl, FunctionDecl, ImportDecl, SourceFile, TestDecl, TypeDecl, TypeDeclBody};
use sigil_parser::ast::expr::{BinaryOp, Expr};

use super::expr::emit_expr;
use super::prelude::PRELUDE;
use super::{sanitize_ident, EmitCtx};

fn export_prefix(is_exported: bool) -> &'static str {
    if is_exported {
        "export "
    } else {
        ""
    }
}

fn emit_import(d: &ImportDecl) -> String {
    // Bound under its last path segment, matching the identifier the
    // type checker binds for `i ns⋅sub` (`env.bind(path.last(), ...)`),
    // which is also what a qualified-access expression's own `path`
    // resolves to at the call site.
    let js_name = sanitize_ident(d.module_path.last().map(String::as_str).unwrap_or_default());
    let path = d.module_path.join("/");
    format!("import * as {} from './{}.js';\n", js_name, path)
}

fn emit_extern(d: &ExternDecl) -> String {
    let name = sanitize_ident(&d.name);
    if d.is_exported {
        format!("export * as {} from {};\n", name, serde_json::to_string(&d.module_specifier).unwrap())
    } else {
        format!("import * as {} from {};\n", name, serde_json::to_string(&d.module_specifier).unwrap())
    }
}

fn emit_type(d: &TypeDecl) -> String {
    match &d.body {
        TypeDeclBody::Alias(_) => String::new(),
        TypeDeclBody::Sum { variants } => {
            let mut out = String::new();
            for (name, arg_types) in variants {
                let params: Vec<String> = (0..arg_types.len()).map(|i| format!("__a{}", i)).collect();
                out.push_str(&format!(
                    "{}function {}({}) {{ return {{ __tag: {}, __fields: [{}] }}; }}\n",
                    export_prefix(d.is_exported),
                    sanitize_ident(name),
                    params.join(", "),
                    serde_json::to_string(name).unwrap(),
                    params.join(", ")
                ));
            }
            out
        }
    }
}

fn emit_const(d: &ConstDecl, ctx: &EmitCtx) -> String {
    format!("{}const {} = {};\n", export_prefix(d.is_exported), sanitize_ident(&d.name), emit_expr(&d.value, ctx))
}

fn emit_function(d: &FunctionDecl, ctx: &EmitCtx) -> String {
    let params: Vec<String> = d.params.iter().map(|p| sanitize_ident(&p.name)).collect();
    format!(
        "{}async function {}({}) {{ return ({}); }}\n",
        export_prefix(d.is_exported),
        sanitize_ident(&d.name),
        params.join(", "),
        emit_expr(&d.body, ctx)
    )
}

/// A top-level comparison body (`x = y`, `x ≤ y`, ...) reports its
/// operands via `__sigil_test_compare_result`; anything else is treated as
/// a boolean assertion.
fn comparison_operator(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Eq => Some("="),
        BinaryOp::Ne => Some("≠"),
        BinaryOp::Lt => Some("<"),
        BinaryOp::Gt => Some(">"),
        BinaryOp::Le => Some("≤"),
        BinaryOp::Ge => Some("≥"),
        _ => None,
    }
}

fn emit_test_body(body: &Expr, ctx: &EmitCtx) -> (String, &'static str) {
    if let Expr::Binary { op, lhs, rhs, .. } = body {
        if let Some(operator) = comparison_operator(*op) {
            let js = format!(
                "async () => __sigil_test_compare_result({}, {}, {})",
                serde_json::to_string(operator).unwrap(),
                emit_expr(lhs, ctx),
                emit_expr(rhs, ctx)
            );
            return (js, "comparison");
        }
    }
    (format!("async () => __sigil_test_bool_result({})", emit_expr(body, ctx)), "boolean")
}

fn emit_tests(tests: &[&TestDecl], ctx: &EmitCtx, _lines: &LineIndex) -> String {
    if tests.is_empty() {
        return "export const __sigil_tests = [];\n".to_string();
    }
    let mut entries = Vec::new();
    for t in tests {
        let (body_js, assertion) = emit_test_body(&t.body, ctx);
        entries.push(format!(
            "{{ name: {}, body: {}, location: {{ start: {}, end: {} }}, declaredEffects: [], assertion: {} }}",
            serde_json::to_string(&t.name).unwrap(),
            body_js,
            t.span.start,
            t.span.end,
            serde_json::to_string(assertion).unwrap()
        ));
    }
    format!("export const __sigil_tests = [\n  {}\n];\n", entries.join(",\n  "))
}

/// Emits the full JS unit for one source file: runtime prelude, imports,
/// declarations in source order, then the collected test table.
pub fn emit_module(file: &SourceFile, source: &str) -> String {
    let ctx = EmitCtx::new(file);
    let lines = LineIndex::new(source);
    let mut out = String::new();
    out.push_str(PRELUDE);
    out.push('\n');
    let mut tests: Vec<&TestDecl> = Vec::new();
    for decl in &file.decls {
        match decl {
            Decl::Import(d) => out.push_str(&emit_import(d)),
            Decl::Extern(d) => out.push_str(&emit_extern(d)),
            Decl::Type(d) => out.push_str(&emit_type(d)),
            Decl::Const(d) => out.push_str(&emit_const(d, &ctx)),
            Decl::Function(d) => out.push_str(&emit_function(d, &ctx)),
            Decl::Test(t) => tests.push(t),
        }
    }
    out.push_str(&emit_tests(&tests, &ctx, &lines));
    out
}
