//! Semantic map emitter (spec §4.8). Walks the typed AST and produces the
//! JSON side-channel that maps declaration ids back to source spans,
//! names, and (when an enhancer is supplied) natural-language summaries.

use std::collections::BTreeMap;

use serde::Serialize;
use sigil_common::span::{LineIndex, Span};
use sigil_parser::ast::decl::{Decl, SourceFile};
use sigil_parser::ast::ty::Type;

#[derive(Debug, Clone, Serialize, Default)]
pub struct Range {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Mapping {
    pub range: Range,
    pub summary: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    pub warnings: Vec<String>,
    pub examples: Vec<String>,
    pub related: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticMap {
    pub version: u32,
    pub file: String,
    pub generated_by: String,
    pub generated_at: String,
    pub mappings: BTreeMap<String, Mapping>,
    pub metadata: BTreeMap<String, String>,
}

/// Fills in summaries and explanations the basic extractor leaves empty.
/// Implementations may call out to an external agent; failures must never
/// block emission, so the driver falls back to the basic map on error.
pub trait SemanticMapEnhancer {
    fn enhance(&mut self, map: &mut SemanticMap) -> Result<(), String>;
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Int(_) => "ℤ".to_string(),
        Type::Float(_) => "ℝ".to_string(),
        Type::Bool(_) => "𝔹".to_string(),
        Type::String(_) => "𝕊".to_string(),
        Type::Char(_) => "char".to_string(),
        Type::Unit(_) => "()".to_string(),
        Type::Never(_) => "!".to_string(),
        Type::List(inner, _) => format!("⟦{}⟧", type_name(inner)),
        Type::Map(k, v, _) => format!("{{{}:{}}}", type_name(k), type_name(v)),
        Type::Tuple(items, _) => format!("({})", items.iter().map(type_name).collect::<Vec<_>>().join(", ")),
        Type::Function { params, ret, .. } => format!("({}) → {}", params.iter().map(type_name).collect::<Vec<_>>().join(", "), type_name(ret)),
        Type::Constructor { name, args, .. } => {
            if args.is_empty() {
                name.clone()
            } else {
                format!("{}[{}]", name, args.iter().map(type_name).collect::<Vec<_>>().join(", "))
            }
        }
        Type::Variable { name, .. } => name.clone(),
        Type::Qualified { module_path, name, .. } => format!("{}.{}", module_path.join("."), name),
        Type::Record { fields, .. } => format!("{{{}}}", fields.iter().map(|(n, t)| format!("{}:{}", n, type_name(t))).collect::<Vec<_>>().join(", ")),
    }
}

fn range_of(lines: &LineIndex, span: Span) -> Range {
    let (start, end) = lines.resolve(span);
    Range { start_line: start.line, start_column: start.column, end_line: end.line, end_column: end.column }
}

/// Builds the basic map: every declaration gets an entry with its span,
/// a one-line summary, and its signature type where one applies. Prose
/// `explanation` fields are left empty for an enhancer to fill.
pub fn emit_semantic_map(file: &SourceFile, file_path: &str, generated_at: &str, lines: &LineIndex) -> SemanticMap {
    let mut mappings = BTreeMap::new();
    for decl in &file.decls {
        let (id, summary, ty, span) = match decl {
            Decl::Function(f) => (
                format!("fn:{}", f.name),
                format!("function {}", f.name),
                Some(Type::Function { params: f.params.iter().map(|p| p.ty.clone()).collect(), ret: Box::new(f.ret.clone()), effects: f.effects.clone(), span: f.span }),
                f.span,
            ),
            Decl::Const(c) => (format!("const:{}", c.name), format!("constant {}", c.name), c.ty.clone(), c.span),
            Decl::Type(t) => (format!("type:{}", t.name), format!("type {}", t.name), None, t.span),
            Decl::Extern(e) => (format!("extern:{}", e.name), format!("extern namespace {}", e.name), None, e.span),
            Decl::Import(i) => (format!("import:{}", i.module_path.join(".")), format!("import {}", i.module_path.join(".")), None, i.span),
            Decl::Test(t) => (format!("test:{}", t.name), format!("test \"{}\"", t.name), None, t.span),
        };
        mappings.insert(
            id,
            Mapping {
                range: range_of(lines, span),
                summary,
                explanation: String::new(),
                r#type: ty.map(|t| type_name(&t)),
                complexity: None,
                warnings: Vec::new(),
                examples: Vec::new(),
                related: Vec::new(),
                metadata: BTreeMap::new(),
            },
        );
    }
    SemanticMap {
        version: 1,
        file: file_path.to_string(),
        generated_by: "sigilc".to_string(),
        generated_at: generated_at.to_string(),
        mappings,
        metadata: BTreeMap::new(),
    }
}

/// Runs the basic extractor, then the enhancer if one is supplied. An
/// enhancer failure is logged and the basic map is returned unchanged —
/// the semantic map is advisory tooling, never a compile gate.
pub fn emit_semantic_map_enhanced(
    file: &SourceFile,
    file_path: &str,
    generated_at: &str,
    lines: &LineIndex,
    enhancer: Option<&mut dyn SemanticMapEnhancer>,
) -> SemanticMap {
    let mut map = emit_semantic_map(file, file_path, generated_at, lines);
    if let Some(enhancer) = enhancer {
        if let Err(err) = enhancer.enhance(&mut map) {
            tracing::warn!(error = %err, file = file_path, "semantic map enhancement failed, using basic map");
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_parser::ast::decl::{ConstDecl, FunctionDecl};
    use sigil_parser::ast::expr::{Expr, Literal};

    fn sp(a: u32, b: u32) -> Span {
        Span::new(a, b)
    }

    fn sample_file() -> SourceFile {
        let f = FunctionDecl {
            name: "square".to_string(),
            generics: Vec::new(),
            params: vec![sigil_parser::ast::expr::Param { name: "n".to_string(), ty: Type::Int(sp(0, 1)), is_mutable: false, span: sp(0, 1) }],
            ret: Type::Int(sp(0, 1)),
            effects: Vec::new(),
            is_mockable: false,
            is_exported: true,
            body: Expr::Literal(Literal::Int(1), sp(0, 1)),
            span: sp(0, 20),
        };
        let c = ConstDecl { name: "pi".to_string(), ty: Some(Type::Float(sp(0, 1))), value: Expr::Literal(Literal::Float(3.14), sp(21, 30)), is_exported: false, span: sp(21, 30) };
        SourceFile { decls: vec![Decl::Function(f), Decl::Const(c)], span: sp(0, 30) }
    }

    #[test]
    fn basic_map_has_one_entry_per_decl() {
        let src = "λsquare(n:ℤ)→ℤ=1\nc pi:ℝ=3.14\n";
        let lines = LineIndex::new(src);
        let map = emit_semantic_map(&sample_file(), "src/math.sig", "2026-01-01T00:00:00Z", &lines);
        assert_eq!(map.mappings.len(), 2);
        assert!(map.mappings.contains_key("fn:square"));
        assert!(map.mappings.contains_key("const:pi"));
        assert_eq!(map.mappings["fn:square"].r#type.as_deref(), Some("(ℤ) → ℤ"));
    }

    struct FailingEnhancer;
    impl SemanticMapEnhancer for FailingEnhancer {
        fn enhance(&mut self, _map: &mut SemanticMap) -> Result<(), String> {
            Err("agent unreachable".to_string())
        }
    }

    #[test]
    fn enhancer_failure_falls_back_to_basic_map() {
        let src = "λsquare(n:ℤ)→ℤ=1\nc pi:ℝ=3.14\n";
        let lines = LineIndex::new(src);
        let mut enhancer = FailingEnhancer;
        let map = emit_semantic_map_enhanced(&sample_file(), "src/math.sig", "2026-01-01T00:00:00Z", &lines, Some(&mut enhancer));
        assert_eq!(map.mappings.len(), 2);
        assert_eq!(map.mappings["fn:square"].explanation, "");
    }
}
