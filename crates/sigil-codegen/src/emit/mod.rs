//! Async JS emission (spec §4.7). Every Sigil function becomes `async`;
//! every call becomes `await`ed; pattern matches lower to an IIFE.

pub mod decl;
pub mod expr;
pub mod pattern;
pub mod prelude;

pub use decl::emit_module as emit_module_js;

use rustc_hash::FxHashSet;
use sigil_parser::ast::decl::SourceFile;

/// Replaces characters a JS identifier can't carry. Sigil source
/// identifiers are plain ASCII words in every example seen so far; this
/// only guards against the unexpected.
pub fn sanitize_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()) {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.chars().next().unwrap().is_ascii_digit() {
        out.insert(0, '_');
    }
    out
}

/// Collects the names of every function declared `mockable`, so the
/// expression emitter knows which `Apply` callees must route through
/// `__sigil_call`.
pub fn mockable_names(file: &SourceFile) -> FxHashSet<String> {
    use sigil_parser::ast::decl::Decl;
    file.decls
        .iter()
        .filter_map(|d| match d {
            Decl::Function(f) if f.is_mockable => Some(f.name.clone()),
            _ => None,
        })
        .collect()
}

pub struct EmitCtx {
    pub mockable: FxHashSet<String>,
}

impl EmitCtx {
    pub fn new(file: &SourceFile) -> Self {
        EmitCtx { mockable: mockable_names(file) }
    }
}
