//! Async JS/TS emitter and semantic map writer for Sigil (spec §4.7-4.8).
//! Runs last in the per-module pipeline, over an AST that has already
//! passed canonical validation, type checking, and the link-time extern
//! check.

pub mod emit;
pub mod error;
pub mod semmap;

pub use emit::emit_module_js;
pub use error::CodegenError;
pub use semmap::{emit_semantic_map, SemanticMapEnhancer};
