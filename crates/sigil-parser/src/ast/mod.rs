//! Typed AST for Sigil source. No concrete syntax tree layer: the parser
//! builds these nodes directly, since there is no downstream consumer
//! (formatter, editor service) that would need lossless syntax trees.

pub mod decl;
pub mod expr;
pub mod pat;
pub mod ty;

pub use decl::{ConstDecl, Decl, ExternDecl, ExternMember, FunctionDecl, ImportDecl, SourceFile, TestDecl, TypeDecl, TypeDeclBody};
pub use expr::{BinaryOp, Expr, Literal, MatchArm, Param, UnaryOp};
pub use pat::Pattern;
pub use ty::Type;
