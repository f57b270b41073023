//! Top-level declaration AST (spec §3: `FunctionDecl`, `TypeDecl`,
//! `ImportDecl`, `ExternDecl`, `ConstDecl`, `TestDecl`).

use serde::Serialize;
use sigil_common::effect::Effect;
use sigil_common::span::Span;

use super::expr::{Expr, Param};
use super::ty::Type;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub params: Vec<Param>,
    pub ret: Type,
    pub effects: Vec<Effect>,
    pub is_mockable: bool,
    pub is_exported: bool,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDeclBody {
    Alias(Type),
    Sum { variants: Vec<(String, Vec<Type>)> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub body: TypeDeclBody,
    pub is_exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDecl {
    pub module_path: Vec<String>,
    pub span: Span,
}

/// A named, typed member of a foreign namespace. Absent altogether for an
/// untyped (`Any`-trust) extern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternMember {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternDecl {
    pub name: String,
    pub module_specifier: String,
    pub members: Vec<ExternMember>,
    pub is_exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub name: String,
    pub ty: Option<Type>,
    pub value: Expr,
    pub is_exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestDecl {
    pub name: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decl {
    Type(TypeDecl),
    Extern(ExternDecl),
    Import(ImportDecl),
    Const(ConstDecl),
    Function(FunctionDecl),
    Test(TestDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Type(d) => d.span,
            Decl::Extern(d) => d.span,
            Decl::Import(d) => d.span,
            Decl::Const(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Test(d) => d.span,
        }
    }

    /// Declaration-category rank used by the canonical validator for the
    /// mandated ordering: types, then externs, then imports, then consts,
    /// then functions, then tests.
    pub fn category_rank(&self) -> u8 {
        match self {
            Decl::Type(_) => 0,
            Decl::Extern(_) => 1,
            Decl::Import(_) => 2,
            Decl::Const(_) => 3,
            Decl::Function(_) => 4,
            Decl::Test(_) => 5,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Decl::Type(d) => &d.name,
            Decl::Extern(d) => &d.name,
            Decl::Import(_) => "",
            Decl::Const(d) => &d.name,
            Decl::Function(d) => &d.name,
            Decl::Test(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    pub decls: Vec<Decl>,
    pub span: Span,
}
