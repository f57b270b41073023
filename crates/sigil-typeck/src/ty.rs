//! Type representation for the Sigil type system (spec §3, §4.5).
//!
//! Types are a closed set with no inference variables: every binding site
//! is mandatorily annotated, so the checker never needs unification. `Any`
//! is the single trust-bypass type, carried by untyped externs and used as
//! an escape hatch that skips argument checking on application.

use std::fmt;

use sigil_common::effect::EffectSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Int,
    Float,
    Bool,
    String,
    Char,
    Unit,
    Never,
    List(Box<Ty>),
    Map(Box<Ty>, Box<Ty>),
    Tuple(Vec<Ty>),
    Function { params: Vec<Ty>, ret: Box<Ty>, effects: EffectSet },
    /// A user-declared sum type or its constructor, named and possibly
    /// generic (`Option[Int]`).
    Constructor { name: String, args: Vec<Ty> },
    /// A structural record: `{x: Int, y: Int}`.
    Record(Vec<(String, Ty)>),
    /// A declared generic parameter (`T` in `λidentity[T](x:T)→T`).
    Variable(String),
    /// The trust-bypass type: untyped externs and their members. Skips
    /// argument/member checking wherever it appears.
    Any,
}

impl Ty {
    pub fn is_any(&self) -> bool {
        matches!(self, Ty::Any)
    }

    /// Structural equality used everywhere the checker compares two
    /// expected/found types, except that `Any` is compatible with anything
    /// (the trust-mode relaxation described in spec §4.5/§4.6).
    pub fn compatible(&self, other: &Ty) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }
        match (self, other) {
            (Ty::List(a), Ty::List(b)) => a.compatible(b),
            (Ty::Map(ak, av), Ty::Map(bk, bv)) => ak.compatible(bk) && av.compatible(bv),
            (Ty::Tuple(a), Ty::Tuple(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.compatible(y)),
            (
                Ty::Function { params: ap, ret: ar, .. },
                Ty::Function { params: bp, ret: br, .. },
            ) => ap.len() == bp.len() && ap.iter().zip(bp).all(|(x, y)| x.compatible(y)) && ar.compatible(br),
            (Ty::Constructor { name: an, args: aa }, Ty::Constructor { name: bn, args: ba }) => {
                an == bn && aa.len() == ba.len() && aa.iter().zip(ba).all(|(x, y)| x.compatible(y))
            }
            (Ty::Record(a), Ty::Record(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(name, ty)| b.iter().any(|(n2, t2)| n2 == name && ty.compatible(t2)))
            }
            (Ty::Variable(a), Ty::Variable(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "ℤ"),
            Ty::Float => write!(f, "Float"),
            Ty::Bool => write!(f, "𝔹"),
            Ty::String => write!(f, "𝕊"),
            Ty::Char => write!(f, "Char"),
            Ty::Unit => write!(f, "Unit"),
            Ty::Never => write!(f, "Never"),
            Ty::List(elem) => write!(f, "List[{elem}]"),
            Ty::Map(k, v) => write!(f, "Map[{k},{v}]"),
            Ty::Tuple(elems) => {
                write!(f, "Tuple(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Ty::Function { params, ret, effects } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")→{ret}")?;
                if !effects.is_empty() {
                    write!(f, "{{")?;
                    for (i, e) in effects.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{e}")?;
                    }
                    write!(f, "}}")?;
                }
                Ok(())
            }
            Ty::Constructor { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            Ty::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name}:{ty}")?;
                }
                write!(f, "}}")
            }
            Ty::Variable(name) => write!(f, "{name}"),
            Ty::Any => write!(f, "Any"),
        }
    }
}

/// Converts the parser's closed type-syntax AST into the checker's `Ty`.
/// `generics` names the type parameters in scope (bound to `Ty::Variable`
/// rather than looked up as constructors).
pub fn from_ast(ty: &sigil_parser::ast::Type, generics: &[String]) -> Ty {
    use sigil_parser::ast::Type as AstTy;
    match ty {
        AstTy::Int(_) => Ty::Int,
        AstTy::Float(_) => Ty::Float,
        AstTy::Bool(_) => Ty::Bool,
        AstTy::String(_) => Ty::String,
        AstTy::Char(_) => Ty::Char,
        AstTy::Unit(_) => Ty::Unit,
        AstTy::Never(_) => Ty::Never,
        AstTy::List(elem, _) => Ty::List(Box::new(from_ast(elem, generics))),
        AstTy::Map(k, v, _) => Ty::Map(Box::new(from_ast(k, generics)), Box::new(from_ast(v, generics))),
        AstTy::Tuple(elems, _) => Ty::Tuple(elems.iter().map(|t| from_ast(t, generics)).collect()),
        AstTy::Function { params, ret, effects, .. } => Ty::Function {
            params: params.iter().map(|t| from_ast(t, generics)).collect(),
            ret: Box::new(from_ast(ret, generics)),
            effects: effects.iter().copied().collect(),
        },
        AstTy::Constructor { name, args, .. } => {
            if args.is_empty() && generics.iter().any(|g| g == name) {
                Ty::Variable(name.clone())
            } else {
                Ty::Constructor { name: name.clone(), args: args.iter().map(|t| from_ast(t, generics)).collect() }
            }
        }
        AstTy::Variable { name, .. } => Ty::Variable(name.clone()),
        AstTy::Qualified { name, args, .. } => {
            Ty::Constructor { name: name.clone(), args: args.iter().map(|t| from_ast(t, generics)).collect() }
        }
        AstTy::Record { fields, .. } => {
            Ty::Record(fields.iter().map(|(n, t)| (n.clone(), from_ast(t, generics))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_common::effect::Effect;

    #[test]
    fn any_is_compatible_with_everything() {
        assert!(Ty::Any.compatible(&Ty::Int));
        assert!(Ty::Int.compatible(&Ty::Any));
    }

    #[test]
    fn list_compatibility_is_structural() {
        assert!(Ty::List(Box::new(Ty::Int)).compatible(&Ty::List(Box::new(Ty::Int))));
        assert!(!Ty::List(Box::new(Ty::Int)).compatible(&Ty::List(Box::new(Ty::String))));
    }

    #[test]
    fn function_display_includes_effects() {
        let f = Ty::Function { params: vec![Ty::Int], ret: Box::new(Ty::Int), effects: [Effect::IO].into_iter().collect() };
        assert_eq!(f.to_string(), "(ℤ)→ℤ{IO}");
    }
}
