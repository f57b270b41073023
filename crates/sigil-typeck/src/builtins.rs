//! Operator typing rules (spec §4.5 "Binary `+`: if either operand
//! synthesizes to String...").

use sigil_parser::ast::{BinaryOp, UnaryOp};

use crate::error::TypeError;
use crate::ty::Ty;
use sigil_common::span::Span;

/// Types a binary operator given the already-synthesized operand types.
/// `+` is overloaded: string concatenation when either side is `String`,
/// otherwise plain integer addition.
pub fn binary_op_type(op: BinaryOp, lhs: &Ty, rhs: &Ty, span: Span) -> Result<Ty, TypeError> {
    match op {
        BinaryOp::Add => {
            if lhs.is_any() || rhs.is_any() {
                return Ok(Ty::Any);
            }
            if *lhs == Ty::String || *rhs == Ty::String {
                return Ok(Ty::String);
            }
            require_int(lhs, span)?;
            require_int(rhs, span)?;
            Ok(Ty::Int)
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
            require_int(lhs, span)?;
            require_int(rhs, span)?;
            Ok(Ty::Int)
        }
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            require_int(lhs, span)?;
            require_int(rhs, span)?;
            Ok(Ty::Bool)
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            if !lhs.compatible(rhs) {
                return Err(TypeError::Mismatch { expected: lhs.clone(), found: rhs.clone(), span });
            }
            Ok(Ty::Bool)
        }
        BinaryOp::And | BinaryOp::Or => {
            require_bool(lhs, span)?;
            require_bool(rhs, span)?;
            Ok(Ty::Bool)
        }
        BinaryOp::StringConcat => {
            require_string(lhs, span)?;
            require_string(rhs, span)?;
            Ok(Ty::String)
        }
        BinaryOp::ListConcat => match (lhs, rhs) {
            (Ty::List(a), Ty::List(b)) if a.compatible(b) => Ok(Ty::List(a.clone())),
            (Ty::Any, other) | (other, Ty::Any) => Ok(other.clone()),
            _ => Err(TypeError::Mismatch { expected: lhs.clone(), found: rhs.clone(), span }),
        },
    }
}

pub fn unary_op_type(op: UnaryOp, operand: &Ty, span: Span) -> Result<Ty, TypeError> {
    match op {
        UnaryOp::Neg => {
            require_int(operand, span)?;
            Ok(Ty::Int)
        }
        UnaryOp::Not => {
            require_bool(operand, span)?;
            Ok(Ty::Bool)
        }
        UnaryOp::Len => match operand {
            Ty::String | Ty::List(_) | Ty::Any => Ok(Ty::Int),
            other => Err(TypeError::Mismatch { expected: Ty::String, found: other.clone(), span }),
        },
    }
}

fn require_int(ty: &Ty, span: Span) -> Result<(), TypeError> {
    if ty.is_any() || ty.is_numeric() {
        Ok(())
    } else {
        Err(TypeError::Mismatch { expected: Ty::Int, found: ty.clone(), span })
    }
}

fn require_bool(ty: &Ty, span: Span) -> Result<(), TypeError> {
    if ty.is_any() || *ty == Ty::Bool {
        Ok(())
    } else {
        Err(TypeError::Mismatch { expected: Ty::Bool, found: ty.clone(), span })
    }
}

fn require_string(ty: &Ty, span: Span) -> Result<(), TypeError> {
    if ty.is_any() || *ty == Ty::String {
        Ok(())
    } else {
        Err(TypeError::Mismatch { expected: Ty::String, found: ty.clone(), span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_string_operand_is_concat() {
        let span = Span::new(0, 1);
        assert_eq!(binary_op_type(BinaryOp::Add, &Ty::String, &Ty::Int, span).unwrap(), Ty::String);
    }

    #[test]
    fn add_with_two_ints_is_int() {
        let span = Span::new(0, 1);
        assert_eq!(binary_op_type(BinaryOp::Add, &Ty::Int, &Ty::Int, span).unwrap(), Ty::Int);
    }

    #[test]
    fn sub_rejects_non_int() {
        let span = Span::new(0, 1);
        assert!(binary_op_type(BinaryOp::Sub, &Ty::String, &Ty::Int, span).is_err());
    }

    #[test]
    fn equality_requires_compatible_operands() {
        let span = Span::new(0, 1);
        assert!(binary_op_type(BinaryOp::Eq, &Ty::Int, &Ty::String, span).is_err());
        assert_eq!(binary_op_type(BinaryOp::Eq, &Ty::Int, &Ty::Int, span).unwrap(), Ty::Bool);
    }

    #[test]
    fn len_accepts_string_or_list() {
        let span = Span::new(0, 1);
        assert_eq!(unary_op_type(UnaryOp::Len, &Ty::String, span).unwrap(), Ty::Int);
        assert_eq!(unary_op_type(UnaryOp::Len, &Ty::List(Box::new(Ty::Int)), span).unwrap(), Ty::Int);
    }
}
