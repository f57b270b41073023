//! Hand-written recursive-descent parser that turns a Sigil token stream
//! into the typed AST (spec §3, §4.3). No lossless syntax tree: there is
//! no formatter or editor service downstream that would need one, so the
//! parser builds `ast::SourceFile` nodes directly.

pub mod ast;
pub mod error;
mod parser;

pub use error::ParseError;
pub use parser::parse;

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{Decl, Expr, Literal, TypeDeclBody};
    use sigil_lexer::lex;

    fn parse_str(src: &str) -> ast::SourceFile {
        let tokens = lex(src).unwrap();
        parse(src, tokens).unwrap()
    }

    #[test]
    fn factorial_round_trip_parses() {
        let file = parse_str(
            "λfactorial(n:ℤ)→ℤ≡n{0→1|1→1|n→n*factorial(n-1)}\nλmain()→ℤ=factorial(5)\n",
        );
        assert_eq!(file.decls.len(), 2);
        let Decl::Function(factorial) = &file.decls[0] else { panic!("expected a function decl") };
        assert_eq!(factorial.name, "factorial");
        match &factorial.body {
            Expr::Match { arms, .. } => assert_eq!(arms.len(), 3),
            other => panic!("expected a match body, got {other:?}"),
        }
        let Decl::Function(main) = &file.decls[1] else { panic!("expected a function decl") };
        assert_eq!(main.name, "main");
        match &main.body {
            Expr::Apply { .. } => {}
            other => panic!("expected an apply expr, got {other:?}"),
        }
    }

    #[test]
    fn accumulator_shaped_function_still_parses() {
        // Canonical rejection of this shape is the canonical validator's
        // job, not the parser's; the grammar itself accepts it.
        let file = parse_str(
            "λfactorial(n:ℤ,acc:ℤ)→ℤ≡n{0→acc|n→factorial(n-1,n*acc)}\n",
        );
        let Decl::Function(f) = &file.decls[0] else { panic!("expected a function decl") };
        assert_eq!(f.params.len(), 2);
    }

    #[test]
    fn alphabetical_ordering_example_parses() {
        let file = parse_str("λzebra()→ℤ=1\nλapple()→ℤ=2\nλmain()→ℤ=apple()+zebra()\n");
        assert_eq!(file.decls.len(), 3);
    }

    #[test]
    fn test_declaration_with_comparison_assertion_parses() {
        let file = parse_str("test \"add works\" { 1+1 = 2 }\n");
        let Decl::Test(t) = &file.decls[0] else { panic!("expected a test decl") };
        assert_eq!(t.name, "add works");
        match &t.body {
            Expr::Binary { op: ast::BinaryOp::Eq, .. } => {}
            other => panic!("expected an `=` comparison, got {other:?}"),
        }
    }

    #[test]
    fn extern_declaration_with_typed_members_parses() {
        let file = parse_str("e fs(\"node:fs/promises\") {readFile: (𝕊)→𝕊{IO}, writeFile: (𝕊,𝕊)→Unit{IO}}\n");
        let Decl::Extern(e) = &file.decls[0] else { panic!("expected an extern decl") };
        assert_eq!(e.name, "fs");
        assert_eq!(e.module_specifier, "node:fs/promises");
        assert_eq!(e.members.len(), 2);
        assert_eq!(e.members[0].name, "readFile");
    }

    #[test]
    fn untyped_extern_has_no_members() {
        let file = parse_str("e console(\"node:console\")\n");
        let Decl::Extern(e) = &file.decls[0] else { panic!("expected an extern decl") };
        assert!(e.members.is_empty());
    }

    #[test]
    fn sum_type_requires_leading_pipe() {
        let file = parse_str("t Option[T]=|Some(T)|None\n");
        let Decl::Type(t) = &file.decls[0] else { panic!("expected a type decl") };
        match &t.body {
            TypeDeclBody::Sum { variants } => {
                assert_eq!(variants.len(), 2);
                assert_eq!(variants[0].0, "Some");
                assert_eq!(variants[1].0, "None");
            }
            other => panic!("expected a sum type, got {other:?}"),
        }
    }

    #[test]
    fn type_alias_has_no_leading_pipe() {
        let file = parse_str("t Id=ℤ\n");
        let Decl::Type(t) = &file.decls[0] else { panic!("expected a type decl") };
        match &t.body {
            TypeDeclBody::Alias(_) => {}
            other => panic!("expected a type alias, got {other:?}"),
        }
    }

    #[test]
    fn if_then_else_parses() {
        let file = parse_str("λmax(a:ℤ,b:ℤ)→ℤ=if a>b then a else b\n");
        let Decl::Function(f) = &file.decls[0] else { panic!("expected a function decl") };
        match &f.body {
            Expr::If { .. } => {}
            other => panic!("expected an if expr, got {other:?}"),
        }
    }

    #[test]
    fn mutable_parameter_marked() {
        let file = parse_str("λbump(mut x:ℤ)→ℤ=x\n");
        let Decl::Function(f) = &file.decls[0] else { panic!("expected a function decl") };
        assert!(f.params[0].is_mutable);
    }

    #[test]
    fn match_guard_uses_if_keyword() {
        let file = parse_str("λsign(n:ℤ)→ℤ≡n{n if n>0→1|n if n<0→-1|n→0}\n");
        let Decl::Function(f) = &file.decls[0] else { panic!("expected a function decl") };
        match &f.body {
            Expr::Match { arms, .. } => {
                assert!(arms[0].guard.is_some());
                assert!(arms[2].guard.is_none());
            }
            other => panic!("expected a match body, got {other:?}"),
        }
    }

    #[test]
    fn export_forbidden_before_test() {
        let tokens = lex("export test \"x\" { 1=1 }\n").unwrap();
        let err = parse("export test \"x\" { 1=1 }\n", tokens).unwrap_err();
        assert_eq!(err.code, "SIGIL-PARSE-EXPORT-FORBIDDEN-TEST");
    }

    #[test]
    fn export_forbidden_before_extern() {
        let tokens = lex("export e fs(\"node:fs\")\n").unwrap();
        let err = parse("export e fs(\"node:fs\")\n", tokens).unwrap_err();
        assert_eq!(err.code, "SIGIL-PARSE-EXPORT-NOT-ALLOWED");
    }

    #[test]
    fn qualified_access_parses_namespace_path() {
        let file = parse_str("c x:ℤ=ns⋅sub.member\n");
        let Decl::Const(c) = &file.decls[0] else { panic!("expected a const decl") };
        match &c.value {
            Expr::QualifiedAccess { path, member, .. } => {
                assert_eq!(path, &vec!["ns".to_string(), "sub".to_string()]);
                assert_eq!(member, "member");
            }
            other => panic!("expected a qualified access, got {other:?}"),
        }
    }

    #[test]
    fn unit_literal_parses() {
        let file = parse_str("c x:Unit=()\n");
        let Decl::Const(c) = &file.decls[0] else { panic!("expected a const decl") };
        match &c.value {
            Expr::Literal(Literal::Unit, _) => {}
            other => panic!("expected a unit literal, got {other:?}"),
        }
    }
}
