//! Pattern grammar: the closed 7-variant pattern set (spec §3).

use sigil_common::span::Span;
use sigil_common::token::TokenKind;

use crate::ast::expr::Literal;
use crate::ast::Pattern;
use crate::error::ParseError;

use super::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        match self.current_kind() {
            TokenKind::IntLiteral => {
                let tok = self.bump();
                let value: i64 = self.text(tok.span).parse().unwrap_or(0);
                Ok(Pattern::Literal(Literal::Int(value), tok.span))
            }
            TokenKind::FloatLiteral => {
                let tok = self.bump();
                let value: f64 = self.text(tok.span).parse().unwrap_or(0.0);
                Ok(Pattern::Literal(Literal::Float(value), tok.span))
            }
            TokenKind::StringLiteral => {
                let tok = self.bump();
                Ok(Pattern::Literal(Literal::String(self.unescape_string(tok.span)), tok.span))
            }
            TokenKind::True => {
                let span = self.bump().span;
                Ok(Pattern::Literal(Literal::Bool(true), span))
            }
            TokenKind::False => {
                let span = self.bump().span;
                Ok(Pattern::Literal(Literal::Bool(false), span))
            }
            TokenKind::Ident if self.current_text() == "_" => {
                let span = self.bump().span;
                Ok(Pattern::Wildcard(span))
            }
            TokenKind::Ident => {
                let (name, span) = self.expect_ident()?;
                Ok(Pattern::Identifier(name, span))
            }
            TokenKind::LBracket => self.parse_list_pattern(),
            TokenKind::LParen => self.parse_tuple_pattern(),
            TokenKind::LBrace => self.parse_record_pattern(),
            TokenKind::UpperIdent => self.parse_constructor_pattern(),
            _ => Err(self.unexpected("SIGIL-PARSE-EXPECTED-PATTERN", "a pattern")),
        }
    }

    fn parse_list_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.expect(TokenKind::LBracket, "SIGIL-PARSE-EXPECTED-BRACKET", "`[`")?.span;
        let mut elements = Vec::new();
        let mut rest = None;
        if !self.at(TokenKind::RBracket) {
            loop {
                if self.eat(TokenKind::MemberDot) {
                    let (name, _) = self.expect_ident()?;
                    rest = Some(name);
                    break;
                }
                elements.push(self.parse_pattern()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
        Ok(Pattern::List { elements, rest, span: Span::new(start.start, end) })
    }

    fn parse_tuple_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?.span;
        let mut elements = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                elements.push(self.parse_pattern()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
        Ok(Pattern::Tuple(elements, Span::new(start.start, end)))
    }

    fn parse_record_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.expect(TokenKind::LBrace, "SIGIL-PARSE-EXPECTED-BRACE", "`{`")?.span;
        let mut fields = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let (name, _) = self.expect_ident()?;
                self.expect(TokenKind::Colon, "SIGIL-PARSE-EXPECTED-COLON", "`:`")?;
                let pat = self.parse_pattern()?;
                fields.push((name, pat));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
        Ok(Pattern::Record { fields, span: Span::new(start.start, end) })
    }

    fn parse_constructor_pattern(&mut self) -> Result<Pattern, ParseError> {
        let (name, start) = self.expect_upper_ident()?;
        let mut args = Vec::new();
        let mut end = start.end;
        if self.eat(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    args.push(self.parse_pattern()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
        }
        Ok(Pattern::Constructor { name, args, span: Span::new(start.start, end) })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Decl, Expr, MatchArm, Pattern};
    use crate::parser::parse;
    use sigil_lexer::lex;

    fn first_arm(src: &str) -> MatchArm {
        let tokens = lex(src).unwrap();
        let file = parse(src, tokens).unwrap();
        match &file.decls[0] {
            Decl::Function(f) => match &f.body {
                Expr::Match { arms, .. } => arms[0].clone(),
                other => panic!("expected a match body, got {other:?}"),
            },
            other => panic!("expected a function decl, got {other:?}"),
        }
    }

    #[test]
    fn wildcard_pattern() {
        let arm = first_arm("λf(n:ℤ)→ℤ≡n{_→0}\n");
        assert!(matches!(arm.pattern, Pattern::Wildcard(_)));
    }

    #[test]
    fn list_pattern_with_rest_binding() {
        let arm = first_arm("λf(xs:List[ℤ])→ℤ≡xs{[x, .rest]→x}\n");
        match arm.pattern {
            Pattern::List { elements, rest, .. } => {
                assert_eq!(elements.len(), 1);
                assert_eq!(rest, Some("rest".to_string()));
            }
            other => panic!("expected a list pattern, got {other:?}"),
        }
    }

    #[test]
    fn tuple_pattern() {
        let arm = first_arm("λf(p:Tuple(ℤ,ℤ))→ℤ≡p{(a,b)→a}\n");
        match arm.pattern {
            Pattern::Tuple(elems, _) => assert_eq!(elems.len(), 2),
            other => panic!("expected a tuple pattern, got {other:?}"),
        }
    }

    #[test]
    fn constructor_pattern_with_subpatterns() {
        let arm = first_arm("λf(o:Option[ℤ])→ℤ≡o{Some(x)→x}\n");
        match arm.pattern {
            Pattern::Constructor { name, args, .. } => {
                assert_eq!(name, "Some");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected a constructor pattern, got {other:?}"),
        }
    }

    #[test]
    fn bound_names_collects_nested_identifiers() {
        let arm = first_arm("λf(xs:List[ℤ])→ℤ≡xs{[x, .rest]→x}\n");
        assert_eq!(arm.pattern.bound_names(), vec!["x", "rest"]);
    }
}
