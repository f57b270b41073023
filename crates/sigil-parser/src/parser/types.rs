//! Type grammar: the closed type-syntax set (spec §3).

use sigil_common::effect::Effect;
use sigil_common::span::Span;
use sigil_common::token::TokenKind;

use crate::ast::Type;
use crate::error::ParseError;

use super::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.current_kind() {
            TokenKind::IntType => {
                let span = self.bump().span;
                Ok(Type::Int(span))
            }
            TokenKind::BoolType => {
                let span = self.bump().span;
                Ok(Type::Bool(span))
            }
            TokenKind::StringType => {
                let span = self.bump().span;
                Ok(Type::String(span))
            }
            TokenKind::LParen => self.parse_tuple_or_function_type(),
            TokenKind::UpperIdent => self.parse_named_type(),
            TokenKind::Ident => {
                let (name, span) = self.expect_ident()?;
                Ok(Type::Variable { name, span })
            }
            _ => Err(self.unexpected("SIGIL-PARSE-EXPECTED-TYPE", "a type")),
        }
    }

    fn parse_named_type(&mut self) -> Result<Type, ParseError> {
        let (name, start) = self.expect_upper_ident()?;
        match name.as_str() {
            "Float" => Ok(Type::Float(start)),
            "Char" => Ok(Type::Char(start)),
            "Unit" => Ok(Type::Unit(start)),
            "Never" => Ok(Type::Never(start)),
            "List" => {
                self.expect(TokenKind::LBracket, "SIGIL-PARSE-EXPECTED-BRACKET", "`[`")?;
                let elem = self.parse_type()?;
                let end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
                Ok(Type::List(Box::new(elem), Span::new(start.start, end)))
            }
            "Map" => {
                self.expect(TokenKind::LBracket, "SIGIL-PARSE-EXPECTED-BRACKET", "`[`")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::Comma, "SIGIL-PARSE-EXPECTED-COMMA", "`,`")?;
                let value = self.parse_type()?;
                let end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
                Ok(Type::Map(Box::new(key), Box::new(value), Span::new(start.start, end)))
            }
            "Tuple" => {
                self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?;
                let mut elems = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        elems.push(self.parse_type()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
                Ok(Type::Tuple(elems, Span::new(start.start, end)))
            }
            _ if self.at(TokenKind::Dot) || self.current_kind() == TokenKind::Dot => {
                self.parse_qualified_type_tail(name, start)
            }
            _ => {
                let mut args = Vec::new();
                let mut end = start.end;
                if self.eat(TokenKind::LBracket) {
                    loop {
                        let ty = self.parse_type()?;
                        end = ty.span().end;
                        args.push(ty);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
                }
                Ok(Type::Constructor { name, args, span: Span::new(start.start, end) })
            }
        }
    }

    fn parse_qualified_type_tail(&mut self, first: String, start: Span) -> Result<Type, ParseError> {
        let mut module_path = vec![first];
        while self.eat(TokenKind::Dot) {
            let (seg, _) = self.expect_ident()?;
            module_path.push(seg);
        }
        let name = module_path.pop().unwrap();
        let end_span = self.current_span();
        Ok(Type::Qualified { module_path, name, args: Vec::new(), span: Span::new(start.start, end_span.start) })
    }

    /// `(T, U) → V` function types, or a parenthesized/tuple grouping type.
    fn parse_tuple_or_function_type(&mut self) -> Result<Type, ParseError> {
        let start = self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?.span;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?;
        if self.eat(TokenKind::Arrow) {
            let ret = self.parse_type()?;
            let effects = self.parse_effect_set_opt()?;
            let end = ret.span().end;
            Ok(Type::Function { params, ret: Box::new(ret), effects, span: Span::new(start.start, end) })
        } else if params.len() == 1 {
            Ok(params.into_iter().next().unwrap())
        } else {
            let end = self.current_span().start;
            Ok(Type::Tuple(params, Span::new(start.start, end)))
        }
    }

    /// `{IO,Network}` suffix on a function type's return clause, if present.
    pub(crate) fn parse_effect_set_opt(&mut self) -> Result<Vec<Effect>, ParseError> {
        if !self.eat(TokenKind::LBrace) {
            return Ok(Vec::new());
        }
        let mut effects = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let (name, span) = self.expect_upper_ident()?;
                let effect = Effect::from_name(&name)
                    .ok_or_else(|| ParseError::new("SIGIL-PARSE-UNKNOWN-EFFECT", format!("unknown effect `{name}`"), span))?;
                effects.push(effect);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?;
        Ok(effects)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Type;
    use crate::parser::parse;
    use sigil_lexer::lex;

    fn parse_const_type(src: &str) -> Type {
        let tokens = lex(src).unwrap();
        let file = parse(src, tokens).unwrap();
        match &file.decls[0] {
            crate::ast::Decl::Const(c) => c.ty.clone().expect("expected an annotated const"),
            other => panic!("expected a const decl, got {other:?}"),
        }
    }

    #[test]
    fn primitive_glyphs() {
        assert!(matches!(parse_const_type("c x:ℤ=1\n"), Type::Int(_)));
        assert!(matches!(parse_const_type("c x:𝔹=⊤\n"), Type::Bool(_)));
        assert!(matches!(parse_const_type("c x:𝕊=\"a\"\n"), Type::String(_)));
    }

    #[test]
    fn textual_primitive_names() {
        assert!(matches!(parse_const_type("c x:Float=1.0\n"), Type::Float(_)));
        assert!(matches!(parse_const_type("c x:Unit=()\n"), Type::Unit(_)));
    }

    #[test]
    fn list_and_map_forms() {
        assert!(matches!(parse_const_type("c x:List[ℤ]=[]\n"), Type::List(..)));
        assert!(matches!(parse_const_type("c x:Map[𝕊,ℤ]={}\n"), Type::Map(..)));
    }

    #[test]
    fn tuple_form() {
        match parse_const_type("c x:Tuple(ℤ,𝕊)=(1,\"a\")\n") {
            Type::Tuple(elems, _) => assert_eq!(elems.len(), 2),
            other => panic!("expected a tuple type, got {other:?}"),
        }
    }

    #[test]
    fn function_type_with_effects() {
        match parse_const_type("c x:(ℤ)→ℤ{IO}=f\n") {
            Type::Function { params, effects, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(effects, vec![sigil_common::effect::Effect::IO]);
            }
            other => panic!("expected a function type, got {other:?}"),
        }
    }

    #[test]
    fn generic_constructor_application() {
        match parse_const_type("c x:Option[ℤ]=y\n") {
            Type::Constructor { name, args, .. } => {
                assert_eq!(name, "Option");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected a constructor type, got {other:?}"),
        }
    }
}
