//! Top-level declaration grammar (spec §3, §4.3 "Exports").

use sigil_common::span::Span;
use sigil_common::token::TokenKind;

use crate::ast::decl::{ConstDecl, Decl, ExternDecl, ExternMember, FunctionDecl, ImportDecl, TestDecl, TypeDecl, TypeDeclBody};
use crate::error::ParseError;

use super::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let export_span = self.current_span();
        let is_exported = self.eat(TokenKind::Export);
        match self.current_kind() {
            TokenKind::TypeKw => self.parse_type_decl(is_exported),
            TokenKind::ExternKw => {
                if is_exported {
                    return Err(ParseError::new(
                        "SIGIL-PARSE-EXPORT-NOT-ALLOWED",
                        "`export` is not allowed before an extern declaration",
                        export_span,
                    ));
                }
                self.parse_extern_decl(is_exported)
            }
            TokenKind::ImportKw => {
                if is_exported {
                    return Err(ParseError::new(
                        "SIGIL-PARSE-EXPORT-NOT-ALLOWED",
                        "`export` is not allowed before an import declaration",
                        export_span,
                    ));
                }
                self.parse_import_decl()
            }
            TokenKind::ConstKw => self.parse_const_decl(is_exported),
            TokenKind::Mockable | TokenKind::Lambda => self.parse_function_decl(is_exported),
            TokenKind::Test => {
                if is_exported {
                    return Err(ParseError::new(
                        "SIGIL-PARSE-EXPORT-FORBIDDEN-TEST",
                        "`export` is forbidden in front of a test declaration",
                        export_span,
                    ));
                }
                self.parse_test_decl()
            }
            _ => Err(self.unexpected("SIGIL-PARSE-EXPECTED-DECL", "a top-level declaration")),
        }
    }

    fn parse_type_decl(&mut self, is_exported: bool) -> Result<Decl, ParseError> {
        let start = self.expect(TokenKind::TypeKw, "SIGIL-PARSE-EXPECTED-TYPE-KW", "`t`")?.span;
        let (name, _) = self.expect_upper_ident()?;
        let generics = self.parse_generics_opt()?;
        self.expect(TokenKind::Eq, "SIGIL-PARSE-EXPECTED-EQ", "`=` in a type declaration")?;
        // A leading `|` marks a sum type; anything else is a type alias.
        let body = if self.at(TokenKind::Pipe) {
            self.parse_sum_type_body()?
        } else {
            TypeDeclBody::Alias(self.parse_type()?)
        };
        let end = self.current_span().start;
        Ok(Decl::Type(TypeDecl { name, generics, body, is_exported, span: Span::new(start.start, end) }))
    }

    fn parse_sum_type_body(&mut self) -> Result<TypeDeclBody, ParseError> {
        let mut variants = Vec::new();
        self.eat(TokenKind::Pipe);
        loop {
            let (name, _) = self.expect_upper_ident()?;
            let mut fields = Vec::new();
            if self.eat(TokenKind::LParen) {
                if !self.at(TokenKind::RParen) {
                    loop {
                        fields.push(self.parse_type()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?;
            }
            variants.push((name, fields));
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }
        Ok(TypeDeclBody::Sum { variants })
    }

    fn parse_extern_decl(&mut self, is_exported: bool) -> Result<Decl, ParseError> {
        let start = self.expect(TokenKind::ExternKw, "SIGIL-PARSE-EXPECTED-EXTERN-KW", "`e`")?.span;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?;
        let spec_tok = self.expect(TokenKind::StringLiteral, "SIGIL-PARSE-EXPECTED-MODULE-SPECIFIER", "a string module specifier")?;
        let module_specifier = self.unescape_string(spec_tok.span);
        let mut end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
        let mut members = Vec::new();
        if self.eat(TokenKind::LBrace) {
            if !self.at(TokenKind::RBrace) {
                loop {
                    let (member_name, member_start) = self.expect_ident()?;
                    self.expect(TokenKind::Colon, "SIGIL-PARSE-EXPECTED-COLON", "`:`")?;
                    let ty = self.parse_type()?;
                    members.push(ExternMember { name: member_name, span: Span::new(member_start.start, ty.span().end), ty });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
        }
        Ok(Decl::Extern(ExternDecl { name, module_specifier, members, is_exported, span: Span::new(start.start, end) }))
    }

    fn parse_import_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.expect(TokenKind::ImportKw, "SIGIL-PARSE-EXPECTED-IMPORT-KW", "`i`")?.span;
        let (first, _) = self.expect_ident()?;
        let mut module_path = vec![first];
        while self.eat(TokenKind::Dot) {
            let (seg, _) = self.expect_ident()?;
            module_path.push(seg);
        }
        let end = self.current_span().start;
        Ok(Decl::Import(ImportDecl { module_path, span: Span::new(start.start, end) }))
    }

    fn parse_const_decl(&mut self, is_exported: bool) -> Result<Decl, ParseError> {
        let start = self.expect(TokenKind::ConstKw, "SIGIL-PARSE-EXPECTED-CONST-KW", "`c`")?.span;
        let (name, _) = self.expect_ident()?;
        let ty = if self.eat(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(TokenKind::Eq, "SIGIL-PARSE-EXPECTED-EQ", "`=` in a const declaration")?;
        let value = self.parse_expr()?;
        let span = Span::new(start.start, value.span().end);
        Ok(Decl::Const(ConstDecl { name, ty, value, is_exported, span }))
    }

    fn parse_function_decl(&mut self, is_exported: bool) -> Result<Decl, ParseError> {
        let is_mockable = self.eat(TokenKind::Mockable);
        let start = self.expect(TokenKind::Lambda, "SIGIL-PARSE-EXPECTED-LAMBDA", "`λ`")?.span;
        let (name, _) = self.expect_ident()?;
        let generics = self.parse_generics_opt()?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::Arrow, "SIGIL-PARSE-EXPECTED-ARROW", "`→`")?;
        let ret = self.parse_type()?;
        let effects = self.parse_decl_effects_opt()?;
        // A match-body is introduced by `≡` alone; `≡` itself is the body
        // marker, so `=` is forbidden in front of it. Any other body needs
        // the ordinary `=` marker.
        let body = if self.at(TokenKind::Equiv) {
            self.parse_match()?
        } else {
            self.expect(TokenKind::Eq, "SIGIL-PARSE-EXPECTED-EQ", "`=` between the signature and the value-body")?;
            self.parse_expr()?
        };
        let span = Span::new(start.start, body.span().end);
        Ok(Decl::Function(FunctionDecl { name, generics, params, ret, effects, is_mockable, is_exported, body, span }))
    }

    fn parse_test_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.expect(TokenKind::Test, "SIGIL-PARSE-EXPECTED-TEST-KW", "`test`")?.span;
        let name_tok = self.expect(TokenKind::StringLiteral, "SIGIL-PARSE-EXPECTED-TEST-NAME", "a string test name")?;
        let name = self.unescape_string(name_tok.span);
        self.expect(TokenKind::LBrace, "SIGIL-PARSE-EXPECTED-BRACE", "`{` opening the test body")?;
        let body = self.parse_expr()?;
        let end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
        Ok(Decl::Test(TestDecl { name, body, span: Span::new(start.start, end) }))
    }

    fn parse_decl_effects_opt(&mut self) -> Result<Vec<sigil_common::effect::Effect>, ParseError> {
        self.parse_effect_set_opt()
    }
}
