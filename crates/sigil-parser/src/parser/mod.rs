//! Hand-written recursive-descent parser (spec §4.3).

mod expressions;
mod items;
mod patterns;
mod types;

use sigil_common::span::Span;
use sigil_common::token::{Token, TokenKind};

use crate::ast::SourceFile;
use crate::error::ParseError;

pub fn parse(source: &str, tokens: Vec<Token>) -> Result<SourceFile, ParseError> {
    let mut parser = Parser::new(source, tokens);
    parser.parse_source_file()
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Parser { source, tokens, pos: 0 }
    }

    fn parse_source_file(&mut self) -> Result<SourceFile, ParseError> {
        let start = self.current_span().start;
        let mut decls = Vec::new();
        while !self.at(TokenKind::Eof) {
            decls.push(self.parse_decl()?);
        }
        let end = self.current_span().end;
        Ok(SourceFile { decls, span: Span::new(start, end) })
    }

    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens.get(self.pos + offset).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn text(&self, span: Span) -> &'src str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn current_text(&self) -> &'src str {
        self.text(self.current_span())
    }

    fn bump(&mut self) -> Token {
        let tok = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, code: &'static str, what: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(code, what))
        }
    }

    fn unexpected(&self, code: &'static str, what: &str) -> ParseError {
        ParseError::new(
            code,
            format!("expected {what}, found {:?}", self.current_kind()),
            self.current_span(),
        )
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if self.at(TokenKind::Ident) {
            let tok = self.bump();
            Ok((self.text(tok.span).to_string(), tok.span))
        } else {
            Err(self.unexpected("SIGIL-PARSE-EXPECTED-IDENT", "an identifier"))
        }
    }

    fn expect_upper_ident(&mut self) -> Result<(String, Span), ParseError> {
        if self.at(TokenKind::UpperIdent) {
            let tok = self.bump();
            Ok((self.text(tok.span).to_string(), tok.span))
        } else {
            Err(self.unexpected("SIGIL-PARSE-EXPECTED-UPPER-IDENT", "a capitalized identifier"))
        }
    }
}
