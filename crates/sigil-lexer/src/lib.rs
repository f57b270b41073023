//! Lexer for Sigil source (spec §4.2). Stream-based, indexes Unicode
//! scalar values rather than bytes, and produces a token stream that
//! ends with a single `Eof` token. The lexer does not attempt recovery:
//! the first failure aborts with a precisely located error.

mod cursor;
pub mod surface;

use cursor::Cursor;
use sigil_common::diagnostic::{Diagnostic, Phase};
use sigil_common::span::Span;
use sigil_common::token::{keyword_from_str, Token, TokenKind};

pub fn lex(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut lexer = Lexer::new(source);
    lexer.run()
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Lexer { cursor: Cursor::new(source), tokens: Vec::new() }
    }

    fn run(mut self) -> Result<Vec<Token>, Diagnostic> {
        loop {
            self.skip_trivia()?;
            let start = self.cursor.pos();
            let Some(c) = self.cursor.peek() else {
                self.tokens.push(Token::new(TokenKind::Eof, start, start));
                break;
            };
            self.scan_token(c, start)?;
        }
        Ok(self.tokens)
    }

    fn skip_trivia(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('⟦') => {
                    let start = self.cursor.pos();
                    self.cursor.advance();
                    loop {
                        match self.cursor.peek() {
                            Some('⟧') => {
                                self.cursor.advance();
                                break;
                            }
                            Some(_) => {
                                self.cursor.advance();
                            }
                            None => {
                                return Err(lex_error(
                                    "SIGIL-LEX-UNTERMINATED-COMMENT",
                                    "unterminated multi-line comment",
                                    Span::new(start, self.cursor.pos()),
                                ));
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_token(&mut self, c: char, start: u32) -> Result<(), Diagnostic> {
        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '|' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    TokenKind::Pipeline
                } else {
                    TokenKind::Pipe
                }
            }
            '+' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('+') {
                    self.cursor.advance();
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                }
            }
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '^' => self.single(TokenKind::Caret),
            '=' => self.single(TokenKind::Eq),
            '<' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('<') {
                    self.cursor.advance();
                    TokenKind::Shl
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    TokenKind::Shr
                } else {
                    TokenKind::Gt
                }
            }
            '.' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('.') {
                    self.cursor.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::MemberDot
                }
            }
            '#' => self.single(TokenKind::Hash),
            ':' => self.single(TokenKind::Colon),
            'λ' => self.single(TokenKind::Lambda),
            '→' => self.single(TokenKind::Arrow),
            '≡' => self.single(TokenKind::Equiv),
            '↦' => self.single(TokenKind::MapOp),
            '⊳' => self.single(TokenKind::FilterOp),
            '⊕' => self.single(TokenKind::FoldOp),
            '¬' => self.single(TokenKind::Not),
            '∧' => self.single(TokenKind::And),
            '∨' => self.single(TokenKind::Or),
            '≠' => self.single(TokenKind::Ne),
            '≤' => self.single(TokenKind::Le),
            '≥' => self.single(TokenKind::Ge),
            '⋅' => self.single(TokenKind::Dot),
            '⧺' => self.single(TokenKind::ListConcat),
            '⊤' => self.single(TokenKind::True),
            '⊥' => self.single(TokenKind::False),
            'ℤ' => self.single(TokenKind::IntType),
            '𝔹' => self.single(TokenKind::BoolType),
            '𝕊' => self.single(TokenKind::StringType),
            '"' => return self.scan_string(start),
            '\'' => return self.scan_char(start),
            c if c.is_ascii_digit() => return self.scan_number(start),
            c if c.is_alphabetic() => return self.scan_ident(start),
            other => {
                return Err(lex_error(
                    "SIGIL-LEX-UNEXPECTED-SCALAR",
                    format!("unexpected character '{other}'"),
                    Span::new(start, start + other.len_utf8() as u32),
                ));
            }
        };
        self.tokens.push(Token::new(kind, start, self.cursor.pos()));
        Ok(())
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn scan_ident(&mut self, start: u32) -> Result<(), Diagnostic> {
        let is_upper = self.cursor.peek().map(|c| c.is_uppercase()).unwrap_or(false);
        self.cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);
        let kind = if !is_upper {
            keyword_from_str(text).unwrap_or(TokenKind::Ident)
        } else {
            TokenKind::UpperIdent
        };
        self.tokens.push(Token::new(kind, start, end));
        Ok(())
    }

    fn scan_number(&mut self, start: u32) -> Result<(), Diagnostic> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        let end = self.cursor.pos();
        let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral };
        self.tokens.push(Token::new(kind, start, end));
        Ok(())
    }

    fn scan_string(&mut self, start: u32) -> Result<(), Diagnostic> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.scan_escape()?;
                }
                Some(_) => {
                    self.cursor.advance();
                }
                None => {
                    return Err(lex_error(
                        "SIGIL-LEX-UNTERMINATED-STRING",
                        "unterminated string literal",
                        Span::new(start, self.cursor.pos()),
                    ));
                }
            }
        }
        let end = self.cursor.pos();
        self.tokens.push(Token::new(TokenKind::StringLiteral, start, end));
        Ok(())
    }

    fn scan_char(&mut self, start: u32) -> Result<(), Diagnostic> {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('\\') => {
                self.scan_escape()?;
            }
            Some(_) => {
                self.cursor.advance();
            }
            None => {
                return Err(lex_error(
                    "SIGIL-LEX-UNTERMINATED-CHAR",
                    "unterminated character literal",
                    Span::new(start, self.cursor.pos()),
                ));
            }
        }
        match self.cursor.peek() {
            Some('\'') => {
                self.cursor.advance();
            }
            _ => {
                return Err(lex_error(
                    "SIGIL-LEX-UNTERMINATED-CHAR",
                    "character literal must contain exactly one scalar",
                    Span::new(start, self.cursor.pos()),
                ));
            }
        }
        let end = self.cursor.pos();
        self.tokens.push(Token::new(TokenKind::CharLiteral, start, end));
        Ok(())
    }

    fn scan_escape(&mut self) -> Result<(), Diagnostic> {
        let start = self.cursor.pos();
        self.cursor.advance();
        match self.cursor.peek() {
            Some('n' | 't' | 'r' | '\\' | '"' | '\'') => {
                self.cursor.advance();
                Ok(())
            }
            Some(other) => Err(lex_error(
                "SIGIL-LEX-INVALID-ESCAPE",
                format!("invalid escape sequence '\\{other}'"),
                Span::new(start, self.cursor.pos() + other.len_utf8() as u32),
            )),
            None => Err(lex_error(
                "SIGIL-LEX-UNTERMINATED-STRING",
                "unterminated escape sequence",
                Span::new(start, self.cursor.pos()),
            )),
        }
    }
}

fn lex_error(code: &str, message: impl Into<String>, span: Span) -> Diagnostic {
    Diagnostic::new(code, Phase::Lexer, message).with_span(span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_lambda_signature() {
        assert_eq!(
            kinds("λadd(x:ℤ,y:ℤ)→ℤ"),
            vec![
                TokenKind::Lambda,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::IntType,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::IntType,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::IntType,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_letter_keywords_stand_alone() {
        assert_eq!(kinds("t"), vec![TokenKind::TypeKw, TokenKind::Eof]);
        assert_eq!(kinds("test"), vec![TokenKind::Test, TokenKind::Eof]);
    }

    #[test]
    fn upper_ident_distinguished_from_ident() {
        assert_eq!(kinds("Foo"), vec![TokenKind::UpperIdent, TokenKind::Eof]);
        assert_eq!(kinds("foo"), vec![TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn lexes_int_and_float_literals() {
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    }

    #[test]
    fn lexes_string_with_escapes() {
        let tokens = lex(r#""a\nb""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = lex("\"abc").unwrap_err();
        assert_eq!(err.code, "SIGIL-LEX-UNTERMINATED-STRING");
    }

    #[test]
    fn rejects_invalid_escape() {
        let err = lex(r#""a\qb""#).unwrap_err();
        assert_eq!(err.code, "SIGIL-LEX-INVALID-ESCAPE");
    }

    #[test]
    fn rejects_unterminated_multiline_comment() {
        let err = lex("⟦ unterminated").unwrap_err();
        assert_eq!(err.code, "SIGIL-LEX-UNTERMINATED-COMMENT");
    }

    #[test]
    fn line_comment_consumed_to_newline() {
        assert_eq!(kinds("// hi\n42"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
    }

    #[test]
    fn multiline_comment_spans_lines_mid_expression() {
        assert_eq!(kinds("1 ⟦ a\nb ⟧ + 2"), vec![
            TokenKind::IntLiteral,
            TokenKind::Plus,
            TokenKind::IntLiteral,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn pipeline_vs_match_pipe() {
        assert_eq!(kinds("|>"), vec![TokenKind::Pipeline, TokenKind::Eof]);
        assert_eq!(kinds("|"), vec![TokenKind::Pipe, TokenKind::Eof]);
    }

    #[test]
    fn rejects_unexpected_scalar() {
        let err = lex("@").unwrap_err();
        assert_eq!(err.code, "SIGIL-LEX-UNEXPECTED-SCALAR");
    }

    #[test]
    fn unicode_operator_glyphs() {
        assert_eq!(kinds("↦⊳⊕¬∧∨≠≤≥⋅⧺⊤⊥"), vec![
            TokenKind::MapOp,
            TokenKind::FilterOp,
            TokenKind::FoldOp,
            TokenKind::Not,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Dot,
            TokenKind::ListConcat,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Eof,
        ]);
    }
}
