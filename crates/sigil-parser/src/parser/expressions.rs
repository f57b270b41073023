//! Expression grammar: Pratt-style precedence climbing over 9 levels
//! (spec §4.3).

use sigil_common::span::Span;
use sigil_common::token::TokenKind;

use crate::ast::expr::{BinaryOp, Literal, MatchArm, Param, UnaryOp};
use crate::ast::Expr;
use crate::error::ParseError;

use super::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_pipeline()
    }

    // Level 1: pipeline `|>`.
    fn parse_pipeline(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_list_ops()?;
        while self.eat(TokenKind::Pipeline) {
            let func = self.parse_list_ops()?;
            let span = Span::new(lhs.span().start, func.span().end);
            lhs = Expr::Pipeline { value: Box::new(lhs), func: Box::new(func), span };
        }
        Ok(lhs)
    }

    // Level 2: list operations `↦`, `⊳`, `⊕` (left-associative).
    fn parse_list_ops(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_logical()?;
        loop {
            if self.eat(TokenKind::MapOp) {
                let func = self.parse_logical()?;
                let span = Span::new(lhs.span().start, func.span().end);
                lhs = Expr::MapOp { source: Box::new(lhs), func: Box::new(func), span };
            } else if self.eat(TokenKind::FilterOp) {
                let predicate = self.parse_logical()?;
                let span = Span::new(lhs.span().start, predicate.span().end);
                lhs = Expr::FilterOp { source: Box::new(lhs), predicate: Box::new(predicate), span };
            } else if self.eat(TokenKind::FoldOp) {
                let func = self.parse_logical()?;
                self.expect(TokenKind::FoldOp, "SIGIL-PARSE-EXPECTED-FOLD-SEP", "`⊕` separating fold function from initial value")?;
                let init = self.parse_logical()?;
                let span = Span::new(lhs.span().start, init.span().end);
                lhs = Expr::FoldOp { source: Box::new(lhs), func: Box::new(func), init: Box::new(init), span };
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    // Level 3: logical `∧`, `∨`.
    fn parse_logical(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = if self.eat(TokenKind::And) {
                BinaryOp::And
            } else if self.eat(TokenKind::Or) {
                BinaryOp::Or
            } else {
                break;
            };
            let rhs = self.parse_comparison()?;
            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    // Level 4: comparison `=`, `≠`, `<`, `>`, `≤`, `≥`.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = if self.eat(TokenKind::Eq) {
                BinaryOp::Eq
            } else if self.eat(TokenKind::Ne) {
                BinaryOp::Ne
            } else if self.eat(TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.eat(TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.eat(TokenKind::Le) {
                BinaryOp::Le
            } else if self.eat(TokenKind::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let rhs = self.parse_additive()?;
            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    // Level 5: additive `+`, `-`, `++`, `⧺`.
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = if self.eat(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(TokenKind::Minus) {
                BinaryOp::Sub
            } else if self.eat(TokenKind::PlusPlus) {
                BinaryOp::StringConcat
            } else if self.eat(TokenKind::ListConcat) {
                BinaryOp::ListConcat
            } else {
                break;
            };
            let rhs = self.parse_multiplicative()?;
            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    // Level 6: multiplicative `*`, `/`, `%`, `^`.
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.eat(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.eat(TokenKind::Percent) {
                BinaryOp::Mod
            } else if self.eat(TokenKind::Caret) {
                BinaryOp::Pow
            } else {
                break;
            };
            let rhs = self.parse_unary()?;
            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    // Level 7: unary `-`, `¬`, `#`.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let (op, start) = if self.at(TokenKind::Minus) {
            (UnaryOp::Neg, self.bump().span)
        } else if self.at(TokenKind::Not) {
            (UnaryOp::Not, self.bump().span)
        } else if self.at(TokenKind::Hash) {
            (UnaryOp::Len, self.bump().span)
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        let span = Span::new(start.start, operand.span().end);
        Ok(Expr::Unary { op, operand: Box::new(operand), span })
    }

    // Level 8: postfix `.field`, `[idx]`, `name.member`, call `(args)`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(TokenKind::MemberDot) {
                let (field, field_span) = self.expect_ident()?;
                let span = Span::new(expr.span().start, field_span.end);
                expr = Expr::FieldAccess { base: Box::new(expr), field, span };
            } else if self.at(TokenKind::LBracket) {
                self.bump();
                let index = self.parse_expr()?;
                let end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
                let span = Span::new(expr.span().start, end);
                expr = Expr::Index { base: Box::new(expr), index: Box::new(index), span };
            } else if self.at(TokenKind::LParen) {
                self.bump();
                let mut args = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
                let span = Span::new(expr.span().start, end);
                expr = Expr::Apply { callee: Box::new(expr), args, span };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::IntLiteral => {
                let tok = self.bump();
                let value: i64 = self
                    .text(tok.span)
                    .parse()
                    .map_err(|_| ParseError::new("SIGIL-PARSE-BAD-INT-LITERAL", "malformed integer literal", tok.span))?;
                Ok(Expr::Literal(Literal::Int(value), tok.span))
            }
            TokenKind::FloatLiteral => {
                let tok = self.bump();
                let value: f64 = self
                    .text(tok.span)
                    .parse()
                    .map_err(|_| ParseError::new("SIGIL-PARSE-BAD-FLOAT-LITERAL", "malformed float literal", tok.span))?;
                Ok(Expr::Literal(Literal::Float(value), tok.span))
            }
            TokenKind::StringLiteral => {
                let tok = self.bump();
                Ok(Expr::Literal(Literal::String(self.unescape_string(tok.span)), tok.span))
            }
            TokenKind::True => {
                let span = self.bump().span;
                Ok(Expr::Literal(Literal::Bool(true), span))
            }
            TokenKind::False => {
                let span = self.bump().span;
                Ok(Expr::Literal(Literal::Bool(false), span))
            }
            TokenKind::Ident => self.parse_ident_or_qualified(),
            TokenKind::UpperIdent => self.parse_upper_primary(),
            TokenKind::Lambda => self.parse_lambda(),
            TokenKind::Equiv => self.parse_match(),
            TokenKind::LetKw => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::WithMock => self.parse_with_mock(),
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace => self.parse_brace_expr(),
            TokenKind::LParen => self.parse_paren_expr(),
            _ => Err(self.unexpected("SIGIL-PARSE-EXPECTED-EXPR", "an expression")),
        }
    }

    fn parse_ident_or_qualified(&mut self) -> Result<Expr, ParseError> {
        let (name, start) = self.expect_ident()?;
        if self.at(TokenKind::Dot) {
            let mut path = vec![name];
            while self.eat(TokenKind::Dot) {
                let (seg, _) = self.expect_ident()?;
                path.push(seg);
            }
            self.expect(TokenKind::MemberDot, "SIGIL-PARSE-NS-SEP", "`.` before the namespace member")?;
            let (member, member_span) = self.expect_ident()?;
            let span = Span::new(start.start, member_span.end);
            return Ok(Expr::QualifiedAccess { path, member, span });
        }
        Ok(Expr::Identifier(name, start))
    }

    fn parse_upper_primary(&mut self) -> Result<Expr, ParseError> {
        let (name, start) = self.expect_upper_ident()?;
        if self.at(TokenKind::LBrace) {
            self.bump();
            let mut fields = Vec::new();
            if !self.at(TokenKind::RBrace) {
                loop {
                    let (field_name, _) = self.expect_ident()?;
                    self.expect(TokenKind::Colon, "SIGIL-PARSE-EXPECTED-COLON", "`:`")?;
                    let value = self.parse_expr()?;
                    fields.push((field_name, value));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
            return Ok(Expr::Record { fields, type_name: Some(name), span: Span::new(start.start, end) });
        }
        Ok(Expr::Identifier(name, start))
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::Lambda, "SIGIL-PARSE-EXPECTED-LAMBDA", "`λ`")?.span;
        // Anonymous lambdas carry no name (`λ(x:T)→U=body`); named
        // top-level functions are parsed separately as `FunctionDecl`.
        let generics = self.parse_generics_opt()?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::Arrow, "SIGIL-PARSE-EXPECTED-ARROW", "`→`")?;
        let ret = self.parse_type()?;
        // Same placement rule as a top-level function: `≡` is its own body
        // marker for a match-body, `=` introduces any other body.
        let body = if self.at(TokenKind::Equiv) {
            self.parse_match()?
        } else {
            self.expect(TokenKind::Eq, "SIGIL-PARSE-EXPECTED-EQ", "`=` before the lambda body")?;
            self.parse_expr()?
        };
        let span = Span::new(start.start, body.span().end);
        Ok(Expr::Lambda { generics, params, ret, body: Box::new(body), span })
    }

    pub(crate) fn parse_generics_opt(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.eat(TokenKind::LBracket) {
            return Ok(Vec::new());
        }
        let mut generics = Vec::new();
        if !self.at(TokenKind::RBracket) {
            loop {
                let (name, _) = self.expect_upper_ident()?;
                generics.push(name);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?;
        Ok(generics)
    }

    pub(crate) fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let start = self.current_span();
                let is_mutable = self.eat(TokenKind::MutKw);
                let (name, _) = self.expect_ident()?;
                self.expect(TokenKind::Colon, "SIGIL-PARSE-MISSING-ANNOTATION", "`:` with a mandatory type annotation")?;
                let ty = self.parse_type()?;
                let span = Span::new(start.start, ty.span().end);
                params.push(Param { name, ty, is_mutable, span });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?;
        Ok(params)
    }

    pub(crate) fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::Equiv, "SIGIL-PARSE-EXPECTED-EQUIV", "`≡`")?.span;
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::LBrace, "SIGIL-PARSE-EXPECTED-BRACE", "`{` opening the match arms")?;
        let mut arms = Vec::new();
        loop {
            let arm_start = self.current_span();
            let pattern = self.parse_pattern()?;
            let guard = if self.eat(TokenKind::If) { Some(self.parse_expr()?) } else { None };
            self.expect(TokenKind::Arrow, "SIGIL-PARSE-EXPECTED-ARROW", "`→` before the match arm body")?;
            let body = self.parse_expr()?;
            let span = Span::new(arm_start.start, body.span().end);
            arms.push(MatchArm { pattern, guard, body, span });
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
        Ok(Expr::Match { scrutinee: Box::new(scrutinee), arms, span: Span::new(start.start, end) })
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::If, "SIGIL-PARSE-EXPECTED-IF", "`if`")?.span;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then, "SIGIL-PARSE-EXPECTED-THEN", "`then`")?;
        let then_branch = self.parse_expr()?;
        self.expect(TokenKind::Else, "SIGIL-PARSE-EXPECTED-ELSE", "`else`")?;
        let else_branch = self.parse_expr()?;
        let span = Span::new(start.start, else_branch.span().end);
        Ok(Expr::If { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch: Box::new(else_branch), span })
    }

    fn parse_let(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::LetKw, "SIGIL-PARSE-EXPECTED-LET", "`l`")?.span;
        let pattern = self.parse_pattern()?;
        let ty = if self.eat(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(TokenKind::Eq, "SIGIL-PARSE-EXPECTED-EQ", "`=` in a let binding")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "SIGIL-PARSE-EXPECTED-SEMI", "`;` separating the let binding from its body")?;
        let body = self.parse_expr()?;
        let span = Span::new(start.start, body.span().end);
        Ok(Expr::Let { pattern, ty, value: Box::new(value), body: Box::new(body), span })
    }

    fn parse_with_mock(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::WithMock, "SIGIL-PARSE-EXPECTED-WITH-MOCK", "`with_mock`")?.span;
        self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?;
        let target = self.parse_expr()?;
        self.expect(TokenKind::Comma, "SIGIL-PARSE-EXPECTED-COMMA", "`,`")?;
        let mock = self.parse_expr()?;
        self.expect(TokenKind::Comma, "SIGIL-PARSE-EXPECTED-COMMA", "`,`")?;
        let body = self.parse_expr()?;
        let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
        Ok(Expr::WithMock { target: Box::new(target), mock: Box::new(mock), body: Box::new(body), span: Span::new(start.start, end) })
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::LBracket, "SIGIL-PARSE-EXPECTED-BRACKET", "`[`")?.span;
        let mut elements = Vec::new();
        let mut rest = None;
        if !self.at(TokenKind::RBracket) {
            loop {
                if self.eat(TokenKind::MemberDot) {
                    rest = Some(Box::new(self.parse_postfix()?));
                    break;
                }
                elements.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBracket, "SIGIL-PARSE-UNCLOSED-DELIM", "`]`")?.span.end;
        Ok(Expr::List { elements, rest, element_type: None, span: Span::new(start.start, end) })
    }

    /// Disambiguates `{…}`: `identifier :` starts a record/map literal,
    /// anything else is a grouped expression (spec §4.3).
    fn parse_brace_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::LBrace, "SIGIL-PARSE-EXPECTED-BRACE", "`{`")?.span;
        if self.at(TokenKind::RBrace) {
            // An empty `{}` has no grouped-expression reading; it is the
            // empty record/map literal.
            let end = self.bump().span.end;
            return Ok(Expr::Record { fields: Vec::new(), type_name: None, span: Span::new(start.start, end) });
        }
        if self.at(TokenKind::Ident) && self.peek_kind_at(1) == TokenKind::Colon {
            let mut fields = Vec::new();
            loop {
                let (field_name, _) = self.expect_ident()?;
                self.expect(TokenKind::Colon, "SIGIL-PARSE-EXPECTED-COLON", "`:`")?;
                let value = self.parse_expr()?;
                fields.push((field_name, value));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?.span.end;
            return Ok(Expr::Record { fields, type_name: None, span: Span::new(start.start, end) });
        }
        let inner = self.parse_expr()?;
        self.expect(TokenKind::RBrace, "SIGIL-PARSE-UNCLOSED-DELIM", "`}`")?;
        Ok(inner)
    }

    /// `(expr)`, `(e1, e2, …)` tuples, `()` unit, or `(expr : T)` ascription.
    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(TokenKind::LParen, "SIGIL-PARSE-EXPECTED-PAREN", "`(`")?.span;
        if self.at(TokenKind::RParen) {
            let end = self.bump().span.end;
            return Ok(Expr::Literal(Literal::Unit, Span::new(start.start, end)));
        }
        let first = self.parse_expr()?;
        if self.eat(TokenKind::Colon) {
            let ty = self.parse_type()?;
            let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
            return Ok(Expr::Ascription { expr: Box::new(first), ty, span: Span::new(start.start, end) });
        }
        if self.eat(TokenKind::Comma) {
            let mut elements = vec![first];
            if !self.at(TokenKind::RParen) {
                loop {
                    elements.push(self.parse_expr()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let end = self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?.span.end;
            return Ok(Expr::Tuple(elements, Span::new(start.start, end)));
        }
        self.expect(TokenKind::RParen, "SIGIL-PARSE-UNCLOSED-DELIM", "`)`")?;
        Ok(first)
    }

    pub(crate) fn unescape_string(&self, span: Span) -> String {
        let raw = self.text(span);
        let inner = &raw[1..raw.len().saturating_sub(1)];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some('\'') => out.push('\''),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{Decl, Expr};
    use sigil_lexer::lex;

    fn parse_const_value(src: &str) -> Expr {
        let tokens = lex(src).unwrap();
        let file = parse(src, tokens).unwrap();
        match &file.decls[0] {
            Decl::Const(c) => c.value.clone(),
            other => panic!("expected a const decl, got {other:?}"),
        }
    }

    #[test]
    fn additive_left_associative() {
        let expr = parse_const_value("c x:ℤ=1+2+3\n");
        match expr {
            Expr::Binary { .. } => {}
            other => panic!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn pipeline_binds_loosest() {
        let expr = parse_const_value("c x:ℤ=1+2|>f\n");
        match expr {
            Expr::Pipeline { .. } => {}
            other => panic!("expected pipeline at the top, got {other:?}"),
        }
    }
}
