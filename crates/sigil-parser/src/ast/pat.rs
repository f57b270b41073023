//! Closed pattern AST (spec §3: 7 variants).

use serde::Serialize;
use sigil_common::span::Span;

use super::expr::Literal;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Pattern {
    Literal(Literal, Span),
    Identifier(String, Span),
    Wildcard(Span),
    List { elements: Vec<Pattern>, rest: Option<String>, span: Span },
    Tuple(Vec<Pattern>, Span),
    Record { fields: Vec<(String, Pattern)>, span: Span },
    Constructor { name: String, args: Vec<Pattern>, span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Literal(_, s)
            | Pattern::Identifier(_, s)
            | Pattern::Wildcard(s)
            | Pattern::List { span: s, .. }
            | Pattern::Tuple(_, s)
            | Pattern::Record { span: s, .. }
            | Pattern::Constructor { span: s, .. } => *s,
        }
    }

    /// Identifiers this pattern binds, in pattern-text order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Identifier(name, _) => out.push(name),
            Pattern::List { elements, rest, .. } => {
                for e in elements {
                    e.collect_names(out);
                }
                if let Some(rest) = rest {
                    out.push(rest);
                }
            }
            Pattern::Tuple(items, _) => items.iter().for_each(|p| p.collect_names(out)),
            Pattern::Record { fields, .. } => fields.iter().for_each(|(_, p)| p.collect_names(out)),
            Pattern::Constructor { args, .. } => args.iter().for_each(|p| p.collect_names(out)),
            Pattern::Literal(..) | Pattern::Wildcard(_) => {}
        }
    }
}
