//! Lowers a `Pattern` into a JS boolse test plus binding statements
//! against an already-emitted scrutinee expression (spec §4.7 "Pattern
//! matching").

use sigil_parser::ast::expr::Literal;
use sigil_parser::ast::pat::Pattern;

use super::sanitize_ident;

pub struct PatternEmit {
    pub test: String,
    pub bindings: Vec<String>,
}

fn literal_js(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) => n.to_string(),
        Literal::Float(n) => n.to_string(),
        Literal::String(s) => serde_json::to_string(s).expect("string literal serializes"),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "undefined".to_string(),
    }
}

/// `scrutinee` is the JS expression the pattern is tested and destructured
/// against; it may be a compound expression like `__match[0].__fields[1]`.
pub fn emit_pattern(pattern: &Pattern, scrutinee: &str) -> PatternEmit {
    match pattern {
        Pattern::Wildcard(_) => PatternEmit { test: "true".to_string(), bindings: Vec::new() },
        Pattern::Identifier(name, _) => PatternEmit {
            test: "true".to_string(),
            bindings: vec![format!("const {} = {};", sanitize_ident(name), scrutinee)],
        },
        Pattern::Literal(lit, _) => PatternEmit { test: format!("{} === {}", scrutinee, literal_js(lit)), bindings: Vec::new() },
        Pattern::List { elements, rest, .. } => {
            let mut tests = vec![format!("Array.isArray({})", scrutinee)];
            tests.push(if rest.is_some() {
                format!("{}.length >= {}", scrutinee, elements.len())
            } else {
                format!("{}.length === {}", scrutinee, elements.len())
            });
            let mut bindings = Vec::new();
            for (i, elem) in elements.iter().enumerate() {
                let sub = emit_pattern(elem, &format!("{}[{}]", scrutinee, i));
                tests.push(sub.test);
                bindings.extend(sub.bindings);
            }
            if let Some(rest_name) = rest {
                bindings.push(format!("const {} = {}.slice({});", sanitize_ident(rest_name), scrutinee, elements.len()));
            }
            PatternEmit { test: tests.join(" && "), bindings }
        }
        Pattern::Tuple(elements, _) => {
            let mut tests = vec![format!("Array.isArray({})", scrutinee), format!("{}.length === {}", scrutinee, elements.len())];
            let mut bindings = Vec::new();
            for (i, elem) in elements.iter().enumerate() {
                let sub = emit_pattern(elem, &format!("{}[{}]", scrutinee, i));
                tests.push(sub.test);
                bindings.extend(sub.bindings);
            }
            PatternEmit { test: tests.join(" && "), bindings }
        }
        Pattern::Record { fields, .. } => {
            let mut tests = vec![format!("{} !== null && typeof {} === 'object'", scrutinee, scrutinee)];
            let mut bindings = Vec::new();
            for (name, sub_pattern) in fields {
                let sub = emit_pattern(sub_pattern, &format!("{}.{}", scrutinee, name));
                tests.push(sub.test);
                bindings.extend(sub.bindings);
            }
            PatternEmit { test: tests.join(" && "), bindings }
        }
        Pattern::Constructor { name, args, .. } => {
            let mut tests = vec![format!("{} && {}.__tag === {}", scrutinee, scrutinee, serde_json::to_string(name).unwrap())];
            let mut bindings = Vec::new();
            for (i, arg) in args.iter().enumerate() {
                let sub = emit_pattern(arg, &format!("{}.__fields[{}]", scrutinee, i));
                tests.push(sub.test);
                bindings.extend(sub.bindings);
            }
            PatternEmit { test: tests.join(" && "), bindings }
        }
    }
}

/// Every name a pattern binds, as `const` statements against `scrutinee`,
/// ignoring refutability — used for `let`, whose patterns are expected to
/// be irrefutable.
pub fn emit_irrefutable_bindings(pattern: &Pattern, scrutinee: &str) -> Vec<String> {
    emit_pattern(pattern, scrutinee).bindings
}
