//! Emission tests: parse a small program and check the generated JS
//! contains the shapes spec §4.7 mandates.

fn emit(src: &str) -> String {
    let tokens = sigil_lexer::lex(src).expect("lex");
    let file = sigil_parser::parse(src, tokens).expect("parse");
    sigil_codegen::emit_module_js(&file, src)
}

#[test]
fn factorial_lowers_to_async_recursion() {
    let src = "λfactorial(n:ℤ)→ℤ≡n{0→1|n→n*factorial(n-1)}\n";
    let output = emit(src);
    assert!(output.contains("async function factorial(n)"));
    assert!(output.contains("const __match = n;"));
    assert!(output.contains("await (factorial)("));
    assert!(output.contains("Match failed: no pattern matched"));
}

#[test]
fn mockable_function_calls_route_through_sigil_call() {
    let src = "mockable λfetch(id:ℤ)→ℤ=id\nλmain()→ℤ=fetch(1)\n";
    let output = emit(src);
    assert!(output.contains("__sigil_call(\"fetch\", fetch, [1])"));
}

#[test]
fn sum_type_constructors_emit_tagged_factories() {
    let src = "t Shape=|Circle(ℝ)|Square\nλarea(s:Shape)→ℝ≡s{Circle(r)→r|Square→0.0}\n";
    let output = emit(src);
    assert!(output.contains("function Circle(__a0)"));
    assert!(output.contains("__tag: \"Circle\""));
}
