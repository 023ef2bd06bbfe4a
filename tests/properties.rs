//! Property-based invariants: type inference is idempotent, and precedence
//! is preserved well enough that an emitted expression reparses to
//! something that emits identically a second time (a fixed point). Random
//! arithmetic expressions come from a depth-bounded recursive `proptest`
//! strategy over a small leaf alphabet.

use proptest::prelude::*;
use std::collections::HashMap;

use shade_transpiler::emit::{Emitter, Glsl};
use shade_transpiler::{frontend, infer};

#[derive(Clone, Debug)]
enum ArithExpr {
    Lit(i32),
    Bin(&'static str, Box<ArithExpr>, Box<ArithExpr>),
}

fn arith_expr() -> impl Strategy<Value = ArithExpr> {
    let leaf = (1i32..9).prop_map(ArithExpr::Lit);
    leaf.prop_recursive(3, 16, 3, |inner| {
        (inner.clone(), prop_oneof!["+", "-", "*", "/"], inner).prop_map(
            |(l, op, r)| ArithExpr::Bin(op, Box::new(l), Box::new(r)),
        )
    })
}

fn render(e: &ArithExpr) -> String {
    match e {
        ArithExpr::Lit(n) => format!("{n}.0"),
        ArithExpr::Bin(op, l, r) => format!("{} {op} {}", render(l), render(r)),
    }
}

fn emit_glsl_assignment(rhs: &str) -> String {
    let source = format!("x = {rhs}");
    let ir = frontend::parse(&source, &[]).expect("generated source must parse");
    infer::infer(&ir, &HashMap::new(), &HashMap::new());
    Emitter::new(&Glsl::default()).emit(&ir, false)
}

fn strip_decl(rendered: &str) -> String {
    rendered
        .trim_start_matches("float x = ")
        .trim_end_matches(';')
        .to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn emitted_arithmetic_is_a_stable_fixed_point(e in arith_expr()) {
        let first = emit_glsl_assignment(&render(&e));
        let second = emit_glsl_assignment(&strip_decl(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn type_inference_is_idempotent(e in arith_expr()) {
        let source = format!("x = {}", render(&e));
        let ir = frontend::parse(&source, &[]).expect("generated source must parse");

        infer::infer(&ir, &HashMap::new(), &HashMap::new());
        let shade_transpiler::ir::IrKind::Block(stmts) = &ir.kind else {
            unreachable!("top level is always a Block")
        };
        let first_ty = stmts[0].ty();

        infer::infer(&ir, &HashMap::new(), &HashMap::new());
        let second_ty = stmts[0].ty();

        prop_assert_eq!(first_ty, second_ty);
    }
}
