//! End-to-end scenarios for the portable C target.

use shade_transpiler::{Transpiler, TranspilerConfig};

fn transpile(source: &str) -> String {
    let mut t = Transpiler::new(TranspilerConfig {
        needs_return: true,
        ..Default::default()
    });
    t.parse(source).expect("parse");
    t.emit("c").expect("emit")
}

#[test]
fn vec3_literal_uses_constructor_and_f_suffixed_components() {
    let out = transpile("color = vec3(1.0, 0.0, 0.0)\nreturn color");
    assert!(out.contains("vec3_new(1.0f, 0.0f, 0.0f)"));
    assert!(out.contains("return color"));
}

#[test]
fn vector_addition_lowers_to_a_function_call() {
    let out = transpile("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
    assert!(out.contains("vec2_add(a, a)"));
}

#[test]
fn sin_gets_the_f_suffixed_libm_name() {
    let out = transpile("x = sin(0.5)\nreturn x");
    assert!(out.contains("sinf(0.5f)"));
}

#[test]
fn elsif_chain_flattens_into_else_if() {
    let out = transpile(
        "if x > 0.0 then y = 1.0 elsif x < 0.0 then y = -1.0 else y = 0.0 end\nreturn y",
    );
    let if_pos = out.find("if (x > 0.0f").expect("if branch");
    let elsif_pos = out.find("else if (x < 0.0f").expect("elsif branch");
    let else_pos = out.find("else {").expect("else branch");
    assert!(if_pos < elsif_pos);
    assert!(elsif_pos < else_pos);
    assert!(!out.contains("else {\n    if"));
}

#[test]
fn swizzle_emits_dotted_components_and_infers_vector_width() {
    let mut t = Transpiler::new(TranspilerConfig {
        needs_return: true,
        ..Default::default()
    });
    t.parse("v = vec3(1.0, 2.0, 3.0)\nreturn v.xy").unwrap();
    let out = t.emit("c").unwrap();
    assert!(out.contains("v.xy"));
}

#[test]
fn for_loop_bounds_carry_the_range_endpoints() {
    let out = transpile("for i in 0..10 do x = i end\nreturn x");
    assert!(out.contains("for (int i = 0.0f; i < 10.0f; i++)"));
}

#[test]
fn tuple_returning_function_emits_a_result_struct() {
    let mut sigs = std::collections::HashMap::new();
    sigs.insert(
        "split".to_string(),
        shade_transpiler::infer::CustomFunctionSig {
            returns: shade_transpiler::infer::CustomReturn::Tuple(vec![
                shade_transpiler::ir::TypeTag::Float,
                shade_transpiler::ir::TypeTag::Float,
            ]),
            params: Some(vec![shade_transpiler::ir::TypeTag::Vec2]),
        },
    );
    // No explicit `return`: the trailing `[a, b]` is tail-lifted into the
    // function's own `split_result` struct literal.
    let out = Transpiler::transpile_helpers(
        "def split(v)\na, b = [v.x, v.y]\n[a, b]\nend",
        "c",
        &sigs,
    )
    .unwrap();
    assert!(out.contains("struct split_result"));
    assert!(out.contains("(split_result){"));
    assert!(out.contains("v0;"));
    assert!(out.contains("v1;"));
}
