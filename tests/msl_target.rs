//! End-to-end scenarios for the Metal Shading Language target. MSL has no
//! validator crate in this corpus, so these scenarios are checked as
//! textual assertions against the emitted source.

use shade_transpiler::{Transpiler, TranspilerConfig};

fn transpile(source: &str) -> String {
    let mut t = Transpiler::new(TranspilerConfig {
        needs_return: true,
        ..Default::default()
    });
    t.parse(source).expect("parse");
    t.emit("msl").expect("emit")
}

#[test]
fn vec3_literal_uses_floatn_constructor() {
    let out = transpile("color = vec3(1.0, 0.0, 0.0)\nreturn color");
    assert!(out.contains("float3 color = float3(1.0, 0.0, 0.0);"));
    assert!(out.contains("return color;"));
}

#[test]
fn vector_addition_stays_infix_since_msl_overloads_arithmetic() {
    let out = transpile("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
    assert!(out.contains("float2 b = a + a;"));
}

#[test]
fn sin_keeps_its_overloaded_name() {
    let out = transpile("x = sin(0.5)\nreturn x");
    assert!(out.contains("sin(0.5)"));
}

#[test]
fn elsif_chain_flattens_into_else_if() {
    let out = transpile(
        "if x > 0.0 then y = 1.0 elsif x < 0.0 then y = -1.0 else y = 0.0 end\nreturn y",
    );
    let if_pos = out.find("if (x > 0.0)").expect("if branch");
    let elsif_pos = out.find("else if (x < 0.0)").expect("elsif branch");
    assert!(if_pos < elsif_pos);
    assert!(!out.contains("else {\n    if"));
}

#[test]
fn texture_sample_becomes_a_method_call_on_the_sampler() {
    let mut config = TranspilerConfig {
        needs_return: true,
        ..Default::default()
    };
    config
        .uniforms
        .insert("tex".to_string(), shade_transpiler::TypeTagConfig::Sampler2D);
    let mut t = Transpiler::new(config);
    t.parse("c = texture2D(tex, uv)\nreturn c").unwrap();
    let out = t.emit("msl").unwrap();
    assert!(out.contains("tex.sample(textureSampler, uv)"));
}

#[test]
fn matrix_vector_multiply_resolves_to_the_vector_rank() {
    let mut t = Transpiler::new(TranspilerConfig {
        needs_return: true,
        ..Default::default()
    });
    t.parse("m = mat3(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)\nv = vec3(1.0, 2.0, 3.0)\nr = m * v\nreturn r")
        .unwrap();
    let out = t.emit("msl").unwrap();
    assert!(out.contains("float3 r = m * v;"));
}
