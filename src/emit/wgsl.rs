//! WebGPU Shading Language target. Local declarations use `let` bindings
//! with an explicit type annotation, `for` headers spell out an explicit
//! `i32` induction variable, and a ternary would lower to `select(...)` —
//! the one IR shape this crate doesn't currently produce (there is no
//! expression-position `if`), so the override exists for completeness and
//! for any future frontend addition that needs it.

use super::{Dialect, ScalarKind};

pub struct Wgsl;

impl Wgsl {
    pub fn new() -> Self {
        Wgsl
    }
}

impl Default for Wgsl {
    fn default() -> Self {
        Wgsl::new()
    }
}

impl Dialect for Wgsl {
    fn name(&self) -> &'static str {
        "wgsl"
    }

    fn scalar_name(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Float => "f32",
            ScalarKind::Int => "i32",
            ScalarKind::Bool => "bool",
        }
    }

    fn vector_name(&self, rank: u8) -> String {
        format!("vec{rank}<f32>")
    }

    fn matrix_name(&self, rank: u8) -> String {
        format!("mat{rank}x{rank}<f32>")
    }

    fn sampler_name(&self) -> &'static str {
        "texture_2d<f32>"
    }

    fn vector_ctor(&self, rank: u8, args: &[String]) -> String {
        format!("vec{rank}<f32>({})", args.join(", "))
    }

    fn texture_call(&self, sampler: &str, uv: &str) -> String {
        format!("textureSample({sampler}, {uv})")
    }

    fn var_decl(&self, name: &str, ty: &str, init: &str) -> String {
        format!("let {name}: {ty} = {init};")
    }

    fn for_header(&self, var: &str, start: &str, end: &str) -> String {
        format!("for (var {var}: i32 = {start}; {var} < {end}; {var}++)")
    }

    fn ternary(&self, cond: &str, when_true: &str, when_false: &str) -> String {
        format!("select({when_false}, {when_true}, {cond})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emitter;
    use crate::frontend::lower::lower_program;
    use crate::frontend::parse_ast;
    use std::collections::HashMap;

    fn emit(src: &str) -> String {
        let (program, params) = parse_ast(src).unwrap();
        let ir = lower_program(&program, &params);
        crate::infer::infer(&ir, &HashMap::new(), &HashMap::new());
        Emitter::new(&Wgsl::new()).emit(&ir, true)
    }

    #[test]
    fn locals_use_let_bindings_with_type_annotation() {
        let out = emit("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(out.contains("let color: vec3<f32> = vec3<f32>(1.0, 0.0, 0.0)"));
    }

    #[test]
    fn for_loop_emits_explicit_i32_induction_variable() {
        let out = emit("for i in 0..10 do x = i end\nreturn x");
        assert!(out.contains("for (var i: i32 = 0.0; i < 10.0; i++)"));
    }

    #[test]
    fn ternary_override_lowers_to_select() {
        let wgsl = Wgsl::new();
        assert_eq!(wgsl.ternary("cond", "t", "f"), "select(f, t, cond)");
    }
}
