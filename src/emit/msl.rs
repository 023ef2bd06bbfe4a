//! Metal Shading Language target. Vector ops stay infix (MSL overloads
//! arithmetic on its vector types directly); math functions keep their
//! C-like overloaded names; texture sampling becomes a method call on the
//! sampler/texture object using an implicit, well-known `textureSampler`
//! (a future revision could thread a sampler parameter through the function
//! signature instead).

use super::{Dialect, ScalarKind};

pub struct Msl;

impl Msl {
    pub fn new() -> Self {
        Msl
    }
}

impl Default for Msl {
    fn default() -> Self {
        Msl::new()
    }
}

impl Dialect for Msl {
    fn name(&self) -> &'static str {
        "msl"
    }

    fn scalar_name(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
        }
    }

    fn vector_name(&self, rank: u8) -> String {
        format!("float{rank}")
    }

    fn matrix_name(&self, rank: u8) -> String {
        format!("float{rank}x{rank}")
    }

    fn sampler_name(&self) -> &'static str {
        "texture2d<float>"
    }

    fn vector_ctor(&self, rank: u8, args: &[String]) -> String {
        format!("float{rank}({})", args.join(", "))
    }

    fn texture_call(&self, sampler: &str, uv: &str) -> String {
        format!("{sampler}.sample(textureSampler, {uv})")
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
        Emitter::new(&Msl::new()).emit(&ir, true)
    }

    #[test]
    fn vec3_constructor_uses_floatN_spelling() {
        let out = emit("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(out.contains("float3(1.0, 0.0, 0.0)"));
    }

    #[test]
    fn vector_arithmetic_stays_infix() {
        let out = emit("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
        assert!(out.contains("a + a"));
    }

    #[test]
    fn math_functions_keep_overloaded_names() {
        let out = emit("x = sin(0.5)\nreturn x");
        assert!(out.contains("sin(0.5)"));
    }

    #[test]
    fn texture_sample_becomes_a_method_call() {
        let mut uniforms = HashMap::new();
        uniforms.insert("tex".to_string(), crate::ir::TypeTag::Sampler2D);
        let (program, params) = parse_ast("c = texture2D(tex, uv)\nreturn c").unwrap();
        let ir = lower_program(&program, &params);
        crate::infer::infer(&ir, &uniforms, &HashMap::new());
        let out = Emitter::new(&Msl::new()).emit(&ir, true);
        assert!(out.contains("tex.sample(textureSampler, uv)"));
    }
}
