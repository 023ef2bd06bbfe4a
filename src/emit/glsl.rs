//! GLSL target: the closest dialect to the shared base — infix everywhere,
//! function names pass through unchanged — plus a `#version` prelude line
//! chosen at construction time.

use super::{Dialect, ScalarKind};

pub struct Glsl {
    version: String,
}

impl Glsl {
    pub fn new(version: impl Into<String>) -> Self {
        Glsl { version: version.into() }
    }
}

impl Default for Glsl {
    /// `300 es` matches the WebGL2/OpenGL ES baseline this crate's other
    /// fragment-shader targets assume (`frag_coord`, `resolution` as vec2
    /// inputs).
    fn default() -> Self {
        Glsl::new("300 es")
    }
}

impl Dialect for Glsl {
    fn name(&self) -> &'static str {
        "glsl"
    }

    fn scalar_name(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
        }
    }

    fn vector_name(&self, rank: u8) -> String {
        format!("vec{rank}")
    }

    fn matrix_name(&self, rank: u8) -> String {
        format!("mat{rank}")
    }

    fn sampler_name(&self) -> &'static str {
        "sampler2D"
    }

    fn vector_ctor(&self, rank: u8, args: &[String]) -> String {
        format!("vec{rank}({})", args.join(", "))
    }

    fn texture_call(&self, sampler: &str, uv: &str) -> String {
        format!("texture2D({sampler}, {uv})")
    }

    fn prelude(&self) -> String {
        format!("#version {}", self.version)
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
        Emitter::new(&Glsl::new("300 es")).emit(&ir, true)
    }

    #[test]
    fn prelude_carries_the_configured_version() {
        let out = emit("return 1.0");
        assert!(out.starts_with("#version 300 es"));
    }

    #[test]
    fn vec3_constructor_and_return_are_infix_glsl() {
        let out = emit("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(out.contains("vec3(1.0, 0.0, 0.0)"));
        assert!(out.contains("return color"));
    }

    #[test]
    fn math_functions_keep_their_names() {
        let out = emit("x = sin(0.5)\nreturn x");
        assert!(out.contains("sin(0.5)"));
    }

    #[test]
    fn texture2d_emits_texture2d_call() {
        let mut uniforms = HashMap::new();
        uniforms.insert("tex".to_string(), crate::ir::TypeTag::Sampler2D);
        let (program, params) = parse_ast("c = texture2D(tex, uv)\nreturn c").unwrap();
        let ir = lower_program(&program, &params);
        crate::infer::infer(&ir, &uniforms, &HashMap::new());
        let out = Emitter::new(&Glsl::new("300 es")).emit(&ir, true);
        assert!(out.contains("texture2D(tex, uv)"));
    }
}
