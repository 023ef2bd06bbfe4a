//! Portable C target, consumed by the CPU renderer. The one dialect where
//! vector arithmetic can't stay infix — C has no operator overloading — so
//! every vector-typed `+ - * /` lowers to a `<type>_add|sub|mul|div(l, r)`
//! call, math functions pick up their `f`-suffixed libm spellings, and a few
//! vector-returning builtins (`length`, `normalize`, `dot`, `mix`)
//! specialize to a type-qualified name.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ir::{BinOp, TypeTag};

use super::{Dialect, ScalarKind};

pub struct C;

impl C {
    pub fn new() -> Self {
        C
    }
}

impl Default for C {
    fn default() -> Self {
        C::new()
    }
}

/// `libm`-style renames: every built-in math function this crate knows
/// about gets its `f`-suffixed single-precision spelling, mirroring the
/// teacher's per-node compilation of trig/math builtins to concrete target
/// syntax (`renderer/node_compiler/trigonometry_nodes.rs`,
/// `math_nodes.rs`).
static MATH_FN_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("sin", "sinf"),
        ("cos", "cosf"),
        ("tan", "tanf"),
        ("asin", "asinf"),
        ("acos", "acosf"),
        ("atan", "atanf"),
        ("atan2", "atan2f"),
        ("exp", "expf"),
        ("log", "logf"),
        ("exp2", "exp2f"),
        ("log2", "log2f"),
        ("sqrt", "sqrtf"),
        ("inversesqrt", "rsqrtf"),
        ("pow", "powf"),
        ("abs", "fabsf"),
        ("floor", "floorf"),
        ("ceil", "ceilf"),
        ("fract", "fracf"),
        ("sign", "signf"),
        ("mod", "fmodf"),
        ("min", "fminf"),
        ("max", "fmaxf"),
        ("clamp", "clampf"),
        ("step", "stepf"),
        ("smoothstep", "smoothstepf"),
    ])
});

fn vector_rank(t: &TypeTag) -> Option<u8> {
    match t {
        TypeTag::Vec2 => Some(2),
        TypeTag::Vec3 => Some(3),
        TypeTag::Vec4 => Some(4),
        _ => None,
    }
}

impl Dialect for C {
    fn name(&self) -> &'static str {
        "c"
    }

    fn scalar_name(&self, kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            // The crate's closed type set has no native C boolean; `int`
            // matches the portable-C target's plain-C dialect.
            ScalarKind::Bool => "int",
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
        format!("vec{rank}_new({})", args.join(", "))
    }

    fn texture_call(&self, sampler: &str, uv: &str) -> String {
        format!("texture_sample({sampler}, {uv})")
    }

    fn bool_literal(&self, b: bool) -> String {
        if b { "1" } else { "0" }.to_string()
    }

    fn number_literal(&self, value: f64) -> String {
        format!("{}f", super::format_number(value))
    }

    fn math_fn_name(&self, name: &str) -> String {
        MATH_FN_NAMES.get(name).copied().unwrap_or(name).to_string()
    }

    fn vector_binary_op_call(&self, op: BinOp, left_ty: &TypeTag, l: &str, r: &str) -> Option<String> {
        let rank = vector_rank(left_ty)?;
        let op_name = match op {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            _ => return None,
        };
        Some(format!("vec{rank}_{op_name}({l}, {r})"))
    }

    fn call(&self, name: &str, receiver: Option<&str>, args: &[String], arg_types: &[TypeTag]) -> String {
        let first_is_vector = arg_types.first().and_then(vector_rank);

        if let Some(rank) = first_is_vector {
            match name {
                "length" => return format!("vec{rank}_length({})", args[0]),
                "normalize" => return format!("vec{rank}_normalize({})", args[0]),
                "dot" if args.len() == 2 => {
                    return format!("vec{rank}_dot({}, {})", args[0], args[1]);
                }
                "mix" if args.len() == 3 => return format!("mix_v{rank}({}, {}, {})", args[0], args[1], args[2]),
                _ => {}
            }
        }

        let joined = args.join(", ");
        match receiver {
            Some(r) if !joined.is_empty() => format!("{r}.{name}({joined})"),
            Some(r) => format!("{r}.{name}()"),
            None => format!("{}({joined})", self.math_fn_name(name)),
        }
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
        Emitter::new(&C::new()).emit(&ir, true)
    }

    #[test]
    fn vec3_constructor_and_f_suffixed_literals() {
        let out = emit("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(out.contains("vec3_new(1.0f, 0.0f, 0.0f)"));
        assert!(out.contains("return color"));
    }

    #[test]
    fn vector_addition_lowers_to_a_function_call() {
        let out = emit("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
        assert!(out.contains("vec2_add(a, a)"));
        assert!(!out.contains("a + a"));
    }

    #[test]
    fn scalar_addition_stays_infix() {
        let out = emit("a = 1.0\nb = a + 2.0\nreturn b");
        assert!(out.contains("a + 2.0f"));
    }

    #[test]
    fn math_function_gets_f_suffixed_name() {
        let out = emit("x = sin(0.5)\nreturn x");
        assert!(out.contains("sinf(0.5f)"));
    }

    #[test]
    fn length_normalize_dot_specialize_by_vector_rank() {
        let out = emit("a = vec3(1.0, 2.0, 3.0)\nl = length(a)\nn = normalize(a)\nd = dot(a, a)\nreturn d");
        assert!(out.contains("vec3_length(a)"));
        assert!(out.contains("vec3_normalize(a)"));
        assert!(out.contains("vec3_dot(a, a)"));
    }

    #[test]
    fn mix_specializes_for_vector_first_argument() {
        let out = emit("a = vec3(0.0, 0.0, 0.0)\nb = vec3(1.0, 1.0, 1.0)\nc = mix(a, b, 0.5)\nreturn c");
        assert!(out.contains("mix_v3(a, b, 0.5f)"));
    }

    #[test]
    fn bool_literals_emit_as_ints() {
        let out = emit("x = true\nreturn x");
        assert!(out.contains("= 1;"));
    }
}
