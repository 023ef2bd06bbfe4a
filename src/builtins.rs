//! The static, read-only catalog of built-in function signatures, operator
//! classifications, and the swizzle alphabet. Loaded once behind a
//! `std::sync::LazyLock`, since the function/operator set is a closed,
//! versioned part of the language rather than something a host customizes.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ir::{BinOp, TypeTag};

/// How a built-in function's return type is derived from its argument types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnRule {
    /// The type of the first argument (an alias used for most constructors
    /// and elementwise math functions).
    Same,
    First,
    Second,
    Third,
    Concrete(TypeTag),
}

impl ReturnRule {
    pub fn resolve(&self, arg_types: &[TypeTag]) -> TypeTag {
        match self {
            ReturnRule::Same | ReturnRule::First => {
                arg_types.first().cloned().unwrap_or(TypeTag::Float)
            }
            ReturnRule::Second => arg_types.get(1).cloned().unwrap_or(TypeTag::Float),
            ReturnRule::Third => arg_types.get(2).cloned().unwrap_or(TypeTag::Float),
            ReturnRule::Concrete(t) => t.clone(),
        }
    }
}

/// A coarse parameter-type class; built-ins never constrain arguments beyond
/// "some argument was supplied" since the crate does not do full
/// type-checking diagnostics (a documented non-goal).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamClass {
    Any,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSig {
    pub params: &'static [ParamClass],
    pub returns: ReturnRule,
    pub variadic: bool,
    pub min_arity: usize,
}

macro_rules! sig {
    ($returns:expr, variadic, $min:expr) => {
        FunctionSig {
            params: &[],
            returns: $returns,
            variadic: true,
            min_arity: $min,
        }
    };
    ($returns:expr, $min:expr) => {
        FunctionSig {
            params: &[],
            returns: $returns,
            variadic: false,
            min_arity: $min,
        }
    };
}

pub static FUNCTIONS: LazyLock<HashMap<&'static str, FunctionSig>> = LazyLock::new(|| {
    use ReturnRule::*;
    use TypeTag::*;

    let mut m = HashMap::new();

    // Vector/matrix constructors: variadic, return is the constructed type.
    m.insert("vec2", sig!(Concrete(Vec2), variadic, 1));
    m.insert("vec3", sig!(Concrete(Vec3), variadic, 1));
    m.insert("vec4", sig!(Concrete(Vec4), variadic, 1));
    m.insert("mat2", sig!(Concrete(Mat2), variadic, 1));
    m.insert("mat3", sig!(Concrete(Mat3), variadic, 1));
    m.insert("mat4", sig!(Concrete(Mat4), variadic, 1));

    // Trigonometric.
    for name in ["sin", "cos", "tan", "asin", "acos", "atan"] {
        m.insert(name, sig!(Same, 1));
    }
    m.insert("atan2", sig!(Same, 2));

    // Exponential/logarithmic.
    for name in ["exp", "log", "exp2", "log2", "sqrt", "inversesqrt"] {
        m.insert(name, sig!(Same, 1));
    }
    m.insert("pow", sig!(Same, 2));

    // Common math.
    for name in ["abs", "floor", "ceil", "fract", "sign"] {
        m.insert(name, sig!(Same, 1));
    }
    m.insert("mod", sig!(Same, 2));
    m.insert("min", sig!(Same, 2));
    m.insert("max", sig!(Same, 2));
    m.insert("clamp", sig!(Same, 3));
    m.insert("mix", sig!(Same, 3));
    m.insert("step", sig!(Second, 2));
    m.insert("smoothstep", sig!(Third, 3));

    // Vector ops.
    m.insert("length", sig!(Concrete(Float), 1));
    m.insert("distance", sig!(Concrete(Float), 2));
    m.insert("dot", sig!(Concrete(Float), 2));
    m.insert("cross", sig!(Same, 2));
    m.insert("normalize", sig!(Same, 1));
    m.insert("reflect", sig!(Same, 2));
    m.insert("refract", sig!(Same, 3));

    // Matrix ops.
    m.insert("inverse", sig!(Same, 1));
    m.insert("transpose", sig!(Same, 1));
    m.insert("determinant", sig!(Concrete(Float), 1));

    // Texture functions: always return a vec4 color sample.
    m.insert("texture2D", sig!(Concrete(Vec4), 2));
    m.insert("texture", sig!(Concrete(Vec4), 2));
    m.insert("textureLod", sig!(Concrete(Vec4), 3));

    // Hash helpers.
    m.insert("hash", sig!(Concrete(Float), 1));
    m.insert("hash2", sig!(Concrete(Vec2), 1));
    m.insert("hash3", sig!(Concrete(Vec3), 1));

    // Per-component comparison helpers. The crate's closed type set does not
    // model bvecN separately (documented non-goal), so these collapse to
    // `bool`.
    for name in ["lessThan", "greaterThan", "equal", "notEqual"] {
        m.insert(name, sig!(Concrete(Bool), 2));
    }

    m
});

/// Resolves a built-in call's return type. `None` means the name is not a
/// built-in.
pub fn lookup(name: &str) -> Option<&'static FunctionSig> {
    FUNCTIONS.get(name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Logical,
}

pub fn operator_class(op: BinOp) -> OperatorClass {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => OperatorClass::Arithmetic,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            OperatorClass::Comparison
        }
        BinOp::And | BinOp::Or => OperatorClass::Logical,
    }
}

/// The full swizzle alphabet; `xyzw`, `rgba`, and `stpq` are interchangeable
/// spellings of the same four positions.
pub const SWIZZLE_ALPHABET: [char; 12] = [
    'x', 'y', 'z', 'w', 'r', 'g', 'b', 'a', 's', 't', 'p', 'q',
];

pub fn is_swizzle_char(c: char) -> bool {
    SWIZZLE_ALPHABET.contains(&c)
}

/// A name is a swizzle candidate if it is 1-4 characters, all drawn from the
/// swizzle alphabet.
pub fn classify_field(name: &str) -> Option<SwizzleShape> {
    let len = name.chars().count();
    if len == 0 || len > 4 || !name.chars().all(is_swizzle_char) {
        return None;
    }
    Some(match len {
        1 => SwizzleShape::Field,
        2 => SwizzleShape::Swizzle(TypeTag::Vec2),
        3 => SwizzleShape::Swizzle(TypeTag::Vec3),
        4 => SwizzleShape::Swizzle(TypeTag::Vec4),
        _ => unreachable!(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwizzleShape {
    /// Single-component field access; always `float`.
    Field,
    /// A 2-4 letter swizzle producing the given vector type.
    Swizzle(TypeTag),
}

pub fn is_scalar(t: &TypeTag) -> bool {
    matches!(t, TypeTag::Float | TypeTag::Int | TypeTag::Bool)
}

pub fn is_vector(t: &TypeTag) -> bool {
    matches!(t, TypeTag::Vec2 | TypeTag::Vec3 | TypeTag::Vec4)
}

pub fn is_matrix(t: &TypeTag) -> bool {
    matches!(t, TypeTag::Mat2 | TypeTag::Mat3 | TypeTag::Mat4)
}

/// Rank (component/row count) of a vector or matrix type; `None` for
/// anything else.
pub fn rank(t: &TypeTag) -> Option<u8> {
    match t {
        TypeTag::Vec2 | TypeTag::Mat2 => Some(2),
        TypeTag::Vec3 | TypeTag::Mat3 => Some(3),
        TypeTag::Vec4 | TypeTag::Mat4 => Some(4),
        _ => None,
    }
}

fn vector_of_rank(r: u8) -> TypeTag {
    match r {
        2 => TypeTag::Vec2,
        3 => TypeTag::Vec3,
        _ => TypeTag::Vec4,
    }
}

fn matrix_of_rank(r: u8) -> TypeTag {
    match r {
        2 => TypeTag::Mat2,
        3 => TypeTag::Mat3,
        _ => TypeTag::Mat4,
    }
}

/// The one nontrivial algorithm in the registry: resolves the result type of
/// a binary operator given its operand types. Comparison/logical always
/// yield `bool`; arithmetic applies the matrix/vector/scalar promotion rules
/// in priority order, falling back to `float` when nothing else matches.
pub fn binary_result_type(op: BinOp, left: &TypeTag, right: &TypeTag) -> TypeTag {
    match operator_class(op) {
        OperatorClass::Comparison | OperatorClass::Logical => return TypeTag::Bool,
        OperatorClass::Arithmetic => {}
    }

    let (l_mat, r_mat) = (is_matrix(left), is_matrix(right));
    let (l_vec, r_vec) = (is_vector(left), is_vector(right));
    let (l_scalar, r_scalar) = (is_scalar(left), is_scalar(right));

    if l_mat && r_vec {
        if let Some(rk) = rank(right) {
            return vector_of_rank(rk);
        }
    }
    if l_vec && r_mat {
        if let Some(rk) = rank(left) {
            return vector_of_rank(rk);
        }
    }
    if l_mat && r_mat {
        if let (Some(lr), Some(rr)) = (rank(left), rank(right)) {
            if lr == rr {
                return matrix_of_rank(lr);
            }
        }
    }
    if (l_mat && r_scalar) || (r_mat && l_scalar) {
        let m = if l_mat { left } else { right };
        if let Some(rk) = rank(m) {
            return matrix_of_rank(rk);
        }
    }
    if l_vec && r_vec {
        if let (Some(lr), Some(rr)) = (rank(left), rank(right)) {
            if lr == rr {
                return vector_of_rank(lr);
            }
        }
    }
    if (l_vec && r_scalar) || (r_vec && l_scalar) {
        let v = if l_vec { left } else { right };
        if let Some(rk) = rank(v) {
            return vector_of_rank(rk);
        }
    }

    TypeTag::Float
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinOp;

    #[test]
    fn comparison_is_always_bool() {
        assert_eq!(
            binary_result_type(BinOp::Lt, &TypeTag::Vec3, &TypeTag::Vec3),
            TypeTag::Bool
        );
    }

    #[test]
    fn matrix_times_vector_is_vector() {
        assert_eq!(
            binary_result_type(BinOp::Mul, &TypeTag::Mat3, &TypeTag::Vec3),
            TypeTag::Vec3
        );
    }

    #[test]
    fn vector_times_scalar_is_vector() {
        assert_eq!(
            binary_result_type(BinOp::Mul, &TypeTag::Vec4, &TypeTag::Float),
            TypeTag::Vec4
        );
        assert_eq!(
            binary_result_type(BinOp::Mul, &TypeTag::Int, &TypeTag::Vec2),
            TypeTag::Vec2
        );
    }

    #[test]
    fn mismatched_ranks_fall_back_to_float() {
        assert_eq!(
            binary_result_type(BinOp::Add, &TypeTag::Vec2, &TypeTag::Vec3),
            TypeTag::Float
        );
    }

    #[test]
    fn swizzle_classification_by_length() {
        assert_eq!(classify_field("x"), Some(SwizzleShape::Field));
        assert_eq!(classify_field("xy"), Some(SwizzleShape::Swizzle(TypeTag::Vec2)));
        assert_eq!(classify_field("rgba"), Some(SwizzleShape::Swizzle(TypeTag::Vec4)));
        assert_eq!(classify_field("position"), None);
    }

    #[test]
    fn return_rule_resolution() {
        let args = [TypeTag::Vec3, TypeTag::Float];
        assert_eq!(ReturnRule::Same.resolve(&args), TypeTag::Vec3);
        assert_eq!(ReturnRule::Second.resolve(&args), TypeTag::Float);
        assert_eq!(ReturnRule::Concrete(TypeTag::Bool).resolve(&args), TypeTag::Bool);
    }

    #[test]
    fn builtin_lookup_resolves_vec_constructor() {
        let sig = lookup("vec3").unwrap();
        assert!(sig.variadic);
        assert_eq!(sig.returns, ReturnRule::Concrete(TypeTag::Vec3));
    }
}
