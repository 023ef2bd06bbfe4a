//! A source-to-source shader transpiler: surface Ruby-flavored shader
//! source in, one of four target dialects (portable C, MSL, WGSL, GLSL)
//! out.
//!
//! The pipeline is linear and stateless across instances: [`frontend::parse`]
//! lowers source into the shared [`ir::Ir`], [`infer::infer`] fills in every
//! node's type slot, and an [`emit::Emitter`] paired with a target
//! [`emit::Dialect`] renders text. [`Transpiler`] composes all three stages
//! behind a small facade.

pub mod ast;
pub mod builtins;
pub mod emit;
pub mod error;
pub mod frontend;
pub mod infer;
pub mod ir;
mod lexer;

lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

use emit::{C, Dialect, Emitter, Glsl, Msl, Wgsl};
use error::TranspileError;
use infer::CustomFunctionSig;
use ir::{Ir, TypeTag};

/// The four emitter targets named in the crate's external interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    C,
    Msl,
    Wgsl,
    Glsl,
}

impl Target {
    fn parse(name: &str) -> Result<Target, TranspileError> {
        match name {
            "c" => Ok(Target::C),
            "msl" => Ok(Target::Msl),
            "wgsl" => Ok(Target::Wgsl),
            "glsl" => Ok(Target::Glsl),
            other => Err(TranspileError::ConfigurationError(format!(
                "unknown target `{other}`; expected one of c, msl, wgsl, glsl"
            ))),
        }
    }

    fn dialect(self, glsl_version: &str) -> Box<dyn Dialect> {
        match self {
            Target::C => Box::new(C::new()),
            Target::Msl => Box::new(Msl::new()),
            Target::Wgsl => Box::new(Wgsl::new()),
            Target::Glsl => Box::new(Glsl::new(glsl_version.to_string())),
        }
    }
}

/// Per-instance configuration. Builds with `serde::Deserialize` so a host
/// can load it from JSON/RON alongside the source string, or construct one
/// purely in memory via [`Default`] plus field assignment.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TranspilerConfig {
    #[serde(default)]
    pub uniforms: HashMap<String, TypeTagConfig>,
    #[serde(default)]
    pub custom_functions: HashMap<String, CustomFunctionConfig>,
    #[serde(default)]
    pub needs_return: bool,
    /// Rendered verbatim as `#version <glsl_version>`; only consulted by the
    /// GLSL target.
    #[serde(default = "default_glsl_version")]
    pub glsl_version: String,
}

fn default_glsl_version() -> String {
    "300 es".to_string()
}

impl TranspilerConfig {
    /// Loads a config from a JSON document. This is the one spot in the
    /// facade that is fallible for reasons other than the three documented
    /// `TranspileError` kinds (malformed host-supplied JSON), so it is the
    /// one public method that returns `anyhow::Result` directly instead of
    /// converting to `TranspileError`.
    pub fn from_json(source: &str) -> anyhow::Result<TranspilerConfig> {
        serde_json::from_str(source).context("failed to parse transpiler configuration JSON")
    }
}

/// A wire-friendly mirror of [`TypeTag`] for `uniforms`/`custom_functions`
/// config entries — the IR's own `TypeTag` intentionally has no `Deserialize`
/// impl since only the Frontend and Type Inference are meant to construct
/// one directly.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTagConfig {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
}

impl From<TypeTagConfig> for TypeTag {
    fn from(t: TypeTagConfig) -> TypeTag {
        match t {
            TypeTagConfig::Float => TypeTag::Float,
            TypeTagConfig::Int => TypeTag::Int,
            TypeTagConfig::Bool => TypeTag::Bool,
            TypeTagConfig::Vec2 => TypeTag::Vec2,
            TypeTagConfig::Vec3 => TypeTag::Vec3,
            TypeTagConfig::Vec4 => TypeTag::Vec4,
            TypeTagConfig::Mat2 => TypeTag::Mat2,
            TypeTagConfig::Mat3 => TypeTag::Mat3,
            TypeTagConfig::Mat4 => TypeTag::Mat4,
            TypeTagConfig::Sampler2D => TypeTag::Sampler2D,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CustomFunctionConfig {
    pub returns: CustomReturnConfig,
    #[serde(default)]
    pub params: Option<Vec<TypeTagConfig>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum CustomReturnConfig {
    Single(TypeTagConfig),
    Tuple(Vec<TypeTagConfig>),
}

fn build_uniforms(config: &TranspilerConfig) -> HashMap<String, TypeTag> {
    config
        .uniforms
        .iter()
        .map(|(k, v)| (k.clone(), v.clone().into()))
        .collect()
}

fn build_customs(config: &TranspilerConfig) -> HashMap<String, CustomFunctionSig> {
    config
        .custom_functions
        .iter()
        .map(|(name, sig)| {
            let returns = match &sig.returns {
                CustomReturnConfig::Single(t) => infer::CustomReturn::Single(t.clone().into()),
                CustomReturnConfig::Tuple(ts) => {
                    infer::CustomReturn::Tuple(ts.iter().cloned().map(TypeTag::from).collect())
                }
            };
            let params = sig
                .params
                .as_ref()
                .map(|ps| ps.iter().cloned().map(TypeTag::from).collect());
            (name.clone(), CustomFunctionSig { returns, params })
        })
        .collect()
}

/// Composes Frontend, Type Inference, and the Emitter set behind `parse` /
/// `emit`. Each instance owns at most one parsed IR tree; nothing here
/// survives past a single parse/emit cycle.
pub struct Transpiler {
    config: TranspilerConfig,
    ir: Option<Ir>,
}

impl Transpiler {
    pub fn new(config: TranspilerConfig) -> Self {
        Transpiler { config, ir: None }
    }

    /// Parses `source`, lowers it to IR, and runs Type Inference — seeding
    /// the symbol table with the configured uniforms (Type Inference itself
    /// additionally seeds `frag_coord`/`resolution`).
    pub fn parse(&mut self, source: &str) -> Result<(), TranspileError> {
        let uniform_names: Vec<String> = self.config.uniforms.keys().cloned().collect();
        let ir = frontend::parse(source, &uniform_names)?;
        let uniforms = build_uniforms(&self.config);
        let customs = build_customs(&self.config);
        infer::infer(&ir, &uniforms, &customs);
        self.ir = Some(ir);
        Ok(())
    }

    /// Renders the parsed IR for `target`. Fails if nothing has been parsed
    /// yet, or if `target` isn't one of the four known dialect names.
    pub fn emit(&self, target: &str) -> Result<String, TranspileError> {
        let ir = self.ir.as_ref().ok_or_else(|| {
            TranspileError::InternalError("emit called before a successful parse".to_string())
        })?;
        let target = Target::parse(target)?;
        let dialect = target.dialect(&self.config.glsl_version);
        Ok(Emitter::new(dialect.as_ref()).emit(ir, self.config.needs_return))
    }

    /// The helpers entry point: parses `source`, applies `function_signatures`
    /// to each top-level `FunctionDefinition` (setting its declared return
    /// type and parameter types instead of leaving them to inference),
    /// infers the rest of the tree, then emits with `needs_return = false`.
    /// Unknown function names in `function_signatures` are silently skipped;
    /// the helper-signature application never fails.
    pub fn transpile_helpers(
        source: &str,
        target: &str,
        function_signatures: &HashMap<String, CustomFunctionSig>,
    ) -> Result<String, TranspileError> {
        let target = Target::parse(target)?;
        let ir = frontend::parse(source, &[])?;
        apply_signatures(&ir, function_signatures);
        infer::infer(&ir, &HashMap::new(), function_signatures);
        let dialect = target.dialect("300 es");
        Ok(Emitter::new(dialect.as_ref()).emit(&ir, false))
    }
}

/// Walks the top-level block and, for every `FunctionDefinition` whose name
/// is in `signatures`, fills its `return_type`/`param_types` slots so Type
/// Inference treats them as already-declared instead of inferring them from
/// the body.
fn apply_signatures(ir: &Ir, signatures: &HashMap<String, CustomFunctionSig>) {
    let ir::IrKind::Block(stmts) = &ir.kind else {
        return;
    };
    for stmt in stmts {
        let ir::IrKind::FunctionDefinition {
            name,
            params,
            return_type,
            param_types,
            ..
        } = &stmt.kind
        else {
            continue;
        };
        let Some(sig) = signatures.get(name) else {
            continue;
        };
        let resolved_return = match &sig.returns {
            infer::CustomReturn::Single(t) => t.clone(),
            infer::CustomReturn::Tuple(ts) => TypeTag::Tuple(ts.clone()),
        };
        *return_type.borrow_mut() = Some(resolved_return);
        if let Some(param_tys) = &sig.params {
            let mut map = param_types.borrow_mut();
            for (param, ty) in params.iter().zip(param_tys.iter()) {
                map.insert(param.clone(), ty.clone());
            }
        }
    }
}
