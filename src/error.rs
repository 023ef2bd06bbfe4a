//! The crate's public, `thiserror`-derived error type. Every fallible entry
//! point in the `Transpiler` façade returns this fixed set; the one
//! exception is config loading (`TranspilerConfig::from_json`), which
//! threads `anyhow::Result` directly for its own JSON-asset loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranspileError {
    /// Surface syntax is invalid — lexer or grammar failure, or a semantic
    /// rejection during lowering (e.g. an unsupported do-block method).
    #[error("parse error: {0}")]
    ParseError(String),

    /// An emitter hit an IR node kind it does not know about, or `emit` was
    /// called before `parse`. Signals a bug in the IR or the caller, not a
    /// problem with the input source.
    #[error("internal error: {0}")]
    InternalError(String),

    /// The requested target is not one of `c`, `msl`, `wgsl`, `glsl`.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
