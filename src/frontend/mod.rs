//! Turns surface source text into a structured IR `Block`.
//!
//! Grammar-level parsing (this module) and semantic lowering
//! ([`lower`]) are kept separate on purpose: the disambiguation rules in
//! `lower` are semantic, not syntactic, and mixing them into the grammar
//! would make both harder to change independently.

pub mod lower;

use crate::error::TranspileError;
use crate::ir::Ir;
use crate::lexer::Lexer;

/// Splits a leading `|a, b, c|` parameter preamble (used by inline code
/// literals) off the front of `source`, returning the parameter names and
/// the remaining body to feed to the grammar.
fn extract_preamble(source: &str) -> (Vec<String>, &str) {
    let trimmed = source.trim_start();
    if let Some(after_pipe) = trimmed.strip_prefix('|') {
        if let Some(close) = after_pipe.find('|') {
            let params = after_pipe[..close]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            return (params, &after_pipe[close + 1..]);
        }
    }
    (Vec::new(), source)
}

/// Parses `source` into a raw (unlowered) syntax tree plus any preamble
/// parameter names.
pub fn parse_ast(source: &str) -> Result<(crate::ast::Program, Vec<String>), TranspileError> {
    let (preamble_params, body) = extract_preamble(source);
    let lexer = Lexer::new(body);
    let program = crate::grammar::ProgramParser::new()
        .parse(lexer)
        .map_err(|e| TranspileError::ParseError(format!("{e}")))?;
    Ok((program, preamble_params))
}

/// Parses and lowers `source` into the shared IR, seeding the lowering pass
/// with `uniform_names` (so field accesses on known uniforms don't get
/// mistaken for undeclared locals) in addition to any preamble parameters.
pub fn parse(source: &str, uniform_names: &[String]) -> Result<Ir, TranspileError> {
    let (program, preamble_params) = parse_ast(source)?;
    let mut known_params = preamble_params;
    known_params.extend(uniform_names.iter().cloned());
    Ok(lower::lower_program(&program, &known_params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_preamble_params() {
        let (params, rest) = extract_preamble("|a, b, c|\nx = a + b");
        assert_eq!(params, vec!["a", "b", "c"]);
        assert_eq!(rest.trim_start(), "x = a + b");
    }

    #[test]
    fn no_preamble_is_a_no_op() {
        let (params, rest) = extract_preamble("x = 1");
        assert!(params.is_empty());
        assert_eq!(rest, "x = 1");
    }

    #[test]
    fn parses_simple_assignment_and_return() {
        let ir = parse("color = vec3(1.0, 0.0, 0.0)\nreturn color", &[]).unwrap();
        match &ir.kind {
            crate::ir::IrKind::Block(stmts) => assert_eq!(stmts.len(), 2),
            other => panic!("expected a block, got {other:?}"),
        }
    }
}
