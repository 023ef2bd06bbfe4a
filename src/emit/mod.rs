//! Shared emission logic: indentation, precedence-aware binary-op
//! rendering, elsif-chain flattening, tail-return lifting, tuple-return
//! struct synthesis, and multi-assignment lowering. Each target only
//! supplies a small [`Dialect`] implementation (type-name spellings,
//! constructor/texture-call syntax, and the handful of target-specific
//! rendering rules called out in the four submodules).

mod c;
mod glsl;
mod msl;
mod wgsl;

pub use c::C;
pub use glsl::Glsl;
pub use msl::Msl;
pub use wgsl::Wgsl;

use crate::ir::{BinOp, Ir, IrKind, TypeTag, UnaryOp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Int,
    Bool,
}

/// Everything a concrete target customizes. Every method has a reasonable
/// infix-everywhere default so a dialect only has to override what actually
/// differs between targets.
pub trait Dialect {
    fn name(&self) -> &'static str;
    fn scalar_name(&self, kind: ScalarKind) -> &'static str;
    fn vector_name(&self, rank: u8) -> String;
    fn matrix_name(&self, rank: u8) -> String;
    fn sampler_name(&self) -> &'static str;
    fn vector_ctor(&self, rank: u8, args: &[String]) -> String;
    fn texture_call(&self, sampler: &str, uv: &str) -> String;

    /// A matrix constructor call (`mat3(...)`). Default: the dialect's own
    /// matrix type name used as the constructor, which already matches every
    /// current target (`mat3(...)` for C/GLSL, `float3x3(...)` for MSL,
    /// `mat3x3<f32>(...)` for WGSL).
    fn matrix_ctor(&self, rank: u8, args: &[String]) -> String {
        format!("{}({})", self.matrix_name(rank), args.join(", "))
    }

    fn bool_literal(&self, b: bool) -> String {
        if b { "true" } else { "false" }.to_string()
    }

    /// Integers render with a `.0` suffix; floats preserve the existing
    /// point. Dialects that need a numeric suffix (C's trailing `f`)
    /// override this.
    fn number_literal(&self, value: f64) -> String {
        format_number(value)
    }

    fn var_decl(&self, name: &str, ty: &str, init: &str) -> String {
        format!("{ty} {name} = {init};")
    }

    fn for_header(&self, var: &str, start: &str, end: &str) -> String {
        format!("for (int {var} = {start}; {var} < {end}; {var}++)")
    }

    fn ternary(&self, cond: &str, when_true: &str, when_false: &str) -> String {
        format!("({cond} ? {when_true} : {when_false})")
    }

    /// A fully-rendered call, letting a dialect redirect known names
    /// (`length`, `mix`, …) to type-specialized spellings. The default just
    /// applies [`Dialect::math_fn_name`] and joins the (already-rendered)
    /// args; `arg_types` carries each argument's inferred type for
    /// specialization decisions.
    fn call(&self, name: &str, receiver: Option<&str>, args: &[String], _arg_types: &[TypeTag]) -> String {
        let joined = args.join(", ");
        match receiver {
            Some(r) if !joined.is_empty() => format!("{}.{name}({joined})", r),
            Some(r) => format!("{}.{name}()", r),
            None => format!("{}({joined})", self.math_fn_name(name)),
        }
    }

    /// Renames a built-in math function name for this target (e.g. `sin` ->
    /// `sinf` in C). Default: pass through unchanged.
    fn math_fn_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Lets a target lower vector arithmetic to a function call instead of
    /// infix (C's `vec3_add(l, r)` and friends). Default: always infix.
    fn vector_binary_op_call(&self, _op: BinOp, _left_ty: &TypeTag, _l: &str, _r: &str) -> Option<String> {
        None
    }

    /// Text emitted once, before anything else (GLSL's `#version` line).
    fn prelude(&self) -> String {
        String::new()
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        let s = format!("{value}");
        s
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 3,
        BinOp::Add | BinOp::Sub => 4,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 5,
    }
}

fn vector_type_rank(t: &TypeTag) -> Option<u8> {
    match t {
        TypeTag::Vec2 => Some(2),
        TypeTag::Vec3 => Some(3),
        TypeTag::Vec4 => Some(4),
        _ => None,
    }
}

pub fn type_name(d: &dyn Dialect, t: &TypeTag) -> String {
    match t {
        TypeTag::Float => d.scalar_name(ScalarKind::Float).to_string(),
        TypeTag::Int => d.scalar_name(ScalarKind::Int).to_string(),
        TypeTag::Bool => d.scalar_name(ScalarKind::Bool).to_string(),
        TypeTag::Vec2 => d.vector_name(2),
        TypeTag::Vec3 => d.vector_name(3),
        TypeTag::Vec4 => d.vector_name(4),
        TypeTag::Mat2 => d.matrix_name(2),
        TypeTag::Mat3 => d.matrix_name(3),
        TypeTag::Mat4 => d.matrix_name(4),
        TypeTag::Sampler2D => d.sampler_name().to_string(),
        TypeTag::Array(elem) => format!("{}[]", type_name(d, elem)),
        TypeTag::Tuple(_) => "/* tuple */".to_string(),
    }
}

/// If `node` is directly an `IfStatement`, or a `Block` wrapping exactly one,
/// returns it — the shape an elsif/else clause takes so the chain can be
/// flattened into `else if` instead of nested `else { if … }`.
fn as_elsif(node: &Ir) -> Option<&Ir> {
    match &node.kind {
        IrKind::IfStatement { .. } => Some(node),
        IrKind::Block(stmts) if stmts.len() == 1 => as_elsif(&stmts[0]),
        _ => None,
    }
}

fn target_name(node: &Ir) -> String {
    match &node.kind {
        IrKind::VarRef(name) => name.clone(),
        _ => format!("{node:?}"),
    }
}

pub struct Emitter<'a> {
    dialect: &'a dyn Dialect,
    indent: usize,
    /// Name of the tuple-return struct for the function currently being
    /// emitted, so a tail `ArrayLiteral` lifted to `return` casts to the
    /// same type its enclosing function declares. `None` at top level, where
    /// a tail `ArrayLiteral` falls back to a fixed name.
    tuple_struct_name: Option<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Emitter {
            dialect,
            indent: 0,
            tuple_struct_name: None,
        }
    }

    fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }

    /// Top-level entry point: emits `ir` (always a `Block`), lifting the
    /// tail statement to a `return` when `needs_return` is set.
    pub fn emit(&mut self, ir: &Ir, needs_return: bool) -> String {
        let IrKind::Block(stmts) = &ir.kind else {
            return self.emit_stmt(ir);
        };
        let mut out = String::new();
        let prelude = self.dialect.prelude();
        if !prelude.is_empty() {
            out.push_str(&prelude);
            out.push('\n');
        }
        out.push_str(&self.emit_stmts(stmts, needs_return));
        out
    }

    fn emit_stmts(&mut self, stmts: &[Ir], lift_tail: bool) -> String {
        if stmts.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(stmts.len());
        let (body, tail) = stmts.split_at(stmts.len() - 1);
        for s in body {
            lines.push(self.emit_stmt(s));
        }
        if lift_tail {
            lines.push(self.emit_tail(&tail[0]));
        } else {
            lines.push(self.emit_stmt(&tail[0]));
        }
        lines.join("\n")
    }

    /// Return-lifting: a tail expression becomes `return <expr>;`; a tail
    /// `IfStatement` has both branches recursively lifted; statement-shaped
    /// tails (`Return`, `FunctionDefinition`, `GlobalDecl`,
    /// `MultipleAssignment`) pass through unchanged; a tail `ArrayLiteral`
    /// is packaged as a tuple-style struct return.
    fn emit_tail(&mut self, node: &Ir) -> String {
        match &node.kind {
            IrKind::Return(_)
            | IrKind::FunctionDefinition { .. }
            | IrKind::GlobalDecl { .. }
            | IrKind::MultipleAssignment { .. }
            | IrKind::Break => self.emit_stmt(node),

            IrKind::IfStatement {
                cond,
                then_block,
                else_block,
            } => self.emit_if_chain(cond, then_block, else_block, true),

            IrKind::ArrayLiteral(items) => {
                let rendered: Vec<String> = items.iter().map(|i| self.emit_expr(i, 0)).collect();
                let struct_name = self
                    .tuple_struct_name
                    .clone()
                    .unwrap_or_else(|| "TranspileResult".to_string());
                format!(
                    "{}return ({struct_name}){{ {} }};",
                    self.pad(),
                    rendered.join(", ")
                )
            }

            _ => format!("{}return {};", self.pad(), self.emit_expr(node, 0)),
        }
    }

    fn emit_stmt(&mut self, node: &Ir) -> String {
        match &node.kind {
            IrKind::VarDecl { name, init } => {
                let ty = type_name(self.dialect, &init.ty().unwrap_or(TypeTag::Float));
                let init_str = self.emit_expr(init, 0);
                format!("{}{}", self.pad(), self.dialect.var_decl(name, &ty, &init_str))
            }

            IrKind::Assignment { target, value } => {
                let target_str = self.emit_expr(target, 0);
                let value_str = self.emit_expr(value, 0);
                format!("{}{target_str} = {value_str};", self.pad())
            }

            IrKind::MultipleAssignment { targets, source } => self.emit_multi_assign(targets, source),

            IrKind::IfStatement {
                cond,
                then_block,
                else_block,
            } => self.emit_if_chain(cond, then_block, else_block, false),

            IrKind::ForLoop { var, start, end, body } => {
                let start_str = self.emit_expr(start, 0);
                let end_str = self.emit_expr(end, 0);
                let header = self.dialect.for_header(var, &start_str, &end_str);
                format!(
                    "{pad}{header} {{\n{body}\n{pad}}}",
                    pad = self.pad(),
                    header = header,
                    body = self.emit_indented_block(body, false)
                )
            }

            IrKind::WhileLoop { cond, body } => {
                let cond_str = self.emit_expr(cond, 0);
                format!(
                    "{pad}while ({cond_str}) {{\n{body}\n{pad}}}",
                    pad = self.pad(),
                    body = self.emit_indented_block(body, false)
                )
            }

            IrKind::Break => format!("{}break;", self.pad()),

            IrKind::Return(None) => format!("{}return;", self.pad()),
            IrKind::Return(Some(e)) => format!("{}return {};", self.pad(), self.emit_expr(e, 0)),

            IrKind::GlobalDecl {
                name,
                init,
                is_const,
                is_static,
                ..
            } => {
                let ty = type_name(self.dialect, &init.ty().unwrap_or(TypeTag::Float));
                let init_str = self.emit_expr(init, 0);
                let storage = if *is_const {
                    "const "
                } else if *is_static {
                    "static "
                } else {
                    ""
                };
                format!("{}{storage}{ty} {name} = {init_str};", self.pad())
            }

            IrKind::FunctionDefinition {
                name,
                params,
                body,
                return_type,
                param_types,
            } => self.emit_function(name, params, body, &return_type.borrow(), &param_types.borrow()),

            _ => format!("{}{};", self.pad(), self.emit_expr(node, 0)),
        }
    }

    fn emit_indented_block(&mut self, body: &Ir, lift_tail: bool) -> String {
        self.indent += 1;
        let IrKind::Block(stmts) = &body.kind else {
            let line = self.emit_stmt(body);
            self.indent -= 1;
            return line;
        };
        let rendered = self.emit_stmts(stmts, lift_tail);
        self.indent -= 1;
        rendered
    }

    fn emit_if_chain(&mut self, cond: &Ir, then_block: &Ir, else_block: &Option<Box<Ir>>, lift: bool) -> String {
        let pad = self.pad();
        let cond_str = self.emit_expr(cond, 0);
        let mut out = format!(
            "{pad}if ({cond_str}) {{\n{body}\n{pad}}}",
            body = self.emit_indented_block(then_block, lift)
        );
        match else_block {
            None => {}
            Some(eb) => {
                if let Some(elsif) = as_elsif(eb) {
                    let IrKind::IfStatement {
                        cond: c2,
                        then_block: t2,
                        else_block: e2,
                    } = &elsif.kind
                    else {
                        unreachable!()
                    };
                    let c2_str = self.emit_expr(c2, 0);
                    out.push_str(&format!(
                        " else if ({c2_str}) {{\n{body}\n{pad}}}",
                        body = self.emit_indented_block(t2, lift)
                    ));
                    // Walk further elsif/else links iteratively by recursing
                    // on the remainder; since `out` already holds everything
                    // rendered so far, splice in the rest.
                    if let Some(rest) = e2 {
                        let tail = self.emit_else_tail(rest, lift);
                        out.push_str(&tail);
                    }
                } else {
                    out.push_str(&format!(
                        " else {{\n{body}\n{pad}}}",
                        body = self.emit_indented_block(eb, lift)
                    ));
                }
            }
        }
        out
    }

    /// Renders the `else if (...) { ... }` / `else { ... }` suffix for every
    /// link after the first, without re-emitting the leading `if`.
    fn emit_else_tail(&mut self, node: &Ir, lift: bool) -> String {
        let pad = self.pad();
        if let Some(elsif) = as_elsif(node) {
            let IrKind::IfStatement {
                cond,
                then_block,
                else_block,
            } = &elsif.kind
            else {
                unreachable!()
            };
            let cond_str = self.emit_expr(cond, 0);
            let mut out = format!(
                " else if ({cond_str}) {{\n{body}\n{pad}}}",
                body = self.emit_indented_block(then_block, lift)
            );
            if let Some(rest) = else_block {
                out.push_str(&self.emit_else_tail(rest, lift));
            }
            out
        } else {
            format!(
                " else {{\n{body}\n{pad}}}",
                body = self.emit_indented_block(node, lift)
            )
        }
    }

    fn emit_multi_assign(&mut self, targets: &[Ir], source: &Ir) -> String {
        let pad = self.pad();
        match source.ty() {
            Some(TypeTag::Tuple(ts)) => {
                let struct_name = match &source.kind {
                    IrKind::FuncCall { name, .. } => format!("{name}_result"),
                    _ => "TranspileResult".to_string(),
                };
                let src_str = self.emit_expr(source, 0);
                let mut lines = vec![format!("{pad}{struct_name} _tmp = {src_str};")];
                for (i, (target, t)) in targets.iter().zip(ts.iter()).enumerate() {
                    let ty = type_name(self.dialect, t);
                    let name = target_name(target);
                    lines.push(format!("{pad}{ty} {name} = _tmp.v{i};"));
                }
                lines.join("\n")
            }
            Some(TypeTag::Array(elem)) => {
                let src_str = self.emit_expr(source, 0);
                let ty = type_name(self.dialect, &elem);
                targets
                    .iter()
                    .enumerate()
                    .map(|(i, target)| {
                        let name = target_name(target);
                        format!("{pad}{ty} {name} = {src_str}[{i}];")
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            _ => {
                let src_str = self.emit_expr(source, 0);
                targets
                    .iter()
                    .map(|target| format!("{pad}{} = {src_str};", target_name(target)))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    fn emit_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &Ir,
        return_type: &Option<TypeTag>,
        param_types: &std::collections::HashMap<String, TypeTag>,
    ) -> String {
        let param_list = params
            .iter()
            .map(|p| {
                let ty = param_types
                    .get(p)
                    .map(|t| type_name(self.dialect, t))
                    .unwrap_or_else(|| self.dialect.scalar_name(ScalarKind::Float).to_string());
                format!("{ty} {p}")
            })
            .collect::<Vec<_>>()
            .join(", ");

        match return_type {
            Some(TypeTag::Tuple(ts)) => {
                let struct_name = format!("{name}_result");
                let fields = ts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| format!("{} v{i};", type_name(self.dialect, t)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let outer = self.tuple_struct_name.replace(struct_name.clone());
                let body_str = self.emit_indented_block(body, true);
                self.tuple_struct_name = outer;
                format!(
                    "struct {struct_name} {{ {fields} }};\n\n{struct_name} {name}({param_list}) {{\n{body_str}\n}}"
                )
            }
            Some(t) => {
                let ret_ty = type_name(self.dialect, t);
                let body_str = self.emit_indented_block(body, true);
                format!("{ret_ty} {name}({param_list}) {{\n{body_str}\n}}")
            }
            None => {
                let body_str = self.emit_indented_block(body, false);
                format!("void {name}({param_list}) {{\n{body_str}\n}}")
            }
        }
    }

    fn emit_expr(&mut self, node: &Ir, parent_prec: u8) -> String {
        match &node.kind {
            IrKind::Literal { value, .. } => self.dialect.number_literal(*value),
            IrKind::BoolLiteral(b) => self.dialect.bool_literal(*b),
            IrKind::Constant(name) => match name.as_str() {
                "PI" => self.dialect.number_literal(std::f64::consts::PI),
                "TAU" => self.dialect.number_literal(std::f64::consts::TAU),
                other => other.to_string(),
            },
            IrKind::VarRef(name) => name.clone(),

            IrKind::Parenthesized(inner) => format!("({})", self.emit_expr(inner, 0)),

            IrKind::ArrayLiteral(items) => {
                let rendered: Vec<String> = items.iter().map(|i| self.emit_expr(i, 0)).collect();
                format!("{{ {} }}", rendered.join(", "))
            }

            IrKind::ArrayIndex { array, index } => {
                format!("{}[{}]", self.emit_expr(array, 0), self.emit_expr(index, 0))
            }

            IrKind::FieldAccess { receiver, field } => {
                format!("{}.{field}", self.emit_expr(receiver, 0))
            }

            IrKind::Swizzle { receiver, components } => {
                format!("{}.{components}", self.emit_expr(receiver, 0))
            }

            IrKind::UnaryOp { op, operand } => {
                let inner = self.emit_expr(operand, 6);
                match op {
                    UnaryOp::Neg => format!("-{inner}"),
                    UnaryOp::Not => format!("!{inner}"),
                }
            }

            IrKind::BinaryOp { op, left, right } => {
                let left_ty = left.ty().unwrap_or(TypeTag::Float);
                let left_str = self.emit_expr(left, precedence(*op));
                let right_str = self.emit_expr(right, precedence(*op));
                if let Some(rendered) = self
                    .dialect
                    .vector_binary_op_call(*op, &left_ty, &left_str, &right_str)
                {
                    // A function-call spelling (`vec3_add(l, r)`) is already
                    // self-delimiting; it never needs outer parens regardless
                    // of surrounding precedence.
                    return rendered;
                }
                let infix = format!("{left_str} {} {right_str}", op.glyph());
                maybe_paren(infix, precedence(*op), parent_prec)
            }

            IrKind::FuncCall { name, receiver, args } => {
                let receiver_str = receiver.as_ref().map(|r| self.emit_expr(r, 0));
                let arg_types: Vec<TypeTag> = args.iter().map(|a| a.ty().unwrap_or(TypeTag::Float)).collect();
                let rendered_args: Vec<String> = args.iter().map(|a| self.emit_expr(a, 0)).collect();

                if name == "texture2D" || name == "texture" || name == "textureLod" {
                    if let (Some(sampler), Some(uv)) = (receiver_str.as_deref(), rendered_args.first()) {
                        return self.dialect.texture_call(sampler, uv);
                    }
                    if rendered_args.len() >= 2 {
                        return self
                            .dialect
                            .texture_call(&rendered_args[0], &rendered_args[1]);
                    }
                }

                if let Some(rank) = vector_ctor_rank(name) {
                    return self.dialect.vector_ctor(rank, &rendered_args);
                }

                if let Some(rank) = matrix_ctor_rank(name) {
                    return self.dialect.matrix_ctor(rank, &rendered_args);
                }

                self.dialect
                    .call(name, receiver_str.as_deref(), &rendered_args, &arg_types)
            }

            // Statement-shaped nodes occasionally appear where an expression
            // is expected in malformed/defensive paths; render them as
            // their statement form rather than panic.
            _ => self.emit_stmt(node),
        }
    }
}

fn vector_ctor_rank(name: &str) -> Option<u8> {
    match name {
        "vec2" => Some(2),
        "vec3" => Some(3),
        "vec4" => Some(4),
        _ => None,
    }
}

fn matrix_ctor_rank(name: &str) -> Option<u8> {
    match name {
        "mat2" => Some(2),
        "mat3" => Some(3),
        "mat4" => Some(4),
        _ => None,
    }
}

/// Wraps `rendered` in parentheses when it is a binary op of precedence
/// `this_prec` sitting inside a parent context of precedence `parent_prec`
/// and binds more loosely than that parent (`parent_prec == 0` means "no
/// parent context", e.g. a statement/tail position — never wrap there).
fn maybe_paren(rendered: String, this_prec: u8, parent_prec: u8) -> String {
    if parent_prec > 0 && this_prec < parent_prec {
        format!("({rendered})")
    } else {
        rendered
    }
}
