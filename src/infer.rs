//! One bottom-up pass that fills in every IR node's `type` slot.
//!
//! The pass keeps a single flat symbol table (no lexical scoping — the
//! Frontend already resolved name shadowing during lowering) seeded with the
//! configured uniforms plus the two well-known parameter names every inline
//! fragment is invoked with. Running it twice on the same tree is a no-op:
//! nothing but `node.ty()` slots and the symbol table change, and both are
//! rebuilt from scratch on each call.

use std::collections::HashMap;

use crate::ir::{Ir, IrKind, TypeTag};

/// A user-declared helper function's signature, supplied by the host (the
/// `transpile_helpers` entry point) to augment the built-in registry.
#[derive(Clone, Debug)]
pub struct CustomFunctionSig {
    pub returns: CustomReturn,
    pub params: Option<Vec<TypeTag>>,
}

#[derive(Clone, Debug)]
pub enum CustomReturn {
    Single(TypeTag),
    Tuple(Vec<TypeTag>),
}

struct Inferer<'a> {
    symbols: HashMap<String, TypeTag>,
    uniforms: &'a HashMap<String, TypeTag>,
    customs: &'a HashMap<String, CustomFunctionSig>,
}

/// Runs inference over `ir` in place, seeding the symbol table with
/// `uniforms` (also consulted for `FieldAccess` field lookups) and
/// `customs` (consulted after the built-in registry for `FuncCall`s).
pub fn infer(ir: &Ir, uniforms: &HashMap<String, TypeTag>, customs: &HashMap<String, CustomFunctionSig>) {
    let mut symbols = uniforms.clone();
    symbols.insert("frag_coord".to_string(), TypeTag::Vec2);
    symbols.insert("resolution".to_string(), TypeTag::Vec2);
    let mut inferer = Inferer {
        symbols,
        uniforms,
        customs,
    };
    inferer.infer_node(ir);
}

impl Inferer<'_> {
    fn infer_block(&mut self, stmts: &[Ir]) -> Option<TypeTag> {
        let mut last = None;
        for stmt in stmts {
            last = self.infer_node(stmt);
        }
        last
    }

    /// Returns the node's resolved type (and leaves it recorded in the
    /// node's own slot) — `None` only for purely statement-shaped nodes that
    /// carry no meaningful type (`Break`, loops, an empty `Return`).
    fn infer_node(&mut self, node: &Ir) -> Option<TypeTag> {
        let ty = match &node.kind {
            IrKind::Block(stmts) => self.infer_block(stmts),

            IrKind::Literal { .. } => Some(TypeTag::Float),
            IrKind::BoolLiteral(_) => Some(TypeTag::Bool),
            IrKind::Constant(_) => Some(TypeTag::Float),

            IrKind::VarRef(name) => Some(self.symbols.get(name).cloned().unwrap_or(TypeTag::Float)),

            IrKind::VarDecl { name, init } => {
                let t = self.infer_node(init).unwrap_or(TypeTag::Float);
                self.symbols.insert(name.clone(), t.clone());
                Some(t)
            }

            IrKind::Assignment { target, value } => {
                let t = self.infer_node(value).unwrap_or(TypeTag::Float);
                if let IrKind::VarRef(name) = &target.kind {
                    self.symbols.insert(name.clone(), t.clone());
                    target.set_ty(t.clone());
                } else {
                    self.infer_node(target);
                }
                Some(t)
            }

            IrKind::MultipleAssignment { targets, source } => {
                let source_ty = self.infer_node(source).unwrap_or(TypeTag::Float);
                let component_types: Vec<TypeTag> = match &source_ty {
                    TypeTag::Tuple(ts) => ts.clone(),
                    TypeTag::Array(elem) => vec![(**elem).clone(); targets.len()],
                    _ => vec![TypeTag::Float; targets.len()],
                };
                for (i, target) in targets.iter().enumerate() {
                    let t = component_types.get(i).cloned().unwrap_or(TypeTag::Float);
                    if let IrKind::VarRef(name) = &target.kind {
                        self.symbols.insert(name.clone(), t.clone());
                    }
                    target.set_ty(t);
                }
                None
            }

            IrKind::BinaryOp { op, left, right } => {
                let lt = self.infer_node(left).unwrap_or(TypeTag::Float);
                let rt = self.infer_node(right).unwrap_or(TypeTag::Float);
                Some(crate::builtins::binary_result_type(*op, &lt, &rt))
            }

            IrKind::UnaryOp { op, operand } => {
                let t = self.infer_node(operand).unwrap_or(TypeTag::Float);
                Some(match op {
                    crate::ir::UnaryOp::Neg => t,
                    crate::ir::UnaryOp::Not => TypeTag::Bool,
                })
            }

            IrKind::FuncCall { name, receiver, args } => {
                let recv_ty = receiver.as_ref().and_then(|r| self.infer_node(r));
                let arg_types: Vec<TypeTag> = args
                    .iter()
                    .map(|a| self.infer_node(a).unwrap_or(TypeTag::Float))
                    .collect();
                let t = if let Some(sig) = crate::builtins::lookup(name) {
                    sig.returns.resolve(&arg_types)
                } else if let Some(custom) = self.customs.get(name) {
                    match &custom.returns {
                        CustomReturn::Single(t) => t.clone(),
                        CustomReturn::Tuple(ts) => TypeTag::Tuple(ts.clone()),
                    }
                } else if let Some(rt) = recv_ty {
                    rt
                } else {
                    TypeTag::Float
                };
                Some(t)
            }

            IrKind::FieldAccess { receiver, field } => {
                self.infer_node(receiver);
                let t = if field.chars().count() == 1 {
                    TypeTag::Float
                } else {
                    self.uniforms.get(field).cloned().unwrap_or(TypeTag::Float)
                };
                Some(t)
            }

            IrKind::Swizzle { receiver, components } => {
                self.infer_node(receiver);
                Some(match components.chars().count() {
                    2 => TypeTag::Vec2,
                    3 => TypeTag::Vec3,
                    4 => TypeTag::Vec4,
                    _ => TypeTag::Float,
                })
            }

            IrKind::Parenthesized(inner) => self.infer_node(inner),

            IrKind::IfStatement {
                cond,
                then_block,
                else_block,
            } => {
                self.infer_node(cond);
                let t = self.infer_node(then_block);
                if let Some(else_ir) = else_block {
                    self.infer_node(else_ir);
                }
                t
            }

            IrKind::ForLoop { var, start, end, body } => {
                self.infer_node(start);
                self.infer_node(end);
                // Invariant: the loop variable is `int` inside the body,
                // independent of the (always-float, per the global literal
                // promotion decision) type of `start`/`end` themselves.
                self.symbols.insert(var.clone(), TypeTag::Int);
                self.infer_node(body);
                None
            }

            IrKind::WhileLoop { cond, body } => {
                self.infer_node(cond);
                self.infer_node(body);
                None
            }

            IrKind::Break => None,

            IrKind::Return(inner) => inner.as_ref().and_then(|e| self.infer_node(e)),

            IrKind::ArrayLiteral(items) => {
                let mut elem = None;
                for item in items {
                    let t = self.infer_node(item);
                    if elem.is_none() {
                        elem = t;
                    }
                }
                Some(TypeTag::array_of(elem.unwrap_or(TypeTag::Float)))
            }

            IrKind::ArrayIndex { array, index } => {
                let array_ty = self.infer_node(array);
                self.infer_node(index);
                Some(
                    array_ty
                        .and_then(|t| t.elem_type().cloned())
                        .unwrap_or(TypeTag::Float),
                )
            }

            IrKind::GlobalDecl {
                name,
                init,
                array_size,
                element_type,
                ..
            } => {
                let t = self.infer_node(init).unwrap_or(TypeTag::Float);
                self.symbols.insert(name.clone(), t.clone());
                if let TypeTag::Array(elem) = &t {
                    if element_type.borrow().is_none() {
                        *element_type.borrow_mut() = Some((**elem).clone());
                    }
                    if array_size.borrow().is_none() {
                        if let IrKind::ArrayLiteral(items) = &init.kind {
                            *array_size.borrow_mut() = Some(items.len());
                        }
                    }
                }
                Some(t)
            }

            IrKind::FunctionDefinition {
                params,
                body,
                return_type,
                param_types,
                ..
            } => {
                for param in params {
                    let t = param_types
                        .borrow()
                        .get(param)
                        .cloned()
                        .unwrap_or(TypeTag::Float);
                    param_types.borrow_mut().insert(param.clone(), t.clone());
                    self.symbols.insert(param.clone(), t);
                }
                let body_ty = self.infer_node(body);
                if return_type.borrow().is_none() {
                    *return_type.borrow_mut() = Some(body_ty.unwrap_or(TypeTag::Float));
                }
                None
            }
        };
        if let Some(t) = &ty {
            node.set_ty(t.clone());
        }
        ty
    }
}
