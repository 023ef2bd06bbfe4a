//! AST-to-IR lowering: the semantic disambiguation rules that turn a raw
//! syntax tree into the shared, typed-later IR. See the module-level rules
//! summary on each private helper below; the overall shape is a recursive
//! visitor carrying two pieces of state:
//!
//! - `params` — names that are parameters in the current scope (preamble
//!   params, uniform names, or the current function's own params). Writing
//!   to one of these is always an [`crate::ir::IrKind::Assignment`].
//! - `declared` — local names already introduced via `VarDecl` in the
//!   current scope. Grows as declarations are lowered; snapshotted and
//!   restored around branch/loop bodies so a name declared only inside one
//!   arm doesn't appear "already declared" to a later, independently-taken
//!   arm.

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::ast;
use crate::ir::{BinOp as IrBinOp, Ir, IrKind, UnaryOp as IrUnaryOp};

struct Lowerer {
    params: HashSet<String>,
    declared: HashSet<String>,
    /// Sigil-prefixed global names already introduced via `GlobalDecl`.
    globals_declared: HashSet<String>,
    /// Uppercase-initial names (other than `PI`/`TAU`) already introduced
    /// via a const `GlobalDecl`.
    constants_declared: HashSet<String>,
}

pub fn lower_program(program: &ast::Program, known_params: &[String]) -> Ir {
    let mut lowerer = Lowerer {
        params: known_params.iter().cloned().collect(),
        declared: HashSet::new(),
        globals_declared: HashSet::new(),
        constants_declared: HashSet::new(),
    };
    Ir::new(IrKind::Block(lowerer.lower_stmts(&program.stmts)))
}

fn is_upper_initial(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

impl Lowerer {
    fn with_scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.declared.clone();
        let result = f(self);
        self.declared = snapshot;
        result
    }

    fn lower_stmts(&mut self, stmts: &[ast::Stmt]) -> Vec<Ir> {
        stmts.iter().map(|s| self.lower_stmt(s)).collect()
    }

    fn lower_block(&mut self, stmts: &[ast::Stmt]) -> Ir {
        Ir::new(IrKind::Block(self.lower_stmts(stmts)))
    }

    fn lower_stmt(&mut self, stmt: &ast::Stmt) -> Ir {
        let kind = match stmt {
            ast::Stmt::Expr(e) => return self.lower_expr(e),

            ast::Stmt::Assign { target, value } => {
                let value_ir = self.lower_expr(value);
                self.lower_assign(target, value_ir)
            }

            ast::Stmt::MultiAssign { targets, value } => {
                let source = self.lower_expr(value);
                let target_irs = targets
                    .iter()
                    .map(|name| {
                        if !(self.params.contains(name) || self.declared.contains(name)) {
                            self.declared.insert(name.clone());
                        }
                        Ir::new(IrKind::VarRef(name.clone()))
                    })
                    .collect();
                IrKind::MultipleAssignment {
                    targets: target_irs,
                    source: Box::new(source),
                }
            }

            ast::Stmt::If {
                cond,
                then_body,
                elsifs,
                else_body,
            } => {
                let cond_ir = self.lower_expr(cond);
                let then_ir = self.with_scoped(|s| s.lower_block(then_body));
                let else_ir = self.lower_elsif_chain(elsifs, else_body);
                IrKind::IfStatement {
                    cond: Box::new(cond_ir),
                    then_block: Box::new(then_ir),
                    else_block: else_ir.map(Box::new),
                }
            }

            // `unless cond ... end` is `if !cond ... end`.
            ast::Stmt::Unless { cond, body } => {
                let cond_ir = self.lower_expr(cond);
                let negated = Ir::new(IrKind::UnaryOp {
                    op: IrUnaryOp::Not,
                    operand: Box::new(cond_ir),
                });
                let then_ir = self.with_scoped(|s| s.lower_block(body));
                IrKind::IfStatement {
                    cond: Box::new(negated),
                    then_block: Box::new(then_ir),
                    else_block: None,
                }
            }

            ast::Stmt::While { cond, body } => {
                let cond_ir = self.lower_expr(cond);
                let body_ir = self.with_scoped(|s| s.lower_block(body));
                IrKind::WhileLoop {
                    cond: Box::new(cond_ir),
                    body: Box::new(body_ir),
                }
            }

            ast::Stmt::For {
                var,
                start,
                end,
                body,
            } => {
                let start_ir = self.lower_expr(start);
                let end_ir = self.lower_expr(end);
                let body_ir = self.with_scoped(|s| {
                    s.declared.insert(var.clone());
                    s.lower_block(body)
                });
                IrKind::ForLoop {
                    var: var.clone(),
                    start: Box::new(start_ir),
                    end: Box::new(end_ir),
                    body: Box::new(body_ir),
                }
            }

            // Only `.times do |i| ... end` reaches lowering; `ast::build_do_block`
            // already rejected every other method name at parse time.
            ast::Stmt::DoBlock { receiver, var, body } => {
                let receiver_ir = self.lower_expr(receiver);
                let loop_var = var.clone().unwrap_or_else(|| "_i".to_string());
                let body_ir = self.with_scoped(|s| {
                    s.declared.insert(loop_var.clone());
                    s.lower_block(body)
                });
                IrKind::ForLoop {
                    var: loop_var,
                    start: Box::new(Ir::new(IrKind::Literal {
                        value: 0.0,
                        is_int: true,
                    })),
                    end: Box::new(receiver_ir),
                    body: Box::new(body_ir),
                }
            }

            ast::Stmt::Def { name, params, body } => {
                let outer_params = std::mem::replace(
                    &mut self.params,
                    params.iter().cloned().collect(),
                );
                let outer_declared = std::mem::take(&mut self.declared);
                let body_ir = self.lower_block(body);
                self.params = outer_params;
                self.declared = outer_declared;
                IrKind::FunctionDefinition {
                    name: name.clone(),
                    params: params.clone(),
                    body: Box::new(body_ir),
                    return_type: RefCell::new(None),
                    param_types: RefCell::new(HashMap::new()),
                }
            }

            ast::Stmt::Break => IrKind::Break,

            ast::Stmt::Return(e) => IrKind::Return(e.as_ref().map(|e| Box::new(self.lower_expr(e)))),
        };
        Ir::new(kind)
    }

    fn lower_elsif_chain(
        &mut self,
        elsifs: &[(ast::Expr, Vec<ast::Stmt>)],
        else_body: &Option<Vec<ast::Stmt>>,
    ) -> Option<Ir> {
        if let Some(((cond, body), rest)) = elsifs.split_first() {
            let cond_ir = self.lower_expr(cond);
            let then_ir = self.with_scoped(|s| s.lower_block(body));
            let else_ir = self.lower_elsif_chain(rest, else_body);
            Some(Ir::new(IrKind::IfStatement {
                cond: Box::new(cond_ir),
                then_block: Box::new(then_ir),
                else_block: else_ir.map(Box::new),
            }))
        } else {
            else_body
                .as_ref()
                .map(|body| self.with_scoped(|s| s.lower_block(body)))
        }
    }

    /// Name-is-declaration-or-assignment: a write to a name already known as
    /// a parameter or a declared local is an `Assignment`; otherwise it's a
    /// fresh `VarDecl` and the name is added to the declared set. Uppercase
    /// names and sigil-prefixed globals go through their own, non-lexically
    /// scoped declared-sets instead, since they're not locals.
    fn lower_assign(&mut self, target: &ast::AssignTarget, value: Ir) -> IrKind {
        match target {
            ast::AssignTarget::Name(name) if is_upper_initial(name) => {
                self.assign_tracked(GlobalKind::Constant, name.clone(), value)
            }
            ast::AssignTarget::Name(name) => {
                if self.params.contains(name) || self.declared.contains(name) {
                    IrKind::Assignment {
                        target: Box::new(Ir::new(IrKind::VarRef(name.clone()))),
                        value: Box::new(value),
                    }
                } else {
                    self.declared.insert(name.clone());
                    IrKind::VarDecl {
                        name: name.clone(),
                        init: Box::new(value),
                    }
                }
            }
            ast::AssignTarget::Global(name) => {
                self.assign_tracked(GlobalKind::Global, format!("${name}"), value)
            }
            ast::AssignTarget::Index(array, index) => {
                let array_ir = self.lower_expr(array);
                let index_ir = self.lower_expr(index);
                IrKind::Assignment {
                    target: Box::new(Ir::new(IrKind::ArrayIndex {
                        array: Box::new(array_ir),
                        index: Box::new(index_ir),
                    })),
                    value: Box::new(value),
                }
            }
        }
    }

    fn assign_tracked(&mut self, kind: GlobalKind, name: String, value: Ir) -> IrKind {
        let declared_set = match kind {
            GlobalKind::Global => &mut self.globals_declared,
            GlobalKind::Constant => &mut self.constants_declared,
        };
        if declared_set.contains(&name) {
            IrKind::Assignment {
                target: Box::new(Ir::new(IrKind::VarRef(name))),
                value: Box::new(value),
            }
        } else {
            declared_set.insert(name.clone());
            IrKind::GlobalDecl {
                name,
                init: Box::new(value),
                is_const: matches!(kind, GlobalKind::Constant),
                is_static: true,
                array_size: RefCell::new(None),
                element_type: RefCell::new(None),
            }
        }
    }

    fn lower_expr(&mut self, expr: &ast::Expr) -> Ir {
        let kind = match expr {
            // Every integer literal is promoted to float at lowering time,
            // loop bounds and array indices included. `is_int` only records
            // the surface spelling.
            ast::Expr::Int(i) => IrKind::Literal {
                value: *i as f64,
                is_int: true,
            },
            ast::Expr::Float(f) => IrKind::Literal {
                value: *f,
                is_int: false,
            },
            ast::Expr::Bool(b) => IrKind::BoolLiteral(*b),

            ast::Expr::Ident(name) if name == "PI" || name == "TAU" => {
                IrKind::Constant(name.clone())
            }
            ast::Expr::Ident(name) => IrKind::VarRef(name.clone()),
            ast::Expr::Global(name) => IrKind::VarRef(format!("${name}")),

            ast::Expr::Paren(inner) => IrKind::Parenthesized(Box::new(self.lower_expr(inner))),
            ast::Expr::Array(items) => {
                IrKind::ArrayLiteral(items.iter().map(|e| self.lower_expr(e)).collect())
            }
            ast::Expr::Index(arr, idx) => IrKind::ArrayIndex {
                array: Box::new(self.lower_expr(arr)),
                index: Box::new(self.lower_expr(idx)),
            },

            ast::Expr::Member(receiver, name) => {
                let receiver_ir = Box::new(self.lower_expr(receiver));
                match crate::builtins::classify_field(name) {
                    Some(crate::builtins::SwizzleShape::Swizzle(_)) => IrKind::Swizzle {
                        receiver: receiver_ir,
                        components: name.clone(),
                    },
                    _ => IrKind::FieldAccess {
                        receiver: receiver_ir,
                        field: name.clone(),
                    },
                }
            }

            ast::Expr::Call { receiver, name, args } => IrKind::FuncCall {
                name: name.clone(),
                receiver: receiver.as_ref().map(|r| Box::new(self.lower_expr(r))),
                args: args.iter().map(|a| self.lower_expr(a)).collect(),
            },

            ast::Expr::Unary(op, e) => IrKind::UnaryOp {
                op: IrUnaryOp::from(*op),
                operand: Box::new(self.lower_expr(e)),
            },

            ast::Expr::Binary(op, l, r) => IrKind::BinaryOp {
                op: IrBinOp::from(*op),
                left: Box::new(self.lower_expr(l)),
                right: Box::new(self.lower_expr(r)),
            },
        };
        Ir::new(kind)
    }
}

#[derive(Clone, Copy)]
enum GlobalKind {
    Global,
    Constant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_ast;

    fn lower(src: &str) -> Ir {
        let (program, params) = parse_ast(src).unwrap();
        lower_program(&program, &params)
    }

    fn block_stmts(ir: &Ir) -> &[Ir] {
        match &ir.kind {
            IrKind::Block(stmts) => stmts,
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn first_write_is_decl_second_is_assignment() {
        let ir = lower("x = 1.0\nx = 2.0");
        let stmts = block_stmts(&ir);
        assert!(matches!(stmts[0].kind, IrKind::VarDecl { .. }));
        assert!(matches!(stmts[1].kind, IrKind::Assignment { .. }));
    }

    #[test]
    fn branch_locals_do_not_leak_across_arms() {
        let ir = lower("if true then y = 1.0 else y = 2.0 end\ny = 3.0");
        let stmts = block_stmts(&ir);
        let IrKind::IfStatement { then_block, else_block, .. } = &stmts[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(
            block_stmts(then_block)[0].kind,
            IrKind::VarDecl { .. }
        ));
        let else_ir = else_block.as_ref().unwrap();
        assert!(matches!(
            block_stmts(else_ir)[0].kind,
            IrKind::VarDecl { .. }
        ));
        // After the whole if, y is still undeclared at the outer scope, so
        // the trailing write is a fresh VarDecl too.
        assert!(matches!(stmts[1].kind, IrKind::VarDecl { .. }));
    }

    #[test]
    fn elsif_chain_lowers_to_nested_if() {
        let ir = lower("if a then x = 1.0 elsif b then x = 2.0 else x = 3.0 end");
        let stmts = block_stmts(&ir);
        let IrKind::IfStatement { else_block, .. } = &stmts[0].kind else {
            panic!("expected if");
        };
        let nested = else_block.as_ref().unwrap();
        assert!(matches!(nested.kind, IrKind::IfStatement { .. }));
    }

    #[test]
    fn unless_lowers_to_negated_if() {
        let ir = lower("unless ready then x = 1.0 end");
        let stmts = block_stmts(&ir);
        let IrKind::IfStatement { cond, else_block, .. } = &stmts[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(cond.kind, IrKind::UnaryOp { op: IrUnaryOp::Not, .. }));
        assert!(else_block.is_none());
    }

    #[test]
    fn times_block_lowers_to_for_loop() {
        let ir = lower("n.times do |i| x = i end");
        let stmts = block_stmts(&ir);
        assert!(matches!(stmts[0].kind, IrKind::ForLoop { .. }));
    }

    #[test]
    fn swizzle_vs_field_access() {
        let ir = lower("a = v.xy\nb = v.x\nc = u.resolution");
        let stmts = block_stmts(&ir);
        let IrKind::VarDecl { init, .. } = &stmts[0].kind else { panic!() };
        assert!(matches!(init.kind, IrKind::Swizzle { .. }));
        let IrKind::VarDecl { init, .. } = &stmts[1].kind else { panic!() };
        assert!(matches!(init.kind, IrKind::FieldAccess { .. }));
        let IrKind::VarDecl { init, .. } = &stmts[2].kind else { panic!() };
        assert!(matches!(init.kind, IrKind::FieldAccess { .. }));
    }

    #[test]
    fn global_sigil_first_write_is_decl() {
        let ir = lower("$speed = 1.0\n$speed = 2.0");
        let stmts = block_stmts(&ir);
        assert!(matches!(stmts[0].kind, IrKind::GlobalDecl { .. }));
        assert!(matches!(stmts[1].kind, IrKind::Assignment { .. }));
    }

    #[test]
    fn uppercase_write_is_const_global() {
        let ir = lower("MAX = 10.0");
        let stmts = block_stmts(&ir);
        let IrKind::GlobalDecl { is_const, is_static, .. } = &stmts[0].kind else {
            panic!("expected global decl")
        };
        assert!(*is_const);
        assert!(*is_static);
    }

    #[test]
    fn pi_and_tau_are_constants() {
        let ir = lower("x = PI * TAU");
        let stmts = block_stmts(&ir);
        let IrKind::VarDecl { init, .. } = &stmts[0].kind else { panic!() };
        let IrKind::BinaryOp { left, right, .. } = &init.kind else { panic!() };
        assert!(matches!(left.kind, IrKind::Constant(_)));
        assert!(matches!(right.kind, IrKind::Constant(_)));
    }
}
