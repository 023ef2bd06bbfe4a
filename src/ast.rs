//! Raw syntax tree produced directly by the grammar, before lowering.
//!
//! This mirrors the grammar's productions one-to-one and carries no semantic
//! decisions (operator-vs-swizzle-vs-call disambiguation, scoping, etc.) —
//! those live in [`crate::frontend::lower`].

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// A bare expression in statement position (e.g. `foo(x)` or a trailing
    /// tail expression).
    Expr(Expr),
    /// `target = value`, where `target` names a single local/global.
    Assign { target: AssignTarget, value: Expr },
    /// `a, b, c = value`.
    MultiAssign { targets: Vec<String>, value: Expr },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        elsifs: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    Unless {
        cond: Expr,
        body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
    },
    /// `receiver.method do |var| body end`. Only `times` is a documented
    /// idiom; [`build_do_block`] rejects any other method name.
    DoBlock {
        receiver: Expr,
        var: Option<String>,
        body: Vec<Stmt>,
    },
    Def {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    Break,
    Return(Option<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Name(String),
    Global(String),
    Index(Expr, Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(String),
    Global(String),
    Paren(Box<Expr>),
    Array(Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    /// `receiver.name` with no call parens — a field/swizzle candidate.
    Member(Box<Expr>, String),
    /// `receiver.name(args)` or, with `receiver: None`, a bare `name(args)`.
    Call {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

/// Turns a parsed `lhs = value` pair into an [`Stmt::Assign`], rejecting
/// targets that aren't a name, a global, or an index expression. Lives here
/// (rather than inline in the grammar action) so the disambiguation logic is
/// ordinary, testable Rust instead of grammar-embedded code.
pub fn build_assign(lhs: Expr, value: Expr) -> Result<Stmt, crate::lexer::LexError> {
    let target = match lhs {
        Expr::Ident(name) => AssignTarget::Name(name),
        Expr::Global(name) => AssignTarget::Global(name),
        Expr::Index(base, idx) => AssignTarget::Index(*base, *idx),
        other => {
            return Err(crate::lexer::LexError {
                message: format!("`{other:?}` is not a valid assignment target"),
                pos: 0,
            });
        }
    };
    Ok(Stmt::Assign { target, value })
}

/// Only `x.times do |i| ... end` is a documented block idiom; every other
/// `receiver.method do ... end` shape is a parse-time error rather than a
/// silently-accepted extension of the surface language.
pub fn build_do_block(
    receiver: Expr,
    method: &str,
    var: Option<String>,
    body: Vec<Stmt>,
) -> Result<Stmt, crate::lexer::LexError> {
    if method != "times" {
        return Err(crate::lexer::LexError {
            message: format!("`.{method} do ... end` is not supported; only `.times do` is"),
            pos: 0,
        });
    }
    Ok(Stmt::DoBlock { receiver, var, body })
}
