//! The shared intermediate representation. The Frontend builds it, Type
//! Inference fills in `type` slots, and the emitters read it back out —
//! nothing else touches it, which is why every node holds its children by
//! exclusive `Box` ownership.
//!
//! A node's `type` slot lives in a [`RefCell`] rather than a plain field so
//! that inference can write through a shared `&Ir` reference instead of
//! rebuilding the tree node-by-node.

use std::cell::RefCell;
use std::collections::HashMap;

/// The closed set of types every IR node may carry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
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
    Array(Box<TypeTag>),
    Tuple(Vec<TypeTag>),
}

impl TypeTag {
    pub fn array_of(elem: TypeTag) -> TypeTag {
        TypeTag::Array(Box::new(elem))
    }

    pub fn elem_type(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

/// A fully-owned IR node: its semantic shape plus a mutable type slot.
#[derive(Debug)]
pub struct Ir {
    pub kind: IrKind,
    ty: RefCell<Option<TypeTag>>,
}

impl Ir {
    pub fn new(kind: IrKind) -> Ir {
        Ir {
            kind,
            ty: RefCell::new(None),
        }
    }

    pub fn with_type(kind: IrKind, ty: TypeTag) -> Ir {
        Ir {
            kind,
            ty: RefCell::new(Some(ty)),
        }
    }

    pub fn ty(&self) -> Option<TypeTag> {
        self.ty.borrow().clone()
    }

    pub fn set_ty(&self, ty: TypeTag) {
        *self.ty.borrow_mut() = Some(ty);
    }

    pub fn boxed(kind: IrKind) -> Box<Ir> {
        Box::new(Ir::new(kind))
    }
}

#[derive(Debug)]
pub enum IrKind {
    Block(Vec<Ir>),

    /// `is_int` distinguishes an as-written integer literal from one already
    /// promoted to float during lowering; emitters format accordingly (loop
    /// bounds, array indices).
    Literal { value: f64, is_int: bool },

    BoolLiteral(bool),

    VarRef(String),

    VarDecl {
        name: String,
        init: Box<Ir>,
    },

    /// `target` is a `VarRef` or `ArrayIndex` node.
    Assignment {
        target: Box<Ir>,
        value: Box<Ir>,
    },

    /// `targets` are ordered `VarRef` nodes; `source` is tuple- or
    /// array-typed once inferred.
    MultipleAssignment {
        targets: Vec<Ir>,
        source: Box<Ir>,
    },

    BinaryOp {
        op: BinOp,
        left: Box<Ir>,
        right: Box<Ir>,
    },

    UnaryOp {
        op: UnaryOp,
        operand: Box<Ir>,
    },

    FuncCall {
        name: String,
        receiver: Option<Box<Ir>>,
        args: Vec<Ir>,
    },

    /// A receiver plus a single-component field name (not a multi-letter
    /// swizzle — see [`IrKind::Swizzle`]).
    FieldAccess {
        receiver: Box<Ir>,
        field: String,
    },

    /// A receiver plus a 2-4 letter component string drawn from the swizzle
    /// alphabet.
    Swizzle {
        receiver: Box<Ir>,
        components: String,
    },

    Parenthesized(Box<Ir>),

    /// `else_block` may itself be an `IfStatement` (elsif chain) or a
    /// `Block` wrapping one.
    IfStatement {
        cond: Box<Ir>,
        then_block: Box<Ir>,
        else_block: Option<Box<Ir>>,
    },

    /// The index variable is `int`-typed inside `body` and does not escape
    /// it for declaration purposes.
    ForLoop {
        var: String,
        start: Box<Ir>,
        end: Box<Ir>,
        body: Box<Ir>,
    },

    WhileLoop {
        cond: Box<Ir>,
        body: Box<Ir>,
    },

    Break,

    Return(Option<Box<Ir>>),

    /// A symbolic constant such as `PI`/`TAU`.
    Constant(String),

    ArrayLiteral(Vec<Ir>),

    ArrayIndex {
        array: Box<Ir>,
        index: Box<Ir>,
    },

    GlobalDecl {
        name: String,
        init: Box<Ir>,
        is_const: bool,
        is_static: bool,
        array_size: RefCell<Option<usize>>,
        element_type: RefCell<Option<TypeTag>>,
    },

    /// `return_type`/`param_types` start empty and are filled in either by a
    /// user-supplied signature map (the helpers entry point) or by Type
    /// Inference.
    FunctionDefinition {
        name: String,
        params: Vec<String>,
        body: Box<Ir>,
        return_type: RefCell<Option<TypeTag>>,
        param_types: RefCell<HashMap<String, TypeTag>>,
    },
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

impl BinOp {
    pub fn glyph(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl From<crate::ast::BinOp> for BinOp {
    fn from(op: crate::ast::BinOp) -> BinOp {
        match op {
            crate::ast::BinOp::Add => BinOp::Add,
            crate::ast::BinOp::Sub => BinOp::Sub,
            crate::ast::BinOp::Mul => BinOp::Mul,
            crate::ast::BinOp::Div => BinOp::Div,
            crate::ast::BinOp::Mod => BinOp::Mod,
            crate::ast::BinOp::Eq => BinOp::Eq,
            crate::ast::BinOp::Ne => BinOp::Ne,
            crate::ast::BinOp::Lt => BinOp::Lt,
            crate::ast::BinOp::Gt => BinOp::Gt,
            crate::ast::BinOp::Le => BinOp::Le,
            crate::ast::BinOp::Ge => BinOp::Ge,
            crate::ast::BinOp::And => BinOp::And,
            crate::ast::BinOp::Or => BinOp::Or,
        }
    }
}

impl From<crate::ast::UnaryOp> for UnaryOp {
    fn from(op: crate::ast::UnaryOp) -> UnaryOp {
        match op {
            crate::ast::UnaryOp::Neg => UnaryOp::Neg,
            crate::ast::UnaryOp::Not => UnaryOp::Not,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_slot_starts_empty_and_is_writable_through_shared_ref() {
        let node = Ir::new(IrKind::Literal { value: 1.0, is_int: true });
        assert_eq!(node.ty(), None);
        node.set_ty(TypeTag::Float);
        assert_eq!(node.ty(), Some(TypeTag::Float));
    }

    #[test]
    fn array_elem_type_roundtrips() {
        let t = TypeTag::array_of(TypeTag::Vec3);
        assert_eq!(t.elem_type(), Some(&TypeTag::Vec3));
        assert_eq!(TypeTag::Float.elem_type(), None);
    }
}
