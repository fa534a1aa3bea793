//! Expression nodes.
//!
//! Every expression carries a mutable `resolved_type` slot, populated
//! by the semantic analyzer (`analyzer.rs`). It starts empty and, per
//! the data-model invariant in the source spec, is non-`None` for
//! every expression once analysis completes (possibly `Type::Error`).

use std::cell::RefCell;
use std::rc::Rc;

use crate::source_map::Offset;
use crate::token::Literal;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Arithmetic operators require `Int` operands and produce `Int`.
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
    }

    /// Comparison operators accept matching operand types and produce `Bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// An expression node: a tagged-variant payload plus its source
/// position and the analyzer's back-reference to its resolved type.
///
/// `Clone` exists for the parser's compound-assignment desugaring
/// (`x += 1` needs a second read of `x`'s target expression), not for
/// use after analysis — cloning duplicates the `resolved_type` cell's
/// current value rather than sharing it.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub offset: Offset,
    resolved_type: RefCell<Option<Rc<Type>>>,
}

impl Expr {
    pub fn new(kind: ExprKind, offset: Offset) -> Self {
        Self {
            kind,
            offset,
            resolved_type: RefCell::new(None),
        }
    }

    pub fn resolved_type(&self) -> Option<Rc<Type>> {
        self.resolved_type.borrow().clone()
    }

    pub fn set_resolved_type(&self, ty: Rc<Type>) {
        *self.resolved_type.borrow_mut() = Some(ty);
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    /// `name = value`. Field assignment through a receiver is `Set`,
    /// not this variant — see the parser's `finish_assignment`.
    Assign(String, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    New(String, Vec<Expr>),
    Get(Box<Expr>, String),
    Set(Box<Expr>, String, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    ArrayLiteral(Vec<Expr>),
}
