//! Statement nodes.

use crate::ast::expr::Expr;
use crate::ast::decl::TypeName;
use crate::source_map::Offset;

/// A local `val`/`var` declaration inside a method body or block.
///
/// Unlike the field-level `VarDecl` (see `decl.rs`), `init` is
/// mandatory here: the source spec's grammar rejects a local
/// declaration without an initializer at parse time, so by the time
/// this node exists the initializer is guaranteed present.
#[derive(Debug)]
pub struct LocalVarStmt {
    pub name: String,
    pub type_name: TypeName,
    pub init: Expr,
    pub mutable: bool,
    pub offset: Offset,
}

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub offset: Offset,
}

impl Stmt {
    pub fn new(kind: StmtKind, offset: Offset) -> Self {
        Self { kind, offset }
    }
}

#[derive(Debug)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    For(String, Expr, Box<Stmt>),
    Return(Option<Expr>),
    Break,
    Continue,
    LocalVar(LocalVarStmt),
    ExprStmt(Expr),
}
