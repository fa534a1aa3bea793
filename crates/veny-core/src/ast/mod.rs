//! The program tree: a closed sum-type AST produced by the parser and
//! consumed, in place, by the import resolver and semantic analyzer.
//!
//! The original subclass/visitor-dispatch design collapses here to
//! plain enums matched by `match`; there is no `accept(visitor)` — a
//! visitor is just a function (or a trait with one method per node
//! family) that matches on `ExprKind`/`StmtKind` directly.

pub mod decl;
pub mod expr;
pub mod stmt;

use std::rc::Rc;

pub use decl::{ClassDecl, InterfaceDecl, MethodDecl, Param, TypeName, VarDecl, Visibility};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use stmt::{LocalVarStmt, Stmt, StmtKind};

/// One parsed source file.
#[derive(Debug)]
pub struct File {
    pub package: String,
    /// Raw `package.Type`-shaped qualified names as written after
    /// `import`; the resolver is responsible for splitting and
    /// validating their shape.
    pub imports: Vec<String>,
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    /// Path this file was read from, used by the resolver's AST cache
    /// and by diagnostics. `None` for files constructed purely in
    /// tests.
    pub path: Option<String>,
}

impl File {
    /// All top-level type names declared in this file, for the
    /// "no two top-level types share an FQCN" invariant.
    pub fn declared_type_names(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.interfaces.iter().map(|i| i.name.as_str()))
    }
}

/// The merged compilation: every file the driver loaded plus every
/// file the import resolver pulled in transitively.
///
/// Files are `Rc`-shared with the resolver's `AstCache`, which is the
/// thing that actually owns the parse — a `Program` is just a
/// convenient ordered view over it for the analyzer to walk.
#[derive(Debug, Default)]
pub struct Program {
    pub files: Vec<Rc<File>>,
}

impl Program {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }
}
