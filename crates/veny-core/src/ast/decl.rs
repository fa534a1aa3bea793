//! Declaration nodes: classes, interfaces, fields, methods, parameters.

use crate::ast::stmt::Stmt;
use crate::ast::expr::Expr;
use crate::source_map::Offset;

/// A type reference as written in source, before the analyzer
/// resolves it against the symbol table. `[Int]` parses to
/// `Array(Named("Int"))`; a bare `void` return annotation (or an
/// omitted one) parses to `Void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Named(String),
    Array(Box<TypeName>),
    Void,
}

impl TypeName {
    pub fn named(name: impl Into<String>) -> Self {
        TypeName::Named(name.into())
    }

    pub fn display(&self) -> String {
        match self {
            TypeName::Named(n) => n.clone(),
            TypeName::Array(inner) => format!("[{}]", inner.display()),
            TypeName::Void => "void".to_string(),
        }
    }
}

/// Field/class visibility. Interfaces have no visibility of their
/// own; methods default to `Public`, fields default to `Private`
/// when no `pub`/`pri` modifier is written (see the parser's member
/// production).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A variable declaration. Used both for class fields (where `init`
/// is optional) and, after promotion by the parser, is mirrored by
/// `LocalVarStmt` for method-local declarations (where it is not).
#[derive(Debug)]
pub struct VarDecl {
    pub name: String,
    pub type_name: TypeName,
    pub init: Option<Expr>,
    pub mutable: bool,
    pub visibility: Visibility,
    pub offset: Offset,
}

#[derive(Debug)]
pub struct Param {
    pub name: String,
    pub type_name: TypeName,
    pub offset: Offset,
}

#[derive(Debug)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeName,
    /// `None` for interface method signatures, which declare shape
    /// only. Always `Some(Stmt::Block(..))` for a class method.
    pub body: Option<Stmt>,
    pub visibility: Visibility,
    pub offset: Offset,
}

impl MethodDecl {
    pub fn is_entry(&self) -> bool {
        self.name == "entry"
    }
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub offset: Offset,
}

#[derive(Debug)]
pub struct InterfaceDecl {
    pub name: String,
    pub parents: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub offset: Offset,
}
