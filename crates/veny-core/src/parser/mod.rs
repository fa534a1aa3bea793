//! Recursive-descent parser: tokens to a [`File`].
//!
//! Grammar rules are gated on where we are in the source, not just on
//! lookahead: a `val`/`var` requires an initializer inside a method or
//! block but not as a class field, and only `class`/`interface` bodies
//! accept member declarations at all. `ScopeKind` tracks that context
//! as an explicit stack rather than threading a parameter through
//! every production.

mod error;

pub use error::ParseError;

use crate::ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, File, InterfaceDecl, LocalVarStmt, MethodDecl, Param, Stmt, StmtKind,
    TypeName, UnaryOp, VarDecl, Visibility,
};
use crate::source_map::{FilePosMap, Offset, Position};
use crate::token::{Token, TokenKind};

/// Where in the grammar we currently are. Pushed on entering a class
/// body, a method body, or a block; popped on leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Global,
    Class,
    Method,
    Block,
}

/// One `var`/`val` production, before the caller decides whether it's
/// a field (visibility, optional init) or a local (mandatory init, no
/// visibility of its own).
struct ParsedVarDecl {
    name: String,
    type_name: TypeName,
    init: Option<Expr>,
    mutable: bool,
    offset: Offset,
}

/// Which compound-assignment operator, if any, was matched — used to
/// desugar `x op= y` into `x = x op y` at the point of use.
enum AssignOp {
    Plain,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    fn as_binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Plain => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file_map: &'a FilePosMap,
    scope_stack: Vec<ScopeKind>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, file_map: &'a FilePosMap) -> Self {
        Self {
            tokens,
            pos: 0,
            file_map,
            scope_stack: Vec::new(),
        }
    }

    // ---- token-stream primitives ----------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("expected {:?}, found {:?}", kind, self.peek().kind)))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error(&format!("expected an identifier, found {:?}", self.peek().kind)))
        }
    }

    fn position_at(&self, offset: Offset) -> Position {
        self.file_map.position_for(offset, false).unwrap_or(Position {
            file_name: self.file_map.name().to_string(),
            line: 0,
            column: 0,
        })
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::new(self.position_at(self.peek().offset), message.to_string())
    }

    fn error_at(&self, offset: Offset, message: &str) -> ParseError {
        ParseError::new(self.position_at(offset), message.to_string())
    }

    // ---- scope-kind stack -------------------------------------------

    fn current_scope_kind(&self) -> ScopeKind {
        self.scope_stack.last().copied().unwrap_or(ScopeKind::Global)
    }

    /// Pushes `kind`, runs `f`, and pops it again — on every exit path,
    /// including an early `?` return from inside `f`.
    fn with_scope<T>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        self.scope_stack.push(kind);
        let result = f(self);
        self.scope_stack.pop();
        result
    }

    // ---- top level ----------------------------------------------------

    pub fn parse(mut self) -> Result<File, ParseError> {
        self.scope_stack.push(ScopeKind::Global);

        let package = self.parse_package_decl()?;

        let mut imports = Vec::new();
        while self.check(TokenKind::Import) {
            self.advance();
            imports.push(self.parse_qualified_name()?);
        }

        let mut classes = Vec::new();
        let mut interfaces = Vec::new();
        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::Class) {
                classes.push(self.parse_class()?);
            } else if self.check(TokenKind::Interface) {
                interfaces.push(self.parse_interface()?);
            } else {
                return Err(self.error("expected a class or interface declaration"));
            }
        }
        self.expect(TokenKind::Eof)?;
        self.scope_stack.pop();

        self.check_unique_top_level_names(&classes, &interfaces)?;

        Ok(File {
            package,
            imports,
            classes,
            interfaces,
            path: None,
        })
    }

    fn parse_package_decl(&mut self) -> Result<String, ParseError> {
        if !self.check(TokenKind::Package) {
            return Err(self.error("expected `package` declaration"));
        }
        self.advance();
        self.parse_qualified_name()
    }

    fn check_unique_top_level_names(&self, classes: &[ClassDecl], interfaces: &[InterfaceDecl]) -> Result<(), ParseError> {
        let mut seen = std::collections::HashSet::new();
        for c in classes {
            if !seen.insert(c.name.as_str()) {
                return Err(self.error_at(c.offset, &format!("duplicate top-level type `{}` in this file", c.name)));
            }
        }
        for i in interfaces {
            if !seen.insert(i.name.as_str()) {
                return Err(self.error_at(i.offset, &format!("duplicate top-level type `{}` in this file", i.name)));
            }
        }
        Ok(())
    }

    fn parse_qualified_name(&mut self) -> Result<String, ParseError> {
        let mut parts = vec![self.expect_identifier()?];
        while self.check(TokenKind::Dot) {
            self.advance();
            parts.push(self.expect_identifier()?);
        }
        Ok(parts.join("."))
    }

    // ---- declarations -------------------------------------------------

    fn parse_class(&mut self) -> Result<ClassDecl, ParseError> {
        let offset = self.expect(TokenKind::Class)?.offset;
        let name = self.expect_identifier()?;

        let parent = if self.check(TokenKind::Ext) {
            self.advance();
            Some(self.parse_qualified_name()?)
        } else {
            None
        };

        let interfaces = self.parse_impl_list()?;

        self.expect(TokenKind::LBrace)?;
        let (fields, methods) = self.with_scope(ScopeKind::Class, Self::parse_class_members)?;
        self.expect(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            parent,
            interfaces,
            fields,
            methods,
            offset,
        })
    }

    fn parse_interface(&mut self) -> Result<InterfaceDecl, ParseError> {
        let offset = self.expect(TokenKind::Interface)?.offset;
        let name = self.expect_identifier()?;
        let parents = self.parse_impl_list()?;

        self.expect(TokenKind::LBrace)?;
        let methods = self.with_scope(ScopeKind::Class, |p| {
            let mut methods = Vec::new();
            while !p.check(TokenKind::RBrace) {
                methods.push(p.parse_interface_method()?);
            }
            Ok(methods)
        })?;
        self.expect(TokenKind::RBrace)?;

        Ok(InterfaceDecl {
            name,
            parents,
            methods,
            offset,
        })
    }

    fn parse_impl_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        if self.check(TokenKind::Impl) {
            self.advance();
            names.push(self.parse_qualified_name()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                names.push(self.parse_qualified_name()?);
            }
        }
        Ok(names)
    }

    fn parse_class_members(&mut self) -> Result<(Vec<VarDecl>, Vec<MethodDecl>), ParseError> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let visibility = self.parse_visibility();
            if self.check(TokenKind::Var) || self.check(TokenKind::Val) {
                let parsed = self.parse_var_decl()?;
                fields.push(VarDecl {
                    name: parsed.name,
                    type_name: parsed.type_name,
                    init: parsed.init,
                    mutable: parsed.mutable,
                    visibility: visibility.unwrap_or(Visibility::Private),
                    offset: parsed.offset,
                });
            } else {
                methods.push(self.parse_class_method(visibility.unwrap_or(Visibility::Public))?);
            }
        }
        Ok((fields, methods))
    }

    fn parse_visibility(&mut self) -> Option<Visibility> {
        if self.check(TokenKind::Pub) {
            self.advance();
            Some(Visibility::Public)
        } else if self.check(TokenKind::Pri) {
            self.advance();
            Some(Visibility::Private)
        } else {
            None
        }
    }

    /// Shared by field declarations and local-variable statements; the
    /// caller decides, from `current_scope_kind`, what's required.
    fn parse_var_decl(&mut self) -> Result<ParsedVarDecl, ParseError> {
        let offset = self.peek().offset;
        let mutable = if self.check(TokenKind::Var) {
            self.advance();
            true
        } else {
            self.expect(TokenKind::Val)?;
            false
        };
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        let type_name = self.parse_type_name()?;
        let init = if self.check(TokenKind::Assign) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };

        match self.current_scope_kind() {
            ScopeKind::Method | ScopeKind::Block if init.is_none() => {
                return Err(self.error_at(offset, "a local variable declaration requires an initializer"));
            }
            ScopeKind::Global => {
                return Err(self.error_at(offset, "variable declarations are not allowed at the top level"));
            }
            _ => {}
        }

        Ok(ParsedVarDecl {
            name,
            type_name,
            init,
            mutable,
            offset,
        })
    }

    fn parse_method_signature(&mut self) -> Result<(String, Vec<Param>, TypeName, Offset), ParseError> {
        let offset = self.peek().offset;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_param()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        let return_type = if self.check(TokenKind::Colon) {
            self.advance();
            self.parse_type_name()?
        } else {
            TypeName::Void
        };
        Ok((name, params, return_type, offset))
    }

    fn parse_class_method(&mut self, visibility: Visibility) -> Result<MethodDecl, ParseError> {
        let (name, params, return_type, offset) = self.parse_method_signature()?;
        if name == "entry" {
            self.validate_entry(&params, &return_type, offset)?;
        }
        let body = self.with_scope(ScopeKind::Method, Self::parse_block)?;
        Ok(MethodDecl {
            name,
            params,
            return_type,
            body: Some(body),
            visibility,
            offset,
        })
    }

    fn parse_interface_method(&mut self) -> Result<MethodDecl, ParseError> {
        let (name, params, return_type, offset) = self.parse_method_signature()?;
        if name == "entry" {
            self.validate_entry(&params, &return_type, offset)?;
        }
        Ok(MethodDecl {
            name,
            params,
            return_type,
            body: None,
            visibility: Visibility::Public,
            offset,
        })
    }

    fn validate_entry(&self, params: &[Param], return_type: &TypeName, offset: Offset) -> Result<(), ParseError> {
        let expected_param = TypeName::Array(Box::new(TypeName::named("Text")));
        let has_valid_params = params.len() == 1 && params[0].name == "args" && params[0].type_name == expected_param;
        if !has_valid_params {
            return Err(self.error_at(offset, "`entry` must declare exactly one parameter `args: [Text]`"));
        }
        if *return_type != TypeName::Void {
            return Err(self.error_at(offset, "`entry` must return void"));
        }
        Ok(())
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let offset = self.peek().offset;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        let type_name = self.parse_type_name()?;
        Ok(Param { name, type_name, offset })
    }

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        if self.check(TokenKind::LBracket) {
            self.advance();
            let inner = self.expect_identifier()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(TypeName::Array(Box::new(Self::normalize_type_name(inner))));
        }
        let name = self.expect_identifier()?;
        Ok(Self::normalize_type_name(name))
    }

    fn normalize_type_name(name: String) -> TypeName {
        if name == "void" {
            TypeName::Void
        } else {
            TypeName::named(name)
        }
    }

    // ---- statements -----------------------------------------------------

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        let offset = self.expect(TokenKind::LBrace)?.offset;
        let stmts = self.with_scope(ScopeKind::Block, |p| {
            let mut stmts = Vec::new();
            while !p.check(TokenKind::RBrace) && !p.check(TokenKind::Eof) {
                stmts.push(p.parse_statement()?);
                while p.check(TokenKind::Semicolon) {
                    p.advance();
                }
            }
            Ok(stmts)
        })?;
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(StmtKind::Block(stmts), offset))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Return => self.parse_return(),
            TokenKind::Val | TokenKind::Var => self.parse_local_var_stmt(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                let offset = self.advance().offset;
                Ok(Stmt::new(StmtKind::Break, offset))
            }
            TokenKind::Continue => {
                let offset = self.advance().offset;
                Ok(Stmt::new(StmtKind::Continue, offset))
            }
            _ => {
                let expr = self.parse_expr()?;
                let offset = expr.offset;
                Ok(Stmt::new(StmtKind::ExprStmt(expr), offset))
            }
        }
    }

    fn parse_local_var_stmt(&mut self) -> Result<Stmt, ParseError> {
        let parsed = self.parse_var_decl()?;
        let offset = parsed.offset;
        let init = parsed
            .init
            .expect("scope-kind gating guarantees an initializer for a local declaration");
        Ok(Stmt::new(
            StmtKind::LocalVar(LocalVarStmt {
                name: parsed.name,
                type_name: parsed.type_name,
                init,
                mutable: parsed.mutable,
                offset,
            }),
            offset,
        ))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let offset = self.expect(TokenKind::Return)?.offset;
        let value = if self.at_statement_boundary() { None } else { Some(self.parse_expr()?) };
        Ok(Stmt::new(StmtKind::Return(value), offset))
    }

    fn at_statement_boundary(&self) -> bool {
        matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof)
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let offset = self.expect(TokenKind::If)?.offset;
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::If(cond, Box::new(then_branch), else_branch), offset))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let offset = self.expect(TokenKind::While)?.offset;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While(cond, Box::new(body)), offset))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let offset = self.expect(TokenKind::For)?.offset;
        let var = self.expect_identifier()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::For(var, iterable, Box::new(body)), offset))
    }

    // ---- expressions: precedence climbing ------------------------------
    //
    // assign (lowest, right-assoc)
    //   -> logical_or -> logical_and -> equality -> comparison
    //   -> term -> factor -> unary -> primary (highest)

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_logical_or()?;
        let Some(op) = self.match_assignment_op() else {
            return Ok(target);
        };
        let offset = target.offset;
        let value = self.parse_assignment()?;
        self.finish_assignment(target, op, value, offset)
    }

    fn match_assignment_op(&mut self) -> Option<AssignOp> {
        let op = match self.peek().kind {
            TokenKind::Assign => AssignOp::Plain,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn finish_assignment(&self, target: Expr, op: AssignOp, value: Expr, offset: Offset) -> Result<Expr, ParseError> {
        let rhs = match op.as_binary_op() {
            Some(bin_op) => Expr::new(ExprKind::Binary(Box::new(target.clone()), bin_op, Box::new(value)), offset),
            None => value,
        };
        match target.kind {
            ExprKind::Variable(name) => Ok(Expr::new(ExprKind::Assign(name, Box::new(rhs)), offset)),
            ExprKind::Get(receiver, field) => Ok(Expr::new(ExprKind::Set(receiver, field, Box::new(rhs)), offset)),
            _ => Err(self.error_at(offset, "invalid assignment target: expected a variable or field")),
        }
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.check(TokenKind::OrOr) {
            let offset = self.advance().offset;
            let right = self.parse_logical_and()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), BinaryOp::Or, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            let offset = self.advance().offset;
            let right = self.parse_equality()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), BinaryOp::And, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::NotEq,
                _ => break,
            };
            let offset = self.advance().offset;
            let right = self.parse_comparison()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), op, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let offset = self.advance().offset;
            let right = self.parse_term()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), op, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let offset = self.advance().offset;
            let right = self.parse_factor()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), op, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let offset = self.advance().offset;
            let right = self.parse_unary()?;
            left = Expr::new(ExprKind::Binary(Box::new(left), op, Box::new(right)), offset);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let offset = self.advance().offset;
        let operand = self.parse_unary()?;
        Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), offset))
    }

    /// Primary plus any chain of `.field`, `.method(args)`, and
    /// `[index]` that follows it.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(TokenKind::Dot) {
                self.advance();
                let field = self.expect_identifier()?;
                let offset = expr.offset;
                if self.check(TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    let callee = Expr::new(ExprKind::Get(Box::new(expr), field), offset);
                    expr = Expr::new(ExprKind::Call(Box::new(callee), args), offset);
                } else {
                    expr = Expr::new(ExprKind::Get(Box::new(expr), field), offset);
                }
            } else if self.check(TokenKind::LBracket) {
                let offset = expr.offset;
                self.advance();
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                expr = Expr::new(ExprKind::Index(Box::new(expr), Box::new(index)), offset);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::TextLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                self.advance();
                let literal = tok.literal.expect("literal token without a literal value");
                Ok(Expr::new(ExprKind::Literal(literal), tok.offset))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    if starts_with_uppercase(&tok.lexeme) {
                        Ok(Expr::new(ExprKind::New(tok.lexeme, args), tok.offset))
                    } else {
                        let callee = Expr::new(ExprKind::Variable(tok.lexeme), tok.offset);
                        Ok(Expr::new(ExprKind::Call(Box::new(callee), args), tok.offset))
                    }
                } else {
                    Ok(Expr::new(ExprKind::Variable(tok.lexeme), tok.offset))
                }
            }
            TokenKind::LBracket => self.parse_array_literal(),
            _ => Err(self.error(&format!("expected an expression, found {:?}", tok.kind))),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let offset = self.expect(TokenKind::LBracket)?.offset;
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                elements.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::ArrayLiteral(elements), offset))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

/// The convention this language's worked examples use throughout:
/// class names are capitalized, everything else isn't. A bare call
/// `Foo(args)` at the base of a postfix chain (i.e. not preceded by a
/// `.`) is therefore parsed as construction rather than an ordinary
/// call — there is no `new` keyword in the token set.
fn starts_with_uppercase(s: &str) -> bool {
    s.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}
