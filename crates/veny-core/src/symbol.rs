//! Symbols: named program entities produced by declarations and
//! stored in scopes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::ast::Visibility;
use crate::scope::Scope;
use crate::types::Type;

/// A variable, parameter, or local — the one symbol kind that isn't
/// itself a scope.
#[derive(Debug)]
pub struct VariableSymbol {
    pub name: String,
    pub visibility: Visibility,
    pub is_parameter: bool,
    pub is_immutable: bool,
    ty: RefCell<Option<Rc<Type>>>,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, visibility: Visibility, is_parameter: bool, is_immutable: bool) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            visibility,
            is_parameter,
            is_immutable,
            ty: RefCell::new(None),
        })
    }

    pub fn ty(&self) -> Option<Rc<Type>> {
        self.ty.borrow().clone()
    }

    pub fn set_ty(&self, ty: Rc<Type>) {
        *self.ty.borrow_mut() = Some(ty);
    }
}

/// A method signature, and — for a class method with a body — the
/// scope its parameters and locals live in. Parameters and locals are
/// kept in separate maps per the source spec; `resolve_local` checks
/// both since, to a reference inside the body, they're one namespace.
#[derive(Debug)]
pub struct MethodSymbol {
    pub name: String,
    pub visibility: Visibility,
    params: RefCell<IndexMap<String, Rc<VariableSymbol>>>,
    locals: RefCell<IndexMap<String, Rc<VariableSymbol>>>,
    return_type: RefCell<Option<Rc<Type>>>,
    enclosing: RefCell<Option<Weak<dyn Scope>>>,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            visibility,
            params: RefCell::new(IndexMap::new()),
            locals: RefCell::new(IndexMap::new()),
            return_type: RefCell::new(None),
            enclosing: RefCell::new(None),
        })
    }

    pub fn set_enclosing(&self, scope: Weak<dyn Scope>) {
        *self.enclosing.borrow_mut() = Some(scope);
    }

    pub fn define_param(&self, param: Rc<VariableSymbol>) {
        self.params.borrow_mut().insert(param.name.clone(), param);
    }

    pub fn define_local(&self, local: Rc<VariableSymbol>) {
        self.locals.borrow_mut().insert(local.name.clone(), local);
    }

    pub fn params(&self) -> Vec<Rc<VariableSymbol>> {
        self.params.borrow().values().cloned().collect()
    }

    pub fn set_return_type(&self, ty: Rc<Type>) {
        *self.return_type.borrow_mut() = Some(ty);
    }

    pub fn return_type(&self) -> Option<Rc<Type>> {
        self.return_type.borrow().clone()
    }
}

impl Scope for MethodSymbol {
    fn name(&self) -> &str {
        &self.name
    }

    fn define(&self, symbol: Symbol) {
        if let Symbol::Variable(v) = symbol {
            if v.is_parameter {
                self.define_param(v);
            } else {
                self.define_local(v);
            }
        }
    }

    fn resolve_local(&self, name: &str) -> Option<Symbol> {
        self.locals
            .borrow()
            .get(name)
            .or_else(|| self.params.borrow().get(name))
            .cloned()
            .map(Symbol::Variable)
    }

    fn enclosing(&self) -> Option<Rc<dyn Scope>> {
        self.enclosing.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn symbols(&self) -> Vec<Symbol> {
        self.params()
            .into_iter()
            .chain(self.locals.borrow().values().cloned())
            .map(Symbol::Variable)
            .collect()
    }
}

/// A class: its own scope (fields and methods are its members),
/// an optional superclass, and the interfaces it implements.
#[derive(Debug)]
pub struct ClassSymbol {
    pub name: String,
    pub visibility: Visibility,
    parent: RefCell<Option<Rc<ClassSymbol>>>,
    interfaces: RefCell<Vec<Rc<InterfaceSymbol>>>,
    members: RefCell<IndexMap<String, Symbol>>,
    enclosing: RefCell<Option<Weak<dyn Scope>>>,
}

impl ClassSymbol {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            visibility,
            parent: RefCell::new(None),
            interfaces: RefCell::new(Vec::new()),
            members: RefCell::new(IndexMap::new()),
            enclosing: RefCell::new(None),
        })
    }

    pub fn set_enclosing(&self, scope: Weak<dyn Scope>) {
        *self.enclosing.borrow_mut() = Some(scope);
    }

    pub fn set_parent(&self, parent: Rc<ClassSymbol>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    pub fn parent(&self) -> Option<Rc<ClassSymbol>> {
        self.parent.borrow().clone()
    }

    pub fn add_interface(&self, iface: Rc<InterfaceSymbol>) {
        self.interfaces.borrow_mut().push(iface);
    }

    pub fn interfaces(&self) -> Vec<Rc<InterfaceSymbol>> {
        self.interfaces.borrow().clone()
    }

    /// Looks up a member on this class, then its ancestor chain.
    pub fn find_member(&self, name: &str) -> Option<Symbol> {
        if let Some(sym) = self.members.borrow().get(name).cloned() {
            return Some(sym);
        }
        self.parent().and_then(|p| p.find_member(name))
    }

    /// `self` or any ancestor is `other`.
    pub fn is_subclass_of(&self, other: &Rc<ClassSymbol>) -> bool {
        if self.name == other.name {
            return true;
        }
        match self.parent() {
            Some(p) => p.is_subclass_of(other),
            None => false,
        }
    }

    /// Whether this class (or an ancestor) implements `iface`,
    /// directly or via an interface's own `extends` chain.
    pub fn implements(&self, iface: &Rc<InterfaceSymbol>) -> bool {
        if self.interfaces().iter().any(|i| i.extends_or_is(iface)) {
            return true;
        }
        match self.parent() {
            Some(p) => p.implements(iface),
            None => false,
        }
    }
}

impl Scope for ClassSymbol {
    fn name(&self) -> &str {
        &self.name
    }

    fn define(&self, symbol: Symbol) {
        self.members.borrow_mut().insert(symbol.name().to_string(), symbol);
    }

    fn resolve_local(&self, name: &str) -> Option<Symbol> {
        self.members.borrow().get(name).cloned()
    }

    fn enclosing(&self) -> Option<Rc<dyn Scope>> {
        self.enclosing.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn symbols(&self) -> Vec<Symbol> {
        self.members.borrow().values().cloned().collect()
    }
}

/// An interface: method *signatures* only, plus the interfaces it
/// itself extends.
#[derive(Debug)]
pub struct InterfaceSymbol {
    pub name: String,
    parents: RefCell<Vec<Rc<InterfaceSymbol>>>,
    members: RefCell<IndexMap<String, Rc<MethodSymbol>>>,
    enclosing: RefCell<Option<Weak<dyn Scope>>>,
}

impl InterfaceSymbol {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            parents: RefCell::new(Vec::new()),
            members: RefCell::new(IndexMap::new()),
            enclosing: RefCell::new(None),
        })
    }

    pub fn set_enclosing(&self, scope: Weak<dyn Scope>) {
        *self.enclosing.borrow_mut() = Some(scope);
    }

    pub fn add_parent(&self, parent: Rc<InterfaceSymbol>) {
        self.parents.borrow_mut().push(parent);
    }

    pub fn define_method(&self, method: Rc<MethodSymbol>) {
        self.members.borrow_mut().insert(method.name.clone(), method);
    }

    pub fn find_member(&self, name: &str) -> Option<Rc<MethodSymbol>> {
        if let Some(m) = self.members.borrow().get(name).cloned() {
            return Some(m);
        }
        self.parents.borrow().iter().find_map(|p| p.find_member(name))
    }

    fn extends_or_is(&self, other: &Rc<InterfaceSymbol>) -> bool {
        if self.name == other.name {
            return true;
        }
        self.parents.borrow().iter().any(|p| p.extends_or_is(other))
    }
}

impl Scope for InterfaceSymbol {
    fn name(&self) -> &str {
        &self.name
    }

    fn define(&self, symbol: Symbol) {
        if let Symbol::Method(m) = symbol {
            self.define_method(m);
        }
    }

    fn resolve_local(&self, name: &str) -> Option<Symbol> {
        self.members.borrow().get(name).cloned().map(Symbol::Method)
    }

    fn enclosing(&self) -> Option<Rc<dyn Scope>> {
        self.enclosing.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn symbols(&self) -> Vec<Symbol> {
        self.members.borrow().values().cloned().map(Symbol::Method).collect()
    }
}

/// A named program entity: the value type stored in scope member
/// maps. Cloning is cheap — every variant is an `Rc`.
#[derive(Debug, Clone)]
pub enum Symbol {
    Class(Rc<ClassSymbol>),
    Interface(Rc<InterfaceSymbol>),
    Method(Rc<MethodSymbol>),
    Variable(Rc<VariableSymbol>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Class(c) => &c.name,
            Symbol::Interface(i) => &i.name,
            Symbol::Method(m) => &m.name,
            Symbol::Variable(v) => &v.name,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Symbol::Class(c) => c.visibility,
            Symbol::Interface(_) => Visibility::Public,
            Symbol::Method(m) => m.visibility,
            Symbol::Variable(v) => v.visibility,
        }
    }
}
