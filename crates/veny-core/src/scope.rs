//! The `Scope` capability trait and the two scope kinds (`GlobalScope`,
//! `LocalScope`) that aren't also symbols in their own right.
//!
//! `ClassSymbol`, `InterfaceSymbol`, and `MethodSymbol` implement this
//! same trait (see `symbol.rs`) — a class or method *is* a scope, it
//! doesn't merely have one. The upward `enclosing` link on every
//! implementor is a `Weak` reference: scopes own their children
//! (through the member map / locals map), never the other way
//! around, so there is no reference cycle to worry about.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::symbol::Symbol;

/// Capability set shared by every scope kind: define a symbol, look
/// it up locally or through the enclosing chain, and walk that chain.
pub trait Scope {
    fn name(&self) -> &str;
    fn define(&self, symbol: Symbol);
    fn resolve_local(&self, name: &str) -> Option<Symbol>;
    fn enclosing(&self) -> Option<Rc<dyn Scope>>;
    fn symbols(&self) -> Vec<Symbol>;

    /// Walks from this scope up through its enclosing chain, returning
    /// the first match.
    fn resolve(&self, name: &str) -> Option<Symbol> {
        if let Some(sym) = self.resolve_local(name) {
            return Some(sym);
        }
        self.enclosing().and_then(|parent| parent.resolve(name))
    }
}

/// The root scope: no parent, holds every top-level class and
/// interface symbol registered by the import resolver.
///
/// Two maps, not one: `by_fqcn` is keyed by the full `package.Name`
/// and is the uniqueness unit the resolver enforces — two different
/// packages each declaring a class `Foo` are two distinct entries
/// here, not a collision. `members` (the `Scope` trait's own bare-name
/// map) is what every unqualified type reference in a method body,
/// `extends`/`impl` clause, or field/param type actually resolves
/// against, since Veny has no import-alias scoping: once any file
/// declares or imports a name, that bare name is visible compilation
/// wide. `define_fqcn` keeps both in sync.
#[derive(Debug)]
pub struct GlobalScope {
    by_fqcn: RefCell<IndexMap<String, Symbol>>,
    members: RefCell<IndexMap<String, Symbol>>,
}

impl GlobalScope {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            by_fqcn: RefCell::new(IndexMap::new()),
            members: RefCell::new(IndexMap::new()),
        })
    }

    /// Registers a top-level symbol under its full FQCN, also updating
    /// the bare-name lookup table. Does not check for an existing
    /// entry — callers use `resolve_fqcn` first to detect a duplicate
    /// FQCN before calling this.
    pub fn define_fqcn(&self, fqcn: impl Into<String>, symbol: Symbol) {
        self.by_fqcn.borrow_mut().insert(fqcn.into(), symbol.clone());
        self.define(symbol);
    }

    /// Looks up a top-level symbol by its full FQCN (`package.Name`).
    pub fn resolve_fqcn(&self, fqcn: &str) -> Option<Symbol> {
        self.by_fqcn.borrow().get(fqcn).cloned()
    }
}

impl Scope for GlobalScope {
    fn name(&self) -> &str {
        "<global>"
    }

    fn define(&self, symbol: Symbol) {
        self.members.borrow_mut().insert(symbol.name().to_string(), symbol);
    }

    fn resolve_local(&self, name: &str) -> Option<Symbol> {
        self.members.borrow().get(name).cloned()
    }

    fn enclosing(&self) -> Option<Rc<dyn Scope>> {
        None
    }

    fn symbols(&self) -> Vec<Symbol> {
        self.members.borrow().values().cloned().collect()
    }
}

/// A block-level scope: `if`/`while`/`for` bodies and bare `{ }`
/// blocks. Short-lived — created on entering a block, discarded on
/// leaving it.
#[derive(Debug)]
pub struct LocalScope {
    members: RefCell<IndexMap<String, Symbol>>,
    enclosing: Weak<dyn Scope>,
}

impl LocalScope {
    pub fn new(enclosing: Weak<dyn Scope>) -> Rc<Self> {
        Rc::new(Self {
            members: RefCell::new(IndexMap::new()),
            enclosing,
        })
    }
}

impl Scope for LocalScope {
    fn name(&self) -> &str {
        "<block>"
    }

    fn define(&self, symbol: Symbol) {
        self.members.borrow_mut().insert(symbol.name().to_string(), symbol);
    }

    fn resolve_local(&self, name: &str) -> Option<Symbol> {
        self.members.borrow().get(name).cloned()
    }

    fn enclosing(&self) -> Option<Rc<dyn Scope>> {
        self.enclosing.upgrade()
    }

    fn symbols(&self) -> Vec<Symbol> {
        self.members.borrow().values().cloned().collect()
    }
}
