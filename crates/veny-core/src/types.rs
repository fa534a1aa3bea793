//! The type system: builtins, class/interface references, arrays, and
//! callable (method) signatures.

use std::rc::Rc;

use crate::symbol::{ClassSymbol, InterfaceSymbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    Int,
    Float,
    Bool,
    Text,
    Void,
    Null,
    /// Placeholder assigned after a failed resolution, so analysis can
    /// keep going instead of aborting (see `analyzer.rs`).
    Error,
    /// The `for`-loop variable's type in this version — see the
    /// open question on loop-variable typing in the source spec.
    Unknown,
}

impl BuiltinType {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Int => "Int",
            BuiltinType::Float => "Float",
            BuiltinType::Bool => "Bool",
            BuiltinType::Text => "Text",
            BuiltinType::Void => "void",
            BuiltinType::Null => "null",
            BuiltinType::Error => "<error>",
            BuiltinType::Unknown => "<unknown>",
        }
    }

    /// The fixed name table the analyzer consults when resolving a
    /// `TypeName::Named` that isn't a class or interface.
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Some(match name {
            "Int" => BuiltinType::Int,
            "Float" => BuiltinType::Float,
            "Bool" => BuiltinType::Bool,
            "Text" => BuiltinType::Text,
            "void" => BuiltinType::Void,
            _ => return None,
        })
    }
}

/// A resolved type. Builtins and arrays-of-builtins are plain values;
/// `Class`/`Interface` are non-owning references into the symbol
/// table built by the resolver.
#[derive(Debug, Clone)]
pub enum Type {
    Builtin(BuiltinType),
    Class(Rc<ClassSymbol>),
    Interface(Rc<InterfaceSymbol>),
    Array(Rc<Type>),
    Callable(Vec<Rc<Type>>, Rc<Type>),
}

impl Type {
    pub fn name(&self) -> String {
        match self {
            Type::Builtin(b) => b.name().to_string(),
            Type::Class(c) => c.name.clone(),
            Type::Interface(i) => i.name.clone(),
            Type::Array(inner) => format!("[{}]", inner.name()),
            Type::Callable(params, ret) => {
                let params = params.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ");
                format!("({}) -> {}", params, ret.name())
            }
        }
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Interface(_) | Type::Array(_))
    }

    /// Equality "by (name, variant)" per the source spec: two types
    /// are the same type if they report the same name and neither is
    /// structurally distinguishable beyond that (arrays compare their
    /// element types recursively).
    pub fn same_type(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Array(a), Type::Array(b)) => a.same_type(b),
            _ => self.name() == other.name(),
        }
    }

    /// Whether a value of type `other` may be assigned to a location
    /// of type `self`. `null` is assignable to any reference type;
    /// `Error` is assignable both ways so a single unresolved name
    /// doesn't cascade into a wall of follow-on diagnostics.
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        if matches!(self, Type::Builtin(BuiltinType::Error)) || matches!(other, Type::Builtin(BuiltinType::Error)) {
            return true;
        }
        if matches!(other, Type::Builtin(BuiltinType::Null)) {
            return self.is_reference_type();
        }
        match (self, other) {
            (Type::Builtin(a), Type::Builtin(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => b.is_subclass_of(a),
            (Type::Interface(a), Type::Interface(b)) => a.name == b.name,
            (Type::Interface(a), Type::Class(b)) => b.implements(a),
            (Type::Array(a), Type::Array(b)) => a.is_assignable_from(b),
            (Type::Callable(a_params, a_ret), Type::Callable(b_params, b_ret)) => {
                a_params.len() == b_params.len()
                    && a_params.iter().zip(b_params.iter()).all(|(a, b)| a.is_assignable_from(b))
                    && a_ret.is_assignable_from(b_ret)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Visibility;

    #[test]
    fn null_is_assignable_to_reference_types_only() {
        let class = Type::Class(ClassSymbol::new("Foo", Visibility::Public));
        assert!(class.is_assignable_from(&Type::Builtin(BuiltinType::Null)));
        assert!(!Type::Builtin(BuiltinType::Int).is_assignable_from(&Type::Builtin(BuiltinType::Null)));
    }

    #[test]
    fn subclass_is_assignable_to_superclass() {
        let base = ClassSymbol::new("Animal", Visibility::Public);
        let derived = ClassSymbol::new("Dog", Visibility::Public);
        derived.set_parent(base.clone());
        assert!(Type::Class(base).is_assignable_from(&Type::Class(derived)));
    }

    #[test]
    fn error_type_is_assignable_both_ways() {
        let err = Type::Builtin(BuiltinType::Error);
        let int = Type::Builtin(BuiltinType::Int);
        assert!(err.is_assignable_from(&int));
        assert!(int.is_assignable_from(&err));
    }

    #[test]
    fn builtin_lookup_table() {
        assert_eq!(BuiltinType::from_name("Int"), Some(BuiltinType::Int));
        assert_eq!(BuiltinType::from_name("Nope"), None);
    }
}
