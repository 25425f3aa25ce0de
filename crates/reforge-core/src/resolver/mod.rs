/*!
# Resolver Facade

Read-only semantic queries the rules ask about the current tree. A
resolver is bound to one tree snapshot and is rebuilt for every pass, so
nothing it answers survives a rewrite.

A query the resolver cannot answer yields `Fact::Unknown` (or
`Constant::None`); rules treat that as "no match" and keep descending.
*/

use serde::{Deserialize, Serialize};

use crate::ast::NodeRef;

pub mod syntactic;

pub use syntactic::SyntacticResolver;

/// Fully qualified name of the TestNG assertion class.
pub const TESTNG_ASSERT: &str = "org.testng.Assert";

/// Answer to a semantic query that may be unresolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fact<T> {
    Known(T),
    Unknown,
}

impl<T> Fact<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Fact::Known(value) => Some(value),
            Fact::Unknown => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Fact::Known(value) => Some(value),
            Fact::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Fact::Known(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fact<U> {
        match self {
            Fact::Known(value) => Fact::Known(f(value)),
            Fact::Unknown => Fact::Unknown,
        }
    }
}

impl<T> From<Option<T>> for Fact<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Fact::Known(value),
            None => Fact::Unknown,
        }
    }
}

/// Compile-time value of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    True,
    False,
    Numeric(f64),
    Null,
    Text(String),
    None,
}

impl Constant {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Constant::True
        } else {
            Constant::False
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Constant::True => Some(true),
            Constant::False => Some(false),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Constant::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Constant::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub qualified_name: String,
    pub supertypes: Vec<String>,
    pub primitive: bool,
}

impl TypeDescriptor {
    pub fn primitive(name: &str) -> Self {
        Self {
            qualified_name: name.to_string(),
            supertypes: Vec::new(),
            primitive: true,
        }
    }

    pub fn object(qualified_name: impl Into<String>, supertypes: &[&str]) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            primitive: false,
        }
    }

    /// Whether this type is `qualified_name` or one of its subtypes.
    pub fn is_subtype_of(&self, qualified_name: &str) -> bool {
        self.qualified_name == qualified_name || self.supertypes.iter().any(|s| s == qualified_name)
    }

    pub fn is_boolean(&self) -> bool {
        self.primitive && self.qualified_name == "boolean"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub owner: String,
    pub name: String,
    pub param_types: Vec<String>,
}

impl MethodSignature {
    pub fn new(owner: &str, name: &str, param_types: &[&str]) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            param_types: param_types.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn is(&self, owner: &str, name: &str) -> bool {
        self.owner == owner && self.name == name
    }

    pub fn arity(&self) -> usize {
        self.param_types.len()
    }
}

/// Semantic oracle consulted by the rules.
pub trait Resolver {
    fn resolve_constant(&self, expression: NodeRef<'_>) -> Constant;

    fn static_type_of(&self, expression: NodeRef<'_>) -> Fact<TypeDescriptor>;

    fn is_primitive(&self, expression: NodeRef<'_>) -> bool {
        matches!(self.static_type_of(expression), Fact::Known(ty) if ty.primitive)
    }

    fn method_signature_of(&self, call: NodeRef<'_>) -> Fact<MethodSignature>;
}
