//! Permission rules and the verdicts they produce.

use crate::{Error, Result, UserRepresentation};
use serde_json::Value;
use std::sync::Arc;

/// A dynamically evaluated rule.
///
/// Receives the acting user followed by the caller-supplied arguments.
pub type Predicate = Arc<dyn Fn(&dyn UserRepresentation, &[Value]) -> Value + Send + Sync>;

/// The value of a single permission entry.
#[derive(Clone)]
pub enum Rule {
    /// A hard yes/no.
    Fixed(bool),
    /// A callback decided at check time.
    Predicate(Predicate),
}

impl Rule {
    /// Wrap a closure as a predicate rule.
    ///
    /// The closure may return anything convertible to a JSON value; the
    /// result is interpreted by truthiness (see [`Verdict::is_allowed`]).
    pub fn predicate<F, T>(f: F) -> Self
    where
        F: Fn(&dyn UserRepresentation, &[Value]) -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        Self::Predicate(Arc::new(
            move |user: &dyn UserRepresentation, args: &[Value]| -> Value { f(user, args).into() },
        ))
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Rule::Predicate(_))
    }

    /// Resolve the rule for `user`, invoking the predicate if there is one.
    pub fn evaluate(&self, user: &dyn UserRepresentation, args: &[Value]) -> Verdict {
        match self {
            Rule::Fixed(allowed) => Verdict::from(*allowed),
            Rule::Predicate(predicate) => Verdict(predicate(user, args)),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Fixed(allowed) => f.debug_tuple("Fixed").field(allowed).finish(),
            Rule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<bool> for Rule {
    fn from(allowed: bool) -> Self {
        Rule::Fixed(allowed)
    }
}

/// Conversion into a [`Rule`], validated against the permission name.
///
/// Typed values always convert; untyped values (from TOML or JSON) fail with
/// [`Error::InvalidRuleValue`] unless they are booleans.
pub trait IntoRule {
    fn into_rule(self, name: &str) -> Result<Rule>;
}

impl IntoRule for Rule {
    fn into_rule(self, _name: &str) -> Result<Rule> {
        Ok(self)
    }
}

impl IntoRule for bool {
    fn into_rule(self, _name: &str) -> Result<Rule> {
        Ok(Rule::Fixed(self))
    }
}

impl IntoRule for Predicate {
    fn into_rule(self, _name: &str) -> Result<Rule> {
        Ok(Rule::Predicate(self))
    }
}

impl IntoRule for Value {
    fn into_rule(self, name: &str) -> Result<Rule> {
        match self {
            Value::Bool(allowed) => Ok(Rule::Fixed(allowed)),
            _ => Err(Error::InvalidRuleValue {
                name: name.to_string(),
            }),
        }
    }
}

impl IntoRule for toml::Value {
    fn into_rule(self, name: &str) -> Result<Rule> {
        match self {
            toml::Value::Boolean(allowed) => Ok(Rule::Fixed(allowed)),
            _ => Err(Error::InvalidRuleValue {
                name: name.to_string(),
            }),
        }
    }
}

/// Result of a permission check.
///
/// Fixed rules yield a boolean; predicates may yield any value, which is
/// judged by truthiness.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict(Value);

impl Verdict {
    /// The fail-closed verdict used for unknown permissions.
    pub fn deny() -> Self {
        Self(Value::Bool(false))
    }

    pub fn is_allowed(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<bool> for Verdict {
    fn from(allowed: bool) -> Self {
        Self(Value::Bool(allowed))
    }
}

impl From<Value> for Verdict {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl PartialEq<bool> for Verdict {
    fn eq(&self, other: &bool) -> bool {
        self.0 == Value::Bool(*other)
    }
}
