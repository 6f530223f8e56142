//! Packages: named, precedence-ranked bundles of rules.

use crate::rule::IntoRule;
use crate::{Error, Result, Rule};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A kind of package.
///
/// Implementors name themselves and register their rules in
/// [`initialize`](PackageKind::initialize), which runs exactly once when a
/// [`Package`] is built from the kind.
pub trait PackageKind {
    /// Identifies the package lineage. Packages with equal names are interchangeable.
    fn name(&self) -> &str;

    /// Register this kind's rules (and optionally its precedence).
    fn initialize(&self, package: &mut PackageBuilder) -> Result<()>;
}

/// An initialized, immutable package.
#[derive(Clone)]
pub struct Package {
    name: String,
    precedence: i64,
    rules: HashMap<String, Rule>,
}

impl Package {
    /// Build a package by running the kind's initialization step.
    pub fn new<K: PackageKind + ?Sized>(kind: &K) -> Result<Self> {
        let mut builder = PackageBuilder {
            name: kind.name().to_string(),
            precedence: 0,
            rules: HashMap::new(),
        };
        kind.initialize(&mut builder)?;
        Ok(builder.finish())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Higher precedence wins when packages define the same permission.
    pub fn precedence(&self) -> i64 {
        self.precedence
    }

    pub fn with_precedence(mut self, precedence: i64) -> Self {
        self.precedence = precedence;
        self
    }

    /// All rules registered during initialization.
    pub fn defined_permissions(&self) -> &HashMap<String, Rule> {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Package {}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Registration surface handed to [`PackageKind::initialize`].
pub struct PackageBuilder {
    name: String,
    precedence: i64,
    rules: HashMap<String, Rule>,
}

impl PackageBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&mut self, precedence: i64) -> &mut Self {
        self.precedence = precedence;
        self
    }

    /// Register a single rule. A later registration under the same name
    /// replaces the earlier one, even across boolean and predicate values.
    pub fn register_rule(&mut self, name: impl Into<String>, value: impl IntoRule) -> Result<&mut Self> {
        let name = name.into();
        let rule = value.into_rule(&name)?;
        self.rules.insert(name, rule);
        Ok(self)
    }

    /// Register several rules, in iteration order.
    pub fn register_rules<I, K, V>(&mut self, rules: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoRule,
    {
        for (name, value) in rules {
            self.register_rule(name, value)?;
        }
        Ok(self)
    }

    fn finish(self) -> Package {
        Package {
            name: self.name,
            precedence: self.precedence,
            rules: self.rules,
        }
    }
}

/// A package kind declared in TOML.
///
/// ```toml
/// name = "editor"
/// precedence = 10
///
/// [rules]
/// login = true
/// publish = false
/// ```
///
/// Declarative packages can only hold fixed rules; any non-boolean rule value
/// is rejected when the package is built.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDefinition {
    pub name: String,

    #[serde(default)]
    pub precedence: i64,

    #[serde(default)]
    pub rules: toml::Table,
}

impl PackageDefinition {
    /// Load a package definition from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a package definition from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let definition: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        if definition.name.trim().is_empty() {
            return Err(Error::Parse("package name must not be empty".to_string()));
        }
        Ok(definition)
    }
}

impl PackageKind for PackageDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, package: &mut PackageBuilder) -> Result<()> {
        package
            .precedence(self.precedence)
            .register_rules(self.rules.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UserId, UserRepresentation};
    use serde_json::{json, Value};

    struct Basic;

    impl PackageKind for Basic {
        fn name(&self) -> &str {
            "basic"
        }

        fn initialize(&self, package: &mut PackageBuilder) -> Result<()> {
            package
                .register_rule("login", false)?
                .register_rule("logout", false)?
                .register_rules([("view_profile", true), ("view_homepage", false)])?
                .register_rule("jump_type_rule", false)?
                .register_rule("closure", Rule::predicate(|_: &dyn UserRepresentation, _: &[Value]| false))?
                .register_rule(
                    "closure_with_args",
                    Rule::predicate(|_: &dyn UserRepresentation, args: &[Value]| {
                        args.iter().filter_map(Value::as_str).collect::<String>()
                    }),
                )?;
            Ok(())
        }
    }

    struct Bad;

    impl PackageKind for Bad {
        fn name(&self) -> &str {
            "bad"
        }

        fn initialize(&self, package: &mut PackageBuilder) -> Result<()> {
            package.register_rule("bad", json!("string value is not good!"))?;
            Ok(())
        }
    }

    struct Retyped;

    impl PackageKind for Retyped {
        fn name(&self) -> &str {
            "retyped"
        }

        fn initialize(&self, package: &mut PackageBuilder) -> Result<()> {
            package
                .register_rule("flip", true)?
                .register_rule("flip", Rule::predicate(|_: &dyn UserRepresentation, _: &[Value]| "dynamic"))?
                .register_rule("flop", Rule::predicate(|_: &dyn UserRepresentation, _: &[Value]| true))?
                .register_rule("flop", false)?;
            Ok(())
        }
    }

    #[test]
    fn rules_survive_initialization() {
        let package = Package::new(&Basic).unwrap();
        let perms = package.defined_permissions();
        let user = UserId::from(1);

        assert_eq!(perms.len(), 7);
        assert!(matches!(perms["login"], Rule::Fixed(false)));
        assert!(matches!(perms["view_profile"], Rule::Fixed(true)));
        assert!(perms["closure"].is_predicate());
        assert_eq!(perms["closure"].evaluate(&user, &[]), false);
        assert_eq!(
            perms["closure_with_args"]
                .evaluate(&user, &[json!("arg1"), json!("arg2")])
                .value(),
            &json!("arg1arg2")
        );
    }

    #[test]
    fn bad_rule_value_fails_construction() {
        let err = Package::new(&Bad).unwrap_err();
        assert!(matches!(err, Error::InvalidRuleValue { ref name } if name == "bad"));
    }

    #[test]
    fn last_registration_wins_across_types() {
        let package = Package::new(&Retyped).unwrap();
        assert!(package.rule("flip").unwrap().is_predicate());
        assert!(matches!(package.rule("flop"), Some(Rule::Fixed(false))));
    }

    #[test]
    fn precedence_defaults_to_zero_and_chains() {
        let package = Package::new(&Basic).unwrap();
        assert_eq!(package.precedence(), 0);

        let package = package.with_precedence(5);
        assert_eq!(package.precedence(), 5);
        assert_eq!(package.name(), "basic");
    }

    #[test]
    fn packages_compare_by_name() {
        let a = Package::new(&Basic).unwrap();
        let b = Package::new(&Basic).unwrap().with_precedence(3);
        assert_eq!(a, b);
        assert_ne!(a, Package::new(&Retyped).unwrap());
    }

    #[test]
    fn parse_toml_definition() {
        let toml = r#"
name = "editor"
precedence = 10

[rules]
login = true
publish = false
"#;
        let definition = PackageDefinition::parse(toml).unwrap();
        let package = Package::new(&definition).unwrap();

        assert_eq!(package.name(), "editor");
        assert_eq!(package.precedence(), 10);
        assert!(matches!(package.rule("login"), Some(Rule::Fixed(true))));
        assert!(matches!(package.rule("publish"), Some(Rule::Fixed(false))));
    }

    #[test]
    fn toml_definition_rejects_non_boolean_rules() {
        let toml = r#"
name = "broken"

[rules]
login = "sometimes"
"#;
        let definition = PackageDefinition::parse(toml).unwrap();
        assert!(matches!(
            Package::new(&definition),
            Err(Error::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn toml_definition_requires_name() {
        assert!(matches!(
            PackageDefinition::parse("name = \"\""),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            PackageDefinition::parse("precedence = 1"),
            Err(Error::Parse(_))
        ));
    }
}
