#![allow(dead_code)]

use std::sync::Arc;

use auth::{Auth, AuthConfig};
use policy::{Package, PackageBuilder, PackageKind, PackageRegistry, Rule, UserRepresentation};
use serde_json::Value;
use storage::{MemorySessionStore, SqliteRecordStore, StoredUser};

pub type TestAuth = Auth<Arc<MemorySessionStore>, Arc<SqliteRecordStore>>;

pub const INSTANCE: &str = "default";
pub const PASSWORD: &str = "Alex";

fn text(args: &[Value], index: usize) -> &str {
    args.get(index).and_then(Value::as_str).unwrap_or_default()
}

/// Baseline package: mostly denies.
#[derive(Default)]
pub struct TestPackage;

impl PackageKind for TestPackage {
    fn name(&self) -> &str {
        "test"
    }

    fn initialize(&self, package: &mut PackageBuilder) -> policy::Result<()> {
        package
            .register_rule("login", false)?
            .register_rule("logout", false)?
            .register_rule("view_profile", true)?
            .register_rule("view_homepage", false)?
            .register_rule("edit_post", Rule::predicate(|_, _| false))?
            .register_rule("closure", Rule::predicate(|_, _| false))?
            .register_rule(
                "closure_with_args",
                Rule::predicate(|_, args| format!("{}{}", text(args, 0), text(args, 1))),
            )?
            .register_rule("jump_type_rule", false)?
            .register_rule("jump_type_callback", Rule::predicate(|_, _| false))?;
        Ok(())
    }
}

/// Same permissions as [`TestPackage`], all granted, at precedence 10.
#[derive(Default)]
pub struct HigherPackage;

impl PackageKind for HigherPackage {
    fn name(&self) -> &str {
        "higher"
    }

    fn initialize(&self, package: &mut PackageBuilder) -> policy::Result<()> {
        package
            .precedence(10)
            .register_rule("login", true)?
            .register_rule("logout", true)?
            .register_rule("view_profile", true)?
            .register_rule("view_homepage", true)?
            .register_rule("edit_post", Rule::predicate(|_, _| true))?
            .register_rule("closure", Rule::predicate(|_, _| true))?
            .register_rule(
                "closure_with_args",
                Rule::predicate(|_, args| format!("{}{}", text(args, 1), text(args, 0))),
            )?
            .register_rule("jump_type_rule", Rule::predicate(|_, _| true))?
            .register_rule("jump_type_callback", true)?;
        Ok(())
    }
}

/// Grants only a handful of permissions.
#[derive(Default)]
pub struct PartialPackage;

impl PackageKind for PartialPackage {
    fn name(&self) -> &str {
        "partial"
    }

    fn initialize(&self, package: &mut PackageBuilder) -> policy::Result<()> {
        package
            .precedence(10)
            .register_rule("login", true)?
            .register_rule("edit_post", Rule::predicate(|_, _| true))?
            .register_rule("closure", Rule::predicate(|_, _| true))?;
        Ok(())
    }
}

/// Lets users edit their own account only.
#[derive(Default)]
pub struct SelfServicePackage;

impl PackageKind for SelfServicePackage {
    fn name(&self) -> &str {
        "self_service"
    }

    fn initialize(&self, package: &mut PackageBuilder) -> policy::Result<()> {
        package.register_rule(
            "edit_account",
            Rule::predicate(|user, args| text(args, 0) == user.id().as_str()),
        )?;
        Ok(())
    }
}

pub fn packages() -> Arc<PackageRegistry> {
    let mut registry = PackageRegistry::new();
    registry
        .register::<TestPackage>()
        .unwrap()
        .register::<HigherPackage>()
        .unwrap()
        .register::<PartialPackage>()
        .unwrap()
        .register::<SelfServicePackage>()
        .unwrap()
        .register_with("impostor", || Package::new(&TestPackage))
        .unwrap()
        .register_toml(
            r#"
            name = "owner"

            [rules]
            view_profile = true
            delete_account = true
            "#,
        )
        .unwrap();
    Arc::new(registry)
}

pub struct Fixture {
    pub auth: TestAuth,
    pub sessions: Arc<MemorySessionStore>,
    pub records: Arc<SqliteRecordStore>,
    pub packages: Arc<PackageRegistry>,
    pub alex: StoredUser,
}

impl Fixture {
    /// Another instance over the same stores.
    pub fn instance(&self, name: &str) -> TestAuth {
        Auth::new(
            name,
            self.sessions.clone(),
            self.records.clone(),
            self.packages.clone(),
            AuthConfig::default().with_cost(1),
        )
    }

    pub fn create_user(&self, username: &str) -> StoredUser {
        let hash = self.auth.hash_password(PASSWORD).unwrap();
        self.records
            .create_user(INSTANCE, username, &hash, serde_json::json!({}))
            .unwrap()
    }
}

pub fn fixture() -> Fixture {
    let registry = packages();
    let sessions = Arc::new(MemorySessionStore::new());
    let records = Arc::new(SqliteRecordStore::in_memory(registry.clone()).unwrap());
    let auth = Auth::new(
        INSTANCE,
        sessions.clone(),
        records.clone(),
        registry.clone(),
        AuthConfig::default().with_cost(1),
    );

    let hash = auth.hash_password(PASSWORD).unwrap();
    let alex = records
        .create_user(INSTANCE, "alex", &hash, serde_json::json!({ "email": "alex@example.com" }))
        .unwrap();

    Fixture {
        auth,
        sessions,
        records,
        packages: registry,
        alex,
    }
}
