//! Tests for the config registry

use super::*;
use crate::error::Error;
use crate::input::{CatalogEntry, ConfigInput, InputKind, LinesInput};
use crate::types::ValueMap;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn registry() -> ConfigRegistry {
    ConfigRegistry::with_environment(Environment::fixed(Vec::<(String, String)>::new()))
}

fn configs(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ============================================================================
// Declaration Tests
// ============================================================================

#[test]
fn test_declaration_defaults() {
    let decl = ConfigDeclaration::string("brook.arg.repo");
    assert!(decl.is_secret());
    assert!(decl.is_required());
    assert!(decl.argument_key().is_none());
    assert!(decl.default_value().is_none());
    assert_eq!(decl.lookup_names(), vec!["brook.arg.repo"]);

    let decl = decl.with_argument_key("repo");
    assert_eq!(decl.lookup_names(), vec!["repo", "brook.arg.repo"]);
}

#[test_case(ConfigKind::Integer, json!("42"), json!(42) ; "integer from string")]
#[test_case(ConfigKind::Integer, json!(7), json!(7) ; "integer from integer")]
#[test_case(ConfigKind::Float, json!("1.5"), json!(1.5) ; "float from string")]
#[test_case(ConfigKind::Float, json!(3), json!(3.0) ; "float from integer")]
#[test_case(ConfigKind::Boolean, json!("TRUE"), json!(true) ; "bool from upper string")]
#[test_case(ConfigKind::Boolean, json!("false"), json!(false) ; "bool from string")]
#[test_case(ConfigKind::String { valid_values: None }, json!(10), json!("10") ; "string from number")]
#[test_case(ConfigKind::String { valid_values: None }, json!(true), json!("true") ; "string from bool")]
fn test_validate_coerces(kind: ConfigKind, input: Value, expected: Value) {
    let decl = ConfigDeclaration::new("k", kind);
    assert_eq!(decl.validate(Some(input)).unwrap(), Some(expected));
}

#[test_case(ConfigKind::Integer, json!("abc") ; "integer from text")]
#[test_case(ConfigKind::Integer, json!(1.5) ; "integer from fraction")]
#[test_case(ConfigKind::Integer, json!(true) ; "integer from bool")]
#[test_case(ConfigKind::Float, json!("x1") ; "float from text")]
#[test_case(ConfigKind::Boolean, json!("yes") ; "bool from yes")]
#[test_case(ConfigKind::Boolean, json!(1) ; "bool from number")]
#[test_case(ConfigKind::String { valid_values: None }, json!({"a": 1}) ; "string from object")]
fn test_validate_rejects_type(kind: ConfigKind, input: Value) {
    let decl = ConfigDeclaration::new("k", kind);
    let err = decl.validate(Some(input)).unwrap_err();
    assert!(matches!(err, Error::ConfigTypeInvalid { .. }), "got {err:?}");
}

#[test]
fn test_validate_required_null() {
    let decl = ConfigDeclaration::string("k");
    let err = decl.validate(None).unwrap_err();
    assert!(matches!(err, Error::ConfigValueInvalid { .. }));

    let err = decl.validate(Some(Value::Null)).unwrap_err();
    assert!(matches!(err, Error::ConfigValueInvalid { .. }));

    let optional = ConfigDeclaration::string("k").required(false);
    assert_eq!(optional.validate(None).unwrap(), None);
}

#[test]
fn test_validate_valid_values() {
    let decl = ConfigDeclaration::string("format").with_valid_values(["json", "jsonlines"]);
    assert_eq!(decl.validate(Some(json!("json"))).unwrap(), Some(json!("json")));

    let err = decl.validate(Some(json!("csv"))).unwrap_err();
    assert!(matches!(err, Error::ConfigValueInvalid { .. }));
    assert!(err.to_string().contains("csv"));
}

#[test]
fn test_validate_custom_validator() {
    let decl = ConfigDeclaration::integer("per_page").with_validator(|value| {
        match value.as_i64() {
            Some(n) if (1..=100).contains(&n) => Ok(()),
            _ => Err("must be between 1 and 100".to_string()),
        }
    });

    assert_eq!(decl.validate(Some(json!("50"))).unwrap(), Some(json!(50)));
    let err = decl.validate(Some(json!(500))).unwrap_err();
    assert!(err.to_string().contains("between 1 and 100"));
}

#[test]
fn test_describe_redacts_secrets() {
    let secret = ConfigDeclaration::string("token");
    let description = secret.describe(Some(json!("abc")));
    assert_eq!(description.value, Some(json!(REDACTED)));

    let description = secret.describe(None);
    assert_eq!(description.value, None);
    assert!(description.is_missing());

    let public = ConfigDeclaration::string("repo").secret(false).with_argument_key("r");
    let description = public.describe(Some(json!("octo")));
    assert_eq!(description.value, Some(json!("octo")));
    assert_eq!(description.simple(), "repo [r]");
}

// ============================================================================
// Registration Tests
// ============================================================================

#[test]
fn test_builtins_registered() {
    let registry = registry();
    assert!(registry.is_registered(OUTPUT_FORMAT));
    assert!(registry.is_registered(OUTPUT_TO));
    assert!(registry.is_registered(SCHEMA_VALIDATION));

    assert_eq!(registry.resolve(OUTPUT_FORMAT).unwrap(), Some(json!("jsonlines")));
    assert_eq!(registry.resolve_string(OUTPUT_TO).unwrap(), Some("stdout".to_string()));
    assert_eq!(registry.resolve_bool(SCHEMA_VALIDATION).unwrap(), Some(true));
}

#[test_case("a.b", None, "a.b", None ; "same key")]
#[test_case("a.b", Some("x"), "c.d", Some("x") ; "same alias")]
#[test_case("a.b", Some("x"), "x", None ; "key equals alias")]
#[test_case("a.b", None, "c.d", Some("a.b") ; "alias equals key")]
fn test_register_collision(key: &str, alias: Option<&str>, other_key: &str, other_alias: Option<&str>) {
    let registry = registry();
    let mut first = ConfigDeclaration::string(key);
    if let Some(alias) = alias {
        first = first.with_argument_key(alias);
    }
    registry.register(first).unwrap();

    let mut second = ConfigDeclaration::string(other_key);
    if let Some(alias) = other_alias {
        second = second.with_argument_key(alias);
    }
    let err = registry.register(second).unwrap_err();
    assert!(matches!(err, Error::ConfigAlreadySupported { .. }));
}

#[test]
fn test_ensure_registered_is_idempotent() {
    let registry = registry();
    let decl = ConfigDeclaration::string("brook.auth.bearer.token").required(false);
    registry.ensure_registered(decl.clone()).unwrap();
    registry.ensure_registered(decl).unwrap();

    let count = registry
        .declarations()
        .iter()
        .filter(|d| d.key() == "brook.auth.bearer.token")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_ensure_registered_rejects_conflicting_declaration() {
    let registry = registry();
    registry
        .ensure_registered(ConfigDeclaration::string("brook.arg.size").secret(false))
        .unwrap();

    for conflicting in [
        ConfigDeclaration::integer("brook.arg.size").secret(false),
        ConfigDeclaration::string("brook.arg.size"),
        ConfigDeclaration::string("brook.arg.size")
            .secret(false)
            .with_default("10"),
        ConfigDeclaration::string("brook.arg.size")
            .secret(false)
            .required(false),
    ] {
        assert!(matches!(
            registry.ensure_registered(conflicting).unwrap_err(),
            Error::ConfigAlreadySupported { ref key, .. } if key == "brook.arg.size"
        ));
    }

    let kind = registry.declaration("brook.arg.size").unwrap().kind().clone();
    assert_eq!(kind.name(), "string");
}

#[test]
fn test_unknown_key() {
    let registry = registry();
    assert!(matches!(
        registry.resolve("nope").unwrap_err(),
        Error::ConfigNotSupported { .. }
    ));
    assert!(matches!(
        registry.describe("nope").unwrap_err(),
        Error::ConfigNotSupported { .. }
    ));
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_scope_precedence() {
    let registry = registry();
    registry
        .register(
            ConfigDeclaration::string("brook.arg.repo")
                .with_default("default")
                .secret(false),
        )
        .unwrap();

    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("default")));

    registry.set_environment(Environment::fixed([("brook.arg.repo", "env")]));
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("env")));

    registry.put_config("brook.arg.repo", json!("config"));
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("config")));

    registry.set_catalog(Some(LinesInput::new(InputKind::Catalog, vec![])));
    registry.set_state(Some(LinesInput::new(InputKind::State, vec![])));

    let catalog_guard = registry
        .install_overlay(InputKind::Catalog, configs(&[("brook.arg.repo", json!("catalog"))]))
        .unwrap();
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("catalog")));

    let state_guard = registry
        .install_overlay(InputKind::State, configs(&[("brook.arg.repo", json!("state"))]))
        .unwrap();
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("state")));

    drop(state_guard);
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("catalog")));

    drop(catalog_guard);
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("config")));
    assert!(registry.overlay(InputKind::Catalog).is_none());
}

#[test]
fn test_alias_looked_up_before_key() {
    let registry = registry();
    registry
        .register(ConfigDeclaration::string("brook.arg.repo").with_argument_key("repo"))
        .unwrap();

    registry.set_config(Some(
        ConfigInput::from_value(json!({"brook.arg.repo": "by-key", "repo": "by-alias"})).unwrap(),
    ));
    assert_eq!(registry.resolve("brook.arg.repo").unwrap(), Some(json!("by-alias")));
    assert_eq!(registry.resolve("repo").unwrap(), Some(json!("by-alias")));
}

#[test]
fn test_overlay_alias_beats_lower_scope_key() {
    let registry = registry();
    registry
        .register(ConfigDeclaration::integer("brook.arg.page").with_argument_key("page"))
        .unwrap();
    registry.put_config("brook.arg.page", json!(1));
    registry.set_catalog(Some(LinesInput::new(InputKind::Catalog, vec![])));

    let _guard = registry
        .install_overlay(InputKind::Catalog, configs(&[("page", json!("5"))]))
        .unwrap();
    assert_eq!(registry.resolve_i64("brook.arg.page").unwrap(), Some(5));
}

#[test]
fn test_environment_values_are_coerced() {
    let registry =
        ConfigRegistry::with_environment(Environment::fixed([(SCHEMA_VALIDATION, "False")]));
    assert_eq!(registry.resolve_bool(SCHEMA_VALIDATION).unwrap(), Some(false));
}

#[test]
fn test_resolve_or_error() {
    let registry = registry();
    registry
        .register(ConfigDeclaration::string("token").required(false))
        .unwrap();
    registry.register(ConfigDeclaration::string("repo")).unwrap();

    assert_eq!(registry.resolve("token").unwrap(), None);
    assert!(matches!(
        registry.resolve_or_error("token").unwrap_err(),
        Error::ConfigNotFound { .. }
    ));

    // Required keys without a value are reported as not found, not invalid
    assert!(matches!(
        registry.resolve_or_error("repo").unwrap_err(),
        Error::ConfigNotFound { .. }
    ));
    assert!(matches!(
        registry.resolve("repo").unwrap_err(),
        Error::ConfigValueInvalid { .. }
    ));

    registry.put_config("token", json!("abc"));
    assert_eq!(registry.resolve_or_error("token").unwrap(), json!("abc"));
}

#[test]
fn test_invalid_config_value_surfaces() {
    let registry = registry();
    registry.put_config(OUTPUT_FORMAT, json!("csv"));
    assert!(matches!(
        registry.resolve(OUTPUT_FORMAT).unwrap_err(),
        Error::ConfigValueInvalid { .. }
    ));
}

// ============================================================================
// Describe Tests
// ============================================================================

#[test]
fn test_describe_all() {
    let registry = registry();
    registry
        .register(ConfigDeclaration::string("brook.auth.bearer.token").required(false))
        .unwrap();
    registry
        .register(ConfigDeclaration::string("brook.arg.repo").secret(false))
        .unwrap();
    registry.put_config("brook.auth.bearer.token", json!("s3cret"));

    let all = registry.describe_all().unwrap();
    let keys: Vec<&str> = all.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            OUTPUT_FORMAT,
            OUTPUT_TO,
            SCHEMA_VALIDATION,
            "brook.auth.bearer.token",
            "brook.arg.repo"
        ]
    );

    let token = &all[3];
    assert_eq!(token.value, Some(json!(REDACTED)));

    // Missing required value is shown as null rather than failing
    let repo = &all[4];
    assert_eq!(repo.value, None);
    assert!(repo.is_missing());

    let format = registry.describe(OUTPUT_FORMAT).unwrap();
    assert_eq!(format.value, Some(json!("jsonlines")));
    assert_eq!(
        format.valid_values,
        Some(vec!["json".to_string(), "jsonlines".to_string()])
    );
}

#[test]
fn test_describe_reports_wrong_type() {
    let registry = registry();
    registry
        .register(ConfigDeclaration::integer("brook.arg.per_page").secret(false))
        .unwrap();
    registry
        .register(
            ConfigDeclaration::string("brook.arg.state")
                .with_valid_values(["open", "closed"])
                .secret(false),
        )
        .unwrap();
    registry.put_config("brook.arg.state", json!("merged"));

    // A disallowed value is shown as null
    let state = registry.describe("brook.arg.state").unwrap();
    assert_eq!(state.value, None);

    registry.put_config("brook.arg.per_page", json!("many"));
    assert!(matches!(
        registry.describe("brook.arg.per_page").unwrap_err(),
        Error::ConfigTypeInvalid { .. }
    ));
    assert!(matches!(
        registry.describe_all().unwrap_err(),
        Error::ConfigTypeInvalid { ref key, .. } if key == "brook.arg.per_page"
    ));
}

#[test]
fn test_description_serializes() {
    let registry = registry();
    let value = serde_json::to_value(registry.describe(SCHEMA_VALIDATION).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "key": SCHEMA_VALIDATION,
            "value": true,
            "argument_key": null,
            "default_value": true,
            "is_secret": false,
            "is_required": true
        })
    );
}

// ============================================================================
// Input Tests
// ============================================================================

#[test]
fn test_overlay_requires_input() {
    let registry = registry();
    assert!(matches!(
        registry.install_overlay(InputKind::Catalog, ValueMap::new()).unwrap_err(),
        Error::CatalogInputRequired
    ));
    assert!(matches!(
        registry.install_overlay(InputKind::State, ValueMap::new()).unwrap_err(),
        Error::StateInputRequired
    ));
    assert!(registry.install_overlay(InputKind::Config, ValueMap::new()).is_err());
}

#[test]
fn test_catalog_and_state_entries() {
    let registry = registry();
    assert!(matches!(
        registry.catalog_entries().unwrap_err(),
        Error::CatalogInputRequired
    ));
    assert!(!registry.has_input(InputKind::Catalog));

    registry.set_catalog(Some(LinesInput::new(
        InputKind::Catalog,
        vec![CatalogEntry::new("issues"), CatalogEntry::new("pulls")],
    )));
    registry.set_state(Some(LinesInput::new(
        InputKind::State,
        vec![CatalogEntry::with_configs("pulls", configs(&[("page", json!(4))]))],
    )));

    assert!(registry.has_input(InputKind::Catalog));
    assert_eq!(registry.catalog_entries().unwrap().len(), 2);
    assert!(registry.state_entry("issues").is_none());
    assert_eq!(
        registry.state_entry("pulls").unwrap().configs.unwrap()["page"],
        json!(4)
    );
}
