//! Tests for source definition loader

use super::*;
use crate::auth::Auth;
use crate::config::{ConfigRegistry, Environment};
use crate::decode::DecoderFormat;
use crate::http::HttpClient;
use crate::pagination::{PaginationConfig, StopCondition};
use crate::stream::Stream;
use crate::types::Method;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

const EXAMPLE: &str = r#"
name: example
configs:
  - { key: example.owner, type: string, argument_key: owner, secret: false }
  - { key: example.per_page, type: integer, default: 50, required: false }
auths: [BEARER, NO_AUTH]
streams:
  - name: issues
    description: Repository issues
    group: repo
    tags: [issues]
    records_path: "$.items"
    schema: { type: array }
    request:
      method: GET
      url: "https://api.example.com/{owner}/issues"
      headers: { Accept: application/json }
      params: { state: open, per_page: "{example.per_page}" }
    pagination:
      type: page_number
      param: page
      start: 1
      stop: { type: empty_page }
  - name: labels
    description: Static label list
"#;

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_example_definition() {
    let def = load_source_from_str(EXAMPLE).unwrap();
    assert_eq!(def.name, "example");
    assert_eq!(def.auths, vec![Auth::Bearer, Auth::NoAuth]);
    assert_eq!(def.configs.len(), 2);
    assert_eq!(def.configs[0].argument_key.as_deref(), Some("owner"));
    assert!(!def.configs[0].secret);
    assert!(def.configs[1].secret);
    assert_eq!(def.configs[1].kind, ConfigType::Integer);

    let issues = &def.streams[0];
    assert_eq!(issues.group.as_deref(), Some("repo"));
    assert_eq!(issues.tags, vec!["issues"]);
    assert_eq!(issues.records_path.as_deref(), Some("$.items"));
    assert_eq!(issues.format, DecoderFormat::Json);
    assert_eq!(
        issues.pagination,
        PaginationConfig::PageNumber {
            page_param: "page".to_string(),
            start_page: 1,
            page_size_param: None,
            page_size: None,
            stop: StopCondition::EmptyPage,
        }
    );

    let request = issues.request.as_ref().unwrap();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.params.get("state").map(String::as_str), Some("open"));

    assert!(def.streams[1].request.is_none());
    assert_eq!(def.streams[1].pagination, PaginationConfig::SinglePage);
}

#[test]
fn test_load_json_definition() {
    let json = r#"{
        "name": "json-source",
        "streams": [{"name": "items", "request": {"url": "https://x.test/items"}}]
    }"#;
    let def = load_source_from_str(json).unwrap();
    assert_eq!(def.name, "json-source");
    assert!(def.auths.is_empty());
    assert_eq!(def.streams[0].request.as_ref().unwrap().method, Method::GET);
}

#[test]
fn test_load_source_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.yaml");
    std::fs::write(&path, EXAMPLE).unwrap();

    let def = load_source(&path).unwrap();
    assert_eq!(def.streams.len(), 2);

    let missing = load_source(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, crate::Error::FileNotFound { .. }));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"streams": []}"#).unwrap();
    let err = load_source(&bad).unwrap_err();
    assert!(err.to_string().contains("bad.json"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test_case(
    "name: ''\nstreams: [{name: a}]",
    "name cannot be empty" ; "empty source name"
)]
#[test_case("name: s\nstreams: []", "at least one stream" ; "no streams")]
#[test_case(
    "name: s\nstreams: [{name: a}, {name: a}]",
    "Duplicate stream name 'a'" ; "duplicate streams"
)]
#[test_case(
    "name: s\nstreams: [{name: a, schema: {type: bogus}}]",
    "invalid schema" ; "bad schema"
)]
#[test_case(
    "name: s\nstreams: [{name: a, request: {url: 'https://x/{oops'}}]",
    "invalid template" ; "bad template"
)]
#[test_case(
    "name: s\nstreams: [{name: a, pagination: {type: link_header}}]",
    "pagination but no request" ; "pagination without request"
)]
#[test_case(
    "name: s\nconfigs: [{key: n, type: integer, valid_values: [a]}]\nstreams: [{name: a}]",
    "not a string" ; "valid values on integer"
)]
#[test_case(
    "name: s\nconfigs: [{key: n, type: integer, default: nope}]\nstreams: [{name: a}]",
    "invalid default" ; "bad default"
)]
#[test_case(
    "name: s\nauths: [OAUTH]\nstreams: [{name: a}]",
    "Failed to parse" ; "unknown auth"
)]
fn test_invalid_definitions(yaml: &str, expected: &str) {
    let err = load_source_from_str(yaml).unwrap_err();
    assert!(
        err.to_string().contains(expected),
        "'{err}' does not contain '{expected}'"
    );
}

// ============================================================================
// Building Tests
// ============================================================================

fn build(def: &SourceDefinition) -> crate::source::Source {
    let registry = Arc::new(ConfigRegistry::with_environment(Environment::fixed(
        Vec::<(String, String)>::new(),
    )));
    def.builder()
        .registry(registry)
        .transport(Arc::new(HttpClient::new().unwrap()))
        .build()
        .unwrap()
}

#[test]
fn test_builds_streams_and_pagination() {
    let def = load_source_from_str(EXAMPLE).unwrap();
    let source = build(&def);

    assert_eq!(source.name(), "example");
    assert_eq!(source.auths(), &[Auth::Bearer, Auth::NoAuth]);

    let Stream::Rest(issues) = source.stream("issues").unwrap() else {
        panic!("issues should be a REST stream");
    };
    assert_eq!(issues.records_path(), Some("$.items"));
    assert_eq!(issues.info().output_schema, Some(json!({"type": "array"})));
    assert!(matches!(
        issues.pagination(),
        Some(PaginationConfig::PageNumber { .. })
    ));

    let first = issues.next_request(issues.request(), None).unwrap().unwrap();
    assert_eq!(first.params.get("page").map(String::as_str), Some("1"));

    assert!(matches!(source.stream("labels").unwrap(), Stream::Base(_)));
}

#[test]
fn test_builds_config_declarations() {
    let def = load_source_from_str(EXAMPLE).unwrap();
    let source = build(&def);
    let registry = source.registry();

    registry.put_config("owner", json!("acme"));
    assert_eq!(registry.resolve("example.owner").unwrap(), Some(json!("acme")));
    assert_eq!(registry.resolve("example.per_page").unwrap(), Some(json!(50)));
    assert!(registry.is_registered(crate::auth::BEARER_TOKEN));
}

#[test]
fn test_stream_level_configs() {
    let yaml = r#"
name: scoped
streams:
  - name: events
    configs:
      - { key: events.since, argument_key: since, required: false, secret: false }
    request:
      url: "https://x.test/events"
      params: { since: "{since}" }
    format: jsonl
"#;
    let def = load_source_from_str(yaml).unwrap();
    let source = build(&def);
    assert!(source.registry().is_registered("since"));

    let Stream::Rest(events) = source.stream("events").unwrap() else {
        panic!("events should be a REST stream");
    };
    assert_eq!(events.decoder_config().format, DecoderFormat::Jsonl);
    assert_eq!(events.configs().len(), 1);
}

#[test]
fn test_definition_round_trip_serialization() {
    let def = load_source_from_str(EXAMPLE).unwrap();
    let yaml = serde_yaml::to_string(&def).unwrap();
    assert_eq!(load_source_from_str(&yaml).unwrap(), def);
}
