//! Tests for the HTTP module

use super::*;
use crate::types::Method;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Request / Response Tests
// ============================================================================

#[test]
fn test_request_builder() {
    let request = HttpRequest::get("https://api.example.com/items")
        .header("Accept", "application/json")
        .param("page", "1")
        .param("per_page", "50");

    assert_eq!(request.method, Method::GET);
    assert_eq!(request.header_value("accept"), Some("application/json"));
    assert_eq!(request.params.get("page"), Some(&"1".to_string()));
    assert!(request.body.is_none());
}

#[test]
fn test_full_url() {
    let request = HttpRequest::get("https://api.example.com/items?state=open")
        .param("page", "2")
        .param("q", "a b");
    let url = request.full_url().unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.example.com/items?state=open&page=2&q=a+b"
    );

    let plain = HttpRequest::get("https://api.example.com/items");
    assert_eq!(plain.full_url().unwrap().as_str(), "https://api.example.com/items");

    assert!(HttpRequest::get("not a url").full_url().is_err());
}

#[test]
fn test_response_helpers() {
    let response = HttpResponse::json_ok(&json!({"a": 1}))
        .with_url("https://api.example.com")
        .with_header("Link", "<https://api.example.com?page=2>; rel=\"next\"");

    assert!(response.is_ok());
    assert_eq!(response.json().unwrap(), json!({"a": 1}));
    assert!(response.header("link").is_some());
    assert!(response.header("LINK").is_some());

    let response = HttpResponse::new(201, "not json");
    assert!(!response.is_ok());
    assert!(response.json().is_err());
    assert_eq!(response.text(), "not json");
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");

    let default = HttpClientConfig::default();
    assert_eq!(default.timeout, Duration::from_secs(30));
    assert!(default.user_agent.starts_with("brook-cdk/"));
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_send_get_with_headers_and_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "3"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("X-Default", "yes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1}]))
                .insert_header("X-Total", "10"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(HttpClientConfig::builder().header("X-Default", "yes").build())
        .unwrap();
    let request = HttpRequest::get(format!("{}/items", server.uri()))
        .header("Authorization", "Bearer abc")
        .param("page", "3");

    let response = client.send(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(response.header("x-total"), Some("10"));
    assert_eq!(response.json().unwrap(), json!([{"id": 1}]));
    assert!(response.url.contains("page=3"));
}

#[tokio::test]
async fn test_send_post_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"query": "rust"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let request = HttpRequest::new(Method::POST, format!("{}/search", server.uri()))
        .json(json!({"query": "rust"}));

    let response = client.send(&request).await.unwrap();
    assert_eq!(response.json().unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn test_error_status_is_returned_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .send(&HttpRequest::get(format!("{}/missing", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.reason, "Not Found");
    assert_eq!(response.text(), "nope");
}

#[tokio::test]
async fn test_invalid_url() {
    let client = HttpClient::new().unwrap();
    let err = client.send(&HttpRequest::get("::bad::")).await.unwrap_err();
    assert!(matches!(err, crate::error::Error::InvalidUrl(_)));
}
