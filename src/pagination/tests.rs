//! Tests for pagination module

use super::*;
use crate::decode::DecoderConfig;
use crate::http::{HttpRequest, HttpResponse};
use serde_json::json;

fn base() -> HttpRequest {
    HttpRequest::get("https://api.example.com/items").param("state", "open")
}

fn page(body: serde_json::Value) -> HttpResponse {
    HttpResponse::json_ok(&body)
}

// ============================================================================
// Single Page Tests
// ============================================================================

#[test]
fn test_single_page() {
    let hook = PaginationConfig::SinglePage.build(&DecoderConfig::json());
    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first, base());

    let after = hook.next_request(&first, Some(&page(json!([1])))).unwrap();
    assert!(after.is_none());
}

#[test]
fn test_closure_hook() {
    let hook = |previous: &HttpRequest,
                response: Option<&HttpResponse>|
     -> crate::error::Result<Option<HttpRequest>> {
        Ok(response.is_none().then(|| previous.clone().param("x", "1")))
    };
    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first.params.get("x"), Some(&"1".to_string()));
    assert!(hook.next_request(&first, Some(&page(json!([])))).unwrap().is_none());
}

// ============================================================================
// Page Number Tests
// ============================================================================

#[test]
fn test_page_number_sequence() {
    let hook = PaginationConfig::page_number("page", 1).build(&DecoderConfig::json());

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first.params.get("page"), Some(&"1".to_string()));
    assert_eq!(first.params.get("state"), Some(&"open".to_string()));

    let second = hook
        .next_request(&first, Some(&page(json!([{"id": 1}]))))
        .unwrap()
        .unwrap();
    assert_eq!(second.params.get("page"), Some(&"2".to_string()));

    // Empty page ends pagination
    assert!(hook.next_request(&second, Some(&page(json!([])))).unwrap().is_none());
}

#[test]
fn test_page_number_short_page() {
    let config = PaginationConfig::PageNumber {
        page_param: "p".to_string(),
        start_page: 0,
        page_size_param: Some("per_page".to_string()),
        page_size: Some(2),
        stop: StopCondition::EmptyPage,
    };
    let hook = config.build(&DecoderConfig::json().with_records_path("data"));

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first.params.get("p"), Some(&"0".to_string()));
    assert_eq!(first.params.get("per_page"), Some(&"2".to_string()));

    let full = page(json!({"data": [1, 2]}));
    let second = hook.next_request(&first, Some(&full)).unwrap().unwrap();
    assert_eq!(second.params.get("p"), Some(&"1".to_string()));

    let short = page(json!({"data": [3]}));
    assert!(hook.next_request(&second, Some(&short)).unwrap().is_none());
}

#[test]
fn test_page_number_total_pages() {
    let config = PaginationConfig::PageNumber {
        page_param: "page".to_string(),
        start_page: 1,
        page_size_param: None,
        page_size: None,
        stop: StopCondition::total_pages("meta.total_pages"),
    };
    let hook = config.build(&DecoderConfig::json().with_records_path("items"));

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    let body = json!({"items": [1], "meta": {"total_pages": 2}});
    let second = hook.next_request(&first, Some(&page(body.clone()))).unwrap().unwrap();
    assert!(hook.next_request(&second, Some(&page(body))).unwrap().is_none());
}

// ============================================================================
// Offset Tests
// ============================================================================

#[test]
fn test_offset_sequence() {
    let config = PaginationConfig::Offset {
        offset_param: "skip".to_string(),
        limit_param: "take".to_string(),
        limit_value: 2,
        stop: StopCondition::Never,
    };
    let hook = config.build(&DecoderConfig::json());

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first.params.get("skip"), Some(&"0".to_string()));
    assert_eq!(first.params.get("take"), Some(&"2".to_string()));

    let second = hook.next_request(&first, Some(&page(json!([1, 2])))).unwrap().unwrap();
    assert_eq!(second.params.get("skip"), Some(&"2".to_string()));

    assert!(hook.next_request(&second, Some(&page(json!([3])))).unwrap().is_none());
}

// ============================================================================
// Cursor Tests
// ============================================================================

#[test]
fn test_cursor_sequence() {
    let hook = PaginationConfig::cursor("starting_after", "$.meta.next").build(&DecoderConfig::json().with_records_path("data"));

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    assert_eq!(first, base());

    let body = json!({"data": [{"id": "a"}], "meta": {"next": "obj_1"}});
    let second = hook.next_request(&first, Some(&page(body))).unwrap().unwrap();
    assert_eq!(second.params.get("starting_after"), Some(&"obj_1".to_string()));

    let last = json!({"data": [{"id": "b"}], "meta": {"next": null}});
    assert!(hook.next_request(&second, Some(&page(last))).unwrap().is_none());
}

#[test]
fn test_cursor_field_stop() {
    let config = PaginationConfig::Cursor {
        cursor_param: "cursor".to_string(),
        cursor_path: "next_cursor".to_string(),
        stop: StopCondition::field("has_more", false),
    };
    let hook = config.build(&DecoderConfig::json());

    let body = json!({"next_cursor": "c2", "has_more": false});
    assert!(hook.next_request(&base(), Some(&page(body))).unwrap().is_none());
}

// ============================================================================
// Next URL / Link Header Tests
// ============================================================================

#[test]
fn test_next_url_absolute_and_relative() {
    let hook = PaginationConfig::next_url("links.next").build(&DecoderConfig::json());

    let first = hook.next_request(&base(), None).unwrap().unwrap();
    let body = json!({"links": {"next": "https://api.example.com/items?page=2"}});
    let second = hook.next_request(&first, Some(&page(body))).unwrap().unwrap();
    assert_eq!(second.url, "https://api.example.com/items?page=2");
    assert!(second.params.is_empty());

    let body = json!({"links": {"next": "/items?page=3"}});
    let third = hook.next_request(&second, Some(&page(body))).unwrap().unwrap();
    assert_eq!(third.url, "https://api.example.com/items?page=3");

    let body = json!({"links": {"next": null}});
    assert!(hook.next_request(&third, Some(&page(body))).unwrap().is_none());
}

#[test]
fn test_link_header() {
    let hook = PaginationConfig::link_header().build(&DecoderConfig::json());
    let first = base().header("Authorization", "Bearer t");

    let response = page(json!([1])).with_header(
        "Link",
        "<https://api.example.com/items?page=2>; rel=\"next\", <https://api.example.com/items?page=5>; rel=\"last\"",
    );
    let second = hook.next_request(&first, Some(&response)).unwrap().unwrap();
    assert_eq!(second.url, "https://api.example.com/items?page=2");
    assert_eq!(second.header_value("Authorization"), Some("Bearer t"));

    assert!(hook.next_request(&second, Some(&page(json!([2])))).unwrap().is_none());
}

#[test]
fn test_parse_link_header() {
    let header = r#"<https://x/?page=1>; rel="prev", <https://x/?page=3>; rel="next""#;
    assert_eq!(parse_link_header(header, "next"), Some("https://x/?page=3"));
    assert_eq!(parse_link_header(header, "prev"), Some("https://x/?page=1"));
    assert_eq!(parse_link_header(header, "last"), None);
    assert_eq!(parse_link_header("<https://x>; rel=\"next last\"", "last"), Some("https://x"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_pagination_config_deserialize() {
    let config: PaginationConfig = serde_yaml::from_str(
        "type: page_number\npage_size_param: per_page\npage_size: 50\nstop:\n  type: total_pages\n  path: meta.pages\n",
    )
    .unwrap();
    assert_eq!(
        config,
        PaginationConfig::PageNumber {
            page_param: "page".to_string(),
            start_page: 1,
            page_size_param: Some("per_page".to_string()),
            page_size: Some(50),
            stop: StopCondition::total_pages("meta.pages"),
        }
    );

    let config: PaginationConfig =
        serde_yaml::from_str("type: cursor\ncursor_param: after\ncursor_path: $.next\n").unwrap();
    assert_eq!(config, PaginationConfig::cursor("after", "$.next"));

    let config: PaginationConfig = serde_yaml::from_str("type: link_header\n").unwrap();
    assert_eq!(config, PaginationConfig::link_header());

    assert_eq!(PaginationConfig::default(), PaginationConfig::SinglePage);
}

#[test]
fn test_page_number_jsonl_pages() {
    let hook = PaginationConfig::page_number("page", 1).build(&DecoderConfig::jsonl());
    let first = hook.next_request(&base(), None).unwrap().unwrap();

    let lines = HttpResponse::new(200, "{\"id\":1}\n{\"id\":2}\n");
    let second = hook.next_request(&first, Some(&lines)).unwrap().unwrap();
    assert_eq!(second.params.get("page"), Some(&"2".to_string()));

    let empty = HttpResponse::new(200, "\n");
    assert!(hook.next_request(&second, Some(&empty)).unwrap().is_none());
}

#[test]
fn test_cursor_jsonl_last_line() {
    let hook = PaginationConfig::cursor("after", "$[-1].id").build(&DecoderConfig::jsonl());
    let lines = HttpResponse::new(200, "{\"id\":\"a\"}\n{\"id\":\"b\"}\n");
    let next = hook.next_request(&base(), Some(&lines)).unwrap().unwrap();
    assert_eq!(next.params.get("after"), Some(&"b".to_string()));
}

#[test]
fn test_undecodable_page_is_decode_error() {
    let hook = PaginationConfig::page_number("page", 1).build(&DecoderConfig::json());
    let html = HttpResponse::new(200, "<html></html>");
    let err = hook.next_request(&base(), Some(&html)).unwrap_err();
    assert!(err.is_decode_error());

    let hook = PaginationConfig::page_number("page", 1).build(&DecoderConfig::jsonl());
    let err = hook.next_request(&base(), Some(&html)).unwrap_err();
    assert!(err.is_decode_error());
}

#[test]
fn test_count_records() {
    assert_eq!(count_records(&json!([1, 2, 3]), None).unwrap(), 3);
    assert_eq!(count_records(&json!({"a": 1}), None).unwrap(), 1);
    assert_eq!(count_records(&json!(null), None).unwrap(), 0);
    assert_eq!(count_records(&json!({"items": [1]}), Some("items")).unwrap(), 1);
    assert_eq!(count_records(&json!({"items": [1]}), Some("missing")).unwrap(), 0);
}
