//! Placeholder interpolation for request templates
//!
//! Request URLs, header values, query parameter values and string leaves
//! of a JSON body may contain `{key}` placeholders naming a config key or
//! alias. `{{` and `}}` render as literal braces.

use crate::config::ConfigRegistry;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Matches escapes, placeholders and stray braces in a single pass
static TEMPLATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("valid template regex"));

/// One lexical piece of a template
enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let Some(whole) = cap.get(0) else { continue };
        if whole.start() > last {
            tokens.push(Token::Literal(&template[last..whole.start()]));
        }
        last = whole.end();

        match (whole.as_str(), cap.get(1)) {
            ("{{", _) => tokens.push(Token::Literal("{")),
            ("}}", _) => tokens.push(Token::Literal("}")),
            (_, Some(name)) => {
                let name = name.as_str().trim();
                if name.is_empty() {
                    return Err(Error::template(format!(
                        "Empty placeholder at position {} in '{template}'",
                        whole.start()
                    )));
                }
                tokens.push(Token::Placeholder(name));
            }
            (brace, None) => {
                return Err(Error::template(format!(
                    "Unmatched '{brace}' at position {} in '{template}'",
                    whole.start()
                )));
            }
        }
    }

    if last < template.len() {
        tokens.push(Token::Literal(&template[last..]));
    }
    Ok(tokens)
}

/// Check if a string contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    tokenize(s).is_ok_and(|tokens| tokens.iter().any(|t| matches!(t, Token::Placeholder(_))))
}

/// Extract placeholder names in order of first appearance, without duplicates
pub fn extract_placeholders(template: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for token in tokenize(template)? {
        if let Token::Placeholder(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Render a template, looking each placeholder up with `lookup`
pub fn render<F>(template: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Value>,
{
    let mut result = String::with_capacity(template.len());
    for token in tokenize(template)? {
        match token {
            Token::Literal(text) => result.push_str(text),
            Token::Placeholder(name) => result.push_str(&value_to_string(&lookup(name)?)),
        }
    }
    Ok(result)
}

/// Render a template with values from the config registry
///
/// Every placeholder must resolve; a missing key is an error rather than
/// an empty substitution.
pub fn render_with_registry(template: &str, registry: &ConfigRegistry) -> Result<String> {
    render(template, |key| registry.resolve_or_error(key))
}

/// Render all string leaves of a JSON value (object keys are left as-is)
pub fn render_value(value: &Value, registry: &ConfigRegistry) -> Result<Value> {
    match value {
        Value::String(s) if has_placeholders(s) => {
            Ok(Value::String(render_with_registry(s, registry)?))
        }
        Value::Object(map) => {
            let mut rendered = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                rendered.insert(k.clone(), render_value(v, registry)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, registry))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

/// Convert a JSON value to a string for substitution
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
