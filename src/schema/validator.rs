//! Structural JSON Schema validation
//!
//! Supports the assertion keywords of drafts 4 to 2020-12 that output
//! schemas use: `type`, `enum`, `const`, local `$ref` (into `definitions`,
//! `$defs` or any JSON pointer of the root), object keywords (`properties`,
//! `patternProperties`, `additionalProperties`, `required`,
//! `propertyNames`, `dependencies`, `dependentRequired`,
//! `dependentSchemas`, `minProperties`, `maxProperties`), array keywords
//! (`items`, `additionalItems`, `contains`, `minItems`, `maxItems`,
//! `uniqueItems`), string length and `pattern`, numeric bounds and
//! `multipleOf`, and the `allOf`/`anyOf`/`oneOf`/`not`/`if` combinators.
//!
//! `format` is an annotation and is not asserted. [`check_schema`] rejects
//! any other keyword, so a schema never silently passes what it claims to
//! forbid.

use super::types::{JsonTypeOrArray, SchemaViolation};
use crate::types::{json_type_name, JsonObject, JsonValue};
use regex::Regex;

type Outcome = Result<(), SchemaViolation>;

/// Nested `$ref` hops before a schema is considered cyclic
const MAX_REF_DEPTH: usize = 64;

/// Keywords that carry no assertion
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "id",
    "$comment",
    "$anchor",
    "title",
    "description",
    "default",
    "examples",
    "readOnly",
    "writeOnly",
    "deprecated",
    "format",
    "contentMediaType",
    "contentEncoding",
    "definitions",
    "$defs",
];

/// Keywords the validator enforces
const ASSERTIONS: &[&str] = &[
    "$ref",
    "type",
    "enum",
    "const",
    "properties",
    "patternProperties",
    "additionalProperties",
    "required",
    "propertyNames",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "minProperties",
    "maxProperties",
    "items",
    "additionalItems",
    "contains",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minLength",
    "maxLength",
    "pattern",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
];

/// Validate an instance against a schema, reporting the first violation
pub fn validate_instance(instance: &JsonValue, schema: &JsonValue) -> Outcome {
    Validator { root: schema }.validate(instance, schema, "$", 0)
}

/// Check that a schema is well-formed and only uses supported keywords
///
/// Type names, patterns and `$ref` targets are checked as well.
pub fn check_schema(schema: &JsonValue) -> Outcome {
    Validator { root: schema }.check(schema, "$")
}

struct Validator<'s> {
    root: &'s JsonValue,
}

impl<'s> Validator<'s> {
    fn resolve(&self, reference: &str, path: &str) -> Result<&'s JsonValue, SchemaViolation> {
        let pointer = reference.strip_prefix('#').ok_or_else(|| {
            SchemaViolation::new(path, format!("unsupported non-local reference '{reference}'"))
        })?;
        if pointer.is_empty() {
            return Ok(self.root);
        }
        self.root
            .pointer(pointer)
            .ok_or_else(|| SchemaViolation::new(path, format!("unresolved reference '{reference}'")))
    }

    fn validate(&self, instance: &JsonValue, schema: &JsonValue, path: &str, depth: usize) -> Outcome {
        let schema = match schema {
            JsonValue::Bool(true) => return Ok(()),
            JsonValue::Bool(false) => {
                return Err(SchemaViolation::new(path, "no value is allowed"))
            }
            JsonValue::Object(map) => map,
            _ => return Err(SchemaViolation::new(path, "schema must be an object or a boolean")),
        };

        if let Some(reference) = schema.get("$ref") {
            if depth >= MAX_REF_DEPTH {
                return Err(SchemaViolation::new(path, "reference nesting is too deep"));
            }
            let reference = reference
                .as_str()
                .ok_or_else(|| SchemaViolation::new(path, "$ref must be a string"))?;
            let target = self.resolve(reference, path)?;
            self.validate(instance, target, path, depth + 1)?;
        }

        if let Some(types) = schema.get("type") {
            let types =
                JsonTypeOrArray::from_schema(types).map_err(|m| SchemaViolation::new(path, m))?;
            if !types.matches(instance) {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected {types}, got {}", json_type_name(instance)),
                ));
            }
        }

        if let Some(JsonValue::Array(options)) = schema.get("enum") {
            if !options.contains(instance) {
                let options = JsonValue::Array(options.clone());
                return Err(SchemaViolation::new(
                    path,
                    format!("{instance} is not one of {options}"),
                ));
            }
        }

        if let Some(expected) = schema.get("const") {
            if expected != instance {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected {expected}, got {instance}"),
                ));
            }
        }

        match instance {
            JsonValue::Object(object) => self.validate_object(object, schema, path, depth)?,
            JsonValue::Array(items) => self.validate_array(items, schema, path, depth)?,
            JsonValue::String(s) => validate_string(s, schema, path)?,
            JsonValue::Number(n) => {
                if let Some(value) = n.as_f64() {
                    validate_number(value, schema, path)?;
                }
            }
            _ => {}
        }

        self.validate_combinators(instance, schema, path, depth)
    }

    fn validate_object(
        &self,
        object: &JsonObject,
        schema: &JsonObject,
        path: &str,
        depth: usize,
    ) -> Outcome {
        if let Some(JsonValue::Array(required)) = schema.get("required") {
            for name in required.iter().filter_map(JsonValue::as_str) {
                if !object.contains_key(name) {
                    return Err(SchemaViolation::new(
                        path,
                        format!("missing required property '{name}'"),
                    ));
                }
            }
        }

        let count = object.len() as u64;
        if let Some(min) = schema.get("minProperties").and_then(JsonValue::as_u64) {
            if count < min {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at least {min} properties, got {count}"),
                ));
            }
        }
        if let Some(max) = schema.get("maxProperties").and_then(JsonValue::as_u64) {
            if count > max {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at most {max} properties, got {count}"),
                ));
            }
        }

        let properties = schema.get("properties").and_then(JsonValue::as_object);
        let patterns = match schema.get("patternProperties").and_then(JsonValue::as_object) {
            Some(patterns) => patterns
                .iter()
                .map(|(pattern, sub)| Ok((compile(pattern, path)?, sub)))
                .collect::<Result<Vec<_>, SchemaViolation>>()?,
            None => Vec::new(),
        };
        let additional = schema.get("additionalProperties");
        let names = schema.get("propertyNames");

        for (name, value) in object {
            let child = format!("{path}.{name}");
            if let Some(names) = names {
                self.validate(&JsonValue::String(name.clone()), names, &child, depth)?;
            }

            let mut matched = false;
            if let Some(property) = properties.and_then(|p| p.get(name)) {
                matched = true;
                self.validate(value, property, &child, depth)?;
            }
            for (regex, sub) in &patterns {
                if regex.is_match(name) {
                    matched = true;
                    self.validate(value, sub, &child, depth)?;
                }
            }

            if !matched {
                match additional {
                    Some(JsonValue::Bool(false)) => {
                        return Err(SchemaViolation::new(
                            path,
                            format!("additional property '{name}' is not allowed"),
                        ));
                    }
                    Some(extra) if extra.is_object() => {
                        self.validate(value, extra, &child, depth)?;
                    }
                    _ => {}
                }
            }
        }

        self.validate_dependencies(object, schema, path, depth)
    }

    fn validate_dependencies(
        &self,
        object: &JsonObject,
        schema: &JsonObject,
        path: &str,
        depth: usize,
    ) -> Outcome {
        for keyword in ["dependencies", "dependentRequired", "dependentSchemas"] {
            let Some(dependencies) = schema.get(keyword).and_then(JsonValue::as_object) else {
                continue;
            };
            for (name, dependency) in dependencies {
                if !object.contains_key(name) {
                    continue;
                }
                match dependency {
                    JsonValue::Array(needed) => {
                        for other in needed.iter().filter_map(JsonValue::as_str) {
                            if !object.contains_key(other) {
                                return Err(SchemaViolation::new(
                                    path,
                                    format!("property '{name}' requires property '{other}'"),
                                ));
                            }
                        }
                    }
                    sub => {
                        let instance = JsonValue::Object(object.clone());
                        self.validate(&instance, sub, path, depth)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_array(
        &self,
        items: &[JsonValue],
        schema: &JsonObject,
        path: &str,
        depth: usize,
    ) -> Outcome {
        if let Some(min) = schema.get("minItems").and_then(JsonValue::as_u64) {
            if (items.len() as u64) < min {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at least {min} items, got {}", items.len()),
                ));
            }
        }
        if let Some(max) = schema.get("maxItems").and_then(JsonValue::as_u64) {
            if (items.len() as u64) > max {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at most {max} items, got {}", items.len()),
                ));
            }
        }
        if schema.get("uniqueItems") == Some(&JsonValue::Bool(true)) {
            for (i, item) in items.iter().enumerate() {
                if items[..i].contains(item) {
                    return Err(SchemaViolation::new(format!("{path}[{i}]"), "duplicate item"));
                }
            }
        }

        match schema.get("items") {
            Some(JsonValue::Array(positional)) => {
                for (i, (item, item_schema)) in items.iter().zip(positional).enumerate() {
                    self.validate(item, item_schema, &format!("{path}[{i}]"), depth)?;
                }
                if let Some(extra) = schema.get("additionalItems") {
                    for (i, item) in items.iter().enumerate().skip(positional.len()) {
                        self.validate(item, extra, &format!("{path}[{i}]"), depth)?;
                    }
                }
            }
            Some(item_schema) => {
                for (i, item) in items.iter().enumerate() {
                    self.validate(item, item_schema, &format!("{path}[{i}]"), depth)?;
                }
            }
            None => {}
        }

        if let Some(contains) = schema.get("contains") {
            if !items
                .iter()
                .any(|item| self.validate(item, contains, path, depth).is_ok())
            {
                return Err(SchemaViolation::new(
                    path,
                    "no item matches the schema in contains",
                ));
            }
        }

        Ok(())
    }

    fn validate_combinators(
        &self,
        instance: &JsonValue,
        schema: &JsonObject,
        path: &str,
        depth: usize,
    ) -> Outcome {
        let subschemas = |key: &str| {
            schema
                .get(key)
                .and_then(JsonValue::as_array)
                .map(Vec::as_slice)
        };
        let matches = |sub: &JsonValue| self.validate(instance, sub, path, depth).is_ok();

        if let Some(all) = subschemas("allOf") {
            for sub in all {
                self.validate(instance, sub, path, depth)?;
            }
        }

        if let Some(any) = subschemas("anyOf") {
            if !any.iter().any(matches) {
                return Err(SchemaViolation::new(path, "does not match any schema in anyOf"));
            }
        }

        if let Some(one) = subschemas("oneOf") {
            let matched = one.iter().filter(|sub| matches(*sub)).count();
            if matched != 1 {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected exactly one schema in oneOf to match, {matched} did"),
                ));
            }
        }

        if let Some(not) = schema.get("not") {
            if matches(not) {
                return Err(SchemaViolation::new(path, "must not match the schema in not"));
            }
        }

        if let Some(condition) = schema.get("if") {
            let branch = if matches(condition) { "then" } else { "else" };
            if let Some(sub) = schema.get(branch) {
                self.validate(instance, sub, path, depth)?;
            }
        }

        Ok(())
    }

    fn check(&self, schema: &JsonValue, path: &str) -> Outcome {
        let schema = match schema {
            JsonValue::Bool(_) => return Ok(()),
            JsonValue::Object(map) => map,
            other => {
                return Err(SchemaViolation::new(
                    path,
                    format!(
                        "schema must be an object or a boolean, got {}",
                        json_type_name(other)
                    ),
                ))
            }
        };

        for keyword in schema.keys() {
            let known = ANNOTATIONS.contains(&keyword.as_str())
                || ASSERTIONS.contains(&keyword.as_str())
                || keyword.starts_with("x-");
            if !known {
                return Err(SchemaViolation::new(
                    path,
                    format!("unsupported keyword '{keyword}'"),
                ));
            }
        }

        if let Some(types) = schema.get("type") {
            JsonTypeOrArray::from_schema(types).map_err(|m| SchemaViolation::new(path, m))?;
        }

        if let Some(reference) = schema.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| SchemaViolation::new(path, "$ref must be a string"))?;
            self.resolve(reference, path)?;
        }

        if let Some(pattern) = schema.get("pattern") {
            let pattern = pattern
                .as_str()
                .ok_or_else(|| SchemaViolation::new(path, "pattern must be a string"))?;
            compile(pattern, path)?;
        }

        for key in [
            "properties",
            "patternProperties",
            "definitions",
            "$defs",
            "dependentSchemas",
        ] {
            if let Some(JsonValue::Object(subs)) = schema.get(key) {
                for (name, sub) in subs {
                    if key == "patternProperties" {
                        compile(name, path)?;
                    }
                    self.check(sub, &format!("{path}.{key}.{name}"))?;
                }
            }
        }

        if let Some(JsonValue::Object(dependencies)) = schema.get("dependencies") {
            for (name, dependency) in dependencies {
                if !dependency.is_array() {
                    self.check(dependency, &format!("{path}.dependencies.{name}"))?;
                }
            }
        }

        match schema.get("items") {
            Some(JsonValue::Array(positional)) => {
                for (i, item) in positional.iter().enumerate() {
                    self.check(item, &format!("{path}.items[{i}]"))?;
                }
            }
            Some(item) => self.check(item, &format!("{path}.items"))?,
            None => {}
        }

        for key in [
            "additionalProperties",
            "additionalItems",
            "propertyNames",
            "contains",
            "not",
            "if",
            "then",
            "else",
        ] {
            if let Some(sub) = schema.get(key) {
                self.check(sub, &format!("{path}.{key}"))?;
            }
        }

        for key in ["allOf", "anyOf", "oneOf"] {
            if let Some(JsonValue::Array(subs)) = schema.get(key) {
                for (i, sub) in subs.iter().enumerate() {
                    self.check(sub, &format!("{path}.{key}[{i}]"))?;
                }
            }
        }

        Ok(())
    }
}

fn compile(pattern: &str, path: &str) -> Result<Regex, SchemaViolation> {
    Regex::new(pattern)
        .map_err(|e| SchemaViolation::new(path, format!("invalid pattern '{pattern}': {e}")))
}

fn validate_string(s: &str, schema: &JsonObject, path: &str) -> Outcome {
    let length = s.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(JsonValue::as_u64) {
        if length < min {
            return Err(SchemaViolation::new(
                path,
                format!("expected at least {min} characters, got {length}"),
            ));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(JsonValue::as_u64) {
        if length > max {
            return Err(SchemaViolation::new(
                path,
                format!("expected at most {max} characters, got {length}"),
            ));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(JsonValue::as_str) {
        if !compile(pattern, path)?.is_match(s) {
            return Err(SchemaViolation::new(
                path,
                format!("'{s}' does not match pattern '{pattern}'"),
            ));
        }
    }
    Ok(())
}

fn validate_number(value: f64, schema: &JsonObject, path: &str) -> Outcome {
    let bound = |key: &str| schema.get(key).and_then(JsonValue::as_f64);

    if let Some(min) = bound("minimum") {
        if value < min {
            return Err(SchemaViolation::new(path, format!("{value} is less than {min}")));
        }
    }
    if let Some(max) = bound("maximum") {
        if value > max {
            return Err(SchemaViolation::new(path, format!("{value} is greater than {max}")));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if value <= min {
            return Err(SchemaViolation::new(
                path,
                format!("{value} is not greater than {min}"),
            ));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if value >= max {
            return Err(SchemaViolation::new(path, format!("{value} is not less than {max}")));
        }
    }
    if let Some(step) = bound("multipleOf").filter(|step| *step > 0.0) {
        let quotient = value / step;
        if (quotient - quotient.round()).abs() > 1e-9 {
            return Err(SchemaViolation::new(
                path,
                format!("{value} is not a multiple of {step}"),
            ));
        }
    }
    Ok(())
}
