//! # Schema Pre-Check
//!
//! The structural pre-check run before the engine. It is pluggable through
//! [`SchemaCheck`]; [`JsonSchema`] is the in-crate implementation and covers
//! the JSON-Schema keywords argument schemas use:
//!
//! `type`, `enum`, `const`, `required`, `properties`, `additionalProperties`,
//! `items`, `minItems`, `minLength`, `minimum`, `maximum`, `allOf`,
//! `if`/`then`/`else`.
//!
//! Annotation keywords (`$schema`, `title`, `description` and the like) are
//! accepted and ignored. Any other keyword is rejected when the schema is
//! loaded, so a schema written for the full dialect fails as unavailable
//! instead of silently passing documents it would reject. Keywords are
//! applied in the order they appear in the schema, so violation order is
//! stable for a given schema.

use crate::diagnostic::{Category, Diagnostic};
use crate::types::ArgcheckError;
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// PATHS & MESSAGES
// =============================================================================

/// Extend a JSON path with an object key: `$.a` + `b` -> `$.a.b`.
#[must_use]
pub fn path_key(base: &str, key: &str) -> String {
    format!("{base}.{key}")
}

/// Extend a JSON path with an array index: `$.a` + `0` -> `$.a[0]`.
#[must_use]
pub fn path_index(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

/// Violation messages shared by the schema checker and the document model,
/// so that the same problem found by both renders identically.
pub(crate) mod messages {
    use serde_json::Value;

    pub(crate) fn required(field: &str) -> String {
        format!("'{field}' is a required property")
    }

    pub(crate) fn type_mismatch(value: &Value, expected: &str) -> String {
        format!("{} is not of type '{expected}'", render(value))
    }

    pub(crate) fn below_minimum(value: &Value, bound: f64) -> String {
        format!("{} is less than the minimum of {bound}", render(value))
    }

    pub(crate) fn above_maximum(value: &Value, bound: f64) -> String {
        format!("{} is greater than the maximum of {bound}", render(value))
    }

    pub(crate) fn empty_list() -> String {
        "[] should be non-empty".to_string()
    }

    pub(crate) fn too_short(value: &Value) -> String {
        format!("{} is too short", render(value))
    }

    pub(crate) fn duplicate_id(id: &str) -> String {
        format!("duplicate statement id '{id}'")
    }

    /// Render a value the way schema messages quote it.
    pub(crate) fn render(value: &Value) -> String {
        match value {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{s}'"),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(render).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Object(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("'{k}': {}", render(v)))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

// =============================================================================
// SCHEMA CHECK TRAIT
// =============================================================================

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `$.arguments[0].premises[1]`.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl SchemaViolation {
    /// Convert into a `SCHEMA:` diagnostic.
    #[must_use]
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(Category::Schema, self.to_string())
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A structural pre-check over the raw parsed document.
///
/// Implementations must be total: every problem is a returned violation,
/// never a panic or an error.
pub trait SchemaCheck: Send + Sync {
    /// Check the document and return every violation found.
    fn check(&self, document: &Value) -> Vec<SchemaViolation>;
}

// =============================================================================
// JSON SCHEMA SUBSET
// =============================================================================

/// A parsed JSON-Schema document.
#[derive(Debug, Clone)]
pub struct JsonSchema {
    root: Value,
}

impl JsonSchema {
    /// Wrap a schema value. Only objects and booleans are schemas, and every
    /// keyword must be one this checker applies or an annotation.
    pub fn from_value(root: Value) -> Result<Self, ArgcheckError> {
        supported(&root, "$")?;
        Ok(Self { root })
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ArgcheckError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| ArgcheckError::SchemaUnavailable(format!("invalid schema JSON: {e}")))?;
        Self::from_value(root)
    }
}

/// Keywords the checker applies.
const APPLIED_KEYWORDS: &[&str] = &[
    "type",
    "enum",
    "const",
    "required",
    "properties",
    "additionalProperties",
    "items",
    "minItems",
    "minLength",
    "minimum",
    "maximum",
    "allOf",
    "if",
    "then",
    "else",
];

/// Keywords that never affect validation.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
];

/// Walk a schema and reject keywords the checker would not apply.
fn supported(schema: &Value, path: &str) -> Result<(), ArgcheckError> {
    let keywords = match schema {
        Value::Bool(_) => return Ok(()),
        Value::Object(keywords) => keywords,
        other => {
            return Err(ArgcheckError::SchemaUnavailable(format!(
                "schema at {path} must be an object or boolean, found {}",
                messages::render(other)
            )));
        }
    };

    for (keyword, argument) in keywords {
        let here = path_key(path, keyword);
        match keyword.as_str() {
            "properties" => {
                if let Value::Object(properties) = argument {
                    for (name, sub) in properties {
                        supported(sub, &path_key(&here, name))?;
                    }
                }
            }
            "allOf" => {
                if let Value::Array(schemas) = argument {
                    for (i, sub) in schemas.iter().enumerate() {
                        supported(sub, &path_index(&here, i))?;
                    }
                }
            }
            "items" | "additionalProperties" | "if" | "then" | "else" => {
                supported(argument, &here)?;
            }
            name if APPLIED_KEYWORDS.contains(&name) || ANNOTATION_KEYWORDS.contains(&name) => {}
            name => {
                return Err(ArgcheckError::SchemaUnavailable(format!(
                    "unsupported schema keyword '{name}' at {path}"
                )));
            }
        }
    }
    Ok(())
}

impl SchemaCheck for JsonSchema {
    fn check(&self, document: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        validate(&self.root, document, "$", &mut violations);
        violations
    }
}

fn validate(schema: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let keywords = match schema {
        Value::Bool(true) => return,
        Value::Bool(false) => {
            out.push(violation(
                path,
                format!("False schema does not allow {}", messages::render(instance)),
            ));
            return;
        }
        Value::Object(keywords) => keywords,
        _ => return,
    };

    for (keyword, argument) in keywords {
        match keyword.as_str() {
            "type" => check_type(argument, instance, path, out),
            "enum" => check_enum(argument, instance, path, out),
            "const" => {
                if argument != instance {
                    out.push(violation(
                        path,
                        format!("{} was expected", messages::render(argument)),
                    ));
                }
            }
            "required" => check_required(argument, instance, path, out),
            "properties" => check_properties(argument, instance, path, out),
            "additionalProperties" => check_additional(keywords, argument, instance, path, out),
            "items" => {
                if let Value::Array(items) = instance {
                    for (i, item) in items.iter().enumerate() {
                        validate(argument, item, &path_index(path, i), out);
                    }
                }
            }
            "minItems" => {
                if let (Value::Array(items), Some(min)) = (instance, argument.as_u64()) {
                    if (items.len() as u64) < min {
                        let message = if items.is_empty() && min == 1 {
                            messages::empty_list()
                        } else {
                            messages::too_short(instance)
                        };
                        out.push(violation(path, message));
                    }
                }
            }
            "minLength" => {
                if let (Value::String(s), Some(min)) = (instance, argument.as_u64()) {
                    if (s.chars().count() as u64) < min {
                        out.push(violation(path, messages::too_short(instance)));
                    }
                }
            }
            "minimum" => {
                if let (Some(value), Some(bound)) = (instance.as_f64(), argument.as_f64()) {
                    if value < bound {
                        out.push(violation(path, messages::below_minimum(instance, bound)));
                    }
                }
            }
            "maximum" => {
                if let (Some(value), Some(bound)) = (instance.as_f64(), argument.as_f64()) {
                    if value > bound {
                        out.push(violation(path, messages::above_maximum(instance, bound)));
                    }
                }
            }
            "allOf" => {
                if let Value::Array(schemas) = argument {
                    for sub in schemas {
                        validate(sub, instance, path, out);
                    }
                }
            }
            "if" => check_conditional(keywords, argument, instance, path, out),
            _ => {}
        }
    }
}

fn violation(path: &str, message: String) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        message,
    }
}

fn type_matches(name: &str, instance: &Value) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        "number" => instance.is_number(),
        "integer" => {
            instance.is_i64()
                || instance.is_u64()
                || instance.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => true,
    }
}

fn check_type(argument: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let names: Vec<&str> = match argument {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => return,
    };
    if names.iter().any(|name| type_matches(name, instance)) {
        return;
    }
    let expected = names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ");
    out.push(violation(
        path,
        format!("{} is not of type {expected}", messages::render(instance)),
    ));
}

fn check_enum(argument: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    if let Value::Array(options) = argument {
        if !options.contains(instance) {
            out.push(violation(
                path,
                format!(
                    "{} is not one of {}",
                    messages::render(instance),
                    messages::render(argument)
                ),
            ));
        }
    }
}

fn check_required(argument: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    if let (Value::Array(fields), Value::Object(object)) = (argument, instance) {
        for field in fields.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                out.push(violation(path, messages::required(field)));
            }
        }
    }
}

fn check_properties(
    argument: &Value,
    instance: &Value,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    if let (Value::Object(properties), Value::Object(object)) = (argument, instance) {
        for (name, sub) in properties {
            if let Some(value) = object.get(name) {
                validate(sub, value, &path_key(path, name), out);
            }
        }
    }
}

fn check_additional(
    keywords: &Map<String, Value>,
    argument: &Value,
    instance: &Value,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    let Value::Object(object) = instance else {
        return;
    };
    let declared = keywords.get("properties").and_then(Value::as_object);
    let extras: Vec<&String> = object
        .keys()
        .filter(|key| declared.is_none_or(|d| !d.contains_key(*key)))
        .collect();
    if extras.is_empty() {
        return;
    }
    match argument {
        Value::Bool(false) => {
            let quoted: Vec<String> = extras.iter().map(|k| format!("'{k}'")).collect();
            let verb = if extras.len() == 1 { "was" } else { "were" };
            out.push(violation(
                path,
                format!(
                    "Additional properties are not allowed ({} {verb} unexpected)",
                    quoted.join(", ")
                ),
            ));
        }
        Value::Object(_) => {
            for key in extras {
                if let Some(value) = object.get(key) {
                    validate(argument, value, &path_key(path, key), out);
                }
            }
        }
        _ => {}
    }
}

fn check_conditional(
    keywords: &Map<String, Value>,
    condition: &Value,
    instance: &Value,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    let mut failures = Vec::new();
    validate(condition, instance, path, &mut failures);
    let branch = if failures.is_empty() {
        keywords.get("then")
    } else {
        keywords.get("else")
    };
    if let Some(branch) = branch {
        validate(branch, instance, path, out);
    }
}

// =============================================================================
// TESTS
// =============================================================================
