//! JSON Schema backed implementation of [`Schema`].
//!
//! Values are coerced before they are checked, object schemas reject
//! undeclared keys unless `allowUnknown` is set, and failures are reported as
//! one human readable message per field.

pub mod coerce;
pub mod messages;

use crate::error::ConfigError;
use crate::schema::{Schema, ValidationFailure, ValidationOutcome};
use crate::validation_helpers::build_validator;
use async_trait::async_trait;
use coerce::{coerce, CoerceOptions};
use jsonschema::Validator;
use messages::{describe, map_to_detail_kind};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Options understood by [`JsonSchema`]. Unknown keys in the bag are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub allow_unknown: bool,
    pub convert: bool,
    pub abort_early: bool,
    pub strip_unknown: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            allow_unknown: false,
            convert: true,
            abort_early: true,
            strip_unknown: false,
        }
    }
}

impl EngineOptions {
    /// Reads the options bag, falling back to defaults when it is absent or malformed
    pub fn from_bag(options: Option<&Value>) -> Self {
        match options {
            None => Self::default(),
            Some(bag) => serde_json::from_value(bag.clone()).unwrap_or_else(|e| {
                debug!(error = %e, "ignoring malformed validation options");
                Self::default()
            }),
        }
    }
}

/// A compiled schema document plus the validator built from it
struct Compiled {
    document: Value,
    validator: Validator,
}

impl Compiled {
    fn new(document: Value, context: &str) -> Result<Self, ConfigError> {
        let validator = build_validator(&document, context)?;
        Ok(Self { document, validator })
    }
}

/// Schema handle compiled once from a JSON Schema document.
///
/// Two validators are kept: one for the document as written and one where
/// every object shape that says nothing about extra keys is closed, used when
/// unknown keys are not allowed.
pub struct JsonSchema {
    open: Compiled,
    closed: Compiled,
}

impl JsonSchema {
    pub fn new(document: Value) -> Result<Self, ConfigError> {
        Self::with_context(document, "schema")
    }

    /// Like [`JsonSchema::new`], naming the schema in compilation errors
    pub fn with_context(document: Value, context: &str) -> Result<Self, ConfigError> {
        let mut closed_document = document.clone();
        close_objects(&mut closed_document);

        Ok(Self {
            closed: Compiled::new(closed_document, context)?,
            open: Compiled::new(document, context)?,
        })
    }

    pub fn document(&self) -> &Value {
        &self.open.document
    }

    /// Synchronous form of [`Schema::validate`]
    pub fn validate_value(&self, value: &Value, options: Option<&Value>) -> ValidationOutcome {
        let opts = EngineOptions::from_bag(options);
        let compiled = if opts.allow_unknown {
            &self.open
        } else {
            &self.closed
        };

        let coerced = coerce(
            &compiled.document,
            value.clone(),
            CoerceOptions {
                convert: opts.convert,
                strip_unknown: opts.strip_unknown,
            },
        );

        if compiled.validator.is_valid(&coerced) {
            return ValidationOutcome::Valid(coerced);
        }

        let mut details: Vec<String> = Vec::new();
        for error in compiled.validator.iter_errors(&coerced) {
            debug!(
                kind = map_to_detail_kind(&error.kind).as_str(),
                path = %error.instance_path,
                "schema violation"
            );
            details.extend(describe(&error, &compiled.document));
            if opts.abort_early && !details.is_empty() {
                details.truncate(1);
                break;
            }
        }

        let message = details.join(". ");
        ValidationOutcome::Invalid(ValidationFailure::new(message, details))
    }
}

#[async_trait]
impl Schema for JsonSchema {
    async fn validate(&self, value: &Value, options: Option<&Value>) -> ValidationOutcome {
        self.validate_value(value, options)
    }
}

/// Drafts without `unevaluatedProperties`, where closing falls back to
/// `additionalProperties`
const LEGACY_DRAFTS: [&str; 3] = ["draft-04", "draft-06", "draft-07"];

const COMBINATORS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Closes every object shape in the document that says nothing about extra keys.
///
/// `unevaluatedProperties: false` is used so keys declared through `$ref` or
/// combinator branches still count as known. Legacy drafts only get
/// `additionalProperties: false`, and only on shapes built from plain `properties`.
fn close_objects(schema: &mut Value) {
    let legacy = schema
        .get("$schema")
        .and_then(Value::as_str)
        .is_some_and(|uri| LEGACY_DRAFTS.iter().any(|draft| uri.contains(draft)));
    close_node(schema, legacy, true);
}

/// `owns_value` is false under `$defs` and combinator branches: those describe
/// part of some other object and are closed where they are used.
fn close_node(schema: &mut Value, legacy: bool, owns_value: bool) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };

    let composed = map.contains_key("$ref") || COMBINATORS.iter().any(|k| map.contains_key(*k));
    let shaped = map.contains_key("properties") || map.contains_key("patternProperties");
    let open = !map.contains_key("additionalProperties") && !map.contains_key("unevaluatedProperties");
    if owns_value && open {
        if legacy && shaped && !composed {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        } else if !legacy && (shaped || composed) {
            map.insert("unevaluatedProperties".to_string(), Value::Bool(false));
        }
    }

    for keyword in ["properties", "patternProperties"] {
        if let Some(Value::Object(children)) = map.get_mut(keyword) {
            for child in children.values_mut() {
                close_node(child, legacy, true);
            }
        }
    }
    for keyword in ["items", "additionalProperties"] {
        if let Some(child) = map.get_mut(keyword) {
            close_node(child, legacy, true);
        }
    }
    for keyword in ["$defs", "definitions"] {
        if let Some(Value::Object(definitions)) = map.get_mut(keyword) {
            for definition in definitions.values_mut() {
                close_node(definition, legacy, false);
            }
        }
    }
    for keyword in COMBINATORS {
        if let Some(Value::Array(branches)) = map.get_mut(keyword) {
            for branch in branches {
                close_node(branch, legacy, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "number" }
            },
            "required": ["name", "age"]
        }))
        .unwrap()
    }

    #[test]
    fn valid_value_is_returned_coerced() {
        let outcome = person().validate_value(&json!({ "name": "Amelia", "age": "5" }), None);
        assert_eq!(outcome, ValidationOutcome::Valid(json!({ "name": "Amelia", "age": 5 })));
    }

    #[test]
    fn missing_field_reports_required_message() {
        match person().validate_value(&json!({ "name": "Amelia" }), None) {
            ValidationOutcome::Invalid(failure) => {
                assert_eq!(failure.message(), "\"age\" is required");
                assert_eq!(failure.details(), ["\"age\" is required"]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn unknown_keys_rejected_unless_allowed() {
        let schema = person();
        let value = json!({ "name": "Amelia", "age": 5, "other": "value" });

        assert!(!schema.validate_value(&value, None).is_valid());
        assert!(schema
            .validate_value(&value, Some(&json!({ "allowUnknown": true })))
            .is_valid());
    }

    #[test]
    fn abort_early_disabled_reports_every_failure() {
        let outcome = person().validate_value(&json!({}), Some(&json!({ "abortEarly": false })));
        match outcome {
            ValidationOutcome::Invalid(failure) => {
                assert_eq!(failure.details().len(), 2);
                assert_eq!(failure.message(), failure.details().join(". "));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn explicit_additional_properties_is_respected() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "additionalProperties": true
        }))
        .unwrap();
        assert!(schema.validate_value(&json!({ "a": "x", "b": 1 }), None).is_valid());
    }

    #[test]
    fn malformed_options_fall_back_to_defaults() {
        assert_eq!(EngineOptions::from_bag(Some(&json!("nope"))), EngineOptions::default());
        assert_eq!(
            EngineOptions::from_bag(Some(&json!({ "convert": false, "somethingElse": 1 }))),
            EngineOptions {
                convert: false,
                ..EngineOptions::default()
            }
        );
    }

    #[test]
    fn revalidating_a_coerced_value_is_stable() {
        let schema = person();
        let ValidationOutcome::Valid(first) = schema.validate_value(&json!({ "name": "Amelia", "age": "5" }), None) else {
            panic!("expected first pass to succeed");
        };
        assert_eq!(schema.validate_value(&first, None), ValidationOutcome::Valid(first.clone()));
    }

    #[test]
    fn referenced_objects_are_closed() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "properties": { "owner": { "$ref": "#/$defs/owner" } },
            "$defs": {
                "owner": { "type": "object", "properties": { "id": { "type": "string" } } }
            }
        }))
        .unwrap();

        assert!(schema.validate_value(&json!({ "owner": { "id": "1" } }), None).is_valid());
        match schema.validate_value(&json!({ "owner": { "id": "1", "extra": 2 } }), None) {
            ValidationOutcome::Invalid(failure) => {
                assert_eq!(failure.details(), ["\"owner.extra\" is not allowed"]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(schema
            .validate_value(
                &json!({ "owner": { "id": "1", "extra": 2 } }),
                Some(&json!({ "allowUnknown": true }))
            )
            .is_valid());
    }

    #[test]
    fn all_of_shapes_are_closed_as_a_whole() {
        let schema = JsonSchema::new(json!({
            "allOf": [
                { "type": "object", "properties": { "a": { "type": "string" } } },
                { "type": "object", "properties": { "b": { "type": "string" } } }
            ]
        }))
        .unwrap();

        assert!(schema.validate_value(&json!({ "a": "x", "b": "y" }), None).is_valid());
        match schema.validate_value(&json!({ "a": "x", "b": "y", "c": 1 }), None) {
            ValidationOutcome::Invalid(failure) => {
                assert_eq!(failure.details(), ["\"c\" is not allowed"]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn additional_properties_subschemas_are_closed() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "additionalProperties": {
                "type": "object",
                "properties": { "id": { "type": "integer" } }
            }
        }))
        .unwrap();

        assert_eq!(
            schema.validate_value(&json!({ "first": { "id": "3" } }), None),
            ValidationOutcome::Valid(json!({ "first": { "id": 3 } }))
        );
        assert!(!schema
            .validate_value(&json!({ "first": { "id": 3, "extra": true } }), None)
            .is_valid());
    }

    #[test]
    fn legacy_drafts_close_with_additional_properties() {
        let mut document = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": { "a": { "type": "string" } }
        });
        close_objects(&mut document);
        assert_eq!(document["additionalProperties"], json!(false));
        assert!(document.get("unevaluatedProperties").is_none());
    }
}
