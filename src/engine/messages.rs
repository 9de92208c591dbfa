use crate::validation_helpers::{child_label, display_label, format_field_label, lookup_schema_path};
use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailKind {
    Required,
    NotAllowed,
    EnumViolation,
    TypeMismatch,
    Other,
}

impl DetailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::NotAllowed => "not_allowed",
            Self::EnumViolation => "enum_violation",
            Self::TypeMismatch => "type_mismatch",
            Self::Other => "invalid",
        }
    }
}

/// Maps a jsonschema error kind onto the detail kind reported to callers
pub fn map_to_detail_kind(kind: &ValidationErrorKind) -> DetailKind {
    match kind {
        ValidationErrorKind::Required { .. } => DetailKind::Required,
        ValidationErrorKind::AdditionalProperties { .. }
        | ValidationErrorKind::UnevaluatedProperties { .. } => DetailKind::NotAllowed,
        ValidationErrorKind::Enum { .. } => DetailKind::EnumViolation,
        ValidationErrorKind::Type { .. } => DetailKind::TypeMismatch,
        _ => DetailKind::Other,
    }
}

/// Renders one jsonschema error as per-field detail messages.
///
/// `schema` must be the document the validator was compiled from, since
/// union type mismatches are described by looking up the failing keyword in it.
pub fn describe(error: &jsonschema::ValidationError<'_>, schema: &Value) -> Vec<String> {
    let label = format_field_label(&error.instance_path.to_string());
    let field = display_label(&label);

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            vec![format!("\"{}\" is required", child_label(&label, &name))]
        }
        ValidationErrorKind::AdditionalProperties { unexpected }
        | ValidationErrorKind::UnevaluatedProperties { unexpected } => unexpected
            .iter()
            .map(|name| format!("\"{}\" is not allowed", child_label(&label, name)))
            .collect(),
        ValidationErrorKind::Enum { options } => {
            vec![format!("\"{}\" must be one of [{}]", field, render_options(options))]
        }
        ValidationErrorKind::Type { kind } => {
            let expected = match kind {
                TypeKind::Single(json_type) => json_type.to_string(),
                TypeKind::Multiple(_) => lookup_schema_path(schema, &error.schema_path.to_string())
                    .map(render_types)
                    .unwrap_or_else(|| "the declared type".to_string()),
            };
            vec![format!("\"{}\" must be of type {}", field, expected)]
        }
        ValidationErrorKind::Minimum { limit } => {
            vec![format!("\"{}\" must be greater than or equal to {}", field, limit)]
        }
        ValidationErrorKind::Maximum { limit } => {
            vec![format!("\"{}\" must be less than or equal to {}", field, limit)]
        }
        ValidationErrorKind::ExclusiveMinimum { limit } => {
            vec![format!("\"{}\" must be greater than {}", field, limit)]
        }
        ValidationErrorKind::ExclusiveMaximum { limit } => {
            vec![format!("\"{}\" must be less than {}", field, limit)]
        }
        ValidationErrorKind::MinLength { limit } => vec![format!(
            "\"{}\" length must be at least {} characters long",
            field, limit
        )],
        ValidationErrorKind::MaxLength { limit } => vec![format!(
            "\"{}\" length must be less than or equal to {} characters long",
            field, limit
        )],
        ValidationErrorKind::Pattern { pattern } => vec![format!(
            "\"{}\" with value \"{}\" fails to match the required pattern: /{}/",
            field,
            render_scalar(&error.instance),
            pattern
        )],
        ValidationErrorKind::MinItems { limit } => {
            vec![format!("\"{}\" must contain at least {} items", field, limit)]
        }
        ValidationErrorKind::MaxItems { limit } => {
            vec![format!("\"{}\" must contain less than or equal to {} items", field, limit)]
        }
        _ => {
            let path = error.schema_path.to_string();
            let keyword = path.rsplit('/').next().unwrap_or_default();
            vec![format!("\"{}\" failed {} validation", field, keyword)]
        }
    }
}

fn render_options(options: &Value) -> String {
    match options {
        Value::Array(items) => items.iter().map(render_scalar).collect::<Vec<_>>().join(", "),
        other => render_scalar(other),
    }
}

fn render_types(types: &Value) -> String {
    match types {
        Value::Array(items) => items.iter().map(render_scalar).collect::<Vec<_>>().join(" or "),
        other => render_scalar(other),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
