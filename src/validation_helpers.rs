use crate::error::ConfigError;
use jsonschema::Validator;
use serde_json::Value;

/// Label used when the failing instance is the validated value itself
pub const ROOT_LABEL: &str = "value";

/// Compiles a JSON Schema document into a reusable validator
pub fn build_validator(schema: &Value, error_context: &str) -> Result<Validator, ConfigError> {
    jsonschema::options()
        .build(schema)
        .map_err(|e| ConfigError::SchemaCompilation {
            context: error_context.to_string(),
            reason: e.to_string(),
        })
}

/// Turns a JSON pointer (`/items/0/name`) into a field label (`items[0].name`).
/// The empty pointer yields an empty label.
pub fn format_field_label(instance_path: &str) -> String {
    instance_path
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .fold(String::new(), |label, segment| child_label(&label, &segment))
}

/// Appends one path segment to a label, rendering array indices as `[n]`
pub fn child_label(parent: &str, segment: &str) -> String {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}[{}]", parent, segment)
    } else if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Falls back to [`ROOT_LABEL`] for the validated value itself
pub fn display_label(label: &str) -> &str {
    if label.is_empty() {
        ROOT_LABEL
    } else {
        label
    }
}

/// Resolves a same-document reference (`#`, `#/$defs/owner`) against `root`.
/// Remote references resolve to `None`.
pub fn resolve_local_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    match reference.strip_prefix('#')? {
        "" => Some(root),
        pointer => root.pointer(pointer),
    }
}

/// Follows a validator's schema path (`/properties/owner/$ref/properties/id/type`)
/// through `root`, resolving each `$ref` segment on the way
pub fn lookup_schema_path<'a>(root: &'a Value, schema_path: &str) -> Option<&'a Value> {
    schema_path
        .split('/')
        .skip(1)
        .try_fold(root, |node, segment| match segment {
            "$ref" => resolve_local_ref(root, node.get("$ref")?.as_str()?),
            _ => {
                let segment = segment.replace("~1", "/").replace("~0", "~");
                match node {
                    Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
                    _ => node.get(segment.as_str()),
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_follow_the_instance_path() {
        assert_eq!(format_field_label(""), "");
        assert_eq!(format_field_label("/age"), "age");
        assert_eq!(format_field_label("/items/0/name"), "items[0].name");
        assert_eq!(format_field_label("/a~1b/c~0d"), "a/b.c~d");
    }

    #[test]
    fn root_label_is_value() {
        assert_eq!(display_label(""), "value");
        assert_eq!(display_label("age"), "age");
    }

    #[test]
    fn local_refs_resolve_within_the_document() {
        let root = json!({ "$defs": { "owner": { "type": "object" } } });
        assert_eq!(resolve_local_ref(&root, "#/$defs/owner"), Some(&json!({ "type": "object" })));
        assert_eq!(resolve_local_ref(&root, "#"), Some(&root));
        assert_eq!(resolve_local_ref(&root, "https://example.com/owner.json"), None);
    }

    #[test]
    fn schema_paths_follow_refs() {
        let root = json!({
            "properties": { "owner": { "$ref": "#/$defs/owner" } },
            "$defs": { "owner": { "properties": { "id": { "type": "string" } } } },
            "allOf": [{ "properties": { "n": { "type": "integer" } } }]
        });
        assert_eq!(
            lookup_schema_path(&root, "/properties/owner/$ref/properties/id/type"),
            Some(&json!("string"))
        );
        assert_eq!(lookup_schema_path(&root, "/allOf/0/properties/n/type"), Some(&json!("integer")));
        assert_eq!(lookup_schema_path(&root, "/properties/missing/type"), None);
    }

    #[test]
    fn invalid_schema_reports_context() {
        let err = build_validator(&json!({ "type": 12 }), "response").unwrap_err();
        assert!(err.to_string().contains("response"));
    }
}
