use crate::validation_helpers::resolve_local_ref;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Vendor keywords declaring string normalizations applied before validation
pub const TRIM_KEYWORD: &str = "x-trim";
pub const LOWERCASE_KEYWORD: &str = "x-lowercase";
pub const UPPERCASE_KEYWORD: &str = "x-uppercase";

/// Bound on `$ref`/combinator hops taken without descending into the value,
/// so self-referencing schemas terminate
const MAX_SCHEMA_HOPS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoerceOptions {
    pub convert: bool,
    pub strip_unknown: bool,
}

/// Normalizes `value` against the schema document `root` ahead of validation.
///
/// Missing properties with a declared `default` are filled in. With
/// `convert`, strings are converted to the declared scalar type and string
/// transforms (`x-trim`, `x-lowercase`, `x-uppercase`) are applied. Values that
/// cannot be converted are left as they are for the validator to reject.
///
/// Same-document `$ref`s are followed, `allOf` branches are all applied, and
/// for `anyOf`/`oneOf` the first branch whose declared type fits the value is
/// applied.
pub fn coerce(root: &Value, value: Value, opts: CoerceOptions) -> Value {
    Walker { root, opts }.node(root, value, true, 0)
}

struct Walker<'a> {
    root: &'a Value,
    opts: CoerceOptions,
}

impl<'a> Walker<'a> {
    /// `owns_value` is false for `$ref` targets and combinator branches, which
    /// only describe part of the value and must not strip keys on their own
    fn node(&self, schema: &'a Value, mut value: Value, owns_value: bool, hops: usize) -> Value {
        let Some(map) = schema.as_object() else {
            return value;
        };
        if hops > MAX_SCHEMA_HOPS {
            return value;
        }

        if let Some(target) = self.ref_target(map) {
            value = self.node(target, value, false, hops + 1);
        }
        if let Some(Value::Array(branches)) = map.get("allOf") {
            for branch in branches {
                value = self.node(branch, value, false, hops + 1);
            }
        }
        for keyword in ["anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = map.get(keyword) {
                if let Some(branch) = branches.iter().find(|b| self.fits(b, &value, hops)) {
                    value = self.node(branch, value, false, hops + 1);
                }
            }
        }

        let mut value = match value {
            Value::Object(object) => Value::Object(self.object(map, object)),
            Value::Array(items) => match map.get("items") {
                Some(item_schema) if item_schema.is_object() => Value::Array(
                    items
                        .into_iter()
                        .map(|item| self.node(item_schema, item, true, 0))
                        .collect(),
                ),
                _ => Value::Array(items),
            },
            Value::String(s) if self.opts.convert => coerce_string(map, s),
            other => other,
        };

        if owns_value && self.opts.strip_unknown {
            if let Value::Object(object) = &mut value {
                self.strip(schema, object);
            }
        }
        value
    }

    fn ref_target(&self, map: &Map<String, Value>) -> Option<&'a Value> {
        map.get("$ref")
            .and_then(Value::as_str)
            .and_then(|reference| resolve_local_ref(self.root, reference))
    }

    fn object(&self, schema: &'a Map<String, Value>, mut object: Map<String, Value>) -> Map<String, Value> {
        let properties = schema.get("properties").and_then(Value::as_object);

        for (name, property_schema) in properties.into_iter().flatten() {
            match object.remove(name) {
                Some(current) => {
                    object.insert(name.clone(), self.node(property_schema, current, true, 0));
                }
                None => {
                    if let Some(default) = property_schema.get("default") {
                        object.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        if let Some(extra_schema) = schema.get("additionalProperties").filter(|s| s.is_object()) {
            let extra: Vec<String> = object
                .keys()
                .filter(|name| !properties.is_some_and(|p| p.contains_key(*name)))
                .cloned()
                .collect();
            for name in extra {
                if let Some(current) = object.remove(&name) {
                    object.insert(name, self.node(extra_schema, current, true, 0));
                }
            }
        }

        object
    }

    /// Removes keys no part of the schema declares. Schemas that accept extra
    /// keys, use `patternProperties`, or declare no properties at all are left alone.
    fn strip(&self, schema: &'a Value, object: &mut Map<String, Value>) {
        let mut declared = HashSet::new();
        if !self.collect_declared(schema, &mut declared, 0) || declared.is_empty() {
            return;
        }
        object.retain(|name, _| declared.contains(name.as_str()));
    }

    /// Gathers property names across `$ref` and combinators. Returns false when
    /// undeclared keys are acceptable.
    fn collect_declared(&self, schema: &'a Value, declared: &mut HashSet<&'a str>, hops: usize) -> bool {
        let Some(map) = schema.as_object() else {
            return true;
        };
        if hops > MAX_SCHEMA_HOPS || map.contains_key("patternProperties") {
            return false;
        }
        for keyword in ["additionalProperties", "unevaluatedProperties"] {
            match map.get(keyword) {
                Some(Value::Bool(true)) | Some(Value::Object(_)) => return false,
                _ => {}
            }
        }

        if let Some(properties) = map.get("properties").and_then(Value::as_object) {
            declared.extend(properties.keys().map(String::as_str));
        }
        if let Some(target) = self.ref_target(map) {
            if !self.collect_declared(target, declared, hops + 1) {
                return false;
            }
        }
        for keyword in ["allOf", "anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = map.get(keyword) {
                for branch in branches {
                    if !self.collect_declared(branch, declared, hops + 1) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Whether a combinator branch's declared type admits the value's current shape
    fn fits(&self, branch: &Value, value: &Value, hops: usize) -> bool {
        let Some(map) = branch.as_object() else {
            return true;
        };
        let map = match self.ref_target(map).and_then(Value::as_object) {
            Some(target) if hops < MAX_SCHEMA_HOPS => target,
            _ => map,
        };
        match map.get("type") {
            None => true,
            Some(Value::String(t)) => type_admits(t, value),
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(|t| type_admits(t, value)),
            Some(_) => false,
        }
    }
}

fn type_admits(declared: &str, value: &Value) -> bool {
    match (declared, value) {
        ("object", Value::Object(_))
        | ("array", Value::Array(_))
        | ("string", Value::String(_))
        | ("boolean", Value::Bool(_))
        | ("number", Value::Number(_))
        | ("null", Value::Null) => true,
        ("integer", Value::Number(n)) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}

fn coerce_string(schema: &Map<String, Value>, s: String) -> Value {
    match declared_type(schema) {
        Some("number") => parse_number(&s).map(Value::Number).unwrap_or(Value::String(s)),
        Some("integer") => parse_integer(&s).map(Value::Number).unwrap_or(Value::String(s)),
        Some("boolean") => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        _ => Value::String(transform_string(schema, s)),
    }
}

/// First concrete type named by `type`, whether given as a string or an array
fn declared_type(schema: &Map<String, Value>) -> Option<&str> {
    match schema.get("type")? {
        Value::String(t) => Some(t.as_str()),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n.into());
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Accepts whole numbers written with a fractional part, such as `"5.0"`
fn parse_integer(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n.into());
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some((f as i64).into())
    } else {
        None
    }
}

fn transform_string(schema: &Map<String, Value>, mut s: String) -> String {
    let flag = |keyword: &str| schema.get(keyword).and_then(Value::as_bool).unwrap_or(false);

    if flag(TRIM_KEYWORD) {
        s = s.trim().to_string();
    }
    if flag(LOWERCASE_KEYWORD) {
        s = s.to_lowercase();
    } else if flag(UPPERCASE_KEYWORD) {
        s = s.to_uppercase();
    }
    s
}
