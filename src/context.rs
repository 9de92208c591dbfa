use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-invocation request state owned by the host pipeline.
///
/// `headers` and `body` arrive already decoded. Validation may overwrite them
/// with normalized values and, when asked to, keep the originals in
/// `raw_headers` / `raw_body` for the handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_headers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<Value>,
}

impl RequestContext {
    pub fn new(headers: Value, body: Value) -> Self {
        Self {
            headers,
            body,
            raw_headers: None,
            raw_body: None,
        }
    }

    /// Context for an event carrying only a body
    pub fn with_body(body: Value) -> Self {
        Self::new(Value::Object(Default::default()), body)
    }
}
