use async_trait::async_trait;
use serde_json::Value;

/// A schema handle able to validate, and coerce, a JSON value.
///
/// The interceptor never inspects the schema itself; it only forwards the
/// value and the opaque options bag configured for the slot.
#[async_trait]
pub trait Schema: Send + Sync {
    async fn validate(&self, value: &Value, options: Option<&Value>) -> ValidationOutcome;
}

/// Result of a single engine call
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The value passed; carries the normalized value, which may differ from the input
    Valid(Value),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Engine failure: a summary message plus one message per offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    message: String,
    details: Vec<String>,
}

impl ValidationFailure {
    /// An empty `details` list is replaced by the message itself so that
    /// callers always receive at least one detail.
    pub fn new(message: impl Into<String>, details: Vec<String>) -> Self {
        let message = message.into();
        let details = if details.is_empty() {
            vec![message.clone()]
        } else {
            details
        };
        Self { message, details }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn into_details(self) -> Vec<String> {
        self.details
    }
}
