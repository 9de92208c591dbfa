use serde::Serialize;
use thiserror::Error;

/// Structured error raised when a configured schema rejects a value.
///
/// `Client` covers headers and body (the caller sent something invalid),
/// `Server` covers the handler's response (a contract bug on our side).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    Client { message: String, details: Vec<String> },

    #[error("{message}")]
    Server { message: String, details: Vec<String> },
}

impl ValidationError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Client { .. } => 400,
            Self::Server { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Client { message, .. } | Self::Server { message, .. } => message,
        }
    }

    pub fn details(&self) -> &[String] {
        match self {
            Self::Client { details, .. } | Self::Server { details, .. } => details,
        }
    }

    /// Renders the error into the shape surfaced to the caller
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status_code: self.status_code(),
            message: self.message().to_string(),
            details: self.details().to_vec(),
        }
    }
}

/// Wire shape of a validation failure: `{ statusCode, message, details }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub details: Vec<String>,
}

/// Errors raised while building interceptors, never at request time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to compile JSON schema for {context}: {reason}")]
    SchemaCompilation { context: String, reason: String },

    #[error("Failed to open validator spec: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse validator spec: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let err = ValidationError::Client {
            message: "\"age\" is required".to_string(),
            details: vec!["\"age\" is required".to_string()],
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "\"age\" is required");
    }

    #[test]
    fn response_shape_uses_camel_case() {
        let err = ValidationError::Server {
            message: "Invalid response object".to_string(),
            details: vec!["\"other\" is not allowed".to_string()],
        };
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "statusCode": 500,
                "message": "Invalid response object",
                "details": ["\"other\" is not allowed"],
            })
        );
    }
}
