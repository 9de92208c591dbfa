use crate::context::RequestContext;
use crate::error::ValidationError;
use crate::middleware::{Middleware, Phases};
use crate::options::{InputSlot, ValidatorConfig, ValidatorOptions};
use crate::schema::{ValidationFailure, ValidationOutcome};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Request field a validated input slot writes back into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Headers,
    Body,
}

impl InputTarget {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Body => "body",
        }
    }

    /// Fallback message when no override is configured. Only headers get a prefix.
    fn fallback_message(&self, engine_message: &str) -> String {
        match self {
            Self::Headers => format!("Header: {}", engine_message),
            Self::Body => engine_message.to_string(),
        }
    }
}

/// Validates headers and body before a handler runs and its response afterwards
#[derive(Debug, Clone)]
pub struct ValidationInterceptor {
    config: ValidatorConfig,
}

impl ValidationInterceptor {
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            config: ValidatorConfig::from(options),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Hooks the host needs to call, decided once from the configured schemas
    pub fn phases(&self) -> Phases {
        Phases {
            before: self.config.headers.schema.is_some() || self.config.input.schema.is_some(),
            after: self.config.output.schema.is_some(),
        }
    }

    /// Validates headers, then body, rewriting both with their normalized values.
    ///
    /// The first failure is returned and the body is left untouched if the
    /// headers were rejected.
    pub async fn on_before_handler(&self, ctx: &mut RequestContext) -> Result<(), ValidationError> {
        validate_input(
            &self.config.headers,
            InputTarget::Headers,
            &mut ctx.headers,
            &mut ctx.raw_headers,
        )
        .await?;

        validate_input(
            &self.config.input,
            InputTarget::Body,
            &mut ctx.body,
            &mut ctx.raw_body,
        )
        .await
    }

    /// Validates the handler's response without rewriting it
    pub async fn on_after_handler(&self, response: &Value) -> Result<(), ValidationError> {
        let slot = &self.config.output;
        let Some(schema) = slot.schema.as_ref() else {
            return Ok(());
        };

        match schema.validate(response, slot.options.as_ref()).await {
            ValidationOutcome::Valid(_) => {
                debug!("response passed validation");
                Ok(())
            }
            ValidationOutcome::Invalid(failure) => {
                let message = slot
                    .error_message
                    .clone()
                    .unwrap_or_else(|| failure.message().to_string());
                let err = ValidationError::Server {
                    message,
                    details: failure.into_details(),
                };
                log_failure("response", &err);
                Err(err)
            }
        }
    }
}

async fn validate_input(
    slot: &InputSlot,
    target: InputTarget,
    value: &mut Value,
    raw: &mut Option<Value>,
) -> Result<(), ValidationError> {
    let Some(schema) = slot.schema.as_ref() else {
        return Ok(());
    };

    match schema.validate(value, slot.options.as_ref()).await {
        ValidationOutcome::Valid(coerced) => {
            // serde_json::Value equality is structural, so a rebuilt container
            // with identical contents does not count as a change
            if slot.preserve_raw && coerced != *value {
                debug!(slot = target.as_str(), "preserving raw value before coercion");
                *raw = Some(value.clone());
            }
            *value = coerced;
            debug!(slot = target.as_str(), "input passed validation");
            Ok(())
        }
        ValidationOutcome::Invalid(failure) => {
            let err = client_error(slot, target, failure);
            log_failure(target.as_str(), &err);
            Err(err)
        }
    }
}

fn client_error(slot: &InputSlot, target: InputTarget, failure: ValidationFailure) -> ValidationError {
    let message = slot
        .error_message
        .clone()
        .unwrap_or_else(|| target.fallback_message(failure.message()));
    ValidationError::Client {
        message,
        details: failure.into_details(),
    }
}

fn log_failure(slot: &str, err: &ValidationError) {
    warn!(
        slot,
        status = err.status_code(),
        details = err.details().len(),
        "validation failed: {}",
        err.message()
    );
}

#[async_trait]
impl Middleware for ValidationInterceptor {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn phases(&self) -> Phases {
        ValidationInterceptor::phases(self)
    }

    async fn before(&self, ctx: &mut RequestContext) -> Result<(), ValidationError> {
        self.on_before_handler(ctx).await
    }

    async fn after(&self, _ctx: &RequestContext, response: &Value) -> Result<(), ValidationError> {
        self.on_after_handler(response).await
    }
}
