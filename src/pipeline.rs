//! Minimal host pipeline around a single handler.
//!
//! Middlewares run `before` in registration order, then the handler, then
//! `after` in reverse order. Phases a middleware reports as unbound are never
//! called. The first error ends the invocation.

use crate::context::RequestContext;
use crate::error::{ErrorResponse, ValidationError};
use crate::middleware::Middleware;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure raised by the wrapped handler itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Handler failed: {0}")]
    Handler(#[from] HandlerError),
}

impl PipelineError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(err) => err.status_code(),
            Self::Handler(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(err) => err.to_response(),
            Self::Handler(err) => ErrorResponse {
                status_code: 500,
                message: err.0.clone(),
                details: Vec::new(),
            },
        }
    }
}

/// The business logic wrapped by the pipeline
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &RequestContext) -> Result<Value, HandlerError>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&RequestContext) -> Result<Value, HandlerError> + Send + Sync,
{
    async fn call(&self, ctx: &RequestContext) -> Result<Value, HandlerError> {
        self(ctx)
    }
}

/// What the caller finally receives
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Value,
}

pub struct Pipeline<H> {
    middlewares: Vec<Arc<dyn Middleware>>,
    handler: H,
}

impl<H: Handler> Pipeline<H> {
    pub fn new(handler: H) -> Self {
        Self {
            middlewares: Vec::new(),
            handler,
        }
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn with_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Runs one invocation and returns the handler's response
    pub async fn invoke(&self, mut ctx: RequestContext) -> Result<Value, PipelineError> {
        for middleware in &self.middlewares {
            if middleware.phases().before {
                debug!(middleware = middleware.name(), "running before hook");
                middleware.before(&mut ctx).await?;
            }
        }

        let response = self.handler.call(&ctx).await?;

        for middleware in self.middlewares.iter().rev() {
            if middleware.phases().after {
                debug!(middleware = middleware.name(), "running after hook");
                middleware.after(&ctx, &response).await?;
            }
        }

        Ok(response)
    }

    /// Like [`Pipeline::invoke`], rendering failures as error responses
    pub async fn respond(&self, ctx: RequestContext) -> HttpResponse {
        match self.invoke(ctx).await {
            Ok(body) => HttpResponse {
                status_code: 200,
                body,
            },
            Err(err) => HttpResponse {
                status_code: err.status_code(),
                body: serde_json::to_value(err.to_response()).unwrap_or(Value::Null),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Phases;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the hooks it was asked to run
    struct Recorder {
        name: &'static str,
        phases: Phases,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn phases(&self) -> Phases {
            self.phases
        }

        async fn before(&self, _ctx: &mut RequestContext) -> Result<(), ValidationError> {
            self.log.lock().unwrap().push(format!("{}:before", self.name));
            Ok(())
        }

        async fn after(&self, _ctx: &RequestContext, _response: &Value) -> Result<(), ValidationError> {
            self.log.lock().unwrap().push(format!("{}:after", self.name));
            Ok(())
        }
    }

    fn echo_body(ctx: &RequestContext) -> Result<Value, HandlerError> {
        Ok(ctx.body.clone())
    }

    #[tokio::test]
    async fn hooks_run_in_onion_order_and_skip_unbound_phases() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(echo_body)
            .with(Recorder {
                name: "outer",
                phases: Phases { before: true, after: true },
                log: log.clone(),
            })
            .with(Recorder {
                name: "inner",
                phases: Phases { before: false, after: true },
                log: log.clone(),
            });

        let response = pipeline.invoke(RequestContext::with_body(json!({ "a": 1 }))).await.unwrap();

        assert_eq!(response, json!({ "a": 1 }));
        assert_eq!(*log.lock().unwrap(), ["outer:before", "inner:after", "outer:after"]);
    }

    #[tokio::test]
    async fn handler_failure_renders_as_server_error() {
        let pipeline = Pipeline::new(|_: &RequestContext| -> Result<Value, HandlerError> {
            Err(HandlerError("boom".to_string()))
        });

        let response = pipeline.respond(RequestContext::default()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body["message"], "boom");
    }
}
