pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod interceptor;
pub mod middleware;
pub mod options;
pub mod pipeline;
pub mod schema;
pub mod validation_helpers;

pub use config::{build_interceptor, build_interceptors, load_validator_spec, ValidatorSpec, ValidatorSpecFile};
pub use context::RequestContext;
pub use engine::{EngineOptions, JsonSchema};
pub use error::{ConfigError, ErrorResponse, ValidationError};
pub use interceptor::ValidationInterceptor;
pub use middleware::{Middleware, Phases};
pub use options::{SchemaRef, ValidatorConfig, ValidatorOptions};
pub use pipeline::{Handler, HandlerError, HttpResponse, Pipeline, PipelineError};
pub use schema::{Schema, ValidationFailure, ValidationOutcome};
