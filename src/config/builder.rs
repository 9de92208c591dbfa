use crate::config::loader::{ValidatorSpec, ValidatorSpecFile};
use crate::engine::JsonSchema;
use crate::error::ConfigError;
use crate::interceptor::ValidationInterceptor;
use crate::options::{SchemaRef, ValidatorOptions};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

fn compile(document: &Option<Value>, handler: &str, slot: &str) -> Result<Option<SchemaRef>, ConfigError> {
    document
        .as_ref()
        .map(|doc| {
            let schema = JsonSchema::with_context(doc.clone(), &format!("{} {}", handler, slot))?;
            Ok(Arc::new(schema) as SchemaRef)
        })
        .transpose()
}

/// Compiles every schema of one handler entry into an interceptor
pub fn build_interceptor(name: &str, spec: &ValidatorSpec) -> Result<ValidationInterceptor, ConfigError> {
    let options = ValidatorOptions {
        input_schema: compile(&spec.input_schema, name, "input")?,
        input_validation_options: spec.input_validation_options.clone(),
        preserve_raw_body: spec.preserve_raw_body,
        input_error_validation_message: spec.input_error_validation_message.clone(),
        headers_schema: compile(&spec.headers_schema, name, "headers")?,
        headers_validation_options: spec.headers_validation_options.clone(),
        preserve_raw_headers: spec.preserve_raw_headers,
        headers_error_validation_message: spec.headers_error_validation_message.clone(),
        output_schema: compile(&spec.output_schema, name, "output")?,
        output_validation_options: spec.output_validation_options.clone(),
        output_error_validation_message: spec.output_error_validation_message.clone(),
    };

    Ok(ValidationInterceptor::new(options))
}

/// Builds an interceptor per declared handler, keeping declaration order
pub fn build_interceptors(file: &ValidatorSpecFile) -> Result<IndexMap<String, ValidationInterceptor>, ConfigError> {
    let interceptors = file
        .handlers
        .iter()
        .map(|(name, spec)| Ok((name.clone(), build_interceptor(name, spec)?)))
        .collect::<Result<IndexMap<_, _>, ConfigError>>()?;

    info!(count = interceptors.len(), "validation interceptors built");
    Ok(interceptors)
}
