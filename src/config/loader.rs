use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Validation settings for one handler, with schemas as JSON Schema documents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorSpec {
    pub input_schema: Option<Value>,
    pub input_validation_options: Option<Value>,
    pub preserve_raw_body: Option<bool>,
    pub input_error_validation_message: Option<String>,
    pub headers_schema: Option<Value>,
    pub headers_validation_options: Option<Value>,
    pub preserve_raw_headers: Option<bool>,
    pub headers_error_validation_message: Option<String>,
    pub output_schema: Option<Value>,
    pub output_validation_options: Option<Value>,
    pub output_error_validation_message: Option<String>,
}

/// Top-level spec file: handler name to its validation settings, in file order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidatorSpecFile {
    #[serde(default)]
    pub handlers: IndexMap<String, ValidatorSpec>,
}

/// Loads a validator spec from a YAML (or JSON) file
pub fn load_validator_spec(path: &Path) -> Result<ValidatorSpecFile, ConfigError> {
    let file = File::open(path)?;
    let spec: ValidatorSpecFile = serde_yaml::from_reader(file)?;
    info!(
        path = %path.display(),
        handlers = spec.handlers.len(),
        "loaded validator spec"
    );
    Ok(spec)
}

pub fn parse_validator_spec(contents: &str) -> Result<ValidatorSpecFile, ConfigError> {
    Ok(serde_yaml::from_str(contents)?)
}
