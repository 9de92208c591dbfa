use crate::schema::Schema;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Shared, immutable schema handle
pub type SchemaRef = Arc<dyn Schema>;

/// Caller-supplied partial configuration. Every field is optional; unset
/// fields fall back to the defaults applied by [`ValidatorConfig::from`].
#[derive(Clone, Default)]
pub struct ValidatorOptions {
    pub input_schema: Option<SchemaRef>,
    pub input_validation_options: Option<Value>,
    pub preserve_raw_body: Option<bool>,
    pub input_error_validation_message: Option<String>,
    pub headers_schema: Option<SchemaRef>,
    pub headers_validation_options: Option<Value>,
    pub preserve_raw_headers: Option<bool>,
    pub headers_error_validation_message: Option<String>,
    pub output_schema: Option<SchemaRef>,
    pub output_validation_options: Option<Value>,
    pub output_error_validation_message: Option<String>,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.input_schema = Some(Arc::new(schema));
        self
    }

    pub fn with_input_validation_options(mut self, options: Value) -> Self {
        self.input_validation_options = Some(options);
        self
    }

    pub fn with_preserve_raw_body(mut self, preserve: bool) -> Self {
        self.preserve_raw_body = Some(preserve);
        self
    }

    pub fn with_input_error_message(mut self, message: impl Into<String>) -> Self {
        self.input_error_validation_message = Some(message.into());
        self
    }

    pub fn with_headers_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.headers_schema = Some(Arc::new(schema));
        self
    }

    pub fn with_headers_validation_options(mut self, options: Value) -> Self {
        self.headers_validation_options = Some(options);
        self
    }

    pub fn with_preserve_raw_headers(mut self, preserve: bool) -> Self {
        self.preserve_raw_headers = Some(preserve);
        self
    }

    pub fn with_headers_error_message(mut self, message: impl Into<String>) -> Self {
        self.headers_error_validation_message = Some(message.into());
        self
    }

    pub fn with_output_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.output_schema = Some(Arc::new(schema));
        self
    }

    pub fn with_output_validation_options(mut self, options: Value) -> Self {
        self.output_validation_options = Some(options);
        self
    }

    pub fn with_output_error_message(mut self, message: impl Into<String>) -> Self {
        self.output_error_validation_message = Some(message.into());
        self
    }
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("input_schema", &self.input_schema.is_some())
            .field("headers_schema", &self.headers_schema.is_some())
            .field("output_schema", &self.output_schema.is_some())
            .finish_non_exhaustive()
    }
}

/// Headers are usually a superset of what a handler cares about, so unknown
/// header names are accepted unless the caller says otherwise.
pub fn default_headers_validation_options() -> Value {
    json!({ "allowUnknown": true })
}

/// Settings for a slot whose validated value is written back into the request
#[derive(Clone, Default)]
pub struct InputSlot {
    pub schema: Option<SchemaRef>,
    pub options: Option<Value>,
    pub error_message: Option<String>,
    pub preserve_raw: bool,
}

/// Settings for the observe-only response slot
#[derive(Clone, Default)]
pub struct OutputSlot {
    pub schema: Option<SchemaRef>,
    pub options: Option<Value>,
    pub error_message: Option<String>,
}

impl fmt::Debug for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSlot")
            .field("schema", &self.schema.is_some())
            .field("options", &self.options)
            .field("error_message", &self.error_message)
            .field("preserve_raw", &self.preserve_raw)
            .finish()
    }
}

impl fmt::Debug for OutputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSlot")
            .field("schema", &self.schema.is_some())
            .field("options", &self.options)
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Resolved configuration, fixed for the lifetime of an interceptor
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    pub headers: InputSlot,
    pub input: InputSlot,
    pub output: OutputSlot,
}

impl From<ValidatorOptions> for ValidatorConfig {
    fn from(opts: ValidatorOptions) -> Self {
        Self {
            headers: InputSlot {
                schema: opts.headers_schema,
                options: Some(
                    opts.headers_validation_options
                        .unwrap_or_else(default_headers_validation_options),
                ),
                error_message: opts.headers_error_validation_message,
                preserve_raw: opts.preserve_raw_headers.unwrap_or(false),
            },
            input: InputSlot {
                schema: opts.input_schema,
                options: opts.input_validation_options,
                error_message: opts.input_error_validation_message,
                preserve_raw: opts.preserve_raw_body.unwrap_or(false),
            },
            output: OutputSlot {
                schema: opts.output_schema,
                options: opts.output_validation_options,
                error_message: opts.output_error_validation_message,
            },
        }
    }
}
