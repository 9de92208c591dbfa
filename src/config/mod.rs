pub mod builder;
pub mod loader;

pub use builder::{build_interceptor, build_interceptors};
pub use loader::{load_validator_spec, parse_validator_spec, ValidatorSpec, ValidatorSpecFile};
