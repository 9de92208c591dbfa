use lambda_schema_validator::{build_interceptors, load_validator_spec};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Handler Validation ===\n");

    let spec_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("validator-spec.yaml"));

    let spec = match load_validator_spec(&spec_path) {
        Ok(spec) => {
            println!("✓ Loaded {} handler(s) from {}", spec.handlers.len(), spec_path.display());
            spec
        }
        Err(e) => {
            eprintln!("✗ Failed to load spec: {}", e);
            std::process::exit(1);
        }
    };

    let interceptors = match build_interceptors(&spec) {
        Ok(interceptors) => interceptors,
        Err(e) => {
            eprintln!("✗ Failed to build interceptors: {}", e);
            std::process::exit(1);
        }
    };

    for (name, interceptor) in &interceptors {
        let phases = interceptor.phases();
        println!(
            "  {:<24} before: {:<5} after: {}",
            name, phases.before, phases.after
        );
    }

    println!("\nReady to validate handler traffic.");
}
