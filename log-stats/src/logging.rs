use tracing_subscriber::{EnvFilter, fmt};

/// Installs the diagnostics subscriber. Reports own stdout, so everything
/// here goes to stderr. `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
