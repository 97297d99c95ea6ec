use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global subscriber. Honours `RUST_LOG`, defaulting to `info`.
pub(crate) fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).compact().init();
}
