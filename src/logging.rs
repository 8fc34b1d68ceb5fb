use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a stdout `tracing` subscriber filtered by `log_level`.
///
/// Returns false when a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> bool {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
        .is_ok()
}

/// Same as [`init_tracing`] with the level taken from `RUST_LOG`.
pub fn init_tracing_from_env() -> bool {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("warn"))
            .with(fmt::layer().with_test_writer())
            .try_init();
        assert!(!init_tracing("debug"));
    }
}
