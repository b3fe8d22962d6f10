use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Wardchart";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bound on every chart-store round trip. A call that exceeds this surfaces
/// as a retryable `ChartError::Timeout`; the engine never retries itself.
pub const STORE_TIMEOUT_SECS: u64 = 15;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "info,wardchart=debug".to_string()
}

/// Initialize tracing for binaries and integration harnesses embedding the
/// engine. Library consumers that install their own subscriber skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", APP_NAME, APP_VERSION);
}
