//! Logging setup with tracing_subscriber. Call once from the embedding
//! binary or worker before scans start.

/// Initialize logging. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("seoscan=debug".parse().unwrap())
        .add_directive("info".parse().unwrap());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .try_init();
}
