//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```no_run
/// chunk_lod::core::logging::init();
/// log::info!("Streaming started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .init();
}

/// Initialize logging for tests, ignoring repeated initialization
#[cfg(test)]
pub fn init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}
