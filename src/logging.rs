use env_logger::Env;

/// Installs the global logger. Calling it twice is harmless.
pub fn init(filter: &str) {
    let result = env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}
