use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CARD_INJECTOR_LOG";
const DEFAULT_FILTER: &str = "info";

/// Filter directives from `CARD_INJECTOR_LOG` (e.g. `debug` or
/// `card_injector_core=debug`), falling back to `info`.
pub fn log_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the stderr subscriber. Later calls are ignored.
pub fn init_logging() {
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
