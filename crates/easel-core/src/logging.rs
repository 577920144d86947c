//! Logging setup based on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor an explicit directive is given.
pub const DEFAULT_FILTER: &str = "info,egui=warn";

/// Install the default fmt subscriber.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install the fmt subscriber, preferring `RUST_LOG` over `filter`.
///
/// Calling this more than once is harmless: the second subscriber is
/// rejected and the first one stays installed.
pub fn init_with_filter(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}
