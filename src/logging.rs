use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

static INIT: Once = Once::new();

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level. Safe to call
/// more than once; only the first call installs a subscriber.
pub fn init(config: &AppConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

        if config.log_json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    });
}
