//! `tracing` subscriber setup for binaries and long-running hosts.

use crate::config::LogConfig;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

static INIT: Once = Once::new();

/// Installs the global subscriber once. `RUST_LOG` takes precedence over the
/// configured level. Later calls are no-ops, as is a call made after another
/// subscriber was installed elsewhere.
pub fn init(config: &LogConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("RUST_LOG")
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = if config.json {
            fmt::layer()
                .with_target(config.with_targets)
                .json()
                .with_current_span(true)
                .boxed()
        } else {
            fmt::layer().with_target(config.with_targets).boxed()
        };

        let subscriber = Registry::default().with(filter).with(fmt_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
