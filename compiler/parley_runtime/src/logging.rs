//! Tracing bootstrap for hosts that embed the runtime.

use std::sync::Once;

use crate::config::Verbosity;

static TRACING_INIT: Once = Once::new();

/// Install a global `tracing` subscriber, once per process.
///
/// `RUST_LOG` wins when set; otherwise events at or above the level of
/// `verbosity` are printed. Later calls do nothing.
pub fn init_tracing(verbosity: Verbosity) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::default().add_directive(verbosity.level_filter().into())
        };
        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}
