//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize Sentinel logging.
///
/// Reads `SENTINEL_LOG` for per-subsystem levels, e.g.
/// `SENTINEL_LOG=sentinel_analysis=debug,sentinel_storage=warn`.
/// Falls back to `sentinel=info` when unset or invalid.
///
/// Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SENTINEL_LOG")
            .unwrap_or_else(|_| EnvFilter::new("sentinel=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
