// system-tests/tests/helpers/logging.rs
// ============================================================================
// Module: Test Logging
// Description: Tracing subscriber setup for system-test binaries.
// Purpose: Route client and runner events through the test writer.
// Dependencies: tracing-subscriber
// ============================================================================

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the subscriber once per binary; `RUST_LOG` overrides the default.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,system_tests=info"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(filter)
            .try_init();
    });
}
