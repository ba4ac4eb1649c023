//! Diagnostic tracing for the simulator.
//!
//! Step traces are product output and always go to stdout or the HTTP
//! response. Tracing here is for diagnostics only and goes to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "errdetect_sim=info,errdetect_core=warn";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=errdetect_core=debug errdetect-sim --technique crc --data 1101
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
