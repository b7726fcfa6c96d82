//! Log output for the `chords` binary
//!
//! Logs go to stderr so command output on stdout stays clean. The level
//! comes from `-v` flags unless `RUST_LOG` is set:
//!
//! - `RUST_LOG=debug` - everything at debug
//! - `RUST_LOG=chords::core=trace` - one module
//! - `RUST_LOG=chords::notice=info` - only operator notices

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter for a number of `-v` flags
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,chords::notice=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber
///
/// Calling it again (as tests may) leaves the first subscriber in place.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 0)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
