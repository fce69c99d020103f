//! `tracing` subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity count (`-v` repeats).
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "specter=info",
        1 => "specter=debug",
        _ => "specter=trace",
    }
}

/// Install a stderr formatter. `RUST_LOG` takes precedence over `verbosity`.
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
