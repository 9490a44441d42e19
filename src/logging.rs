//! Diagnostic logging to stderr.
//!
//! The report goes to stdout, so every log line is written to stderr. The
//! filter honours `RUST_LOG`; without it only warnings are shown, or debug
//! output from the foldercmp crates with `--verbose`.

use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str =
    "warn,foldercmp=debug,foldercmp_core=debug,foldercmp_scan=debug,foldercmp_analyze=debug";

/// Install the global subscriber.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { "warn" })
    });

    // Fails only if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
