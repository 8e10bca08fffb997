//! User interface module - terminal output and diagnostic logging.
//!
//! Separates concerns:
//! - `formatter` - The user-visible step trace
//! - This module - Setup of the `tracing` diagnostics behind `--verbose`

use tracing_subscriber::EnvFilter;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_plan, display_release_notes,
    display_status, display_success, display_version_change,
};

/// Install the diagnostic log subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
/// output for this crate when `verbose` is set. Logs go to stderr so they
/// never mix with the step trace on stdout.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "warn,auto_release=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
