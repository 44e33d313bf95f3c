//! Tracing subscriber setup for the `lf` binary.
//!
//! Log output goes to stderr so that `--json` output on stdout stays
//! machine-readable. The filter is taken from `RUST_LOG`, falling back to
//! `lostfound=info,lostfound_core=info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "lostfound=info,lostfound_core=info";

/// Install the global subscriber. `verbose` raises both crates to `debug`.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lostfound=debug,lostfound_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    // A second init (e.g. in tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
