//! Logging setup.
//!
//! Logs go to stderr so stdout stays clean for stamps and `--json` output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the fmt subscriber. `level` is an `EnvFilter` directive such as
/// `info` or `setlist=debug,warn`; an invalid directive falls back to `info`.
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
