#![forbid(unsafe_code)]

//! Logging glue.
//!
//! With the `tracing` feature the usual macros are re-exported so downstream
//! crates can log through `ftrap_core::debug!` without naming `tracing`
//! themselves. With `tracing-json` a JSON subscriber can be installed for
//! production builds; the filter is read from `FTRAP_LOG` and falls back to
//! `RUST_LOG`, then to `info`.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable consulted first for the log filter.
pub const LOG_ENV: &str = "FTRAP_LOG";

/// Resolve the filter directive from an environment lookup.
///
/// Separated from the process environment so it can be tested.
#[must_use]
pub fn filter_directive<F>(get_env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_env(LOG_ENV)
        .or_else(|| get_env("RUST_LOG"))
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "info".to_owned())
}

/// Install a global JSON subscriber.
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let directive = filter_directive(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
