//! Tracing subscriber initialization.
//!
//! # Usage
//!
//! ```no_run
//! use rafway_observe::tracing_setup::{LogFormat, init_tracing};
//!
//! init_tracing("info,rafway=debug", LogFormat::Pretty).unwrap();
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format of the `fmt` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for terminals.
    #[default]
    Pretty,
    /// One JSON object per event, for log collectors (`serve --log-json`).
    Json,
}

/// Build the filter: `RUST_LOG` wins when set, otherwise `default_directives`.
pub fn build_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(
    default_directives: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter(default_directives);

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?,
    }

    Ok(())
}

/// Default filter directives for a `-v` count.
pub fn directives_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,rafway=debug,rafway_core=debug,rafway_infra=debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_for_verbosity() {
        assert_eq!(directives_for_verbosity(0, true), "error");
        assert_eq!(directives_for_verbosity(0, false), "warn");
        assert!(directives_for_verbosity(1, false).contains("rafway_core=debug"));
        assert_eq!(directives_for_verbosity(3, true), "trace");
    }

    #[test]
    fn test_init_twice_fails() {
        // The first call may lose a race with another test; the second never succeeds.
        let _ = init_tracing("warn", LogFormat::Pretty);
        assert!(init_tracing("warn", LogFormat::Json).is_err());
    }
}
