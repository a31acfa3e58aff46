//! Log subscriber setup shared by the `letti-qa` binaries.

use tracing_subscriber::EnvFilter;

/// Quiet default for the CLI; stdout carries the user-facing report.
pub const CLI_LOG_FILTER: &str = "warn";
/// Default for long-running servers.
pub const SERVER_LOG_FILTER: &str =
    "info,qad=info,qa_store=info,qa_expander=info,qa_analyze=info,tower_http=info";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` overrides `default_filter`.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        assert!(CLI_LOG_FILTER.parse::<EnvFilter>().is_ok());
        assert!(SERVER_LOG_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging(CLI_LOG_FILTER);
        init_logging(SERVER_LOG_FILTER);
    }
}
