//! Subscriber construction.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line (servers, log shippers).
    #[default]
    Json,
    /// Human-readable single lines (terminals).
    Compact,
}

impl LogFormat {
    /// `QUANTII_LOG_FORMAT=compact` switches to terminal output.
    pub fn from_env() -> Self {
        std::env::var("QUANTII_LOG_FORMAT")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "compact" | "text" | "pretty" => Some(Self::Compact),
            _ => None,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Subsequent calls are no-ops.
pub fn init_with(format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(false);

    let _ = match format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
