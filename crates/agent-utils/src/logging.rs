//! Logging and tracing utilities
//!
//! Log lines go to stderr. Terminal channels use stdout for chat, so it
//! must carry nothing but the conversation.

use std::io::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::{
    EnvFilter, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,agent_stock=info,agent_runtime=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(LogFormat::Pretty);
}

/// Initialize tracing subscriber with the given output format
///
/// The filter comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
/// Colour is only used when stderr is a terminal. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_tracing_with(format: LogFormat) {
    let ansi = std::io::stderr().is_terminal();
    if subscriber(format, std::io::stderr, ansi).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Subscriber writing `format` lines to `writer`
fn subscriber<W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let pretty = (format == LogFormat::Pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(ansi)
    });
    let json = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
}
