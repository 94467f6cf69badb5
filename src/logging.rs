//! Subscriber setup shared by the CLI and server binaries.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! binary installs a subscriber. `RUST_LOG` overrides the default level:
//!
//! ```bash
//! RUST_LOG=canyonsim::formation=trace canyonsim simulate scenario.json
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, coloured
    #[default]
    Pretty,
    /// Single-line
    Compact,
    /// One JSON object per event
    Json,
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free for data.
/// A second call is a no-op.
pub fn init(format: LogFormat, default_level: &str) {
    let registry = tracing_subscriber::registry().with(filter(default_level));
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
