//! Tracing initialisation for the fixver binary.
//!
//! Diagnostics share stdout with the text report by default. When stdout
//! carries a machine-readable document, pass `LogTarget::Stderr`.
//! [`init_tracing`] may be called more than once; only the first call
//! installs a subscriber.

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Where diagnostics are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
}

impl LogTarget {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// * `json`: newline-delimited JSON log lines instead of human-readable ones.
/// * `level`: verbosity used when `RUST_LOG` is unset or invalid.
/// * `target`: stdout or stderr.
pub fn init_tracing(json: bool, level: Level, target: LogTarget) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(target.make_writer());
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer.without_time()).try_init()
    };
    // A subscriber is already installed (tests, embedding); keep it.
    installed.ok();
}
