//! Tracing setup.
//!
//! Call [`setup_tracing`] once at the very start of `main`. Events are filtered by
//! `RUST_LOG` (default `info`) and written to stdout.
//!
//! Without the `pretty_logs` feature the output is plain text for log aggregation:
//! ```text
//! INFO  catalog_api::platform::credentials: Using platform credentials from environment variables [initialize]
//! ```
//!
//! With `pretty_logs` it is colored, timestamped and shows the span nesting:
//! ```text
//! 14:32:01.234 INFO  | catalog_api::platform::credentials: Using platform credentials from environment variables
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

#[cfg(feature = "pretty_logs")]
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(feature = "pretty_logs")]
mod pretty;

#[cfg(not(feature = "pretty_logs"))]
mod production;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn setup_tracing() {
    Registry::default().with(setup_console_layer()).init();
    tracing::info!(
        "Tracing initialized for {} {}",
        crate::APP_NAME.as_str(),
        crate::APP_VERSION.as_str()
    );
}

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(feature = "pretty_logs")]
fn setup_console_layer() -> Box<dyn Layer<Registry> + Send + Sync + 'static> {
    tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NEW)
        .event_format(pretty::PrettyConsoleLogFormat)
        .with_filter(console_filter())
        .boxed()
}

#[cfg(not(feature = "pretty_logs"))]
fn setup_console_layer() -> Box<dyn Layer<Registry> + Send + Sync + 'static> {
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(production::ProductionLogFormat)
        .with_filter(console_filter())
        .boxed()
}
