//! Tracing subscriber setup

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber from logging configuration
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(logging_config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging_config.level));

    match &logging_config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true);

            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().with_target(true);

            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }
}
