//! Tracing initialisation for the Lambda binary.
//!
//! `RUST_LOG` takes precedence over the configured level. Safe to call more
//! than once; only the first call installs a subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, RuntimeConfig};

pub fn init_tracing(config: &RuntimeConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .json()
                    .with_current_span(true),
            )
            .try_init()
            .ok(),
        // CloudWatch does not render ANSI colours.
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_ansi(false))
            .try_init()
            .ok(),
    };
}
