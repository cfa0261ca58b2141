//! Logging setup
//!
//! `RUST_LOG` wins over the built-in `smartq=info` filter. Console output is
//! pretty or JSON; a daily rolling file is added when `log.dir` is set.

use crate::config::{LogFormat, LogSection};
use crate::telemetry;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "smartq=info";
const LOG_FILE_PREFIX: &str = "smartq.log";

/// Install the global subscriber
///
/// Keep the returned guard alive for the life of the process, or buffered
/// file output is lost on exit.
pub fn init(section: &LogSection) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("building log filter")?;

    let console = match section.format {
        // Production: JSON structured logging
        LogFormat::Json => fmt::layer().json().boxed(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    let (file, guard) = match &section.dir {
        Some(dir) => {
            let dir = shellexpand::tilde(dir).into_owned();
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file);

    #[cfg(feature = "telemetry")]
    let registry = registry.with(telemetry::layer()?);

    registry.try_init().context("installing tracing subscriber")?;

    telemetry::report();
    Ok(guard)
}
