//! Structured logging via `tracing-subscriber`.
//!
//! Events carry consistent fields:
//! - `level`, `target`, `message`
//! - `component`: emitting component (publisher, provisioner, ...)
//! - `service`: service name, on the root span entered by the caller

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Returned by [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingHandle {
    /// `false` when an earlier call already installed the subscriber.
    pub installed: bool,
}

/// Whether a global subscriber is installed, by [`init_logging`] or anyone else.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter {
        filter: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// Only the first successful call installs anything. Later calls, or calls
/// made after another subscriber was set, return `installed == false`.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingHandle, TelemetryError> {
    if is_initialized() {
        return Ok(LoggingHandle { installed: false });
    }

    let env_filter = env_filter(config)?;

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.with_source)
            .with_line_number(config.with_source);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(config.with_source)
            .with_line_number(config.with_source)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    match result {
        Ok(()) => {
            tracing::debug!(
                service = %config.service_name,
                json_logs = config.json_logs,
                "Logging initialized"
            );
            Ok(LoggingHandle { installed: true })
        }
        // Already set, possibly by a racing thread.
        Err(_) if is_initialized() => Ok(LoggingHandle { installed: false }),
        Err(e) => Err(TelemetryError::Subscriber(e.to_string())),
    }
}

/// Emit an event tagged with a `component` field.
///
/// ```rust
/// bus_telemetry::log_event!(info, "provisioner", "Topic created", topic = "orders");
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}
