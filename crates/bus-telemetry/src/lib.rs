//! # Bus Telemetry
//!
//! Structured logging for topic-bus services.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bus_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), bus_telemetry::TelemetryError> {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config)?;
//!
//!     bus_telemetry::log_event!(info, "publisher", "started", topic = "orders");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `topic-bus` | Service name attached to logs |
//! | `BUS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BUS_JSON_LOGS` | `false` (`true` in containers) | JSON formatted output |

#![warn(clippy::all)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, is_initialized, LoggingHandle};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter `{filter}`: {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}
