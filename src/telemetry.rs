//! Logging bootstrap for the warehouse binaries.

use crate::{Error, Result};

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Handle describing the installed subscriber.
#[derive(Debug, Clone)]
pub struct Telemetry {
    component: String,
    level: Level,
}

impl Telemetry {
    /// Install the process-wide JSON subscriber for a binary.
    pub fn init_for_component(component: &str, log_level: &str) -> Result<Self> {
        let component = component.trim();
        if component.is_empty() {
            return Err(Error::Config("component name cannot be empty".to_string()));
        }
        let level = parse_log_level(log_level)?;

        FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .try_init()
            .map_err(|e| {
                Error::Config(format!("failed to initialize telemetry subscriber: {e}"))
            })?;

        info!(
            component = %component,
            log_level = %level,
            "Telemetry bootstrap initialized"
        );

        Ok(Self {
            component: component.to_string(),
            level,
        })
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

pub fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(Error::Config(format!(
            "invalid log level '{other}', expected one of [trace, debug, info, warn, error]"
        ))),
    }
}
