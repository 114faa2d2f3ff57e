//! Layered settings.
//!
//! Settings are resolved from, lowest to highest priority: built-in defaults,
//! an optional TOML file, `CLF_DASHBOARD_*` environment variables and
//! command-line overrides.
//!
//! ```toml
//! addr = "analytics.internal:8000"
//! refresh = "1s"
//! close_timeout = "1s"
//! acknowledge = true
//! log_file = "/tmp/clf-dashboard.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::StreamKind;
use crate::error::ConfigError;

const DEFAULT_ADDR: &str = "localhost:8000";
const DEFAULT_REFRESH: &str = "1s";
const DEFAULT_CLOSE_TIMEOUT: &str = "1s";
const DEFAULT_ACK_PAYLOAD: &str = "ack";
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_LOG_FILE_NAME: &str = "clf-dashboard.log";

/// Environment variable prefix (`CLF_DASHBOARD_ADDR`, ...).
pub const ENV_PREFIX: &str = "CLF_DASHBOARD";

/// Resolved dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Server `host:port`.
    pub addr: String,
    /// Render tick interval.
    pub refresh: Duration,
    /// Grace period for the close handshake during shutdown.
    pub close_timeout: Duration,
    /// Send an acknowledgment after every decoded batch.
    pub acknowledge: bool,
    /// Text of the acknowledgment frame.
    pub ack_payload: String,
    /// Log destination. Logs never go to the terminal the dashboard draws on.
    pub log_file: PathBuf,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            refresh: Duration::from_secs(1),
            close_timeout: Duration::from_secs(1),
            acknowledge: false,
            ack_payload: DEFAULT_ACK_PAYLOAD.to_string(),
            log_file: default_log_file(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub addr: Option<String>,
    pub refresh: Option<String>,
    pub close_timeout: Option<String>,
    pub acknowledge: Option<bool>,
    pub log_file: Option<PathBuf>,
}

/// Settings as they come out of the `config` layers, before validation.
#[derive(Debug, Deserialize)]
struct RawSettings {
    addr: String,
    refresh: String,
    close_timeout: String,
    acknowledge: bool,
    ack_payload: String,
    #[serde(default)]
    log_file: Option<PathBuf>,
    log_filter: String,
}

impl Settings {
    /// Resolve settings from every layer.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("addr", DEFAULT_ADDR)?
            .set_default("refresh", DEFAULT_REFRESH)?
            .set_default("close_timeout", DEFAULT_CLOSE_TIMEOUT)?
            .set_default("acknowledge", false)?
            .set_default("ack_payload", DEFAULT_ACK_PAYLOAD)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("addr", overrides.addr.clone())?
            .set_override_option("refresh", overrides.refresh.clone())?
            .set_override_option("close_timeout", overrides.close_timeout.clone())?
            .set_override_option("acknowledge", overrides.acknowledge)?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?;

        let raw: RawSettings = config.try_deserialize()?;
        Ok(Self {
            refresh: duration_setting("refresh", &raw.refresh, false)?,
            close_timeout: duration_setting("close_timeout", &raw.close_timeout, true)?,
            addr: raw.addr,
            acknowledge: raw.acknowledge,
            ack_payload: raw.ack_payload,
            log_file: raw.log_file.unwrap_or_else(default_log_file),
            log_filter: raw.log_filter,
        })
    }

    /// Websocket URL of the endpoint serving `kind`.
    pub fn stream_url(&self, kind: StreamKind) -> String {
        format!("ws://{}{}", self.addr, kind.path())
    }

    /// The acknowledgment to send after each batch, if enabled.
    pub fn ack(&self) -> Option<String> {
        self.acknowledge.then(|| self.ack_payload.clone())
    }
}

/// `clf-dashboard.log` in the system temporary directory.
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOG_FILE_NAME)
}

fn duration_setting(
    key: &'static str,
    value: &str,
    allow_zero: bool,
) -> Result<Duration, ConfigError> {
    match parse_duration(value) {
        Some(d) if allow_zero || !d.is_zero() => Ok(d),
        _ => Err(ConfigError::Duration {
            key,
            value: value.to_string(),
        }),
    }
}
