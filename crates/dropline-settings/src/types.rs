//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON file only needs the keys it changes.

use dropline_core::logging::LogFormat;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "logging": { "level": "debug", "format": "json" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DroplineSettings {
    /// Listener and per-connection limits.
    pub server: ServerSettings,
    /// Ping/pong liveness monitoring.
    pub heartbeat: HeartbeatSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl DroplineSettings {
    /// Reject combinations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_connections == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxConnections must be at least 1".into(),
            ));
        }
        if self.server.send_queue == 0 {
            return Err(SettingsError::InvalidValue(
                "server.sendQueue must be at least 1".into(),
            ));
        }
        if self.heartbeat.interval_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "heartbeat.intervalSecs must be at least 1".into(),
            ));
        }
        if self.heartbeat.timeout_secs < self.heartbeat.interval_secs {
            return Err(SettingsError::InvalidValue(format!(
                "heartbeat.timeoutSecs ({}) is shorter than heartbeat.intervalSecs ({})",
                self.heartbeat.timeout_secs, self.heartbeat.interval_secs
            )));
        }
        Ok(())
    }
}

/// Server network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port (`0` picks a free port).
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Outbound events buffered per connection before new ones are dropped.
    pub send_queue: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            max_connections: 1024,
            max_message_size: 64 * 1024,
            send_queue: 64,
        }
    }
}

/// Heartbeat settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatSettings {
    /// Seconds between server pings.
    pub interval_secs: u64,
    /// Seconds without a pong before the connection is dropped.
    pub timeout_secs: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            timeout_secs: 90,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}
