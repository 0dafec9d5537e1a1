//! Server configuration.

use std::time::Duration;

use dropline_settings::DroplineSettings;

/// Runtime configuration for [`BrokerServer`](crate::server::BrokerServer).
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Seconds between server pings.
    pub heartbeat_interval_secs: u64,
    /// Seconds of silence after which a connection is dropped.
    pub heartbeat_timeout_secs: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Per-connection outbound queue capacity.
    pub send_queue: usize,
}

impl ServerConfig {
    /// Heartbeat tick period.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    /// Silence tolerated before a connection is considered dead.
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 64 * 1024,
            send_queue: 64,
        }
    }
}

impl From<&DroplineSettings> for ServerConfig {
    fn from(settings: &DroplineSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            max_connections: settings.server.max_connections,
            heartbeat_interval_secs: settings.heartbeat.interval_secs,
            heartbeat_timeout_secs: settings.heartbeat.timeout_secs,
            max_message_size: settings.server.max_message_size,
            send_queue: settings.server.send_queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_loopback_on_any_port() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.send_queue, 64);
    }

    #[test]
    fn durations() {
        let cfg = ServerConfig {
            heartbeat_interval_secs: 0,
            heartbeat_timeout_secs: 45,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.heartbeat_interval(), Duration::from_secs(1));
        assert_eq!(cfg.heartbeat_timeout(), Duration::from_secs(45));
    }

    #[test]
    fn from_settings() {
        let mut settings = DroplineSettings::default();
        settings.server.port = 9000;
        settings.server.send_queue = 8;
        settings.heartbeat.interval_secs = 10;
        let cfg = ServerConfig::from(&settings);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_connections, 1024);
        assert_eq!(cfg.send_queue, 8);
        assert_eq!(cfg.heartbeat_interval_secs, 10);
        assert_eq!(cfg.heartbeat_timeout_secs, 90);
    }
}
