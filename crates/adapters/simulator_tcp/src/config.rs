//! Simulator connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where the simulator listens and how long to wait for its replies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Simulator hostname or IP address.
    pub host: String,
    /// Simulator TCP port.
    pub port: u16,
    /// Upper bound for one request/reply round-trip, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 5,
        }
    }
}

impl SimulatorConfig {
    /// `host:port` as accepted by `TcpStream::connect`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
