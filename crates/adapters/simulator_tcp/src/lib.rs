//! # simhome-adapter-simulator-tcp
//!
//! [`DeviceGateway`] over the simulator's line-oriented TCP protocol.
//!
//! ## Protocol
//!
//! | Request | Sent | Reply |
//! |---------|------|-------|
//! | discovery | `GET_DEVICES` | `<id>:<json>` lines, then an empty line |
//! | state | `{"command":"GET_STATE",..}` | one JSON line |
//! | command | `{"command":"SET_STATE",..}` | one line containing `OK` on success |
//! | sensor values | `{"command":"GET_SENSOR_VALUES"}` | JSON object, then an empty line |
//!
//! ## Connection handling
//!
//! Requests are strictly sequential on one connection. Each round-trip is
//! bounded by the configured timeout. A round-trip that fails, times out or
//! is cancelled before its reply is complete drops the socket, and the next
//! request opens a fresh one. There is no retry within a request.
//!
//! ## Dependency rule
//!
//! Depends on `simhome-app` (port traits) and `simhome-domain` only.

pub mod config;
pub mod error;
pub mod protocol;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use simhome_app::ports::DeviceGateway;
use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::SimHomeError;
use simhome_domain::id::DeviceId;

pub use config::SimulatorConfig;
pub use error::SimulatorError;

use protocol::Request;

/// Shape of the reply a request expects.
#[derive(Debug, Clone, Copy)]
enum Reply {
    Line,
    Block,
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(addr: &str) -> Result<Self, SimulatorError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| SimulatorError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        let (read, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read),
            writer,
        })
    }

    async fn send_line(&mut self, line: &str) -> Result<(), SimulatorError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line without its terminator; `None` at end of stream.
    async fn next_line(&mut self) -> Result<Option<String>, SimulatorError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    async fn read_line(&mut self) -> Result<String, SimulatorError> {
        self.next_line().await?.ok_or(SimulatorError::Closed)
    }

    /// Lines up to the empty terminator line. A stream closed after at least
    /// one line still yields what was received.
    async fn read_block(&mut self) -> Result<Vec<String>, SimulatorError> {
        let mut lines = Vec::new();
        loop {
            match self.next_line().await? {
                Some(line) if line.trim().is_empty() => return Ok(lines),
                Some(line) => lines.push(line),
                None if lines.is_empty() => return Err(SimulatorError::Closed),
                None => return Ok(lines),
            }
        }
    }
}

/// Client for the network device simulator.
pub struct SimulatorClient {
    config: SimulatorConfig,
    connection: Option<Connection>,
}

impl SimulatorClient {
    /// Connect to the simulator.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError::Connect`] if the TCP connection fails.
    pub async fn connect(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let addr = config.address();
        let connection = Connection::open(&addr).await?;
        tracing::info!(%addr, "connected to simulator");
        Ok(Self {
            config,
            connection: Some(connection),
        })
    }

    /// Create a client that connects on its first request.
    #[must_use]
    pub fn lazy(config: SimulatorConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    async fn exchange(&mut self, request: &str, reply: Reply) -> Result<Vec<String>, SimulatorError> {
        let limit = self.config.request_timeout();
        let result = tokio::time::timeout(limit, self.round_trip(request, reply))
            .await
            .unwrap_or_else(|_| Err(SimulatorError::Timeout(limit)));

        if let Err(err) = &result {
            tracing::warn!(error = %err, "simulator connection dropped");
        }
        result
    }

    /// The connection is held outside `self` until its reply is fully read,
    /// so a failed or cancelled round-trip leaves the client disconnected.
    async fn round_trip(&mut self, request: &str, reply: Reply) -> Result<Vec<String>, SimulatorError> {
        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                let addr = self.config.address();
                tracing::info!(%addr, "reconnecting to simulator");
                Connection::open(&addr).await?
            }
        };

        tracing::trace!(%request, "simulator request");
        connection.send_line(request).await?;
        let lines = match reply {
            Reply::Line => vec![connection.read_line().await?],
            Reply::Block => connection.read_block().await?,
        };
        self.connection = Some(connection);
        Ok(lines)
    }

    async fn exchange_line(&mut self, request: &str) -> Result<String, SimulatorError> {
        let mut lines = self.exchange(request, Reply::Line).await?;
        lines.pop().ok_or(SimulatorError::Closed)
    }
}

impl DeviceGateway for SimulatorClient {
    async fn fetch_devices(&mut self) -> Result<Vec<Device>, SimHomeError> {
        let lines = self.exchange(protocol::GET_DEVICES, Reply::Block).await?;
        Ok(protocol::parse_discovery(lines.iter().map(String::as_str)))
    }

    async fn fetch_device(&mut self, id: &DeviceId) -> Result<Device, SimHomeError> {
        let request = Request::GetState { device_id: id }.encode()?;
        let reply = self.exchange_line(&request).await?;
        Ok(protocol::parse_state(id, &reply)?)
    }

    async fn send_command(&mut self, id: &DeviceId, command: &Command) -> Result<(), SimHomeError> {
        let request = Request::SetState {
            device_id: id,
            state: command,
        }
        .encode()?;
        let reply = self.exchange_line(&request).await?;
        if protocol::is_ack(&reply) {
            Ok(())
        } else {
            Err(SimulatorError::Rejected(reply).into())
        }
    }

    async fn fetch_sensor_values(&mut self) -> Result<Vec<(DeviceId, SensorValue)>, SimHomeError> {
        let request = Request::GetSensorValues.encode()?;
        let lines = self.exchange(&request, Reply::Block).await?;
        Ok(protocol::parse_sensor_values(&lines.join("\n"))?)
    }
}
