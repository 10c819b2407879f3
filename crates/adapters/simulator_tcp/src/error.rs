//! TCP adapter error types.

use std::time::Duration;

use simhome_domain::error::SimHomeError;

/// Errors specific to the simulator connection.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// Opening the TCP connection failed.
    #[error("failed to connect to simulator at {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the socket failed.
    #[error("simulator I/O error")]
    Io(#[from] std::io::Error),

    /// The simulator did not answer in time.
    #[error("simulator did not answer within {0:?}")]
    Timeout(Duration),

    /// The simulator closed the connection before replying.
    #[error("simulator closed the connection")]
    Closed,

    /// A reply was not the JSON we expected.
    #[error("failed to decode simulator reply")]
    Decode(#[source] serde_json::Error),

    /// A reply line had no recognisable structure.
    #[error("malformed simulator reply: {0}")]
    Malformed(String),

    /// The simulator answered a command without acknowledging it.
    #[error("simulator rejected the command: {0}")]
    Rejected(String),
}

impl SimulatorError {
    /// Convert into a [`SimHomeError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> SimHomeError {
        match self {
            Self::Decode(err) => SimHomeError::Decode(err),
            other => SimHomeError::Transport(Box::new(other)),
        }
    }
}

impl From<SimulatorError> for SimHomeError {
    fn from(err: SimulatorError) -> Self {
        err.into_domain()
    }
}
