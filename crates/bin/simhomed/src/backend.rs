//! Runtime choice between the network simulator and the in-process one.

use simhome_adapter_simulator_tcp::SimulatorClient;
use simhome_adapter_virtual::VirtualSimulator;
use simhome_app::ports::DeviceGateway;
use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::SimHomeError;
use simhome_domain::id::DeviceId;

pub enum Backend {
    Tcp(SimulatorClient),
    Virtual(VirtualSimulator),
}

impl Backend {
    /// The in-process simulator, when that is the active backend.
    #[must_use]
    pub fn simulator(&self) -> Option<VirtualSimulator> {
        match self {
            Self::Tcp(_) => None,
            Self::Virtual(simulator) => Some(simulator.clone()),
        }
    }
}

impl DeviceGateway for Backend {
    async fn fetch_devices(&mut self) -> Result<Vec<Device>, SimHomeError> {
        match self {
            Self::Tcp(client) => client.fetch_devices().await,
            Self::Virtual(simulator) => simulator.fetch_devices().await,
        }
    }

    async fn fetch_device(&mut self, id: &DeviceId) -> Result<Device, SimHomeError> {
        match self {
            Self::Tcp(client) => client.fetch_device(id).await,
            Self::Virtual(simulator) => simulator.fetch_device(id).await,
        }
    }

    async fn send_command(&mut self, id: &DeviceId, command: &Command) -> Result<(), SimHomeError> {
        match self {
            Self::Tcp(client) => client.send_command(id, command).await,
            Self::Virtual(simulator) => simulator.send_command(id, command).await,
        }
    }

    async fn fetch_sensor_values(&mut self) -> Result<Vec<(DeviceId, SensorValue)>, SimHomeError> {
        match self {
            Self::Tcp(client) => client.fetch_sensor_values().await,
            Self::Virtual(simulator) => simulator.fetch_sensor_values().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simhome_adapter_simulator_tcp::SimulatorConfig;

    #[tokio::test]
    async fn should_delegate_to_virtual_simulator() {
        let mut backend = Backend::Virtual(VirtualSimulator::default());
        let devices = backend.fetch_devices().await.unwrap();
        assert_eq!(devices.len(), 8);
        assert!(backend.simulator().is_some());
    }

    #[test]
    fn should_expose_no_simulator_for_tcp_backend() {
        let backend = Backend::Tcp(SimulatorClient::lazy(SimulatorConfig::default()));
        assert!(backend.simulator().is_none());
    }
}
