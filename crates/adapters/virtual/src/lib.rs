//! # simhome-adapter-virtual
//!
//! In-process stand-ins for the outside world, used by the demo and by
//! tests that should not need a running simulator.
//!
//! ## Provided devices
//!
//! | Device | Identifier | Kind |
//! |--------|------------|------|
//! | Temperature | `IoT:Sensor:Temp:1` | numeric sensor, starts at 22.0 |
//! | Motion | `IoT:Sensor:Motion:1` | boolean sensor |
//! | Smoke | `IoT:Sensor:Smoke:1` | boolean sensor |
//! | Living room / Kitchen / Hallway light | `IoT:Light:1..3` | switch |
//! | Ceiling fan | `IoT:Fan:1` | fan, speed 1–3 |
//! | Air conditioner | `IoT:AC:1` | climate, 18–30 °C |
//!
//! The GPIO module provides a virtual output pin and analog thermometer for
//! the polling controllers.
//!
//! ## Dependency rule
//!
//! Depends on `simhome-app` (port traits) and `simhome-domain` only.

mod devices;
pub mod gpio;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use simhome_app::ports::DeviceGateway;
use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::{NotFoundError, SimHomeError};
use simhome_domain::id::DeviceId;

pub use devices::default_devices;
pub use gpio::{VirtualPin, VirtualThermometer};

/// Simulator running in-process. Clones share the same devices, so a test or
/// the demo can change sensor values while the registry talks to it.
#[derive(Clone)]
pub struct VirtualSimulator {
    devices: Arc<Mutex<BTreeMap<DeviceId, Device>>>,
}

impl Default for VirtualSimulator {
    fn default() -> Self {
        Self::new(default_devices())
    }
}

impl VirtualSimulator {
    #[must_use]
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        let devices = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            devices: Arc::new(Mutex::new(devices)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<DeviceId, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change a sensor reading, as if the environment had changed.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] for unknown devices and
    /// [`SimHomeError::Validation`] when the value does not fit the sensor.
    pub fn set_sensor(&self, id: &DeviceId, value: SensorValue) -> Result<(), SimHomeError> {
        let mut devices = self.lock();
        let device = devices.get_mut(id).ok_or_else(|| not_found(id))?;
        device.set_sensor_value(value)?;
        tracing::debug!(device_id = %id, %value, "virtual sensor changed");
        Ok(())
    }

    /// Current state of one device.
    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<Device> {
        self.lock().get(id).cloned()
    }
}

fn not_found(id: &DeviceId) -> SimHomeError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

impl DeviceGateway for VirtualSimulator {
    async fn fetch_devices(&mut self) -> Result<Vec<Device>, SimHomeError> {
        Ok(self.lock().values().cloned().collect())
    }

    async fn fetch_device(&mut self, id: &DeviceId) -> Result<Device, SimHomeError> {
        self.device(id).ok_or_else(|| not_found(id))
    }

    async fn send_command(&mut self, id: &DeviceId, command: &Command) -> Result<(), SimHomeError> {
        let mut devices = self.lock();
        let device = devices.get_mut(id).ok_or_else(|| not_found(id))?;
        device.apply(command)?;
        tracing::info!(device_id = %id, %command, "virtual device updated");
        Ok(())
    }

    async fn fetch_sensor_values(&mut self) -> Result<Vec<(DeviceId, SensorValue)>, SimHomeError> {
        Ok(self
            .lock()
            .values()
            .filter_map(|d| d.sensor_value().map(|v| (d.id.clone(), v)))
            .collect())
    }
}
