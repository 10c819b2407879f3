//! Device registry: the local mirror of the simulator's devices.
//!
//! Every operation degrades instead of failing: a transport or decode error
//! is logged and the caller gets an empty result, the cached device, or
//! `false`. The mirror is keyed by identifier, so listings are stable.

use std::collections::BTreeMap;

use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::{NotFoundError, SimHomeError};
use simhome_domain::id::DeviceId;

use crate::ports::DeviceGateway;

/// Local copy of the remote device state, kept in sync through a gateway.
pub struct DeviceRegistry<G> {
    gateway: G,
    devices: BTreeMap<DeviceId, Device>,
}

impl<G: DeviceGateway> DeviceRegistry<G> {
    /// Create an empty registry. Call [`discover`](Self::discover) to fill it.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            devices: BTreeMap::new(),
        }
    }

    /// Replace the whole registry with the simulator's device list.
    ///
    /// Returns the number of devices found; a transport failure leaves the
    /// registry empty and returns 0.
    pub async fn discover(&mut self) -> usize {
        match self.gateway.fetch_devices().await {
            Ok(devices) => {
                self.devices = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
                tracing::info!(count = self.devices.len(), "devices discovered");
            }
            Err(err) => {
                self.devices.clear();
                tracing::warn!(error = %err, "device discovery failed");
            }
        }
        self.devices.len()
    }

    /// Refresh one device from the simulator and return it.
    ///
    /// Unknown identifiers yield `None` without a round-trip. When the refresh
    /// fails the last cached copy is returned.
    pub async fn get_state(&mut self, id: &DeviceId) -> Option<Device> {
        if !self.devices.contains_key(id) {
            return None;
        }
        match self.gateway.fetch_device(id).await {
            Ok(mut fresh) => {
                let cached = self.devices.get_mut(id)?;
                if fresh.name.is_empty() {
                    fresh.name = std::mem::take(&mut cached.name);
                }
                fresh.id = id.clone();
                *cached = fresh;
                Some(cached.clone())
            }
            Err(err) => {
                tracing::warn!(device_id = %id, error = %err, "state refresh failed, using cached value");
                self.devices.get(id).cloned()
            }
        }
    }

    /// Send `command` to `id` and merge it into the cached device once the
    /// simulator acknowledges it.
    ///
    /// Returns `false` when the device is unknown, does not accept the
    /// command, or the round-trip fails.
    pub async fn set_state(&mut self, id: &DeviceId, command: &Command) -> bool {
        let Some(device) = self.devices.get(id) else {
            tracing::warn!(device_id = %id, "command for unknown device ignored");
            return false;
        };
        if !device.accepts(command) {
            tracing::warn!(device_id = %id, kind = %device.kind(), %command, "command not supported by device");
            return false;
        }

        if let Err(err) = self.gateway.send_command(id, command).await {
            tracing::warn!(device_id = %id, %command, error = %err, "command failed");
            return false;
        }

        match self.devices.get_mut(id).map(|d| d.apply(command)) {
            Some(Ok(())) => {
                tracing::info!(device_id = %id, %command, "device state set");
                true
            }
            Some(Err(err)) => {
                tracing::warn!(device_id = %id, error = %err, "acknowledged command could not be mirrored");
                true
            }
            None => true,
        }
    }

    /// Pull every sensor value in one round-trip and overwrite the matching
    /// cached readings.
    ///
    /// Returns the number of sensors updated. Values for unknown devices are
    /// ignored; values of the wrong type are skipped with a warning.
    pub async fn refresh_sensor_values(&mut self) -> usize {
        let values = match self.gateway.fetch_sensor_values().await {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(error = %err, "sensor refresh failed, keeping cached values");
                return 0;
            }
        };

        let mut updated = 0;
        for (id, value) in values {
            let Some(device) = self.devices.get_mut(&id) else {
                continue;
            };
            match device.set_sensor_value(value) {
                Ok(()) => updated += 1,
                Err(err) => tracing::warn!(device_id = %id, error = %err, "sensor value skipped"),
            }
        }
        tracing::debug!(updated, "sensor values refreshed");
        updated
    }

    /// Overwrite a cached sensor reading without talking to the simulator.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] for unknown devices and
    /// [`SimHomeError::Validation`] when the value does not fit the sensor.
    pub fn override_sensor_value(
        &mut self,
        id: &DeviceId,
        value: SensorValue,
    ) -> Result<(), SimHomeError> {
        let device = self.devices.get_mut(id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })?;
        device.set_sensor_value(value)?;
        Ok(())
    }
}

impl<G> DeviceRegistry<G> {
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// All devices, ordered by identifier.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Device> {
        self.devices.values().filter(|d| d.is_sensor())
    }

    pub fn actuators(&self) -> impl Iterator<Item = &Device> {
        self.devices.values().filter(|d| !d.is_sensor())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
