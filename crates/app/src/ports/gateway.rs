//! Gateway port: the round-trips the registry makes to the simulator.
//!
//! A gateway is owned by exactly one [`DeviceRegistry`](crate::registry::DeviceRegistry)
//! and every call is a single request/response on one connection, hence
//! `&mut self`. Implementations never retry; a failed round-trip is reported
//! once and the registry decides how to degrade.

use std::future::Future;

use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::SimHomeError;
use simhome_domain::id::DeviceId;

/// Remote side of the device registry.
pub trait DeviceGateway: Send {
    /// List every device the simulator exposes.
    fn fetch_devices(&mut self) -> impl Future<Output = Result<Vec<Device>, SimHomeError>> + Send;

    /// Read the current state of one device.
    ///
    /// A decoded device with an empty name means the simulator did not send one.
    fn fetch_device(
        &mut self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Device, SimHomeError>> + Send;

    /// Send `command` to `id` and wait for the acknowledgement.
    fn send_command(
        &mut self,
        id: &DeviceId,
        command: &Command,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Read every sensor value in one round-trip.
    fn fetch_sensor_values(
        &mut self,
    ) -> impl Future<Output = Result<Vec<(DeviceId, SensorValue)>, SimHomeError>> + Send;
}
