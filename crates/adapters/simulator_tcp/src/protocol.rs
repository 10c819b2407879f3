//! Wire format spoken by the simulator.
//!
//! Requests are single lines. Discovery is the bare word `GET_DEVICES`; every
//! other request is a JSON object tagged by `command`. Replies are either one
//! line or a block of lines closed by an empty line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use simhome_domain::command::Command;
use simhome_domain::device::{Device, DeviceState, SensorValue};
use simhome_domain::id::DeviceId;

use crate::error::SimulatorError;

pub const GET_DEVICES: &str = "GET_DEVICES";

/// Marker the simulator puts in a successful command reply.
const ACK_MARKER: &str = "OK";

/// Separator between a discovery line's identifier and its JSON body.
/// Identifiers contain colons, so the split happens where the object opens.
const DISCOVERY_SEPARATOR: &str = ":{";

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request<'a> {
    GetState {
        device_id: &'a DeviceId,
    },
    SetState {
        device_id: &'a DeviceId,
        state: &'a Command,
    },
    GetSensorValues,
}

impl Request<'_> {
    /// Serialize to the single JSON line sent on the wire (without newline).
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError::Decode`] if serialization fails.
    pub fn encode(&self) -> Result<String, SimulatorError> {
        serde_json::to_string(self).map_err(SimulatorError::Decode)
    }
}

/// Device as the simulator describes it; the identifier travels outside the
/// object.
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    state: DeviceState,
}

impl DeviceRecord {
    fn into_device(self, id: DeviceId) -> Device {
        Device::new(id, self.name, self.state)
    }
}

/// Parse one `<id>:<json>` discovery line.
///
/// # Errors
///
/// Returns [`SimulatorError::Malformed`] when the line has no identifier or
/// JSON object, and [`SimulatorError::Decode`] when the object is not a
/// device.
pub fn parse_device_line(line: &str) -> Result<Device, SimulatorError> {
    let (raw_id, body) = line
        .find(DISCOVERY_SEPARATOR)
        .map(|at| (&line[..at], &line[at + 1..]))
        .ok_or_else(|| SimulatorError::Malformed(line.to_string()))?;
    let id = DeviceId::new(raw_id).map_err(|_| SimulatorError::Malformed(line.to_string()))?;
    let record: DeviceRecord = serde_json::from_str(body).map_err(SimulatorError::Decode)?;
    Ok(record.into_device(id))
}

/// Parse a whole discovery block, skipping lines that do not decode.
pub fn parse_discovery<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Device> {
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse_device_line(line) {
            Ok(device) => Some(device),
            Err(err) => {
                tracing::warn!(%line, error = %err, "skipping malformed discovery line");
                None
            }
        })
        .collect()
}

/// Parse a `GET_STATE` reply for `id`.
///
/// # Errors
///
/// Returns [`SimulatorError::Decode`] when the reply is not a device object.
pub fn parse_state(id: &DeviceId, reply: &str) -> Result<Device, SimulatorError> {
    let record: DeviceRecord = serde_json::from_str(reply).map_err(SimulatorError::Decode)?;
    Ok(record.into_device(id.clone()))
}

/// Parse a `GET_SENSOR_VALUES` reply, a JSON object keyed by identifier.
///
/// Entries whose value is neither a number nor a boolean are skipped.
///
/// # Errors
///
/// Returns [`SimulatorError::Decode`] when the reply is not a JSON object.
pub fn parse_sensor_values(reply: &str) -> Result<Vec<(DeviceId, SensorValue)>, SimulatorError> {
    let raw: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(reply).map_err(SimulatorError::Decode)?;

    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let id = DeviceId::new(&key).ok()?;
            match serde_json::from_value::<SensorValue>(value) {
                Ok(value) => Some((id, value)),
                Err(err) => {
                    tracing::warn!(device_id = %id, error = %err, "skipping undecodable sensor value");
                    None
                }
            }
        })
        .collect())
}

/// Whether a command reply acknowledges success.
#[must_use]
pub fn is_ack(reply: &str) -> bool {
    reply.contains(ACK_MARKER)
}
