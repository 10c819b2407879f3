//! Status report: a printable snapshot of every known device.

use std::fmt;

use crate::device::{Device, DeviceState};
use crate::time::Timestamp;

/// Snapshot of the registry taken at the end of a monitoring cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub timestamp: Timestamp,
    pub devices: Vec<Device>,
}

impl StatusReport {
    #[must_use]
    pub fn new<'a>(timestamp: Timestamp, devices: impl IntoIterator<Item = &'a Device>) -> Self {
        Self {
            timestamp,
            devices: devices.into_iter().cloned().collect(),
        }
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_sensor())
    }

    pub fn actuators(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| !d.is_sensor())
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Smart home status report ---")?;
        writeln!(f, "Time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f)?;
        writeln!(f, "Sensors:")?;
        for sensor in self.sensors() {
            if let Some(value) = sensor.sensor_value() {
                writeln!(f, "  - {}: {value}", sensor.name)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Devices:")?;
        for device in self.actuators() {
            let power = if device.state.status().unwrap_or(false) {
                "ON"
            } else {
                "OFF"
            };
            write!(f, "  - {}: {power}", device.name)?;
            match device.state {
                DeviceState::Ac { temp, .. } => write!(f, ", {temp}\u{b0}C")?,
                DeviceState::Fan { speed, .. } => write!(f, ", speed: {speed}")?,
                _ => {}
            }
            writeln!(f)?;
        }
        write!(f, "--------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeviceId;

    fn device(id: &str, name: &str, state: DeviceState) -> Device {
        Device::new(DeviceId::new(id).unwrap(), name, state)
    }

    fn report() -> StatusReport {
        let devices = [
            device(
                "IoT:Sensor:Temp:1",
                "Temperature",
                DeviceState::TempSensor { value: 26.5 },
            ),
            device(
                "IoT:Fan:1",
                "Fan",
                DeviceState::Fan {
                    status: true,
                    speed: 2,
                },
            ),
            device(
                "IoT:AC:1",
                "Air Conditioner",
                DeviceState::Ac {
                    status: false,
                    temp: 22,
                },
            ),
            device("IoT:Light:1", "Hall Light", DeviceState::Light { status: false }),
        ];
        StatusReport::new(crate::time::now(), &devices)
    }

    #[test]
    fn should_partition_sensors_and_actuators() {
        let report = report();
        assert_eq!(report.sensors().count(), 1);
        assert_eq!(report.actuators().count(), 3);
    }

    #[test]
    fn should_render_sensor_values() {
        let text = report().to_string();
        assert!(text.contains("  - Temperature: 26.5"));
    }

    #[test]
    fn should_render_actuator_details() {
        let text = report().to_string();
        assert!(text.contains("  - Fan: ON, speed: 2"));
        assert!(text.contains("  - Air Conditioner: OFF, 22\u{b0}C"));
        assert!(text.contains("  - Hall Light: OFF\n"));
    }
}
