//! Default device set, matching the identifiers used by the built-in rules.

use simhome_domain::device::{DEFAULT_AC_TEMPERATURE, Device, DeviceState};
use simhome_domain::id::DeviceId;

fn device(id: &str, name: &str, state: DeviceState) -> Option<Device> {
    DeviceId::new(id).ok().map(|id| Device::new(id, name, state))
}

/// The simulated home: three sensors and five actuators, all idle.
#[must_use]
pub fn default_devices() -> Vec<Device> {
    [
        device(
            "IoT:Sensor:Temp:1",
            "Temperature",
            DeviceState::TempSensor { value: 22.0 },
        ),
        device(
            "IoT:Sensor:Motion:1",
            "Motion",
            DeviceState::MotionSensor { value: false },
        ),
        device(
            "IoT:Sensor:Smoke:1",
            "Smoke",
            DeviceState::SmokeSensor { value: false },
        ),
        device(
            "IoT:Light:1",
            "Living room light",
            DeviceState::Light { status: false },
        ),
        device(
            "IoT:Light:2",
            "Kitchen light",
            DeviceState::Light { status: false },
        ),
        device(
            "IoT:Light:3",
            "Hallway light",
            DeviceState::Light { status: false },
        ),
        device(
            "IoT:Fan:1",
            "Ceiling fan",
            DeviceState::Fan {
                status: false,
                speed: 1,
            },
        ),
        device(
            "IoT:AC:1",
            "Air conditioner",
            DeviceState::Ac {
                status: false,
                temp: DEFAULT_AC_TEMPERATURE,
            },
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
