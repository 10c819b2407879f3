//! Device: a sensor or actuator mirrored from the simulator.
//!
//! Each device carries a typed [`DeviceState`] instead of a free-form map:
//! numeric sensors, boolean sensors, a switchable actuator (light) and two
//! actuators with a level (fan speed, air-conditioner temperature).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::ValidationError;
use crate::id::DeviceId;

/// Default set-point reported for an air conditioner that omits `temp`.
pub const DEFAULT_AC_TEMPERATURE: i32 = 22;

/// Kind of device, matching the simulator's `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    TempSensor,
    MotionSensor,
    SmokeSensor,
    Light,
    Fan,
    Ac,
}

impl DeviceKind {
    /// Sensors are read-only; every other kind accepts commands.
    #[must_use]
    pub fn is_sensor(self) -> bool {
        matches!(
            self,
            Self::TempSensor | Self::MotionSensor | Self::SmokeSensor
        )
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TempSensor => "temp_sensor",
            Self::MotionSensor => "motion_sensor",
            Self::SmokeSensor => "smoke_sensor",
            Self::Light => "light",
            Self::Fan => "fan",
            Self::Ac => "ac",
        })
    }
}

/// A sensor reading or a trigger threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Flag(bool),
    Number(f64),
}

impl SensorValue {
    /// Human-readable name of the value type, used in validation messages.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Flag(_) => "boolean",
            Self::Number(_) => "numeric",
        }
    }

    /// Whether both values hold the same type.
    #[must_use]
    pub fn same_type(self, other: Self) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for SensorValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for SensorValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Current state of a device, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceState {
    TempSensor {
        #[serde(default)]
        value: f64,
    },
    MotionSensor {
        #[serde(default)]
        value: bool,
    },
    SmokeSensor {
        #[serde(default)]
        value: bool,
    },
    Light {
        #[serde(default)]
        status: bool,
    },
    Fan {
        #[serde(default)]
        status: bool,
        #[serde(default)]
        speed: u8,
    },
    Ac {
        #[serde(default)]
        status: bool,
        #[serde(default = "default_ac_temperature")]
        temp: i32,
    },
}

fn default_ac_temperature() -> i32 {
    DEFAULT_AC_TEMPERATURE
}

impl DeviceState {
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::TempSensor { .. } => DeviceKind::TempSensor,
            Self::MotionSensor { .. } => DeviceKind::MotionSensor,
            Self::SmokeSensor { .. } => DeviceKind::SmokeSensor,
            Self::Light { .. } => DeviceKind::Light,
            Self::Fan { .. } => DeviceKind::Fan,
            Self::Ac { .. } => DeviceKind::Ac,
        }
    }

    /// The reading of a sensor, `None` for actuators.
    #[must_use]
    pub fn sensor_value(&self) -> Option<SensorValue> {
        match self {
            Self::TempSensor { value } => Some(SensorValue::Number(*value)),
            Self::MotionSensor { value } | Self::SmokeSensor { value } => {
                Some(SensorValue::Flag(*value))
            }
            Self::Light { .. } | Self::Fan { .. } | Self::Ac { .. } => None,
        }
    }

    /// The on/off status of an actuator, `None` for sensors.
    #[must_use]
    pub fn status(&self) -> Option<bool> {
        match self {
            Self::Light { status } | Self::Fan { status, .. } | Self::Ac { status, .. } => {
                Some(*status)
            }
            Self::TempSensor { .. } | Self::MotionSensor { .. } | Self::SmokeSensor { .. } => None,
        }
    }
}

/// A device known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(flatten)]
    pub state: DeviceState,
}

impl Device {
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>, state: DeviceState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.state.kind()
    }

    #[must_use]
    pub fn is_sensor(&self) -> bool {
        self.kind().is_sensor()
    }

    #[must_use]
    pub fn sensor_value(&self) -> Option<SensorValue> {
        self.state.sensor_value()
    }

    /// Overwrite the reading of a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotASensor`] for actuators and
    /// [`ValidationError::ThresholdTypeMismatch`] when the value type does not
    /// fit the sensor kind.
    pub fn set_sensor_value(&mut self, reading: SensorValue) -> Result<(), ValidationError> {
        match (&mut self.state, reading) {
            (DeviceState::TempSensor { value }, SensorValue::Number(v)) => *value = v,
            (
                DeviceState::MotionSensor { value } | DeviceState::SmokeSensor { value },
                SensorValue::Flag(v),
            ) => *value = v,
            (state, reading) => {
                let kind = state.kind();
                return Err(match state.sensor_value() {
                    Some(current) => ValidationError::ThresholdTypeMismatch {
                        device_id: self.id.to_string(),
                        expected: current.type_name(),
                        actual: reading.type_name(),
                    },
                    None => ValidationError::NotASensor {
                        device_id: self.id.to_string(),
                        kind,
                    },
                });
            }
        }
        Ok(())
    }

    /// Whether `command` can be applied to this device.
    #[must_use]
    pub fn accepts(&self, command: &Command) -> bool {
        matches!(
            (&self.state, command),
            (
                DeviceState::Light { .. } | DeviceState::Fan { .. } | DeviceState::Ac { .. },
                Command::Switch(_)
            ) | (DeviceState::Fan { .. }, Command::Fan(_))
                | (DeviceState::Ac { .. }, Command::Climate(_))
        )
    }

    /// Merge the fields carried by `command` into the state, leaving the
    /// others untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCommand`] when the device kind
    /// does not accept the command.
    pub fn apply(&mut self, command: &Command) -> Result<(), ValidationError> {
        match (&mut self.state, command) {
            (
                DeviceState::Light { status }
                | DeviceState::Fan { status, .. }
                | DeviceState::Ac { status, .. },
                Command::Switch(cmd),
            ) => *status = cmd.status,
            (DeviceState::Fan { status, speed }, Command::Fan(cmd)) => {
                *status = cmd.status;
                *speed = cmd.speed;
            }
            (DeviceState::Ac { status, temp }, Command::Climate(cmd)) => {
                *status = cmd.status;
                *temp = cmd.temp;
            }
            (state, _) => {
                return Err(ValidationError::UnsupportedCommand {
                    device_id: self.id.to_string(),
                    kind: state.kind(),
                });
            }
        }
        Ok(())
    }
}
