//! Command: a typed state change sent to an actuator.
//!
//! On the wire a command is a flat JSON object (`{"status": true, "speed": 2}`).
//! Decoding picks the first variant whose fields match exactly, so unknown
//! keys are rejected instead of being forwarded to the simulator.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Lowest and highest fan speed.
pub const FAN_SPEED_RANGE: (u8, u8) = (1, 3);
/// Lowest and highest air-conditioner set-point, in °C.
pub const CLIMATE_TEMP_RANGE: (i32, i32) = (18, 30);

/// A command accepted by one or more actuator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Fans only: power and speed.
    Fan(FanCommand),
    /// Air conditioners only: power and set-point.
    Climate(ClimateCommand),
    /// Any actuator: power only.
    Switch(SwitchCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchCommand {
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanCommand {
    pub status: bool,
    #[serde(deserialize_with = "clamped_speed")]
    pub speed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimateCommand {
    pub status: bool,
    #[serde(deserialize_with = "clamped_temp")]
    pub temp: i32,
}

impl Command {
    #[must_use]
    pub fn switch(status: bool) -> Self {
        Self::Switch(SwitchCommand { status })
    }

    /// Fan command with `speed` clamped into [`FAN_SPEED_RANGE`].
    #[must_use]
    pub fn fan(status: bool, speed: u8) -> Self {
        Self::Fan(FanCommand {
            status,
            speed: speed.clamp(FAN_SPEED_RANGE.0, FAN_SPEED_RANGE.1),
        })
    }

    /// Climate command with `temp` clamped into [`CLIMATE_TEMP_RANGE`].
    #[must_use]
    pub fn climate(status: bool, temp: i32) -> Self {
        Self::Climate(ClimateCommand {
            status,
            temp: temp.clamp(CLIMATE_TEMP_RANGE.0, CLIMATE_TEMP_RANGE.1),
        })
    }

    /// The power flag every command carries.
    #[must_use]
    pub fn status(&self) -> bool {
        match self {
            Self::Fan(c) => c.status,
            Self::Climate(c) => c.status,
            Self::Switch(c) => c.status,
        }
    }
}

impl From<bool> for Command {
    fn from(status: bool) -> Self {
        Self::switch(status)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = if self.status() { "on" } else { "off" };
        match self {
            Self::Fan(c) => write!(f, "{power}, speed {}", c.speed),
            Self::Climate(c) => write!(f, "{power}, {}\u{b0}C", c.temp),
            Self::Switch(_) => f.write_str(power),
        }
    }
}

fn clamped_speed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = u8::deserialize(deserializer)?;
    Ok(raw.clamp(FAN_SPEED_RANGE.0, FAN_SPEED_RANGE.1))
}

fn clamped_temp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let raw = i32::deserialize(deserializer)?;
    Ok(raw.clamp(CLIMATE_TEMP_RANGE.0, CLIMATE_TEMP_RANGE.1))
}
