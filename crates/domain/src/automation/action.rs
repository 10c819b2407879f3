//! Action: the command sent when a rule fires.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::id::DeviceId;

/// Send `command` to the actuator `device_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    pub device_id: DeviceId,
    pub command: Command,
}

impl Action {
    #[must_use]
    pub fn new(device_id: DeviceId, command: impl Into<Command>) -> Self {
        Self {
            device_id,
            command: command.into(),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.device_id, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_target_and_command() {
        let a = Action::new(DeviceId::new("IoT:Fan:1").unwrap(), Command::fan(true, 2));
        assert_eq!(a.to_string(), "IoT:Fan:1 -> on, speed 2");
    }

    #[test]
    fn should_deserialize_nested_command() {
        let a: Action = serde_json::from_value(serde_json::json!({
            "device_id": "IoT:AC:1",
            "command": {"status": true, "temp": 22}
        }))
        .unwrap();
        assert_eq!(a.command, Command::climate(true, 22));
    }

    #[test]
    fn should_reject_unknown_action_fields() {
        let result = serde_json::from_value::<Action>(serde_json::json!({
            "device_id": "IoT:AC:1",
            "command": {"status": true},
            "delay": 5
        }));
        assert!(result.is_err());
    }
}
