//! Automation: threshold rules that drive actuators from sensor readings.
//!
//! A [`Rule`] pairs one sensor [`Trigger`] with an ordered list of
//! [`Action`]s. Rules are level-triggered: the engine dispatches the actions
//! on every evaluation cycle in which the trigger holds. Rules live in a
//! [`RuleBook`] that keeps them in registration order and enforces unique
//! names.

mod action;
mod book;
mod trigger;

pub use action::Action;
pub use book::RuleBook;
pub use trigger::{Comparison, Trigger, UnknownComparison};

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::{SimHomeError, ValidationError};
use crate::id::DeviceId;

/// A named trigger → actions rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
}

fn enabled_by_default() -> bool {
    true
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check the invariants that hold regardless of the device registry.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    /// - an ordering comparison has a boolean threshold
    ///   ([`ValidationError::NonNumericThreshold`])
    pub fn validate(&self) -> Result<(), SimHomeError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        if self.trigger.condition.is_ordering()
            && !matches!(self.trigger.value, crate::device::SensorValue::Number(_))
        {
            return Err(ValidationError::NonNumericThreshold {
                comparison: self.trigger.condition,
            }
            .into());
        }
        Ok(())
    }

    /// Check the rule against the devices currently known.
    ///
    /// Devices missing from `lookup` are accepted: the engine skips the rule
    /// while its trigger device is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] when the trigger device is not a
    /// sensor, when its reading type differs from the threshold type, or when
    /// a known action target does not accept its command.
    pub fn validate_against<'a>(
        &self,
        lookup: impl Fn(&DeviceId) -> Option<&'a Device>,
    ) -> Result<(), SimHomeError> {
        if let Some(device) = lookup(&self.trigger.device_id) {
            let Some(reading) = device.sensor_value() else {
                return Err(ValidationError::NotASensor {
                    device_id: device.id.to_string(),
                    kind: device.kind(),
                }
                .into());
            };
            if !reading.same_type(self.trigger.value) {
                return Err(ValidationError::ThresholdTypeMismatch {
                    device_id: device.id.to_string(),
                    expected: reading.type_name(),
                    actual: self.trigger.value.type_name(),
                }
                .into());
            }
        }
        for action in &self.actions {
            if let Some(device) = lookup(&action.device_id)
                && !device.accepts(&action.command)
            {
                return Err(ValidationError::UnsupportedCommand {
                    device_id: device.id.to_string(),
                    kind: device.kind(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    name: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
}

impl RuleBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] if the trigger is missing or the
    /// rule breaks an invariant checked by [`Rule::validate`].
    pub fn build(self) -> Result<Rule, SimHomeError> {
        let trigger = self.trigger.ok_or(ValidationError::MissingTrigger)?;
        let rule = Rule {
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            trigger,
            actions: self.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::device::{DeviceState, SensorValue};

    fn id(raw: &str) -> DeviceId {
        DeviceId::new(raw).unwrap()
    }

    fn cooling_rule() -> Rule {
        Rule::builder()
            .name("cooling_routine")
            .trigger(Trigger::new(
                id("IoT:Sensor:Temp:1"),
                Comparison::Above,
                25.0,
            ))
            .action(Action::new(id("IoT:Fan:1"), Command::fan(true, 2)))
            .build()
            .unwrap()
    }

    fn devices() -> Vec<Device> {
        vec![
            Device::new(
                id("IoT:Sensor:Temp:1"),
                "Temperature",
                DeviceState::TempSensor { value: 21.0 },
            ),
            Device::new(
                id("IoT:Sensor:Motion:1"),
                "Motion",
                DeviceState::MotionSensor { value: false },
            ),
            Device::new(
                id("IoT:Fan:1"),
                "Fan",
                DeviceState::Fan {
                    status: false,
                    speed: 1,
                },
            ),
        ]
    }

    fn lookup<'a>(devices: &'a [Device]) -> impl Fn(&DeviceId) -> Option<&'a Device> {
        move |wanted| devices.iter().find(|d| &d.id == wanted)
    }

    #[test]
    fn should_build_enabled_rule_by_default() {
        let rule = cooling_rule();
        assert!(rule.enabled);
        assert_eq!(rule.actions.len(), 1);
    }

    #[test]
    fn should_build_disabled_rule_when_requested() {
        let rule = Rule::builder()
            .name("off")
            .enabled(false)
            .trigger(Trigger::new(id("IoT:Sensor:Temp:1"), Comparison::Below, 1.0))
            .action(Action::new(id("IoT:Light:1"), true))
            .build()
            .unwrap();
        assert!(!rule.enabled);
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = Rule::builder()
            .name("  ")
            .trigger(Trigger::new(id("IoT:Sensor:Temp:1"), Comparison::Above, 1.0))
            .action(Action::new(id("IoT:Light:1"), true))
            .build();
        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_actions_is_empty() {
        let result = Rule::builder()
            .name("nothing")
            .trigger(Trigger::new(id("IoT:Sensor:Temp:1"), Comparison::Above, 1.0))
            .build();
        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::NoActions))
        ));
    }

    #[test]
    fn should_return_validation_error_when_trigger_is_missing() {
        let result = Rule::builder()
            .name("no trigger")
            .action(Action::new(id("IoT:Light:1"), true))
            .build();
        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::MissingTrigger))
        ));
    }

    #[test]
    fn should_reject_ordering_comparison_on_boolean_threshold() {
        let result = Rule::builder()
            .name("motion above")
            .trigger(Trigger::new(id("IoT:Sensor:Motion:1"), Comparison::Above, true))
            .action(Action::new(id("IoT:Light:1"), true))
            .build();
        assert!(matches!(
            result,
            Err(SimHomeError::Validation(
                ValidationError::NonNumericThreshold {
                    comparison: Comparison::Above
                }
            ))
        ));
    }

    #[test]
    fn should_accept_rule_matching_known_devices() {
        let devices = devices();
        assert!(cooling_rule().validate_against(lookup(&devices)).is_ok());
    }

    #[test]
    fn should_accept_rule_when_devices_are_unknown() {
        let rule = Rule::builder()
            .name("ghost")
            .trigger(Trigger::new(id("IoT:Sensor:Temp:9"), Comparison::Above, 1.0))
            .action(Action::new(id("IoT:Fan:9"), Command::fan(true, 1)))
            .build()
            .unwrap();
        assert!(rule.validate_against(|_| None).is_ok());
    }

    #[test]
    fn should_reject_numeric_threshold_for_boolean_sensor() {
        let devices = devices();
        let rule = Rule::builder()
            .name("motion equal one")
            .trigger(Trigger::new(id("IoT:Sensor:Motion:1"), Comparison::Equal, 1.0))
            .action(Action::new(id("IoT:Fan:1"), true))
            .build()
            .unwrap();
        let err = rule.validate_against(lookup(&devices)).unwrap_err();
        assert!(matches!(
            err,
            SimHomeError::Validation(ValidationError::ThresholdTypeMismatch {
                expected: "boolean",
                actual: "numeric",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_trigger_on_actuator() {
        let devices = devices();
        let rule = Rule::builder()
            .name("fan watcher")
            .trigger(Trigger::new(id("IoT:Fan:1"), Comparison::Equal, true))
            .action(Action::new(id("IoT:Fan:1"), true))
            .build()
            .unwrap();
        let err = rule.validate_against(lookup(&devices)).unwrap_err();
        assert!(matches!(
            err,
            SimHomeError::Validation(ValidationError::NotASensor { .. })
        ));
    }

    #[test]
    fn should_reject_command_unsuitable_for_target() {
        let devices = devices();
        let rule = Rule::builder()
            .name("fan as ac")
            .trigger(Trigger::new(id("IoT:Sensor:Temp:1"), Comparison::Below, 18.0))
            .action(Action::new(id("IoT:Fan:1"), Command::climate(true, 22)))
            .build()
            .unwrap();
        let err = rule.validate_against(lookup(&devices)).unwrap_err();
        assert!(matches!(
            err,
            SimHomeError::Validation(ValidationError::UnsupportedCommand { .. })
        ));
    }

    #[test]
    fn should_deserialize_rule_with_default_enabled_flag() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "name": "motion_lights",
            "trigger": {"device_id": "IoT:Sensor:Motion:1", "condition": "equal", "value": true},
            "actions": [{"device_id": "IoT:Light:1", "command": {"status": true}}]
        }))
        .unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.trigger.value, SensorValue::Flag(true));
    }
}
