//! Trigger: the sensor condition that activates a rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::SensorValue;
use crate::id::DeviceId;

/// Comparison applied between a sensor reading and the trigger threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Reading strictly greater than the threshold.
    Above,
    /// Reading strictly less than the threshold.
    Below,
    /// Reading exactly equal to the threshold.
    Equal,
}

impl Comparison {
    /// Whether this comparison only makes sense on numbers.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Above | Self::Below)
    }

    /// Compare `actual` against `threshold`.
    ///
    /// Returns `None` when the two values hold different types, or when an
    /// ordering comparison is asked of booleans.
    #[must_use]
    #[allow(clippy::float_cmp)] // equality is exact on purpose
    pub fn evaluate(self, actual: SensorValue, threshold: SensorValue) -> Option<bool> {
        match (self, actual, threshold) {
            (Self::Above, SensorValue::Number(a), SensorValue::Number(t)) => Some(a > t),
            (Self::Below, SensorValue::Number(a), SensorValue::Number(t)) => Some(a < t),
            (Self::Equal, SensorValue::Number(a), SensorValue::Number(t)) => Some(a == t),
            (Self::Equal, SensorValue::Flag(a), SensorValue::Flag(t)) => Some(a == t),
            _ => None,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Equal => "equal",
        })
    }
}

impl std::str::FromStr for Comparison {
    type Err = UnknownComparison;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" | ">" => Ok(Self::Above),
            "below" | "<" => Ok(Self::Below),
            "equal" | "=" | "==" => Ok(Self::Equal),
            other => Err(UnknownComparison(other.to_string())),
        }
    }
}

/// Returned when parsing an unrecognised comparison name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown comparison {0:?}, expected above, below or equal")]
pub struct UnknownComparison(pub String);

/// Describes which sensor reading activates a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    pub device_id: DeviceId,
    pub condition: Comparison,
    pub value: SensorValue,
}

impl Trigger {
    #[must_use]
    pub fn new(device_id: DeviceId, condition: Comparison, value: impl Into<SensorValue>) -> Self {
        Self {
            device_id,
            condition,
            value: value.into(),
        }
    }

    /// Whether `reading` satisfies the trigger. `None` on a type mismatch.
    #[must_use]
    pub fn matches(&self, reading: SensorValue) -> Option<bool> {
        self.condition.evaluate(reading, self.value)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.device_id, self.condition, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_trigger(condition: Comparison, threshold: f64) -> Trigger {
        Trigger::new(
            DeviceId::new("IoT:Sensor:Temp:1").unwrap(),
            condition,
            threshold,
        )
    }

    #[test]
    fn should_match_above_only_when_strictly_greater() {
        let t = temp_trigger(Comparison::Above, 25.0);
        assert_eq!(t.matches(SensorValue::Number(26.0)), Some(true));
        assert_eq!(t.matches(SensorValue::Number(25.0)), Some(false));
        assert_eq!(t.matches(SensorValue::Number(24.0)), Some(false));
    }

    #[test]
    fn should_match_below_only_when_strictly_less() {
        let t = temp_trigger(Comparison::Below, 20.0);
        assert_eq!(t.matches(SensorValue::Number(19.5)), Some(true));
        assert_eq!(t.matches(SensorValue::Number(20.0)), Some(false));
    }

    #[test]
    fn should_match_equal_on_numbers() {
        let t = temp_trigger(Comparison::Equal, 22.0);
        assert_eq!(t.matches(SensorValue::Number(22.0)), Some(true));
        assert_eq!(t.matches(SensorValue::Number(22.1)), Some(false));
    }

    #[test]
    fn should_match_equal_on_flags() {
        let t = Trigger::new(
            DeviceId::new("IoT:Sensor:Motion:1").unwrap(),
            Comparison::Equal,
            true,
        );
        assert_eq!(t.matches(SensorValue::Flag(true)), Some(true));
        assert_eq!(t.matches(SensorValue::Flag(false)), Some(false));
    }

    #[test]
    fn should_report_mismatch_when_types_differ() {
        let t = temp_trigger(Comparison::Equal, 1.0);
        assert_eq!(t.matches(SensorValue::Flag(true)), None);
    }

    #[test]
    fn should_report_mismatch_for_ordering_on_flags() {
        assert_eq!(
            Comparison::Above.evaluate(SensorValue::Flag(true), SensorValue::Flag(false)),
            None
        );
    }

    #[test]
    fn should_parse_comparison_names_and_symbols() {
        assert_eq!("above".parse(), Ok(Comparison::Above));
        assert_eq!(" Below ".parse(), Ok(Comparison::Below));
        assert_eq!("==".parse(), Ok(Comparison::Equal));
        assert!("between".parse::<Comparison>().is_err());
    }

    #[test]
    fn should_display_trigger_like_the_console() {
        let t = temp_trigger(Comparison::Above, 25.5);
        assert_eq!(t.to_string(), "IoT:Sensor:Temp:1 above 25.5");
    }

    #[test]
    fn should_deserialize_from_json_object() {
        let t: Trigger = serde_json::from_value(serde_json::json!({
            "device_id": "IoT:Sensor:Smoke:1",
            "condition": "equal",
            "value": true
        }))
        .unwrap();
        assert_eq!(t.condition, Comparison::Equal);
        assert_eq!(t.value, SensorValue::Flag(true));
    }
}
