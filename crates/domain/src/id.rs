//! Typed device identifier.
//!
//! The simulator names its devices with free-form strings such as
//! `IoT:Sensor:Temp:1`, so the identifier wraps a `String` rather than a UUID.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique identifier of a [`Device`](crate::device::Device) in the simulator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a raw identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDeviceId`] when nothing is left after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_trim_surrounding_whitespace() {
        let id = DeviceId::new("  IoT:Fan:1 \n").unwrap();
        assert_eq!(id.as_str(), "IoT:Fan:1");
    }

    #[test]
    fn should_reject_blank_identifier() {
        assert_eq!(DeviceId::new("   "), Err(ValidationError::EmptyDeviceId));
    }

    #[test]
    fn should_parse_through_from_str() {
        let id: DeviceId = "IoT:Light:2".parse().unwrap();
        assert_eq!(id.to_string(), "IoT:Light:2");
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = DeviceId::new("IoT:AC:1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"IoT:AC:1\"");
    }

    #[test]
    fn should_look_up_map_entries_by_str() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(DeviceId::new("IoT:Fan:1").unwrap(), 1);
        assert_eq!(map.get("IoT:Fan:1"), Some(&1));
    }
}
