//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`SimHomeError`]
//! via `From` when crossing a port boundary.

use crate::automation::Comparison;
use crate::device::DeviceKind;

/// Top-level error for every fallible domain and port operation.
#[derive(Debug, thiserror::Error)]
pub enum SimHomeError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The simulator could not be reached or the round-trip failed.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The simulator answered with a payload that could not be decoded.
    #[error("malformed payload")]
    Decode(#[source] serde_json::Error),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("a rule needs at least one action")]
    NoActions,

    #[error("a rule needs a trigger")]
    MissingTrigger,

    #[error("a rule named {0:?} already exists")]
    DuplicateName(String),

    #[error("`{comparison}` requires a numeric threshold")]
    NonNumericThreshold { comparison: Comparison },

    #[error("device {device_id} holds a {expected} value, threshold is {actual}")]
    ThresholdTypeMismatch {
        device_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("device {device_id} is a {kind}, not a sensor")]
    NotASensor { device_id: String, kind: DeviceKind },

    #[error("device {device_id} ({kind}) does not accept this command")]
    UnsupportedCommand { device_id: String, kind: DeviceKind },

    #[error("device identifier must not be empty")]
    EmptyDeviceId,
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
