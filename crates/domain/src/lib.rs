//! # simhome-domain
//!
//! Pure domain model for the simhome automation controller.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, error conventions, timestamps
//! - Define **Devices** (typed sensors and actuators mirrored from the simulator)
//! - Define **Commands** (typed state changes per actuator kind)
//! - Define **Rules** (sensor trigger → ordered actions) and the rule book
//! - Define **Events** and the printable **status report**
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod command;
pub mod device;
pub mod event;
pub mod report;
