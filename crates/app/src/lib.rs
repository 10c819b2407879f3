//! # simhome-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `DeviceGateway`: round-trips to the device simulator
//!   - `EventPublisher`: fan-out of controller events
//!   - `DigitalOutput`, `AnalogInput`, `Clock`: GPIO primitives
//! - Keep the **device registry**, the local mirror of the simulator
//! - Run the **automation engine** and the background **monitor**
//! - Provide the standalone **polling controllers** (irrigation, climate)
//! - Expose the `HomeService` facade used by the console and the demo
//!
//! ## Dependency rule
//! Depends on `simhome-domain` only (plus `tokio` for sync and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod automation_engine;
pub mod controllers;
pub mod event_bus;
pub mod home;
pub mod monitor;
pub mod ports;
pub mod registry;
pub mod services;

#[cfg(test)]
mod testing;
