//! GPIO ports for the polling controllers.
//!
//! These mirror the primitives an embedded board exposes: a digital output
//! pin, a 10-bit analog input and a wall clock. They are infallible, as pin
//! writes are on the target hardware.

use chrono::{Local, NaiveTime};

/// A digital output pin (relay, valve, LED).
pub trait DigitalOutput: Send {
    /// Drive the pin high (`true`) or low (`false`).
    fn write(&mut self, high: bool);
}

/// An analog input returning the raw converter reading (0–1023).
pub trait AnalogInput: Send {
    fn read(&mut self) -> u16;
}

/// Source of the local time of day.
pub trait Clock: Send {
    fn time_of_day(&self) -> NaiveTime;
}

/// [`Clock`] backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}
