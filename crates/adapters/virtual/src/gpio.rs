//! Virtual GPIO for running the polling controllers without hardware.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use simhome_app::ports::{AnalogInput, DigitalOutput};

/// Output pin that logs level changes. Clones observe the same level.
#[derive(Debug, Clone)]
pub struct VirtualPin {
    label: &'static str,
    level: Arc<AtomicBool>,
}

impl VirtualPin {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

impl DigitalOutput for VirtualPin {
    fn write(&mut self, high: bool) {
        if self.level.swap(high, Ordering::Relaxed) != high {
            tracing::info!(pin = self.label, high, "pin level changed");
        }
    }
}

/// Analog temperature probe on a 10-bit converter. Clones share the reading.
#[derive(Debug, Clone, Default)]
pub struct VirtualThermometer {
    raw: Arc<AtomicU16>,
}

impl VirtualThermometer {
    /// Probe reading `celsius`, clamped to the -100..=100 °C span.
    #[must_use]
    pub fn at_celsius(celsius: f64) -> Self {
        let probe = Self::default();
        probe.set_celsius(celsius);
        probe
    }

    pub fn set_raw(&self, raw: u16) {
        self.raw.store(raw.min(1023), Ordering::Relaxed);
    }

    pub fn set_celsius(&self, celsius: f64) {
        let scaled = ((celsius.clamp(-100.0, 100.0) + 100.0) * 1023.0 / 200.0).round();
        // within 0..=1023 after the clamp above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = scaled as u16;
        self.set_raw(raw);
    }
}

impl AnalogInput for VirtualThermometer {
    fn read(&mut self) -> u16 {
        self.raw.load(Ordering::Relaxed)
    }
}
