//! Climate controller: switches the cooling output against a temperature
//! threshold.

use std::time::Duration;

use tokio::sync::watch;

use super::sleep_or_shutdown;
use crate::ports::{AnalogInput, DigitalOutput};

/// Full scale of the 10-bit analog converter.
pub const ANALOG_FULL_SCALE: u16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateConfig {
    pub threshold_celsius: f64,
    pub poll_interval: Duration,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            threshold_celsius: 25.0,
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Convert a raw analog reading to degrees Celsius.
///
/// The simulator's analog temperature sensor spans -100 °C (0) to
/// +100 °C (1023).
#[must_use]
pub fn raw_to_celsius(raw: u16) -> f64 {
    f64::from(raw) * 200.0 / f64::from(ANALOG_FULL_SCALE) - 100.0
}

pub struct ClimateController<I, O> {
    config: ClimateConfig,
    sensor: I,
    output: O,
}

impl<I: AnalogInput, O: DigitalOutput> ClimateController<I, O> {
    pub fn new(config: ClimateConfig, sensor: I, output: O) -> Self {
        Self {
            config,
            sensor,
            output,
        }
    }

    /// Output level for a raw reading: high strictly above the threshold.
    #[must_use]
    pub fn decide(&self, raw: u16) -> bool {
        raw_to_celsius(raw) > self.config.threshold_celsius
    }

    /// Read, compare and write once per poll interval until shutdown. The
    /// output is de-asserted on exit.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(threshold = self.config.threshold_celsius, "climate controller running");
        let mut last = None;

        loop {
            let raw = self.sensor.read();
            let high = self.decide(raw);
            self.output.write(high);
            if last != Some(high) {
                tracing::info!(
                    celsius = raw_to_celsius(raw),
                    cooling = high,
                    "climate output changed"
                );
                last = Some(high);
            }
            if sleep_or_shutdown(self.config.poll_interval, &mut shutdown).await {
                break;
            }
        }

        self.output.write(false);
        tracing::info!("climate controller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingPin, SharedAnalog};

    #[test]
    fn should_map_converter_range_to_celsius() {
        assert!((raw_to_celsius(0) + 100.0).abs() < f64::EPSILON);
        assert!((raw_to_celsius(1023) - 100.0).abs() < 1e-9);
        assert!(raw_to_celsius(512).abs() < 0.1);
    }

    #[test]
    fn should_assert_output_only_above_threshold() {
        let controller = ClimateController::new(
            ClimateConfig::default(),
            SharedAnalog::default(),
            RecordingPin::default(),
        );
        // 640 -> ~25.1 °C, 639 -> ~24.9 °C
        assert!(controller.decide(640));
        assert!(!controller.decide(639));
        assert!(!controller.decide(0));
    }

    #[tokio::test(start_paused = true)]
    async fn should_follow_temperature_every_poll() {
        let sensor = SharedAnalog::default();
        sensor.set(700);
        let pin = RecordingPin::default();
        let mut controller =
            ClimateController::new(ClimateConfig::default(), sensor.clone(), pin.clone());
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move { controller.run(rx).await });
        tokio::time::sleep(Duration::from_secs(5)).await;
        sensor.set(500);
        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(pin.writes(), vec![true, false, false]);
    }
}
