//! Irrigation timer: opens the valve once a day at a fixed time.

use std::time::Duration;

use chrono::NaiveTime;
use tokio::sync::watch;

use simhome_domain::time::same_minute;

use super::sleep_or_shutdown;
use crate::ports::{Clock, DigitalOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrrigationConfig {
    /// Time of day watering starts; matched to the minute.
    pub start_time: NaiveTime,
    pub duration: Duration,
    pub poll_interval: Duration,
    /// Pause after watering so the same start minute cannot match twice.
    pub cooldown: Duration,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            duration: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_secs(10),
            cooldown: Duration::from_secs(60),
        }
    }
}

pub struct IrrigationTimer<O, C> {
    config: IrrigationConfig,
    valve: O,
    clock: C,
}

impl<O: DigitalOutput, C: Clock> IrrigationTimer<O, C> {
    pub fn new(config: IrrigationConfig, valve: O, clock: C) -> Self {
        Self {
            config,
            valve,
            clock,
        }
    }

    /// Whether watering should start at `now`.
    #[must_use]
    pub fn is_due(&self, now: NaiveTime) -> bool {
        same_minute(now, self.config.start_time)
    }

    /// Poll the clock until shutdown. The valve is closed on exit.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(start_time = %self.config.start_time.format("%H:%M"), "irrigation timer running");
        self.valve.write(false);

        loop {
            if self.is_due(self.clock.time_of_day()) {
                tracing::info!(duration_secs = self.config.duration.as_secs(), "watering started");
                self.valve.write(true);
                let stopping = sleep_or_shutdown(self.config.duration, &mut shutdown).await;
                self.valve.write(false);
                tracing::info!("watering finished");
                if stopping || sleep_or_shutdown(self.config.cooldown, &mut shutdown).await {
                    break;
                }
            }
            if sleep_or_shutdown(self.config.poll_interval, &mut shutdown).await {
                break;
            }
        }

        self.valve.write(false);
        tracing::info!("irrigation timer stopped");
    }
}
