//! Scripted walk through the default rules.
//!
//! Raises the temperature, triggers motion and smoke, then restores normal
//! readings, pausing between steps so the monitor can react.

use std::io::{self, Write};
use std::time::Duration;

use simhome_adapter_virtual::VirtualSimulator;
use simhome_app::ports::{DeviceGateway, EventPublisher};
use simhome_app::services::HomeService;
use simhome_domain::device::{DeviceKind, SensorValue};
use simhome_domain::id::DeviceId;

pub const DEFAULT_PAUSE: Duration = Duration::from_secs(3);

/// Where injected readings go.
pub enum SensorDriver {
    /// Write into the in-process simulator; the monitor picks them up.
    Simulator(VirtualSimulator),
    /// Overwrite the registry cache and evaluate right away. Used against
    /// the network simulator, which offers no way to set a sensor.
    Cache,
}

pub struct Demo {
    driver: SensorDriver,
    pause: Duration,
}

impl Demo {
    #[must_use]
    pub fn new(driver: SensorDriver, pause: Duration) -> Self {
        Self { driver, pause }
    }

    /// Run the scenario with the monitor running, stopping it at the end.
    ///
    /// # Errors
    ///
    /// Returns an error only when writing to `out` fails.
    pub async fn run<G, P>(&self, service: &HomeService<G, P>, out: &mut impl Write) -> io::Result<()>
    where
        G: DeviceGateway + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        writeln!(out, "\n=== Demo scenario ===")?;
        service.start_monitoring().await;

        let result = self.steps(service, out).await;

        service.stop_monitoring().await;
        writeln!(out, "\n=== Demo finished ===")?;
        result
    }

    async fn steps<G, P>(&self, service: &HomeService<G, P>, out: &mut impl Write) -> io::Result<()>
    where
        G: DeviceGateway + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        let devices = service.list_devices().await;
        let first_of = |kind: DeviceKind| {
            devices
                .iter()
                .find(|d| d.kind() == kind)
                .map(|d| d.id.clone())
        };
        let temperature = first_of(DeviceKind::TempSensor);
        let motion = first_of(DeviceKind::MotionSensor);
        let smoke = first_of(DeviceKind::SmokeSensor);

        writeln!(out, "\n1. Raising the temperature to 26.0\u{b0}C")?;
        if let Some(id) = &temperature {
            self.inject(service, id, SensorValue::Number(26.0)).await;
            self.wait().await;
        }

        writeln!(out, "\n2. Simulating motion")?;
        if let Some(id) = &motion {
            self.inject(service, id, SensorValue::Flag(true)).await;
            writeln!(out, "Motion detected")?;
            self.wait().await;
            self.inject(service, id, SensorValue::Flag(false)).await;
            writeln!(out, "Motion cleared")?;
        }

        writeln!(out, "\n3. Simulating smoke")?;
        if let Some(id) = &smoke {
            self.inject(service, id, SensorValue::Flag(true)).await;
            writeln!(out, "Smoke detected, emergency!")?;
            self.wait().await;
            self.inject(service, id, SensorValue::Flag(false)).await;
            writeln!(out, "Smoke cleared")?;
        }

        writeln!(out, "\n4. Restoring the temperature to 22.0\u{b0}C")?;
        if let Some(id) = &temperature {
            self.inject(service, id, SensorValue::Number(22.0)).await;
        }
        self.wait().await;
        Ok(())
    }

    async fn inject<G, P>(&self, service: &HomeService<G, P>, id: &DeviceId, value: SensorValue)
    where
        G: DeviceGateway + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        let result = match &self.driver {
            SensorDriver::Simulator(simulator) => simulator.set_sensor(id, value),
            SensorDriver::Cache => service.inject_reading(id, value).await.map(drop),
        };
        match result {
            Ok(()) => tracing::info!(device_id = %id, %value, "demo reading injected"),
            Err(err) => tracing::warn!(device_id = %id, error = %err, "demo reading rejected"),
        }
    }

    async fn wait(&self) {
        tokio::time::sleep(self.pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simhome_app::event_bus::InProcessEventBus;
    use simhome_app::monitor::MonitorConfig;
    use simhome_app::registry::DeviceRegistry;
    use simhome_domain::device::DeviceState;

    use crate::config::default_rules;

    fn id(raw: &str) -> DeviceId {
        DeviceId::new(raw).unwrap()
    }

    async fn home(
        simulator: &VirtualSimulator,
    ) -> HomeService<VirtualSimulator, InProcessEventBus> {
        let service = HomeService::new(
            DeviceRegistry::new(simulator.clone()),
            InProcessEventBus::new(64),
            MonitorConfig::default(),
        );
        service.initialize(default_rules().unwrap()).await;
        service
    }

    #[tokio::test(start_paused = true)]
    async fn should_drive_every_default_rule_when_using_virtual_simulator() {
        let simulator = VirtualSimulator::default();
        let service = home(&simulator).await;
        let demo = Demo::new(SensorDriver::Simulator(simulator.clone()), DEFAULT_PAUSE);
        let mut out = Vec::new();

        demo.run(&service, &mut out).await.unwrap();

        assert!(!service.is_monitoring().await);
        assert_eq!(
            simulator.device(&id("IoT:Fan:1")).unwrap().state,
            DeviceState::Fan {
                status: true,
                speed: 3
            }
        );
        for light in ["IoT:Light:1", "IoT:Light:2", "IoT:Light:3"] {
            assert_eq!(
                simulator.device(&id(light)).unwrap().state,
                DeviceState::Light { status: true }
            );
        }
        assert_eq!(
            simulator.device(&id("IoT:Sensor:Temp:1")).unwrap().state,
            DeviceState::TempSensor { value: 22.0 }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Smoke detected"));
        assert!(text.contains("Demo finished"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_evaluate_overrides_immediately_when_using_cache() {
        let simulator = VirtualSimulator::default();
        let service = home(&simulator).await;
        let demo = Demo::new(SensorDriver::Cache, Duration::from_millis(10));
        let mut out = Vec::new();

        demo.run(&service, &mut out).await.unwrap();

        let fan = simulator.device(&id("IoT:Fan:1")).unwrap();
        assert_eq!(fan.state.status(), Some(true));
        assert_eq!(
            simulator.device(&id("IoT:Sensor:Temp:1")).unwrap().state,
            DeviceState::TempSensor { value: 22.0 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_steps_when_sensors_are_missing() {
        let simulator = VirtualSimulator::new(Vec::new());
        let service = home(&simulator).await;
        let demo = Demo::new(SensorDriver::Simulator(simulator), DEFAULT_PAUSE);
        let mut out = Vec::new();

        demo.run(&service, &mut out).await.unwrap();

        assert!(!service.is_monitoring().await);
        assert!(String::from_utf8(out).unwrap().contains("4. Restoring"));
    }
}
