//! Home service: the use-cases behind the console menu and the demo.

use std::sync::Arc;

use tokio::sync::Mutex;

use simhome_domain::automation::Rule;
use simhome_domain::command::Command;
use simhome_domain::device::{Device, SensorValue};
use simhome_domain::error::SimHomeError;
use simhome_domain::event::EventKind;
use simhome_domain::id::DeviceId;
use simhome_domain::report::StatusReport;

use crate::automation_engine::{AutomationEngine, CycleOutcome};
use crate::home::Home;
use crate::monitor::{Monitor, MonitorConfig};
use crate::ports::{DeviceGateway, EventPublisher};
use crate::registry::DeviceRegistry;

/// Facade over the shared home, the engine and the monitor.
///
/// Every method takes `&self`; the home and the monitor each sit behind their
/// own async mutex, so the console keeps working while the monitor runs.
pub struct HomeService<G, P> {
    home: Arc<Mutex<Home<G>>>,
    engine: Arc<AutomationEngine<P>>,
    monitor: Mutex<Monitor>,
}

impl<G, P> HomeService<G, P>
where
    G: DeviceGateway + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a service around an empty registry.
    pub fn new(registry: DeviceRegistry<G>, publisher: P, monitor: MonitorConfig) -> Self {
        Self {
            home: Arc::new(Mutex::new(Home::new(registry))),
            engine: Arc::new(AutomationEngine::new(publisher)),
            monitor: Mutex::new(Monitor::new(monitor)),
        }
    }

    /// Discover devices, then register `rules`.
    ///
    /// Rules that fail validation are logged and left out. Returns the number
    /// of devices found.
    #[tracing::instrument(skip(self, rules), fields(rules = rules.len()))]
    pub async fn initialize(&self, rules: Vec<Rule>) -> usize {
        let count = self.discover().await;
        let mut home = self.home.lock().await;
        for rule in rules {
            let name = rule.name.clone();
            match home.add_rule(rule) {
                Ok(()) => tracing::debug!(rule = %name, "rule registered"),
                Err(err) => tracing::warn!(rule = %name, error = %err, "rule rejected"),
            }
        }
        tracing::info!(devices = count, rules = home.rules.len(), "home initialized");
        count
    }

    /// Replace the registry with the simulator's device list.
    #[tracing::instrument(skip(self))]
    pub async fn discover(&self) -> usize {
        let count = self.home.lock().await.registry.discover().await;
        self.engine
            .announce(EventKind::DevicesDiscovered { count })
            .await;
        count
    }

    /// Cached devices, ordered by identifier.
    pub async fn list_devices(&self) -> Vec<Device> {
        self.home.lock().await.registry.devices().cloned().collect()
    }

    /// Refresh one device from the simulator.
    pub async fn device_state(&self, id: &DeviceId) -> Option<Device> {
        self.home.lock().await.registry.get_state(id).await
    }

    /// Send a manual command. Returns whether the simulator acknowledged it.
    #[tracing::instrument(skip_all, fields(device_id = %id, command = %command))]
    pub async fn control_device(&self, id: &DeviceId, command: Command) -> bool {
        self.home.lock().await.registry.set_state(id, &command).await
    }

    /// Registered rules in evaluation order.
    pub async fn list_rules(&self) -> Vec<Rule> {
        self.home.lock().await.rules.iter().cloned().collect()
    }

    /// Register a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] when the rule is malformed,
    /// reuses a name, or does not fit the devices it references.
    #[tracing::instrument(skip(self, rule), fields(rule = %rule.name))]
    pub async fn add_rule(&self, rule: Rule) -> Result<(), SimHomeError> {
        self.home.lock().await.add_rule(rule)?;
        tracing::info!("rule added");
        Ok(())
    }

    /// Enable or disable a rule by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] when no rule has that name.
    #[tracing::instrument(skip(self))]
    pub async fn set_rule_enabled(&self, name: &str, enabled: bool) -> Result<(), SimHomeError> {
        self.home.lock().await.rules.set_enabled(name, enabled)?;
        tracing::info!("rule toggled");
        Ok(())
    }

    /// One refresh-evaluate-report pass, outside the monitor.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let mut home = self.home.lock().await;
        self.engine.run_cycle(&mut home).await
    }

    pub async fn status_report(&self) -> StatusReport {
        self.home.lock().await.status_report()
    }

    /// Overwrite a cached sensor reading. The next refresh replaces it with
    /// the simulator's value.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] for unknown devices and
    /// [`SimHomeError::Validation`] when the value does not fit the sensor.
    #[tracing::instrument(skip_all, fields(device_id = %id, value = %value))]
    pub async fn override_sensor_value(
        &self,
        id: &DeviceId,
        value: SensorValue,
    ) -> Result<(), SimHomeError> {
        self.home
            .lock()
            .await
            .registry
            .override_sensor_value(id, value)
    }

    /// Overwrite a cached reading and evaluate the rules against it, without
    /// letting a monitor refresh slip in between.
    ///
    /// # Errors
    ///
    /// Same as [`Self::override_sensor_value`]; no rule is evaluated then.
    #[tracing::instrument(skip_all, fields(device_id = %id, value = %value))]
    pub async fn inject_reading(
        &self,
        id: &DeviceId,
        value: SensorValue,
    ) -> Result<CycleOutcome, SimHomeError> {
        let mut guard = self.home.lock().await;
        let Home { registry, rules } = &mut *guard;
        registry.override_sensor_value(id, value)?;
        Ok(self.engine.evaluate(rules, registry).await)
    }

    /// Start the background monitor. Returns `false` if it was already running.
    pub async fn start_monitoring(&self) -> bool {
        self.monitor
            .lock()
            .await
            .start(self.home.clone(), self.engine.clone())
    }

    /// Stop the background monitor. Returns `false` if it was not running.
    pub async fn stop_monitoring(&self) -> bool {
        self.monitor.lock().await.stop().await
    }

    pub async fn is_monitoring(&self) -> bool {
        self.monitor.lock().await.is_running()
    }
}
