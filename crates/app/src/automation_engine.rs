//! Automation engine: evaluates the rule book against the registry and
//! dispatches the actions of every rule whose trigger holds.
//!
//! Evaluation is level-triggered: a rule fires on every cycle its condition
//! is true. Rules run in registration order, and a failed action never stops
//! the remaining actions or rules.

use simhome_domain::automation::{Rule, RuleBook};
use simhome_domain::event::{Event, EventKind};

use crate::home::Home;
use crate::ports::{DeviceGateway, EventPublisher};
use crate::registry::DeviceRegistry;

/// What a single evaluation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Names of the rules that fired, in evaluation order.
    pub fired: Vec<String>,
    pub dispatched: usize,
    pub failed: usize,
}

/// Rule evaluator that reports fired rules on the event bus.
pub struct AutomationEngine<P> {
    publisher: P,
}

impl<P: EventPublisher> AutomationEngine<P> {
    /// Create a new engine.
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Evaluate every enabled rule against the cached sensor values.
    ///
    /// A rule whose trigger device is unknown, or whose reading does not
    /// match the threshold type, is skipped for this pass.
    pub async fn evaluate<G: DeviceGateway>(
        &self,
        rules: &RuleBook,
        registry: &mut DeviceRegistry<G>,
    ) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        for rule in rules.enabled() {
            if !Self::trigger_holds(rule, registry) {
                continue;
            }

            let mut dispatched = 0;
            let mut failed = 0;
            for action in &rule.actions {
                if registry.set_state(&action.device_id, &action.command).await {
                    dispatched += 1;
                } else {
                    failed += 1;
                }
            }
            tracing::info!(rule = %rule.name, dispatched, failed, "rule fired");

            self.announce(EventKind::RuleTriggered {
                rule: rule.name.clone(),
                dispatched,
                failed,
            })
            .await;

            outcome.fired.push(rule.name.clone());
            outcome.dispatched += dispatched;
            outcome.failed += failed;
        }

        outcome
    }

    /// One monitoring pass: refresh sensors, evaluate rules, publish a status
    /// report.
    pub async fn run_cycle<G: DeviceGateway>(&self, home: &mut Home<G>) -> CycleOutcome {
        let Home { registry, rules } = &mut *home;
        registry.refresh_sensor_values().await;
        let outcome = self.evaluate(rules, registry).await;

        self.announce(EventKind::StatusReported(home.status_report()))
            .await;
        outcome
    }

    /// Publish an event stamped now. Publishing is best effort.
    pub async fn announce(&self, kind: EventKind) {
        if let Err(err) = self.publisher.publish(Event::new(kind)).await {
            tracing::warn!(error = %err, "failed to publish event");
        }
    }

    fn trigger_holds<G>(rule: &Rule, registry: &DeviceRegistry<G>) -> bool {
        let trigger = &rule.trigger;
        let Some(device) = registry.get(&trigger.device_id) else {
            tracing::debug!(rule = %rule.name, device_id = %trigger.device_id, "trigger device unknown, rule skipped");
            return false;
        };
        let Some(reading) = device.sensor_value() else {
            tracing::warn!(rule = %rule.name, device_id = %trigger.device_id, "trigger device is not a sensor");
            return false;
        };
        match trigger.matches(reading) {
            Some(holds) => holds,
            None => {
                tracing::warn!(
                    rule = %rule.name,
                    device_id = %trigger.device_id,
                    reading = reading.type_name(),
                    threshold = trigger.value.type_name(),
                    "reading does not match threshold type"
                );
                false
            }
        }
    }
}
