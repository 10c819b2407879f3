//! The shared home: device registry and rule book behind one lock.

use simhome_domain::automation::{Rule, RuleBook};
use simhome_domain::error::SimHomeError;
use simhome_domain::report::StatusReport;
use simhome_domain::time::now;

use crate::registry::DeviceRegistry;

/// Everything a refresh-evaluate-dispatch cycle touches.
///
/// The console and the monitor share one `Home` through a
/// `tokio::sync::Mutex`, so a cycle never interleaves with a manual command.
pub struct Home<G> {
    pub registry: DeviceRegistry<G>,
    pub rules: RuleBook,
}

impl<G> Home<G> {
    pub fn new(registry: DeviceRegistry<G>) -> Self {
        Self {
            registry,
            rules: RuleBook::new(),
        }
    }

    /// Register a rule, validated against the devices currently known.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed rule, a duplicate name, or a
    /// trigger/action that does not fit the referenced device.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), SimHomeError> {
        let Self { registry, rules } = self;
        rules.add(rule, |id| registry.get(id))
    }

    /// Snapshot of every cached device.
    #[must_use]
    pub fn status_report(&self) -> StatusReport {
        StatusReport::new(now(), self.registry.devices())
    }
}
