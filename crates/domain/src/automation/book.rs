//! Ordered, name-unique collection of rules.

use crate::device::Device;
use crate::error::{NotFoundError, SimHomeError, ValidationError};
use crate::id::DeviceId;

use super::Rule;

/// Rules in registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl RuleBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule after checking its invariants and its fit with the
    /// devices currently known.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateName`] when a rule with the same
    /// name exists, or any error from [`Rule::validate`] and
    /// [`Rule::validate_against`].
    pub fn add<'a>(
        &mut self,
        rule: Rule,
        lookup: impl Fn(&DeviceId) -> Option<&'a Device>,
    ) -> Result<(), SimHomeError> {
        rule.validate()?;
        if self.get(&rule.name).is_some() {
            return Err(ValidationError::DuplicateName(rule.name).into());
        }
        rule.validate_against(lookup)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Flip the enabled flag of the rule called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] when no rule has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), SimHomeError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| NotFoundError {
                entity: "Rule",
                id: name.to_string(),
            })?;
        rule.enabled = enabled;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Enabled rules, in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleBook {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
