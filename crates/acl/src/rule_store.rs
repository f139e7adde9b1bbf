//! RuleStore - Ordered allow/deny rules
//!
//! New rules go to the front. Scanning front to back therefore visits the
//! most recently declared rule first, which is the whole precedence model.

use crate::rule::{Assertion, PrivilegeSelector, Rule};
use shared::RuleType;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// What [`RuleStore::set_rule`] should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperation {
    Add,
    Remove,
}

/// Rules in precedence order
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: VecDeque<Rule>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove rules.
    ///
    /// With no privileges the operation targets the all-privileges rule.
    /// With privileges, one rule per privilege is added (each prepended, so
    /// the last one listed ends up first) or removed. Removal of named
    /// privileges only touches rules without an assertion.
    pub fn set_rule(
        &mut self,
        operation: RuleOperation,
        kind: RuleType,
        role: Option<&str>,
        resource: Option<&str>,
        privileges: &[&str],
        assertion: Option<Arc<dyn Assertion>>,
    ) {
        match operation {
            RuleOperation::Add => self.add(kind, role, resource, privileges, assertion),
            RuleOperation::Remove => self.remove(kind, role, resource, privileges),
        }
    }

    fn add(
        &mut self,
        kind: RuleType,
        role: Option<&str>,
        resource: Option<&str>,
        privileges: &[&str],
        assertion: Option<Arc<dyn Assertion>>,
    ) {
        let selectors: Vec<PrivilegeSelector> = if privileges.is_empty() {
            vec![PrivilegeSelector::All]
        } else {
            privileges
                .iter()
                .map(|p| PrivilegeSelector::Named(p.to_string()))
                .collect()
        };

        for selector in selectors {
            let mut rule = Rule::new(kind, role, resource, selector);
            rule.assertion = assertion.clone();
            debug!(rule = %rule, "adding rule");
            self.rules.push_front(rule);
        }
    }

    fn remove(&mut self, kind: RuleType, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) {
        let before = self.rules.len();
        let same_target =
            |r: &Rule| r.kind == kind && r.role.as_deref() == role && r.resource.as_deref() == resource;

        if privileges.is_empty() {
            self.rules
                .retain(|r| {
                    !(same_target(r)
                        && r.privilege == PrivilegeSelector::All
                        && !r.has_assertion())
                });
        } else {
            for privilege in privileges {
                self.rules.retain(|r| {
                    !(same_target(r)
                        && r.privilege.name() == Some(*privilege)
                        && !r.has_assertion())
                });
            }
        }

        let removed = before - self.rules.len();
        if removed > 0 {
            debug!(removed, %kind, role = ?role, resource = ?resource, "removed rules");
        }
    }

    /// Rules matching the query, in precedence order
    pub fn candidates<'a>(
        &'a self,
        role: Option<&'a str>,
        resource: Option<&'a str>,
        privilege: &'a str,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.matches(role, resource, privilege))
    }

    /// All rules, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
