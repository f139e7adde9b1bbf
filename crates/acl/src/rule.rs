//! Rule - A single allow/deny statement

use crate::engine::Acl;
use shared::RuleType;
use std::fmt;
use std::sync::Arc;

/// Extra condition attached to a rule.
///
/// Consulted after the rule matches a query. Returning `false` makes the
/// rule inapplicable and resolution moves on to the next candidate.
pub trait Assertion: Send + Sync {
    fn assert(&self, acl: &Acl, role: Option<&str>, resource: Option<&str>, privilege: &str) -> bool;
}

impl<F> Assertion for F
where
    F: Fn(&Acl, Option<&str>, Option<&str>, &str) -> bool + Send + Sync,
{
    fn assert(&self, acl: &Acl, role: Option<&str>, resource: Option<&str>, privilege: &str) -> bool {
        self(acl, role, resource, privilege)
    }
}

/// Which privileges a rule covers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrivilegeSelector {
    /// Every privilege
    All,
    /// Exactly one privilege, compared case-sensitively
    Named(String),
}

impl PrivilegeSelector {
    pub fn matches(&self, privilege: &str) -> bool {
        match self {
            PrivilegeSelector::All => true,
            PrivilegeSelector::Named(p) => p == privilege,
        }
    }

    /// The named privilege, or `None` for all privileges
    pub fn name(&self) -> Option<&str> {
        match self {
            PrivilegeSelector::All => None,
            PrivilegeSelector::Named(p) => Some(p.as_str()),
        }
    }
}

/// An access-control statement. `None` role or resource is a wildcard.
#[derive(Clone)]
pub struct Rule {
    pub kind: RuleType,
    pub role: Option<String>,
    pub resource: Option<String>,
    pub privilege: PrivilegeSelector,
    pub assertion: Option<Arc<dyn Assertion>>,
}

impl Rule {
    pub fn new(
        kind: RuleType,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: PrivilegeSelector,
    ) -> Self {
        Self {
            kind,
            role: role.map(str::to_string),
            resource: resource.map(str::to_string),
            privilege,
            assertion: None,
        }
    }

    /// Builder: attach an assertion
    pub fn with_assertion(mut self, assertion: Arc<dyn Assertion>) -> Self {
        self.assertion = Some(assertion);
        self
    }

    /// Candidate match for a query: wildcard or equal id in each slot, and
    /// the privilege covered.
    pub fn matches(&self, role: Option<&str>, resource: Option<&str>, privilege: &str) -> bool {
        slot_matches(self.role.as_deref(), role)
            && slot_matches(self.resource.as_deref(), resource)
            && self.privilege.matches(privilege)
    }

    pub fn has_assertion(&self) -> bool {
        self.assertion.is_some()
    }
}

fn slot_matches(rule: Option<&str>, query: Option<&str>) -> bool {
    match rule {
        None => true,
        Some(id) => query == Some(id),
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("role", &self.role)
            .field("resource", &self.resource)
            .field("privilege", &self.privilege)
            .field("assertion", &self.assertion.is_some())
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {} [{}]",
            self.kind,
            self.role.as_deref().unwrap_or("*"),
            self.resource.as_deref().unwrap_or("*"),
            self.privilege.name().unwrap_or("*"),
        )?;
        if self.assertion.is_some() {
            f.write_str(" (conditional)")?;
        }
        Ok(())
    }
}
