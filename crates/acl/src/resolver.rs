//! Resolver - Answers `is_allowed` queries
//!
//! For one privilege the walk is:
//!
//! 1. Scan the rules, most recent first. The first applicable rule decides.
//! 2. Otherwise, if the resource has a parent, retry one level up the
//!    resource tree with the same role.
//! 3. Otherwise, if the role has a parent, retry one level up the role tree
//!    with the resource the climb stopped at.
//! 4. Otherwise deny.
//!
//! The whole resource chain is tried for the original role before any role
//! ancestor is consulted, and role ancestors only ever see the topmost
//! resource. There is deliberately no role x resource cross product.

use crate::engine::Acl;
use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use shared::{Resource, Role, RuleType};
use std::fmt;
use tracing::debug;

/// One `(role, resource)` pair visited while resolving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStep {
    pub role: Option<String>,
    pub resource: Option<String>,
}

/// The rule that settled a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRule {
    #[serde(rename = "type")]
    pub kind: RuleType,
    pub role: Option<String>,
    pub resource: Option<String>,
    /// `None` when the rule covers every privilege
    pub privilege: Option<String>,
    pub conditional: bool,
}

impl From<&Rule> for MatchedRule {
    fn from(rule: &Rule) -> Self {
        Self {
            kind: rule.kind,
            role: rule.role.clone(),
            resource: rule.resource.clone(),
            privilege: rule.privilege.name().map(str::to_string),
            conditional: rule.has_assertion(),
        }
    }
}

impl fmt::Display for MatchedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {} [{}]",
            self.kind,
            self.role.as_deref().unwrap_or("*"),
            self.resource.as_deref().unwrap_or("*"),
            self.privilege.as_deref().unwrap_or("*"),
        )?;
        if self.conditional {
            f.write_str(" (conditional)")?;
        }
        Ok(())
    }
}

/// Outcome of resolving a single privilege, with the path taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub role: Option<String>,
    pub resource: Option<String>,
    pub privilege: String,
    pub allowed: bool,
    pub matched_rule: Option<MatchedRule>,
    pub path: Vec<ResolutionStep>,
}

impl Decision {
    /// Denied because nothing matched anywhere on the path
    pub fn is_default_deny(&self) -> bool {
        self.matched_rule.is_none()
    }
}

impl Acl {
    /// Whether every privilege is allowed for `role` on `resource`.
    ///
    /// `None` role or resource only matches wildcard rules and skips the
    /// corresponding climb. An empty privilege list is denied.
    pub fn is_allowed(&self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privileges: &[&str]) -> bool {
        let role_id = role.map(|r| r.role_id());
        let resource_id = resource.map(|r| r.resource_id());

        if privileges.is_empty() {
            debug!(role = ?role_id, resource = ?resource_id, "denying query without privileges");
            return false;
        }

        privileges.iter().all(|privilege| {
            let allowed = self
                .resolve(role_id, resource_id, privilege, None)
                .map(|rule| rule.kind.is_allow())
                .unwrap_or(false);
            debug!(role = ?role_id, resource = ?resource_id, privilege, allowed, "resolved privilege");
            allowed
        })
    }

    /// Resolve one privilege and report how the answer was reached
    pub fn explain(&self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privilege: &str) -> Decision {
        let role_id = role.map(|r| r.role_id());
        let resource_id = resource.map(|r| r.resource_id());

        let mut path = Vec::new();
        let matched = self.resolve(role_id, resource_id, privilege, Some(&mut path));

        Decision {
            role: role_id.map(str::to_string),
            resource: resource_id.map(str::to_string),
            privilege: privilege.to_string(),
            allowed: matched.map(|rule| rule.kind.is_allow()).unwrap_or(false),
            matched_rule: matched.map(MatchedRule::from),
            path,
        }
    }

    fn resolve<'q>(
        &'q self,
        mut role: Option<&'q str>,
        mut resource: Option<&'q str>,
        privilege: &'q str,
        mut path: Option<&mut Vec<ResolutionStep>>,
    ) -> Option<&'q Rule> {
        loop {
            if let Some(path) = path.as_deref_mut() {
                path.push(ResolutionStep {
                    role: role.map(str::to_string),
                    resource: resource.map(str::to_string),
                });
            }

            if let Some(rule) = self.first_applicable(role, resource, privilege) {
                return Some(rule);
            }

            if let Some(parent) = resource.and_then(|r| self.resources.parent_of(r)) {
                resource = Some(parent);
                continue;
            }

            if let Some(parent) = role.and_then(|r| self.roles.parent_of(r)) {
                role = Some(parent);
                continue;
            }

            return None;
        }
    }

    fn first_applicable<'q>(
        &'q self,
        role: Option<&'q str>,
        resource: Option<&'q str>,
        privilege: &'q str,
    ) -> Option<&'q Rule> {
        self.rules
            .candidates(role, resource, privilege)
            .find(|rule| match &rule.assertion {
                None => true,
                Some(assertion) => assertion.assert(self, role, resource, privilege),
            })
    }
}
