//! Acl - Access-control list facade
//!
//! Owns the role registry, the resource registry and the rule store. Every
//! operation is infallible: cycles, unknown ids and missing rules degrade to
//! no-ops or wildcard-only evaluation instead of errors.

use crate::resource_registry::ResourceRegistry;
use crate::role_registry::RoleRegistry;
use crate::rule::{Assertion, Rule};
use crate::rule_store::{RuleOperation, RuleStore};
use shared::{Resource, Role, RuleType};
use std::sync::Arc;

/// Hierarchical access-control list
#[derive(Debug, Default)]
pub struct Acl {
    pub(crate) roles: RoleRegistry,
    pub(crate) resources: ResourceRegistry,
    pub(crate) rules: RuleStore,
}

impl Acl {
    /// Create an empty ACL. Everything is denied until allowed.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- roles ----

    /// Register a role, optionally inheriting from `parent`
    pub fn add_role<R: Role + 'static>(&mut self, role: R, parent: Option<&dyn Role>) {
        self.roles.add(role, parent);
    }

    pub fn get_role(&self, role: &dyn Role) -> Option<&dyn Role> {
        self.roles.get(role)
    }

    pub fn has_role(&self, role: &dyn Role) -> bool {
        self.roles.has(role)
    }

    pub fn remove_role(&mut self, role: &dyn Role) {
        self.roles.remove(role);
    }

    /// Whether `role` inherits from `parent`, directly or (by default) anywhere up the chain
    pub fn inherits_role(&self, role: &dyn Role, parent: &dyn Role, direct: bool) -> bool {
        self.roles.inherits(role, parent, direct)
    }

    pub fn role_parent(&self, role: &dyn Role) -> Option<&str> {
        self.roles.parent_of(role.role_id())
    }

    pub fn role_children(&self, role: &dyn Role) -> Vec<&str> {
        self.roles.children_of(role.role_id())
    }

    pub fn role_ids(&self) -> Vec<&str> {
        self.roles.ids()
    }

    // ---- resources ----

    /// Register a resource, optionally inheriting from `parent`
    pub fn add_resource<R: Resource + 'static>(&mut self, resource: R, parent: Option<&dyn Resource>) {
        self.resources.add(resource, parent);
    }

    pub fn get_resource(&self, resource: &dyn Resource) -> Option<&dyn Resource> {
        self.resources.get(resource)
    }

    pub fn has_resource(&self, resource: &dyn Resource) -> bool {
        self.resources.has(resource)
    }

    pub fn remove_resource(&mut self, resource: &dyn Resource) {
        self.resources.remove(resource);
    }

    pub fn inherits_resource(&self, resource: &dyn Resource, parent: &dyn Resource, direct: bool) -> bool {
        self.resources.inherits(resource, parent, direct)
    }

    pub fn resource_parent(&self, resource: &dyn Resource) -> Option<&str> {
        self.resources.parent_of(resource.resource_id())
    }

    pub fn resource_children(&self, resource: &dyn Resource) -> Vec<&str> {
        self.resources.children_of(resource.resource_id())
    }

    pub fn resource_ids(&self) -> Vec<&str> {
        self.resources.ids()
    }

    // ---- rules ----

    /// Allow `privileges` (all privileges when empty). `None` is a wildcard.
    pub fn allow(&mut self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privileges: &[&str]) {
        self.set_rule(RuleOperation::Add, RuleType::Allow, role, resource, privileges, None);
    }

    /// Deny `privileges` (all privileges when empty). `None` is a wildcard.
    pub fn deny(&mut self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privileges: &[&str]) {
        self.set_rule(RuleOperation::Add, RuleType::Deny, role, resource, privileges, None);
    }

    /// Allow, subject to `assertion` holding at query time
    pub fn allow_if(
        &mut self,
        role: Option<&dyn Role>,
        resource: Option<&dyn Resource>,
        privileges: &[&str],
        assertion: Arc<dyn Assertion>,
    ) {
        self.set_rule(RuleOperation::Add, RuleType::Allow, role, resource, privileges, Some(assertion));
    }

    /// Deny, subject to `assertion` holding at query time
    pub fn deny_if(
        &mut self,
        role: Option<&dyn Role>,
        resource: Option<&dyn Resource>,
        privileges: &[&str],
        assertion: Arc<dyn Assertion>,
    ) {
        self.set_rule(RuleOperation::Add, RuleType::Deny, role, resource, privileges, Some(assertion));
    }

    /// Remove allow rules with exactly this role, resource and privilege set
    pub fn remove_allow(&mut self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privileges: &[&str]) {
        self.set_rule(RuleOperation::Remove, RuleType::Allow, role, resource, privileges, None);
    }

    /// Remove deny rules with exactly this role, resource and privilege set
    pub fn remove_deny(&mut self, role: Option<&dyn Role>, resource: Option<&dyn Resource>, privileges: &[&str]) {
        self.set_rule(RuleOperation::Remove, RuleType::Deny, role, resource, privileges, None);
    }

    fn set_rule(
        &mut self,
        operation: RuleOperation,
        kind: RuleType,
        role: Option<&dyn Role>,
        resource: Option<&dyn Resource>,
        privileges: &[&str],
        assertion: Option<Arc<dyn Assertion>>,
    ) {
        self.rules.set_rule(
            operation,
            kind,
            role.map(|r| r.role_id()),
            resource.map(|r| r.resource_id()),
            privileges,
            assertion,
        );
    }

    /// Rules in precedence order, most recent first
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
