//! RoleRegistry - Role forest with single-parent inheritance

use crate::tree::{Link, Tree};
use shared::Role;
use tracing::debug;

/// Registered roles and their parent links
#[derive(Debug)]
pub struct RoleRegistry {
    tree: Tree<dyn Role>,
}

impl RoleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Register a role, optionally under a parent.
    ///
    /// A parent that already inherits from `role` would close a cycle; the
    /// link is dropped and the role is registered as a root. Re-adding an
    /// existing id replaces its node.
    pub fn add<R: Role + 'static>(&mut self, role: R, parent: Option<&dyn Role>) {
        let id = role.role_id().to_string();
        let parent_id = parent.map(|p| p.role_id());

        if self.tree.insert(id.clone(), Box::new(role), parent_id) == Link::CycleSkipped {
            debug!(role = %id, parent = ?parent_id, "skipping role parent link that would create a cycle");
        }
    }

    /// Look up the registered role with the same id
    pub fn get(&self, role: &dyn Role) -> Option<&dyn Role> {
        self.get_by_id(role.role_id())
    }

    /// Look up a registered role by id
    pub fn get_by_id(&self, id: &str) -> Option<&dyn Role> {
        self.tree.get(id).map(|n| &*n.item)
    }

    /// Check if a role is registered
    pub fn has(&self, role: &dyn Role) -> bool {
        self.tree.contains(role.role_id())
    }

    /// Remove a role. Children keep pointing at the removed id.
    pub fn remove(&mut self, role: &dyn Role) {
        if self.tree.remove(role.role_id()).is_some() {
            debug!(role = %role.role_id(), "removed role");
        }
    }

    /// Whether `parent` is the direct parent of `role`, or any ancestor when
    /// `direct` is false
    pub fn inherits(&self, role: &dyn Role, parent: &dyn Role, direct: bool) -> bool {
        self.tree.inherits(role.role_id(), parent.role_id(), direct)
    }

    /// Parent id of a registered role
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.tree.parent_of(id)
    }

    /// Ids of roles that declared `id` as their parent
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.tree
            .get(id)
            .map(|n| n.children.iter().map(|c| c.as_str()).collect())
            .unwrap_or_default()
    }

    /// All registered role ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tree.ids().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
