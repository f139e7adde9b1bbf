//! ResourceRegistry - Resource forest with single-parent inheritance

use crate::tree::{Link, Tree};
use shared::Resource;
use tracing::debug;

/// Registered resources and their parent links
#[derive(Debug)]
pub struct ResourceRegistry {
    tree: Tree<dyn Resource>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Register a resource, optionally under a parent. Same cycle guard and
    /// overwrite rules as roles.
    pub fn add<R: Resource + 'static>(&mut self, resource: R, parent: Option<&dyn Resource>) {
        let id = resource.resource_id().to_string();
        let parent_id = parent.map(|p| p.resource_id());

        if self.tree.insert(id.clone(), Box::new(resource), parent_id) == Link::CycleSkipped {
            debug!(resource = %id, parent = ?parent_id, "skipping resource parent link that would create a cycle");
        }
    }

    /// Look up the registered resource with the same id
    pub fn get(&self, resource: &dyn Resource) -> Option<&dyn Resource> {
        self.get_by_id(resource.resource_id())
    }

    /// Look up a registered resource by id
    pub fn get_by_id(&self, id: &str) -> Option<&dyn Resource> {
        self.tree.get(id).map(|n| &*n.item)
    }

    pub fn has(&self, resource: &dyn Resource) -> bool {
        self.tree.contains(resource.resource_id())
    }

    /// Remove a resource. Children keep pointing at the removed id.
    pub fn remove(&mut self, resource: &dyn Resource) {
        if self.tree.remove(resource.resource_id()).is_some() {
            debug!(resource = %resource.resource_id(), "removed resource");
        }
    }

    pub fn inherits(&self, resource: &dyn Resource, parent: &dyn Resource, direct: bool) -> bool {
        self.tree.inherits(resource.resource_id(), parent.resource_id(), direct)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.tree.parent_of(id)
    }

    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.tree
            .get(id)
            .map(|n| n.children.iter().map(|c| c.as_str()).collect())
            .unwrap_or_default()
    }

    /// All registered resource ids, sorted
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

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GenericResource;

    fn news_resources() -> ResourceRegistry {
        let mut resources = ResourceRegistry::new();
        resources.add(GenericResource::new("newsletter"), None);
        resources.add(GenericResource::new("news"), None);
        resources.add(GenericResource::new("latest"), Some(&"news"));
        resources.add(GenericResource::new("announcement"), Some(&"news"));
        resources
    }

    #[test]
    fn test_add_and_lookup() {
        let resources = news_resources();

        assert!(resources.has(&"latest"));
        assert!(!resources.has(&"archive"));
        assert_eq!(resources.get(&"news").unwrap().resource_id(), "news");
        assert_eq!(resources.parent_of("announcement"), Some("news"));
        assert!(resources.parent_of("newsletter").is_none());
        assert_eq!(resources.ids(), vec!["announcement", "latest", "news", "newsletter"]);
    }

    #[test]
    fn test_children_in_declaration_order() {
        let resources = news_resources();
        assert_eq!(resources.children_of("news"), vec!["latest", "announcement"]);
    }

    #[test]
    fn test_inherits() {
        let mut resources = news_resources();
        resources.add(GenericResource::new("breaking"), Some(&"latest"));

        assert!(resources.inherits(&"breaking", &"latest", true));
        assert!(!resources.inherits(&"breaking", &"news", true));
        assert!(resources.inherits(&"breaking", &"news", false));
        assert!(!resources.inherits(&"news", &"breaking", false));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut resources = news_resources();
        resources.add(GenericResource::new("news"), Some(&"latest"));

        assert!(resources.parent_of("news").is_none());
        assert!(!resources.inherits(&"news", &"latest", false));
    }

    #[test]
    fn test_remove() {
        let mut resources = news_resources();
        resources.remove(&"news");
        resources.remove(&"news");

        assert!(!resources.has(&"news"));
        assert_eq!(resources.parent_of("latest"), Some("news"));
        assert_eq!(resources.len(), 3);
        assert!(!resources.is_empty());
    }
}
