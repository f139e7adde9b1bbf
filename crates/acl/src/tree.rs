//! Id-indexed forest shared by the role and resource registries
//!
//! Nodes reference each other by id only. Removing a node leaves any ids
//! pointing at it in place; lookups through them simply find nothing.

use std::collections::HashMap;

#[derive(Debug)]
pub(crate) struct Node<T: ?Sized> {
    pub(crate) item: Box<T>,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct Tree<T: ?Sized> {
    nodes: HashMap<String, Node<T>>,
}

/// Outcome of inserting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// No parent was requested
    Root,
    /// Parent link recorded
    Linked,
    /// Parent link dropped because it would close a cycle
    CycleSkipped,
}

impl<T: ?Sized> Tree<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Insert or overwrite the node for `id`.
    ///
    /// The parent is recorded even when it is not registered yet, so the
    /// cycle guard still sees the edge if the parent is added later.
    pub(crate) fn insert(&mut self, id: String, item: Box<T>, parent: Option<&str>) -> Link {
        let (parent, link) = match parent {
            None => (None, Link::Root),
            Some(p) if p == id || self.inherits(p, &id, false) => (None, Link::CycleSkipped),
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(p) {
                    if !parent_node.children.iter().any(|c| c == &id) {
                        parent_node.children.push(id.clone());
                    }
                }
                (Some(p.to_string()), Link::Linked)
            }
        };

        self.nodes.insert(
            id,
            Node {
                item,
                parent,
                children: Vec::new(),
            },
        );
        link
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Node<T>> {
        self.nodes.remove(id)
    }

    pub(crate) fn parent_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.parent.as_deref())
    }

    /// Whether `ancestor` is the parent of `id` (`direct`) or anywhere on its
    /// ancestor chain. Walks at most `len() + 1` links.
    pub(crate) fn inherits(&self, id: &str, ancestor: &str, direct: bool) -> bool {
        let mut current = self.parent_of(id);
        let mut budget = self.nodes.len() + 1;

        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if direct || budget == 0 {
                return false;
            }
            budget -= 1;
            current = self.parent_of(parent);
        }
        false
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|k| k.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
