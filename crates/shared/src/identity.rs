//! Identity capabilities for roles and resources
//!
//! The engine never looks inside a role or a resource. Anything that can
//! report a stable string identifier can be registered, granted or queried.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A principal that can be granted or denied privileges
pub trait Role: fmt::Debug + Send + Sync {
    /// Stable, unique role identifier
    fn role_id(&self) -> &str;
}

/// A protected object that privileges apply to
pub trait Resource: fmt::Debug + Send + Sync {
    /// Stable, unique resource identifier
    fn resource_id(&self) -> &str;
}

impl Role for String {
    fn role_id(&self) -> &str {
        self
    }
}

impl Role for &str {
    fn role_id(&self) -> &str {
        self
    }
}

impl Resource for String {
    fn resource_id(&self) -> &str {
        self
    }
}

impl Resource for &str {
    fn resource_id(&self) -> &str {
        self
    }
}

/// Plain role carrying nothing but its identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericRole {
    id: String,
}

impl GenericRole {
    /// Create a new role
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Role for GenericRole {
    fn role_id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for GenericRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Plain resource carrying nothing but its identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericResource {
    id: String,
}

impl GenericResource {
    /// Create a new resource
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Resource for GenericResource {
    fn resource_id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for GenericResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct User {
        name: String,
        group: &'static str,
    }

    impl Role for User {
        fn role_id(&self) -> &str {
            self.group
        }
    }

    // ============== Role Tests ==============

    #[test]
    fn test_generic_role_id() {
        let role = GenericRole::new("editor");
        assert_eq!(role.role_id(), "editor");
        assert_eq!(role.to_string(), "editor");
    }

    #[test]
    fn test_str_and_string_roles() {
        let a: &dyn Role = &"staff";
        let owned = String::from("staff");
        let b: &dyn Role = &owned;
        assert_eq!(a.role_id(), b.role_id());
    }

    #[test]
    fn test_custom_role_type() {
        let user = User {
            name: "sally".to_string(),
            group: "editor",
        };
        let role: &dyn Role = &user;
        assert_eq!(role.role_id(), "editor");
        assert_eq!(user.name, "sally");
    }

    #[test]
    fn test_generic_role_serialization() {
        let role = GenericRole::new("guest");
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"guest\"");

        let back: GenericRole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }

    // ============== Resource Tests ==============

    #[test]
    fn test_generic_resource_id() {
        let resource = GenericResource::new("news");
        assert_eq!(resource.resource_id(), "news");
        assert_eq!(format!("{}", resource), "news");
    }

    #[test]
    fn test_role_and_resource_are_independent_namespaces() {
        let id = "shared-name";
        let role: &dyn Role = &id;
        let resource: &dyn Resource = &id;
        assert_eq!(role.role_id(), resource.resource_id());
    }
}
