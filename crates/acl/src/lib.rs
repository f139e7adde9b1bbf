//! # Trellis ACL
//!
//! Hierarchical access-control resolution.
//!
//! ## Components
//!
//! - `RoleRegistry` - Role forest with single-parent inheritance
//! - `ResourceRegistry` - Resource forest with single-parent inheritance
//! - `RuleStore` - Allow/deny rules, most recent first
//! - `Acl` - Facade owning all three, answering `is_allowed` queries
//! - `PolicyLoader` - Builds an `Acl` from policy documents

pub mod engine;
pub mod loader;
pub mod resolver;
pub mod resource_registry;
pub mod role_registry;
pub mod rule;
pub mod rule_store;
mod tree;

pub use engine::Acl;
pub use loader::PolicyLoader;
pub use resolver::{Decision, MatchedRule, ResolutionStep};
pub use resource_registry::ResourceRegistry;
pub use role_registry::RoleRegistry;
pub use rule::{Assertion, PrivilegeSelector, Rule};
pub use rule_store::{RuleOperation, RuleStore};

pub use shared::{GenericResource, GenericRole, Resource, Role, RuleType};
