//! CLI Commands

pub mod init;
pub mod policy;

pub use init::InitCommand;
pub use policy::PolicyCommand;

use acl::{Acl, PolicyLoader};
use anyhow::Context;
use std::path::Path;

/// Load the policy at `path` (file, directory or glob pattern) into a fresh ACL
pub fn load_acl(path: &Path) -> anyhow::Result<Acl> {
    let mut loader = PolicyLoader::new();
    loader
        .load_path(path)
        .with_context(|| format!("failed to load policy from {}", path.display()))?;

    let acl = loader.build();
    tracing::info!(
        sources = loader.sources().len(),
        roles = acl.role_ids().len(),
        resources = acl.resource_ids().len(),
        rules = acl.rule_count(),
        "policy loaded"
    );
    Ok(acl)
}
