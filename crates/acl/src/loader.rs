//! PolicyLoader - Build an ACL from policy documents on disk

use crate::engine::Acl;
use shared::{is_policy_file, GenericResource, GenericRole, PolicyDocument, Resource, Result, Role, RuleType, TrellisError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collects policy documents and applies them to an [`Acl`] in load order
#[derive(Debug, Default)]
pub struct PolicyLoader {
    documents: Vec<(PathBuf, PolicyDocument)>,
}

impl PolicyLoader {
    /// Create a new PolicyLoader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file, every policy file in a directory, or every file matching a glob pattern
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        if path.is_dir() {
            self.load_from_directory(path)
        } else if path.is_file() {
            self.load_file(path)
        } else {
            let pattern = path
                .to_str()
                .ok_or_else(|| TrellisError::Pattern(format!("non UTF-8 path {}", path.display())))?;
            self.load_glob(pattern)
        }
    }

    /// Load a single policy file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let document = PolicyDocument::from_file(path)?;
        debug!(
            path = %path.display(),
            roles = document.roles.len(),
            resources = document.resources.len(),
            rules = document.rules.len(),
            "loaded policy document"
        );
        self.documents.push((path.to_path_buf(), document));
        Ok(())
    }

    /// Load every policy file directly inside `dir`, in file name order
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_policy_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }
        Ok(())
    }

    /// Load every policy file matching a glob pattern, in path order
    pub fn load_glob(&mut self, pattern: &str) -> Result<()> {
        let entries = glob::glob(pattern).map_err(|e| TrellisError::Pattern(e.to_string()))?;

        let mut matched = 0usize;
        for entry in entries {
            let path = entry.map_err(|e| TrellisError::Io(e.into()))?;
            if path.is_file() && is_policy_file(&path) {
                self.load_file(&path)?;
                matched += 1;
            }
        }

        if matched == 0 {
            return Err(TrellisError::Config(format!("no policy files match '{}'", pattern)));
        }
        Ok(())
    }

    /// Add an in-memory document
    pub fn push(&mut self, origin: impl Into<PathBuf>, document: PolicyDocument) {
        self.documents.push((origin.into(), document));
    }

    /// Paths of the loaded documents
    pub fn sources(&self) -> Vec<&Path> {
        self.documents.iter().map(|(p, _)| p.as_path()).collect()
    }

    /// All loaded documents merged in load order
    pub fn to_document(&self) -> PolicyDocument {
        let mut merged = PolicyDocument::default();
        for (_, document) in &self.documents {
            merged.merge(document.clone());
        }
        merged
    }

    /// Apply every loaded document to `acl`
    pub fn apply(&self, acl: &mut Acl) {
        apply_document(acl, &self.to_document());
    }

    /// Build a fresh ACL from the loaded documents
    pub fn build(&self) -> Acl {
        let mut acl = Acl::new();
        self.apply(&mut acl);
        acl
    }
}

impl Acl {
    /// Build an ACL from a single policy document
    pub fn from_policy(document: &PolicyDocument) -> Self {
        let mut acl = Acl::new();
        apply_document(&mut acl, document);
        acl
    }
}

/// Apply roles, then resources, then rules.
///
/// References to undeclared ids are reported and applied anyway, matching
/// the engine's own behavior for unknown roles and resources.
pub fn apply_document(acl: &mut Acl, document: &PolicyDocument) {
    for entry in &document.roles {
        if let Some(parent) = &entry.parent {
            if !acl.has_role(parent) {
                warn!(role = %entry.id, parent = %parent, "role declared before its parent");
            }
        }
        acl.add_role(GenericRole::new(&entry.id), entry.parent.as_ref().map(|p| p as &dyn Role));
    }

    for entry in &document.resources {
        if let Some(parent) = &entry.parent {
            if !acl.has_resource(parent) {
                warn!(resource = %entry.id, parent = %parent, "resource declared before its parent");
            }
        }
        acl.add_resource(
            GenericResource::new(&entry.id),
            entry.parent.as_ref().map(|p| p as &dyn Resource),
        );
    }

    for entry in &document.rules {
        if let Some(role) = &entry.role {
            if !acl.has_role(role) {
                warn!(role = %role, "rule references an undeclared role");
            }
        }
        if let Some(resource) = &entry.resource {
            if !acl.has_resource(resource) {
                warn!(resource = %resource, "rule references an undeclared resource");
            }
        }

        let role = entry.role.as_ref().map(|r| r as &dyn Role);
        let resource = entry.resource.as_ref().map(|r| r as &dyn Resource);
        let privileges: Vec<&str> = entry.privileges.iter().map(String::as_str).collect();

        match entry.rule_type {
            RuleType::Allow => acl.allow(role, resource, &privileges),
            RuleType::Deny => acl.deny(role, resource, &privileges),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMS_POLICY: &str = r#"
roles:
  - id: guest
  - id: staff
    parent: guest
  - id: editor
    parent: staff
  - id: administrator
rules:
  - type: allow
    role: guest
    privileges: [view]
  - type: allow
    role: staff
    privileges: [edit, submit, revise]
  - type: allow
    role: editor
    privileges: [publish, archive, delete]
  - type: allow
    role: administrator
"#;

    const NEWS_POLICY: &str = r#"
roles:
  - id: marketing
    parent: staff
resources:
  - id: newsletter
  - id: news
  - id: latest
    parent: news
  - id: announcement
    parent: news
rules:
  - type: allow
    role: marketing
    resource: newsletter
    privileges: [publish, archive]
  - type: deny
    resource: announcement
    privileges: [archive]
"#;

    // ============== Document Application Tests ==============

    #[test]
    fn test_from_policy() {
        let doc = PolicyDocument::from_yaml_str(CMS_POLICY).unwrap();
        let acl = Acl::from_policy(&doc);

        assert_eq!(acl.role_ids().len(), 4);
        assert!(acl.inherits_role(&"editor", &"guest", false));
        assert!(acl.is_allowed(Some(&"editor"), None, &["view"]));
        assert!(!acl.is_allowed(Some(&"staff"), None, &["publish"]));
        assert!(acl.is_allowed(Some(&"administrator"), None, &["anything"]));
    }

    #[test]
    fn test_rule_order_is_precedence() {
        let yaml = r#"
rules:
  - type: allow
    role: r
    privileges: [p]
  - type: deny
    role: r
    privileges: [p]
"#;
        let acl = Acl::from_policy(&PolicyDocument::from_yaml_str(yaml).unwrap());
        assert!(!acl.is_allowed(Some(&"r"), None, &["p"]));
    }

    #[test]
    fn test_undeclared_references_still_applied() {
        let yaml = r#"
roles:
  - id: child
    parent: parent
rules:
  - type: allow
    role: parent
    resource: ghost
"#;
        let acl = Acl::from_policy(&PolicyDocument::from_yaml_str(yaml).unwrap());

        assert!(!acl.has_role(&"parent"));
        assert!(acl.is_allowed(Some(&"child"), Some(&"ghost"), &["read"]));
    }

    // ============== Loader Tests ==============

    #[test]
    fn test_load_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("10-cms.yaml"), CMS_POLICY).unwrap();
        std::fs::write(dir.path().join("20-news.yml"), NEWS_POLICY).unwrap();
        std::fs::write(dir.path().join("README.md"), "# not a policy").unwrap();

        let mut loader = PolicyLoader::new();
        loader.load_from_directory(dir.path()).unwrap();
        assert_eq!(loader.sources().len(), 2);

        let acl = loader.build();
        assert!(acl.inherits_role(&"marketing", &"guest", false));
        assert!(acl.is_allowed(Some(&"marketing"), Some(&"newsletter"), &["publish"]));
        assert!(!acl.is_allowed(Some(&"administrator"), Some(&"announcement"), &["archive"]));
        assert!(acl.is_allowed(Some(&"administrator"), Some(&"latest"), &["archive"]));
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let mut loader = PolicyLoader::new();
        loader.load_from_directory(Path::new("/nonexistent/trellis")).unwrap();
        assert!(loader.to_document().is_empty());
    }

    #[test]
    fn test_load_glob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), CMS_POLICY).unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"rules": [{"type": "deny", "role": "guest"}]}"#).unwrap();

        let pattern = format!("{}/*.yaml", dir.path().display());
        let mut loader = PolicyLoader::new();
        loader.load_glob(&pattern).unwrap();

        assert_eq!(loader.sources().len(), 1);
        assert!(loader.build().is_allowed(Some(&"guest"), None, &["view"]));
    }

    #[test]
    fn test_load_glob_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.yaml", dir.path().display());

        let err = PolicyLoader::new().load_glob(&pattern).unwrap_err();
        assert!(matches!(err, TrellisError::Config(_)));
    }

    #[test]
    fn test_load_glob_invalid_pattern() {
        let err = PolicyLoader::new().load_glob("[").unwrap_err();
        assert!(matches!(err, TrellisError::Pattern(_)));
    }

    #[test]
    fn test_load_path_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("policy.yaml");
        std::fs::write(&file, CMS_POLICY).unwrap();

        let mut loader = PolicyLoader::new();
        loader.load_path(&file).unwrap();
        loader.load_path(dir.path()).unwrap();
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_parse_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "rules: [{type: perhaps}]").unwrap();

        let err = PolicyLoader::new().load_from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, TrellisError::Yaml(_)));
    }

    #[test]
    fn test_apply_onto_existing_acl() {
        let mut acl = Acl::new();
        acl.allow(None, None, &["view"]);

        let mut loader = PolicyLoader::new();
        loader.push("inline", PolicyDocument::from_yaml_str("rules: [{type: deny, role: guest}]").unwrap());
        loader.apply(&mut acl);

        assert!(!acl.is_allowed(Some(&"guest"), None, &["view"]));
        assert!(acl.is_allowed(Some(&"staff"), None, &["view"]));
    }
}
