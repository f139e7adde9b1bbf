//! Policy document configuration
//!
//! A policy document declares roles, resources and rules in the order they
//! should be applied. Order is significant: parents must be declared before
//! their children, and later rules take precedence over earlier ones.

use crate::error::{Result, UnsupportedFormatError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Extensions accepted by [`PolicyDocument::from_file`]
pub const SUPPORTED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Whether a rule grants or revokes access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Allow,
    Deny,
}

impl RuleType {
    /// Decision produced when a rule of this type is selected
    pub fn is_allow(&self) -> bool {
        matches!(self, RuleType::Allow)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Allow => f.write_str("allow"),
            RuleType::Deny => f.write_str("deny"),
        }
    }
}

/// A role declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEntry {
    /// Role identifier
    pub id: String,

    /// Parent role to inherit rules from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A resource declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// Resource identifier
    pub id: String,

    /// Parent resource to inherit rules from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// An allow/deny statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Role the rule applies to; absent means every role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Resource the rule applies to; absent means every resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Privileges covered; empty means every privilege
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
}

impl RuleEntry {
    /// Create an allow entry
    pub fn allow(role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Self {
        Self::new(RuleType::Allow, role, resource, privileges)
    }

    /// Create a deny entry
    pub fn deny(role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Self {
        Self::new(RuleType::Deny, role, resource, privileges)
    }

    fn new(rule_type: RuleType, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Self {
        Self {
            rule_type,
            role: role.map(str::to_string),
            resource: resource.map(str::to_string),
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Declarative description of an access-control list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub roles: Vec<RoleEntry>,

    #[serde(default)]
    pub resources: Vec<ResourceEntry>,

    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl PolicyDocument {
    /// Load a policy document, picking the parser from the file extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UnsupportedFormatError {
                path: path.to_path_buf(),
                supported: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)?;
        if extension == "json" {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML policy document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON policy document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Render as YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Append another document's declarations after this one's
    pub fn merge(&mut self, other: PolicyDocument) {
        self.roles.extend(other.roles);
        self.resources.extend(other.resources);
        self.rules.extend(other.rules);
    }

    /// Whether the document declares nothing
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.resources.is_empty() && self.rules.is_empty()
    }
}

/// Check whether a path looks like a policy document
pub fn is_policy_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrellisError;

    const CMS_YAML: &str = r#"
roles:
  - id: guest
  - id: staff
    parent: guest
resources:
  - id: news
  - id: latest
    parent: news
rules:
  - type: allow
    role: guest
    privileges: [view]
  - type: deny
    resource: latest
    privileges: [revise]
  - type: allow
    role: staff
"#;

    // ============== Parsing Tests ==============

    #[test]
    fn test_yaml_parse() {
        let doc = PolicyDocument::from_yaml_str(CMS_YAML).unwrap();

        assert_eq!(doc.roles.len(), 2);
        assert_eq!(doc.roles[1].parent.as_deref(), Some("guest"));
        assert_eq!(doc.resources[1].id, "latest");
        assert_eq!(doc.rules.len(), 3);
        assert_eq!(doc.rules[1].rule_type, RuleType::Deny);
        assert!(doc.rules[1].role.is_none());
        assert!(doc.rules[2].privileges.is_empty());
    }

    #[test]
    fn test_json_parse() {
        let json = r#"{
            "roles": [{"id": "admin"}],
            "rules": [{"type": "allow", "role": "admin"}]
        }"#;

        let doc = PolicyDocument::from_json_str(json).unwrap();
        assert_eq!(doc.roles[0].id, "admin");
        assert!(doc.resources.is_empty());
        assert_eq!(doc.rules[0].rule_type, RuleType::Allow);
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let yaml = "rules:\n  - type: maybe\n";
        let err = PolicyDocument::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, TrellisError::Yaml(_)));
    }

    #[test]
    fn test_empty_document() {
        let doc = PolicyDocument::from_yaml_str("{}").unwrap();
        assert!(doc.is_empty());
    }

    // ============== File Tests ==============

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yml");
        std::fs::write(&path, CMS_YAML).unwrap();

        let doc = PolicyDocument::from_file(&path).unwrap();
        assert_eq!(doc.roles.len(), 2);
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "roles = []").unwrap();

        let err = PolicyDocument::from_file(&path).unwrap_err();
        assert!(matches!(err, TrellisError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_from_file_missing_unsupported_extension() {
        let err = PolicyDocument::from_file(Path::new("/nonexistent/policy.toml")).unwrap_err();
        assert!(matches!(err, TrellisError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PolicyDocument::from_file(Path::new("/nonexistent/policy.yaml")).unwrap_err();
        assert!(matches!(err, TrellisError::Io(_)));
    }

    #[test]
    fn test_is_policy_file() {
        assert!(is_policy_file(Path::new("a.yaml")));
        assert!(is_policy_file(Path::new("a.YML")));
        assert!(is_policy_file(Path::new("dir/a.json")));
        assert!(!is_policy_file(Path::new("a.md")));
        assert!(!is_policy_file(Path::new("README")));
    }

    // ============== Round Trip Tests ==============

    #[test]
    fn test_merge_preserves_order() {
        let mut first = PolicyDocument::from_yaml_str("roles:\n  - id: a\n").unwrap();
        let second = PolicyDocument::from_yaml_str("roles:\n  - id: b\n    parent: a\n").unwrap();
        first.merge(second);

        let ids: Vec<&str> = first.roles.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_yaml_output_omits_wildcards() {
        let doc = PolicyDocument {
            rules: vec![RuleEntry::deny(None, Some("announcement"), &["archive"])],
            ..Default::default()
        };

        let yaml = doc.to_yaml_string().unwrap();
        assert!(yaml.contains("type: deny"));
        assert!(!yaml.contains("role:"));
        assert_eq!(PolicyDocument::from_yaml_str(&yaml).unwrap(), doc);
    }

    #[test]
    fn test_rule_type_display() {
        assert_eq!(RuleType::Allow.to_string(), "allow");
        assert_eq!(RuleType::Deny.to_string(), "deny");
        assert!(RuleType::Allow.is_allow());
        assert!(!RuleType::Deny.is_allow());
    }
}
