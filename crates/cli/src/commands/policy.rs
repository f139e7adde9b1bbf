//! trellis policy command

use super::load_acl;
use acl::{Acl, Decision};
use clap::{Args, Subcommand};
use console::style;
use std::path::Path;

#[derive(Debug, Args)]
pub struct PolicyCommand {
    #[command(subcommand)]
    pub command: PolicySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicySubcommand {
    /// Check whether a role holds every listed privilege on a resource
    Check {
        /// Role to check (omit for anonymous)
        #[arg(short, long)]
        role: Option<String>,
        /// Resource to check (omit for any)
        #[arg(short = 'R', long)]
        resource: Option<String>,
        /// Privileges to check
        #[arg(required = true)]
        privileges: Vec<String>,
    },
    /// Show how a single privilege is resolved
    Explain {
        #[arg(short, long)]
        role: Option<String>,
        #[arg(short = 'R', long)]
        resource: Option<String>,
        privilege: String,
    },
    /// List the role hierarchy
    Roles,
    /// List the resource hierarchy
    Resources,
    /// List rules in precedence order
    Rules,
}

impl PolicyCommand {
    pub fn run(&self, policy: &Path, json: bool) -> anyhow::Result<()> {
        let acl = load_acl(policy)?;
        let output = self.render(&acl, json)?;
        println!("{}", output);
        Ok(())
    }

    fn render(&self, acl: &Acl, json: bool) -> anyhow::Result<String> {
        let output = match &self.command {
            PolicySubcommand::Check { role, resource, privileges } => {
                let privileges: Vec<&str> = privileges.iter().map(String::as_str).collect();
                let decisions = explain_all(acl, role.as_deref(), resource.as_deref(), &privileges);
                if json {
                    serde_json::to_string_pretty(&serde_json::json!({
                        "allowed": decisions.iter().all(|d| d.allowed),
                        "decisions": decisions,
                    }))?
                } else {
                    render_check(&decisions)
                }
            }
            PolicySubcommand::Explain { role, resource, privilege } => {
                let decision = explain_one(acl, role.as_deref(), resource.as_deref(), privilege);
                if json {
                    serde_json::to_string_pretty(&decision)?
                } else {
                    render_explain(&decision)
                }
            }
            PolicySubcommand::Roles => {
                let ids = acl.role_ids();
                if json {
                    let entries: Vec<_> = ids
                        .iter()
                        .map(|id| serde_json::json!({ "id": id, "parent": acl.role_parent(id) }))
                        .collect();
                    serde_json::to_string_pretty(&entries)?
                } else {
                    render_forest(&ids, |id| acl.role_parent(&id))
                }
            }
            PolicySubcommand::Resources => {
                let ids = acl.resource_ids();
                if json {
                    let entries: Vec<_> = ids
                        .iter()
                        .map(|id| serde_json::json!({ "id": id, "parent": acl.resource_parent(id) }))
                        .collect();
                    serde_json::to_string_pretty(&entries)?
                } else {
                    render_forest(&ids, |id| acl.resource_parent(&id))
                }
            }
            PolicySubcommand::Rules => {
                let rules: Vec<String> = acl.rules().map(|r| r.to_string()).collect();
                if json {
                    serde_json::to_string_pretty(&rules)?
                } else {
                    rules
                        .iter()
                        .enumerate()
                        .map(|(i, r)| format!("{:>3}. {}", i + 1, r))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
        };
        Ok(output)
    }
}

/// Explain one privilege for optional role/resource ids
pub fn explain_one(acl: &Acl, role: Option<&str>, resource: Option<&str>, privilege: &str) -> Decision {
    acl.explain(
        role.as_ref().map(|r| r as &dyn acl::Role),
        resource.as_ref().map(|r| r as &dyn acl::Resource),
        privilege,
    )
}

/// Explain every privilege in a conjunctive check
pub fn explain_all(acl: &Acl, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Vec<Decision> {
    privileges
        .iter()
        .map(|p| explain_one(acl, role, resource, p))
        .collect()
}

pub fn render_check(decisions: &[Decision]) -> String {
    let allowed = !decisions.is_empty() && decisions.iter().all(|d| d.allowed);
    let mut lines = vec![if allowed {
        style("ALLOWED").green().bold().to_string()
    } else {
        style("DENIED").red().bold().to_string()
    }];

    for decision in decisions {
        let mark = if decision.allowed { style("✓").green() } else { style("✗").red() };
        let reason = match &decision.matched_rule {
            Some(rule) => rule.to_string(),
            None => "no applicable rule".to_string(),
        };
        lines.push(format!("  {} {} ({})", mark, decision.privilege, reason));
    }
    lines.join("\n")
}

pub fn render_explain(decision: &Decision) -> String {
    let mut lines = vec![format!(
        "{} {} on {} -> {}",
        decision.role.as_deref().unwrap_or("*"),
        decision.privilege,
        decision.resource.as_deref().unwrap_or("*"),
        if decision.allowed { style("allowed").green() } else { style("denied").red() },
    )];

    for (i, step) in decision.path.iter().enumerate() {
        lines.push(format!(
            "  {}. role={} resource={}",
            i + 1,
            step.role.as_deref().unwrap_or("*"),
            step.resource.as_deref().unwrap_or("*"),
        ));
    }

    lines.push(match &decision.matched_rule {
        Some(rule) => format!("  matched: {}", rule),
        None => "  matched: none (default deny)".to_string(),
    });
    lines.join("\n")
}

/// Render ids as an indented forest using their parent links.
/// Ids whose parent is not listed are shown as roots.
pub fn render_forest<'a>(ids: &[&'a str], parent_of: impl Fn(&'a str) -> Option<&'a str>) -> String {
    let mut lines = Vec::new();
    let roots: Vec<&str> = ids
        .iter()
        .copied()
        .filter(|id| parent_of(*id).map_or(true, |p| !ids.contains(&p)))
        .collect();

    for root in roots {
        push_subtree(root, 0, ids, &parent_of, &mut lines);
    }
    lines.join("\n")
}

fn push_subtree<'a>(
    id: &'a str,
    depth: usize,
    ids: &[&'a str],
    parent_of: &impl Fn(&'a str) -> Option<&'a str>,
    lines: &mut Vec<String>,
) {
    lines.push(format!("{}{}", "  ".repeat(depth), id));
    for child in ids.iter().copied().filter(|c| parent_of(*c) == Some(id)) {
        push_subtree(child, depth + 1, ids, parent_of, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PolicyDocument;

    fn news_acl() -> Acl {
        let yaml = r#"
roles:
  - id: guest
  - id: staff
    parent: guest
  - id: marketing
    parent: staff
  - id: administrator
resources:
  - id: news
  - id: latest
    parent: news
  - id: announcement
    parent: news
rules:
  - type: allow
    role: guest
    privileges: [view]
  - type: allow
    role: administrator
  - type: deny
    resource: announcement
    privileges: [archive]
"#;
        Acl::from_policy(&PolicyDocument::from_yaml_str(yaml).unwrap())
    }

    fn command(command: PolicySubcommand) -> PolicyCommand {
        PolicyCommand { command }
    }

    // ============== Check Tests ==============

    #[test]
    fn test_render_check_allowed() {
        let acl = news_acl();
        let decisions = explain_all(&acl, Some("marketing"), Some("latest"), &["view"]);
        let out = render_check(&decisions);

        assert!(out.contains("ALLOWED"));
        assert!(out.contains("allow guest on * [view]"));
    }

    #[test]
    fn test_render_check_denied_by_default() {
        let acl = news_acl();
        let decisions = explain_all(&acl, Some("guest"), None, &["view", "edit"]);
        let out = render_check(&decisions);

        assert!(out.contains("DENIED"));
        assert!(out.contains("no applicable rule"));
    }

    #[test]
    fn test_check_json() {
        let acl = news_acl();
        let cmd = command(PolicySubcommand::Check {
            role: Some("administrator".to_string()),
            resource: Some("announcement".to_string()),
            privileges: vec!["archive".to_string()],
        });

        let out = cmd.render(&acl, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["decisions"][0]["matchedRule"]["type"], "deny");
    }

    // ============== Explain Tests ==============

    #[test]
    fn test_render_explain_path() {
        let acl = news_acl();
        let decision = explain_one(&acl, Some("marketing"), Some("latest"), "view");
        let out = render_explain(&decision);

        assert!(out.contains("1. role=marketing resource=latest"));
        assert!(out.contains("2. role=marketing resource=news"));
        assert!(out.contains("3. role=staff resource=news"));
        assert!(out.contains("4. role=guest resource=news"));
        assert!(out.contains("matched: allow guest on * [view]"));
    }

    #[test]
    fn test_render_explain_default_deny() {
        let acl = news_acl();
        let decision = explain_one(&acl, None, None, "view");
        assert!(render_explain(&decision).contains("default deny"));
    }

    // ============== Listing Tests ==============

    #[test]
    fn test_roles_forest() {
        let acl = news_acl();
        let out = command(PolicySubcommand::Roles).render(&acl, false).unwrap();

        assert_eq!(out, "administrator\nguest\n  staff\n    marketing");
    }

    #[test]
    fn test_resources_json() {
        let acl = news_acl();
        let out = command(PolicySubcommand::Resources).render(&acl, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1]["id"], "latest");
        assert_eq!(entries[1]["parent"], "news");
    }

    #[test]
    fn test_rules_in_precedence_order() {
        let acl = news_acl();
        let out = command(PolicySubcommand::Rules).render(&acl, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "  1. deny * on announcement [archive]");
        assert_eq!(lines[2], "  3. allow guest on * [view]");
    }

    #[test]
    fn test_forest_with_missing_parent() {
        let ids = ["orphan", "root"];
        let out = render_forest(&ids, |id| if id == "orphan" { Some("gone") } else { None });
        assert_eq!(out, "orphan\nroot");
    }
}
