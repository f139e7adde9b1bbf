//! Interactive REPL mode

use crate::commands::policy::{explain_all, explain_one, render_check, render_explain, render_forest};
use acl::{Acl, Decision};
use audit::{AuditEventType, AuditLogger};
use std::io::{self, Write};

/// Interactive CLI for exploring a loaded policy
pub struct InteractiveCli {
    acl: Acl,
    audit: AuditLogger,
    current_role: Option<String>,
    current_resource: Option<String>,
}

impl InteractiveCli {
    /// Start a session over `acl`, loaded from `source`
    pub fn new(acl: Acl, source: &str) -> Self {
        let mut audit = AuditLogger::default();
        audit.log_policy_loaded(source, acl.rule_count());
        Self {
            acl,
            audit,
            current_role: None,
            current_resource: None,
        }
    }

    /// Run the interactive REPL
    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("Trellis Interactive Mode");
        println!("Type privileges to check them, /help for commands, /quit to exit");
        println!();

        loop {
            print!("{} > ", self.prompt());
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match self.handle_command(input) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => println!("Error: {}", e),
                }
                continue;
            }

            let privileges: Vec<&str> = input.split_whitespace().collect();
            let decisions = self.check(&privileges);
            println!("{}", render_check(&decisions));
        }

        Ok(())
    }

    fn prompt(&self) -> String {
        format!(
            "[{} @ {}]",
            self.current_role.as_deref().unwrap_or("anyone"),
            self.current_resource.as_deref().unwrap_or("anything"),
        )
    }

    /// Check privileges against the current role and resource, recording the outcome
    fn check(&mut self, privileges: &[&str]) -> Vec<Decision> {
        let decisions = explain_all(
            &self.acl,
            self.current_role.as_deref(),
            self.current_resource.as_deref(),
            privileges,
        );
        let allowed = !decisions.is_empty() && decisions.iter().all(|d| d.allowed);

        // A denial is attributed to the first denied privilege, a grant to
        // every distinct rule that allowed one
        let matched_rule = if allowed {
            let mut rules: Vec<String> = Vec::new();
            for rule in decisions.iter().filter_map(|d| d.matched_rule.as_ref()) {
                let rule = rule.to_string();
                if !rules.contains(&rule) {
                    rules.push(rule);
                }
            }
            Some(rules.join("; ")).filter(|r| !r.is_empty())
        } else {
            decisions
                .iter()
                .find(|d| !d.allowed)
                .and_then(|d| d.matched_rule.as_ref())
                .map(|r| r.to_string())
        };

        self.audit.log_decision(
            self.current_role.as_deref(),
            self.current_resource.as_deref(),
            privileges,
            allowed,
            matched_rule,
        );
        decisions
    }

    fn explain(&self, privilege: &str) -> Decision {
        explain_one(
            &self.acl,
            self.current_role.as_deref(),
            self.current_resource.as_deref(),
            privilege,
        )
    }

    fn handle_command(&mut self, input: &str) -> anyhow::Result<bool> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let args = &parts[1.min(parts.len())..];

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                return Ok(true);
            }
            "/help" | "/h" => {
                println!("Commands:");
                println!("  /role [id]         - Set the role (no id for anyone)");
                println!("  /resource [id]     - Set the resource (no id for anything)");
                println!("  /check <priv>...   - Check privileges");
                println!("  /explain <priv>    - Show how a privilege is resolved");
                println!("  /roles             - Show the role hierarchy");
                println!("  /resources         - Show the resource hierarchy");
                println!("  /audit [n]         - Show recent decisions");
                println!("  /status            - Show current status");
                println!("  /quit              - Exit");
            }
            "/role" => {
                self.current_role = self.select(args.first().copied(), |acl, id| acl.has_role(&id));
                println!("Role: {}", self.current_role.as_deref().unwrap_or("anyone"));
            }
            "/resource" => {
                self.current_resource = self.select(args.first().copied(), |acl, id| acl.has_resource(&id));
                println!("Resource: {}", self.current_resource.as_deref().unwrap_or("anything"));
            }
            "/check" => {
                if args.is_empty() {
                    anyhow::bail!("usage: /check <privilege>...");
                }
                let decisions = self.check(args);
                println!("{}", render_check(&decisions));
            }
            "/explain" => {
                let privilege = args
                    .first()
                    .ok_or_else(|| anyhow::anyhow!("usage: /explain <privilege>"))?;
                println!("{}", render_explain(&self.explain(privilege)));
            }
            "/roles" => {
                let ids = self.acl.role_ids();
                println!("{}", render_forest(&ids, |id| self.acl.role_parent(&id)));
            }
            "/resources" => {
                let ids = self.acl.resource_ids();
                println!("{}", render_forest(&ids, |id| self.acl.resource_parent(&id)));
            }
            "/audit" => {
                let limit = match args.first() {
                    Some(n) => n.parse::<usize>()?,
                    None => 10,
                };
                for entry in self.audit.get_recent(limit) {
                    if entry.event_type == AuditEventType::PolicyLoaded {
                        println!("  {} {}", entry.timestamp, entry.reason.as_deref().unwrap_or("policy loaded"));
                        continue;
                    }
                    println!(
                        "  {} {} {} on {} [{}]",
                        entry.timestamp,
                        if entry.allowed { "granted" } else { "denied " },
                        entry.role_id.as_deref().unwrap_or("*"),
                        entry.resource_id.as_deref().unwrap_or("*"),
                        entry.privileges.join(", "),
                    );
                }
                let stats = self.audit.get_stats();
                println!(
                    "  {} checks, {} granted, {} denied",
                    stats.granted_count + stats.denial_count,
                    stats.granted_count,
                    stats.denial_count
                );
            }
            "/status" => {
                println!("Status:");
                println!("  Role: {}", self.current_role.as_deref().unwrap_or("anyone"));
                println!("  Resource: {}", self.current_resource.as_deref().unwrap_or("anything"));
                println!("  Rules: {}", self.acl.rule_count());
            }
            _ => {
                println!("Unknown command: {}", cmd);
            }
        }

        Ok(false)
    }

    /// Pick an id, warning when the policy does not declare it
    fn select(&self, id: Option<&str>, declared: impl Fn(&Acl, &str) -> bool) -> Option<String> {
        let id = id?;
        if !declared(&self.acl, id) {
            println!("Warning: '{}' is not declared in the policy", id);
        }
        Some(id.to_string())
    }
}
