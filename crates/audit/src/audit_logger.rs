//! AuditLogger - Audit log of access decisions

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub event_type: AuditEventType,
    pub role_id: Option<String>,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub privileges: Vec<String>,
    pub allowed: bool,
    /// Rendered rule that decided the query, if any
    pub matched_rule: Option<String>,
    pub reason: Option<String>,
}

/// Types of audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    AccessGranted,
    AccessDenied,
    PolicyLoaded,
}

/// Audit logger
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    /// Create a new AuditLogger keeping at most `max_entries`
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Log an audit entry, evicting the oldest when full
    pub fn log(&mut self, entry: AuditEntry) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log the outcome of an `is_allowed` query
    pub fn log_decision(
        &mut self,
        role_id: Option<&str>,
        resource_id: Option<&str>,
        privileges: &[&str],
        allowed: bool,
        matched_rule: Option<String>,
    ) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type: if allowed { AuditEventType::AccessGranted } else { AuditEventType::AccessDenied },
            role_id: role_id.map(|s| s.to_string()),
            resource_id: resource_id.map(|s| s.to_string()),
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
            allowed,
            reason: if !allowed && matched_rule.is_none() { Some("No applicable rule".to_string()) } else { None },
            matched_rule,
        });
    }

    /// Log that a policy source was loaded
    pub fn log_policy_loaded(&mut self, source: &str, rule_count: usize) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type: AuditEventType::PolicyLoaded,
            role_id: None,
            resource_id: None,
            privileges: Vec::new(),
            allowed: true,
            matched_rule: None,
            reason: Some(format!("Loaded {} rules from '{}'", rule_count, source)),
        });
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent denials, newest first
    pub fn get_recent_denials(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.event_type == AuditEventType::AccessDenied)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let total = self.entries.len();
        let granted = self
            .entries
            .iter()
            .filter(|e| e.event_type == AuditEventType::AccessGranted)
            .count();
        let denials = self
            .entries
            .iter()
            .filter(|e| e.event_type == AuditEventType::AccessDenied)
            .count();

        AuditStats {
            total_entries: total,
            granted_count: granted,
            denial_count: denials,
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Audit statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStats {
    pub total_entries: usize,
    pub granted_count: usize,
    pub denial_count: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}
