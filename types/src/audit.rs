use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::csv::CsvRecord;
use crate::de;
use crate::page::{QueryPairs, push_pair};

/// Audit logs are paged by the backend at this size.
pub const AUDIT_PAGE_SIZE: u32 = 20;

/// Audited action. Matched case-insensitively since the backend writes both
/// `LOGIN` and `login`; anything unknown is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    View,
    Export,
    Login,
    Logout,
    BulkImport,
    Other(String),
}

impl AuditAction {
    pub const KNOWN: [Self; 8] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::View,
        Self::Export,
        Self::Login,
        Self::Logout,
        Self::BulkImport,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::View => "VIEW",
            Self::Export => "EXPORT",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::BulkImport => "BULK_IMPORT",
            Self::Other(other) => other,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::View => "View",
            Self::Export => "Export",
            Self::Login => "Login",
            Self::Logout => "Logout",
            Self::BulkImport => "Bulk Import",
            Self::Other(other) => other,
        }
    }

    /// Suffix for the `status-chip` CSS class.
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Create => "success",
            Self::Update | Self::BulkImport => "info",
            Self::Delete => "error",
            Self::Export => "warning",
            Self::Login | Self::Logout => "primary",
            Self::View | Self::Other(_) => "neutral",
        }
    }
}

impl From<String> for AuditAction {
    fn from(s: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or(Self::Other(s))
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tables the backend audits, with their display names.
pub const AUDITED_TABLES: [(&str, &str); 6] = [
    ("companies_company", "Company"),
    ("employees_employee", "Employee"),
    ("employees_employeeposition", "Employee Position"),
    ("companies_department", "Department"),
    ("auth_user", "User"),
    ("bulk_operations_bulkuploadjob", "Bulk Upload Job"),
];

pub fn table_display_name(table: &str) -> &str {
    AUDITED_TABLES
        .iter()
        .find(|(name, _)| *name == table)
        .map_or(table, |(_, display)| display)
}

/// Render a JSON value the way the detail view shows it.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub action: AuditAction,
    #[serde(default, alias = "content_type_name", deserialize_with = "de::null_string")]
    pub table_name: String,
    #[serde(default, alias = "object_id", deserialize_with = "de::opt_string")]
    pub record_id: Option<String>,
    #[serde(default)]
    pub old_values: Option<Value>,
    #[serde(default)]
    pub new_values: Option<Value>,
    #[serde(default)]
    pub changed_fields: Vec<String>,
    #[serde(default)]
    pub user: Option<AuditUser>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub user_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub user_agent: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub description: String,
    #[serde(default, alias = "metadata")]
    pub extra_data: Option<Value>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub timestamp: Option<Timestamp>,
}

impl AuditLog {
    /// Who did it, from whichever user shape the backend sent.
    pub fn actor(&self) -> String {
        if let Some(user) = &self.user {
            let full = format!("{} {}", user.first_name, user.last_name);
            let full = full.trim();
            if !full.is_empty() {
                return full.to_string();
            }
            if !user.username.is_empty() {
                return user.username.clone();
            }
        }

        [&self.user_name, &self.username]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("System")
            .to_string()
    }

    pub fn table_display_name(&self) -> &str {
        table_display_name(&self.table_name)
    }

    /// Changed field names, falling back to the keys of `new_values`.
    pub fn changes(&self) -> Vec<String> {
        if !self.changed_fields.is_empty() {
            return self.changed_fields.clone();
        }
        match &self.new_values {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// One line describing what changed.
    pub fn changes_summary(&self) -> String {
        let changes = self.changes();
        match changes.len() {
            0 if self.description.is_empty() => "-".to_string(),
            0 => self.description.clone(),
            1..=3 => changes.join(", "),
            n => format!("{} and {} more", changes[..3].join(", "), n - 3),
        }
    }
}

impl CsvRecord for AuditLog {
    const HEADERS: &'static [&'static str] = &[
        "Timestamp",
        "Action",
        "Object Type",
        "Record ID",
        "User",
        "IP Address",
        "Changed Fields",
        "Description",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.map(|t| t.to_string()).unwrap_or_default(),
            self.action.as_str().to_string(),
            self.table_display_name().to_string(),
            self.record_id.clone().unwrap_or_default(),
            self.actor(),
            self.ip_address.clone(),
            self.changes().join(", "),
            self.description.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditFilters {
    pub action: Option<AuditAction>,
    pub table_name: String,
    pub user: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub search: String,
    pub page: u32,
}

impl AuditFilters {
    pub fn active_count(&self) -> usize {
        [
            self.action.is_some(),
            !self.table_name.is_empty(),
            !self.user.trim().is_empty(),
            self.start_date.is_some(),
            self.end_date.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

impl QueryPairs for AuditFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(action) = &self.action {
            pairs.push(("action", action.as_str().to_string()));
        }
        push_pair(&mut pairs, "table_name", &self.table_name);
        push_pair(&mut pairs, "user", &self.user);
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.to_string()));
        }
        push_pair(&mut pairs, "search", &self.search);
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub display_name: String,
    #[serde(default)]
    pub action_count: u64,
}

/// Response of `audit-logs/analytics/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditAnalytics {
    #[serde(default)]
    pub total_actions: u64,
    #[serde(default)]
    pub actions_by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub most_active_users: Vec<ActiveUser>,
}

impl AuditAnalytics {
    /// Counts per action, merging `login` into `LOGIN` and so on.
    pub fn by_action(&self) -> Vec<(AuditAction, u64)> {
        let mut merged: Vec<(AuditAction, u64)> = Vec::new();
        for (name, count) in &self.actions_by_type {
            let action = AuditAction::from(name.clone());
            match merged.iter_mut().find(|(a, _)| *a == action) {
                Some((_, total)) => *total += count,
                None => merged.push((action, *count)),
            }
        }
        merged.sort_by(|a, b| b.1.cmp(&a.1));
        merged
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Self::Low => "neutral",
            Self::Medium => "info",
            Self::High => "warning",
            Self::Critical => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: i64,
    pub event_type: String,
    pub severity: Severity,
    #[serde(default, deserialize_with = "de::null_string")]
    pub user_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub description: String,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default, deserialize_with = "de::null_string")]
    pub resolved_by_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub resolution_notes: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub resolved_at: Option<Timestamp>,
}

impl SecurityEvent {
    /// `failed_login` becomes `Failed Login`.
    pub fn event_label(&self) -> String {
        humanize(&self.event_type)
    }
}

pub fn humanize(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityFilters {
    pub severity: Option<Severity>,
    pub is_resolved: Option<bool>,
    pub search: String,
    pub page: u32,
}

impl QueryPairs for SecurityFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(severity) = self.severity {
            pairs.push(("severity", severity.as_str().to_string()));
        }
        if let Some(resolved) = self.is_resolved {
            pairs.push(("is_resolved", resolved.to_string()));
        }
        push_pair(&mut pairs, "search", &self.search);
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }
}

/// Response of `security-events/dashboard/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityDashboard {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub unresolved_events: u64,
    #[serde(default)]
    pub recent_events: u64,
    #[serde(default)]
    pub events_by_severity: BTreeMap<String, u64>,
    #[serde(default)]
    pub critical_events: Vec<SecurityEvent>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn actions_are_case_insensitive() {
        assert_eq!(AuditAction::from("login".to_string()), AuditAction::Login);
        assert_eq!(AuditAction::from("BULK_IMPORT".to_string()), AuditAction::BulkImport);
        assert_eq!(
            AuditAction::from("PURGE".to_string()),
            AuditAction::Other("PURGE".into())
        );

        let action: AuditAction = serde_json::from_value(json!("logout")).unwrap();
        assert_eq!(serde_json::to_value(&action).unwrap(), json!("LOGOUT"));
    }

    #[test]
    fn table_names() {
        assert_eq!(table_display_name("employees_employeeposition"), "Employee Position");
        assert_eq!(table_display_name("django_session"), "django_session");
    }

    #[test]
    fn parses_both_log_shapes() {
        let nested: AuditLog = serde_json::from_value(json!({
            "id": 1,
            "action": "UPDATE",
            "table_name": "companies_company",
            "record_id": "12",
            "old_values": {"phone": "1"},
            "new_values": {"phone": "2"},
            "changed_fields": ["phone"],
            "user": {"id": 3, "username": "ada", "first_name": "Ada", "last_name": "Lovelace"},
            "ip_address": "10.0.0.1",
            "user_agent": null,
            "description": null,
            "extra_data": {},
            "timestamp": "2024-02-03T04:05:06Z"
        }))
        .unwrap();
        assert_eq!(nested.actor(), "Ada Lovelace");
        assert_eq!(nested.table_display_name(), "Company");
        assert_eq!(nested.changes_summary(), "phone");

        let flat: AuditLog = serde_json::from_value(json!({
            "id": 2,
            "action": "login",
            "description": "User ada logged in successfully",
            "user_name": "",
            "username": "ada",
            "content_type_name": null,
            "object_id": 7,
            "old_values": null,
            "new_values": null,
            "ip_address": null,
            "user_agent": "curl",
            "metadata": {"login_time": "2024-02-03T04:05:06"},
            "timestamp": "2024-02-03T04:05:06.123456Z"
        }))
        .unwrap();
        assert_eq!(flat.action, AuditAction::Login);
        assert_eq!(flat.actor(), "ada");
        assert_eq!(flat.record_id.as_deref(), Some("7"));
        assert!(flat.extra_data.is_some());
        assert_eq!(flat.changes_summary(), "User ada logged in successfully");
    }

    #[test]
    fn long_change_lists_are_summarised() {
        let log: AuditLog = serde_json::from_value(json!({
            "id": 1,
            "action": "UPDATE",
            "changed_fields": ["a", "b", "c", "d", "e"]
        }))
        .unwrap();
        assert_eq!(log.changes_summary(), "a, b, c and 2 more");
        assert_eq!(log.actor(), "System");
    }

    #[test]
    fn audit_query() {
        let filters = AuditFilters {
            action: Some(AuditAction::Delete),
            start_date: Some(jiff::civil::date(2024, 1, 1)),
            search: " ".into(),
            page: 3,
            ..Default::default()
        };
        assert_eq!(filters.active_count(), 2);
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("action", "DELETE".to_string()),
                ("start_date", "2024-01-01".to_string()),
                ("page", "3".to_string()),
            ]
        );
    }

    #[test]
    fn analytics_merges_action_case() {
        let analytics: AuditAnalytics = serde_json::from_value(json!({
            "total_actions": 9,
            "actions_by_type": {"LOGIN": 2, "login": 3, "CREATE": 4},
            "actions_by_user": {},
            "most_active_users": [{"username": "ada", "display_name": "Ada", "action_count": 9}]
        }))
        .unwrap();
        assert_eq!(
            analytics.by_action(),
            vec![(AuditAction::Login, 5), (AuditAction::Create, 4)]
        );
    }

    #[test]
    fn values_render_like_the_detail_view() {
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!("x")), "x");
        assert_eq!(format_value(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn event_labels() {
        assert_eq!(humanize("failed_login"), "Failed Login");
        assert_eq!(humanize("xss_attempt"), "Xss Attempt");
    }
}
