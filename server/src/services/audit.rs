use serde_json::{Value, json};
use types::audit::{
    AuditAnalytics, AuditFilters, AuditLog, SecurityDashboard, SecurityEvent, SecurityFilters,
};
use types::{Page, QueryPairs, Result};

use crate::client::{ReqwestExt, TalentClient};

pub struct AuditLogs<'a>(pub(crate) &'a TalentClient);

impl AuditLogs<'_> {
    pub async fn list(&self, filters: &AuditFilters) -> Result<Page<AuditLog>> {
        self.0
            .get("audit-logs/")?
            .query(&filters.query_pairs())
            .try_send()
            .await
    }

    /// Every log matching `filters`, following `next` links for up to
    /// `max_pages` pages.
    pub async fn list_all(&self, filters: &AuditFilters, max_pages: u32) -> Result<Vec<AuditLog>> {
        let mut filters = filters.clone();
        let mut logs = Vec::new();

        for page in 1..=max_pages {
            filters.page = page;
            let batch = self.list(&filters).await?;
            let done = batch.next.is_none();
            logs.extend(batch.results);
            if done {
                break;
            }
        }

        Ok(logs)
    }

    pub async fn analytics(&self, days: u32) -> Result<AuditAnalytics> {
        self.0
            .get("audit-logs/analytics/")?
            .query(&[("days", days)])
            .try_send()
            .await
    }

    pub async fn recent_activity(&self) -> Result<Vec<AuditLog>> {
        self.0.get("audit-logs/recent_activity/")?.try_send().await
    }
}

pub struct SecurityEvents<'a>(pub(crate) &'a TalentClient);

impl SecurityEvents<'_> {
    pub async fn list(&self, filters: &SecurityFilters) -> Result<Page<SecurityEvent>> {
        self.0
            .get("security-events/")?
            .query(&filters.query_pairs())
            .try_send()
            .await
    }

    pub async fn resolve(&self, id: i64, notes: &str) -> Result<()> {
        self.0
            .post(format!("security-events/{id}/resolve/"))?
            .json(&json!({ "notes": notes }))
            .try_send::<Value>()
            .await?;
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<SecurityDashboard> {
        self.0
            .get("security-events/dashboard/")?
            .try_send()
            .await
    }
}
