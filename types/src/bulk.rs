use std::fmt;
use std::time::Duration;

use base64::prelude::*;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, de};

pub const INVALID_FILE_MESSAGE: &str = "Please select a CSV or Excel file.";

const UPLOAD_EXTENSIONS: [&str; 3] = [".csv", ".xlsx", ".xls"];

/// Only the extension is checked, case-insensitively.
pub fn check_file_name(name: &str) -> std::result::Result<(), &'static str> {
    let name = name.trim().to_ascii_lowercase();
    if UPLOAD_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        Ok(())
    } else {
        Err(INVALID_FILE_MESSAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    EmployeeImport,
    CompanyImport,
    PositionImport,
}

impl OperationType {
    pub const ALL: [Self; 3] = [Self::EmployeeImport, Self::CompanyImport, Self::PositionImport];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmployeeImport => "employee_import",
            Self::CompanyImport => "company_import",
            Self::PositionImport => "position_import",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EmployeeImport => "Employee Import",
            Self::CompanyImport => "Company Import",
            Self::PositionImport => "Position Import",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    pub fn template_file_name(self) -> String {
        format!("{}_template.csv", self.as_str())
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Partial,
}

impl JobStatus {
    /// The backend will not touch a job in this state again on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Partial)
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Failed | Self::Partial)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Partial => "Partially Completed",
        }
    }

    /// Suffix for the `status-chip` CSS class.
    pub fn tone(self) -> &'static str {
        match self {
            Self::Pending => "neutral",
            Self::Processing => "info",
            Self::Completed => "success",
            Self::Failed => "error",
            Self::Partial => "warning",
        }
    }
}

/// A row the backend could not import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    #[serde(default)]
    pub row: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub error: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.field.as_deref()) {
            (Some(row), Some(field)) => write!(f, "Row {row}, {field}: {}", self.error),
            (Some(row), None) => write!(f, "Row {row}: {}", self.error),
            (None, Some(field)) => write!(f, "{field}: {}", self.error),
            (None, None) => f.write_str(&self.error),
        }
    }
}

pub const ERROR_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkJob {
    pub id: Uuid,
    pub operation_type: OperationType,
    pub status: JobStatus,
    pub file_name: String,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub processed_records: u64,
    #[serde(default)]
    pub success_records: u64,
    #[serde(default)]
    pub error_records: u64,
    #[serde(default, deserialize_with = "de::decimal_or_zero")]
    pub progress_percentage: f64,
    #[serde(default)]
    pub error_details: Vec<RowError>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub created_by_name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub started_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub completed_at: Option<Timestamp>,
}

impl BulkJob {
    pub fn can_retry(&self) -> bool {
        self.status.is_retryable()
    }

    /// Progress clamped to 0..=100.
    pub fn progress(&self) -> f64 {
        self.progress_percentage.clamp(0.0, 100.0)
    }

    /// The first few row errors, and how many more there are.
    pub fn error_preview(&self) -> (&[RowError], usize) {
        let shown = self.error_details.len().min(ERROR_PREVIEW_ROWS);
        (
            &self.error_details[..shown],
            self.error_details.len() - shown,
        )
    }
}

/// When to poll for job progress.
///
/// Nothing is polled while every job is finished. While some job is still
/// running the delay starts at `base` and doubles for every consecutive
/// failed fetch, up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(30),
            max: Duration::from_secs(5 * 60),
        }
    }
}

impl PollPolicy {
    pub fn next_delay(&self, jobs: &[BulkJob], consecutive_failures: u32) -> Option<Duration> {
        let active = jobs.iter().any(|job| !job.status.is_terminal());
        if !active && consecutive_failures == 0 {
            return None;
        }

        let factor = 1u32.checked_shl(consecutive_failures.min(16)).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(factor).min(self.max))
    }
}

/// A file picked in the browser, carried to the server as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub content_base64: String,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            content_base64: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64_STANDARD.decode(&self.content_base64)?)
    }

    /// MIME type by extension.
    pub fn content_type(&self) -> &'static str {
        let name = self.name.to_ascii_lowercase();
        if name.ends_with(".xlsx") {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        } else if name.ends_with(".xls") {
            "application/vnd.ms-excel"
        } else {
            "text/csv"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUpload {
    pub operation_type: OperationType,
    pub company: Option<i64>,
    pub file: UploadFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> BulkJob {
        BulkJob {
            id: Uuid::nil(),
            operation_type: OperationType::EmployeeImport,
            status,
            file_name: "staff.csv".into(),
            total_records: 0,
            processed_records: 0,
            success_records: 0,
            error_records: 0,
            progress_percentage: 0.0,
            error_details: Vec::new(),
            created_by_name: String::new(),
            company_name: String::new(),
            created_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn accepts_spreadsheets_only() {
        for name in ["staff.csv", "STAFF.XLSX", "old.xls", " padded.csv "] {
            assert_eq!(check_file_name(name), Ok(()), "{name}");
        }
        for name in ["staff.txt", "staff.csv.exe", "xlsx", "notes.pdf", ""] {
            assert_eq!(check_file_name(name), Err("Please select a CSV or Excel file."), "{name}");
        }
    }

    #[test]
    fn retry_only_for_failed_or_partial() {
        assert!(job(JobStatus::Failed).can_retry());
        assert!(job(JobStatus::Partial).can_retry());
        assert!(!job(JobStatus::Completed).can_retry());
        assert!(!job(JobStatus::Processing).can_retry());
        assert!(!job(JobStatus::Pending).can_retry());
    }

    #[test]
    fn no_polling_when_everything_finished() {
        let policy = PollPolicy::default();
        let jobs = [job(JobStatus::Completed), job(JobStatus::Failed)];
        assert_eq!(policy.next_delay(&jobs, 0), None);
        assert_eq!(policy.next_delay(&[], 0), None);
    }

    #[test]
    fn polls_while_running_with_backoff() {
        let policy = PollPolicy::default();
        let jobs = [job(JobStatus::Completed), job(JobStatus::Processing)];
        assert_eq!(policy.next_delay(&jobs, 0), Some(Duration::from_secs(30)));
        assert_eq!(policy.next_delay(&jobs, 1), Some(Duration::from_secs(60)));
        assert_eq!(policy.next_delay(&jobs, 3), Some(Duration::from_secs(240)));
        assert_eq!(policy.next_delay(&jobs, 4), Some(Duration::from_secs(300)));
        assert_eq!(policy.next_delay(&jobs, 100), Some(Duration::from_secs(300)));
    }

    #[test]
    fn failed_fetch_keeps_polling() {
        let policy = PollPolicy::default();
        let jobs = [job(JobStatus::Completed)];
        assert_eq!(policy.next_delay(&jobs, 1), Some(Duration::from_secs(60)));
    }

    #[test]
    fn error_preview_truncates() {
        let mut j = job(JobStatus::Partial);
        j.error_details = (1..=13)
            .map(|row| RowError {
                row: Some(row),
                field: Some("email".into()),
                error: "Enter a valid email address.".into(),
            })
            .collect();

        let (shown, more) = j.error_preview();
        assert_eq!(shown.len(), 10);
        assert_eq!(more, 3);
        assert_eq!(
            shown[0].to_string(),
            "Row 1, email: Enter a valid email address."
        );
    }

    #[test]
    fn parses_backend_job() {
        let job: BulkJob = serde_json::from_str(
            r#"{
                "id": "5f0c8f5e-3f0c-4a43-9d5a-1b1d0b8a9c11",
                "operation_type": "company_import",
                "status": "partial",
                "file_name": "companies.xlsx",
                "total_records": 10,
                "processed_records": 10,
                "success_records": 8,
                "error_records": 2,
                "progress_percentage": "100.00",
                "error_details": [{"row": 3, "field": "name", "error": "This field is required."}],
                "created_by_name": "Ada Admin",
                "company_name": null,
                "created_at": "2024-06-01T09:30:00.123456Z",
                "started_at": null,
                "completed_at": "2024-06-01T09:31:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(job.status, JobStatus::Partial);
        assert_eq!(job.progress(), 100.0);
        assert_eq!(job.company_name, "");
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn upload_file_content_types() {
        let file = UploadFile::new("people.XLSX", b"PK");
        assert_eq!(
            file.content_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(file.bytes().unwrap(), b"PK");
        assert_eq!(UploadFile::new("a.csv", b"").content_type(), "text/csv");
    }
}
