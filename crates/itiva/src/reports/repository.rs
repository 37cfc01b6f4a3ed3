use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ReportId, ReportRecord, UserId};

/// Storage abstraction so the service can run against any backing store.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError>;
    fn update(&self, record: ReportRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError>;
    fn remove(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError>;
    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ReportRecord>, RepositoryError>;
    fn list_completed(&self) -> Result<Vec<ReportRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Append-only trail of user activity.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditActivity {
    ReportSubmitted,
    DraftSaved,
    DraftCompleted,
    ReportDeleted,
    ReportsCleared,
    DemoSeeded,
}

impl AuditActivity {
    pub const fn label(self) -> &'static str {
        match self {
            AuditActivity::ReportSubmitted => "report_submitted",
            AuditActivity::DraftSaved => "draft_saved",
            AuditActivity::DraftCompleted => "draft_completed",
            AuditActivity::ReportDeleted => "report_deleted",
            AuditActivity::ReportsCleared => "reports_cleared",
            AuditActivity::DemoSeeded => "demo_seeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub activity: AuditActivity,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
