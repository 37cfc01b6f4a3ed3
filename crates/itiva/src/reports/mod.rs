//! Per-user report persistence: completed reports, drafts, dashboards, and rankings.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentType, DraftSubmission, ReportId, ReportRecord, ReportStatus, ReportSubmission,
    UserId,
};
pub use repository::{
    AuditActivity, AuditEntry, AuditError, AuditLog, RepositoryError, ReportRepository,
};
pub use router::{report_router, USER_HEADER};
pub use service::{ReportService, ReportServiceError};
pub use views::{DashboardView, RankingEntry, ReportSummaryView};
