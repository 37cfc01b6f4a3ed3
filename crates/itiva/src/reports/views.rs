use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{AssessmentType, ReportId, ReportRecord, UserId};

/// List entry shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummaryView {
    pub id: ReportId,
    pub name: String,
    pub date: NaiveDate,
    pub assessment_type: AssessmentType,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<u8>,
}

impl From<&ReportRecord> for ReportSummaryView {
    fn from(record: &ReportRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            date: record.date,
            assessment_type: record.assessment_type,
            status: record.status.label(),
            overall: record.overall(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub reports: Vec<ReportSummaryView>,
    pub total_reports: usize,
    pub has_drafts: bool,
    /// Rounded mean of completed overall scores; 0 with nothing completed.
    pub average_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub owner: UserId,
    pub report_id: ReportId,
    pub name: String,
    pub date: NaiveDate,
    pub overall: u8,
}
