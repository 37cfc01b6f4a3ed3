use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{AnswerSet, AssessmentReport};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller identity as asserted by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentType {
    #[serde(rename = "Standard ITIVA Assessment", alias = "standard")]
    Standard,
    #[serde(rename = "Advanced Cloud Security Check", alias = "cloud")]
    AdvancedCloud,
    #[serde(rename = "GDPR Compliance Audit", alias = "gdpr")]
    GdprCompliance,
}

impl AssessmentType {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentType::Standard => "Standard ITIVA Assessment",
            AssessmentType::AdvancedCloud => "Advanced Cloud Security Check",
            AssessmentType::GdprCompliance => "GDPR Compliance Audit",
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Completed,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Completed => "completed",
        }
    }
}

/// Stored report. Drafts carry possibly partial answers and no outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub owner: UserId,
    pub name: String,
    pub date: NaiveDate,
    pub assessment_type: AssessmentType,
    pub status: ReportStatus,
    pub answers: AnswerSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AssessmentReport>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_from_draft: Option<ReportId>,
}

impl ReportRecord {
    pub fn is_draft(&self) -> bool {
        self.status == ReportStatus::Draft
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReportStatus::Completed
    }

    pub fn overall(&self) -> Option<u8> {
        self.outcome.as_ref().map(|outcome| outcome.overall)
    }
}

/// Completed assessment as entered by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub assessment_type: AssessmentType,
    pub answers: AnswerSet,
}

/// Work-in-progress assessment. Supplying `id` updates an existing draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSubmission {
    #[serde(default)]
    pub id: Option<ReportId>,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub assessment_type: AssessmentType,
    #[serde(default)]
    pub answers: AnswerSet,
}
