use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{
    AssessmentType, DraftSubmission, ReportId, ReportRecord, ReportStatus, ReportSubmission,
    UserId,
};
use super::repository::{
    AuditActivity, AuditEntry, AuditError, AuditLog, RepositoryError, ReportRepository,
};
use super::views::{DashboardView, RankingEntry, ReportSummaryView};
use crate::assessment::{round_points, AssessmentError, ScoringEngine, TargetScores};

/// Service composing the scoring engine, report storage, and audit trail.
///
/// Mutations are serialized through `writes`, so name checks and the store
/// that follows them happen as one step. A mutation whose audit entry cannot
/// be recorded is rolled back before the error is returned.
pub struct ReportService<R, A> {
    repository: Arc<R>,
    audit: Arc<A>,
    engine: Arc<ScoringEngine>,
    writes: Mutex<()>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DRAFT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static AUDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("report-{id:06}"))
}

fn next_draft_id() -> ReportId {
    let id = DRAFT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("draft-{id:06}"))
}

fn next_audit_id() -> String {
    let id = AUDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("log-{id:06}")
}

struct DemoReport {
    name: &'static str,
    date: (i32, u32, u32),
    assessment_type: AssessmentType,
    targets: TargetScores,
}

const DEMO_REPORTS: [DemoReport; 3] = [
    DemoReport {
        name: "Q1 2024 IT Security Audit",
        date: (2024, 3, 15),
        assessment_type: AssessmentType::Standard,
        targets: TargetScores::new(78, 85, 60, 90),
    },
    DemoReport {
        name: "Cloud Infrastructure Review",
        date: (2024, 2, 1),
        assessment_type: AssessmentType::AdvancedCloud,
        targets: TargetScores::new(92, 88, 75, 85),
    },
    DemoReport {
        name: "Network Penetration Test",
        date: (2024, 1, 20),
        assessment_type: AssessmentType::GdprCompliance,
        targets: TargetScores::new(65, 70, 55, 62),
    },
];

impl<R, A> ReportService<R, A>
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<A>, engine: Arc<ScoringEngine>) -> Self {
        Self {
            repository,
            audit,
            engine,
            writes: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a finished assessment and store it as a completed report.
    pub fn submit(
        &self,
        owner: &UserId,
        submission: ReportSubmission,
    ) -> Result<ReportRecord, ReportServiceError> {
        let name = normalize_name(&submission.name)?;
        let outcome = self.engine.score(&submission.answers)?;
        let _writes = self.write_lock();
        self.ensure_unique_name(owner, &name, ReportStatus::Completed, None)?;

        let now = Utc::now();
        let record = ReportRecord {
            id: next_report_id(),
            owner: owner.clone(),
            name,
            date: submission.date.unwrap_or_else(|| now.date_naive()),
            assessment_type: submission.assessment_type,
            status: ReportStatus::Completed,
            answers: submission.answers,
            outcome: Some(outcome),
            created_at: now,
            last_modified: now,
            completed_from_draft: None,
        };

        let stored = self.repository.insert(record)?;
        self.log(owner, AuditActivity::ReportSubmitted, &stored, |repository| {
            repository.remove(&stored.id).map(drop)
        })?;
        info!(report = %stored.id, owner = %owner, overall = ?stored.overall(), "report submitted");
        Ok(stored)
    }

    /// Create a draft, or update the caller's draft named by `submission.id`.
    pub fn save_draft(
        &self,
        owner: &UserId,
        submission: DraftSubmission,
    ) -> Result<ReportRecord, ReportServiceError> {
        let name = normalize_name(&submission.name)?;
        self.engine.validate_answers(&submission.answers)?;
        let _writes = self.write_lock();
        let now = Utc::now();

        match submission.id {
            Some(id) => {
                let mut draft = self.owned(owner, &id)?;
                if !draft.is_draft() {
                    return Err(ReportServiceError::NotFound(id));
                }
                self.ensure_unique_name(owner, &name, ReportStatus::Draft, Some(&id))?;

                let previous = draft.clone();
                draft.name = name;
                draft.assessment_type = submission.assessment_type;
                draft.answers = submission.answers;
                if let Some(date) = submission.date {
                    draft.date = date;
                }
                draft.last_modified = now;
                self.repository.update(draft.clone())?;
                self.log(owner, AuditActivity::DraftSaved, &draft, |repository| {
                    repository.update(previous)
                })?;
                Ok(draft)
            }
            None => {
                self.ensure_unique_name(owner, &name, ReportStatus::Draft, None)?;
                let draft = ReportRecord {
                    id: next_draft_id(),
                    owner: owner.clone(),
                    name,
                    date: submission.date.unwrap_or_else(|| now.date_naive()),
                    assessment_type: submission.assessment_type,
                    status: ReportStatus::Draft,
                    answers: submission.answers,
                    outcome: None,
                    created_at: now,
                    last_modified: now,
                    completed_from_draft: None,
                };
                let stored = self.repository.insert(draft)?;
                self.log(owner, AuditActivity::DraftSaved, &stored, |repository| {
                    repository.remove(&stored.id).map(drop)
                })?;
                Ok(stored)
            }
        }
    }

    /// Score a draft, store the completed report, and drop the draft.
    pub fn complete_draft(
        &self,
        owner: &UserId,
        draft_id: &ReportId,
    ) -> Result<ReportRecord, ReportServiceError> {
        let _writes = self.write_lock();
        let draft = self.owned(owner, draft_id)?;
        if !draft.is_draft() {
            return Err(ReportServiceError::NotFound(draft_id.clone()));
        }

        let outcome = self.engine.score(&draft.answers)?;
        self.ensure_unique_name(owner, &draft.name, ReportStatus::Completed, None)?;

        let now = Utc::now();
        let record = ReportRecord {
            id: next_report_id(),
            owner: owner.clone(),
            name: draft.name.clone(),
            date: now.date_naive(),
            assessment_type: draft.assessment_type,
            status: ReportStatus::Completed,
            answers: draft.answers.clone(),
            outcome: Some(outcome),
            created_at: now,
            last_modified: now,
            completed_from_draft: Some(draft.id.clone()),
        };

        let stored = self.repository.insert(record)?;
        if let Err(error) = self.repository.remove(&draft.id) {
            self.undo(|repository| repository.remove(&stored.id).map(drop));
            return Err(error.into());
        }
        self.log(owner, AuditActivity::DraftCompleted, &stored, |repository| {
            repository.remove(&stored.id)?;
            repository.insert(draft.clone()).map(drop)
        })?;
        info!(report = %stored.id, draft = %draft.id, owner = %owner, "draft completed");
        Ok(stored)
    }

    /// Remove one of the caller's reports. Unknown ids are not an error.
    pub fn delete(
        &self,
        owner: &UserId,
        id: &ReportId,
    ) -> Result<Option<ReportStatus>, ReportServiceError> {
        let _writes = self.write_lock();
        let Some(record) = self
            .repository
            .fetch(id)?
            .filter(|record| &record.owner == owner)
        else {
            warn!(report = %id, owner = %owner, "delete requested for unknown report");
            return Ok(None);
        };

        self.repository.remove(id)?;
        self.log(owner, AuditActivity::ReportDeleted, &record, |repository| {
            repository.insert(record.clone()).map(drop)
        })?;
        Ok(Some(record.status))
    }

    pub fn get(&self, owner: &UserId, id: &ReportId) -> Result<ReportRecord, ReportServiceError> {
        self.owned(owner, id)
    }

    pub fn dashboard(&self, owner: &UserId) -> Result<DashboardView, ReportServiceError> {
        let mut records = self.repository.list_by_owner(owner)?;
        records.sort_by(newest_first);

        let scores: Vec<u8> = records.iter().filter_map(ReportRecord::overall).collect();
        let average_score = if scores.is_empty() {
            0
        } else {
            let total: u32 = scores.iter().map(|score| u32::from(*score)).sum();
            round_points(f64::from(total) / scores.len() as f64)
        };

        Ok(DashboardView {
            total_reports: records.len(),
            has_drafts: records.iter().any(ReportRecord::is_draft),
            average_score,
            reports: records.iter().map(ReportSummaryView::from).collect(),
        })
    }

    pub fn completed_by_type(
        &self,
        owner: &UserId,
        assessment_type: AssessmentType,
    ) -> Result<Vec<ReportRecord>, ReportServiceError> {
        self.completed_where(owner, |record| record.assessment_type == assessment_type)
    }

    /// Completed reports dated within `start..=end`.
    pub fn completed_between(
        &self,
        owner: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReportRecord>, ReportServiceError> {
        if start > end {
            return Err(ReportServiceError::InvalidRange { start, end });
        }
        self.completed_where(owner, |record| record.date >= start && record.date <= end)
    }

    /// Most recently modified draft, optionally restricted to one assessment type.
    pub fn latest_draft(
        &self,
        owner: &UserId,
        assessment_type: Option<AssessmentType>,
    ) -> Result<Option<ReportRecord>, ReportServiceError> {
        let latest = self
            .repository
            .list_by_owner(owner)?
            .into_iter()
            .filter(ReportRecord::is_draft)
            .filter(|record| assessment_type.map_or(true, |kind| record.assessment_type == kind))
            .max_by(|a, b| {
                a.last_modified
                    .cmp(&b.last_modified)
                    .then_with(|| a.id.cmp(&b.id))
            });
        Ok(latest)
    }

    /// Remove every report the caller owns, returning how many were removed.
    pub fn clear(&self, owner: &UserId) -> Result<usize, ReportServiceError> {
        let _writes = self.write_lock();
        let records = self.repository.list_by_owner(owner)?;
        let mut removed: Vec<&ReportRecord> = Vec::with_capacity(records.len());
        let restore = |repository: &R, removed: &[&ReportRecord]| {
            removed
                .iter()
                .try_for_each(|record| repository.insert((*record).clone()).map(drop))
        };
        for record in &records {
            if let Err(error) = self.repository.remove(&record.id) {
                self.undo(|repository| restore(repository, &removed));
                return Err(error.into());
            }
            removed.push(record);
        }

        let mut details = BTreeMap::new();
        details.insert("removed".to_string(), records.len().to_string());
        self.record(owner, AuditActivity::ReportsCleared, details, |repository| {
            restore(repository, &removed)
        })?;
        info!(owner = %owner, removed = records.len(), "reports cleared");
        Ok(records.len())
    }

    /// Store the sample reports, synthesizing answers for their target scores.
    /// Samples whose name the caller already uses are skipped.
    pub fn seed_demo(&self, owner: &UserId) -> Result<Vec<ReportRecord>, ReportServiceError> {
        let _writes = self.write_lock();
        let existing = self.repository.list_by_owner(owner)?;
        let now = Utc::now();
        let mut seeded = Vec::new();

        for demo in &DEMO_REPORTS {
            if existing
                .iter()
                .any(|record| record.is_completed() && record.name == demo.name)
            {
                continue;
            }

            let (year, month, day) = demo.date;
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| now.date_naive());
            let synthesis = match self.engine.synthesize(&demo.targets) {
                Ok(synthesis) => synthesis,
                Err(error) => {
                    self.undo(|repository| remove_all(repository, &seeded));
                    return Err(error.into());
                }
            };
            let record = ReportRecord {
                id: next_report_id(),
                owner: owner.clone(),
                name: demo.name.to_string(),
                date,
                assessment_type: demo.assessment_type,
                status: ReportStatus::Completed,
                answers: synthesis.answers,
                outcome: Some(synthesis.report),
                created_at: now,
                last_modified: now,
                completed_from_draft: None,
            };
            match self.repository.insert(record) {
                Ok(stored) => seeded.push(stored),
                Err(error) => {
                    self.undo(|repository| remove_all(repository, &seeded));
                    return Err(error.into());
                }
            }
        }

        let mut details = BTreeMap::new();
        details.insert("seeded".to_string(), seeded.len().to_string());
        self.record(owner, AuditActivity::DemoSeeded, details, |repository| {
            remove_all(repository, &seeded)
        })?;
        Ok(seeded)
    }

    /// Latest completed report per owner, best overall score first.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<RankingEntry>, ReportServiceError> {
        let mut latest: HashMap<UserId, ReportRecord> = HashMap::new();
        for record in self.repository.list_completed()? {
            let newer = latest.get(&record.owner).map_or(true, |current| {
                newest_first(current, &record) == CmpOrdering::Greater
            });
            if newer {
                latest.insert(record.owner.clone(), record);
            }
        }

        let mut ranked: Vec<(u8, ReportRecord)> = latest
            .into_values()
            .filter_map(|record| record.overall().map(|overall| (overall, record)))
            .collect();
        ranked.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(position, (overall, record))| RankingEntry {
                rank: position + 1,
                owner: record.owner,
                report_id: record.id,
                name: record.name,
                date: record.date,
                overall,
            })
            .collect())
    }

    fn owned(&self, owner: &UserId, id: &ReportId) -> Result<ReportRecord, ReportServiceError> {
        self.repository
            .fetch(id)?
            .filter(|record| &record.owner == owner)
            .ok_or_else(|| ReportServiceError::NotFound(id.clone()))
    }

    fn completed_where<F>(
        &self,
        owner: &UserId,
        predicate: F,
    ) -> Result<Vec<ReportRecord>, ReportServiceError>
    where
        F: Fn(&ReportRecord) -> bool,
    {
        let mut records: Vec<ReportRecord> = self
            .repository
            .list_by_owner(owner)?
            .into_iter()
            .filter(|record| record.is_completed() && predicate(record))
            .collect();
        records.sort_by(newest_first);
        Ok(records)
    }

    fn ensure_unique_name(
        &self,
        owner: &UserId,
        name: &str,
        status: ReportStatus,
        exclude: Option<&ReportId>,
    ) -> Result<(), ReportServiceError> {
        let taken = self
            .repository
            .list_by_owner(owner)?
            .iter()
            .filter(|record| record.status == status)
            .filter(|record| Some(&record.id) != exclude)
            .any(|record| record.name == name);

        if taken {
            Err(ReportServiceError::DuplicateName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log<F>(
        &self,
        owner: &UserId,
        activity: AuditActivity,
        record: &ReportRecord,
        rollback: F,
    ) -> Result<(), ReportServiceError>
    where
        F: FnOnce(&R) -> Result<(), RepositoryError>,
    {
        let mut details = BTreeMap::new();
        details.insert("report_id".to_string(), record.id.0.clone());
        details.insert("name".to_string(), record.name.clone());
        details.insert("status".to_string(), record.status.label().to_string());
        self.record(owner, activity, details, rollback)
    }

    /// Append an audit entry, reverting the caller's write with `rollback` when
    /// the sink refuses it.
    fn record<F>(
        &self,
        owner: &UserId,
        activity: AuditActivity,
        details: BTreeMap<String, String>,
        rollback: F,
    ) -> Result<(), ReportServiceError>
    where
        F: FnOnce(&R) -> Result<(), RepositoryError>,
    {
        let entry = AuditEntry {
            id: next_audit_id(),
            timestamp: Utc::now(),
            actor: owner.0.clone(),
            activity,
            details,
        };
        if let Err(error) = self.audit.record(entry) {
            warn!(
                owner = %owner,
                activity = activity.label(),
                error = %error,
                "audit failed, reverting"
            );
            self.undo(rollback);
            return Err(error.into());
        }
        Ok(())
    }

    fn undo<F>(&self, rollback: F)
    where
        F: FnOnce(&R) -> Result<(), RepositoryError>,
    {
        if let Err(error) = rollback(&self.repository) {
            warn!(error = %error, "rollback failed, storage may be inconsistent");
        }
    }
}

/// Report date descending, most recently modified first within a day.
fn newest_first(a: &ReportRecord, b: &ReportRecord) -> CmpOrdering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.last_modified.cmp(&a.last_modified))
        .then_with(|| b.id.cmp(&a.id))
}

fn remove_all<R: ReportRepository>(
    repository: &R,
    records: &[ReportRecord],
) -> Result<(), RepositoryError> {
    records
        .iter()
        .try_for_each(|record| repository.remove(&record.id).map(drop))
}

fn normalize_name(name: &str) -> Result<String, ReportServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ReportServiceError::InvalidName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("a report named '{0}' already exists")]
    DuplicateName(String),
    #[error("report name must not be blank")]
    InvalidName,
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("report {0} not found")]
    NotFound(ReportId),
}
