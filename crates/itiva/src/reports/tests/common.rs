use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::assessment::{AnswerSet, QuestionId, ScoringEngine};
use crate::reports::domain::{
    AssessmentType, DraftSubmission, ReportId, ReportRecord, ReportSubmission, UserId,
};
use crate::reports::repository::{
    AuditEntry, AuditError, AuditLog, RepositoryError, ReportRepository,
};
use crate::reports::service::ReportService;

pub(super) type TestService = ReportService<MemoryRepository, MemoryAudit>;

pub(super) fn alice() -> UserId {
    UserId("alice".to_string())
}

pub(super) fn bob() -> UserId {
    UserId("bob".to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn engine() -> Arc<ScoringEngine> {
    Arc::new(ScoringEngine::standard().expect("embedded catalog loads"))
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryAudit>) {
    let repository = Arc::new(MemoryRepository::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = ReportService::new(repository.clone(), audit.clone(), engine());
    (service, repository, audit)
}

/// Every question answered with the option at `position`.
pub(super) fn answers_at(position: usize) -> AnswerSet {
    (1..=30).map(|id| (QuestionId(id), position)).collect()
}

pub(super) fn submission(name: &str, on: NaiveDate, position: usize) -> ReportSubmission {
    ReportSubmission {
        name: name.to_string(),
        date: Some(on),
        assessment_type: AssessmentType::Standard,
        answers: answers_at(position),
    }
}

pub(super) fn draft(name: &str) -> DraftSubmission {
    DraftSubmission {
        id: None,
        name: name.to_string(),
        date: None,
        assessment_type: AssessmentType::AdvancedCloud,
        answers: AnswerSet::new().with(QuestionId(1), 0).with(QuestionId(2), 3),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<ReportId, ReportRecord>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("lock").len()
    }
}

impl ReportRepository for MemoryRepository {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("lock");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ReportRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("lock");
        match guard.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock").get(id).cloned())
    }

    fn remove(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock").remove(id))
    }

    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ReportRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .values()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect())
    }

    fn list_completed(&self) -> Result<Vec<ReportRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .values()
            .filter(|record| record.is_completed())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("lock").clone()
    }
}

impl AuditLog for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().expect("lock").push(entry);
        Ok(())
    }
}

/// Audit sink that can be switched offline.
#[derive(Default)]
pub(super) struct SwitchableAudit {
    inner: MemoryAudit,
    offline: AtomicBool,
}

impl SwitchableAudit {
    pub(super) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.inner.entries()
    }
}

impl AuditLog for SwitchableAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("audit sink down".to_string()));
        }
        self.inner.record(entry)
    }
}

/// Memory repository whose owner listings are held open for `listing_delay`
/// after being read, and which can refuse to remove drafts.
#[derive(Default)]
pub(super) struct SlowRepository {
    pub(super) inner: MemoryRepository,
    pub(super) listing_delay: Duration,
    pub(super) refuse_draft_removal: bool,
}

impl ReportRepository for SlowRepository {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: ReportRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn remove(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        if self.refuse_draft_removal && id.0.starts_with("draft-") {
            return Err(RepositoryError::Unavailable("draft store locked".to_string()));
        }
        self.inner.remove(id)
    }

    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ReportRecord>, RepositoryError> {
        let records = self.inner.list_by_owner(owner)?;
        thread::sleep(self.listing_delay);
        Ok(records)
    }

    fn list_completed(&self) -> Result<Vec<ReportRecord>, RepositoryError> {
        self.inner.list_completed()
    }
}

pub(super) struct UnavailableRepository;

impl ReportRepository for UnavailableRepository {
    fn insert(&self, _record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn update(&self, _record: ReportRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn remove(&self, _id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn list_by_owner(&self, _owner: &UserId) -> Result<Vec<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn list_completed(&self) -> Result<Vec<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
