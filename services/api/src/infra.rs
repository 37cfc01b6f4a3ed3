use chrono::NaiveDate;
use itiva::assessment::{CatalogError, Questionnaire, ScoringEngine};
use itiva::config::AssessmentConfig;
use itiva::reports::{
    AuditEntry, AuditError, AuditLog, ReportId, ReportRecord, ReportRepository, RepositoryError,
    UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) audit: Arc<InMemoryAuditLog>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ReportRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }

    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect())
    }

    fn list_completed(&self) -> Result<Vec<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.is_completed())
            .cloned()
            .collect())
    }
}

/// Audit trail kept newest first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        let mut guard = self.entries.lock().expect("audit mutex poisoned");
        guard.insert(0, entry);
        Ok(())
    }
}

impl InMemoryAuditLog {
    pub(crate) fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let guard = self.entries.lock().expect("audit mutex poisoned");
        guard.iter().take(limit).cloned().collect()
    }

    /// Drop one entry by id, returning whether it existed.
    pub(crate) fn remove(&self, id: &str) -> bool {
        let mut guard = self.entries.lock().expect("audit mutex poisoned");
        let before = guard.len();
        guard.retain(|entry| entry.id != id);
        guard.len() != before
    }
}

/// Engine over the configured questionnaire, or the embedded one when none is set.
pub(crate) fn load_engine(config: &AssessmentConfig) -> Result<ScoringEngine, CatalogError> {
    let catalog = match &config.questionnaire_path {
        Some(path) => {
            let catalog = Questionnaire::from_path(path)?;
            info!(path = %path.display(), questions = catalog.len(), "using custom questionnaire");
            catalog
        }
        None => Questionnaire::standard()?,
    };
    Ok(ScoringEngine::new(Arc::new(catalog)))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Clap parser for percentage arguments.
pub(crate) fn parse_target(raw: &str) -> Result<i32, String> {
    let value = raw
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("failed to parse '{raw}' as an integer ({err})"))?;
    if (0..=100).contains(&value) {
        Ok(value)
    } else {
        Err(format!("target {value} must be between 0 and 100"))
    }
}
