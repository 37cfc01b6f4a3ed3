use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentType, DraftSubmission, ReportId, ReportSubmission, UserId};
use super::repository::{AuditLog, ReportRepository};
use super::service::{ReportService, ReportServiceError};
use crate::error::AppError;

/// Header carrying the caller id asserted by the identity layer in front of the service.
pub const USER_HEADER: &str = "x-user-id";

const DEFAULT_RANKING_LIMIT: usize = 10;

type SharedService<R, A> = Arc<ReportService<R, A>>;

pub fn report_router<R, A>(service: SharedService<R, A>) -> Router
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports",
            get(dashboard_handler::<R, A>)
                .post(submit_handler::<R, A>)
                .delete(clear_handler::<R, A>),
        )
        .route("/api/v1/reports/completed", get(completed_handler::<R, A>))
        .route("/api/v1/reports/drafts", post(save_draft_handler::<R, A>))
        .route(
            "/api/v1/reports/drafts/latest",
            get(latest_draft_handler::<R, A>),
        )
        .route(
            "/api/v1/reports/drafts/:draft_id/complete",
            post(complete_draft_handler::<R, A>),
        )
        .route("/api/v1/reports/seed", post(seed_handler::<R, A>))
        .route(
            "/api/v1/reports/:report_id",
            get(report_handler::<R, A>).delete(delete_handler::<R, A>),
        )
        .route("/api/v1/rankings", get(rankings_handler::<R, A>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletedQuery {
    #[serde(rename = "type")]
    pub assessment_type: Option<AssessmentType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftQuery {
    #[serde(rename = "type")]
    pub assessment_type: Option<AssessmentType>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub limit: Option<usize>,
}

fn caller(headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing {USER_HEADER} header"),
            });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })
}

fn error_response(error: ReportServiceError) -> Response {
    AppError::from(error).into_response()
}

pub(crate) async fn dashboard_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.dashboard(&owner) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.submit(&owner, submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn clear_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.clear(&owner) {
        Ok(removed) => (StatusCode::OK, axum::Json(json!({ "removed": removed }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn completed_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    Query(query): Query<CompletedQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    let result = match (query.from, query.to, query.assessment_type) {
        (None, None, Some(kind)) => service.completed_by_type(&owner, kind),
        (from, to, kind) => service
            .completed_between(
                &owner,
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )
            .map(|records| {
                records
                    .into_iter()
                    .filter(|record| kind.map_or(true, |kind| record.assessment_type == kind))
                    .collect::<Vec<_>>()
            }),
    };

    match result {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_draft_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<DraftSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.save_draft(&owner, submission) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_draft_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    Query(query): Query<DraftQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.latest_draft(&owner, query.assessment_type) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": "no draft found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_draft_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    Path(draft_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.complete_draft(&owner, &ReportId(draft_id)) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn seed_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.seed_demo(&owner) {
        Ok(records) => (StatusCode::CREATED, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.get(&owner, &ReportId(report_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    let owner = match caller(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.delete(&owner, &ReportId(report_id.clone())) {
        Ok(deleted) => {
            let payload = json!({
                "id": report_id,
                "deleted": deleted.map(|status| status.label()),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rankings_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Query(query): Query<RankingQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    match service.leaderboard(query.limit.unwrap_or(DEFAULT_RANKING_LIMIT)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}
