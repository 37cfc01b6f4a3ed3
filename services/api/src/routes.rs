use crate::infra::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use itiva::assessment::{assessment_router, ScoringEngine};
use itiva::reports::{report_router, AuditLog, ReportRepository, ReportService};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const DEFAULT_AUDIT_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuditQuery {
    pub(crate) limit: Option<usize>,
}

pub(crate) fn with_service_routes<R, A>(
    engine: Arc<ScoringEngine>,
    reports: Arc<ReportService<R, A>>,
) -> axum::Router
where
    R: ReportRepository + 'static,
    A: AuditLog + 'static,
{
    assessment_router(engine)
        .merge(report_router(reports))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/audit", axum::routing::get(audit_endpoint))
        .route(
            "/api/v1/audit/:entry_id",
            axum::routing::delete(audit_delete_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn audit_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
    let entries = state
        .audit
        .recent(query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT));
    (StatusCode::OK, Json(entries))
}

pub(crate) async fn audit_delete_endpoint(
    Extension(state): Extension<AppState>,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    if state.audit.remove(&entry_id) {
        (StatusCode::OK, Json(json!({ "deleted": entry_id })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("audit entry {entry_id} not found") })),
        )
    }
}
