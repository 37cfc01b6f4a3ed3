use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::reports::domain::ReportSubmission;
use crate::reports::router::{report_router, USER_HEADER};
use crate::reports::service::ReportService;

fn router_with(service: TestService) -> axum::Router {
    report_router(Arc::new(service))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

fn best_answers_json() -> Value {
    let answers: serde_json::Map<String, Value> =
        (1..=30).map(|id| (id.to_string(), json!(0))).collect();
    Value::Object(answers)
}

#[tokio::test]
async fn requests_without_caller_are_unauthorized() {
    let (service, _, _) = build_service();

    let response = router_with(service)
        .oneshot(request("GET", "/api/v1/reports", None, None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submit_route_creates_report_visible_on_dashboard() {
    let (service, _, _) = build_service();
    let router = router_with(service);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/reports",
            Some("alice"),
            Some(json!({
                "name": "Baseline",
                "date": "2024-04-01",
                "assessment_type": "Standard ITIVA Assessment",
                "answers": best_answers_json(),
            })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    assert_eq!(created["outcome"]["overall"], 100);
    assert_eq!(created["status"], "completed");

    let response = router
        .oneshot(request("GET", "/api/v1/reports", Some("alice"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = read_json_body(response).await;
    assert_eq!(dashboard["total_reports"], 1);
    assert_eq!(dashboard["average_score"], 100);
    assert_eq!(dashboard["reports"][0]["name"], "Baseline");
}

#[tokio::test]
async fn submit_handler_maps_validation_and_conflict_errors() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let mut headers = HeaderMap::new();
    headers.insert(USER_HEADER, HeaderValue::from_static("alice"));

    let mut invalid = submission("Broken", date(2024, 1, 1), 0);
    invalid.answers = invalid.answers.with(crate::assessment::QuestionId(1), 9);
    let response = crate::reports::router::submit_handler::<MemoryRepository, MemoryAudit>(
        State(service.clone()),
        headers.clone(),
        axum::Json(invalid),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let valid: ReportSubmission = submission("Baseline", date(2024, 1, 1), 0);
    let response = crate::reports::router::submit_handler::<MemoryRepository, MemoryAudit>(
        State(service.clone()),
        headers.clone(),
        axum::Json(valid.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = crate::reports::router::submit_handler::<MemoryRepository, MemoryAudit>(
        State(service),
        headers,
        axum::Json(valid),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn repository_outage_maps_to_internal_error() {
    let service = Arc::new(ReportService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryAudit::default()),
        engine(),
    ));

    let response = report_router(service)
        .oneshot(request("GET", "/api/v1/reports", Some("alice"), None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn draft_routes_save_fetch_latest_and_complete() {
    let (service, _, _) = build_service();
    let router = router_with(service);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/reports/drafts",
            Some("alice"),
            Some(json!({
                "name": "Cloud review",
                "assessment_type": "cloud",
                "answers": { "1": 0 },
            })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let draft = read_json_body(response).await;
    let draft_id = draft["id"].as_str().expect("draft id").to_string();

    let response = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/reports/drafts/latest?type=cloud",
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["id"], draft_id.as_str());

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/reports/drafts/{draft_id}/complete"),
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let completed = read_json_body(response).await;
    assert_eq!(completed["completed_from_draft"], draft_id.as_str());
    assert_eq!(completed["outcome"]["ws"], 13);

    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/reports/drafts/latest",
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completed_route_filters_by_range_and_rejects_inverted_ranges() {
    let (service, _, _) = build_service();
    let owner = alice();
    service
        .submit(&owner, submission("Jan", date(2024, 1, 15), 0))
        .expect("report");
    service
        .submit(&owner, submission("May", date(2024, 5, 15), 0))
        .expect("report");
    let router = router_with(service);

    let response = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/reports/completed?from=2024-05-01",
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let records = read_json_body(response).await;
    assert_eq!(records.as_array().map(Vec::len), Some(1));
    assert_eq!(records[0]["name"], "May");

    let response = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/reports/completed?type=gdpr",
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await.as_array().map(Vec::len), Some(0));

    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/reports/completed?from=2024-06-01&to=2024-01-01",
            Some("alice"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_routes_get_and_delete_by_id() {
    let (service, _, _) = build_service();
    let record = service
        .submit(&alice(), submission("Mine", date(2024, 1, 1), 0))
        .expect("report");
    let router = router_with(service);
    let uri = format!("/api/v1/reports/{}", record.id);

    let response = router
        .clone()
        .oneshot(request("GET", &uri, Some("bob"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some("alice"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["deleted"], "completed");

    let response = router
        .oneshot(request("DELETE", &uri, Some("alice"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json_body(response).await["deleted"].is_null());
}

#[tokio::test]
async fn seed_and_rankings_routes_expose_sample_data() {
    let (service, _, _) = build_service();
    let router = router_with(service);

    let response = router
        .clone()
        .oneshot(request("POST", "/api/v1/reports/seed", Some("carol"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json_body(response).await.as_array().map(Vec::len), Some(3));

    let response = router
        .oneshot(request("GET", "/api/v1/rankings?limit=5", None, None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let ranking = read_json_body(response).await;
    assert_eq!(ranking[0]["owner"], "carol");
    assert_eq!(ranking[0]["name"], "Q1 2024 IT Security Audit");
    assert_eq!(ranking[0]["overall"], 80);
}
