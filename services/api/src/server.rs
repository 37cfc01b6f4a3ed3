use crate::cli::ServeArgs;
use crate::infra::{load_engine, AppState, InMemoryAuditLog, InMemoryReportRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use itiva::config::AppConfig;
use itiva::error::AppError;
use itiva::reports::ReportService;
use itiva::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(load_engine(&config.assessment)?);
    info!(
        questions = engine.catalog().len(),
        custom = config.assessment.questionnaire_path.is_some(),
        "questionnaire loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let audit = Arc::new(InMemoryAuditLog::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        audit: audit.clone(),
    };

    let repository = Arc::new(InMemoryReportRepository::default());
    let report_service = Arc::new(ReportService::new(repository, audit, engine.clone()));

    let app = with_service_routes(engine, report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "itiva assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
