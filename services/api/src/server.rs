use crate::cli::ServeArgs;
use crate::infra::{load_engine, AppState, InMemoryAuditRepository};
use crate::routes::with_certification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use innovation_cert::assessment::CertificationService;
use innovation_cert::config::AppConfig;
use innovation_cert::error::AppError;
use innovation_cert::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(load_engine(&config.certification, None)?);
    let repository = Arc::new(InMemoryAuditRepository::default());
    let service = Arc::new(CertificationService::new(
        engine,
        repository,
        config.certification.cache,
    ));

    let app = with_certification_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        gold = config.certification.scoring.gold_threshold,
        certified = config.certification.scoring.certified_threshold,
        "certification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
