use crate::cli::ServeArgs;
use crate::infra::{load_roster, AppState, InMemoryCandidateRepository};
use crate::routes::with_pipeline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::telemetry;
use hireflow::workflows::pipeline::PipelineService;
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
    if let Some(path) = args.candidates_csv.take() {
        config.pipeline.seed_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let candidates = match config.pipeline.seed_csv.as_deref() {
        Some(path) => {
            let candidates = load_roster(Some(path))?;
            info!(path = %path.display(), count = candidates.len(), "seeded candidate store");
            candidates
        }
        None => Vec::new(),
    };
    let repository = Arc::new(InMemoryCandidateRepository::seeded(candidates)?);
    let pipeline_service = Arc::new(PipelineService::new(
        repository,
        config.pipeline.transition_policy.clone(),
    ));

    let app = with_pipeline_routes(pipeline_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = %config.pipeline.transition_policy,
        "candidate pipeline service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
