use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Duration;
use estates::config::AppConfig;
use estates::error::AppError;
use estates::marketplace::credentials::TokenSigner;
use estates::marketplace::memory::{
    InMemoryEngagementRepository, InMemoryPropertyRepository, InMemoryUserRepository,
};
use estates::marketplace::MarketplaceService;
use estates::telemetry;
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

    let signer = TokenSigner::new(
        &config.auth.secret,
        Duration::minutes(config.auth.token_ttl_minutes),
    );
    let service = Arc::new(MarketplaceService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryPropertyRepository::default()),
        Arc::new(InMemoryEngagementRepository::default()),
        signer,
    ));

    let app = with_marketplace_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "estates marketplace api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
