use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use estates::marketplace::memory::{
    InMemoryEngagementRepository, InMemoryPropertyRepository, InMemoryUserRepository,
};
use estates::marketplace::router::marketplace_router;
use estates::marketplace::MarketplaceService;

pub(crate) type ApiService = MarketplaceService<
    InMemoryUserRepository,
    InMemoryPropertyRepository,
    InMemoryEngagementRepository,
>;

pub(crate) fn with_marketplace_routes(service: Arc<ApiService>) -> axum::Router {
    marketplace_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use estates::marketplace::credentials::TokenSigner;
    use tower::ServiceExt;

    fn test_service() -> Arc<ApiService> {
        Arc::new(MarketplaceService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(InMemoryPropertyRepository::default()),
            Arc::new(InMemoryEngagementRepository::default()),
            TokenSigner::with_default_ttl("api-test-secret"),
        ))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn marketplace_surface_is_mounted() {
        let app = with_marketplace_routes(test_service());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
