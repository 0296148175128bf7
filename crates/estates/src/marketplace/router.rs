use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{InquiryDraft, LoginRequest, PropertyDraft, PropertyPatch, Registration};
use super::query::{BrowseQuery, SearchCriteria};
use super::repository::{EngagementRepository, PropertyRepository, UserRepository};
use super::service::{MarketplaceError, MarketplaceService};

type Service<U, P, E> = Arc<MarketplaceService<U, P, E>>;

/// Router builder exposing the marketplace surface under `/api`.
pub fn marketplace_router<U, P, E>(service: Service<U, P, E>) -> Router
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    Router::new()
        .route("/api/", get(root_banner))
        .route("/api/auth/register", post(register_handler::<U, P, E>))
        .route("/api/auth/login", post(login_handler::<U, P, E>))
        .route("/api/auth/me", get(me_handler::<U, P, E>))
        .route(
            "/api/properties",
            post(create_property_handler::<U, P, E>).get(browse_handler::<U, P, E>),
        )
        .route("/api/properties/search", post(search_handler::<U, P, E>))
        .route(
            "/api/properties/:property_id",
            get(get_property_handler::<U, P, E>)
                .put(update_property_handler::<U, P, E>)
                .delete(delete_property_handler::<U, P, E>),
        )
        .route(
            "/api/favorites/:property_id",
            post(add_favorite_handler::<U, P, E>).delete(remove_favorite_handler::<U, P, E>),
        )
        .route("/api/favorites", get(list_favorites_handler::<U, P, E>))
        .route(
            "/api/inquiries",
            post(create_inquiry_handler::<U, P, E>).get(list_inquiries_handler::<U, P, E>),
        )
        .route("/api/stats", get(stats_handler::<U, P, E>))
        .with_state(service)
}

async fn root_banner() -> Json<serde_json::Value> {
    Json(json!({ "message": "Estates Marketplace API", "version": env!("CARGO_PKG_VERSION") }))
}

fn error_response(error: MarketplaceError) -> Response {
    let status = match &error {
        MarketplaceError::DuplicateEmail => StatusCode::BAD_REQUEST,
        MarketplaceError::InvalidCredential => StatusCode::UNAUTHORIZED,
        MarketplaceError::Forbidden => StatusCode::FORBIDDEN,
        MarketplaceError::NotFound => StatusCode::NOT_FOUND,
        MarketplaceError::Conflict => StatusCode::CONFLICT,
        MarketplaceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketplaceError::Repository(_) | MarketplaceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

/// Pull the bearer token out of the Authorization header. Absence and a
/// non-bearer scheme produce the same 401 as a bad token.
fn bearer_token(headers: &HeaderMap) -> Result<&str, Response> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| error_response(MarketplaceError::InvalidCredential))
}

macro_rules! authenticated {
    ($service:expr, $headers:expr) => {
        match bearer_token(&$headers) {
            Ok(token) => match $service.current_user(token) {
                Ok(user) => user,
                Err(error) => return error_response(error),
            },
            Err(response) => return response,
        }
    };
}

// ---- auth ----

async fn register_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Json(registration): Json<Registration>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.register(registration) {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn login_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.login(request) {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn me_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    (StatusCode::OK, Json(user)).into_response()
}

// ---- listings ----

async fn create_property_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    headers: HeaderMap,
    Json(draft): Json<PropertyDraft>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.create_property(draft, &user) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn browse_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Query(browse): Query<BrowseQuery>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.search_properties(browse.into_criteria()) {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn search_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Json(criteria): Json<SearchCriteria>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.search_properties(criteria) {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_property_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Path(property_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.get_property(&property_id) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn update_property_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<PropertyPatch>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.update_property(&property_id, patch, &user) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn delete_property_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.delete_property(&property_id, &user) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Property deleted successfully" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

// ---- favorites ----

async fn add_favorite_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.add_favorite(&user, &property_id) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Property added to favorites" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn remove_favorite_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.remove_favorite(&user, &property_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Property removed from favorites" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_favorites_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.list_favorites(&user) {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(error) => error_response(error),
    }
}

// ---- inquiries ----

async fn create_inquiry_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    headers: HeaderMap,
    Json(draft): Json<InquiryDraft>,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.create_inquiry(draft, &user) {
        Ok(inquiry) => (StatusCode::OK, Json(inquiry)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_inquiries_handler<U, P, E>(
    State(service): State<Service<U, P, E>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    let user = authenticated!(service, headers);
    match service.list_inquiries(&user) {
        Ok(inquiries) => (StatusCode::OK, Json(inquiries)).into_response(),
        Err(error) => error_response(error),
    }
}

// ---- stats ----

async fn stats_handler<U, P, E>(State(service): State<Service<U, P, E>>) -> Response
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    E: EngagementRepository + 'static,
{
    match service.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}
