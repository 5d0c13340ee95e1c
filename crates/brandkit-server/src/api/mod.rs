mod business;
mod campaigns;
mod sitemap;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use brandkit_campaign::{CampaignError, Orchestrator};
use brandkit_core::{BusinessSummary, ErrorKind, SitemapUrl};
use brandkit_profiler::{ProfilerError, Researcher};
use brandkit_store::{Store, StoreError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    cancel_on_disconnect, request_id, resolve_owner, AuthState, OWNER_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub researcher: Researcher,
    pub orchestrator: Orchestrator,
    pub summaries: Store<BusinessSummary>,
    pub sitemaps: Store<SitemapUrl>,
}

/// Handler failure, rendered as a plain-text body with a status derived
/// from its [`ErrorKind`].
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for(self.kind);
        if status.is_server_error() {
            tracing::error!(kind = %self.kind, error = %self.message, "request failed");
        } else {
            tracing::debug!(kind = %self.kind, error = %self.message, "request rejected");
        }
        (status, self.message).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<ProfilerError> for ApiError {
    fn from(e: ProfilerError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

/// Unwraps a JSON body, reporting malformed input as [`ErrorKind::InvalidInput`].
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(OWNER_HEADER),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route(
            "/business-summaries",
            get(business::get_summary)
                .post(business::create_summary)
                .patch(business::update_summary),
        )
        .route("/sitemap", get(sitemap::list_urls))
        .route("/campaigns/themes", get(campaigns::generate_themes))
        .route("/campaigns", axum::routing::post(campaigns::render_campaign))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(auth, resolve_owner))
                .layer(axum::middleware::from_fn(cancel_on_disconnect)),
        )
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
