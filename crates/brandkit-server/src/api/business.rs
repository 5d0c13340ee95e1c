use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use brandkit_core::{BusinessSummary, CancelToken};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::middleware::Owner;

use super::{json_body, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CreateSummaryRequest {
    #[serde(default)]
    url: String,
}

/// Profile the owner's website and store the resulting summary.
pub(super) async fn create_summary(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Extension(cancel): Extension<CancelToken>,
    body: Result<Json<CreateSummaryRequest>, JsonRejection>,
) -> Result<Json<BusinessSummary>, ApiError> {
    let request = json_body(body)?;
    let root = site_url(&request.url)?;

    let summary = state
        .researcher
        .profile_owner(&owner, &root, &state.summaries, &state.sitemaps, &cancel)
        .await?;
    Ok(Json(summary))
}

pub(super) async fn get_summary(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<BusinessSummary>, ApiError> {
    Ok(Json(state.summaries.get(&owner).await?))
}

/// Merge a partial object into the owner's summary.
pub(super) async fn update_summary(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<BusinessSummary>, ApiError> {
    let patch = json_body(body)?;
    let updated = state.summaries.update(&owner, patch).await?;
    tracing::info!(owner = %owner, "business summary updated");
    Ok(Json(updated))
}

/// An absolute http(s) URL with a host.
fn site_url(raw: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::invalid_input("url is required"));
    }
    let url = Url::parse(raw).map_err(|e| ApiError::invalid_input(format!("invalid url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::invalid_input("url must be an http(s) address"));
    }
    Ok(url.into())
}
