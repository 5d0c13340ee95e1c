use axum::{extract::State, Json};
use brandkit_store::Filter;
use serde::Serialize;

use crate::middleware::Owner;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SitemapResponse {
    urls: Vec<String>,
}

pub(super) async fn list_urls(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<SitemapResponse>, ApiError> {
    let rows = state.sitemaps.get_all(&Filter::eq("id", owner)).await?;
    Ok(Json(SitemapResponse {
        urls: rows.into_iter().map(|row| row.url).collect(),
    }))
}
