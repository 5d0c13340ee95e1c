use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use brandkit_campaign::CampaignRender;
use brandkit_core::{CampaignTheme, CancelToken};
use serde::Deserialize;

use crate::middleware::Owner;

use super::{json_body, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct RenderRequest {
    theme: CampaignTheme,
}

pub(super) async fn generate_themes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Extension(cancel): Extension<CancelToken>,
) -> Result<Json<Vec<CampaignTheme>>, ApiError> {
    let themes = state.orchestrator.generate_themes(&owner, &cancel).await?;
    Ok(Json(themes))
}

/// Render a theme against the owner's stored business summary.
pub(super) async fn render_campaign(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Extension(cancel): Extension<CancelToken>,
    body: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<CampaignRender>, ApiError> {
    let RenderRequest { theme } = json_body(body)?;
    if theme.url.trim().is_empty() {
        return Err(ApiError::invalid_input("theme.url is required"));
    }

    let summary = state.summaries.get(&owner).await?;
    let render = state
        .orchestrator
        .render_campaign(&theme, &summary, &cancel)
        .await?;
    Ok(Json(render))
}
