// HTTP request handlers
use crate::application::dashboard_service::RoundOutcome;
use crate::domain::filter::FilterSelection;
use crate::domain::views::{BarEntry, GrowthTable, PivotTable};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ViewSummary {
    pub id: String,
    pub title: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List configured views
pub async fn list_views(State(state): State<Arc<AppState>>) -> Json<Vec<ViewSummary>> {
    let views = state
        .views
        .values()
        .map(|service| ViewSummary {
            id: service.config().id.clone(),
            title: service.config().title.clone(),
        })
        .collect();
    Json(views)
}

/// Validate a selection and run a fetch round for it
pub async fn apply_filter(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(filter): Json<FilterSelection>,
) -> Result<Json<RoundOutcome>, ApiError> {
    let outcome = state.view(&id)?.apply_filter(filter).await?;
    Ok(Json(outcome))
}

/// Run an unconstrained fetch round
pub async fn refresh_view(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoundOutcome>, ApiError> {
    let outcome = state.view(&id)?.refresh().await;
    Ok(Json(outcome))
}

pub async fn bar_view(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BarEntry>>, ApiError> {
    Ok(Json(state.view(&id)?.bar_view().await))
}

pub async fn table_view(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PivotTable>, ApiError> {
    Ok(Json(state.view(&id)?.table_view().await))
}

pub async fn growth_view(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<GrowthTable>, ApiError> {
    Ok(Json(state.view(&id)?.growth_view().await))
}
