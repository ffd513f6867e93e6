// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    apply_filter, bar_view, growth_view, health_check, list_views, refresh_view, table_view,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/views", get(list_views))
        .route("/views/:id/filter", post(apply_filter))
        .route("/views/:id/refresh", post(refresh_view))
        .route("/views/:id/bar", get(bar_view))
        .route("/views/:id/table", get(table_view))
        .route("/views/:id/growth", get(growth_view))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
