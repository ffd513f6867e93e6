// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use branch_dashboard::application::dashboard_service::DashboardService;
use branch_dashboard::infrastructure::config::{load_app_config, load_view_configs};
use branch_dashboard::infrastructure::http_record_source::HttpRecordSource;
use branch_dashboard::presentation::app_state::AppState;
use branch_dashboard::presentation::router::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let views = load_view_configs(&app_config.views_dir)?;
    tracing::info!("Loaded {} view(s) from {}", views.len(), app_config.views_dir);

    // Create record source (infrastructure layer)
    let source = Arc::new(HttpRecordSource::new(
        app_config.upstream.base_url.clone(),
        Duration::from_secs(app_config.upstream.timeout_secs),
    )?);

    // Create one service per view (application layer)
    let services: Vec<DashboardService> = views
        .into_iter()
        .map(|view| DashboardService::new(source.clone(), view))
        .collect();

    // Initial unconstrained load, in the background so startup is not blocked
    for service in &services {
        let service = service.clone();
        tokio::spawn(async move {
            let outcome = service.refresh().await;
            if !outcome.failed_months.is_empty() {
                tracing::warn!(
                    view = %service.config().id,
                    "Initial load missing months: {}",
                    outcome.failed_months.join(",")
                );
            }
        });
    }

    let state = Arc::new(AppState::new(services));
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind_addr))?;
    tracing::info!("Starting branch-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
