// Application layer - Fetch rounds, reducers and the per-view use case
pub mod aggregator;
pub mod dashboard_service;
pub mod fetch_orchestrator;
pub mod growth_calculator;
pub mod pivot_builder;
pub mod record_source;
pub mod view_session;
