//! Filter, aggregate and growth engine behind the branch dashboard views.
//!
//! Each view is driven by a [`DomainConfig`](domain::view_config::DomainConfig):
//! a [`DashboardService`](application::dashboard_service::DashboardService)
//! fetches one query per month through a
//! [`RecordSource`](application::record_source::RecordSource), keeps the latest
//! round as its snapshot and reduces it to bar, table and growth models.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
