// Presentation layer - HTTP surface over the per-view services
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod router;
