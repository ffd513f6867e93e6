// Domain layer - Records, selections, view configuration and view models
pub mod filter;
pub mod record;
pub mod view_config;
pub mod views;
