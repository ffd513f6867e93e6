// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::presentation::error::ApiError;
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct AppState {
    pub views: BTreeMap<String, DashboardService>,
}

impl AppState {
    pub fn new(services: impl IntoIterator<Item = DashboardService>) -> Self {
        let views = services
            .into_iter()
            .map(|service| (service.config().id.clone(), service))
            .collect();
        Self { views }
    }

    pub fn view(&self, id: &str) -> Result<&DashboardService, ApiError> {
        self.views
            .get(id)
            .ok_or_else(|| ApiError::UnknownView(id.to_string()))
    }
}
