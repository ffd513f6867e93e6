// Data-fetch contract for upstream metric records
use async_trait::async_trait;
use serde_json::Value;

/// Upstream data source. `path` is `{api_endpoint}?months=..&years=..`.
///
/// Rows come back loosely typed; normalization into [`Record`] happens in the
/// orchestrator so every source gets the same defaults.
///
/// [`Record`]: crate::domain::record::Record
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<Value>>;
}
