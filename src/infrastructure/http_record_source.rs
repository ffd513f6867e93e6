// HTTP record source implementation
use crate::application::record_source::RecordSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    base_url: String,
    client: reqwest::Client,
}

/// Upstream answers either with a bare array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsResponse {
    Rows(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

impl RecordsResponse {
    fn into_rows(self) -> Vec<Value> {
        match self {
            RecordsResponse::Rows(rows) => rows,
            RecordsResponse::Wrapped { data } => data,
        }
    }
}

impl HttpRecordSource {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self, path: &str) -> Result<Vec<Value>> {
        let url = self.build_url(path);
        tracing::debug!("Fetching records from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to record source")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Record query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<RecordsResponse>()
            .await
            .context("Failed to parse record source response")?;

        Ok(data.into_rows())
    }
}
