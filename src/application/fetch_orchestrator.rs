// Fetch orchestrator - One upstream query per month, merged and normalized
use crate::application::record_source::RecordSource;
use crate::domain::filter::FilterSelection;
use crate::domain::record::Record;
use crate::domain::view_config::DomainConfig;
use chrono::Datelike;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

/// The merged outcome of one fetch round, tagged with its generation token.
#[derive(Debug, Clone)]
pub struct FetchRound {
    pub generation: u64,
    pub filter: FilterSelection,
    pub records: Vec<Record>,
    pub failed_months: Vec<String>,
}

#[derive(Clone)]
pub struct FetchOrchestrator {
    source: Arc<dyn RecordSource>,
    config: Arc<DomainConfig>,
    current_year: Option<i32>,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn RecordSource>, config: Arc<DomainConfig>) -> Self {
        Self {
            source,
            config,
            current_year: None,
        }
    }

    /// Pin the year used for the default `[start_year ..= current_year]` range.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// One `(month, path)` pair per month the round will query.
    pub fn build_queries(&self, filter: &FilterSelection) -> Vec<(String, String)> {
        let years = filter.resolved_years(&self.config, self.current_year());
        let channels = filter.resolved_channels(&self.config);
        let extra = filter.resolved_extra_values();

        filter
            .resolved_months(&self.config)
            .into_iter()
            .map(|month| {
                let path = self.query_path(&month, &years, &channels, &extra);
                (month, path)
            })
            .collect()
    }

    fn query_path(
        &self,
        month: &str,
        years: &[String],
        channels: &[String],
        extra: &[String],
    ) -> String {
        let mut params = vec![format!("months={}", urlencoding::encode(month))];
        push_group(&mut params, "years", years);
        push_group(&mut params, "channels", channels);
        if let Some(key) = self.config.extra_key() {
            push_group(&mut params, key, extra);
        }

        let separator = if self.config.api_endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.config.api_endpoint, separator, params.join("&"))
    }

    /// Run every month query concurrently and merge what comes back.
    ///
    /// A failing month is logged and contributes nothing; the round itself
    /// never fails.
    pub async fn fetch(&self, generation: u64, filter: FilterSelection) -> FetchRound {
        let queries = self.build_queries(&filter);
        tracing::debug!(
            view = %self.config.id,
            generation,
            queries = queries.len(),
            "Starting fetch round"
        );

        let pending = queries.into_iter().map(|(month, path)| {
            let source = self.source.clone();
            async move {
                let result = source.fetch(&path).await;
                (month, path, result)
            }
        });

        let mut records = Vec::new();
        let mut failed_months = Vec::new();
        for (month, path, result) in join_all(pending).await {
            match result {
                Ok(rows) => records.extend(self.ingest(&month, rows)),
                Err(e) => {
                    tracing::warn!(
                        view = %self.config.id,
                        generation,
                        month = %month,
                        path = %path,
                        "Month query failed, treating as empty: {:#}",
                        e
                    );
                    failed_months.push(month);
                }
            }
        }

        tracing::debug!(
            view = %self.config.id,
            generation,
            records = records.len(),
            failed = failed_months.len(),
            "Fetch round finished"
        );

        FetchRound {
            generation,
            filter,
            records,
            failed_months,
        }
    }

    /// Normalize a month's rows. A row without a usable month is attributed
    /// to the month it was queried for, so it still lands in exactly one cell.
    fn ingest(&self, month: &str, rows: Vec<Value>) -> Vec<Record> {
        let extra_key = self.config.extra_key();
        let fiscal = self.config.fiscal_months();
        rows.iter()
            .filter_map(
                |row| match Record::from_json(row, &self.config.metric_key, extra_key) {
                    Ok(mut record) => {
                        let known = record
                            .month
                            .as_deref()
                            .is_some_and(|m| fiscal.iter().any(|f| f == m));
                        if !known {
                            if let Some(row_month) = record.month.as_deref() {
                                tracing::warn!(
                                    view = %self.config.id,
                                    month = %month,
                                    row_month = %row_month,
                                    "Unrecognized row month, using queried month"
                                );
                            }
                            record.month = Some(month.to_string());
                        }
                        Some(record)
                    }
                    Err(reason) => {
                        tracing::warn!(
                            view = %self.config.id,
                            month = %month,
                            ?reason,
                            "Dropping upstream row"
                        );
                        None
                    }
                },
            )
            .collect()
    }
}

fn push_group(params: &mut Vec<String>, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let joined = values
        .iter()
        .map(|v| urlencoding::encode(v).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    params.push(format!("{}={}", urlencoding::encode(key), joined));
}
