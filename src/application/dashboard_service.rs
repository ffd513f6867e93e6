// Dashboard service - Use case for driving one view's bar, table and growth models
use crate::application::aggregator::aggregate_by_branch;
use crate::application::fetch_orchestrator::FetchOrchestrator;
use crate::application::growth_calculator::{compute_growth, yearly_totals};
use crate::application::pivot_builder::build_pivot;
use crate::application::record_source::RecordSource;
use crate::application::view_session::{Snapshot, ViewSession};
use crate::domain::filter::{FilterError, FilterSelection};
use crate::domain::record::Record;
use crate::domain::view_config::DomainConfig;
use crate::domain::views::{BarEntry, GrowthTable, PivotTable};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundOutcome {
    pub generation: u64,
    pub applied: bool,
    pub record_count: usize,
    pub failed_months: Vec<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    config: Arc<DomainConfig>,
    orchestrator: FetchOrchestrator,
    session: Arc<ViewSession>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn RecordSource>, config: DomainConfig) -> Self {
        let config = Arc::new(config);
        Self {
            orchestrator: FetchOrchestrator::new(repository, config.clone()),
            config,
            session: Arc::new(ViewSession::new()),
        }
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.orchestrator = self.orchestrator.with_current_year(year);
        self
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Initial, unconstrained load: full fiscal year, all default years.
    pub async fn refresh(&self) -> RoundOutcome {
        self.run_round(FilterSelection::new()).await
    }

    /// Validate and apply a new selection. Invalid selections never reach
    /// the data source.
    pub async fn apply_filter(&self, filter: FilterSelection) -> Result<RoundOutcome, FilterError> {
        let filter = filter.normalized();
        filter.validate(&self.config)?;
        Ok(self.run_round(filter).await)
    }

    /// Issue a token and run the round on its own task. The round lands even
    /// if the caller stops waiting for it.
    async fn run_round(&self, filter: FilterSelection) -> RoundOutcome {
        let generation = self.session.begin_round();
        let orchestrator = self.orchestrator.clone();
        let session = self.session.clone();
        let view = self.config.id.clone();

        let task = tokio::spawn(async move {
            let round = orchestrator.fetch(generation, filter).await;

            let record_count = round.records.len();
            let failed_months = round.failed_months.clone();
            let applied = session.commit(round).await;

            if applied {
                tracing::info!(
                    view = %view,
                    generation,
                    records = record_count,
                    failed = failed_months.len(),
                    "Applied fetch round"
                );
            }

            RoundOutcome {
                generation,
                applied,
                record_count,
                failed_months,
            }
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    view = %self.config.id,
                    generation,
                    "Fetch round task failed: {}",
                    e
                );
                RoundOutcome {
                    generation,
                    applied: false,
                    record_count: 0,
                    failed_months: Vec::new(),
                }
            }
        }
    }

    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.session.snapshot().await
    }

    /// Bar summary of the authoritative snapshot.
    pub async fn bar_view(&self) -> Vec<BarEntry> {
        let snapshot = self.current().await;
        let filter = &snapshot.filter;
        aggregate_by_branch(
            &snapshot.records,
            &filter.display_branches(&self.config),
            &self.config.branches,
            filter.includes_all(),
        )
    }

    /// Branch × month table of the authoritative snapshot.
    pub async fn table_view(&self) -> PivotTable {
        let snapshot = self.current().await;
        let filter = &snapshot.filter;
        let months = filter.resolved_months(&self.config);
        let branches = filter.display_branches(&self.config);

        if filter.has_explicit_branches() {
            let selected: Vec<Record> = snapshot
                .records
                .iter()
                .filter(|r| branches.contains(&r.branch))
                .cloned()
                .collect();
            build_pivot(&selected, &months, &branches)
        } else {
            build_pivot(&snapshot.records, &months, &branches)
        }
    }

    /// Year-over-year growth of the authoritative snapshot.
    pub async fn growth_view(&self) -> GrowthTable {
        let snapshot = self.current().await;
        let filter = &snapshot.filter;
        compute_growth(
            &yearly_totals(&snapshot.records),
            &filter.display_branches(&self.config),
            &self.config.branches,
            filter.includes_all(),
        )
    }

    async fn current(&self) -> Arc<Snapshot> {
        self.session
            .snapshot()
            .await
            .unwrap_or_else(|| Arc::new(Snapshot::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fetch_orchestrator::tests::{StaticSource, month_of};
    use crate::domain::view_config::sample_config;
    use crate::domain::views::PivotCell;
    use async_trait::async_trait;
    use futures::FutureExt;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn retail_rows() -> HashMap<String, Vec<Value>> {
        let mut rows = HashMap::new();
        rows.insert(
            "APR".to_string(),
            vec![
                json!({ "branch": "Pune", "year": "2022", "month": "APR", "units": 100 }),
                json!({ "branch": "Pune", "year": "2023", "month": "APR", "units": 150 }),
                json!({ "branch": "Nashik", "year": "2022", "month": "APR", "units": 50 }),
                json!({ "branch": "Nashik", "year": "2023", "month": "APR", "units": 50 }),
            ],
        );
        rows.insert(
            "MAY".to_string(),
            vec![
                json!({ "branch": "Pune", "year": "2022", "month": "MAY", "units": 0 }),
                json!({ "branch": "Pune", "year": "2023", "month": "MAY", "units": 50 }),
            ],
        );
        rows
    }

    fn service() -> DashboardService {
        let source = StaticSource {
            rows: retail_rows(),
            ..Default::default()
        };
        DashboardService::new(Arc::new(source), sample_config()).with_current_year(2023)
    }

    #[tokio::test]
    async fn test_views_are_empty_before_first_round() {
        let service = service();
        let bars = service.bar_view().await;
        assert!(bars.iter().all(|b| b.value == 0.0));
        assert_eq!(bars.len(), 3);
        assert!(service.growth_view().await.rows.is_empty());
    }

    #[tokio::test]
    async fn test_empty_filter_is_rejected_before_fetch() {
        let source = Arc::new(StaticSource::default());
        let service = DashboardService::new(source.clone(), sample_config());

        let result = service.apply_filter(FilterSelection::new()).await;
        assert_eq!(result, Err(FilterError::NothingSelected));
        assert!(source.seen.lock().unwrap().is_empty());
        assert!(service.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_bar_view_with_all_and_absent_branch() {
        let service = service();
        let outcome = service
            .apply_filter(FilterSelection::new().with_branches(["ALL", "Pune", "Satara"]))
            .await
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.record_count, 6);

        let bars = service.bar_view().await;
        assert_eq!(
            bars,
            vec![
                BarEntry::new("ALL", 400.0),
                BarEntry::new("Pune", 300.0),
                BarEntry::new("Satara", 0.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_table_view_filters_branches_client_side() {
        let service = service();
        service
            .apply_filter(
                FilterSelection::new()
                    .with_months(["APR", "MAY"])
                    .with_branches(["Nashik", "Satara"]),
            )
            .await
            .unwrap();

        let table = service.table_view().await;
        let order: Vec<&str> = table.rows.iter().map(|r| r.branch.as_str()).collect();
        assert_eq!(order, vec!["Nashik", "Satara"]);
        assert_eq!(table.row("Nashik").unwrap().cell("APR"), PivotCell::Value(100.0));
        assert_eq!(table.row("Nashik").unwrap().cell("MAY"), PivotCell::NoData);
        assert_eq!(table.row("Satara").unwrap().cell("APR"), PivotCell::NoData);
        assert_eq!(table.grand_total.total, 100.0);
    }

    #[tokio::test]
    async fn test_growth_view_after_refresh() {
        let service = service();
        service.refresh().await;

        let growth = service.growth_view().await;
        assert_eq!(growth.columns, vec!["Pune", "Nashik", "Satara"]);

        let latest = growth.year("2023").unwrap();
        assert_eq!(latest.growth("Pune"), Some(100.0));
        assert_eq!(latest.growth("Nashik"), Some(0.0));
        assert_eq!(growth.year("2022").unwrap().growth("Pune"), Some(0.0));
    }

    #[tokio::test]
    async fn test_bar_and_pivot_totals_agree() {
        let mut rows = retail_rows();
        rows.get_mut("APR")
            .unwrap()
            .push(json!({ "branch": "Satara", "year": "2023", "units": 10 }));
        let source = StaticSource {
            rows,
            ..Default::default()
        };
        let service =
            DashboardService::new(Arc::new(source), sample_config()).with_current_year(2023);
        service.refresh().await;

        let bars = service.bar_view().await;
        let bar_total: f64 = bars.iter().map(|b| b.value).sum();
        let table = service.table_view().await;

        assert_eq!(bar_total, 410.0);
        assert_eq!(table.grand_total.total, bar_total);
        assert_eq!(table.row("Satara").unwrap().cell("APR"), PivotCell::Value(10.0));
    }

    #[tokio::test]
    async fn test_request_selection_is_normalized_before_validation() {
        let service = service();
        let filter: FilterSelection = serde_json::from_value(json!({
            "months": ["apr "],
            "branches": [" Pune"]
        }))
        .unwrap();

        let outcome = service.apply_filter(filter).await.unwrap();
        assert!(outcome.applied);

        let snapshot = service.snapshot().await.unwrap();
        assert!(snapshot.filter.branches.contains("Pune"));
        assert_eq!(service.bar_view().await, vec![BarEntry::new("Pune", 250.0)]);
    }

    /// Holds every query for `years=2022` until released.
    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl RecordSource for GatedSource {
        async fn fetch(&self, path: &str) -> anyhow::Result<Vec<Value>> {
            let month = month_of(path);
            if path.contains("years=2022") {
                self.gate.notified().await;
                return Ok(vec![
                    json!({ "branch": "Pune", "year": "2022", "month": month, "units": 999 }),
                ]);
            }
            Ok(vec![
                json!({ "branch": "Pune", "year": "2023", "month": month, "units": 5 }),
            ])
        }
    }

    #[tokio::test]
    async fn test_late_superseded_round_never_shows() {
        let gate = Arc::new(Notify::new());
        let service = DashboardService::new(
            Arc::new(GatedSource { gate: gate.clone() }),
            sample_config(),
        );

        let first = FilterSelection::new()
            .with_months(["APR"])
            .with_years(["2022"])
            .with_branches(["ALL"]);
        let second = FilterSelection::new()
            .with_months(["APR"])
            .with_years(["2023"])
            .with_branches(["ALL"]);

        let (stale, fresh) = tokio::join!(service.apply_filter(first), async {
            let outcome = service.apply_filter(second).await;
            gate.notify_one();
            outcome
        });

        let stale = stale.unwrap();
        let fresh = fresh.unwrap();
        assert!(stale.generation < fresh.generation);
        assert!(!stale.applied);
        assert!(fresh.applied);

        let snapshot = service.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, fresh.generation);

        let bars = service.bar_view().await;
        assert_eq!(bars[0], BarEntry::new("ALL", 5.0));

        let table = service.table_view().await;
        assert_eq!(table.grand_total.total, 5.0);

        let growth = service.growth_view().await;
        assert!(growth.year("2022").is_none());
        assert_eq!(growth.year("2023").unwrap().growth("ALL"), Some(0.0));
    }

    #[tokio::test]
    async fn test_round_lands_after_caller_is_dropped() {
        let gate = Arc::new(Notify::new());
        let service = DashboardService::new(
            Arc::new(GatedSource { gate: gate.clone() }),
            sample_config(),
        );
        let filter = FilterSelection::new()
            .with_months(["APR"])
            .with_years(["2022"])
            .with_branches(["ALL"]);

        // Polled once, then dropped while the upstream is still held.
        assert!(service.apply_filter(filter).now_or_never().is_none());
        assert!(service.snapshot().await.is_none());
        gate.notify_one();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(snapshot) = service.snapshot().await {
                    break snapshot;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.generation, service.session.latest_issued());
        assert_eq!(service.bar_view().await[0], BarEntry::new("ALL", 999.0));
    }
}
