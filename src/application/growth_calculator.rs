// Growth calculator - Year-over-year percentage change per branch and for ALL
use crate::domain::record::{ALL_BRANCH, Record};
use crate::domain::views::{GrowthCell, GrowthRow, GrowthTable};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyValue {
    pub year: String,
    pub branch: String,
    pub value: f64,
}

impl YearlyValue {
    pub fn new(year: impl Into<String>, branch: impl Into<String>, value: f64) -> Self {
        Self {
            year: year.into(),
            branch: branch.into(),
            value,
        }
    }
}

fn year_key(year: &str) -> (i64, String) {
    (year.trim().parse::<i64>().unwrap_or(i64::MAX), year.to_string())
}

/// Sum `metric_value` per (year, branch), ascending by year.
pub fn yearly_totals(records: &[Record]) -> Vec<YearlyValue> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut sums: HashMap<(String, String), f64> = HashMap::new();
    for record in records {
        let key = (record.year.clone(), record.branch.clone());
        match sums.get_mut(&key) {
            Some(sum) => *sum += record.metric_value,
            None => {
                sums.insert(key.clone(), record.metric_value);
                order.push(key);
            }
        }
    }

    let mut totals: Vec<YearlyValue> = order
        .into_iter()
        .map(|key| {
            let value = sums.get(&key).copied().unwrap_or(0.0);
            YearlyValue::new(key.0, key.1, value)
        })
        .collect();
    totals.sort_by_key(|v| year_key(&v.year));
    totals
}

/// `((current - prior) / prior) * 100` to two decimals; a zero prior gives 0.
pub fn year_over_year(prior: f64, current: f64) -> f64 {
    if prior == 0.0 {
        return 0.0;
    }
    let growth = (current - prior) / prior * 100.0;
    if !growth.is_finite() {
        return 0.0;
    }
    (growth * 100.0).round() / 100.0
}

/// One row per year; columns are ALL (when requested) then `display_branches`.
///
/// Each branch keeps its own most recent prior value and starts at 0 in the
/// first year it appears. ALL is computed from the summed series of every
/// configured branch, never from averaged branch rates.
pub fn compute_growth(
    values: &[YearlyValue],
    display_branches: &[String],
    configured_branches: &[String],
    include_all: bool,
) -> GrowthTable {
    let mut years: Vec<String> = Vec::new();
    let mut by_year_branch: HashMap<(&str, &str), f64> = HashMap::new();
    for v in values {
        if !years.contains(&v.year) {
            years.push(v.year.clone());
        }
        *by_year_branch
            .entry((v.year.as_str(), v.branch.as_str()))
            .or_insert(0.0) += v.value;
    }
    years.sort_by_key(|y| year_key(y));

    let mut columns = Vec::with_capacity(display_branches.len() + 1);
    if include_all {
        columns.push(ALL_BRANCH.to_string());
    }
    columns.extend(display_branches.iter().cloned());

    let mut branch_priors: HashMap<&str, f64> = HashMap::new();
    let mut all_prior: Option<f64> = None;
    let mut rows = Vec::with_capacity(years.len());

    for year in &years {
        let mut cells = Vec::with_capacity(columns.len());

        if include_all {
            let combined: f64 = configured_branches
                .iter()
                .map(|b| {
                    by_year_branch
                        .get(&(year.as_str(), b.as_str()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .sum();
            let growth = all_prior.map_or(0.0, |prior| year_over_year(prior, combined));
            all_prior = Some(combined);
            cells.push(GrowthCell {
                branch: ALL_BRANCH.to_string(),
                growth: Some(growth),
            });
        }

        for branch in display_branches {
            let current = by_year_branch.get(&(year.as_str(), branch.as_str())).copied();
            let growth = current.map(|value| {
                let growth = branch_priors
                    .get(branch.as_str())
                    .map_or(0.0, |prior| year_over_year(*prior, value));
                branch_priors.insert(branch.as_str(), value);
                growth
            });
            cells.push(GrowthCell {
                branch: branch.clone(),
                growth,
            });
        }

        rows.push(GrowthRow {
            year: year.clone(),
            values: cells,
        });
    }

    GrowthTable { columns, rows }
}
