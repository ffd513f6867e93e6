// View models produced by the reducers
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarEntry {
    pub branch: String,
    pub value: f64,
}

impl BarEntry {
    pub fn new(branch: impl Into<String>, value: f64) -> Self {
        Self {
            branch: branch.into(),
            value,
        }
    }
}

/// A pivot cell. `NoData` is a display distinction only: it sums like zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PivotCell {
    Value(f64),
    NoData,
}

impl PivotCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            PivotCell::Value(v) => Some(*v),
            PivotCell::NoData => None,
        }
    }

    pub fn contribution(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub(crate) fn accumulate(&mut self, amount: f64) {
        *self = PivotCell::Value(self.contribution() + amount);
    }
}

impl Serialize for PivotCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PivotCell::Value(v) => serializer.serialize_f64(*v),
            PivotCell::NoData => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub branch: String,
    pub months: BTreeMap<String, PivotCell>,
    pub total: f64,
}

impl PivotRow {
    pub fn cell(&self, month: &str) -> PivotCell {
        self.months.get(month).copied().unwrap_or(PivotCell::NoData)
    }
}

/// Branch × month matrix. `months` gives the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub months: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub grand_total: PivotRow,
}

impl PivotTable {
    pub fn row(&self, branch: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.branch == branch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthCell {
    pub branch: String,
    /// `None` when the branch has no value in this year.
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRow {
    pub year: String,
    pub values: Vec<GrowthCell>,
}

impl GrowthRow {
    pub fn growth(&self, branch: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|c| c.branch == branch)
            .and_then(|c| c.growth)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrowthTable {
    pub columns: Vec<String>,
    pub rows: Vec<GrowthRow>,
}

impl GrowthTable {
    pub fn year(&self, year: &str) -> Option<&GrowthRow> {
        self.rows.iter().find(|r| r.year == year)
    }
}
