// Record domain model
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Label of the synthetic pseudo-branch that sums the configured branch list.
pub const ALL_BRANCH: &str = "ALL";

/// A single fetched metric row. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub branch: String,
    pub year: String,
    pub month: Option<String>,
    pub channel: Option<String>,
    pub extra: BTreeMap<String, String>,
    pub metric_value: f64,
}

/// Why a raw row could not become a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotAnObject,
    MissingBranch,
    MissingYear,
    SyntheticBranch,
}

impl Record {
    pub fn new(branch: impl Into<String>, year: impl Into<String>, metric_value: f64) -> Self {
        Self {
            branch: branch.into(),
            year: year.into(),
            month: None,
            channel: None,
            extra: BTreeMap::new(),
            metric_value,
        }
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Normalize a loosely typed upstream row.
    ///
    /// A missing or unparseable metric becomes `0.0`; only rows that cannot be
    /// keyed by branch and year are rejected.
    pub fn from_json(
        value: &Value,
        metric_key: &str,
        extra_key: Option<&str>,
    ) -> Result<Self, RejectReason> {
        let object = value.as_object().ok_or(RejectReason::NotAnObject)?;

        let branch = lookup_text(object, "branch").ok_or(RejectReason::MissingBranch)?;
        if branch == ALL_BRANCH {
            return Err(RejectReason::SyntheticBranch);
        }
        let year = lookup_text(object, "year").ok_or(RejectReason::MissingYear)?;

        let metric_value = lookup(object, metric_key).map(as_metric).unwrap_or(0.0);

        let mut extra = BTreeMap::new();
        if let Some(key) = extra_key {
            if let Some(v) = lookup_text(object, key) {
                extra.insert(key.to_string(), v);
            }
        }

        Ok(Self {
            branch,
            year,
            month: lookup_text(object, "month").map(|m| m.to_ascii_uppercase()),
            channel: lookup_text(object, "channel"),
            extra,
            metric_value,
        })
    }
}

/// Exact key first, then a case-insensitive match ("Branch" vs "branch").
fn lookup<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn lookup_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match lookup(object, key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.as_i64().is_none() && f.is_finite() && f.fract() == 0.0 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn as_metric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_configured_metric() {
        let row = json!({
            "Branch": "Pune",
            "Year": 2023,
            "Month": "apr",
            "Channel": "NEXA",
            "segment": "SUV",
            "retail_units": 42
        });

        let record = Record::from_json(&row, "retail_units", Some("segment")).unwrap();
        assert_eq!(record.branch, "Pune");
        assert_eq!(record.year, "2023");
        assert_eq!(record.month.as_deref(), Some("APR"));
        assert_eq!(record.channel.as_deref(), Some("NEXA"));
        assert_eq!(record.extra.get("segment").map(String::as_str), Some("SUV"));
        assert_eq!(record.metric_value, 42.0);
    }

    #[test]
    fn test_missing_metric_defaults_to_zero() {
        let row = json!({ "branch": "Nashik", "year": "2022" });
        let record = Record::from_json(&row, "retail_units", None).unwrap();
        assert_eq!(record.metric_value, 0.0);

        let row = json!({ "branch": "Nashik", "year": "2022", "retail_units": "n/a" });
        let record = Record::from_json(&row, "retail_units", None).unwrap();
        assert_eq!(record.metric_value, 0.0);

        let row = json!({ "branch": "Nashik", "year": "2022", "retail_units": "1,250" });
        let record = Record::from_json(&row, "retail_units", None).unwrap();
        assert_eq!(record.metric_value, 1250.0);
    }

    #[test]
    fn test_unkeyable_rows_are_rejected() {
        assert_eq!(
            Record::from_json(&json!([1, 2]), "m", None),
            Err(RejectReason::NotAnObject)
        );
        assert_eq!(
            Record::from_json(&json!({ "year": "2022" }), "m", None),
            Err(RejectReason::MissingBranch)
        );
        assert_eq!(
            Record::from_json(&json!({ "branch": "Pune" }), "m", None),
            Err(RejectReason::MissingYear)
        );
        assert_eq!(
            Record::from_json(&json!({ "branch": "ALL", "year": "2022" }), "m", None),
            Err(RejectReason::SyntheticBranch)
        );
    }

    #[test]
    fn test_integral_float_year_is_normalized() {
        let row = json!({ "branch": "Pune", "year": 2023.0, "units": 1 });
        let record = Record::from_json(&row, "units", None).unwrap();
        assert_eq!(record.year, "2023");

        let row = json!({ "branch": "Pune", "year": 2023, "units": 1 });
        let record = Record::from_json(&row, "units", None).unwrap();
        assert_eq!(record.year, "2023");
    }
}
