// Per-view domain configuration
use super::record::ALL_BRANCH;
use serde::{Deserialize, Serialize};

/// Calendar months in January-first order, as used in record `month` fields.
pub const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraDimension {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

/// Everything one dashboard view needs to know about its data domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub id: String,
    pub title: String,
    pub api_endpoint: String,
    pub metric_key: String,
    pub branches: Vec<String>,
    pub start_year: i32,
    #[serde(default = "default_fiscal_start_month")]
    pub fiscal_start_month: String,
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    #[serde(default)]
    pub extra_dimension: Option<ExtraDimension>,
}

fn default_fiscal_start_month() -> String {
    "APR".to_string()
}

fn default_channels() -> Vec<String> {
    vec!["ARENA".to_string(), "NEXA".to_string()]
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("view {0} has no branches configured")]
    NoBranches(String),
    #[error("view {0} lists the reserved branch label ALL")]
    ReservedBranch(String),
    #[error("view {view} has unknown fiscal start month {month}")]
    UnknownFiscalMonth { view: String, month: String },
}

impl DomainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branches.is_empty() {
            return Err(ConfigError::NoBranches(self.id.clone()));
        }
        if self.branches.iter().any(|b| b == ALL_BRANCH) {
            return Err(ConfigError::ReservedBranch(self.id.clone()));
        }
        if fiscal_start_index(&self.fiscal_start_month).is_none() {
            return Err(ConfigError::UnknownFiscalMonth {
                view: self.id.clone(),
                month: self.fiscal_start_month.clone(),
            });
        }
        Ok(())
    }

    /// The full 12-month fiscal sequence, starting at the configured fiscal month.
    pub fn fiscal_months(&self) -> Vec<String> {
        let start = fiscal_start_index(&self.fiscal_start_month).unwrap_or(3);
        (0..MONTHS.len())
            .map(|offset| MONTHS[(start + offset) % MONTHS.len()].to_string())
            .collect()
    }

    /// `[start_year ..= current_year]` as strings.
    pub fn default_years(&self, current_year: i32) -> Vec<String> {
        (self.start_year..=current_year.max(self.start_year))
            .map(|y| y.to_string())
            .collect()
    }

    pub fn extra_key(&self) -> Option<&str> {
        self.extra_dimension.as_ref().map(|d| d.key.as_str())
    }

    pub fn is_configured_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}

fn fiscal_start_index(month: &str) -> Option<usize> {
    MONTHS.iter().position(|m| m.eq_ignore_ascii_case(month))
}

#[cfg(test)]
pub(crate) fn sample_config() -> DomainConfig {
    DomainConfig {
        id: "retail".to_string(),
        title: "Retail Sales".to_string(),
        api_endpoint: "/api/retail".to_string(),
        metric_key: "units".to_string(),
        branches: vec!["Pune".to_string(), "Nashik".to_string(), "Satara".to_string()],
        start_year: 2022,
        fiscal_start_month: default_fiscal_start_month(),
        channels: default_channels(),
        extra_dimension: Some(ExtraDimension {
            key: "segment".to_string(),
            label: Some("Segment".to_string()),
            allowed_values: vec!["SUV".to_string(), "HATCH".to_string()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiscal_months_start_at_april() {
        let months = sample_config().fiscal_months();
        assert_eq!(months.len(), 12);
        assert_eq!(months.first().map(String::as_str), Some("APR"));
        assert_eq!(months.last().map(String::as_str), Some("MAR"));
    }

    #[test]
    fn test_default_years_are_inclusive() {
        let config = sample_config();
        assert_eq!(config.default_years(2024), vec!["2022", "2023", "2024"]);
        assert_eq!(config.default_years(2020), vec!["2022"]);
    }

    #[test]
    fn test_parse_with_defaults() {
        let config: DomainConfig = toml::from_str(
            r#"
            id = "service"
            title = "Service Revenue"
            api_endpoint = "/api/service"
            metric_key = "revenue"
            branches = ["Pune"]
            start_year = 2021
            "#,
        )
        .unwrap();

        assert_eq!(config.fiscal_start_month, "APR");
        assert_eq!(config.channels, vec!["ARENA", "NEXA"]);
        assert!(config.extra_dimension.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_reserved_branch() {
        let mut config = sample_config();
        config.branches.push(ALL_BRANCH.to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReservedBranch("retail".to_string()))
        );
    }
}
