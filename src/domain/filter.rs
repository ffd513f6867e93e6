// Filter selection domain model
use super::record::ALL_BRANCH;
use super::view_config::DomainConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The user's current selections. Empty sets mean "unconstrained".
///
/// Selections are values: each `with_*` call returns a new selection, so a
/// change always goes through a fresh fetch round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub months: BTreeSet<String>,
    pub years: BTreeSet<String>,
    pub channels: BTreeSet<String>,
    pub extra_values: BTreeSet<String>,
    pub branches: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("select at least one month, year, channel, branch or category before filtering")]
    NothingSelected,
    #[error("unknown month {0}")]
    UnknownMonth(String),
    #[error("year {0} is not a number")]
    InvalidYear(String),
    #[error("unknown channel {0}")]
    UnknownChannel(String),
    #[error("unknown branch {0}")]
    UnknownBranch(String),
    #[error("this view has no extra dimension to filter on")]
    NoExtraDimension,
    #[error("{value} is not an allowed {key} value")]
    UnknownExtraValue { key: String, value: String },
}

fn collect<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_months<I, S>(self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let months = collect(months)
            .into_iter()
            .map(|m| m.to_ascii_uppercase())
            .collect();
        Self { months, ..self }
    }

    pub fn with_years<I, S>(self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { years: collect(years), ..self }
    }

    pub fn with_channels<I, S>(self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { channels: collect(channels), ..self }
    }

    pub fn with_extra_values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { extra_values: collect(values), ..self }
    }

    pub fn with_branches<I, S>(self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { branches: collect(branches), ..self }
    }

    /// Re-apply the builder normalization to a selection built field by
    /// field, such as one deserialized from a request body.
    pub fn normalized(self) -> Self {
        Self::new()
            .with_months(self.months)
            .with_years(self.years)
            .with_channels(self.channels)
            .with_extra_values(self.extra_values)
            .with_branches(self.branches)
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
            && self.years.is_empty()
            && self.channels.is_empty()
            && self.extra_values.is_empty()
            && self.branches.is_empty()
    }

    /// Reject a selection before any fetch is issued for it.
    pub fn validate(&self, config: &DomainConfig) -> Result<(), FilterError> {
        if self.is_empty() {
            return Err(FilterError::NothingSelected);
        }

        let fiscal = config.fiscal_months();
        if let Some(month) = self
            .months
            .iter()
            .find(|m| !fiscal.iter().any(|f| f.eq_ignore_ascii_case(m)))
        {
            return Err(FilterError::UnknownMonth(month.clone()));
        }

        if let Some(year) = self.years.iter().find(|y| y.parse::<i32>().is_err()) {
            return Err(FilterError::InvalidYear(year.clone()));
        }

        if let Some(channel) = self.channels.iter().find(|c| !config.channels.contains(c)) {
            return Err(FilterError::UnknownChannel(channel.clone()));
        }

        if let Some(branch) = self
            .branches
            .iter()
            .find(|b| b.as_str() != ALL_BRANCH && !config.is_configured_branch(b))
        {
            return Err(FilterError::UnknownBranch(branch.clone()));
        }

        if !self.extra_values.is_empty() {
            let dimension = config
                .extra_dimension
                .as_ref()
                .ok_or(FilterError::NoExtraDimension)?;
            if !dimension.allowed_values.is_empty() {
                if let Some(value) = self
                    .extra_values
                    .iter()
                    .find(|v| !dimension.allowed_values.contains(v))
                {
                    return Err(FilterError::UnknownExtraValue {
                        key: dimension.key.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Selected months in fiscal order, or the whole fiscal year.
    pub fn resolved_months(&self, config: &DomainConfig) -> Vec<String> {
        let fiscal = config.fiscal_months();
        if self.months.is_empty() {
            return fiscal;
        }
        fiscal
            .into_iter()
            .filter(|f| self.months.iter().any(|m| m.eq_ignore_ascii_case(f)))
            .collect()
    }

    /// Selected years ascending, or `[start_year ..= current_year]`.
    pub fn resolved_years(&self, config: &DomainConfig, current_year: i32) -> Vec<String> {
        if self.years.is_empty() {
            return config.default_years(current_year);
        }
        let mut years: Vec<String> = self.years.iter().cloned().collect();
        years.sort_by_key(|y| y.parse::<i32>().unwrap_or(i32::MAX));
        years
    }

    /// Selected channels in configured order. Empty means "omit from the query".
    pub fn resolved_channels(&self, config: &DomainConfig) -> Vec<String> {
        config
            .channels
            .iter()
            .filter(|c| self.channels.contains(*c))
            .cloned()
            .collect()
    }

    pub fn resolved_extra_values(&self) -> Vec<String> {
        self.extra_values.iter().cloned().collect()
    }

    pub fn includes_all(&self) -> bool {
        self.branches.contains(ALL_BRANCH)
    }

    pub fn has_explicit_branches(&self) -> bool {
        self.branches.iter().any(|b| b != ALL_BRANCH)
    }

    /// Selected branches minus ALL, in configured order; the full configured
    /// list when no explicit branch is selected.
    pub fn display_branches(&self, config: &DomainConfig) -> Vec<String> {
        if !self.has_explicit_branches() {
            return config.branches.clone();
        }
        config
            .branches
            .iter()
            .filter(|b| self.branches.contains(*b))
            .cloned()
            .collect()
    }
}
