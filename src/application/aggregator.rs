// Aggregator - Per-branch totals for the bar view
use crate::domain::record::{ALL_BRANCH, Record};
use crate::domain::views::BarEntry;
use std::collections::HashMap;

/// Sum `metric_value` per branch.
///
/// Every displayed branch gets an entry, zero when it has no records. When
/// `include_all` is set an ALL entry comes first, summed over the whole
/// configured branch list rather than only the displayed subset.
pub fn aggregate_by_branch(
    records: &[Record],
    display_branches: &[String],
    configured_branches: &[String],
    include_all: bool,
) -> Vec<BarEntry> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.branch.as_str()).or_insert(0.0) += record.metric_value;
    }

    let total_of = |branch: &String| totals.get(branch.as_str()).copied().unwrap_or(0.0);

    let mut entries = Vec::with_capacity(display_branches.len() + 1);
    if include_all {
        let all: f64 = configured_branches.iter().map(total_of).sum();
        entries.push(BarEntry::new(ALL_BRANCH, all));
    }
    entries.extend(
        display_branches
            .iter()
            .map(|branch| BarEntry::new(branch.clone(), total_of(branch))),
    );
    entries
}
