// Pivot builder - Branch × month matrix with row, column and grand totals
use crate::domain::record::Record;
use crate::domain::views::{PivotCell, PivotRow, PivotTable};
use std::collections::{BTreeMap, HashMap};

pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

/// Build the table view.
///
/// Rows are `required_branches` in order, then any other branch seen in
/// `records` in first-seen order. Records for the same (branch, month)
/// accumulate; records outside `months` contribute to no cell.
pub fn build_pivot(
    records: &[Record],
    months: &[String],
    required_branches: &[String],
) -> PivotTable {
    let mut order: Vec<String> = required_branches.to_vec();
    let mut cells: HashMap<String, BTreeMap<String, PivotCell>> = order
        .iter()
        .map(|branch| (branch.clone(), empty_cells(months)))
        .collect();

    for record in records {
        if !cells.contains_key(&record.branch) {
            order.push(record.branch.clone());
            cells.insert(record.branch.clone(), empty_cells(months));
        }

        let Some(month) = record.month.as_deref() else {
            continue;
        };
        if let Some(row) = cells.get_mut(&record.branch) {
            if let Some(cell) = row.get_mut(month) {
                cell.accumulate(record.metric_value);
            }
        }
    }

    let rows: Vec<PivotRow> = order
        .into_iter()
        .map(|branch| {
            let months = cells.remove(&branch).unwrap_or_default();
            let total: f64 = months.values().map(PivotCell::contribution).sum();
            PivotRow {
                branch,
                months,
                total,
            }
        })
        .collect();

    let grand_total = grand_total_row(&rows, months);

    PivotTable {
        months: months.to_vec(),
        rows,
        grand_total,
    }
}

fn empty_cells(months: &[String]) -> BTreeMap<String, PivotCell> {
    months
        .iter()
        .map(|m| (m.clone(), PivotCell::NoData))
        .collect()
}

fn grand_total_row(rows: &[PivotRow], months: &[String]) -> PivotRow {
    let mut totals = empty_cells(months);
    for row in rows {
        for (month, cell) in &row.months {
            if let (Some(value), Some(total)) = (cell.value(), totals.get_mut(month)) {
                total.accumulate(value);
            }
        }
    }

    PivotRow {
        branch: GRAND_TOTAL_LABEL.to_string(),
        total: rows.iter().map(|r| r.total).sum(),
        months: totals,
    }
}
