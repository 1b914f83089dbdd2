//! Comparison pivot: flat report entries to chart rows
//!
//! Both modes group entries into one [`PivotRow`] per distinct axis label.
//! A row only carries the series that had at least one contributing entry;
//! absent series mean "no data", not zero. Values landing on the same row
//! and series are summed.

use branchboard_config::{Frequency, Metric};
use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

use crate::directory::Directory;
use crate::models::ReportEntry;
use crate::time::{
    approx_week_of_year, month_abbreviation, parse_week_label, week_label, week_of_month,
    weekday_index, weekday_name,
};
use crate::types::ViewMode;

/// One point on the chart's time axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotRow {
    /// Axis label: a date, weekday name, `"Semana N"` label
    pub label: String,
    /// Series name to value
    pub values: BTreeMap<String, f64>,
}

impl PivotRow {
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied()
    }
}

/// Serialized flat, the way chart libraries expect records:
/// `{"date": "<label>", "<series>": value, ...}`
impl Serialize for PivotRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.label)?;
        for (series, value) in &self.values {
            map.serialize_entry(series, value)?;
        }
        map.end()
    }
}

/// Parameters shared by both pivot modes
#[derive(Debug, Clone, Copy)]
pub struct PivotSettings<'a> {
    pub metric: Metric,
    /// Selected category ids; empty means branch totals
    pub categories: &'a [i64],
    /// Requested (outer) frequency
    pub frequency: Frequency,
}

/// Insertion-ordered row grouping
#[derive(Default)]
struct RowAccumulator {
    rows: Vec<PivotRow>,
    index: HashMap<String, usize>,
}

impl RowAccumulator {
    fn add(&mut self, label: &str, series: String, value: f64) {
        let pos = match self.index.get(label) {
            Some(&pos) => pos,
            None => {
                self.rows.push(PivotRow {
                    label: label.to_string(),
                    values: BTreeMap::new(),
                });
                self.index.insert(label.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        *self.rows[pos].values.entry(series).or_insert(0.0) += value;
    }

    fn into_rows(self) -> Vec<PivotRow> {
        self.rows
    }
}

fn calendar_date_or_skip(entry: &ReportEntry) -> Option<NaiveDate> {
    let date = entry.calendar_date();
    if date.is_none() {
        log::warn!(
            "Skipping entry of branch {} with unparseable start date '{}'",
            entry.branch_id,
            entry.start_date
        );
    }
    date
}

/// Names of the selected categories; repeated ids count once
fn category_names(directory: &Directory, categories: &[i64]) -> Vec<String> {
    let mut seen: Vec<i64> = Vec::with_capacity(categories.len());
    categories
        .iter()
        .filter(|&&id| {
            if seen.contains(&id) {
                false
            } else {
                seen.push(id);
                true
            }
        })
        .map(|&id| directory.category_name(id))
        .collect()
}

/// Pivot with the layout selected by `mode`
pub fn pivot(
    mode: ViewMode,
    entries: &[ReportEntry],
    directory: &Directory,
    settings: PivotSettings<'_>,
) -> Vec<PivotRow> {
    match mode {
        ViewMode::Continuous => pivot_continuous(entries, directory, settings),
        ViewMode::NonContinuous => pivot_non_continuous(entries, directory, settings),
    }
}

/// One row per calendar date, ascending.
///
/// Series are the branch name, or `"<branch> - <category>"` per selected
/// category when categories are selected.
pub fn pivot_continuous(
    entries: &[ReportEntry],
    directory: &Directory,
    settings: PivotSettings<'_>,
) -> Vec<PivotRow> {
    let categories = category_names(directory, settings.categories);
    let mut acc = RowAccumulator::default();

    for entry in entries {
        let Some(date) = calendar_date_or_skip(entry) else {
            continue;
        };
        let label = date.format("%Y-%m-%d").to_string();
        let branch = directory.branch_name(entry.branch_id);

        if categories.is_empty() {
            acc.add(&label, branch, entry.metric_total(settings.metric));
        } else {
            for category in &categories {
                acc.add(
                    &label,
                    format!("{} - {}", branch, category),
                    entry.category_value(settings.metric, category),
                );
            }
        }
    }

    let mut rows = acc.into_rows();
    // Labels are ISO dates, so lexical order is calendar order
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

/// Group key: which coarse bucket of which branch a fine entry belongs to
fn group_key(branch: &str, entry: &ReportEntry, date: NaiveDate, outer: Frequency) -> String {
    match outer {
        Frequency::Weekly => format!("{} - {}", branch, week_label(approx_week_of_year(date))),
        Frequency::Monthly => format!("{} - {}", branch, month_abbreviation(date)),
        Frequency::Yearly => format!("{} - {}", branch, date.year()),
        _ => format!("{} - {}", branch, entry.start_date),
    }
}

/// Point label: the entry's position on the shared axis
fn point_label(date: NaiveDate, outer: Frequency) -> String {
    match outer {
        Frequency::Monthly => week_label(week_of_month(date)),
        Frequency::Weekly => weekday_name(date).to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Each coarse bucket of each branch becomes a series over a shared axis.
///
/// `entries` are the fine-grained entries fetched at
/// `settings.frequency.finer()`. Weekly axes run Domingo..Sábado, monthly
/// axes run by week-of-month number; other frequencies keep first-seen order.
pub fn pivot_non_continuous(
    entries: &[ReportEntry],
    directory: &Directory,
    settings: PivotSettings<'_>,
) -> Vec<PivotRow> {
    let outer = settings.frequency;
    let categories = category_names(directory, settings.categories);
    let mut acc = RowAccumulator::default();

    for entry in entries {
        let Some(date) = calendar_date_or_skip(entry) else {
            continue;
        };
        let branch = directory.branch_name(entry.branch_id);
        let key = group_key(&branch, entry, date, outer);
        let label = point_label(date, outer);

        let value = if categories.is_empty() {
            entry.metric_total(settings.metric)
        } else {
            categories
                .iter()
                .map(|category| entry.category_value(settings.metric, category))
                .sum()
        };

        acc.add(&label, key, value);
    }

    let mut rows = acc.into_rows();
    match outer {
        Frequency::Weekly => {
            rows.sort_by_key(|row| weekday_index(&row.label).unwrap_or(usize::MAX));
        }
        Frequency::Monthly => {
            rows.sort_by_key(|row| parse_week_label(&row.label).unwrap_or(u32::MAX));
        }
        _ => {}
    }
    rows
}

/// Distinct series names in first-seen order, for chart legends
pub fn series_names(rows: &[PivotRow]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        for series in row.values.keys() {
            if !names.iter().any(|existing| existing == series) {
                names.push(series.clone());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::entry;
    use crate::models::{Branch, Category};
    use branchboard_config::LabelConfig;

    fn directory() -> Directory {
        Directory::new(LabelConfig::default()).with_entries(
            vec![
                Branch { id: 1, name: "BranchName".to_string() },
                Branch { id: 2, name: "Norte".to_string() },
            ],
            vec![
                Category { id: 10, name: "Produce".to_string() },
                Category { id: 11, name: "Dairy".to_string() },
            ],
        )
    }

    fn at(branch: i64, date: &str, sales: f64) -> ReportEntry {
        let mut e = entry(date, sales);
        e.branch_id = branch;
        e
    }

    fn settings(frequency: Frequency, categories: &[i64]) -> PivotSettings<'_> {
        PivotSettings {
            metric: Metric::Sales,
            categories,
            frequency,
        }
    }

    #[test]
    fn test_continuous_scenario() {
        let entries = vec![
            at(1, "2024-07-01T00:00:00Z", 100.0),
            at(1, "2024-07-08T00:00:00Z", 150.0),
        ];
        let rows = pivot_continuous(&entries, &directory(), settings(Frequency::Weekly, &[]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "2024-07-01");
        assert_eq!(rows[0].value("BranchName"), Some(100.0));
        assert_eq!(rows[1].label, "2024-07-08");
        assert_eq!(rows[1].value("BranchName"), Some(150.0));

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"date": "2024-07-01", "BranchName": 100.0},
                {"date": "2024-07-08", "BranchName": 150.0}
            ])
        );
    }

    #[test]
    fn test_continuous_sorted_and_distinct_dates() {
        let entries = vec![
            at(2, "2024-07-15T00:00:00Z", 3.0),
            at(1, "2024-07-01T00:00:00Z", 1.0),
            at(2, "2024-07-01T00:00:00Z", 2.0),
            at(1, "2024-07-08T06:00:00Z", 4.0),
        ];
        let rows = pivot_continuous(&entries, &directory(), settings(Frequency::Weekly, &[]));

        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-07-01", "2024-07-08", "2024-07-15"]);
        assert_eq!(rows[0].value("BranchName"), Some(1.0));
        assert_eq!(rows[0].value("Norte"), Some(2.0));
        // No zero-fill for series without data
        assert_eq!(rows[1].value("Norte"), None);
        assert_eq!(rows[2].value("BranchName"), None);
    }

    #[test]
    fn test_continuous_category_series() {
        let mut e = at(1, "2024-07-01T00:00:00Z", 50.0);
        e.sales_by_category.insert("Produce".to_string(), 40.0);
        e.sales_by_category.insert("Dairy".to_string(), 10.0);

        let rows = pivot_continuous(&[e], &directory(), settings(Frequency::Daily, &[10]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("BranchName - Produce"), Some(40.0));
        assert!(rows[0].values.keys().all(|k| !k.contains("Dairy")));
        assert_eq!(rows[0].value("BranchName"), None);
    }

    #[test]
    fn test_single_category_matches_total() {
        let mut e = at(1, "2024-07-01", 40.0);
        e.sales_by_category.insert("Produce".to_string(), 40.0);
        e.sales_by_category.insert("Dairy".to_string(), 0.0);
        let dir = directory();

        let total = pivot_continuous(&[e.clone()], &dir, settings(Frequency::Daily, &[]));
        let by_cat = pivot_continuous(&[e], &dir, settings(Frequency::Daily, &[10]));
        assert_eq!(total[0].value("BranchName"), by_cat[0].value("BranchName - Produce"));
    }

    #[test]
    fn test_missing_category_and_unknown_ids() {
        let e = at(9, "2024-07-01", 40.0);
        let rows = pivot_continuous(&[e], &directory(), settings(Frequency::Daily, &[10, 99]));
        assert_eq!(rows[0].value("Sucursal 9 - Produce"), Some(0.0));
        assert_eq!(rows[0].value("Sucursal 9 - Categoría 99"), Some(0.0));
    }

    #[test]
    fn test_quantity_metric() {
        let mut e = at(1, "2024-07-01", 40.0);
        e.totals.total_sold = 12.0;
        e.quantities_by_category.insert("Produce".to_string(), 5.0);
        let dir = directory();
        let quantity = |categories: &'static [i64]| PivotSettings {
            metric: Metric::Quantity,
            categories,
            frequency: Frequency::Daily,
        };

        let rows = pivot_continuous(&[e.clone()], &dir, quantity(&[]));
        assert_eq!(rows[0].value("BranchName"), Some(12.0));
        let rows = pivot_continuous(&[e], &dir, quantity(&[10]));
        assert_eq!(rows[0].value("BranchName - Produce"), Some(5.0));
    }

    #[test]
    fn test_hourly_buckets_sum_per_date() {
        let entries = vec![
            at(1, "2024-07-01T09:00:00Z", 10.0),
            at(1, "2024-07-01T10:00:00Z", 15.0),
        ];
        let rows = pivot_continuous(&entries, &directory(), settings(Frequency::Hourly, &[]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("BranchName"), Some(25.0));
    }

    #[test]
    fn test_unparseable_dates_are_skipped() {
        let entries = vec![at(1, "not-a-date", 10.0), at(1, "2024-07-01", 5.0)];
        let rows = pivot_continuous(&entries, &directory(), settings(Frequency::Daily, &[]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("BranchName"), Some(5.0));
    }

    #[test]
    fn test_pivot_is_idempotent() {
        let entries = vec![
            at(1, "2024-07-03", 1.0),
            at(2, "2024-07-01", 2.0),
            at(1, "2024-07-09", 3.0),
        ];
        let dir = directory();
        for mode in [ViewMode::Continuous, ViewMode::NonContinuous] {
            let first = pivot(mode, &entries, &dir, settings(Frequency::Weekly, &[]));
            let second = pivot(mode, &entries, &dir, settings(Frequency::Weekly, &[]));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_weekly_non_continuous_weekday_order() {
        // Daily entries for two weeks, deliberately shuffled.
        // 2024-07-07 is a Sunday.
        let entries = vec![
            at(1, "2024-07-13", 7.0),
            at(1, "2024-07-10", 4.0),
            at(1, "2024-07-07", 1.0),
            at(1, "2024-07-12", 6.0),
            at(1, "2024-07-08", 2.0),
            at(1, "2024-07-11", 5.0),
            at(1, "2024-07-09", 3.0),
            at(1, "2024-07-14", 10.0),
        ];
        let rows =
            pivot_non_continuous(&entries, &directory(), settings(Frequency::Weekly, &[]));

        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Domingo", "Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado"]
        );
        // Jan 1 2024 is a Monday: July 7 -> ceil((188 + 1 + 1) / 7) = 28
        assert_eq!(rows[0].value("BranchName - Semana 28"), Some(1.0));
        assert_eq!(rows[0].value("BranchName - Semana 29"), Some(10.0));
        assert_eq!(rows[6].value("BranchName - Semana 28"), Some(7.0));
        assert_eq!(rows[6].value("BranchName - Semana 29"), None);
    }

    #[test]
    fn test_monthly_non_continuous_numeric_week_order() {
        // Weekly entries of July and August 2024, out of order
        let entries = vec![
            at(1, "2024-07-28", 5.0),
            at(1, "2024-07-14", 3.0),
            at(1, "2024-08-04", 6.0),
            at(1, "2024-07-01", 1.0),
            at(1, "2024-07-07", 2.0),
        ];
        let rows =
            pivot_non_continuous(&entries, &directory(), settings(Frequency::Monthly, &[]));

        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Semana 1", "Semana 2", "Semana 3", "Semana 5"]);
        assert_eq!(rows[0].value("BranchName - jul"), Some(1.0));
        // Aug 1 2024 is a Thursday, so Aug 4 falls in week 2
        assert_eq!(rows[1].value("BranchName - jul"), Some(2.0));
        assert_eq!(rows[1].value("BranchName - ago"), Some(6.0));
    }

    #[test]
    fn test_week_labels_sort_numerically() {
        let rows = vec![
            PivotRow { label: "Semana 10".to_string(), values: BTreeMap::new() },
            PivotRow { label: "Semana 2".to_string(), values: BTreeMap::new() },
        ];
        let mut sorted = rows.clone();
        sorted.sort_by_key(|row| parse_week_label(&row.label).unwrap_or(u32::MAX));
        assert_eq!(sorted[0].label, "Semana 2");
        assert_eq!(sorted[1].label, "Semana 10");
    }

    #[test]
    fn test_yearly_non_continuous_groups_by_year() {
        let entries = vec![
            at(1, "2024-02-01", 20.0),
            at(1, "2023-01-01", 5.0),
            at(2, "2024-01-01", 7.0),
        ];
        let rows =
            pivot_non_continuous(&entries, &directory(), settings(Frequency::Yearly, &[]));

        // Insertion order, not re-sorted
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-02-01", "2023-01-01", "2024-01-01"]);
        assert_eq!(rows[0].value("BranchName - 2024"), Some(20.0));
        assert_eq!(rows[1].value("BranchName - 2023"), Some(5.0));
        assert_eq!(rows[2].value("Norte - 2024"), Some(7.0));
    }

    #[test]
    fn test_daily_non_continuous_uses_raw_date_key() {
        let entries = vec![at(1, "2024-07-01T00:00:00Z", 20.0)];
        let rows =
            pivot_non_continuous(&entries, &directory(), settings(Frequency::Daily, &[]));
        assert_eq!(rows[0].label, "2024-07-01");
        assert_eq!(rows[0].value("BranchName - 2024-07-01T00:00:00Z"), Some(20.0));
    }

    #[test]
    fn test_non_continuous_sums_selected_categories() {
        let mut e = at(1, "2024-07-08", 100.0);
        e.sales_by_category.insert("Produce".to_string(), 40.0);
        e.sales_by_category.insert("Dairy".to_string(), 10.0);
        let rows =
            pivot_non_continuous(&[e], &directory(), settings(Frequency::Weekly, &[10, 11, 12]));
        assert_eq!(rows[0].label, "Lunes");
        assert_eq!(rows[0].value("BranchName - Semana 28"), Some(50.0));
    }

    #[test]
    fn test_repeated_category_ids_count_once() {
        let mut e = at(1, "2024-07-08", 100.0);
        e.sales_by_category.insert("Produce".to_string(), 40.0);
        e.sales_by_category.insert("Dairy".to_string(), 10.0);
        let dir = directory();

        let rows = pivot_non_continuous(
            &[e.clone()],
            &dir,
            settings(Frequency::Weekly, &[10, 11, 10]),
        );
        assert_eq!(rows[0].value("BranchName - Semana 28"), Some(50.0));

        let rows = pivot_continuous(&[e], &dir, settings(Frequency::Daily, &[10, 10]));
        assert_eq!(rows[0].values.len(), 1);
        assert_eq!(rows[0].value("BranchName - Produce"), Some(40.0));
    }

    #[test]
    fn test_series_names_first_seen() {
        let entries = vec![at(2, "2024-07-01", 1.0), at(1, "2024-07-02", 1.0)];
        let rows = pivot_continuous(&entries, &directory(), settings(Frequency::Daily, &[]));
        assert_eq!(series_names(&rows), vec!["Norte".to_string(), "BranchName".to_string()]);
    }
}
