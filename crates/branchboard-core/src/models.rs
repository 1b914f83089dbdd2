//! Core data models returned by the reporting API

use branchboard_config::{Frequency, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Branch directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub name: String,
}

/// Category directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Name-keyed totals, e.g. sales per category
pub type Breakdown = HashMap<String, f64>;

/// The API sends breakdowns either as one object or as a list of
/// single-key objects. Both collapse into one map; repeated keys add up.
pub(crate) fn breakdown<'de, D>(deserializer: D) -> Result<Breakdown, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Map(HashMap<String, f64>),
        List(Vec<HashMap<String, f64>>),
    }

    let mut merged = Breakdown::new();
    match Option::<Repr>::deserialize(deserializer)? {
        None => {}
        Some(Repr::Map(map)) => merged = map,
        Some(Repr::List(list)) => {
            for part in list {
                for (key, value) in part {
                    *merged.entry(key).or_insert(0.0) += value;
                }
            }
        }
    }
    Ok(merged)
}

/// Parse the calendar date of an API timestamp.
///
/// Only the `YYYY-MM-DD` prefix is read, so `2024-07-01T23:00:00-06:00`
/// is July 1st regardless of offset.
pub fn parse_calendar_date(timestamp: &str) -> Option<NaiveDate> {
    let date_part = timestamp.split(|c| c == 'T' || c == ' ').next()?;
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()
}

/// Headline totals shared by every report shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default, alias = "profit")]
    pub total_profit: f64,
    #[serde(default)]
    pub total_sold: f64,
    #[serde(default)]
    pub total_bought: f64,
}

/// One branch's aggregated figures for one time bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    #[serde(default)]
    pub branch_id: i64,
    /// Bucket start, ISO date-time
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slaughtered_chicken: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egg_cartons_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eggs_sales: Option<f64>,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_category: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub quantities_by_category: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub expenses_by_category: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_product: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub quantities_by_product: Breakdown,
}

impl ReportEntry {
    /// Stamp the entry with the branch and frequency it was requested for.
    /// An explicit frequency from the API is kept.
    pub fn tagged(mut self, branch_id: i64, frequency: Frequency) -> Self {
        self.branch_id = branch_id;
        self.frequency.get_or_insert(frequency);
        self
    }

    /// Calendar date of the bucket start
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.start_date)
    }

    /// The metric's bare total for this bucket
    pub fn metric_total(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sales => self.totals.total_sales,
            Metric::Quantity => self.totals.total_sold,
        }
    }

    /// The metric's value for one category name; zero when absent
    pub fn category_value(&self, metric: Metric, category: &str) -> f64 {
        let breakdown = match metric {
            Metric::Sales => &self.sales_by_category,
            Metric::Quantity => &self.quantities_by_category,
        };
        breakdown.get(category).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(parse_calendar_date("2024-07-01T00:00:00Z"), Some(date));
        assert_eq!(parse_calendar_date("2024-07-01T23:30:00-06:00"), Some(date));
        assert_eq!(parse_calendar_date("2024-07-01 08:00:00"), Some(date));
        assert_eq!(parse_calendar_date("2024-07-01"), Some(date));
        assert_eq!(parse_calendar_date("July 1st"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn test_entry_from_api_json() {
        let json = r#"{
            "branchId": 3,
            "startDate": "2024-07-08T00:00:00Z",
            "frequency": "weekly",
            "totalSales": 150.5,
            "totalExpenses": 40.0,
            "profit": 110.5,
            "totalSold": 12,
            "totalBought": 9,
            "slaughteredChicken": 30,
            "salesByCategory": [{"Produce": 40}, {"Dairy": 10}, {"Produce": 5}],
            "quantitiesByCategory": {"Produce": 4}
        }"#;
        let entry: ReportEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.branch_id, 3);
        assert_eq!(entry.frequency, Some(Frequency::Weekly));
        assert_eq!(entry.totals.total_profit, 110.5);
        assert_eq!(entry.slaughtered_chicken, Some(30.0));
        assert_eq!(entry.sales_by_category.get("Produce"), Some(&45.0));
        assert_eq!(entry.quantities_by_category.get("Produce"), Some(&4.0));
        assert!(entry.sales_by_product.is_empty());
        assert_eq!(entry.waste, None);
    }

    #[test]
    fn test_null_breakdown_is_empty() {
        let json = r#"{"startDate": "2024-07-08", "salesByCategory": null}"#;
        let entry: ReportEntry = serde_json::from_str(json).unwrap();
        assert!(entry.sales_by_category.is_empty());
        assert_eq!(entry.totals, ReportTotals::default());
    }

    #[test]
    fn test_metric_selection() {
        let mut entry = ReportEntry {
            start_date: "2024-07-01".to_string(),
            totals: ReportTotals {
                total_sales: 100.0,
                total_sold: 7.0,
                ..Default::default()
            },
            ..Default::default()
        };
        entry.sales_by_category.insert("Produce".to_string(), 40.0);
        entry.quantities_by_category.insert("Produce".to_string(), 3.0);

        assert_eq!(entry.metric_total(Metric::Sales), 100.0);
        assert_eq!(entry.metric_total(Metric::Quantity), 7.0);
        assert_eq!(entry.category_value(Metric::Sales, "Produce"), 40.0);
        assert_eq!(entry.category_value(Metric::Quantity, "Produce"), 3.0);
        assert_eq!(entry.category_value(Metric::Sales, "Dairy"), 0.0);
    }

    #[test]
    fn test_tagged_keeps_explicit_frequency() {
        let entry = ReportEntry {
            start_date: "2024-07-01".to_string(),
            frequency: Some(Frequency::Daily),
            ..Default::default()
        };
        let tagged = entry.tagged(9, Frequency::Weekly);
        assert_eq!(tagged.branch_id, 9);
        assert_eq!(tagged.frequency, Some(Frequency::Daily));

        let untagged = ReportEntry::default().tagged(2, Frequency::Monthly);
        assert_eq!(untagged.frequency, Some(Frequency::Monthly));
    }
}
