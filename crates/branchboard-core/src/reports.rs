//! Report shapes returned by the period report endpoints
//!
//! Each endpoint returns a different structure. They are modelled as one
//! tagged union so consumers dispatch on the shape instead of probing for
//! optional keys.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::{breakdown, parse_calendar_date, Breakdown, ReportTotals};
use crate::products::ProductReport;
use crate::time::{day_label, short_date, week_label};

/// One day of one branch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub branch_id: i64,
    pub date: String,
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
    pub sales_by_product: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub quantities_by_product: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub expenses_by_category: Breakdown,
    #[serde(default)]
    pub product_reports: Vec<ProductReport>,
}

/// One week of one branch, optionally restricted to a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub branch_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub week_start: String,
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste: Option<f64>,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_category: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_product: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub expenses_by_category: Breakdown,
    #[serde(default)]
    pub daily_reports: Vec<DailyReport>,
    #[serde(default)]
    pub product_reports: Vec<ProductReport>,
}

/// One month of one branch across all categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub branch_id: i64,
    pub year_month: String,
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_category: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub expenses_by_category: Breakdown,
    #[serde(default)]
    pub weekly_reports: Vec<WeeklyReport>,
    #[serde(default)]
    pub product_reports: Vec<ProductReport>,
}

/// One month of one branch for a single category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCategoryReport {
    pub branch_id: i64,
    pub category_id: i64,
    pub year_month: String,
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste: Option<f64>,
    #[serde(default, deserialize_with = "breakdown")]
    pub sales_by_product: Breakdown,
    #[serde(default, deserialize_with = "breakdown")]
    pub quantities_by_product: Breakdown,
    #[serde(default)]
    pub weekly_reports: Vec<WeeklyReport>,
    #[serde(default)]
    pub product_reports: Vec<ProductReport>,
}

/// The report shapes a period query can return
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "report", rename_all = "snake_case")]
pub enum ReportShape {
    Daily(DailyReport),
    Weekly(WeeklyReport),
    Monthly(MonthlyReport),
    MonthlyByCategory(MonthlyCategoryReport),
}

/// One sub-period row of a report's inner-frequency breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBreakdown {
    pub label: String,
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
}

/// A titled name/value list taken from one of a report's breakdown maps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSection {
    pub title: &'static str,
    /// Sorted by name
    pub items: Vec<(String, f64)>,
}

impl BreakdownSection {
    fn new(title: &'static str, map: &Breakdown) -> Self {
        let mut items: Vec<(String, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Self { title, items }
    }
}

const SALES_BY_CATEGORY: &str = "Ventas por Categoría";
const EXPENSES_BY_CATEGORY: &str = "Gastos por Categoría";
const SALES_BY_PRODUCT: &str = "Ventas por Producto";
const QUANTITIES_BY_PRODUCT: &str = "Cantidad Vendida por Producto";

/// Poultry and egg figures; `None` when the API did not send them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DetailFigures {
    pub gut: Option<f64>,
    pub waste: Option<f64>,
    pub slaughtered_chicken: Option<f64>,
    pub egg_cartons_quantity: Option<f64>,
    pub eggs_sales: Option<f64>,
}

impl DetailFigures {
    /// Labelled figures in dashboard column order
    pub fn labelled(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("Tripa", self.gut),
            ("Merma", self.waste),
            ("Matados", self.slaughtered_chicken),
            ("Casilleros", self.egg_cartons_quantity),
            ("Venta de Huevo", self.eggs_sales),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.labelled().iter().all(|(_, v)| v.is_none())
    }
}

impl PeriodBreakdown {
    fn from_totals(label: String, totals: &ReportTotals) -> Self {
        Self {
            label,
            sales: totals.total_sales,
            expenses: totals.total_expenses,
            profit: totals.total_profit,
        }
    }
}

impl ReportShape {
    pub fn totals(&self) -> &ReportTotals {
        match self {
            ReportShape::Daily(r) => &r.totals,
            ReportShape::Weekly(r) => &r.totals,
            ReportShape::Monthly(r) => &r.totals,
            ReportShape::MonthlyByCategory(r) => &r.totals,
        }
    }

    pub fn branch_id(&self) -> i64 {
        match self {
            ReportShape::Daily(r) => r.branch_id,
            ReportShape::Weekly(r) => r.branch_id,
            ReportShape::Monthly(r) => r.branch_id,
            ReportShape::MonthlyByCategory(r) => r.branch_id,
        }
    }

    /// The period the report covers, as sent by the API
    pub fn period(&self) -> &str {
        match self {
            ReportShape::Daily(r) => &r.date,
            ReportShape::Weekly(r) => &r.week_start,
            ReportShape::Monthly(r) => &r.year_month,
            ReportShape::MonthlyByCategory(r) => &r.year_month,
        }
    }

    /// Per-product figures, when the endpoint includes them
    pub fn product_reports(&self) -> &[ProductReport] {
        match self {
            ReportShape::Daily(r) => &r.product_reports,
            ReportShape::Weekly(r) => &r.product_reports,
            ReportShape::Monthly(r) => &r.product_reports,
            ReportShape::MonthlyByCategory(r) => &r.product_reports,
        }
    }

    /// The breakdown maps this shape carries
    pub fn sections(&self) -> Vec<BreakdownSection> {
        match self {
            ReportShape::Daily(r) => vec![
                BreakdownSection::new(SALES_BY_CATEGORY, &r.sales_by_category),
                BreakdownSection::new(EXPENSES_BY_CATEGORY, &r.expenses_by_category),
                BreakdownSection::new(SALES_BY_PRODUCT, &r.sales_by_product),
                BreakdownSection::new(QUANTITIES_BY_PRODUCT, &r.quantities_by_product),
            ],
            ReportShape::Weekly(r) => vec![
                BreakdownSection::new(SALES_BY_CATEGORY, &r.sales_by_category),
                BreakdownSection::new(EXPENSES_BY_CATEGORY, &r.expenses_by_category),
                BreakdownSection::new(SALES_BY_PRODUCT, &r.sales_by_product),
            ],
            ReportShape::Monthly(r) => vec![
                BreakdownSection::new(SALES_BY_CATEGORY, &r.sales_by_category),
                BreakdownSection::new(EXPENSES_BY_CATEGORY, &r.expenses_by_category),
            ],
            ReportShape::MonthlyByCategory(r) => vec![
                BreakdownSection::new(SALES_BY_PRODUCT, &r.sales_by_product),
                BreakdownSection::new(QUANTITIES_BY_PRODUCT, &r.quantities_by_product),
            ],
        }
    }

    pub fn details(&self) -> DetailFigures {
        match self {
            ReportShape::Daily(r) => DetailFigures {
                gut: r.gut,
                waste: r.waste,
                slaughtered_chicken: r.slaughtered_chicken,
                egg_cartons_quantity: r.egg_cartons_quantity,
                eggs_sales: r.eggs_sales,
            },
            ReportShape::Weekly(r) => DetailFigures {
                gut: r.gut,
                waste: r.waste,
                ..Default::default()
            },
            ReportShape::MonthlyByCategory(r) => DetailFigures {
                gut: r.gut,
                waste: r.waste,
                ..Default::default()
            },
            ReportShape::Monthly(_) => DetailFigures::default(),
        }
    }

    /// Inner-frequency rows: days of a week, weeks of a month.
    /// A daily report has no sub-periods.
    pub fn breakdown(&self) -> Vec<PeriodBreakdown> {
        match self {
            ReportShape::Daily(_) => Vec::new(),
            ReportShape::Weekly(r) => r
                .daily_reports
                .iter()
                .map(|day| {
                    let label = parse_calendar_date(&day.date)
                        .map(day_label)
                        .unwrap_or_else(|| day.date.clone());
                    PeriodBreakdown::from_totals(label, &day.totals)
                })
                .collect(),
            ReportShape::Monthly(MonthlyReport { weekly_reports, .. })
            | ReportShape::MonthlyByCategory(MonthlyCategoryReport { weekly_reports, .. }) => {
                weekly_reports
                    .iter()
                    .enumerate()
                    .map(|(idx, week)| {
                        PeriodBreakdown::from_totals(weekly_label(idx, week), &week.totals)
                    })
                    .collect()
            }
        }
    }
}

/// `"Semana N (d/m/yyyy - d/m/yyyy)"`, numbered in report order
fn weekly_label(idx: usize, week: &WeeklyReport) -> String {
    let number = week_label(idx as u32 + 1);
    match parse_calendar_date(&week.week_start) {
        Some(start) => format!(
            "{} ({} - {})",
            number,
            short_date(start),
            short_date(start + Duration::days(6))
        ),
        None => number,
    }
}
