//! Per-product report table: search, category filter, sorting and totals

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Category,
}

/// Figures of one product over the report period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    pub product: Product,
    #[serde(default)]
    pub quantity_sold: f64,
    #[serde(default)]
    pub total_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Category,
    QuantitySold,
    TotalSales,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Table controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name
    pub search: String,
    /// Category ids to keep; empty keeps all
    pub categories: Vec<i64>,
    pub sort_field: SortField,
    pub order: SortOrder,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            categories: Vec::new(),
            sort_field: SortField::TotalSales,
            order: SortOrder::Desc,
        }
    }
}

impl ProductQuery {
    /// Clicking the current column flips the order; another column sorts
    /// ascending by it.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.order = match self.order {
                SortOrder::Asc => SortOrder::Desc,
                SortOrder::Desc => SortOrder::Asc,
            };
        } else {
            self.sort_field = field;
            self.order = SortOrder::Asc;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTable {
    pub rows: Vec<ProductReport>,
    pub total_quantity: f64,
    pub total_sales: f64,
    /// Categories present in the unfiltered input, first-seen order
    pub categories: Vec<Category>,
}

fn compare(a: &ProductReport, b: &ProductReport, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.product.name.to_lowercase().cmp(&b.product.name.to_lowercase()),
        SortField::Category => a
            .product
            .category
            .name
            .to_lowercase()
            .cmp(&b.product.category.name.to_lowercase()),
        SortField::QuantitySold => a.quantity_sold.total_cmp(&b.quantity_sold),
        SortField::TotalSales => a.total_sales.total_cmp(&b.total_sales),
    }
}

pub fn product_table(reports: &[ProductReport], query: &ProductQuery) -> ProductTable {
    let mut categories: Vec<Category> = Vec::new();
    for report in reports {
        if !categories.iter().any(|c| c.id == report.product.category.id) {
            categories.push(report.product.category.clone());
        }
    }

    let search = query.search.to_lowercase();
    let mut rows: Vec<ProductReport> = reports
        .iter()
        .filter(|r| r.product.name.to_lowercase().contains(&search))
        .filter(|r| query.categories.is_empty() || query.categories.contains(&r.product.category.id))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort_field);
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    ProductTable {
        total_quantity: rows.iter().map(|r| r.quantity_sold).sum(),
        total_sales: rows.iter().map(|r| r.total_sales).sum(),
        rows,
        categories,
    }
}
