//! HTTP client for the branch reporting API
//!
//! Implements the core fetch seams ([`ReportFetcher`], [`DirectorySource`])
//! on top of `reqwest` and exposes the period report endpoints, each
//! wrapped in the [`ReportShape`] it returns.

pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;

use branchboard_config::{Config, Frequency};
use branchboard_core::{
    Branch, Category, CoreResult, DailyReport, DirectorySource, MonthlyCategoryReport,
    MonthlyReport, ReportEntry, ReportFetcher, ReportShape, WeeklyReport,
};

pub use error::{ClientError, ClientResult};

/// Report endpoints under the API base
pub mod endpoints {
    pub const BRANCHES: &str = "/api/branches";
    pub const CATEGORIES: &str = "/api/categories";
    pub const COMPARISON: &str = "/api/reports/comparison";
    pub const MONTHLY: &str = "/api/reports/monthly";
    pub const MONTHLY_CATEGORY: &str = "/api/reports/monthly-category";
    pub const WEEKLY: &str = "/api/reports/weekly";
    pub const WEEKLY_CATEGORY: &str = "/api/reports/weekly-category";
    pub const DAILY: &str = "/api/reports/daily";
}

/// Query pairs in the wire format of the API
pub type Query = Vec<(&'static str, String)>;

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Query of one branch's comparison entries
pub fn comparison_query(
    branch_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
) -> Query {
    vec![
        ("branchId", branch_id.to_string()),
        ("startDate", iso(start)),
        ("endDate", iso(end)),
        ("frequency", frequency.to_string()),
    ]
}

/// Query of a month report, optionally restricted to one category
pub fn monthly_query(branch_id: i64, category_id: Option<i64>, year: i32, month: u32) -> Query {
    let mut query = vec![("branchId", branch_id.to_string())];
    if let Some(id) = category_id {
        query.push(("categoryId", id.to_string()));
    }
    query.push(("year", year.to_string()));
    query.push(("month", month.to_string()));
    query
}

/// Query of a week or day report anchored at `date`
pub fn dated_query(branch_id: i64, category_id: Option<i64>, date: NaiveDate) -> Query {
    let mut query = vec![("branchId", branch_id.to_string())];
    if let Some(id) = category_id {
        query.push(("categoryId", id.to_string()));
    }
    query.push(("date", iso(date)));
    query
}

pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReportClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &Query) -> ClientResult<T> {
        let url = self.endpoint(path);
        log::debug!("GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("{} returned {}", url, status);
            return Err(ClientError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            url,
            message: e.to_string(),
        })
    }

    pub async fn monthly_report(&self, branch_id: i64, year: i32, month: u32) -> CoreResult<ReportShape> {
        let report: MonthlyReport = self
            .get_json(endpoints::MONTHLY, &monthly_query(branch_id, None, year, month))
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(ReportShape::Monthly(report))
    }

    pub async fn monthly_category_report(
        &self,
        branch_id: i64,
        category_id: i64,
        year: i32,
        month: u32,
    ) -> CoreResult<ReportShape> {
        let query = monthly_query(branch_id, Some(category_id), year, month);
        let report: MonthlyCategoryReport = self
            .get_json(endpoints::MONTHLY_CATEGORY, &query)
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(ReportShape::MonthlyByCategory(report))
    }

    pub async fn weekly_report(&self, branch_id: i64, date: NaiveDate) -> CoreResult<ReportShape> {
        let report: WeeklyReport = self
            .get_json(endpoints::WEEKLY, &dated_query(branch_id, None, date))
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(ReportShape::Weekly(report))
    }

    pub async fn weekly_category_report(
        &self,
        branch_id: i64,
        category_id: i64,
        date: NaiveDate,
    ) -> CoreResult<ReportShape> {
        let report: WeeklyReport = self
            .get_json(endpoints::WEEKLY_CATEGORY, &dated_query(branch_id, Some(category_id), date))
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(ReportShape::Weekly(report))
    }

    pub async fn daily_report(&self, branch_id: i64, date: NaiveDate) -> CoreResult<ReportShape> {
        let report: DailyReport = self
            .get_json(endpoints::DAILY, &dated_query(branch_id, None, date))
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(ReportShape::Daily(report))
    }
}

#[async_trait]
impl ReportFetcher for ReportClient {
    async fn fetch_branch(
        &self,
        branch_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> CoreResult<Vec<ReportEntry>> {
        let query = comparison_query(branch_id, start, end, frequency);
        let entries: Vec<ReportEntry> = self
            .get_json(endpoints::COMPARISON, &query)
            .await
            .map_err(|e| e.for_branch(Some(branch_id)))?;
        Ok(entries)
    }
}

#[async_trait]
impl DirectorySource for ReportClient {
    async fn branches(&self) -> CoreResult<Vec<Branch>> {
        Ok(self.get_json(endpoints::BRANCHES, &Vec::new()).await?)
    }

    async fn categories(&self) -> CoreResult<Vec<Category>> {
        Ok(self.get_json(endpoints::CATEGORIES, &Vec::new()).await?)
    }
}
