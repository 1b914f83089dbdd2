//! Branchboard main entry point

use anyhow::{bail, Context};
use branchboard_client::ReportClient;
use branchboard_config::{Config, Frequency, Metric};
use branchboard_core::{
    month_weeks, product_table, series_names, ComparisonFilter, ComparisonView, DateRange,
    PivotRow, ProductQuery, RefreshOutcome, ReportShape, SortField, SortOrder, ViewMode,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "branchboard")]
#[command(version = "0.1.0")]
#[command(about = "Branch reporting dashboard: comparison pivots and report breakdowns", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare branches over a date range
    Compare {
        /// Comma-separated branch ids
        #[arg(long, value_delimiter = ',', required = true)]
        branches: Vec<i64>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// hourly, daily, weekly, monthly or yearly
        #[arg(long)]
        frequency: Option<Frequency>,
        /// sales or quantity
        #[arg(long)]
        metric: Option<Metric>,
        /// Comma-separated category ids
        #[arg(long, value_delimiter = ',')]
        categories: Vec<i64>,
        /// One point per calendar date instead of folding periods
        #[arg(long)]
        continuous: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print a branch report with its sub-period breakdown
    Report {
        #[arg(long)]
        branch: i64,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        category: Option<i64>,
        /// 1-based week of the month, as listed by `weeks`
        #[arg(long, conflicts_with = "day")]
        week: Option<usize>,
        /// A single day of the month
        #[arg(long)]
        day: Option<NaiveDate>,
        /// Filter the product table by name
        #[arg(long, default_value = "")]
        search: String,
        /// Sort the product table: name, category, quantity-sold or total-sales
        #[arg(long, value_enum)]
        sort: Option<ProductSort>,
        /// Ascending order for `--sort`
        #[arg(long, requires = "sort")]
        asc: bool,
    },
    /// List branches and categories known to the API
    Directory,
    /// List the week ranges of a month
    Weeks {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Print a default configuration file
    InitConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProductSort {
    Name,
    Category,
    QuantitySold,
    TotalSales,
}

impl From<ProductSort> for SortField {
    fn from(sort: ProductSort) -> Self {
        match sort {
            ProductSort::Name => SortField::Name,
            ProductSort::Category => SortField::Category,
            ProductSort::QuantitySold => SortField::QuantitySold,
            ProductSort::TotalSales => SortField::TotalSales,
        }
    }
}

/// The period a `report` invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportPeriod {
    Month,
    Week(NaiveDate),
    Day(NaiveDate),
}

fn report_period(
    year: i32,
    month: u32,
    week: Option<usize>,
    day: Option<NaiveDate>,
) -> anyhow::Result<ReportPeriod> {
    let Some(range) = DateRange::month(year, month) else {
        bail!("Invalid month {}-{:02}", year, month);
    };
    if let Some(idx) = week {
        let weeks = month_weeks(year, month);
        let Some(selected) = idx.checked_sub(1).and_then(|i| weeks.get(i)) else {
            bail!("Week {} is not in {}-{:02} ({} weeks)", idx, year, month, weeks.len());
        };
        return Ok(ReportPeriod::Week(selected.start));
    }
    if let Some(date) = day {
        if !range.contains(&date) {
            bail!("{} is outside {}", date, range.description());
        }
        return Ok(ReportPeriod::Day(date));
    }
    Ok(ReportPeriod::Month)
}

/// Product table controls from the `report` flags; an explicit sort is
/// descending unless `asc` is set
fn product_query(search: String, sort: Option<ProductSort>, asc: bool) -> ProductQuery {
    let mut query = ProductQuery {
        search,
        ..Default::default()
    };
    if let Some(sort) = sort {
        query.sort_field = sort.into();
        query.order = if asc { SortOrder::Asc } else { SortOrder::Desc };
    }
    query
}

fn load_config(path: PathBuf) -> anyhow::Result<(Config, Option<String>)> {
    match Config::load(path) {
        Ok(config) => Ok((config, None)),
        Err(e) if e.is_recoverable() => Ok((Config::default(), Some(e.to_string()))),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, fallback) = load_config(args.config.clone())?;
    init_logging(&config.logging.level);
    if let Some(reason) = fallback {
        warn!("{}; using default configuration", reason);
    }

    let rt = Runtime::new()?;
    rt.block_on(run(config, args.command))
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Compare {
            branches,
            start,
            end,
            frequency,
            metric,
            categories,
            continuous,
            format,
        } => {
            let mut filter = ComparisonFilter::from_config(&config.comparison);
            filter.branches = branches;
            filter.categories = categories;
            filter.range = DateRange::new(start, end);
            if let Some(frequency) = frequency {
                filter.frequency = frequency;
            }
            if let Some(metric) = metric {
                filter.metric = metric;
            }
            if continuous {
                filter.mode = ViewMode::Continuous;
            }
            compare(&config, filter, format).await
        }
        Command::Report {
            branch,
            year,
            month,
            category,
            week,
            day,
            search,
            sort,
            asc,
        } => {
            let period = report_period(year, month, week, day)?;
            let client = ReportClient::new(&config)?;
            let report = match (period, category) {
                (ReportPeriod::Week(start), Some(c)) => {
                    client.weekly_category_report(branch, c, start).await?
                }
                (ReportPeriod::Week(start), None) => client.weekly_report(branch, start).await?,
                (ReportPeriod::Day(date), category) => {
                    if category.is_some() {
                        warn!("Daily reports are not split by category; ignoring --category");
                    }
                    client.daily_report(branch, date).await?
                }
                (ReportPeriod::Month, Some(c)) => {
                    client.monthly_category_report(branch, c, year, month).await?
                }
                (ReportPeriod::Month, None) => client.monthly_report(branch, year, month).await?,
            };
            print!("{}", render_report(&report, &product_query(search, sort, asc)));
            Ok(())
        }
        Command::Directory => {
            let client = Arc::new(ReportClient::new(&config)?);
            let view = ComparisonView::new(client.clone(), config.labels.clone());
            view.initialize(client.as_ref()).await;
            let directory = view.directory().await;

            println!("Sucursales");
            for branch in directory.branches() {
                println!("  {:>4}  {}", branch.id, branch.name);
            }
            println!("Categorías");
            for category in directory.categories() {
                println!("  {:>4}  {}", category.id, category.name);
            }
            Ok(())
        }
        Command::Weeks { year, month } => {
            let weeks = month_weeks(year, month);
            if weeks.is_empty() {
                bail!("No weeks for {}-{:02}", year, month);
            }
            for (idx, week) in weeks.iter().enumerate() {
                println!("{:>2}  {}", idx + 1, week.label);
            }
            Ok(())
        }
        Command::InitConfig => {
            print!("{}", Config::generate_default());
            Ok(())
        }
    }
}

async fn compare(config: &Config, filter: ComparisonFilter, format: OutputFormat) -> anyhow::Result<()> {
    let client = Arc::new(ReportClient::new(config)?);
    let view = ComparisonView::new(client.clone(), config.labels.clone());
    view.initialize(client.as_ref()).await;

    info!(
        "Comparing branches {:?} over {} ({}, {}, {})",
        filter.branches,
        filter.range.description(),
        filter.frequency,
        filter.metric,
        filter.mode
    );

    match view.refresh(filter).await.context("Comparison failed")? {
        RefreshOutcome::Applied { .. } => {}
        RefreshOutcome::Discarded { generation, latest } => {
            bail!("Refresh {} was superseded by {}", generation, latest)
        }
    }

    let snapshot = view.snapshot().await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot.rows)?),
        OutputFormat::Table => print_table(&snapshot.rows, &snapshot.series),
    }
    Ok(())
}

fn print_table(rows: &[PivotRow], series: &[String]) {
    if rows.is_empty() {
        println!("(no data)");
        return;
    }
    let series = if series.is_empty() {
        series_names(rows)
    } else {
        series.to_vec()
    };

    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0).max(5);
    let widths: Vec<usize> = series.iter().map(|s| s.chars().count().max(10)).collect();

    let mut header = format!("{:<label_width$}", "Fecha");
    for (name, width) in series.iter().zip(&widths) {
        header.push_str(&format!("  {:>width$}", name));
    }
    println!("{}", header);

    for row in rows {
        let mut line = format!("{:<label_width$}", row.label);
        for (name, width) in series.iter().zip(&widths) {
            let cell = row.value(name).map(|v| format!("{:.2}", v)).unwrap_or_default();
            line.push_str(&format!("  {:>width$}", cell));
        }
        println!("{}", line);
    }
}

fn render_report(report: &ReportShape, products: &ProductQuery) -> String {
    let mut out = String::new();
    let totals = report.totals();
    let _ = writeln!(out, "Sucursal {}  {}", report.branch_id(), report.period());
    let _ = writeln!(out, "  Ventas:    {:>12.2}", totals.total_sales);
    let _ = writeln!(out, "  Gastos:    {:>12.2}", totals.total_expenses);
    let _ = writeln!(out, "  Utilidad:  {:>12.2}", totals.total_profit);
    let _ = writeln!(out, "  Vendido:   {:>12.2}", totals.total_sold);
    let _ = writeln!(out, "  Comprado:  {:>12.2}", totals.total_bought);

    let details = report.details();
    if !details.is_empty() {
        for (label, value) in details.labelled() {
            let cell = value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  {:<15} {:>9}", format!("{}:", label), cell);
        }
    }

    let breakdown = report.breakdown();
    if !breakdown.is_empty() {
        let _ = writeln!(out);
        for period in breakdown {
            let _ = writeln!(
                out,
                "  {:<36} {:>12.2} {:>12.2} {:>12.2}",
                period.label, period.sales, period.expenses, period.profit
            );
        }
    }

    for section in report.sections().into_iter().filter(|s| !s.items.is_empty()) {
        let _ = writeln!(out, "\n{}", section.title);
        for (name, value) in section.items {
            let _ = writeln!(out, "  {:<36} {:>12.2}", name, value);
        }
    }

    if !report.product_reports().is_empty() {
        let table = product_table(report.product_reports(), products);
        let _ = writeln!(out, "\nProductos");
        for row in &table.rows {
            let _ = writeln!(
                out,
                "  {:<28} {:<16} {:>10.2} {:>12.2}",
                row.product.name, row.product.category.name, row.quantity_sold, row.total_sales
            );
        }
        let _ = writeln!(
            out,
            "  {:<28} {:<16} {:>10.2} {:>12.2}",
            "Total", "", table.total_quantity, table.total_sales
        );
    }

    out
}
