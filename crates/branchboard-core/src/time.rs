//! Calendar labeling for report axes
//!
//! All labels use the dashboard's es-MX vocabulary. Weeks start on Sunday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Weekday names, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

/// es-MX short month names, January first
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const WEEK_LABEL_PREFIX: &str = "Semana";

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Position of a weekday name in the Sunday-first week
pub fn weekday_index(name: &str) -> Option<usize> {
    WEEKDAY_NAMES.iter().position(|day| *day == name)
}

pub fn month_abbreviation(date: NaiveDate) -> &'static str {
    MONTH_ABBREVIATIONS[date.month0() as usize]
}

/// Week of the month, 1-indexed, with weeks starting on Sunday.
///
/// `ceil((day + weekday_of_first) / 7)`
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (date.day() + first_weekday + 6) / 7
}

/// Approximate week of the year used by comparison group keys.
///
/// `ceil((days_since_jan1 + weekday_of_jan1 + 1) / 7)`. This is not the
/// ISO-8601 week number; group labels depend on this exact value.
pub fn approx_week_of_year(date: NaiveDate) -> u32 {
    let jan1_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| jan1.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (date.ordinal0() + jan1_weekday + 1 + 6) / 7
}

/// `"Semana N"`
pub fn week_label(week: u32) -> String {
    format!("{} {}", WEEK_LABEL_PREFIX, week)
}

/// Extract N from a `"Semana N"` label
pub fn parse_week_label(label: &str) -> Option<u32> {
    label
        .strip_prefix(WEEK_LABEL_PREFIX)?
        .trim()
        .parse()
        .ok()
}

/// Short date as `d/m/yyyy`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Day label such as `"Lunes 01 jul"`
pub fn day_label(date: NaiveDate) -> String {
    format!(
        "{} {:02} {}",
        weekday_name(date),
        date.day(),
        month_abbreviation(date)
    )
}

/// Inclusive date range of a report filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whole calendar month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, next.pred_opt()?))
    }

    /// Both bounds, when the range is complete
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Check if a date is within the range; open bounds are unbounded
    pub fn contains(&self, date: &NaiveDate) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (Some(s), None) => *date >= s,
            (None, Some(e)) => *date <= e,
            (Some(s), Some(e)) => *date >= s && *date <= e,
        }
    }

    pub fn description(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{} - {}", short_date(start), short_date(end)),
            (Some(start), None) => format!("desde {}", short_date(start)),
            (None, Some(end)) => format!("hasta {}", short_date(end)),
            (None, None) => "Sin rango".to_string(),
        }
    }
}

/// One Sunday-to-Saturday week offered by the dashboard's week picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Weeks of a month for the dashboard picker.
///
/// The first week ends on the month's first Saturday and may start in the
/// previous month. Weeks are emitted while their Saturday is inside the month.
pub fn month_weeks(year: i32, month: u32) -> Vec<WeekRange> {
    let Some(range) = DateRange::month(year, month) else {
        return Vec::new();
    };
    let Some((first, last)) = range.bounds() else {
        return Vec::new();
    };

    let until_saturday = (6 - first.weekday().num_days_from_sunday()) as i64;
    let mut end = first + Duration::days(until_saturday);
    let mut weeks = Vec::new();

    while end <= last {
        let start = end - Duration::days(6);
        weeks.push(WeekRange {
            start,
            end,
            label: format!("{} - {}", short_date(start), short_date(end)),
        });
        end += Duration::days(7);
    }

    weeks
}
