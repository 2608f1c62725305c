//! Best-effort aggregation over a noisy pollution feed.
//!
//! Records are bucketed by year and calendar month for charting, while the
//! summary statistics and the yearly trend are taken straight from the
//! flat record sequence.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tracing::warn;

use crate::models::{PollutionRecord, RawPollutionRecord};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Percent change beyond which a trend counts as moving.
const TREND_THRESHOLD_PERCENT: f64 = 5.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MalformedRecord {
    #[error("missing or invalid year")]
    Year,
    #[error("missing date")]
    Date,
    #[error("value is not numeric")]
    Value,
    #[error("unparseable date {0:?}")]
    UnparseableDate(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub sum: f64,
    pub count: usize,
}

impl Bucket {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// `None` for an empty bucket, so nothing gets plotted for it.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyMonthly {
    pub years: BTreeMap<i32, [Bucket; 12]>,
}

impl YearlyMonthly {
    /// Monthly averages per year in ascending year order.
    pub fn monthly_averages(&self) -> Vec<(i32, [Option<f64>; 12])> {
        self.years
            .iter()
            .map(|(year, months)| {
                let mut averages = [None; 12];
                for (slot, bucket) in averages.iter_mut().zip(months.iter()) {
                    *slot = bucket.average();
                }
                (*year, averages)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub first_year: i32,
    pub last_year: i32,
    pub first_average: f64,
    pub last_average: f64,
    /// Undefined when the first year averaged zero.
    pub percent_change: Option<f64>,
    pub direction: TrendDirection,
}

/// Rewrites `DD-MM-YYYY` as `YYYY-MM-DD`; anything else passes through.
pub fn normalize_date(raw: &str) -> Cow<'_, str> {
    let bytes = raw.as_bytes();
    let day_first = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());

    if day_first {
        Cow::Owned(format!("{}-{}-{}", &raw[6..10], &raw[3..5], &raw[0..2]))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Parses a feed date, ignoring any time-of-day suffix.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let normalized = normalize_date(raw.trim());
    let day = normalized
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn year_of(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if year == 0 {
        return None;
    }
    i32::try_from(year).ok()
}

fn numeric_value(record: &RawPollutionRecord) -> Option<f64> {
    record.value.as_ref().and_then(Value::as_f64)
}

impl RawPollutionRecord {
    pub fn validate(&self) -> Result<PollutionRecord, MalformedRecord> {
        let year = self.year.as_ref().and_then(year_of).ok_or(MalformedRecord::Year)?;
        let date = match self.date.as_deref() {
            Some(date) if !date.trim().is_empty() => date.to_string(),
            _ => return Err(MalformedRecord::Date),
        };
        let value = numeric_value(self).ok_or(MalformedRecord::Value)?;

        Ok(PollutionRecord { year, date, value })
    }
}

/// Groups well-formed records into year x month buckets. Malformed
/// records are logged and skipped.
pub fn bucket_records(records: &[RawPollutionRecord]) -> YearlyMonthly {
    let mut buckets = YearlyMonthly::default();

    for (index, raw) in records.iter().enumerate() {
        let record = match raw.validate() {
            Ok(record) => record,
            Err(reason) => {
                warn!(index, %reason, "skipping malformed record");
                continue;
            }
        };

        let Some(date) = parse_feed_date(&record.date) else {
            let reason = MalformedRecord::UnparseableDate(record.date.clone());
            warn!(index, %reason, "skipping malformed record");
            continue;
        };

        let months = buckets
            .years
            .entry(record.year)
            .or_insert_with(|| [Bucket::default(); 12]);
        months[date.month0() as usize].add(record.value);
    }

    buckets
}

/// Mean, max and min over every numeric value in the result set.
pub fn summary_stats(records: &[RawPollutionRecord]) -> Option<SummaryStats> {
    let values: Vec<f64> = records.iter().filter_map(numeric_value).collect();
    if values.is_empty() {
        return None;
    }

    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    Some(SummaryStats {
        mean: sum / values.len() as f64,
        max,
        min,
        count: values.len(),
    })
}

/// Average value per year, keyed by year.
pub fn yearly_averages(records: &[RawPollutionRecord]) -> BTreeMap<i32, f64> {
    let mut totals: BTreeMap<i32, Bucket> = BTreeMap::new();

    for record in records {
        let (Some(year), Some(value)) = (record.year.as_ref().and_then(year_of), numeric_value(record))
        else {
            continue;
        };
        totals.entry(year).or_default().add(value);
    }

    totals
        .into_iter()
        .filter_map(|(year, bucket)| bucket.average().map(|avg| (year, avg)))
        .collect()
}

/// Compares the first and last year on record; needs at least two years.
pub fn analyze_trend(yearly: &BTreeMap<i32, f64>) -> Option<Trend> {
    if yearly.len() < 2 {
        return None;
    }
    let (&first_year, &first_average) = yearly.iter().next()?;
    let (&last_year, &last_average) = yearly.iter().next_back()?;

    let percent_change = (first_average != 0.0)
        .then(|| (last_average - first_average) / first_average * 100.0);

    // Any move away from a zero baseline exceeds the threshold.
    let direction = match percent_change {
        Some(change) if change > TREND_THRESHOLD_PERCENT => TrendDirection::Increasing,
        Some(change) if change < -TREND_THRESHOLD_PERCENT => TrendDirection::Decreasing,
        Some(_) => TrendDirection::Stable,
        None if last_average > 0.0 => TrendDirection::Increasing,
        None if last_average < 0.0 => TrendDirection::Decreasing,
        None => TrendDirection::Stable,
    };

    Some(Trend {
        first_year,
        last_year,
        first_average,
        last_average,
        percent_change,
        direction,
    })
}
