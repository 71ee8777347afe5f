//! Derived metrics over the full application collection.
//!
//! `compute_stats` is a pure function of the records and a single `now`
//! instant. It never fails: unparsable dates drop out of the date metrics and
//! unparsable salaries count as zero.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::models::{ApplicationRecord, Status};

const MS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;
const WEEK_WINDOW_DAYS: i64 = 7;
const MONTH_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub total: usize,
    pub count_by_status: BTreeMap<Status, usize>,
    pub interviewed: usize,
    pub response_rate: u32,
    pub success_rate: u32,
    pub interview_rate: u32,
    pub rejection_rate: u32,
    pub pending_count: usize,
    pub this_week_count: usize,
    pub this_month_count: usize,
    pub avg_per_week: AvgPerWeek,
    pub days_since_last: Option<i64>,
    pub salary: SalaryStats,
    pub location_breakdown: BTreeMap<String, usize>,
}

impl StatsReport {
    pub fn count(&self, status: Status) -> usize {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvgPerWeek {
    /// Applications per week since the first one, rounded to one decimal.
    Rate(f64),
    /// Everything happened within the current week; carries the raw total.
    SinceStart(usize),
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryStats {
    pub average_offered: f64,
    pub highest_offer: f64,
    pub total_potential: f64,
}

pub fn compute_stats(records: &[ApplicationRecord], now: DateTime<Utc>) -> StatsReport {
    let total = records.len();

    let mut count_by_status: BTreeMap<Status, usize> =
        Status::ALL.iter().map(|s| (*s, 0)).collect();
    for record in records {
        *count_by_status.entry(record.status).or_insert(0) += 1;
    }
    let count = |status: Status| count_by_status.get(&status).copied().unwrap_or(0);

    let interviewed = count(Status::Interviewing) + count(Status::Offer) + count(Status::Accepted);
    let rejected = count(Status::Rejected);

    let response_rate = percent(interviewed + rejected, total);
    let success_rate = percent(count(Status::Accepted), total);
    let interview_rate = percent(interviewed, total);
    let rejection_rate = percent(rejected, total);
    let pending_count = count(Status::Applied);

    // Only dates that parse take part in anything time-based
    let dates: Vec<DateTime<Utc>> = records
        .iter()
        .filter_map(|r| parse_date_applied(&r.date_applied))
        .collect();

    let this_week_count = dates
        .iter()
        .filter(|d| whole_days_between(**d, now) <= WEEK_WINDOW_DAYS)
        .count();
    let this_month_count = dates
        .iter()
        .filter(|d| whole_days_between(**d, now) <= MONTH_WINDOW_DAYS)
        .count();

    let earliest = dates.iter().min().copied().unwrap_or(now);
    let weeks_since_first = elapsed_ms(earliest, now) / (MS_PER_DAY * 7.0);
    let avg_per_week = if weeks_since_first >= 1.0 {
        AvgPerWeek::Rate(round_one_decimal(total as f64 / weeks_since_first))
    } else if total > 0 {
        AvgPerWeek::SinceStart(total)
    } else {
        AvgPerWeek::Zero
    };

    let days_since_last = dates.iter().max().map(|d| whole_days_between(*d, now));

    let salary = salary_stats(records);

    let mut location_breakdown = BTreeMap::new();
    for record in records.iter().filter(|r| !r.location.is_empty()) {
        *location_breakdown.entry(record.location.clone()).or_insert(0) += 1;
    }

    StatsReport {
        total,
        count_by_status,
        interviewed,
        response_rate,
        success_rate,
        interview_rate,
        rejection_rate,
        pending_count,
        this_week_count,
        this_month_count,
        avg_per_week,
        days_since_last,
        salary,
        location_breakdown,
    }
}

fn salary_stats(records: &[ApplicationRecord]) -> SalaryStats {
    let salaries: Vec<f64> = records
        .iter()
        .filter(|r| r.status.has_offer() && !r.specific_salary.is_empty())
        .map(|r| parse_salary(&r.specific_salary))
        .collect();

    if salaries.is_empty() {
        return SalaryStats::default();
    }

    let total_potential: f64 = salaries.iter().sum();
    let highest_offer = salaries.iter().copied().fold(f64::MIN, f64::max);

    SalaryStats {
        average_offered: total_potential / salaries.len() as f64,
        highest_offer,
        total_potential,
    }
}

/// Pull a number out of free text like "$90,000" or "95k/yr".
///
/// Everything but digits and '.' is dropped, then the longest leading decimal
/// prefix is parsed. Anything that yields no number is 0.
pub fn parse_salary(text: &str) -> f64 {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut num_str = String::new();
    let mut seen_dot = false;
    for c in kept.chars() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        num_str.push(c);
    }

    num_str.parse::<f64>().unwrap_or(0.0)
}

/// Parse `dateApplied`. Bare dates are midnight UTC.
pub fn parse_date_applied(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64
}

fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (elapsed_ms(from, to) / MS_PER_DAY).floor() as i64
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
