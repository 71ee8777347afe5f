//! Presentation rules for a `StatsReport`.
//!
//! Zero-valued salary figures mean "no data" and are shown as a placeholder,
//! never as `$0`.

use crate::models::Status;
use crate::stats::{AvgPerWeek, StatsReport};

pub const PLACEHOLDER: &str = "-";
pub const NO_LOCATION_DATA: &str = "No data yet";

/// Cut `s` to at most `max` characters, ending in "..." when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn format_percent(rate: u32) -> String {
    format!("{}%", rate)
}

/// Whole dollars with thousands separators, e.g. `$95,000`.
pub fn format_currency(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

pub fn format_salary(amount: f64) -> String {
    if amount > 0.0 {
        format_currency(amount)
    } else {
        PLACEHOLDER.to_string()
    }
}

pub fn format_avg_per_week(avg: AvgPerWeek) -> String {
    match avg {
        AvgPerWeek::Rate(rate) => format!("{:.1}", rate),
        AvgPerWeek::SinceStart(total) => format!("{} (since start)", total),
        AvgPerWeek::Zero => "0".to_string(),
    }
}

pub fn format_days_since_last(days: Option<i64>) -> String {
    days.map_or_else(|| PLACEHOLDER.to_string(), |d| d.to_string())
}

pub fn location_lines(report: &StatsReport) -> Vec<String> {
    if report.location_breakdown.is_empty() {
        return vec![NO_LOCATION_DATA.to_string()];
    }
    report
        .location_breakdown
        .iter()
        .map(|(location, count)| format!("{}: {}", location, count))
        .collect()
}

/// Label/value rows grouped by dashboard section.
pub fn sections(report: &StatsReport) -> Vec<(&'static str, Vec<(String, String)>)> {
    let row = |label: &str, value: String| (label.to_string(), value);

    let overview = vec![
        row("Total applications", report.total.to_string()),
        row("Interviewing", report.count(Status::Interviewing).to_string()),
        row("Offers", report.count(Status::Offer).to_string()),
        row("Accepted", report.count(Status::Accepted).to_string()),
        row("Rejected", report.count(Status::Rejected).to_string()),
        row("Response rate", format_percent(report.response_rate)),
        row("Success rate", format_percent(report.success_rate)),
    ];

    let activity = vec![
        row("This week", report.this_week_count.to_string()),
        row("This month", report.this_month_count.to_string()),
        row("Avg per week", format_avg_per_week(report.avg_per_week)),
        row("Days since last", format_days_since_last(report.days_since_last)),
    ];

    let salary = vec![
        row("Average offered", format_salary(report.salary.average_offered)),
        row("Highest offer", format_salary(report.salary.highest_offer)),
        row("Total potential", format_salary(report.salary.total_potential)),
    ];

    let pipeline = vec![
        row("Interview rate", format_percent(report.interview_rate)),
        row("Rejection rate", format_percent(report.rejection_rate)),
        row("Pending", report.pending_count.to_string()),
    ];

    vec![
        ("Overview", overview),
        ("Activity", activity),
        ("Salary insights", salary),
        ("Pipeline", pipeline),
    ]
}

/// Plain-text dashboard for the `stats` command.
pub fn render_text(report: &StatsReport) -> String {
    let mut out = String::new();
    for (title, rows) in sections(report) {
        out.push_str(title);
        out.push('\n');
        out.push_str(&"-".repeat(36));
        out.push('\n');
        for (label, value) in rows {
            out.push_str(&format!("  {:<20} {:>12}\n", label, value));
        }
        out.push('\n');
    }
    out.push_str("Locations\n");
    out.push_str(&"-".repeat(36));
    out.push('\n');
    for line in location_lines(report) {
        out.push_str(&format!("  {}\n", line));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::compute_stats;
    use chrono::Utc;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Backend", 10), "Backend");
        assert_eq!(truncate("Ingénieur Développement", 12), "Ingénieur...");
        assert_eq!(truncate("日本語のエンジニア職", 6), "日本語...");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(95000.0), "$95,000");
        assert_eq!(format_currency(1234567.4), "$1,234,567");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(12.0), "$12");
    }

    #[test]
    fn test_zero_salary_renders_placeholder() {
        assert_eq!(format_salary(0.0), PLACEHOLDER);
        assert_eq!(format_salary(100000.0), "$100,000");
    }

    #[test]
    fn test_format_avg_per_week() {
        assert_eq!(format_avg_per_week(AvgPerWeek::Rate(2.0)), "2.0");
        assert_eq!(format_avg_per_week(AvgPerWeek::Rate(1.5)), "1.5");
        assert_eq!(format_avg_per_week(AvgPerWeek::SinceStart(1)), "1 (since start)");
        assert_eq!(format_avg_per_week(AvgPerWeek::Zero), "0");
    }

    #[test]
    fn test_empty_report_renders_placeholders() {
        let report = compute_stats(&[], Utc::now());
        let text = render_text(&report);
        assert!(text.contains("Response rate"));
        assert!(text.contains("0%"));
        assert!(text.contains(NO_LOCATION_DATA));
        assert_eq!(format_days_since_last(report.days_since_last), PLACEHOLDER);
        assert!(!text.contains('$'));
    }
}
