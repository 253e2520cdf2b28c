//! Resolution-time statistics.

use chrono::{DateTime, Utc};

use crate::api::Ticket;
use crate::models::TodayStats;

/// Mean resolution time in hours over the resolved tickets of `tickets`.
///
/// Only tickets with status resolved and a recorded resolution time count.
/// Returns `0.0` when there are none.
pub fn average_resolution_hours(tickets: &[Ticket]) -> f64 {
    let hours: Vec<f64> = tickets.iter().filter_map(Ticket::resolution_hours).collect();
    if hours.is_empty() {
        return 0.0;
    }
    hours.iter().sum::<f64>() / hours.len() as f64
}

/// Render a duration in hours as `"{h}h {m}m"`, floored to whole minutes.
pub fn format_hours(hours: f64) -> String {
    let total_minutes = if hours.is_finite() && hours > 0.0 {
        (hours * 60.0).floor() as i64
    } else {
        0
    };
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Dashboard figures for the UTC day containing `now`.
///
/// Submitted and resolved counts are restricted to the current day; the
/// average covers every resolved ticket.
pub fn today_stats(tickets: &[Ticket], now: DateTime<Utc>) -> TodayStats {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);

    let submitted = tickets.iter().filter(|t| t.date >= start_of_day).count() as u64;
    let resolved = tickets
        .iter()
        .filter(|t| t.is_resolved())
        .filter(|t| t.actual_resolution_time.is_some_and(|at| at >= start_of_day))
        .count() as u64;

    TodayStats {
        tickets_submitted_today: submitted,
        tickets_resolved: resolved,
        average_resolution_time: format_hours(average_resolution_hours(tickets)),
    }
}
