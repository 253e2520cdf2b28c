//! Time-series aggregation over tickets and calendar events.
//!
//! These are the pure functions feeding the forecasting service:
//!
//! - [`build_daily_counts`] turns dated records into a gap-free per-day count
//!   series over an inclusive [`DateRange`].
//! - [`build_event_category_map`] buckets calendar events into holidays and
//!   product launches.
//! - [`merge_and_average_forecasts`] pairs two forecast series day by day and
//!   reduces them to a single volume figure.
//!
//! None of them touch storage or the network; callers fetch the records first.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::api::{Event, Ticket, UserId};
use crate::models::{DailyCountSeries, DateRange, EventCategoryMap, ForecastPoint};

/// Errors raised by the aggregation functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    /// The requested range is missing an endpoint or is reversed.
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Forecast series of different lengths cannot be paired.
    #[error("Forecast series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Forecast series disagree on the date at a given position.
    #[error("Forecast dates differ at index {index}: '{left}' vs '{right}'")]
    DateMismatch {
        index: usize,
        left: String,
        right: String,
    },
}

/// A record that can be counted on a calendar day.
pub trait DatedRecord {
    /// Instant the record was created.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Owner of the record.
    fn owner(&self) -> UserId;

    /// UTC calendar day the record falls on.
    fn record_date(&self) -> NaiveDate {
        self.timestamp().date_naive()
    }
}

impl DatedRecord for Ticket {
    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }

    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// Count records per UTC day over `range`, optionally restricted to one owner.
///
/// The result holds exactly one entry per day of the range, zero-filled, in
/// ascending order. Records outside the range are ignored.
pub fn build_daily_counts<R: DatedRecord>(
    records: &[R],
    range: &DateRange,
    owner: Option<UserId>,
) -> DailyCountSeries {
    let mut counts: BTreeMap<NaiveDate, u64> = range.days().map(|day| (day, 0)).collect();

    for record in records {
        if owner.is_some_and(|wanted| wanted != record.owner()) {
            continue;
        }
        if let Some(count) = counts.get_mut(&record.record_date()) {
            *count += 1;
        }
    }

    DailyCountSeries(counts)
}

/// Split events inside `range` into holiday and product-launch buckets.
///
/// Classification is a case-insensitive substring match on the event type:
/// "holiday" selects the holiday bucket, "product" or "release" the launch
/// bucket. A type matching both lands in both; a type matching neither is
/// dropped. When several events share a date within a bucket the later one
/// in input order wins.
pub fn build_event_category_map(events: &[Event], range: &DateRange) -> EventCategoryMap {
    let mut map = EventCategoryMap::default();

    for event in events {
        let details = &event.event_details;
        if !range.contains(details.date) {
            continue;
        }

        let kind = details.event_type.to_lowercase();
        if kind.contains("holiday") {
            map.holidays
                .insert(details.date, details.event_name.clone());
        }
        if kind.contains("product") || kind.contains("release") {
            map.product_launches
                .insert(details.date, details.event_name.clone());
        }
    }

    map
}

fn check_alignment(a: &[ForecastPoint], b: &[ForecastPoint]) -> Result<(), AggregationError> {
    if a.len() != b.len() {
        return Err(AggregationError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    if let Some((index, (left, right))) = a
        .iter()
        .zip(b)
        .enumerate()
        .find(|(_, (left, right))| left.date != right.date)
    {
        return Err(AggregationError::DateMismatch {
            index,
            left: left.date.clone(),
            right: right.date.clone(),
        });
    }

    Ok(())
}

/// Per-day average of two positionally aligned forecast series.
///
/// Each value is `round((a + b) / 2)` with halves rounded away from zero.
pub fn average_forecasts(
    a: &[ForecastPoint],
    b: &[ForecastPoint],
) -> Result<Vec<ForecastPoint>, AggregationError> {
    check_alignment(a, b)?;

    Ok(a.iter()
        .zip(b)
        .map(|(left, right)| {
            let mean = (left.forecasted_value + right.forecasted_value) / 2.0;
            ForecastPoint::new(left.date.clone(), mean.round())
        })
        .collect())
}

/// Sum of the rounded per-day averages of two aligned forecast series.
///
/// Fails with [`AggregationError::LengthMismatch`] or
/// [`AggregationError::DateMismatch`] when the series cannot be paired.
pub fn merge_and_average_forecasts(
    a: &[ForecastPoint],
    b: &[ForecastPoint],
) -> Result<i64, AggregationError> {
    let averaged = average_forecasts(a, b)?;
    Ok(averaged
        .iter()
        .map(|point| point.forecasted_value as i64)
        .fold(0i64, i64::saturating_add))
}
