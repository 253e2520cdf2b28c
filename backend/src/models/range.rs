use chrono::{Duration, NaiveDate};
use serde::*;

use crate::api::UserId;
use crate::services::aggregation::AggregationError;

/// Inclusive calendar-day window `[from, to]`.
///
/// Both endpoints are required and `from` never lies after `to`; the only way
/// to build a range is through [`DateRange::new`] or [`DateRange::from_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Create a range from two dates.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AggregationError> {
        if from > to {
            return Err(AggregationError::InvalidRange(format!(
                "fromDate {} is after toDate {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Create a range from optional endpoints, as received from a caller.
    pub fn from_bounds(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, AggregationError> {
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to),
            _ => Err(AggregationError::InvalidRange(
                "Both fromDate and toDate must be provided".to_string(),
            )),
        }
    }

    /// The `days_back` days before `anchor` up to `days_ahead` days after it.
    pub fn around(anchor: NaiveDate, days_back: i64, days_ahead: i64) -> Self {
        let from = anchor - Duration::days(days_back.max(0));
        let to = anchor + Duration::days(days_ahead.max(0));
        Self { from, to }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of calendar days covered, endpoints included.
    pub fn num_days(&self) -> usize {
        ((self.to - self.from).num_days() + 1) as usize
    }

    /// Every day of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }
}

/// Typed criteria for range-scoped ticket queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketCriteria {
    pub range: DateRange,
    pub owner: Option<UserId>,
}

impl TicketCriteria {
    pub fn new(range: DateRange) -> Self {
        Self { range, owner: None }
    }

    pub fn for_owner(range: DateRange, owner: UserId) -> Self {
        Self {
            range,
            owner: Some(owner),
        }
    }

    /// Whether a record created on `date` by `owner` satisfies the criteria.
    pub fn matches(&self, date: NaiveDate, owner: UserId) -> bool {
        self.range.contains(date) && self.owner.map_or(true, |wanted| wanted == owner)
    }
}
