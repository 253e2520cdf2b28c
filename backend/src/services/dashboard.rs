//! Dashboard pipelines: fetch records, aggregate them, and call the
//! forecasting service.
//!
//! Every pipeline works on a window anchored at `today` (UTC):
//!
//! ```text
//!   today-29 ─────────── today ───── today+7
//!   │◄──── ticket history ────►│
//!   │◄────────────── calendar events ───────►│
//! ```

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::api::{ChartTrend, UserId, UserRole};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{DailyCountSeries, DateRange, ForecastSeries, TicketCriteria};
use crate::services::aggregation::{
    build_daily_counts, build_event_category_map, merge_and_average_forecasts, AggregationError,
};
use crate::services::forecast::{
    ForecastError, ForecastService, PretrainedForecastRequest, VolumeForecastRequest,
};
use crate::services::resolution::average_resolution_hours;

/// Days of ticket history before `today` fed to the forecasts.
pub const HISTORY_DAYS: i64 = 29;
/// Days of upcoming calendar events after `today`.
pub const EVENT_LOOKAHEAD_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Unknown forecast filter '{0}'")]
    UnknownFilter(String),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Staffing figures for the coming month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManHours {
    /// Sum of the per-day averaged forecasts.
    pub tickets_volume: i64,
    /// Mean resolution hours over the ticket history window.
    pub average_time: f64,
}

/// Parse the `{filter}` path segment of the forecast routes.
pub fn parse_filter(filter: &str) -> Result<ChartTrend, DashboardError> {
    filter
        .parse()
        .map_err(|_| DashboardError::UnknownFilter(filter.to_string()))
}

pub fn history_window(today: NaiveDate) -> DateRange {
    DateRange::around(today, HISTORY_DAYS, 0)
}

pub fn event_window(today: NaiveDate) -> DateRange {
    DateRange::around(today, HISTORY_DAYS, EVENT_LOOKAHEAD_DAYS)
}

/// Daily ticket counts over the history window. Clients only see their own.
pub async fn monthly_ticket_counts<R: FullRepository + ?Sized>(
    repo: &R,
    caller: UserId,
    role: UserRole,
    today: NaiveDate,
) -> Result<DailyCountSeries, DashboardError> {
    let range = history_window(today);
    let owner = match role {
        UserRole::Admin => None,
        UserRole::Client => Some(caller),
    };
    let criteria = TicketCriteria { range, owner };

    let tickets = repo.list_tickets_in_range(&criteria).await?;
    Ok(build_daily_counts(&tickets, &range, owner))
}

/// Assemble the body of a volume forecast from storage.
pub async fn volume_forecast_request<R: FullRepository + ?Sized>(
    repo: &R,
    filter: ChartTrend,
    today: NaiveDate,
) -> Result<VolumeForecastRequest, DashboardError> {
    let events_range = event_window(today);
    let history = history_window(today);

    let events = repo.list_events_in_range(&events_range).await?;
    let tickets = repo.list_tickets_in_range(&TicketCriteria::new(history)).await?;

    Ok(VolumeForecastRequest::new(
        build_event_category_map(&events, &events_range),
        build_daily_counts(&tickets, &history, None),
        filter,
    ))
}

pub async fn forecast_ticket_volume<R, F>(
    repo: &R,
    forecast: &F,
    filter: ChartTrend,
    today: NaiveDate,
) -> Result<ForecastSeries, DashboardError>
where
    R: FullRepository + ?Sized,
    F: ForecastService + ?Sized,
{
    let request = volume_forecast_request(repo, filter, today).await?;
    let series = forecast.forecast_ticket_volume(&request).await?;
    info!("Fetched {} forecast ({} points)", filter, series.len());
    Ok(series)
}

pub async fn forecast_pretrained<F: ForecastService + ?Sized>(
    forecast: &F,
    filter: ChartTrend,
    today: NaiveDate,
) -> Result<ForecastSeries, DashboardError> {
    let request = PretrainedForecastRequest {
        current_date: today,
        date_range: filter,
    };
    let series = forecast.forecast_pretrained(&request).await?;
    info!("Fetched pre-trained {} forecast ({} points)", filter, series.len());
    Ok(series)
}

/// Merge both monthly forecasts into a volume figure and pair it with the
/// recent average resolution time.
pub async fn man_hours<R, F>(
    repo: &R,
    forecast: &F,
    today: NaiveDate,
) -> Result<ManHours, DashboardError>
where
    R: FullRepository + ?Sized,
    F: ForecastService + ?Sized,
{
    let (internal, external) = futures::try_join!(
        forecast_ticket_volume(repo, forecast, ChartTrend::Monthly, today),
        forecast_pretrained(forecast, ChartTrend::Monthly, today),
    )?;
    let tickets_volume = merge_and_average_forecasts(&internal, &external)?;

    let recent = repo
        .list_tickets_in_range(&TicketCriteria::new(history_window(today)))
        .await?;

    Ok(ManHours {
        tickets_volume,
        average_time: average_resolution_hours(&recent),
    })
}
