//! Service layer for business logic and orchestration.
//!
//! Services sit between the repository layer and the HTTP handlers. The
//! aggregation and statistics modules are pure; `tickets` and `dashboard`
//! orchestrate repository calls and the external forecasting service.

pub mod aggregation;
pub mod dashboard;
pub mod forecast;
pub mod resolution;
pub mod ticket_stats;
pub mod tickets;

#[cfg(test)]
mod aggregation_tests;

pub use aggregation::{
    average_forecasts, build_daily_counts, build_event_category_map, merge_and_average_forecasts,
    AggregationError,
};
pub use dashboard::{DashboardError, ManHours};
pub use forecast::{ForecastError, ForecastService, HttpForecastClient};
pub use resolution::{average_resolution_hours, today_stats};
pub use ticket_stats::{compute_ticket_stats, group_by_issue_type};
pub use tickets::{TicketDraft, TicketError, TicketPatch};
