use serde::*;

use crate::api::IssueType;

/// Status counters shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total_tickets: u64,
    pub active_tickets: u64,
    pub resolved_tickets: u64,
    pub pending_tickets: u64,
    pub in_progress_tickets: u64,
}

/// Number of tickets of one issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub count: u64,
}

/// Activity of the current UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub tickets_submitted_today: u64,
    pub tickets_resolved: u64,
    /// Rendered as `"{h}h {m}m"`.
    pub average_resolution_time: String,
}
