//! Status counters and per-type grouping for dashboard cards.

use std::collections::BTreeMap;

use crate::api::{IssueType, Ticket, TicketStatus};
use crate::models::{CategoryCount, TicketStats};

/// Count tickets by status.
pub fn compute_ticket_stats(tickets: &[Ticket]) -> TicketStats {
    let mut stats = TicketStats {
        total_tickets: tickets.len() as u64,
        ..Default::default()
    };

    for ticket in tickets {
        match ticket.status {
            TicketStatus::Active => stats.active_tickets += 1,
            TicketStatus::Resolved => stats.resolved_tickets += 1,
            TicketStatus::Pending => stats.pending_tickets += 1,
            TicketStatus::InProgress => stats.in_progress_tickets += 1,
        }
    }

    stats
}

/// Number of tickets per issue type, ordered by type label.
///
/// Types without tickets are omitted.
pub fn group_by_issue_type(tickets: &[Ticket]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&'static str, (IssueType, u64)> = BTreeMap::new();
    for ticket in tickets {
        counts
            .entry(ticket.issue_type.as_str())
            .or_insert((ticket.issue_type, 0))
            .1 += 1;
    }

    counts
        .into_values()
        .map(|(issue_type, count)| CategoryCount { issue_type, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{IssuePriority, IssueUrgency, TicketId, UserId};
    use chrono::Utc;

    fn ticket(id: i64, status: TicketStatus, issue_type: IssueType) -> Ticket {
        Ticket {
            id: TicketId(id),
            user_id: UserId(1),
            name: format!("ticket-{}", id),
            description: String::new(),
            status,
            issue_type,
            priority: IssuePriority::Medium,
            urgency: IssueUrgency::Moderate,
            expected_resolution_time: None,
            actual_resolution_time: None,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_stats_count_each_status() {
        let tickets = vec![
            ticket(1, TicketStatus::Active, IssueType::BugReport),
            ticket(2, TicketStatus::Active, IssueType::BugReport),
            ticket(3, TicketStatus::Resolved, IssueType::BugReport),
            ticket(4, TicketStatus::Pending, IssueType::BugReport),
            ticket(5, TicketStatus::InProgress, IssueType::BugReport),
        ];
        let stats = compute_ticket_stats(&tickets);
        assert_eq!(stats.total_tickets, 5);
        assert_eq!(stats.active_tickets, 2);
        assert_eq!(stats.resolved_tickets, 1);
        assert_eq!(stats.pending_tickets, 1);
        assert_eq!(stats.in_progress_tickets, 1);

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["inProgressTickets"], 1);
        assert_eq!(json["totalTickets"], 5);
    }

    #[test]
    fn test_group_by_type_sorted_by_label() {
        let tickets = vec![
            ticket(1, TicketStatus::Active, IssueType::SystemOutage),
            ticket(2, TicketStatus::Active, IssueType::BugReport),
            ticket(3, TicketStatus::Resolved, IssueType::SystemOutage),
        ];
        let groups = group_by_issue_type(&tickets);
        assert_eq!(
            groups,
            vec![
                CategoryCount { issue_type: IssueType::BugReport, count: 1 },
                CategoryCount { issue_type: IssueType::SystemOutage, count: 2 },
            ]
        );
        let json = serde_json::to_value(&groups[0]).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Bug Report", "count": 1}));
    }

    #[test]
    fn test_group_by_type_empty() {
        assert!(group_by_issue_type(&[]).is_empty());
    }
}
