//! Realtime event types
//!
//! Type-safe events published whenever an issue changes, consumed by the
//! WebSocket relay and any in-process subscriber.

use crate::models::{Issue, IssueStatus, PriorityLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events published on the realtime bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueEvent {
    /// A new issue was reported
    IssueCreated { issue: Issue },
    /// An issue changed status
    StatusChanged {
        issue_id: Uuid,
        status: IssueStatus,
        actor: String,
    },
    /// An issue was resolved
    IssueResolved { issue_id: Uuid },
    /// An issue received or lost an upvote
    IssueUpvoted { issue_id: Uuid, upvotes: usize },
    /// Classification degraded and the issue needs manual categorization
    ClassificationDegraded { issue_id: Uuid, error: String },
}

impl IssueEvent {
    /// Stable event type name for stats and metrics labels
    pub fn event_type(&self) -> &'static str {
        match self {
            IssueEvent::IssueCreated { .. } => "issue_created",
            IssueEvent::StatusChanged { .. } => "status_changed",
            IssueEvent::IssueResolved { .. } => "issue_resolved",
            IssueEvent::IssueUpvoted { .. } => "issue_upvoted",
            IssueEvent::ClassificationDegraded { .. } => "classification_degraded",
        }
    }
}

/// Internal event envelope for broadcasting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: String,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Delivery priority
    pub priority: EventPriority,
    /// Event payload
    pub event: IssueEvent,
}

impl EventEnvelope {
    pub fn new(event: IssueEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            priority: EventPriority::from_event(&event),
            event,
        }
    }
}

/// Event priority for delivery ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl EventPriority {
    /// Determine delivery priority from event content
    pub fn from_event(event: &IssueEvent) -> Self {
        match event {
            IssueEvent::IssueCreated { issue } if issue.priority == PriorityLevel::Critical => {
                EventPriority::Critical
            }
            IssueEvent::IssueCreated { issue } if issue.priority == PriorityLevel::High => {
                EventPriority::High
            }
            IssueEvent::ClassificationDegraded { .. } => EventPriority::High,
            IssueEvent::IssueCreated { .. }
            | IssueEvent::StatusChanged { .. }
            | IssueEvent::IssueResolved { .. } => EventPriority::Normal,
            IssueEvent::IssueUpvoted { .. } => EventPriority::Low,
        }
    }
}

/// Event statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventStats {
    pub total_events: u64,
    pub events_by_type: std::collections::HashMap<String, u64>,
    pub last_event_time: Option<DateTime<Utc>>,
}

impl EventStats {
    /// Record a published event
    pub fn record_event(&mut self, event_type: &str) {
        self.total_events += 1;
        *self
            .events_by_type
            .entry(event_type.to_string())
            .or_insert(0) += 1;
        self.last_event_time = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Location};

    fn issue_with_priority(priority: PriorityLevel) -> Issue {
        Issue::new(
            "Test".to_string(),
            "Description".to_string(),
            Category::Sewage,
            priority,
            Location {
                latitude: 0.0,
                longitude: 0.0,
                address: None,
            },
            None,
        )
    }

    #[test]
    fn test_priority_from_event() {
        let critical = IssueEvent::IssueCreated {
            issue: issue_with_priority(PriorityLevel::Critical),
        };
        assert_eq!(EventPriority::from_event(&critical), EventPriority::Critical);

        let medium = IssueEvent::IssueCreated {
            issue: issue_with_priority(PriorityLevel::Medium),
        };
        assert_eq!(EventPriority::from_event(&medium), EventPriority::Normal);

        let upvote = IssueEvent::IssueUpvoted {
            issue_id: Uuid::new_v4(),
            upvotes: 3,
        };
        assert_eq!(EventPriority::from_event(&upvote), EventPriority::Low);
    }

    #[test]
    fn test_stats_recording() {
        let mut stats = EventStats::default();

        stats.record_event("issue_created");
        stats.record_event("issue_created");
        stats.record_event("status_changed");

        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.events_by_type["issue_created"], 2);
        assert!(stats.last_event_time.is_some());
    }
}
