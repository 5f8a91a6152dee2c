//! Event broadcasting
//!
//! Pub-sub distribution of issue events over a tokio broadcast channel.
//! Delivery is best-effort: lagging subscribers drop events.

use crate::realtime::events::{EventEnvelope, EventStats, IssueEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Event broadcaster
pub struct EventBroadcaster {
    /// Broadcast channel for events
    tx: broadcast::Sender<EventEnvelope>,
    /// Event statistics
    stats: Arc<RwLock<EventStats>>,
}

impl EventBroadcaster {
    /// Create a new event broadcaster with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            stats: Arc::new(RwLock::new(EventStats::default())),
        }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: IssueEvent) {
        let event_type = event.event_type();
        let envelope = EventEnvelope::new(event);

        debug!(
            event_type = event_type,
            priority = ?envelope.priority,
            "Publishing event"
        );

        self.stats.write().record_event(event_type);
        crate::metrics::EVENTS_PUBLISHED_TOTAL
            .with_label_values(&[event_type])
            .inc();

        // A send error only means there are no subscribers right now
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Snapshot of event statistics
    pub fn stats(&self) -> EventStats {
        self.stats.read().clone()
    }
}
