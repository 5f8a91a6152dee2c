pub mod handlers;
pub mod routes;

pub use routes::build_router;

use crate::analytics::AnalyticsEngine;
use crate::processing::IssueProcessor;
use crate::realtime::EventBroadcaster;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<IssueProcessor>,
    pub analytics: Arc<AnalyticsEngine>,
    pub broadcaster: Arc<EventBroadcaster>,
}

impl AppState {
    pub fn new(
        processor: Arc<IssueProcessor>,
        analytics: Arc<AnalyticsEngine>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Self {
        Self {
            processor,
            analytics,
            broadcaster,
        }
    }
}
