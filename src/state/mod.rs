pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::create_store;
pub use sled_store::SledStore;
pub use store::InMemoryStore;

use crate::error::Result;
use crate::models::{Category, Issue, IssueStatus, PriorityLevel};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for issue storage operations
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Save an issue
    async fn save_issue(&self, issue: &Issue) -> Result<()>;

    /// Get an issue by ID
    async fn get_issue(&self, id: &Uuid) -> Result<Option<Issue>>;

    /// Update an issue
    async fn update_issue(&self, issue: &Issue) -> Result<()>;

    /// Delete an issue
    async fn delete_issue(&self, id: &Uuid) -> Result<()>;

    /// List issues with filtering, newest first
    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Issue>>;

    /// Count issues matching filter
    async fn count_issues(&self, filter: &IssueFilter) -> Result<u64>;

    /// Find issues by location fingerprint
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<Issue>>;

    /// Count issues filed by a reporter
    async fn count_by_reporter(&self, reporter: &str) -> Result<u64>;
}

/// Filter for querying issues
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub statuses: Vec<IssueStatus>,
    pub categories: Vec<Category>,
    pub priorities: Vec<PriorityLevel>,
    pub reporter: Option<String>,
    pub public_only: bool,
    pub open_only: bool,
}

impl IssueFilter {
    /// Check whether an issue passes this filter
    pub fn matches(&self, issue: &Issue) -> bool {
        let status_match = self.statuses.is_empty() || self.statuses.contains(&issue.status);
        let category_match =
            self.categories.is_empty() || self.categories.contains(&issue.category);
        let priority_match =
            self.priorities.is_empty() || self.priorities.contains(&issue.priority);
        let reporter_match = self
            .reporter
            .as_ref()
            .map_or(true, |r| issue.reported_by.as_deref() == Some(r.as_str()));
        let public_match = !self.public_only || issue.is_public;
        let open_match = !self.open_only || issue.is_open();

        status_match
            && category_match
            && priority_match
            && reporter_match
            && public_match
            && open_match
    }
}
