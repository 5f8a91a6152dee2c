use crate::error::{AppError, Result};
use crate::models::Issue;
use crate::state::{IssueFilter, IssueStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory issue store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    issues: Arc<DashMap<Uuid, Issue>>,
    fingerprint_index: Arc<DashMap<String, Vec<Uuid>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            issues: Arc::new(DashMap::new()),
            fingerprint_index: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IssueStore for InMemoryStore {
    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        self.issues.insert(issue.id, issue.clone());

        // Update fingerprint index if present
        if let Some(ref fingerprint) = issue.fingerprint {
            self.fingerprint_index
                .entry(fingerprint.clone())
                .or_insert_with(Vec::new)
                .push(issue.id);
        }

        tracing::debug!(issue_id = %issue.id, "Issue saved");
        Ok(())
    }

    async fn get_issue(&self, id: &Uuid) -> Result<Option<Issue>> {
        Ok(self.issues.get(id).map(|entry| entry.clone()))
    }

    async fn update_issue(&self, issue: &Issue) -> Result<()> {
        if self.issues.contains_key(&issue.id) {
            self.issues.insert(issue.id, issue.clone());
            tracing::debug!(issue_id = %issue.id, "Issue updated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Issue {} not found", issue.id)))
        }
    }

    async fn delete_issue(&self, id: &Uuid) -> Result<()> {
        if let Some((_, issue)) = self.issues.remove(id) {
            // Remove from fingerprint index
            if let Some(ref fingerprint) = issue.fingerprint {
                if let Some(mut entry) = self.fingerprint_index.get_mut(fingerprint) {
                    entry.retain(|&issue_id| issue_id != *id);
                }
            }
            tracing::debug!(issue_id = %id, "Issue deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Issue {} not found", id)))
        }
    }

    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .issues
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|issue| filter.matches(issue))
            .collect();

        // Sort by creation time (newest first)
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = (page * page_size) as usize;

        Ok(issues
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn count_issues(&self, filter: &IssueFilter) -> Result<u64> {
        let count = self
            .issues
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();

        Ok(count as u64)
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<Issue>> {
        if let Some(issue_ids) = self.fingerprint_index.get(fingerprint) {
            let issues: Vec<Issue> = issue_ids
                .iter()
                .filter_map(|id| self.issues.get(id).map(|entry| entry.clone()))
                .collect();
            Ok(issues)
        } else {
            Ok(Vec::new())
        }
    }

    async fn count_by_reporter(&self, reporter: &str) -> Result<u64> {
        let count = self
            .issues
            .iter()
            .filter(|entry| entry.value().reported_by.as_deref() == Some(reporter))
            .count();

        Ok(count as u64)
    }
}
