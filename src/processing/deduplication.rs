use crate::error::Result;
use crate::models::Issue;
use crate::state::IssueStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Duplicate report detector.
///
/// Reports sharing a location fingerprint (a ~10 m grid cell) within the
/// window count as duplicates of the same physical problem. The count feeds
/// the classifier's context and the priority engine.
pub struct DuplicateDetector {
    store: Arc<dyn IssueStore>,
    window_secs: i64,
}

impl DuplicateDetector {
    pub fn new(store: Arc<dyn IssueStore>, window_secs: i64) -> Self {
        Self { store, window_secs }
    }

    /// Count recent open issues sharing a fingerprint
    pub async fn count_recent_duplicates(
        &self,
        fingerprint: &str,
        exclude: Option<Uuid>,
    ) -> Result<u32> {
        let candidates = self.store.find_by_fingerprint(fingerprint).await?;

        let window_start = Utc::now() - Duration::seconds(self.window_secs);

        let count = candidates
            .iter()
            .filter(|issue| {
                exclude != Some(issue.id)
                    && issue.created_at >= window_start
                    && issue.is_open()
            })
            .count();

        Ok(count as u32)
    }

    /// Find the most recent open duplicate of an issue, if any
    pub async fn find_duplicate(&self, issue: &Issue) -> Result<Option<Issue>> {
        let fingerprint = match issue.fingerprint {
            Some(ref fingerprint) => fingerprint.clone(),
            None => issue.generate_fingerprint(),
        };

        let candidates = self.store.find_by_fingerprint(&fingerprint).await?;
        let window_start = Utc::now() - Duration::seconds(self.window_secs);

        let duplicate = candidates
            .into_iter()
            .filter(|existing| {
                existing.id != issue.id
                    && existing.created_at >= window_start
                    && existing.is_open()
            })
            .max_by_key(|existing| existing.created_at);

        Ok(duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Location, PriorityLevel};
    use crate::state::InMemoryStore;

    fn issue_at(lat: f64, lng: f64) -> Issue {
        let mut issue = Issue::new(
            "Pothole".to_string(),
            "Deep pothole".to_string(),
            Category::Pothole,
            PriorityLevel::Medium,
            Location {
                latitude: lat,
                longitude: lng,
                address: None,
            },
            None,
        );
        issue.fingerprint = Some(issue.generate_fingerprint());
        issue
    }

    #[tokio::test]
    async fn test_counts_same_cell_reports() {
        let store = Arc::new(InMemoryStore::new());
        let detector = DuplicateDetector::new(store.clone(), 86_400);

        let a = issue_at(12.9716, 77.5946);
        let b = issue_at(12.9716, 77.5946);
        store.save_issue(&a).await.unwrap();
        store.save_issue(&b).await.unwrap();

        let count = detector
            .count_recent_duplicates(a.fingerprint.as_ref().unwrap(), Some(a.id))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_different_cell_is_not_duplicate() {
        let store = Arc::new(InMemoryStore::new());
        let detector = DuplicateDetector::new(store.clone(), 86_400);

        let a = issue_at(12.9716, 77.5946);
        let b = issue_at(12.9916, 77.5946);
        store.save_issue(&a).await.unwrap();
        store.save_issue(&b).await.unwrap();

        let count = detector
            .count_recent_duplicates(a.fingerprint.as_ref().unwrap(), Some(a.id))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_resolved_issues_do_not_count() {
        let store = Arc::new(InMemoryStore::new());
        let detector = DuplicateDetector::new(store.clone(), 86_400);

        let a = issue_at(12.9716, 77.5946);
        let mut b = issue_at(12.9716, 77.5946);
        b.resolve("admin".to_string(), "fixed".to_string());

        store.save_issue(&a).await.unwrap();
        store.save_issue(&b).await.unwrap();

        let count = detector
            .count_recent_duplicates(a.fingerprint.as_ref().unwrap(), Some(a.id))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_find_duplicate_returns_most_recent() {
        let store = Arc::new(InMemoryStore::new());
        let detector = DuplicateDetector::new(store.clone(), 86_400);

        let a = issue_at(12.9716, 77.5946);
        store.save_issue(&a).await.unwrap();

        let b = issue_at(12.9716, 77.5946);
        let duplicate = detector.find_duplicate(&b).await.unwrap();

        assert_eq!(duplicate.unwrap().id, a.id);
    }
}
