use crate::error::{AppError, Result};
use crate::models::Issue;
use crate::state::{IssueFilter, IssueStore};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent issue store using the Sled embedded database
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    issues_tree: sled::Tree,
    fingerprint_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)
            .map_err(|e| AppError::Storage(format!("Failed to open Sled database: {}", e)))?;

        let issues_tree = db
            .open_tree("issues")
            .map_err(|e| AppError::Storage(format!("Failed to open issues tree: {}", e)))?;

        let fingerprint_tree = db
            .open_tree("fingerprints")
            .map_err(|e| AppError::Storage(format!("Failed to open fingerprints tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path_ref);

        Ok(Self {
            db: Arc::new(db),
            issues_tree,
            fingerprint_tree,
        })
    }

    fn serialize_issue(issue: &Issue) -> Result<Vec<u8>> {
        bincode::serialize(issue)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize issue: {}", e)))
    }

    fn deserialize_issue(bytes: &[u8]) -> Result<Issue> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize issue: {}", e)))
    }

    fn issue_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    /// Add an issue to its fingerprint bucket
    fn update_fingerprint_index(&self, issue: &Issue) -> Result<()> {
        if let Some(ref fingerprint) = issue.fingerprint {
            let key = fingerprint.as_bytes();

            let mut issue_ids: Vec<Uuid> = match self
                .fingerprint_tree
                .get(key)
                .map_err(|e| AppError::Storage(format!("Failed to read fingerprint index: {}", e)))?
            {
                Some(existing) => bincode::deserialize(&existing).unwrap_or_default(),
                None => Vec::new(),
            };

            if !issue_ids.contains(&issue.id) {
                issue_ids.push(issue.id);
            }

            let serialized = bincode::serialize(&issue_ids).map_err(|e| {
                AppError::Serialization(format!("Failed to serialize fingerprint index: {}", e))
            })?;

            self.fingerprint_tree
                .insert(key, serialized)
                .map_err(|e| AppError::Storage(format!("Failed to write fingerprint index: {}", e)))?;
        }

        Ok(())
    }

    fn remove_from_fingerprint_index(&self, issue: &Issue) -> Result<()> {
        if let Some(ref fingerprint) = issue.fingerprint {
            let key = fingerprint.as_bytes();

            if let Some(existing) = self
                .fingerprint_tree
                .get(key)
                .map_err(|e| AppError::Storage(format!("Failed to read fingerprint index: {}", e)))?
            {
                let mut issue_ids: Vec<Uuid> =
                    bincode::deserialize(&existing).unwrap_or_default();
                issue_ids.retain(|id| *id != issue.id);

                let serialized = bincode::serialize(&issue_ids).map_err(|e| {
                    AppError::Serialization(format!(
                        "Failed to serialize fingerprint index: {}",
                        e
                    ))
                })?;

                self.fingerprint_tree.insert(key, serialized).map_err(|e| {
                    AppError::Storage(format!("Failed to write fingerprint index: {}", e))
                })?;
            }
        }

        Ok(())
    }

    /// Iterate all stored issues
    fn scan_issues(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();

        for entry in self.issues_tree.iter() {
            let (_, bytes) =
                entry.map_err(|e| AppError::Storage(format!("Failed to scan issues: {}", e)))?;
            issues.push(Self::deserialize_issue(&bytes)?);
        }

        Ok(issues)
    }
}

#[async_trait]
impl IssueStore for SledStore {
    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        let key = Self::issue_key(&issue.id);
        let value = Self::serialize_issue(issue)?;

        self.issues_tree
            .insert(key, value)
            .map_err(|e| AppError::Storage(format!("Failed to save issue: {}", e)))?;

        self.update_fingerprint_index(issue)?;

        tracing::debug!(issue_id = %issue.id, "Issue saved to sled");
        Ok(())
    }

    async fn get_issue(&self, id: &Uuid) -> Result<Option<Issue>> {
        let key = Self::issue_key(id);

        match self
            .issues_tree
            .get(key)
            .map_err(|e| AppError::Storage(format!("Failed to read issue: {}", e)))?
        {
            Some(bytes) => Ok(Some(Self::deserialize_issue(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn update_issue(&self, issue: &Issue) -> Result<()> {
        let key = Self::issue_key(&issue.id);

        if !self
            .issues_tree
            .contains_key(&key)
            .map_err(|e| AppError::Storage(format!("Failed to check issue: {}", e)))?
        {
            return Err(AppError::NotFound(format!("Issue {} not found", issue.id)));
        }

        let value = Self::serialize_issue(issue)?;
        self.issues_tree
            .insert(key, value)
            .map_err(|e| AppError::Storage(format!("Failed to update issue: {}", e)))?;

        Ok(())
    }

    async fn delete_issue(&self, id: &Uuid) -> Result<()> {
        let key = Self::issue_key(id);

        match self
            .issues_tree
            .remove(key)
            .map_err(|e| AppError::Storage(format!("Failed to delete issue: {}", e)))?
        {
            Some(bytes) => {
                let issue = Self::deserialize_issue(&bytes)?;
                self.remove_from_fingerprint_index(&issue)?;
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Issue {} not found", id))),
        }
    }

    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .scan_issues()?
            .into_iter()
            .filter(|issue| filter.matches(issue))
            .collect();

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
            .scan_issues()?
            .iter()
            .filter(|issue| filter.matches(issue))
            .count();

        Ok(count as u64)
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<Issue>> {
        let key = fingerprint.as_bytes();

        let issue_ids: Vec<Uuid> = match self
            .fingerprint_tree
            .get(key)
            .map_err(|e| AppError::Storage(format!("Failed to read fingerprint index: {}", e)))?
        {
            Some(bytes) => bincode::deserialize(&bytes).unwrap_or_default(),
            None => return Ok(Vec::new()),
        };

        let mut issues = Vec::new();
        for id in issue_ids {
            if let Some(issue) = self.get_issue(&id).await? {
                issues.push(issue);
            }
        }

        Ok(issues)
    }

    async fn count_by_reporter(&self, reporter: &str) -> Result<u64> {
        let count = self
            .scan_issues()?
            .iter()
            .filter(|issue| issue.reported_by.as_deref() == Some(reporter))
            .count();

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Location, PriorityLevel};
    use tempfile::TempDir;

    fn test_issue() -> Issue {
        let mut issue = Issue::new(
            "Sled Test".to_string(),
            "Description".to_string(),
            Category::Water,
            PriorityLevel::High,
            Location {
                latitude: 12.9716,
                longitude: 77.5946,
                address: None,
            },
            Some("citizen-1".to_string()),
        );
        issue.fingerprint = Some(issue.generate_fingerprint());
        issue
    }

    #[tokio::test]
    async fn test_sled_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::new(dir.path()).unwrap();

        let issue = test_issue();
        let id = issue.id;

        store.save_issue(&issue).await.unwrap();

        let loaded = store.get_issue(&id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.category, Category::Water);
        assert_eq!(loaded.timeline.len(), 1);
    }

    #[tokio::test]
    async fn test_sled_fingerprint_lookup() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::new(dir.path()).unwrap();

        let issue = test_issue();
        store.save_issue(&issue).await.unwrap();

        let found = store
            .find_by_fingerprint(issue.fingerprint.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, issue.id);
    }

    #[tokio::test]
    async fn test_sled_delete_cleans_index() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::new(dir.path()).unwrap();

        let issue = test_issue();
        let fingerprint = issue.fingerprint.clone().unwrap();

        store.save_issue(&issue).await.unwrap();
        store.delete_issue(&issue.id).await.unwrap();

        assert!(store.get_issue(&issue.id).await.unwrap().is_none());
        assert!(store
            .find_by_fingerprint(&fingerprint)
            .await
            .unwrap()
            .is_empty());
    }
}
