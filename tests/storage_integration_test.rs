/// Integration tests for storage backends
///
/// Exercises the IssueStore contract against both implementations:
/// the in-memory store and the sled-backed persistent store.

use civic_issue_manager::{
    models::{Category, Issue, IssueStatus, Location, PriorityLevel},
    state::{InMemoryStore, IssueFilter, IssueStore, SledStore},
};
use std::sync::Arc;
use tempfile::TempDir;

fn sample_issue(category: Category, reporter: &str) -> Issue {
    let mut issue = Issue::new(
        format!("{} issue", category),
        "Integration test issue".to_string(),
        category,
        PriorityLevel::Medium,
        Location {
            latitude: 12.9716,
            longitude: 77.5946,
            address: None,
        },
        Some(reporter.to_string()),
    );
    issue.fingerprint = Some(issue.generate_fingerprint());
    issue
}

async fn exercise_store(store: Arc<dyn IssueStore>) {
    let issue = sample_issue(Category::Pothole, "citizen-1");
    let id = issue.id;

    // Save and load
    store.save_issue(&issue).await.unwrap();
    let loaded = store.get_issue(&id).await.unwrap().unwrap();
    assert_eq!(loaded.title, issue.title);
    assert_eq!(loaded.category, Category::Pothole);

    // Update
    let mut updated = loaded;
    updated.update_status(IssueStatus::Acknowledged, "admin".to_string(), None);
    store.update_issue(&updated).await.unwrap();
    let loaded = store.get_issue(&id).await.unwrap().unwrap();
    assert_eq!(loaded.status, IssueStatus::Acknowledged);
    assert_eq!(loaded.timeline.len(), 2);

    // Fingerprint lookup
    let same_spot = sample_issue(Category::Garbage, "citizen-2");
    store.save_issue(&same_spot).await.unwrap();
    let found = store
        .find_by_fingerprint(issue.fingerprint.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    // Filtering
    let filter = IssueFilter {
        categories: vec![Category::Garbage],
        ..Default::default()
    };
    assert_eq!(store.count_issues(&filter).await.unwrap(), 1);

    // Reporter counting
    assert_eq!(store.count_by_reporter("citizen-1").await.unwrap(), 1);
    assert_eq!(store.count_by_reporter("citizen-2").await.unwrap(), 1);

    // Delete
    store.delete_issue(&id).await.unwrap();
    assert!(store.get_issue(&id).await.unwrap().is_none());
    assert!(store.delete_issue(&id).await.is_err());
}

#[tokio::test]
async fn test_in_memory_store_contract() {
    exercise_store(Arc::new(InMemoryStore::new())).await;
}

#[tokio::test]
async fn test_sled_store_contract() {
    let dir = TempDir::new().unwrap();
    exercise_store(Arc::new(SledStore::new(dir.path()).unwrap())).await;
}

#[tokio::test]
async fn test_sled_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let issue = sample_issue(Category::Water, "citizen-1");
    let id = issue.id;

    {
        let store = SledStore::new(dir.path()).unwrap();
        store.save_issue(&issue).await.unwrap();
        // store (and its sled handle) dropped here
    }

    let store = SledStore::new(dir.path()).unwrap();
    let loaded = store.get_issue(&id).await.unwrap().unwrap();
    assert_eq!(loaded.category, Category::Water);

    let found = store
        .find_by_fingerprint(issue.fingerprint.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_classification_subdocument_round_trips() {
    use civic_issue_manager::classification::{ClassificationEngine, ReportContext};
    use civic_issue_manager::config::ClassificationSettings;

    let dir = TempDir::new().unwrap();
    let store = SledStore::new(dir.path()).unwrap();

    let engine = ClassificationEngine::new(&ClassificationSettings {
        rng_seed: Some(42),
        ..Default::default()
    });

    let mut issue = sample_issue(Category::Other, "citizen-1");
    let result = engine.classify(
        None,
        Some("streetlight lamp is dark"),
        &ReportContext::default(),
    );
    issue.classification = Some(result);

    store.save_issue(&issue).await.unwrap();

    let loaded = store.get_issue(&issue.id).await.unwrap().unwrap();
    let classification = loaded.classification.unwrap();

    assert_eq!(classification.category, Category::Streetlight);
    assert!(classification.features.is_some());
    let text = classification.features.unwrap().text_features.unwrap();
    // light, lamp, dark, streetlight all match
    assert_eq!(text.category_scores[&Category::Streetlight], 4);
}
