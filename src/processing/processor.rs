use crate::classification::{ClassificationEngine, ClassificationInput, ReportContext};
use crate::error::{AppError, Result};
use crate::models::{Issue, IssueReport, IssueStatus, Location, ReportAck};
use crate::processing::DuplicateDetector;
use crate::realtime::{EventBroadcaster, IssueEvent};
use crate::state::{IssueFilter, IssueStore};
use base64ct::{Base64, Encoding};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Main issue processor: runs the submission pipeline and lifecycle updates
pub struct IssueProcessor {
    store: Arc<dyn IssueStore>,
    duplicate_detector: Arc<DuplicateDetector>,
    engine: Arc<ClassificationEngine>,
    broadcaster: Option<Arc<EventBroadcaster>>,
}

impl IssueProcessor {
    pub fn new(
        store: Arc<dyn IssueStore>,
        duplicate_detector: Arc<DuplicateDetector>,
        engine: Arc<ClassificationEngine>,
    ) -> Self {
        Self {
            store,
            duplicate_detector,
            engine,
            broadcaster: None,
        }
    }

    /// Get a reference to the issue store
    pub fn store(&self) -> &Arc<dyn IssueStore> {
        &self.store
    }

    /// Set the event broadcaster after construction
    pub fn set_broadcaster(&mut self, broadcaster: Arc<EventBroadcaster>) {
        self.broadcaster = Some(broadcaster);
    }

    fn publish(&self, event: IssueEvent) {
        if let Some(ref broadcaster) = self.broadcaster {
            broadcaster.publish(event);
        }
    }

    /// Process a citizen report: classify, persist, publish.
    ///
    /// Classification degradation never fails the submission; the issue is
    /// stored with the degraded result and flagged for manual review.
    pub async fn submit_report(&self, report: IssueReport) -> Result<ReportAck> {
        report.validate()?;

        let image_bytes = match report.image_base64 {
            Some(ref encoded) => Some(Base64::decode_vec(encoded).map_err(|e| {
                AppError::Validation(format!("Invalid image payload: {}", e))
            })?),
            None => None,
        };

        let mut issue = Issue::new(
            report.title,
            report.description.clone(),
            report.category.unwrap_or(crate::models::Category::Other),
            crate::models::PriorityLevel::Medium,
            Location {
                latitude: report.latitude,
                longitude: report.longitude,
                address: report.address,
            },
            report.reported_by.clone(),
        );
        issue.is_public = report.is_public;
        let fingerprint = issue.generate_fingerprint();
        issue.fingerprint = Some(fingerprint.clone());

        // Gather classification context
        let reporter_history = match report.reported_by {
            Some(ref reporter) => self.store.count_by_reporter(reporter).await? as u32,
            None => 0,
        };
        let duplicate_reports = self
            .duplicate_detector
            .count_recent_duplicates(&fingerprint, Some(issue.id))
            .await?;

        let context = ReportContext {
            has_location: true,
            timestamp: Some(issue.created_at.to_rfc3339()),
            reporter_history,
            near_critical_infrastructure: report.near_critical_infrastructure,
            duplicate_reports,
        };

        let classification =
            self.engine
                .classify(image_bytes.as_deref(), Some(&report.description), &context);

        // The classifier decides the category when the reporter did not
        if report.category.is_none() {
            issue.category = classification.category;
        }
        issue.priority = classification.suggested_priority;
        issue.needs_review = classification.needs_review(self.engine.confidence_threshold());

        if issue.needs_review {
            crate::metrics::LOW_CONFIDENCE_TOTAL.inc();
        }

        let degraded_error = classification.error.clone();
        let confidence = classification.confidence;
        issue.classification = Some(classification);

        self.store.save_issue(&issue).await?;

        crate::metrics::REPORTS_SUBMITTED_TOTAL
            .with_label_values(&[&issue.category.to_string()])
            .inc();

        tracing::info!(
            issue_id = %issue.id,
            category = %issue.category,
            priority = %issue.priority,
            confidence = confidence,
            duplicate_reports = duplicate_reports,
            needs_review = issue.needs_review,
            "Issue report processed"
        );

        self.publish(IssueEvent::IssueCreated {
            issue: issue.clone(),
        });
        if let Some(error) = degraded_error {
            self.publish(IssueEvent::ClassificationDegraded {
                issue_id: issue.id,
                error,
            });
        }

        Ok(ReportAck {
            issue_id: issue.id,
            category: issue.category,
            priority: issue.priority,
            confidence,
            needs_review: issue.needs_review,
            duplicate_reports,
        })
    }

    /// Get an issue by ID
    pub async fn get_issue(&self, id: &Uuid) -> Result<Issue> {
        self.store
            .get_issue(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))
    }

    /// Update issue status
    pub async fn update_status(
        &self,
        id: &Uuid,
        new_status: IssueStatus,
        actor: String,
        notes: Option<String>,
    ) -> Result<Issue> {
        let mut issue = self.get_issue(id).await?;

        issue.update_status(new_status, actor.clone(), notes);
        self.store.update_issue(&issue).await?;

        crate::metrics::STATUS_TRANSITIONS_TOTAL
            .with_label_values(&[&new_status.to_string()])
            .inc();

        tracing::info!(
            issue_id = %id,
            status = %new_status,
            "Issue status updated"
        );

        self.publish(IssueEvent::StatusChanged {
            issue_id: issue.id,
            status: new_status,
            actor,
        });

        Ok(issue)
    }

    /// Resolve an issue
    pub async fn resolve_issue(
        &self,
        id: &Uuid,
        resolved_by: String,
        notes: String,
    ) -> Result<Issue> {
        let mut issue = self.get_issue(id).await?;

        if !issue.is_open() {
            return Err(AppError::InvalidStateTransition(format!(
                "Issue {} is already {}",
                id, issue.status
            )));
        }

        issue.resolve(resolved_by, notes);
        self.store.update_issue(&issue).await?;

        tracing::info!(issue_id = %id, "Issue resolved");

        self.publish(IssueEvent::IssueResolved { issue_id: issue.id });

        Ok(issue)
    }

    /// Toggle an upvote on an issue
    pub async fn toggle_upvote(&self, id: &Uuid, reporter: String) -> Result<(Issue, bool)> {
        let mut issue = self.get_issue(id).await?;

        let upvoted = issue.toggle_upvote(reporter);
        self.store.update_issue(&issue).await?;

        self.publish(IssueEvent::IssueUpvoted {
            issue_id: issue.id,
            upvotes: issue.upvotes.len(),
        });

        Ok((issue, upvoted))
    }

    /// Add a comment to an issue
    pub async fn add_comment(&self, id: &Uuid, author: String, text: String) -> Result<Issue> {
        let mut issue = self.get_issue(id).await?;

        issue.add_comment(author, text);
        self.store.update_issue(&issue).await?;

        Ok(issue)
    }

    /// Re-run classification over stored issues.
    ///
    /// Stored issues carry no image bytes (media lives in external storage),
    /// so re-classification uses description and refreshed context only.
    /// Returns the number of issues whose classification was updated.
    pub async fn reclassify_all(&self) -> Result<usize> {
        let mut updated = 0;
        let mut page = 0;
        const PAGE_SIZE: u32 = 200;

        loop {
            let issues = self
                .store
                .list_issues(&IssueFilter::default(), page, PAGE_SIZE)
                .await?;
            if issues.is_empty() {
                break;
            }

            let mut inputs = Vec::with_capacity(issues.len());
            for issue in &issues {
                let duplicate_reports = match issue.fingerprint {
                    Some(ref fingerprint) => {
                        self.duplicate_detector
                            .count_recent_duplicates(fingerprint, Some(issue.id))
                            .await?
                    }
                    None => 0,
                };
                let reporter_history = match issue.reported_by {
                    Some(ref reporter) => self.store.count_by_reporter(reporter).await? as u32,
                    None => 0,
                };

                inputs.push(ClassificationInput {
                    image: None,
                    text: Some(issue.description.clone()),
                    context: ReportContext {
                        has_location: true,
                        timestamp: Some(issue.created_at.to_rfc3339()),
                        reporter_history,
                        near_critical_infrastructure: false,
                        duplicate_reports,
                    },
                });
            }

            let results = self.engine.classify_batch(&inputs);

            for (issue, result) in issues.into_iter().zip(results) {
                let mut issue = issue;
                issue.needs_review = result.needs_review(self.engine.confidence_threshold());
                issue.classification = Some(result);
                issue.updated_at = Utc::now();
                self.store.update_issue(&issue).await?;
                updated += 1;
            }

            page += 1;
        }

        tracing::info!(updated = updated, "Batch re-classification completed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationSettings;
    use crate::models::Category;
    use crate::state::InMemoryStore;

    fn processor() -> IssueProcessor {
        let store: Arc<dyn IssueStore> = Arc::new(InMemoryStore::new());
        let detector = Arc::new(DuplicateDetector::new(store.clone(), 86_400));
        let engine = Arc::new(ClassificationEngine::new(&ClassificationSettings {
            rng_seed: Some(42),
            ..Default::default()
        }));

        IssueProcessor::new(store, detector, engine)
    }

    fn report(description: &str) -> IssueReport {
        IssueReport {
            title: "Report".to_string(),
            description: description.to_string(),
            category: None,
            latitude: 12.9716,
            longitude: 77.5946,
            address: None,
            image_base64: None,
            reported_by: Some("citizen-1".to_string()),
            near_critical_infrastructure: false,
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_submit_report_classifies_and_persists() {
        let processor = processor();

        let ack = processor
            .submit_report(report("Overflowing sewage drain near the market"))
            .await
            .unwrap();

        assert_eq!(ack.category, Category::Sewage);
        assert!(!ack.needs_review);

        let issue = processor.get_issue(&ack.issue_id).await.unwrap();
        assert_eq!(issue.category, Category::Sewage);
        assert!(issue.classification.is_some());
        assert!(issue.fingerprint.is_some());
    }

    #[tokio::test]
    async fn test_reporter_category_wins_over_prediction() {
        let processor = processor();

        let mut r = report("Overflowing sewage drain");
        r.category = Some(Category::Garbage);

        let ack = processor.submit_report(r).await.unwrap();
        assert_eq!(ack.category, Category::Garbage);
    }

    #[tokio::test]
    async fn test_duplicate_count_rises_with_repeat_reports() {
        let processor = processor();

        let first = processor
            .submit_report(report("water pipe burst"))
            .await
            .unwrap();
        assert_eq!(first.duplicate_reports, 0);

        let second = processor
            .submit_report(report("water pipe burst again"))
            .await
            .unwrap();
        assert_eq!(second.duplicate_reports, 1);
    }

    #[tokio::test]
    async fn test_invalid_image_payload_is_rejected() {
        let processor = processor();

        let mut r = report("trash pile");
        r.image_base64 = Some("!!!not-base64!!!".to_string());

        assert!(processor.submit_report(r).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_twice_is_a_conflict() {
        let processor = processor();

        let ack = processor.submit_report(report("pothole")).await.unwrap();

        processor
            .resolve_issue(&ack.issue_id, "admin".to_string(), "patched".to_string())
            .await
            .unwrap();

        let again = processor
            .resolve_issue(&ack.issue_id, "admin".to_string(), "patched".to_string())
            .await;
        assert!(matches!(again, Err(AppError::InvalidStateTransition(_))));
    }

    #[tokio::test]
    async fn test_reclassify_all_updates_classification() {
        let processor = processor();

        processor
            .submit_report(report("broken streetlight on 5th"))
            .await
            .unwrap();
        processor
            .submit_report(report("garbage dump behind school"))
            .await
            .unwrap();

        let updated = processor.reclassify_all().await.unwrap();
        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_status_update_records_timeline() {
        let processor = processor();

        let ack = processor.submit_report(report("pothole")).await.unwrap();
        let issue = processor
            .update_status(
                &ack.issue_id,
                IssueStatus::Acknowledged,
                "admin".to_string(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(issue.status, IssueStatus::Acknowledged);
        assert_eq!(issue.timeline.len(), 2);
    }
}
