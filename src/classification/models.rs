use crate::models::{Category, PriorityLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contextual metadata accompanying a report into the classifier.
///
/// All fields are optional signals; an empty context is valid input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportContext {
    /// Whether the report carries a location
    #[serde(default)]
    pub has_location: bool,

    /// Report timestamp as an ISO-8601 instant
    pub timestamp: Option<String>,

    /// Number of prior reports filed by the same reporter
    #[serde(default)]
    pub reporter_history: u32,

    /// Location falls near a school, hospital, or similar facility
    #[serde(default)]
    pub near_critical_infrastructure: bool,

    /// Recent open reports sharing this report's location fingerprint
    #[serde(default)]
    pub duplicate_reports: u32,
}

/// Features derived from the report photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageFeatures {
    pub dominant_colors: Vec<String>,
    pub brightness: f64,
    pub contrast: f64,
    pub has_hole: bool,
    pub has_water: bool,
    pub has_debris: bool,
}

/// Features derived from the report description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFeatures {
    pub length: usize,
    pub word_count: usize,
    /// Keyword hits per candidate category; `other` has no keyword list and
    /// never appears here. BTreeMap iteration follows category declaration
    /// order, which is also the predictor's tie-break order.
    pub category_scores: BTreeMap<Category, u32>,
    pub urgency_score: u32,
}

/// Features projected from report metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataFeatures {
    pub has_location: bool,
    pub time_of_day: Option<u32>,
    pub day_of_week: Option<u32>,
    pub reporter_history: u32,
}

/// Bundle of per-modality features; a missing modality yields `None`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureBundle {
    pub image_features: Option<ImageFeatures>,
    pub text_features: Option<TextFeatures>,
    pub metadata_features: Option<MetadataFeatures>,
}

impl FeatureBundle {
    /// True when no modality produced features
    pub fn is_empty(&self) -> bool {
        self.image_features.is_none()
            && self.text_features.is_none()
            && self.metadata_features.is_none()
    }
}

/// Output of the classification engine, stored as a sub-document of the issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f64,
    pub suggested_priority: PriorityLevel,
    pub processed_at: DateTime<Utc>,
    /// Omitted on pipeline failure
    pub features: Option<FeatureBundle>,
    /// Human-readable note set when the pipeline degraded
    pub error: Option<String>,
}

impl ClassificationResult {
    /// Degraded default returned when the pipeline fails internally
    pub fn degraded(error: String) -> Self {
        Self {
            category: Category::Other,
            confidence: 0.0,
            suggested_priority: PriorityLevel::Medium,
            processed_at: Utc::now(),
            features: None,
            error: Some(error),
        }
    }

    /// Whether this result should be routed to a human-review queue
    pub fn needs_review(&self, threshold: f64) -> bool {
        self.confidence < threshold
    }

    /// Whether the pipeline degraded while producing this result
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// One unit of work for batch classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationInput {
    pub image: Option<Vec<u8>>,
    pub text: Option<String>,
    pub context: ReportContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle() {
        let bundle = FeatureBundle::default();
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_degraded_result() {
        let result = ClassificationResult::degraded("boom".to_string());

        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.suggested_priority, PriorityLevel::Medium);
        assert!(result.features.is_none());
        assert!(result.is_degraded());
        assert!(result.needs_review(0.7));
    }

    #[test]
    fn test_category_scores_iterate_in_declaration_order() {
        let mut scores = BTreeMap::new();
        // Insert out of order
        scores.insert(Category::Traffic, 1);
        scores.insert(Category::Pothole, 1);
        scores.insert(Category::Water, 1);

        let order: Vec<Category> = scores.keys().copied().collect();
        assert_eq!(
            order,
            vec![Category::Pothole, Category::Water, Category::Traffic]
        );
    }
}
