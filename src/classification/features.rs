use crate::classification::keywords::KeywordTable;
use crate::classification::models::{
    FeatureBundle, ImageFeatures, MetadataFeatures, ReportContext, TextFeatures,
};
use crate::classification::rng::RandomSource;
use crate::error::{AppError, Result};
use chrono::{DateTime, Datelike, Timelike};
use image::imageops::FilterType;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Canonical model input size; any future vision model plugged into the
/// predictor seam expects 224x224 normalized intensity input.
const MODEL_INPUT_SIZE: u32 = 224;

/// Feature extractor for citizen reports.
///
/// Turns raw image bytes, free-text description, and contextual metadata into
/// three independent feature sub-bundles. A sub-extractor failure is logged
/// and yields a missing sub-bundle; extraction as a whole never fails.
pub struct FeatureExtractor {
    keywords: &'static KeywordTable,
    rng: Arc<dyn RandomSource>,
}

impl FeatureExtractor {
    pub fn new(keywords: &'static KeywordTable, rng: Arc<dyn RandomSource>) -> Self {
        Self { keywords, rng }
    }

    /// Extract features from whatever modalities are present
    pub fn extract(
        &self,
        image_bytes: Option<&[u8]>,
        text: Option<&str>,
        context: Option<&ReportContext>,
    ) -> FeatureBundle {
        let mut bundle = FeatureBundle::default();

        if let Some(bytes) = image_bytes {
            match self.extract_image_features(bytes) {
                Ok(features) => bundle.image_features = Some(features),
                Err(e) => {
                    tracing::warn!(error = %e, "Image feature extraction failed");
                }
            }
        }

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            bundle.text_features = Some(self.extract_text_features(text));
        }

        if let Some(context) = context {
            bundle.metadata_features = Some(self.extract_metadata_features(context));
        }

        bundle
    }

    /// Extract features from the report photo.
    ///
    /// The resize-and-normalize preprocessing is the contract a real vision
    /// model would rely on; the derived record is the placeholder shape that
    /// model's outputs would fill. Scene booleans come from the injected
    /// random source until a trained predictor replaces them.
    fn extract_image_features(&self, bytes: &[u8]) -> Result<ImageFeatures> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AppError::Classification(format!("Failed to decode image: {}", e)))?;

        let resized = img.resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Triangle);
        let gray = resized.to_luma8();
        let pixels = gray.as_raw();

        let (min, max) = pixels
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let range = max.saturating_sub(min).max(1) as f64;

        // Min-max intensity normalization to [0, 1]
        let sum: f64 = pixels.iter().map(|&p| (p - min) as f64 / range).sum();
        let brightness = sum / pixels.len() as f64;
        let contrast = (max - min) as f64 / 255.0;

        Ok(ImageFeatures {
            dominant_colors: vec!["gray".to_string(), "black".to_string()],
            brightness,
            contrast,
            has_hole: self.rng.next_f64() > 0.5,
            has_water: self.rng.next_f64() > 0.7,
            has_debris: self.rng.next_f64() > 0.6,
        })
    }

    /// Extract features from the report description
    fn extract_text_features(&self, text: &str) -> TextFeatures {
        let lower = text.to_lowercase();

        let mut category_scores = BTreeMap::new();
        for (category, _) in self.keywords.categories() {
            category_scores.insert(category, self.keywords.category_score(category, &lower));
        }

        TextFeatures {
            length: text.chars().count(),
            word_count: text.split_whitespace().count(),
            category_scores,
            urgency_score: self.keywords.urgency_score(&lower),
        }
    }

    /// Project metadata into features; pure, never fails
    fn extract_metadata_features(&self, context: &ReportContext) -> MetadataFeatures {
        let parsed = context.timestamp.as_deref().and_then(|ts| {
            match DateTime::parse_from_rfc3339(ts) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    tracing::debug!(timestamp = ts, error = %e, "Unparseable report timestamp");
                    None
                }
            }
        });

        MetadataFeatures {
            has_location: context.has_location,
            time_of_day: parsed.map(|dt| dt.hour()),
            day_of_week: parsed.map(|dt| dt.weekday().num_days_from_sunday()),
            reporter_history: context.reporter_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::rng::SeededRandom;
    use crate::models::Category;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(KeywordTable::builtin(), Arc::new(SeededRandom::new(42)))
    }

    #[test]
    fn test_all_modalities_absent() {
        let bundle = extractor().extract(None, None, None);
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_empty_text_yields_no_text_features() {
        let bundle = extractor().extract(None, Some(""), None);
        assert!(bundle.text_features.is_none());
    }

    #[test]
    fn test_text_features_are_deterministic() {
        let extractor = extractor();
        let text = "There is a large pothole causing danger, urgent repair needed";

        let a = extractor.extract(None, Some(text), None);
        let b = extractor.extract(None, Some(text), None);

        assert_eq!(a.text_features, b.text_features);

        let features = a.text_features.unwrap();
        assert!(features.category_scores[&Category::Pothole] >= 1);
        // "urgent" matches; "danger" is not in the urgency list ("dangerous" is)
        assert_eq!(features.urgency_score, 1);
        assert_eq!(features.word_count, 10);
    }

    #[test]
    fn test_category_scores_cover_all_candidates() {
        let bundle = extractor().extract(None, Some("everything is fine"), None);
        let features = bundle.text_features.unwrap();

        assert_eq!(features.category_scores.len(), Category::CANDIDATES.len());
        assert!(!features.category_scores.contains_key(&Category::Other));
    }

    #[test]
    fn test_malformed_image_recovers_to_none() {
        let bundle = extractor().extract(Some(b"not an image"), Some("trash pile"), None);

        assert!(bundle.image_features.is_none());
        assert!(bundle.text_features.is_some());
    }

    #[test]
    fn test_valid_image_produces_features() {
        // Minimal 2x2 gray PNG generated with the image crate
        let mut png = Vec::new();
        let img = image::GrayImage::from_fn(2, 2, |x, y| image::Luma([(x * 100 + y * 50) as u8]));
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let bundle = extractor().extract(Some(&png), None, None);
        let features = bundle.image_features.unwrap();

        assert!((0.0..=1.0).contains(&features.brightness));
        assert!((0.0..=1.0).contains(&features.contrast));
        assert_eq!(features.dominant_colors, vec!["gray", "black"]);
    }

    #[test]
    fn test_metadata_projection() {
        let context = ReportContext {
            has_location: true,
            timestamp: Some("2024-03-12T14:30:00+00:00".to_string()),
            reporter_history: 5,
            near_critical_infrastructure: false,
            duplicate_reports: 0,
        };

        let bundle = extractor().extract(None, None, Some(&context));
        let features = bundle.metadata_features.unwrap();

        assert!(features.has_location);
        assert_eq!(features.time_of_day, Some(14));
        // 2024-03-12 is a Tuesday
        assert_eq!(features.day_of_week, Some(2));
        assert_eq!(features.reporter_history, 5);
    }

    #[test]
    fn test_malformed_timestamp_leaves_time_fields_absent() {
        let context = ReportContext {
            has_location: false,
            timestamp: Some("not-a-timestamp".to_string()),
            reporter_history: 1,
            near_critical_infrastructure: false,
            duplicate_reports: 0,
        };

        let bundle = extractor().extract(None, None, Some(&context));
        let features = bundle.metadata_features.unwrap();

        assert_eq!(features.time_of_day, None);
        assert_eq!(features.day_of_week, None);
        assert_eq!(features.reporter_history, 1);
    }
}
