use crate::classification::features::FeatureExtractor;
use crate::classification::keywords::KeywordTable;
use crate::classification::models::{
    ClassificationInput, ClassificationResult, ReportContext,
};
use crate::classification::predictor::{
    build_predictor, CategoryPredictor, UniformRandomPredictor,
};
use crate::classification::priority::PriorityEngine;
use crate::classification::rng::{RandomSource, SeededRandom, ThreadRandom};
use crate::config::ClassificationSettings;
use crate::error::Result;
use chrono::Utc;
use std::sync::Arc;

/// Public entry point of the classification pipeline.
///
/// Runs feature extraction, category prediction, and priority scoring, and
/// assembles the result record. Stateless between calls; safe to share
/// behind an `Arc` and invoke concurrently.
pub struct ClassificationEngine {
    extractor: FeatureExtractor,
    primary: Arc<dyn CategoryPredictor>,
    fallback: UniformRandomPredictor,
    priority: PriorityEngine,
    confidence_threshold: f64,
}

impl ClassificationEngine {
    /// Build an engine from configuration
    pub fn new(settings: &ClassificationSettings) -> Self {
        let rng: Arc<dyn RandomSource> = match settings.rng_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };

        Self::with_predictor(settings, build_predictor(&settings.predictor, rng.clone()), rng)
    }

    /// Build an engine around a custom predictor (e.g. a trained model)
    pub fn with_predictor(
        settings: &ClassificationSettings,
        primary: Arc<dyn CategoryPredictor>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        let keywords = KeywordTable::builtin();

        Self {
            extractor: FeatureExtractor::new(keywords, rng.clone()),
            primary,
            fallback: UniformRandomPredictor::new(rng),
            priority: PriorityEngine::new(keywords),
            confidence_threshold: settings.confidence_threshold,
        }
    }

    /// Classify a single report. Never fails: any internal error surfaces as
    /// the degraded-default result carrying an error note.
    pub fn classify(
        &self,
        image_bytes: Option<&[u8]>,
        text: Option<&str>,
        context: &ReportContext,
    ) -> ClassificationResult {
        let timer = crate::metrics::CLASSIFICATION_DURATION_SECONDS.start_timer();

        let result = match self.classify_inner(image_bytes, text, context) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Classification pipeline failed, degrading");
                crate::metrics::CLASSIFICATIONS_TOTAL
                    .with_label_values(&["degraded"])
                    .inc();
                ClassificationResult::degraded(e.to_string())
            }
        };

        timer.observe_duration();
        result
    }

    fn classify_inner(
        &self,
        image_bytes: Option<&[u8]>,
        text: Option<&str>,
        context: &ReportContext,
    ) -> Result<ClassificationResult> {
        let features = self.extractor.extract(image_bytes, text, Some(context));

        let prediction = match self.primary.predict(&features) {
            Ok(prediction) => {
                crate::metrics::CLASSIFICATIONS_TOTAL
                    .with_label_values(&[self.primary.name()])
                    .inc();
                prediction
            }
            Err(e) => {
                tracing::debug!(
                    predictor = self.primary.name(),
                    error = %e,
                    "Primary predictor produced no signal, using baseline"
                );
                crate::metrics::CLASSIFICATIONS_TOTAL
                    .with_label_values(&["fallback"])
                    .inc();
                self.fallback.predict(&features)?
            }
        };

        let suggested_priority =
            self.priority
                .decide(prediction.category, prediction.confidence, text, context);

        tracing::debug!(
            category = %prediction.category,
            confidence = prediction.confidence,
            priority = %suggested_priority,
            "Report classified"
        );

        Ok(ClassificationResult {
            category: prediction.category,
            confidence: prediction.confidence,
            suggested_priority,
            processed_at: Utc::now(),
            features: Some(features),
            error: None,
        })
    }

    /// Classify a batch of reports, preserving input order.
    ///
    /// One result per input; a failure in one item degrades that item only.
    pub fn classify_batch(&self, inputs: &[ClassificationInput]) -> Vec<ClassificationResult> {
        inputs
            .iter()
            .map(|input| {
                self.classify(
                    input.image.as_deref(),
                    input.text.as_deref(),
                    &input.context,
                )
            })
            .collect()
    }

    /// Results below this confidence should be routed for manual review
    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(&ClassificationSettings::default())
    }
}
