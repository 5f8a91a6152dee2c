use crate::classification::models::FeatureBundle;
use crate::classification::rng::RandomSource;
use crate::config::PredictorKind;
use crate::error::{AppError, Result};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A category prediction with self-reported confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category: Category,
    pub confidence: f64,
}

/// Capability for turning a feature bundle into a category prediction.
///
/// This is the seam where a trained model can replace the shipped
/// heuristics without touching callers. Implementations must be safe for
/// concurrent read-only use.
pub trait CategoryPredictor: Send + Sync {
    fn predict(&self, features: &FeatureBundle) -> Result<CategoryPrediction>;

    /// Implementation name, used in logs and metrics labels
    fn name(&self) -> &'static str;
}

/// Default predictor: picks the category with the highest keyword score.
///
/// Ties break toward the earlier category in declaration order; a winning
/// score of zero (or absent text features) is reported as an error so the
/// caller can fall back to the baseline predictor.
#[derive(Debug, Default, Clone)]
pub struct KeywordScoringPredictor;

impl CategoryPredictor for KeywordScoringPredictor {
    fn predict(&self, features: &FeatureBundle) -> Result<CategoryPrediction> {
        let text = features
            .text_features
            .as_ref()
            .ok_or_else(|| AppError::Classification("No text features".to_string()))?;

        let mut best: Option<(Category, u32)> = None;
        for category in Category::CANDIDATES {
            let score = text.category_scores.get(&category).copied().unwrap_or(0);
            // Strict comparison keeps the first-declared category on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((category, score));
            }
        }

        match best {
            Some((category, score)) if score > 0 => Ok(CategoryPrediction {
                category,
                confidence: (0.6 + score as f64 * 0.15).min(0.95),
            }),
            _ => Err(AppError::Classification(
                "No keyword signal in text".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "keyword_scoring"
    }
}

/// Baseline no-signal predictor: uniform category, confidence in [0.75, 1.0)
pub struct UniformRandomPredictor {
    rng: Arc<dyn RandomSource>,
}

impl UniformRandomPredictor {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

impl CategoryPredictor for UniformRandomPredictor {
    fn predict(&self, _features: &FeatureBundle) -> Result<CategoryPrediction> {
        let category = Category::ALL[self.rng.next_index(Category::ALL.len())];

        Ok(CategoryPrediction {
            category,
            confidence: 0.75 + self.rng.next_f64() * 0.25,
        })
    }

    fn name(&self) -> &'static str {
        "uniform_random"
    }
}

/// Build the primary predictor for a configured strategy
pub fn build_predictor(
    kind: &PredictorKind,
    rng: Arc<dyn RandomSource>,
) -> Arc<dyn CategoryPredictor> {
    match kind {
        PredictorKind::Keyword => Arc::new(KeywordScoringPredictor),
        PredictorKind::UniformRandom => Arc::new(UniformRandomPredictor::new(rng)),
    }
}
