//! Issue classification and prioritization engine
//!
//! Turns a raw citizen report (photo bytes, free-text description,
//! contextual metadata) into a structured decision: category, confidence,
//! and suggested priority. The pipeline is feature extraction ->
//! category prediction -> priority scoring, orchestrated by
//! [`ClassificationEngine`], which never fails outward: internal errors
//! degrade to a conservative default result.

pub mod engine;
pub mod features;
pub mod keywords;
pub mod models;
pub mod predictor;
pub mod priority;
pub mod rng;

pub use engine::ClassificationEngine;
pub use features::FeatureExtractor;
pub use keywords::KeywordTable;
pub use models::{
    ClassificationInput, ClassificationResult, FeatureBundle, ImageFeatures, MetadataFeatures,
    ReportContext, TextFeatures,
};
pub use predictor::{
    build_predictor, CategoryPrediction, CategoryPredictor, KeywordScoringPredictor,
    UniformRandomPredictor,
};
pub use priority::PriorityEngine;
pub use rng::{RandomSource, SeededRandom, ThreadRandom};
