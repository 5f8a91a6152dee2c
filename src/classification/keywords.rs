use crate::models::Category;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Immutable keyword and weight tables driving the classification engine.
///
/// Loaded once at startup and passed by reference into the feature extractor
/// and priority engine. The lists are kept exactly as tuned in production;
/// priority thresholds assume these literal entries, overlaps and
/// singular/plural mismatches included ("dangerous" matches, "danger" does
/// not; "traffic light" also matches "traffic" and "light").
#[derive(Debug, Clone)]
pub struct KeywordTable {
    category_keywords: Vec<(Category, Vec<&'static str>)>,
    urgency_keywords: Vec<&'static str>,
    category_weights: HashMap<Category, u32>,
}

static BUILTIN: Lazy<KeywordTable> = Lazy::new(|| KeywordTable {
    category_keywords: vec![
        (
            Category::Pothole,
            vec!["pothole", "hole", "road damage", "crater", "pavement"],
        ),
        (
            Category::Streetlight,
            vec!["light", "lamp", "dark", "broken light", "streetlight"],
        ),
        (
            Category::Garbage,
            vec!["garbage", "trash", "waste", "litter", "dump", "smell"],
        ),
        (
            Category::Water,
            vec!["water", "leak", "pipe", "flooding", "burst"],
        ),
        (
            Category::Sewage,
            vec!["sewage", "drain", "sewer", "overflow", "blockage"],
        ),
        (
            Category::Traffic,
            vec!["signal", "traffic", "sign", "traffic light"],
        ),
    ],
    urgency_keywords: vec![
        "urgent",
        "emergency",
        "dangerous",
        "hazard",
        "immediate",
        "critical",
        "severe",
        "accident",
        "injury",
        "blocked",
    ],
    category_weights: HashMap::from([
        (Category::Sewage, 3),
        (Category::Water, 3),
        (Category::Pothole, 2),
        (Category::Traffic, 2),
        (Category::Streetlight, 1),
        (Category::Garbage, 1),
        (Category::Other, 1),
    ]),
});

impl KeywordTable {
    /// The process-wide builtin table
    pub fn builtin() -> &'static KeywordTable {
        &BUILTIN
    }

    /// Candidate categories with their keyword lists, in tie-break order
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[&'static str])> + '_ {
        self.category_keywords
            .iter()
            .map(|(c, kws)| (*c, kws.as_slice()))
    }

    /// Number of distinct list keywords present in `lower_text`
    /// (each keyword contributes at most 1, regardless of repetition)
    pub fn category_score(&self, category: Category, lower_text: &str) -> u32 {
        self.category_keywords
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, kws)| Self::presence_count(kws, lower_text))
            .unwrap_or(0)
    }

    /// Number of distinct urgency keywords present in `lower_text`
    pub fn urgency_score(&self, lower_text: &str) -> u32 {
        Self::presence_count(&self.urgency_keywords, lower_text)
    }

    /// Additive priority weight for a category (unmapped categories weigh 1)
    pub fn category_weight(&self, category: Category) -> u32 {
        self.category_weights.get(&category).copied().unwrap_or(1)
    }

    fn presence_count(keywords: &[&'static str], lower_text: &str) -> u32 {
        keywords
            .iter()
            .filter(|kw| lower_text.contains(*kw))
            .count() as u32
    }
}
