use crate::classification::keywords::KeywordTable;
use crate::classification::models::ReportContext;
use crate::models::{Category, PriorityLevel};

/// Maps a classified report to a discrete priority level.
///
/// Deterministic for identical inputs: an additive score over category
/// weight, capped urgency, and contextual flags, bucketed by fixed
/// thresholds.
pub struct PriorityEngine {
    keywords: &'static KeywordTable,
}

impl PriorityEngine {
    pub fn new(keywords: &'static KeywordTable) -> Self {
        Self { keywords }
    }

    /// Decide the priority level for a report.
    ///
    /// `confidence` is accepted so a trained predictor can weight by it
    /// later without a signature change; the heuristic scoring ignores it.
    pub fn decide(
        &self,
        category: Category,
        _confidence: f64,
        text: Option<&str>,
        context: &ReportContext,
    ) -> PriorityLevel {
        let mut score = self.keywords.category_weight(category);

        if let Some(text) = text {
            let urgency = self.keywords.urgency_score(&text.to_lowercase());
            // Cap so a single alarmist report cannot dominate
            score += urgency.min(3);
        }

        if context.near_critical_infrastructure {
            score += 2;
        }

        if context.duplicate_reports > 3 {
            score += 1;
        }

        match score {
            s if s >= 7 => PriorityLevel::Critical,
            s if s >= 5 => PriorityLevel::High,
            s if s >= 3 => PriorityLevel::Medium,
            _ => PriorityLevel::Low,
        }
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::new(KeywordTable::builtin())
    }
}
