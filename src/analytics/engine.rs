use crate::analytics::statistics::{Distribution, Percentiles};
use crate::error::Result;
use crate::models::{Category, Issue, IssueStatus, PriorityLevel};
use crate::state::{IssueFilter, IssueStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

const SCAN_PAGE_SIZE: u32 = 500;

/// Analytics over the issue store
pub struct AnalyticsEngine {
    store: Arc<dyn IssueStore>,
}

/// Overall system statistics
#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
    pub total: u64,
    pub by_status: HashMap<IssueStatus, u64>,
    pub by_category: HashMap<Category, u64>,
    pub by_priority: HashMap<PriorityLevel, u64>,
    pub avg_resolution_days: f64,
    pub needs_review: u64,
}

/// Per-category resolution time statistics
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionStats {
    pub distribution: Distribution,
    pub percentiles: Percentiles,
}

/// Activity summary for a single day
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub issues_created: u64,
    pub issues_resolved: u64,
    pub by_category: HashMap<Category, u64>,
    pub high_priority: u64,
}

/// A weighted point for the geographic heatmap
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub intensity: f64,
    pub category: Category,
    pub status: IssueStatus,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    /// Load every stored issue, page by page
    async fn scan_all(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut page = 0;

        loop {
            let batch = self
                .store
                .list_issues(&IssueFilter::default(), page, SCAN_PAGE_SIZE)
                .await?;
            let done = (batch.len() as u32) < SCAN_PAGE_SIZE;
            issues.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        Ok(issues)
    }

    /// Overall counts and averages across all issues
    pub async fn overall_stats(&self) -> Result<OverallStats> {
        let issues = self.scan_all().await?;

        let mut by_status: HashMap<IssueStatus, u64> = HashMap::new();
        let mut by_category: HashMap<Category, u64> = HashMap::new();
        let mut by_priority: HashMap<PriorityLevel, u64> = HashMap::new();
        let mut resolution_days = Vec::new();
        let mut needs_review = 0;

        for issue in &issues {
            *by_status.entry(issue.status).or_insert(0) += 1;
            *by_category.entry(issue.category).or_insert(0) += 1;
            *by_priority.entry(issue.priority).or_insert(0) += 1;

            if let Some(days) = issue.resolution_days() {
                resolution_days.push(days);
            }
            if issue.needs_review {
                needs_review += 1;
            }
        }

        let avg_resolution_days = if resolution_days.is_empty() {
            0.0
        } else {
            resolution_days.iter().sum::<f64>() / resolution_days.len() as f64
        };

        Ok(OverallStats {
            total: issues.len() as u64,
            by_status,
            by_category,
            by_priority,
            avg_resolution_days,
            needs_review,
        })
    }

    /// Resolution time statistics per category (resolved issues only)
    pub async fn resolution_stats(&self) -> Result<HashMap<Category, ResolutionStats>> {
        let issues = self.scan_all().await?;

        let mut per_category: HashMap<Category, Vec<f64>> = HashMap::new();
        for issue in &issues {
            if let Some(days) = issue.resolution_days() {
                per_category.entry(issue.category).or_default().push(days);
            }
        }

        let mut stats = HashMap::new();
        for (category, days) in per_category {
            stats.insert(
                category,
                ResolutionStats {
                    distribution: Distribution::from_data(&days)?,
                    percentiles: Percentiles::from_data(days),
                },
            );
        }

        Ok(stats)
    }

    /// Activity summary for the given day
    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        let issues = self.scan_all().await?;

        let on_day = |ts: &DateTime<Utc>| ts.date_naive() == date;

        let mut by_category: HashMap<Category, u64> = HashMap::new();
        let mut created = 0;
        let mut resolved = 0;
        let mut high_priority = 0;

        for issue in &issues {
            if on_day(&issue.created_at) {
                created += 1;
                *by_category.entry(issue.category).or_insert(0) += 1;
                if issue.priority >= PriorityLevel::High {
                    high_priority += 1;
                }
            }
            if let Some(ref resolution) = issue.resolution {
                if on_day(&resolution.resolved_at) {
                    resolved += 1;
                }
            }
        }

        Ok(DailyReport {
            date,
            issues_created: created,
            issues_resolved: resolved,
            by_category,
            high_priority,
        })
    }

    /// Weighted points for the geographic heatmap
    pub async fn heatmap(&self) -> Result<Vec<HeatmapPoint>> {
        let issues = self.scan_all().await?;

        Ok(issues
            .iter()
            .map(|issue| HeatmapPoint {
                latitude: issue.location.latitude,
                longitude: issue.location.longitude,
                intensity: Self::intensity(issue),
                category: issue.category,
                status: issue.status,
            })
            .collect())
    }

    /// Heatmap intensity: priority weight scaled by status weight
    fn intensity(issue: &Issue) -> f64 {
        let priority_weight = match issue.priority {
            PriorityLevel::Critical => 1.0,
            PriorityLevel::High => 0.8,
            PriorityLevel::Medium => 0.5,
            PriorityLevel::Low => 0.3,
        };

        let status_weight = match issue.status {
            IssueStatus::New => 1.0,
            IssueStatus::Acknowledged => 0.8,
            IssueStatus::InProgress => 0.6,
            IssueStatus::Resolved => 0.2,
            IssueStatus::Closed => 0.1,
            _ => 0.5,
        };

        priority_weight * status_weight
    }
}
