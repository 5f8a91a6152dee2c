use crate::models::{Category, PriorityLevel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An incoming citizen report, before classification and persistence
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueReport {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,

    /// Category chosen by the reporter; when absent the classifier decides
    pub category: Option<Category>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub address: Option<String>,

    /// Base64-encoded photo of the issue
    pub image_base64: Option<String>,

    /// Opaque reporter identifier
    pub reported_by: Option<String>,

    /// Set by the ingestion layer when the location falls near a school,
    /// hospital, or similar facility
    #[serde(default)]
    pub near_critical_infrastructure: bool,

    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

/// Acknowledgement returned to the reporter
#[derive(Debug, Clone, Serialize)]
pub struct ReportAck {
    pub issue_id: Uuid,
    pub category: Category,
    pub priority: PriorityLevel,
    pub confidence: f64,
    pub needs_review: bool,
    pub duplicate_reports: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_validation() {
        let report = IssueReport {
            title: "".to_string(),
            description: "desc".to_string(),
            category: None,
            latitude: 12.0,
            longitude: 77.0,
            address: None,
            image_base64: None,
            reported_by: None,
            near_critical_infrastructure: false,
            is_public: true,
        };

        assert!(report.validate().is_err());
    }

    #[test]
    fn test_latitude_bounds() {
        let report = IssueReport {
            title: "Pothole".to_string(),
            description: "desc".to_string(),
            category: None,
            latitude: 95.0,
            longitude: 77.0,
            address: None,
            image_base64: None,
            reported_by: None,
            near_critical_infrastructure: false,
            is_public: true,
        };

        assert!(report.validate().is_err());
    }
}
