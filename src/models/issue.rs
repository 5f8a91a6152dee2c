use crate::classification::ClassificationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// A citizen-reported civic issue
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Issue {
    /// Unique identifier
    pub id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Human-readable title
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Detailed description
    #[validate(length(min = 1, max = 2000))]
    pub description: String,

    /// Issue category
    pub category: Category,

    /// Current status
    pub status: IssueStatus,

    /// Priority level
    pub priority: PriorityLevel,

    /// Reported location
    pub location: Location,

    /// Opaque reporter identifier (auth lives outside this service)
    pub reported_by: Option<String>,

    /// Classification engine output, attached at submission time
    pub classification: Option<ClassificationResult>,

    /// Set when classification confidence fell below the review threshold
    pub needs_review: bool,

    /// Status transition history
    pub timeline: Vec<TimelineEvent>,

    /// Resolution details
    pub resolution: Option<Resolution>,

    /// Reporter ids that upvoted this issue
    pub upvotes: Vec<String>,

    /// Citizen comments
    pub comments: Vec<Comment>,

    /// Visible in public listings
    pub is_public: bool,

    /// Fingerprint for duplicate detection
    pub fingerprint: Option<String>,
}

impl Issue {
    /// Create a new issue
    pub fn new(
        title: String,
        description: String,
        category: Category,
        priority: PriorityLevel,
        location: Location,
        reported_by: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title,
            description,
            category,
            status: IssueStatus::New,
            priority,
            location,
            reported_by,
            classification: None,
            needs_review: false,
            timeline: vec![TimelineEvent {
                timestamp: now,
                status: IssueStatus::New,
                actor: "system".to_string(),
                notes: Some("Issue reported".to_string()),
            }],
            resolution: None,
            upvotes: Vec::new(),
            comments: Vec::new(),
            is_public: true,
            fingerprint: None,
        }
    }

    /// Update issue status, recording the transition in the timeline
    pub fn update_status(&mut self, new_status: IssueStatus, actor: String, notes: Option<String>) {
        self.status = new_status;
        self.updated_at = Utc::now();
        self.timeline.push(TimelineEvent {
            timestamp: self.updated_at,
            status: new_status,
            actor,
            notes,
        });
    }

    /// Resolve the issue
    pub fn resolve(&mut self, resolved_by: String, notes: String) {
        self.resolution = Some(Resolution {
            resolved_at: Utc::now(),
            resolved_by: resolved_by.clone(),
            notes,
        });
        self.update_status(IssueStatus::Resolved, resolved_by, None);
    }

    /// Check if the issue is still open (not resolved, closed, or rejected)
    pub fn is_open(&self) -> bool {
        !matches!(
            self.status,
            IssueStatus::Resolved | IssueStatus::Closed | IssueStatus::Rejected
        )
    }

    /// Resolution time in fractional days, if resolved
    pub fn resolution_days(&self) -> Option<f64> {
        self.resolution.as_ref().map(|r| {
            (r.resolved_at - self.created_at).num_seconds() as f64 / 86_400.0
        })
    }

    /// Toggle an upvote for the given reporter
    pub fn toggle_upvote(&mut self, reporter: String) -> bool {
        if let Some(pos) = self.upvotes.iter().position(|u| u == &reporter) {
            self.upvotes.remove(pos);
            false
        } else {
            self.upvotes.push(reporter);
            true
        }
    }

    /// Add a citizen comment
    pub fn add_comment(&mut self, author: String, text: String) {
        self.comments.push(Comment {
            author,
            text,
            created_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Generate fingerprint for duplicate detection
    ///
    /// Reports are grouped on a ~10 m location grid; the reporter-chosen
    /// category is deliberately excluded so that misfiled duplicates of the
    /// same physical problem still collapse together.
    pub fn generate_fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(format!("{:.4}", self.location.latitude).as_bytes());
        hasher.update(format!("{:.4}", self.location.longitude).as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

/// Fixed closed set of issue categories
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Pothole,
    Streetlight,
    Garbage,
    Water,
    Sewage,
    Traffic,
    Other,
}

impl Category {
    /// All categories, in declaration order
    pub const ALL: [Category; 7] = [
        Category::Pothole,
        Category::Streetlight,
        Category::Garbage,
        Category::Water,
        Category::Sewage,
        Category::Traffic,
        Category::Other,
    ];

    /// Categories the keyword predictor can produce (everything except
    /// `other`, which has no keyword list), in tie-break order
    pub const CANDIDATES: [Category; 6] = [
        Category::Pothole,
        Category::Streetlight,
        Category::Garbage,
        Category::Water,
        Category::Sewage,
        Category::Traffic,
    ];
}

/// Ordered priority levels: low < medium < high < critical
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueStatus {
    New,
    Approved,
    Rejected,
    Hold,
    Acknowledged,
    InProgress,
    Resolved,
    Closed,
}

/// Geographic location of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// A recorded status transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub timestamp: DateTime<Utc>,
    pub status: IssueStatus,
    pub actor: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved_at: DateTime<Utc>,
    pub resolved_by: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
