pub mod issue;
pub mod report;

pub use issue::{
    Category, Comment, Issue, IssueStatus, Location, PriorityLevel, Resolution, TimelineEvent,
};
pub use report::{IssueReport, ReportAck};
