//! Analytics over stored issues: overall statistics, resolution times,
//! daily reports, and heatmap data.

pub mod engine;
pub mod statistics;

pub use engine::{AnalyticsEngine, DailyReport, HeatmapPoint, OverallStats, ResolutionStats};
pub use statistics::{Distribution, Percentiles};
