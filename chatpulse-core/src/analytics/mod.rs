//! Analytics module for chatpulse
//!
//! Provides session aggregation and reporting:
//! - [`aggregator`]: live sessions rolled into per-day buckets
//! - [`stats`]: derived day and range reports
//! - [`insights`]: rule-based observations over a report
//! - [`dashboard`]: today-vs-yesterday overview and trailing windows
//! - [`export`]: JSON and CSV rendering
//!
//! All state is held in memory by a [`ChatAnalytics`] instance and is lost
//! when the process exits.

pub mod aggregator;
pub mod dashboard;
pub mod export;
pub mod insights;
pub mod stats;

pub use aggregator::ChatAnalytics;
pub use dashboard::{Dashboard, ReportPeriod, Trends};
pub use export::{render, ExportFormat};
pub use insights::{generate_insights, Insight, InsightKind, Priority};
pub use stats::{
    percent_change, DayStats, ExportPeriod, ExportStats, ExportSummary, SatisfactionDistribution,
};
