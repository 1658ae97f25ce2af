//! Rule-based observations over an [`ExportStats`] report.
//!
//! Every rule looks at the report independently and none of them mutate it.
//! The result is ordered by priority, highest first, keeping rule order
//! among equal priorities.

use super::stats::ExportStats;
use crate::topics::Topic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average sessions per day above which traffic counts as high.
pub const HIGH_TRAFFIC_SESSIONS_PER_DAY: f64 = 50.0;
/// Average sessions per day below which traffic counts as low.
pub const LOW_TRAFFIC_SESSIONS_PER_DAY: f64 = 10.0;
/// Average satisfaction at or above this is good.
pub const GOOD_SATISFACTION: f64 = 4.0;
/// Average satisfaction below this needs attention.
pub const POOR_SATISFACTION: f64 = 3.0;
/// FAQ share (percent) above which the knowledge base carries the load.
pub const HIGH_FAQ_SHARE: f64 = 70.0;
/// FAQ share (percent) below which the knowledge base needs work.
pub const LOW_FAQ_SHARE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Success,
    Warning,
    Error,
    Info,
}

/// Ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Insight {
    fn new(kind: InsightKind, priority: Priority, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            priority,
            action: None,
        }
    }

    fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Derive insights from a report.
pub fn generate_insights(stats: &ExportStats) -> Vec<Insight> {
    if stats.daily_stats.is_empty() {
        return vec![Insight::new(
            InsightKind::Info,
            Priority::Low,
            "Not enough data for this period yet",
        )];
    }

    let mut insights = Vec::new();

    let days = stats.daily_stats.len() as f64;
    let sessions_per_day = stats.summary.total_sessions as f64 / days;
    if sessions_per_day > HIGH_TRAFFIC_SESSIONS_PER_DAY {
        insights.push(
            Insight::new(
                InsightKind::Success,
                Priority::High,
                format!(
                    "High chat activity: {:.1} sessions per day on average",
                    sessions_per_day
                ),
            )
            .with_action("Expand the FAQ base to keep up with demand"),
        );
    } else if sessions_per_day < LOW_TRAFFIC_SESSIONS_PER_DAY {
        insights.push(
            Insight::new(
                InsightKind::Warning,
                Priority::Medium,
                format!(
                    "Low chat activity: {:.1} sessions per day on average",
                    sessions_per_day
                ),
            )
            .with_action("Make the chat widget more visible on the site"),
        );
    }

    if let Some(satisfaction) = stats.summary.average_satisfaction {
        if satisfaction >= GOOD_SATISFACTION {
            insights.push(Insight::new(
                InsightKind::Success,
                Priority::High,
                format!("Visitors are satisfied: average rating {:.2}", satisfaction),
            ));
        } else if satisfaction < POOR_SATISFACTION {
            insights.push(
                Insight::new(
                    InsightKind::Error,
                    Priority::High,
                    format!("Low satisfaction: average rating {:.2}", satisfaction),
                )
                .with_action("Review low-rated conversations and improve the answers they got"),
            );
        }
    }

    let sources = stats.source_totals();
    let answered = sources.faq + sources.ai;
    if answered > 0 {
        let faq_share = sources.faq as f64 / answered as f64 * 100.0;
        if faq_share > HIGH_FAQ_SHARE {
            insights.push(Insight::new(
                InsightKind::Info,
                Priority::Medium,
                format!("{:.0}% of answers came from the FAQ base", faq_share),
            ));
        } else if faq_share < LOW_FAQ_SHARE {
            insights.push(
                Insight::new(
                    InsightKind::Warning,
                    Priority::Medium,
                    format!("Only {:.0}% of answers came from the FAQ base", faq_share),
                )
                .with_action("Add the most common AI-answered questions to the FAQ base"),
            );
        }
    }

    if let Some((topic, count)) = most_frequent_topic(stats) {
        insights.push(
            Insight::new(
                InsightKind::Info,
                Priority::Low,
                format!("Most discussed topic: {} ({} sessions)", topic, count),
            )
            .with_action(format!("Consider a dedicated FAQ section for {}", topic)),
        );
    }

    // Stable: equal priorities keep rule order.
    insights.sort_by(|a, b| b.priority.cmp(&a.priority));
    insights
}

/// Topic with the highest summed count across days; ties go to the topic
/// listed first.
fn most_frequent_topic(stats: &ExportStats) -> Option<(Topic, u64)> {
    let mut totals: BTreeMap<Topic, u64> = BTreeMap::new();
    for day in &stats.daily_stats {
        for entry in &day.top_topics {
            *totals.entry(entry.topic).or_insert(0) += entry.count;
        }
    }

    totals
        .into_iter()
        .fold(None, |best, (topic, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((topic, count)),
        })
}
