//! Export rendering for [`ExportStats`] reports.

use super::stats::ExportStats;
use crate::error::Result;

/// Output format for a report export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    /// One row per day with data
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// MIME type for HTTP responses.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("unknown export format: {}", s)),
        }
    }
}

const CSV_HEADER: &[&str] = &[
    "date",
    "totalSessions",
    "totalMessages",
    "averageMessagesPerSession",
    "averageSatisfaction",
    "faqResponses",
    "aiResponses",
    "errorResponses",
    "positivePct",
    "neutralPct",
    "negativePct",
    "topTopics",
];

/// Render a report in the requested format.
pub fn render(stats: &ExportStats, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        ExportFormat::Csv => Ok(to_csv(stats)),
    }
}

/// Per-day rows; top topics are joined as `topic:count` separated by `;`.
pub fn to_csv(stats: &ExportStats) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push('\n');

    for day in &stats.daily_stats {
        let topics = day
            .top_topics
            .iter()
            .map(|t| format!("{}:{}", t.topic, t.count))
            .collect::<Vec<_>>()
            .join(";");
        let row = [
            day.date.to_string(),
            day.total_sessions.to_string(),
            day.total_messages.to_string(),
            day.average_messages_per_session.to_string(),
            day.average_satisfaction
                .map(|s| format!("{:.2}", s))
                .unwrap_or_default(),
            day.response_source_distribution.faq.to_string(),
            day.response_source_distribution.ai.to_string(),
            day.response_source_distribution.error.to_string(),
            day.satisfaction_distribution.positive.to_string(),
            day.satisfaction_distribution.neutral.to_string(),
            day.satisfaction_distribution.negative.to_string(),
            topics,
        ];
        out.push_str(
            &row.iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
    }

    out
}

/// Quote a field when it contains a separator, quote or line break.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
