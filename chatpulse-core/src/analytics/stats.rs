//! Derived, read-only metrics over day buckets.
//!
//! Everything here is a pure function of its inputs; the aggregator hands in
//! a consistent snapshot and receives owned report values back.

use crate::types::{DayBucket, FeedbackRecord, PopularQuestion, SourceTally, TopicCount};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of topics reported per day.
pub const TOP_TOPICS: usize = 5;
/// Popular questions included in an export.
pub const EXPORT_POPULAR_QUESTIONS: usize = 20;
/// Feedback records included in an export.
pub const EXPORT_RECENT_FEEDBACK: usize = 50;

/// Percentage of ratings per sentiment bucket.
///
/// Each bucket is rounded on its own, so the three need not sum to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionDistribution {
    /// Ratings of 4 and above
    pub positive: u32,
    /// Ratings of exactly 3
    pub neutral: u32,
    /// Ratings below 3
    pub negative: u32,
}

impl SatisfactionDistribution {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }

        let (mut positive, mut neutral, mut negative) = (0usize, 0usize, 0usize);
        for &rating in ratings {
            match rating {
                r if r >= 4 => positive += 1,
                3 => neutral += 1,
                _ => negative += 1,
            }
        }

        let pct = |count: usize| ((count as f64 / ratings.len() as f64) * 100.0).round() as u32;
        Self {
            positive: pct(positive),
            neutral: pct(neutral),
            negative: pct(negative),
        }
    }
}

/// Report for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: NaiveDate,
    pub total_sessions: u64,
    pub total_messages: u64,
    pub average_messages_per_session: u64,
    pub response_source_distribution: SourceTally,
    pub average_satisfaction: Option<f64>,
    pub satisfaction_distribution: SatisfactionDistribution,
    pub top_topics: Vec<TopicCount>,
}

impl DayStats {
    pub fn from_bucket(date: NaiveDate, bucket: &DayBucket) -> Self {
        let average_messages_per_session = if bucket.total_sessions == 0 {
            0
        } else {
            (bucket.total_messages as f64 / bucket.total_sessions as f64).round() as u64
        };

        let average_satisfaction = mean(bucket.satisfaction_ratings.iter().map(|r| *r as f64));

        let mut top_topics: Vec<TopicCount> = bucket
            .topic_distribution
            .iter()
            .map(|(topic, count)| TopicCount {
                topic: *topic,
                count: *count,
            })
            .collect();
        top_topics.sort_by(|a, b| b.count.cmp(&a.count));
        top_topics.truncate(TOP_TOPICS);

        Self {
            date,
            total_sessions: bucket.total_sessions,
            total_messages: bucket.total_messages,
            average_messages_per_session,
            response_source_distribution: bucket.source_distribution,
            average_satisfaction,
            satisfaction_distribution: SatisfactionDistribution::from_ratings(
                &bucket.satisfaction_ratings,
            ),
            top_topics,
        }
    }
}

/// Inclusive date range of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExportPeriod {
    /// Every calendar day from start to end, inclusive. Empty when reversed.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

/// Totals across the days of an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_sessions: u64,
    pub total_messages: u64,
    /// Mean of the per-day averages, not weighted by volume
    pub average_satisfaction: Option<f64>,
    /// Days in the period that had data
    pub active_days: usize,
}

impl ExportSummary {
    pub fn from_days(daily: &[DayStats]) -> Self {
        Self {
            total_sessions: daily.iter().map(|d| d.total_sessions).sum(),
            total_messages: daily.iter().map(|d| d.total_messages).sum(),
            average_satisfaction: mean(daily.iter().filter_map(|d| d.average_satisfaction)),
            active_days: daily.len(),
        }
    }
}

/// Full report over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub period: ExportPeriod,
    pub daily_stats: Vec<DayStats>,
    pub popular_questions: Vec<PopularQuestion>,
    pub recent_feedback: Vec<FeedbackRecord>,
    pub summary: ExportSummary,
}

impl ExportStats {
    /// Response-source counts summed over every day.
    pub fn source_totals(&self) -> SourceTally {
        let mut totals = SourceTally::default();
        for day in &self.daily_stats {
            totals.add(&day.response_source_distribution);
        }
        totals
    }
}

/// Percentage change from `previous` to `current`, rounded.
///
/// A zero baseline reports 100 for any growth and 0 otherwise.
pub fn percent_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    ((current - previous) / previous * 100.0).round() as i64
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean rounded to two decimals, `None` for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::Topic;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(0.0, 0.0), 0);
        assert_eq!(percent_change(5.0, 0.0), 100);
        assert_eq!(percent_change(10.0, 20.0), -50);
        assert_eq!(percent_change(123.0, 100.0), 23);
        assert_eq!(percent_change(4.5, 4.0), 13);
    }

    #[test]
    fn test_satisfaction_distribution_rounds_each_bucket() {
        let dist = SatisfactionDistribution::from_ratings(&[5, 5, 5, 2, 2]);
        assert_eq!(
            dist,
            SatisfactionDistribution {
                positive: 60,
                neutral: 0,
                negative: 40
            }
        );

        // 33 + 33 + 33: independent rounding, not forced to 100.
        let dist = SatisfactionDistribution::from_ratings(&[5, 3, 1]);
        assert_eq!(dist.positive + dist.neutral + dist.negative, 99);

        assert_eq!(
            SatisfactionDistribution::from_ratings(&[]),
            SatisfactionDistribution::default()
        );
    }

    #[test]
    fn test_day_stats_from_bucket() {
        let mut bucket = DayBucket {
            total_sessions: 3,
            total_messages: 8,
            satisfaction_ratings: vec![5, 4, 2],
            ..Default::default()
        };
        bucket.source_distribution.faq = 2;
        bucket.source_distribution.ai = 2;
        for (topic, count) in [
            (Topic::Schedule, 1),
            (Topic::Pricing, 4),
            (Topic::Trainers, 2),
            (Topic::Booking, 3),
            (Topic::Health, 1),
            (Topic::Other, 5),
        ] {
            bucket.topic_distribution.insert(topic, count);
        }

        let stats = DayStats::from_bucket(date(2026, 10, 18), &bucket);
        assert_eq!(stats.average_messages_per_session, 3);
        assert_eq!(stats.average_satisfaction, Some(3.67));
        assert_eq!(stats.top_topics.len(), 5);
        assert_eq!(stats.top_topics[0].topic, Topic::Other);
        assert_eq!(stats.top_topics[1].topic, Topic::Pricing);
        // Ties keep topic order: Schedule before Health.
        assert_eq!(stats.top_topics[4].topic, Topic::Schedule);
    }

    #[test]
    fn test_day_stats_without_sessions_or_ratings() {
        let stats = DayStats::from_bucket(date(2026, 10, 18), &DayBucket::default());
        assert_eq!(stats.average_messages_per_session, 0);
        assert_eq!(stats.average_satisfaction, None);
        assert!(stats.top_topics.is_empty());
    }

    #[test]
    fn test_summary_is_mean_of_daily_means() {
        let mut a = DayStats::from_bucket(date(2026, 10, 1), &DayBucket::default());
        a.total_sessions = 10;
        a.average_satisfaction = Some(5.0);
        let mut b = DayStats::from_bucket(date(2026, 10, 2), &DayBucket::default());
        b.total_sessions = 1;
        b.average_satisfaction = Some(2.0);
        let c = DayStats::from_bucket(date(2026, 10, 3), &DayBucket::default());

        let summary = ExportSummary::from_days(&[a, b, c]);
        assert_eq!(summary.total_sessions, 11);
        assert_eq!(summary.average_satisfaction, Some(3.5));
        assert_eq!(summary.active_days, 3);

        let empty = ExportSummary::from_days(&[]);
        assert_eq!(empty.total_sessions, 0);
        assert_eq!(empty.average_satisfaction, None);
    }

    #[test]
    fn test_period_days_inclusive() {
        let period = ExportPeriod {
            start: date(2026, 2, 27),
            end: date(2026, 3, 2),
        };
        let days: Vec<_> = period.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[3], date(2026, 3, 2));

        let reversed = ExportPeriod {
            start: date(2026, 3, 2),
            end: date(2026, 2, 27),
        };
        assert_eq!(reversed.days().count(), 0);
    }

    #[test]
    fn test_day_stats_field_names() {
        let mut bucket = DayBucket {
            total_sessions: 1,
            total_messages: 2,
            ..Default::default()
        };
        bucket.source_distribution.faq = 1;
        let json = serde_json::to_value(DayStats::from_bucket(date(2026, 10, 18), &bucket)).unwrap();
        assert_eq!(json["date"], "2026-10-18");
        assert_eq!(json["totalSessions"], 1);
        assert_eq!(json["averageMessagesPerSession"], 2);
        assert_eq!(json["responseSourceDistribution"]["faq"], 1);
        assert!(json["averageSatisfaction"].is_null());
        assert_eq!(json["satisfactionDistribution"]["positive"], 0);
    }
}
