//! Admin dashboard and fixed reporting windows.
//!
//! Provides the "today" overview (today vs. yesterday with trend deltas),
//! plus week/month windows and insight generation over a trailing period.

use super::aggregator::ChatAnalytics;
use super::insights::{generate_insights, Insight};
use super::stats::{percent_change, DayStats, ExportPeriod, ExportStats};
use crate::types::{FeedbackRecord, PopularQuestion};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Popular questions shown on the dashboard.
pub const DASHBOARD_POPULAR_QUESTIONS: usize = 5;
/// Feedback records shown on the dashboard.
pub const DASHBOARD_RECENT_FEEDBACK: usize = 10;

/// Trailing window of whole days ending on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    days: u32,
}

impl Default for ReportPeriod {
    fn default() -> Self {
        Self::week()
    }
}

impl ReportPeriod {
    /// Last `days` days including the end day; zero is treated as one.
    pub fn last_days(days: u32) -> Self {
        Self { days: days.max(1) }
    }

    pub fn week() -> Self {
        Self::last_days(7)
    }

    pub fn month() -> Self {
        Self::last_days(30)
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// The inclusive date range ending on `end`. Windows reaching past the
    /// earliest representable date start there instead.
    pub fn ending_on(&self, end: NaiveDate) -> ExportPeriod {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(self.days) - 1))
            .unwrap_or(NaiveDate::MIN);
        ExportPeriod { start, end }
    }

    /// Get display name for this period.
    pub fn display_name(&self) -> String {
        match self.days {
            1 => "Today".to_string(),
            7 => "Last 7 days".to_string(),
            30 => "Last 30 days".to_string(),
            n => format!("Last {} days", n),
        }
    }
}

/// Day-over-day percentage changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub sessions: i64,
    pub messages: i64,
    pub satisfaction: i64,
}

impl Trends {
    pub fn between(today: Option<&DayStats>, yesterday: Option<&DayStats>) -> Self {
        let sessions = |d: Option<&DayStats>| d.map_or(0.0, |d| d.total_sessions as f64);
        let messages = |d: Option<&DayStats>| d.map_or(0.0, |d| d.total_messages as f64);
        let satisfaction =
            |d: Option<&DayStats>| d.and_then(|d| d.average_satisfaction).unwrap_or(0.0);

        Self {
            sessions: percent_change(sessions(today), sessions(yesterday)),
            messages: percent_change(messages(today), messages(yesterday)),
            satisfaction: percent_change(satisfaction(today), satisfaction(yesterday)),
        }
    }

    /// Format delta for display (e.g., "+23%" or "-15%").
    pub fn format_delta(delta: i64) -> String {
        if delta >= 0 {
            format!("+{}%", delta)
        } else {
            format!("{}%", delta)
        }
    }
}

/// Snapshot for the admin overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub date: NaiveDate,
    pub today: Option<DayStats>,
    pub yesterday: Option<DayStats>,
    pub active_sessions: usize,
    pub popular_questions: Vec<PopularQuestion>,
    pub recent_feedback: Vec<FeedbackRecord>,
    pub trends: Trends,
}

impl ChatAnalytics {
    /// Dashboard for the current local day.
    pub fn dashboard(&self) -> Dashboard {
        self.dashboard_at(Local::now().date_naive())
    }

    /// Dashboard for `today`, built from one consistent snapshot.
    pub fn dashboard_at(&self, today: NaiveDate) -> Dashboard {
        let state = self.read();
        let yesterday_date = today - Duration::days(1);

        let today_stats = state.day_stats(today);
        let yesterday_stats = state.day_stats(yesterday_date);
        let trends = Trends::between(today_stats.as_ref(), yesterday_stats.as_ref());

        Dashboard {
            date: today,
            today: today_stats,
            yesterday: yesterday_stats,
            active_sessions: state.active_session_count(),
            popular_questions: state.popular_questions(DASHBOARD_POPULAR_QUESTIONS),
            recent_feedback: state.recent_feedback(DASHBOARD_RECENT_FEEDBACK),
            trends,
        }
    }

    /// Export over a trailing window ending today.
    pub fn export_period(&self, period: ReportPeriod) -> ExportStats {
        self.export_period_at(period, Local::now().date_naive())
    }

    pub fn export_period_at(&self, period: ReportPeriod, end: NaiveDate) -> ExportStats {
        self.read().export(period.ending_on(end))
    }

    /// Insights over a trailing window ending today.
    pub fn insights(&self, period: ReportPeriod) -> Vec<Insight> {
        generate_insights(&self.export_period(period))
    }

    pub fn insights_at(&self, period: ReportPeriod, end: NaiveDate) -> Vec<Insight> {
        generate_insights(&self.export_period_at(period, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResponseSource, Role};
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, d, h, 0, 0)
            .unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn session(analytics: &ChatAnalytics, id: &str, d: u32, rating: Option<u8>) {
        analytics.start_session_at(id, "ua", "ip", at(d, 9));
        analytics.log_message(id, Role::User, "Скільки коштує абонемент?", ResponseSource::User);
        analytics.log_message(id, Role::Bot, "2400 грн", ResponseSource::Faq);
        if let Some(rating) = rating {
            analytics.log_feedback_at(id, rating, None, ResponseSource::Faq, at(d, 9));
        }
        analytics.end_session_at(id, at(d, 10));
    }

    #[test]
    fn test_report_period_ranges() {
        let week = ReportPeriod::week().ending_on(date(18));
        assert_eq!(week.start, date(12));
        assert_eq!(week.days().count(), 7);

        assert_eq!(ReportPeriod::last_days(0).days(), 1);
        assert_eq!(ReportPeriod::month().display_name(), "Last 30 days");
        assert_eq!(ReportPeriod::last_days(14).display_name(), "Last 14 days");
    }

    #[test]
    fn test_oversized_window_starts_at_earliest_date() {
        let period = ReportPeriod::last_days(u32::MAX).ending_on(date(18));
        assert_eq!(period.start, NaiveDate::MIN);
        assert_eq!(period.end, date(18));

        let analytics = ChatAnalytics::default();
        session(&analytics, "a", 5, Some(4));
        session(&analytics, "b", 18, Some(5));
        let stats = analytics.export_period_at(ReportPeriod::last_days(u32::MAX), date(18));
        assert_eq!(stats.daily_stats.len(), 2);
        assert_eq!(stats.summary.total_sessions, 2);

        let insights = analytics.insights_at(ReportPeriod::last_days(200_000_000), date(18));
        assert!(!insights.is_empty());
    }

    #[test]
    fn test_dashboard_compares_with_yesterday() {
        let analytics = ChatAnalytics::default();
        session(&analytics, "y1", 17, Some(4));
        session(&analytics, "t1", 18, Some(5));
        session(&analytics, "t2", 18, Some(5));
        analytics.start_session_at("live", "ua", "ip", at(18, 11));

        let dashboard = analytics.dashboard_at(date(18));
        assert_eq!(dashboard.today.as_ref().unwrap().total_sessions, 2);
        assert_eq!(dashboard.yesterday.as_ref().unwrap().total_sessions, 1);
        assert_eq!(dashboard.active_sessions, 1);
        assert_eq!(dashboard.trends.sessions, 100);
        assert_eq!(dashboard.trends.messages, 100);
        assert_eq!(dashboard.trends.satisfaction, 25);
        assert_eq!(dashboard.popular_questions[0].count, 3);
        assert_eq!(dashboard.recent_feedback.len(), 3);
    }

    #[test]
    fn test_dashboard_without_data() {
        let analytics = ChatAnalytics::default();
        let dashboard = analytics.dashboard_at(date(18));
        assert!(dashboard.today.is_none());
        assert!(dashboard.yesterday.is_none());
        assert_eq!(dashboard.trends, Trends::default());
    }

    #[test]
    fn test_export_period_skips_empty_days() {
        let analytics = ChatAnalytics::default();
        session(&analytics, "a", 5, None);
        session(&analytics, "b", 15, None);
        session(&analytics, "c", 18, None);

        let week = analytics.export_period_at(ReportPeriod::week(), date(18));
        assert_eq!(week.daily_stats.len(), 2);
        assert_eq!(week.summary.total_sessions, 2);

        let month = analytics.export_period_at(ReportPeriod::month(), date(18));
        assert_eq!(month.daily_stats.len(), 3);
    }

    #[test]
    fn test_insights_over_empty_period() {
        let analytics = ChatAnalytics::default();
        let insights = analytics.insights_at(ReportPeriod::week(), date(18));
        assert_eq!(insights.len(), 1);
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(Trends::format_delta(23), "+23%");
        assert_eq!(Trends::format_delta(-15), "-15%");
        assert_eq!(Trends::format_delta(0), "+0%");
    }
}
