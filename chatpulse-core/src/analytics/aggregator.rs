//! Live-session tracking and per-day roll-up.
//!
//! [`ChatAnalytics`] is the single owner of all mutable analytics state:
//! the live sessions, the day buckets, the popular-question counters and the
//! feedback log. It is constructed by the host and shared by `Arc`; there is
//! no process-wide instance.
//!
//! All state sits behind one `RwLock`. Mutations take the write lock for
//! their whole duration, so no caller ever sees a half-applied update, and
//! every report is built from a single read-locked snapshot.
//!
//! Unknown or already-ended session ids are silently ignored: chat transports
//! can deliver a late message after a session expired.

use super::stats::{
    DayStats, ExportPeriod, ExportStats, ExportSummary, EXPORT_POPULAR_QUESTIONS,
    EXPORT_RECENT_FEEDBACK,
};
use crate::config::AnalyticsConfig;
use crate::text::{normalize, truncate_chars};
use crate::topics::TopicClassifier;
use crate::types::{
    CleanupReport, DayBucket, FeedbackRecord, PopularQuestion, ResponseSource, Role, Session,
};
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Current local time with its offset; day buckets use the local calendar date.
pub(crate) fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

#[derive(Debug, Default)]
pub(crate) struct AnalyticsState {
    sessions: HashMap<String, Session>,
    days: BTreeMap<NaiveDate, DayBucket>,
    question_counts: HashMap<String, u64>,
    feedback: VecDeque<FeedbackRecord>,
}

impl AnalyticsState {
    pub(crate) fn day_stats(&self, date: NaiveDate) -> Option<DayStats> {
        self.days
            .get(&date)
            .map(|bucket| DayStats::from_bucket(date, bucket))
    }

    pub(crate) fn popular_questions(&self, limit: usize) -> Vec<PopularQuestion> {
        let mut questions: Vec<PopularQuestion> = self
            .question_counts
            .iter()
            .map(|(question, count)| PopularQuestion {
                question: question.clone(),
                count: *count,
            })
            .collect();
        questions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.question.cmp(&b.question)));
        questions.truncate(limit);
        questions
    }

    /// Newest first.
    pub(crate) fn recent_feedback(&self, limit: usize) -> Vec<FeedbackRecord> {
        self.feedback.iter().rev().take(limit).cloned().collect()
    }

    pub(crate) fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn export(&self, period: ExportPeriod) -> ExportStats {
        let daily_stats: Vec<DayStats> = if period.start > period.end {
            Vec::new()
        } else {
            self.days
                .range(period.start..=period.end)
                .map(|(date, bucket)| DayStats::from_bucket(*date, bucket))
                .collect()
        };
        let summary = ExportSummary::from_days(&daily_stats);

        ExportStats {
            period,
            daily_stats,
            popular_questions: self.popular_questions(EXPORT_POPULAR_QUESTIONS),
            recent_feedback: self.recent_feedback(EXPORT_RECENT_FEEDBACK),
            summary,
        }
    }
}

/// In-memory chat analytics engine.
#[derive(Debug)]
pub struct ChatAnalytics {
    state: RwLock<AnalyticsState>,
    classifier: TopicClassifier,
    settings: AnalyticsConfig,
}

impl Default for ChatAnalytics {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl ChatAnalytics {
    pub fn new(settings: AnalyticsConfig) -> Self {
        Self {
            state: RwLock::new(AnalyticsState::default()),
            classifier: TopicClassifier::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyticsConfig {
        &self.settings
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, AnalyticsState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AnalyticsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Session lifecycle
    // ============================================

    /// Register a live session. Raw client details are hashed immediately.
    pub fn start_session(&self, session_id: &str, user_agent: &str, client_address: &str) -> Session {
        self.start_session_at(session_id, user_agent, client_address, local_now())
    }

    /// [`start_session`](Self::start_session) with an explicit clock.
    ///
    /// Starting an id that is already live returns the existing session
    /// untouched.
    pub fn start_session_at(
        &self,
        session_id: &str,
        user_agent: &str,
        client_address: &str,
        at: DateTime<FixedOffset>,
    ) -> Session {
        let mut state = self.write();
        if let Some(existing) = state.sessions.get(session_id) {
            tracing::debug!(session_id, "Session already live, keeping it");
            return existing.clone();
        }

        let session = Session::new(
            session_id,
            at.with_timezone(&Utc),
            user_agent,
            client_address,
        );
        tracing::info!(
            session_id,
            ip_hash = %session.ip_hash,
            active = state.sessions.len() + 1,
            "Session started"
        );
        state.sessions.insert(session_id.to_string(), session.clone());
        session
    }

    /// Record one chat message.
    ///
    /// User messages are classified into a topic and counted as popular
    /// questions; bot messages bump the tally of their response source.
    pub fn log_message(&self, session_id: &str, role: Role, text: &str, source: ResponseSource) {
        // Normalize and classify before taking the lock.
        let classified = match role {
            Role::User => {
                let normalized = normalize(text);
                let topic = self.classifier.classify_normalized(&normalized);
                let key = truncate_chars(&normalized, self.settings.question_key_chars).to_string();
                Some((topic, key))
            }
            Role::Bot => None,
        };

        let mut guard = self.write();
        let state = &mut *guard;
        let Some(session) = state.sessions.get_mut(session_id) else {
            tracing::debug!(session_id, "Message for unknown session ignored");
            return;
        };

        session.message_count += 1;
        match classified {
            Some((topic, key)) => {
                session.topics.insert(topic);
                tracing::debug!(session_id, topic = %topic, "User message");
                if !key.is_empty() {
                    *state.question_counts.entry(key).or_insert(0) += 1;
                }
            }
            None => {
                session.response_tally.record(source);
                tracing::debug!(session_id, source = %source, "Bot message");
            }
        }
    }

    /// Record a rating. Always appended to the feedback log, even when the
    /// session already ended (its topic snapshot is then empty).
    pub fn log_feedback(
        &self,
        session_id: &str,
        rating: u8,
        comment: Option<&str>,
        source: ResponseSource,
    ) {
        self.log_feedback_at(session_id, rating, comment, source, local_now())
    }

    /// [`log_feedback`](Self::log_feedback) with an explicit clock.
    pub fn log_feedback_at(
        &self,
        session_id: &str,
        rating: u8,
        comment: Option<&str>,
        source: ResponseSource,
        at: DateTime<FixedOffset>,
    ) {
        let mut state = self.write();

        let topics = match state.sessions.get_mut(session_id) {
            Some(session) => {
                session.satisfaction = Some(rating);
                session.topics.clone()
            }
            None => BTreeSet::new(),
        };

        state.feedback.push_back(FeedbackRecord {
            session_id: session_id.to_string(),
            rating,
            comment: comment.map(str::to_string),
            source,
            timestamp: at.with_timezone(&Utc),
            topics,
        });
        while state.feedback.len() > self.settings.max_feedback_records {
            state.feedback.pop_front();
        }

        tracing::info!(session_id, rating, source = %source, "Feedback recorded");
    }

    /// Close a session and fold it into today's bucket.
    ///
    /// Returns the finished session, or `None` if the id was not live.
    pub fn end_session(&self, session_id: &str) -> Option<Session> {
        self.end_session_at(session_id, local_now())
    }

    /// [`end_session`](Self::end_session) with an explicit clock. The bucket
    /// is the calendar date of `at` in its own offset.
    pub fn end_session_at(&self, session_id: &str, at: DateTime<FixedOffset>) -> Option<Session> {
        let mut state = self.write();
        let session = state.sessions.remove(session_id)?;

        let day = at.date_naive();
        state.days.entry(day).or_default().absorb(&session);

        tracing::info!(
            session_id,
            day = %day,
            duration_secs = session.duration_secs(at.with_timezone(&Utc)),
            messages = session.message_count,
            topics = session.topics.len(),
            "Session ended"
        );
        Some(session)
    }

    // ============================================
    // Read accessors
    // ============================================

    /// Report for one day, `None` if no session ended that day.
    pub fn day_stats(&self, date: NaiveDate) -> Option<DayStats> {
        self.read().day_stats(date)
    }

    /// Most asked questions, most frequent first.
    pub fn popular_questions(&self, limit: usize) -> Vec<PopularQuestion> {
        self.read().popular_questions(limit)
    }

    /// Copies of every live session, oldest first.
    pub fn active_sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.read().sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    pub fn active_session_count(&self) -> usize {
        self.read().active_session_count()
    }

    /// Latest feedback, newest first.
    pub fn recent_feedback(&self, limit: usize) -> Vec<FeedbackRecord> {
        self.read().recent_feedback(limit)
    }

    /// Report over every calendar day in `[start, end]`.
    pub fn export_stats(&self, start: NaiveDate, end: NaiveDate) -> ExportStats {
        self.read().export(ExportPeriod { start, end })
    }

    // ============================================
    // Retention
    // ============================================

    /// Drop buckets and feedback older than `days_to_keep` days.
    pub fn clean_old_data(&self, days_to_keep: u32) -> CleanupReport {
        self.clean_old_data_at(days_to_keep, local_now())
    }

    /// [`clean_old_data`](Self::clean_old_data) with an explicit clock.
    ///
    /// Buckets dated before `today - days_to_keep` go, feedback must be newer
    /// than `now - days_to_keep`, and popular-question counters are trimmed
    /// to the configured cap keeping the most frequent. Running it again with
    /// the same clock removes nothing.
    ///
    /// A window reaching past the earliest representable date keeps every
    /// bucket and feedback record; the report's `cutoff` is then `None`.
    pub fn clean_old_data_at(&self, days_to_keep: u32, now: DateTime<FixedOffset>) -> CleanupReport {
        let window = Duration::days(i64::from(days_to_keep));
        let cutoff = now
            .date_naive()
            .checked_sub_signed(window)
            .zip(now.with_timezone(&Utc).checked_sub_signed(window));
        let max_questions = self.settings.max_popular_questions;

        let mut state = self.write();

        let mut buckets_removed = 0;
        let mut feedback_removed = 0;
        if let Some((cutoff_date, cutoff_ts)) = cutoff {
            let buckets_before = state.days.len();
            state.days.retain(|day, _| *day >= cutoff_date);
            buckets_removed = buckets_before - state.days.len();

            let feedback_before = state.feedback.len();
            state.feedback.retain(|record| record.timestamp > cutoff_ts);
            feedback_removed = feedback_before - state.feedback.len();
        }

        let mut questions_trimmed = 0;
        if state.question_counts.len() > max_questions {
            let keep: HashMap<String, u64> = state
                .popular_questions(max_questions)
                .into_iter()
                .map(|q| (q.question, q.count))
                .collect();
            questions_trimmed = state.question_counts.len() - keep.len();
            state.question_counts = keep;
        }

        let cutoff_date = cutoff.map(|(date, _)| date);
        tracing::info!(
            cutoff = ?cutoff_date,
            buckets_removed,
            feedback_removed,
            questions_trimmed,
            "Old analytics data cleaned"
        );

        CleanupReport {
            cutoff: cutoff_date,
            buckets_removed,
            feedback_removed,
            questions_trimmed,
        }
    }
}
