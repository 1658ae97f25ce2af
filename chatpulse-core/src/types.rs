//! Core domain types for chatpulse
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session** | One continuous chat conversation, keyed by a caller-supplied id |
//! | **Turn** | A user question and the bot answer that follows it |
//! | **Response source** | Where a bot answer came from: the FAQ base or the completion model |
//! | **Day bucket** | Counters for all sessions that ended on one calendar day |
//! | **Feedback** | A 1-5 rating a visitor left, with an optional comment |
//!
//! Client addresses and user agents never appear in these types in raw form;
//! see [`privacy_hash`].

use crate::topics::Topic;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

// ============================================
// Roles and sources
// ============================================

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The visitor
    User,
    /// The assistant, whether it answered from the FAQ or the model
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// Origin of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Served from the knowledge base
    Faq,
    /// Served by the external completion model
    Ai,
    /// The completion model failed; the visitor got a fallback
    Error,
    /// Written by the visitor
    User,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Faq => "faq",
            ResponseSource::Ai => "ai",
            ResponseSource::Error => "error",
            ResponseSource::User => "user",
        }
    }
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResponseSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "faq" => Ok(ResponseSource::Faq),
            "ai" => Ok(ResponseSource::Ai),
            "error" => Ok(ResponseSource::Error),
            "user" => Ok(ResponseSource::User),
            _ => Err(format!("unknown response source: {}", s)),
        }
    }
}

/// Bot answers per source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTally {
    pub faq: u64,
    pub ai: u64,
    #[serde(default)]
    pub error: u64,
}

impl SourceTally {
    /// Count one bot answer. `User` is not a bot source and is ignored.
    pub fn record(&mut self, source: ResponseSource) {
        match source {
            ResponseSource::Faq => self.faq += 1,
            ResponseSource::Ai => self.ai += 1,
            ResponseSource::Error => self.error += 1,
            ResponseSource::User => {}
        }
    }

    pub fn add(&mut self, other: &SourceTally) {
        self.faq += other.faq;
        self.ai += other.ai;
        self.error += other.error;
    }

    pub fn total(&self) -> u64 {
        self.faq + self.ai + self.error
    }
}

// ============================================
// Session
// ============================================

/// A live conversation.
///
/// Only exists between session start and end; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub message_count: u64,
    pub response_tally: SourceTally,
    pub topics: BTreeSet<Topic>,
    /// Most recent rating left during this session
    pub satisfaction: Option<u8>,
    pub user_agent_hash: String,
    pub ip_hash: String,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        start_time: DateTime<Utc>,
        user_agent: &str,
        client_address: &str,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            message_count: 0,
            response_tally: SourceTally::default(),
            topics: BTreeSet::new(),
            satisfaction: None,
            user_agent_hash: privacy_hash(user_agent),
            ip_hash: privacy_hash(client_address),
        }
    }

    /// Seconds between start and `now`, never negative.
    pub fn duration_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.start_time)
            .num_seconds()
            .max(0)
    }
}

/// Returns a 32-character hex digest of SHA-256(value).
///
/// Used for client addresses and user agents so sessions can be told apart
/// without holding the raw values.
pub fn privacy_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();

    // Take first 16 bytes (32 hex chars)
    hex::encode(&result[..16])
}

// ============================================
// Day bucket
// ============================================

/// Counters for every session that ended on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub total_sessions: u64,
    pub total_messages: u64,
    pub source_distribution: SourceTally,
    /// In the order sessions ended
    pub satisfaction_ratings: Vec<u8>,
    pub topic_distribution: BTreeMap<Topic, u64>,
}

impl DayBucket {
    /// Fold a finished session into the bucket.
    pub fn absorb(&mut self, session: &Session) {
        self.total_sessions += 1;
        self.total_messages += session.message_count;
        self.source_distribution.add(&session.response_tally);
        if let Some(rating) = session.satisfaction {
            self.satisfaction_ratings.push(rating);
        }
        for topic in &session.topics {
            *self.topic_distribution.entry(*topic).or_insert(0) += 1;
        }
    }
}

// ============================================
// Feedback and popular questions
// ============================================

/// One rating event. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub session_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub source: ResponseSource,
    pub timestamp: DateTime<Utc>,
    /// Topics of the session when the rating was left
    pub topics: BTreeSet<Topic>,
}

/// A normalized question and how often it was asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuestion {
    pub question: String,
    pub count: u64,
}

/// A topic and how many sessions touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: Topic,
    pub count: u64,
}

/// What a retention pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Oldest day kept; `None` when the window reached past the earliest date
    pub cutoff: Option<NaiveDate>,
    pub buckets_removed: usize,
    pub feedback_removed: usize,
    pub questions_trimmed: usize,
}
