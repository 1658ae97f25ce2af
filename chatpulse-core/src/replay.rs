//! JSONL chat-event logs and their replay into [`ChatAnalytics`].
//!
//! One event per line, tagged by `type`:
//!
//! ```text
//! {"type":"start","session_id":"s1","user_agent":"Mozilla/5.0","client_address":"10.0.0.1","at":"2026-10-18T09:00:00+03:00"}
//! {"type":"message","session_id":"s1","role":"user","text":"Коли ви відкриті?","at":"2026-10-18T09:00:05+03:00"}
//! {"type":"message","session_id":"s1","role":"bot","text":"...","source":"faq","at":"2026-10-18T09:00:06+03:00"}
//! {"type":"feedback","session_id":"s1","rating":5,"source":"faq","at":"2026-10-18T09:01:00+03:00"}
//! {"type":"end","session_id":"s1","at":"2026-10-18T09:02:00+03:00"}
//! ```
//!
//! Timestamps carry their own offset; sessions land in the bucket of the
//! calendar date in that offset, so a replay is independent of the host
//! timezone.

use crate::analytics::ChatAnalytics;
use crate::error::{Error, Result};
use crate::types::{ResponseSource, Role};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

fn default_source() -> ResponseSource {
    ResponseSource::User
}

/// A single recorded chat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Start {
        session_id: String,
        #[serde(default)]
        user_agent: String,
        #[serde(default)]
        client_address: String,
        at: DateTime<FixedOffset>,
    },
    Message {
        session_id: String,
        role: Role,
        text: String,
        #[serde(default = "default_source")]
        source: ResponseSource,
        at: DateTime<FixedOffset>,
    },
    Feedback {
        session_id: String,
        rating: u8,
        #[serde(default)]
        comment: Option<String>,
        source: ResponseSource,
        at: DateTime<FixedOffset>,
    },
    End {
        session_id: String,
        at: DateTime<FixedOffset>,
    },
}

impl ChatEvent {
    pub fn at(&self) -> DateTime<FixedOffset> {
        match self {
            ChatEvent::Start { at, .. }
            | ChatEvent::Message { at, .. }
            | ChatEvent::Feedback { at, .. }
            | ChatEvent::End { at, .. } => *at,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            ChatEvent::Start { session_id, .. }
            | ChatEvent::Message { session_id, .. }
            | ChatEvent::Feedback { session_id, .. }
            | ChatEvent::End { session_id, .. } => session_id,
        }
    }
}

/// Parse a JSONL event stream. Blank lines are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<ChatEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|e| Error::Parse {
            line: idx + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read and parse an event log file.
pub fn read_events(path: &Path) -> Result<Vec<ChatEvent>> {
    let file = std::fs::File::open(path)?;
    let events = parse_events(std::io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), events = events.len(), "Read chat events");
    Ok(events)
}

impl ChatAnalytics {
    /// Apply one recorded event.
    pub fn apply(&self, event: &ChatEvent) {
        match event {
            ChatEvent::Start {
                session_id,
                user_agent,
                client_address,
                at,
            } => {
                self.start_session_at(session_id, user_agent, client_address, *at);
            }
            ChatEvent::Message {
                session_id,
                role,
                text,
                source,
                ..
            } => self.log_message(session_id, *role, text, *source),
            ChatEvent::Feedback {
                session_id,
                rating,
                comment,
                source,
                at,
            } => self.log_feedback_at(session_id, *rating, comment.as_deref(), *source, *at),
            ChatEvent::End { session_id, at } => {
                self.end_session_at(session_id, *at);
            }
        }
    }

    /// Apply events in order; returns how many were applied.
    pub fn replay<'a>(&self, events: impl IntoIterator<Item = &'a ChatEvent>) -> usize {
        let mut applied = 0;
        for event in events {
            self.apply(event);
            applied += 1;
        }
        tracing::info!(applied, "Replayed chat events");
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const LOG: &str = r#"
{"type":"start","session_id":"s1","user_agent":"Mozilla/5.0","client_address":"10.0.0.1","at":"2026-10-18T09:00:00+03:00"}
{"type":"message","session_id":"s1","role":"user","text":"Коли ви відкриті?","at":"2026-10-18T09:00:05+03:00"}
{"type":"message","session_id":"s1","role":"bot","text":"Щодня","source":"faq","at":"2026-10-18T09:00:06+03:00"}

{"type":"feedback","session_id":"s1","rating":5,"comment":"супер","source":"faq","at":"2026-10-18T09:01:00+03:00"}
{"type":"end","session_id":"s1","at":"2026-10-18T23:30:00+03:00"}
"#;

    #[test]
    fn test_parse_and_replay() {
        let events = parse_events(LOG.as_bytes()).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[1].session_id(), "s1");

        let analytics = ChatAnalytics::default();
        assert_eq!(analytics.replay(&events), 5);

        // 23:30 at +03:00 is still the 18th in the event's own offset.
        let stats = analytics
            .day_stats(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
            .unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.response_source_distribution.faq, 1);
        assert_eq!(stats.average_satisfaction, Some(5.0));
    }

    #[test]
    fn test_message_source_defaults_to_user() {
        let events = parse_events(
            r#"{"type":"message","session_id":"s","role":"user","text":"hi","at":"2026-10-18T09:00:00Z"}"#
                .as_bytes(),
        )
        .unwrap();
        match &events[0] {
            ChatEvent::Message { source, .. } => assert_eq!(*source, ResponseSource::User),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"type\":\"end\",\"session_id\":\"s\",\"at\":\"2026-10-18T09:00:00Z\"}\n{\"type\":\"bogus\"}\n";
        match parse_events(input.as_bytes()) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
