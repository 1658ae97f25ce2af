//! # chatpulse-core
//!
//! Core library for chatpulse - analytics and FAQ answering for a studio
//! chat assistant.
//!
//! This library provides:
//! - Text normalization and keyword topic classification
//! - A curated knowledge base with a three-tier fuzzy matcher
//! - In-memory session aggregation into per-day statistics
//! - Derived reports, trend deltas and rule-based insights
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! An inbound chat turn goes to the [`FaqMatcher`] first; unmatched turns go
//! to an external [`chat::CompletionProvider`]. Every settled turn is
//! reported to [`ChatAnalytics`], which folds finished sessions into day
//! buckets. Reports are read-only views over those buckets.
//!
//! All analytics state lives in memory and is lost when the process exits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatpulse_core::{ChatAnalytics, FaqMatcher, KnowledgeBase, ResponseSource, Role};
//! use std::sync::Arc;
//!
//! let kb = KnowledgeBase::builtin().expect("built-in knowledge base");
//! let matcher = FaqMatcher::new(Arc::new(kb));
//! let analytics = ChatAnalytics::default();
//!
//! analytics.start_session("s1", "Mozilla/5.0", "10.0.0.1");
//! let hit = matcher.find("Скільки коштує абонемент?");
//! analytics.log_message("s1", Role::User, "Скільки коштує абонемент?", ResponseSource::User);
//! analytics.log_message("s1", Role::Bot, hit.answer.as_deref().unwrap_or(""), ResponseSource::Faq);
//! analytics.end_session("s1");
//! ```

// Re-export commonly used items at the crate root
pub use analytics::ChatAnalytics;
pub use chat::{ChatReply, ChatRouter, CompletionProvider};
pub use config::Config;
pub use error::{Error, Result};
pub use faq::{FaqEntry, FaqMatch, FaqMatcher, KnowledgeBase};
pub use replay::ChatEvent;
pub use text::normalize;
pub use topics::{Topic, TopicClassifier};
pub use types::*;

// Public modules
pub mod analytics;
pub mod chat;
pub mod config;
pub mod error;
pub mod faq;
pub mod logging;
pub mod maintenance;
pub mod replay;
pub mod text;
pub mod topics;
pub mod types;
