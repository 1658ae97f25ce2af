//! Chat turn routing: knowledge base first, completion model second.
//!
//! A turn is answered from the FAQ base when the matcher accepts it.
//! Anything else goes to a [`CompletionProvider`] under a timeout. Both the
//! visitor's message and the reply are recorded in [`ChatAnalytics`] only
//! once the reply is settled, so an abandoned or failed completion never
//! leaves a half-logged turn behind.

use crate::analytics::ChatAnalytics;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::faq::{FaqMatcher, KnowledgeBase};
use crate::types::{ResponseSource, Role};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Reply shown to the visitor when the completion model is unavailable.
pub const FALLBACK_REPLY: &str =
    "Вибачте, зараз я не можу відповісти. Спробуйте ще раз або зателефонуйте нам.";

/// External language-model completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce a reply to `prompt` within the conversation `conversation_id`.
    async fn complete(&self, conversation_id: &str, prompt: &str) -> Result<String>;
}

/// Settled answer to one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub source: ResponseSource,
    /// Match confidence for FAQ answers
    pub confidence: Option<u8>,
}

pub struct ChatRouter {
    analytics: Arc<ChatAnalytics>,
    matcher: FaqMatcher,
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl ChatRouter {
    pub fn new(
        analytics: Arc<ChatAnalytics>,
        matcher: FaqMatcher,
        provider: Arc<dyn CompletionProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            analytics,
            matcher,
            provider,
            timeout,
        }
    }

    /// Build a router from configuration, loading the configured knowledge
    /// base or the built-in one.
    pub fn from_config(
        config: &Config,
        analytics: Arc<ChatAnalytics>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        let kb = match &config.faq.knowledge_base {
            Some(path) => KnowledgeBase::load_from(path)?,
            None => KnowledgeBase::builtin()?,
        };
        tracing::info!(entries = kb.len(), "Knowledge base loaded");

        let matcher = FaqMatcher::with_min_confidence(Arc::new(kb), config.faq.min_confidence);
        Ok(Self::new(
            analytics,
            matcher,
            provider,
            Duration::from_secs(config.completion.timeout_secs),
        ))
    }

    pub fn analytics(&self) -> &Arc<ChatAnalytics> {
        &self.analytics
    }

    pub fn matcher(&self) -> &FaqMatcher {
        &self.matcher
    }

    /// Answer one visitor message.
    ///
    /// Starts the session on its first turn. On completion failure the turn
    /// is still recorded with source `error` and the error is returned; the
    /// caller shows [`FALLBACK_REPLY`] or its own message.
    pub async fn handle_turn(
        &self,
        conversation_id: &str,
        user_agent: &str,
        client_address: &str,
        text: &str,
    ) -> Result<ChatReply> {
        self.analytics
            .start_session(conversation_id, user_agent, client_address);

        let hit = self.matcher.find(text);
        if hit.found {
            let answer = hit.answer.unwrap_or_default();
            tracing::debug!(
                conversation_id,
                confidence = hit.confidence,
                keyword = hit.matched_keyword.as_deref().unwrap_or_default(),
                "Answered from FAQ"
            );
            self.record(conversation_id, text, &answer, ResponseSource::Faq);
            return Ok(ChatReply {
                text: answer,
                source: ResponseSource::Faq,
                confidence: hit.confidence,
            });
        }

        let outcome = tokio::time::timeout(
            self.timeout,
            self.provider.complete(conversation_id, text),
        )
        .await
        .unwrap_or_else(|_| Err(Error::CompletionTimeout(self.timeout)));

        match outcome {
            Ok(reply) => {
                self.record(conversation_id, text, &reply, ResponseSource::Ai);
                Ok(ChatReply {
                    text: reply,
                    source: ResponseSource::Ai,
                    confidence: None,
                })
            }
            Err(e) => {
                tracing::warn!(conversation_id, error = %e, "Completion failed");
                self.record(conversation_id, text, FALLBACK_REPLY, ResponseSource::Error);
                Err(e)
            }
        }
    }

    /// Close the conversation and fold it into today's statistics.
    pub fn end_conversation(&self, conversation_id: &str) -> bool {
        self.analytics.end_session(conversation_id).is_some()
    }

    fn record(&self, conversation_id: &str, question: &str, reply: &str, source: ResponseSource) {
        self.analytics
            .log_message(conversation_id, Role::User, question, ResponseSource::User);
        self.analytics
            .log_message(conversation_id, Role::Bot, reply, source);
    }
}
