//! Curated knowledge base and the fuzzy matcher that answers from it.
//!
//! A knowledge base is a TOML document of `[[entries]]`, each carrying an
//! ordered list of trigger phrases and the answer to serve:
//!
//! ```toml
//! [[entries]]
//! keywords = ["адреса", "де знаходитесь"]
//! answer = "Ми знаходимося за адресою ..."
//! ```
//!
//! The base is read-only once loaded; [`FaqMatcher`] borrows it through an
//! `Arc` so any number of request handlers can match concurrently.

mod matcher;

pub use matcher::{FaqMatch, FaqMatcher, MatchStrategy, DEFAULT_MIN_CONFIDENCE};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.toml");

/// One canned answer and the phrases that trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaqEntry {
    /// Trigger phrases; the first is canonical
    pub keywords: Vec<String>,
    /// Answer text served verbatim
    pub answer: String,
}

impl FaqEntry {
    pub fn new<K, S>(keywords: K, answer: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        }
    }

    /// The canonical trigger phrase.
    pub fn canonical_keyword(&self) -> Option<&str> {
        self.keywords.first().map(String::as_str)
    }
}

/// Static, ordered collection of [`FaqEntry`] values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    entries: Vec<FaqEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// The knowledge base bundled with the library.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_KNOWLEDGE_BASE)
    }

    /// Load a knowledge base file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::KnowledgeBase(format!("failed to read {}: {}", path.display(), e))
        })?;
        let kb = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = kb.len(),
            "Loaded knowledge base"
        );
        Ok(kb)
    }

    /// Parse and validate a TOML knowledge base.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let kb: KnowledgeBase = toml::from_str(content)
            .map_err(|e| Error::KnowledgeBase(format!("failed to parse: {}", e)))?;
        kb.validate()?;
        Ok(kb)
    }

    fn validate(&self) -> Result<()> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.keywords.is_empty() {
                return Err(Error::KnowledgeBase(format!(
                    "entry {} has no keywords",
                    idx + 1
                )));
            }
            if entry.answer.trim().is_empty() {
                return Err(Error::KnowledgeBase(format!(
                    "entry {} ({:?}) has an empty answer",
                    idx + 1,
                    entry.keywords[0]
                )));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
