//! Three-tier fuzzy matching of questions against a [`KnowledgeBase`].
//!
//! For every entry, in knowledge-base order, and every keyword of that
//! entry, in keyword order:
//!
//! 1. **Exact** - the normalized keyword occurs inside the normalized query.
//! 2. **All tokens** - every token of the keyword occurs somewhere in the
//!    query, in any order.
//!
//! The first keyword satisfying either tier wins. Otherwise the keyword with
//! the best token overlap across the whole base is kept and accepted when its
//! score reaches the minimum confidence.

use super::{FaqEntry, KnowledgeBase};
use crate::text::normalize;
use serde::Serialize;
use std::sync::Arc;

/// Partial-overlap score (percent) required to accept a best-effort match.
pub const DEFAULT_MIN_CONFIDENCE: u8 = 40;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    AllTokens,
    Partial,
}

/// Outcome of [`FaqMatcher::find`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqMatch {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,
}

impl FaqMatch {
    pub fn not_found() -> Self {
        Self {
            found: false,
            answer: None,
            confidence: None,
            matched_keyword: None,
            strategy: None,
        }
    }

    fn hit(entry: &FaqEntry, keyword: &str, confidence: u8, strategy: MatchStrategy) -> Self {
        Self {
            found: true,
            answer: Some(entry.answer.clone()),
            confidence: Some(confidence.min(100)),
            matched_keyword: Some(keyword.to_string()),
            strategy: Some(strategy),
        }
    }
}

#[derive(Debug, Clone)]
struct PreparedKeyword {
    /// Index into the entry's keyword list
    index: usize,
    normalized: String,
    tokens: Vec<String>,
}

impl PreparedKeyword {
    fn is_contained_in(&self, query: &str) -> bool {
        query.contains(self.normalized.as_str())
    }

    fn matched_tokens(&self, query: &str) -> usize {
        self.tokens
            .iter()
            .filter(|t| query.contains(t.as_str()))
            .count()
    }

    fn score(&self, query: &str) -> u8 {
        if self.is_contained_in(query) {
            100
        } else {
            overlap_score(self.matched_tokens(query), self.tokens.len())
        }
    }
}

fn overlap_score(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((matched as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Answers questions from a shared, read-only [`KnowledgeBase`].
///
/// Keywords are normalized and tokenized once when the matcher is built;
/// keywords that normalize to nothing are dropped.
#[derive(Debug, Clone)]
pub struct FaqMatcher {
    kb: Arc<KnowledgeBase>,
    prepared: Vec<Vec<PreparedKeyword>>,
    min_confidence: u8,
}

impl FaqMatcher {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self::with_min_confidence(kb, DEFAULT_MIN_CONFIDENCE)
    }

    pub fn with_min_confidence(kb: Arc<KnowledgeBase>, min_confidence: u8) -> Self {
        let prepared = kb
            .entries()
            .iter()
            .map(|entry| {
                entry
                    .keywords
                    .iter()
                    .enumerate()
                    .filter_map(|(index, keyword)| {
                        let normalized = normalize(keyword);
                        if normalized.is_empty() {
                            return None;
                        }
                        let tokens = normalized.split(' ').map(str::to_string).collect();
                        Some(PreparedKeyword {
                            index,
                            normalized,
                            tokens,
                        })
                    })
                    .collect()
            })
            .collect();

        Self {
            kb,
            prepared,
            min_confidence: min_confidence.min(100),
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn min_confidence(&self) -> u8 {
        self.min_confidence
    }

    /// Resolve a free-text question.
    pub fn find(&self, query: &str) -> FaqMatch {
        let query = normalize(query);
        if query.is_empty() {
            return FaqMatch::not_found();
        }

        // (entry index, keyword, score)
        let mut best: Option<(usize, &PreparedKeyword, u8)> = None;

        for (entry_idx, keywords) in self.prepared.iter().enumerate() {
            for keyword in keywords {
                if keyword.is_contained_in(&query) {
                    return self.entry_hit(entry_idx, keyword, &query, MatchStrategy::Exact);
                }

                let matched = keyword.matched_tokens(&query);
                if matched == keyword.tokens.len() {
                    return self.entry_hit(entry_idx, keyword, &query, MatchStrategy::AllTokens);
                }

                let score = overlap_score(matched, keyword.tokens.len());
                let improves = match best {
                    Some((_, _, best_score)) => score > best_score,
                    None => score > 0,
                };
                if improves {
                    best = Some((entry_idx, keyword, score));
                }
            }
        }

        match best {
            Some((entry_idx, keyword, score)) if score >= self.min_confidence => {
                let entry = &self.kb.entries()[entry_idx];
                tracing::debug!(
                    keyword = %entry.keywords[keyword.index],
                    score,
                    "Partial FAQ match"
                );
                FaqMatch::hit(
                    entry,
                    &entry.keywords[keyword.index],
                    score,
                    MatchStrategy::Partial,
                )
            }
            _ => FaqMatch::not_found(),
        }
    }

    fn entry_hit(
        &self,
        entry_idx: usize,
        keyword: &PreparedKeyword,
        query: &str,
        strategy: MatchStrategy,
    ) -> FaqMatch {
        let entry = &self.kb.entries()[entry_idx];
        let confidence = self.prepared[entry_idx]
            .iter()
            .map(|k| k.score(query))
            .max()
            .unwrap_or(0);
        FaqMatch::hit(entry, &entry.keywords[keyword.index], confidence, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(entries: Vec<FaqEntry>) -> FaqMatcher {
        FaqMatcher::new(Arc::new(KnowledgeBase::new(entries)))
    }

    fn builtin() -> FaqMatcher {
        FaqMatcher::new(Arc::new(KnowledgeBase::builtin().unwrap()))
    }

    #[test]
    fn test_token_subset_match_ignores_extra_words() {
        let m = matcher(vec![FaqEntry::new(["де знаходитесь"], "вул. Спортивна, 10")]);

        let result = m.find("де ви знаходитесь");
        assert!(result.found);
        assert_eq!(result.confidence, Some(100));
        assert_eq!(result.matched_keyword.as_deref(), Some("де знаходитесь"));
        assert_eq!(result.strategy, Some(MatchStrategy::AllTokens));
        assert_eq!(result.answer.as_deref(), Some("вул. Спортивна, 10"));
    }

    #[test]
    fn test_exact_containment_after_normalization() {
        let m = builtin();
        let result = m.find("Які у вас ЦІНИ на абонемент?");
        assert!(result.found);
        assert_eq!(result.strategy, Some(MatchStrategy::Exact));
        assert_eq!(result.matched_keyword.as_deref(), Some("ціни"));
        assert_eq!(result.confidence, Some(100));
        assert!(result.answer.unwrap().contains("Вартість"));
    }

    #[test]
    fn test_first_entry_in_order_wins() {
        let m = matcher(vec![
            FaqEntry::new(["йога"], "first"),
            FaqEntry::new(["ранкова йога"], "second"),
        ]);
        let result = m.find("ранкова йога");
        assert_eq!(result.answer.as_deref(), Some("first"));
    }

    #[test]
    fn test_partial_match_above_threshold() {
        let m = matcher(vec![FaqEntry::new(
            ["персональне тренування онлайн"],
            "Так, проводимо онлайн.",
        )]);

        let result = m.find("чи є персональне тренування?");
        assert!(result.found);
        assert_eq!(result.confidence, Some(67));
        assert_eq!(result.strategy, Some(MatchStrategy::Partial));

        let below = m.find("онлайн оплата");
        assert!(!below.found);
        assert_eq!(below, FaqMatch::not_found());
    }

    #[test]
    fn test_partial_scans_whole_base_for_best_overlap() {
        let m = matcher(vec![
            FaqEntry::new(["йога для вагітних"], "prenatal"),
            FaqEntry::new(["ранкова йога онлайн"], "morning"),
        ]);

        // 1/3 tokens on the first entry, 2/3 on the second.
        let result = m.find("ранкова йога");
        assert!(result.found);
        assert_eq!(result.answer.as_deref(), Some("morning"));
        assert_eq!(result.confidence, Some(67));
        assert_eq!(
            result.matched_keyword.as_deref(),
            Some("ранкова йога онлайн")
        );
    }

    #[test]
    fn test_confidence_is_best_keyword_of_entry() {
        let m = matcher(vec![FaqEntry::new(
            ["абонемент на місяць", "скільки коштує"],
            "2400 грн",
        )]);
        // Hit on the second keyword, confidence reported over the whole entry.
        let result = m.find("скільки коштує абонемент");
        assert_eq!(result.matched_keyword.as_deref(), Some("скільки коштує"));
        assert_eq!(result.confidence, Some(100));
    }

    #[test]
    fn test_no_overlap_is_not_found() {
        let m = matcher(vec![
            FaqEntry::new(["розклад"], "a"),
            FaqEntry::new(["ціни"], "b"),
        ]);
        assert!(!m.find("hello world").found);
        assert!(!builtin().find("hello world").found);
    }

    #[test]
    fn test_empty_query_is_not_found() {
        let m = builtin();
        assert!(!m.find("").found);
        assert!(!m.find("   ?!  ").found);
    }

    #[test]
    fn test_keywords_that_normalize_to_empty_are_skipped() {
        let m = matcher(vec![FaqEntry::new(["???"], "punctuation only")]);
        assert!(!m.find("anything at all").found);

        let m = matcher(vec![FaqEntry::new(["!!!", "ціни"], "prices")]);
        let result = m.find("ціни?");
        assert!(result.found);
        assert_eq!(result.matched_keyword.as_deref(), Some("ціни"));
    }

    #[test]
    fn test_confidence_always_within_bounds() {
        let m = builtin();
        for query in [
            "коли ви відкриті",
            "де ви знаходитесь",
            "як записатися на пробне заняття",
            "що взяти",
            "телефон",
            "тренування для початківців у вихідні",
            "абракадабра",
        ] {
            let result = m.find(query);
            if let Some(confidence) = result.confidence {
                assert!(confidence <= 100, "{query}: {confidence}");
                assert!(result.found);
            }
        }
    }

    #[test]
    fn test_min_confidence_is_configurable() {
        let kb = Arc::new(KnowledgeBase::new(vec![FaqEntry::new(
            ["персональне тренування онлайн"],
            "online",
        )]));
        let strict = FaqMatcher::with_min_confidence(kb.clone(), 80);
        assert!(!strict.find("персональне тренування").found);

        let lenient = FaqMatcher::with_min_confidence(kb, 30);
        assert!(lenient.find("онлайн").found);
    }

    #[test]
    fn test_match_serializes_with_camel_case_fields() {
        let m = matcher(vec![FaqEntry::new(["де знаходитесь"], "тут")]);
        let json = serde_json::to_value(m.find("де знаходитесь")).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["matchedKeyword"], "де знаходитесь");
        assert_eq!(json["confidence"], 100);

        let json = serde_json::to_value(FaqMatch::not_found()).unwrap();
        assert_eq!(json, serde_json::json!({"found": false}));
    }
}
