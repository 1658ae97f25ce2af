//! Keyword-rule topic classification for user messages.

use crate::text::normalize;
use serde::{Deserialize, Serialize};

/// Coarse subject of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Schedule,
    Pricing,
    Trainers,
    Booking,
    Equipment,
    Health,
    Beginners,
    Contacts,
    /// No rule matched
    Other,
}

impl Topic {
    /// Every topic, rule order first and `Other` last.
    pub const ALL: [Topic; 9] = [
        Topic::Schedule,
        Topic::Pricing,
        Topic::Trainers,
        Topic::Booking,
        Topic::Equipment,
        Topic::Health,
        Topic::Beginners,
        Topic::Contacts,
        Topic::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Schedule => "schedule",
            Topic::Pricing => "pricing",
            Topic::Trainers => "trainers",
            Topic::Booking => "booking",
            Topic::Equipment => "equipment",
            Topic::Health => "health",
            Topic::Beginners => "beginners",
            Topic::Contacts => "contacts",
            Topic::Other => "other",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {}", s))
    }
}

/// Trigger fragments per topic, checked in this order.
const RULES: &[(Topic, &[&str])] = &[
    (
        Topic::Schedule,
        &["розклад", "графік", "коли", "відкрит", "працюєте", "години роботи", "вихідн"],
    ),
    (
        Topic::Pricing,
        &["ціна", "ціни", "вартість", "коштує", "абонемент", "оплат", "знижк", "грн"],
    ),
    (Topic::Trainers, &["тренер", "інструктор", "коуч"]),
    (
        Topic::Booking,
        &["запис", "забронювати", "бронюван", "скасувати", "зареєстр"],
    ),
    (
        Topic::Equipment,
        &["обладнання", "тренажер", "гантел", "штанг", "інвентар", "килимок", "роздягальн", "душ"],
    ),
    (
        Topic::Health,
        &["здоров", "травм", "болить", "вагітн", "тиск", "лікар", "протипоказ"],
    ),
    (
        Topic::Beginners,
        &["початків", "новачок", "новачк", "вперше", "перше заняття", "пробне"],
    ),
    (
        Topic::Contacts,
        &["адрес", "знаходит", "телефон", "контакт", "доїхати", "instagram"],
    ),
];

/// Maps message text onto a [`Topic`] using fixed keyword rules.
///
/// Keywords are normalized once at construction so they compare against
/// normalized messages on equal terms.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    rules: Vec<(Topic, Vec<String>)>,
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicClassifier {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(topic, keywords)| {
                let normalized = keywords
                    .iter()
                    .map(|k| normalize(k))
                    .filter(|k| !k.is_empty())
                    .collect();
                (*topic, normalized)
            })
            .collect();
        Self { rules }
    }

    /// Classify a raw message. The first rule with any keyword present wins.
    pub fn classify(&self, text: &str) -> Topic {
        self.classify_normalized(&normalize(text))
    }

    /// Classify text that has already been through [`normalize`].
    pub fn classify_normalized(&self, normalized: &str) -> Topic {
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| normalized.contains(k.as_str())))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::Other)
    }
}
