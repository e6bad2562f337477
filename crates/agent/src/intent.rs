//! Intent classifier: keyword flags that route a request.
//!
//! Each flag is computed independently by case-insensitive substring
//! matching, so one message can ask for a video and a calculation at once.

use regex_lite::Regex;
use std::sync::LazyLock;

const QUIZ_KEYWORDS: &[&str] = &[
    "quiz",
    "test me",
    "practice questions",
    "questions about",
    "test my knowledge",
];

const FLASHCARD_KEYWORDS: &[&str] = &[
    "flashcard",
    "flash card",
    "study cards",
    "vocabulary cards",
    "create cards",
];

const VIDEO_KEYWORDS: &[&str] = &["video", "youtube", "watch", "tutorial video", "show me a video"];

const CALCULATION_KEYWORDS: &[&str] = &["calculate", "compute", "what is", "solve", "equals"];

const SEARCH_KEYWORDS: &[&str] = &[
    "who is",
    "what is",
    "where is",
    "when did",
    "how did",
    "tell me about",
    "explain",
];

static ARITHMETIC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d+\s*[+\-*/^]\s*\d+").ok());

static EXPRESSION_RUN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[0-9.+\-*/^()\s]+").ok());

/// Which prompt shape a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    Quiz,
    Flashcards,
    Conversational,
}

/// The routing flags for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub quiz: bool,
    pub flashcard: bool,
    pub video: bool,
    pub calculation: bool,
    pub search: bool,
}

impl Intents {
    /// Quiz wins over flashcards, which win over plain conversation.
    pub fn template(&self) -> PromptTemplate {
        if self.quiz {
            PromptTemplate::Quiz
        } else if self.flashcard {
            PromptTemplate::Flashcards
        } else {
            PromptTemplate::Conversational
        }
    }

    /// Whether to consult the encyclopedia / web. Quiz and flashcard
    /// requests are generated from the model's own knowledge.
    pub fn wants_lookup(&self) -> bool {
        self.search && !self.quiz && !self.flashcard
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Classify `text`.
pub fn classify(text: &str) -> Intents {
    let lower = text.to_lowercase();
    let has_arithmetic = ARITHMETIC.as_ref().is_some_and(|re| re.is_match(text));

    Intents {
        quiz: contains_any(&lower, QUIZ_KEYWORDS),
        flashcard: contains_any(&lower, FLASHCARD_KEYWORDS),
        video: contains_any(&lower, VIDEO_KEYWORDS),
        calculation: has_arithmetic || contains_any(&lower, CALCULATION_KEYWORDS),
        search: contains_any(&lower, SEARCH_KEYWORDS),
    }
}

/// The first run of expression characters that contains a digit, trimmed.
pub fn extract_expression(text: &str) -> Option<String> {
    EXPRESSION_RUN
        .as_ref()?
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|run| run.chars().any(|c| c.is_ascii_digit()))
        .map(String::from)
}
