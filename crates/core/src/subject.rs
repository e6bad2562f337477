//! Subject modes: the learning focus that colours every prompt.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A subject focus. Purely a prompt modifier; never persisted per turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectMode {
    #[default]
    General,
    Math,
    Science,
    History,
    Literature,
    Programming,
    Geography,
    Art,
}

impl SubjectMode {
    /// Every subject, in menu order.
    pub const ALL: [SubjectMode; 8] = [
        Self::General,
        Self::Math,
        Self::Science,
        Self::History,
        Self::Literature,
        Self::Programming,
        Self::Geography,
        Self::Art,
    ];

    /// The config/CLI key (`"math"`, `"art"`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Math => "math",
            Self::Science => "science",
            Self::History => "history",
            Self::Literature => "literature",
            Self::Programming => "programming",
            Self::Geography => "geography",
            Self::Art => "art",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::General => "General Knowledge",
            Self::Math => "Mathematics",
            Self::Science => "Science",
            Self::History => "History",
            Self::Literature => "Literature",
            Self::Programming => "Programming",
            Self::Geography => "Geography",
            Self::Art => "Art & Music",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::General => "🌐",
            Self::Math => "🧮",
            Self::Science => "🔬",
            Self::History => "📜",
            Self::Literature => "📖",
            Self::Programming => "💻",
            Self::Geography => "🌍",
            Self::Art => "🎨",
        }
    }

    /// Starter prompts suggested for a fresh conversation.
    pub fn suggestions(&self) -> [&'static str; 4] {
        match self {
            Self::General => [
                "Quiz me on world capitals",
                "Explain quantum physics",
                "Create flashcards for photosynthesis",
                "Find videos about black holes",
            ],
            Self::Math => [
                "Calculate 456 * 789",
                "Explain the Pythagorean theorem",
                "Quiz me on fractions",
                "Create flashcards for algebra",
            ],
            Self::Science => [
                "Explain how DNA works",
                "Quiz me on the periodic table",
                "Create flashcards for chemistry",
                "Find videos about evolution",
            ],
            Self::History => [
                "Tell me about World War 2",
                "Quiz me on ancient Rome",
                "Create flashcards for US presidents",
                "Find videos about the Renaissance",
            ],
            Self::Literature => [
                "Explain Shakespeare's themes",
                "Quiz me on literary devices",
                "Create flashcards for poetry terms",
                "Who wrote To Kill a Mockingbird?",
            ],
            Self::Programming => [
                "Explain what is an API",
                "Quiz me on Python basics",
                "Create flashcards for data structures",
                "Find videos about machine learning",
            ],
            Self::Geography => [
                "Name the longest river",
                "Quiz me on countries",
                "Create flashcards for continents",
                "Find videos about climate zones",
            ],
            Self::Art => [
                "Who painted the Mona Lisa?",
                "Quiz me on art movements",
                "Create flashcards for music theory",
                "Find videos about impressionism",
            ],
        }
    }

    /// The `Subject focus: <name> <icon>` line injected into prompts.
    pub fn prompt_context(&self) -> String {
        format!("Subject focus: {} {}", self.display_name(), self.icon())
    }
}

impl std::fmt::Display for SubjectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.display_name())
    }
}

impl FromStr for SubjectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| format!("Unknown subject '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Math".parse::<SubjectMode>().unwrap(), SubjectMode::Math);
        assert_eq!(" art ".parse::<SubjectMode>().unwrap(), SubjectMode::Art);
        assert!("alchemy".parse::<SubjectMode>().is_err());
    }

    #[test]
    fn keys_round_trip() {
        for mode in SubjectMode::ALL {
            assert_eq!(mode.key().parse::<SubjectMode>().unwrap(), mode);
        }
    }

    #[test]
    fn prompt_context_uses_name_and_icon() {
        assert_eq!(
            SubjectMode::Art.prompt_context(),
            "Subject focus: Art & Music 🎨"
        );
        assert_eq!(SubjectMode::default(), SubjectMode::General);
    }

    #[test]
    fn serde_uses_key() {
        let json = serde_json::to_string(&SubjectMode::Programming).unwrap();
        assert_eq!(json, r#""programming""#);
    }
}
