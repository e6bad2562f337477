//! Prompt composer: turns a classified request plus its context into the
//! single prompt string sent to the model.

use crate::intent::PromptTemplate;
use nova_core::message::Turn;
use nova_core::subject::SubjectMode;

/// How many trailing turns the prompt quotes.
pub const HISTORY_WINDOW: usize = 6;

const EMPTY_HISTORY: &str = "This is the start of our conversation.";

const ELI5_BLOCK: &str = "
🧒 ELI5 MODE ACTIVE: Explain EVERYTHING as if talking to a 5-year-old child.
- Use only simple, everyday words
- Use fun comparisons like \"it's like when you...\"
- Keep sentences very short
- Use lots of friendly emojis
- Make it fun and exciting!
";

const QUIZ_FORMAT: &str = "Create a fun quiz with 3-5 multiple choice questions. Format each question like this:

🎯 **Quiz Time!**

**Question 1:** [Question]
A) [Option A]
B) [Option B]
C) [Option C]
D) [Option D]

(Continue with more questions)

---
📝 **Answers:**
1. [Correct answer with brief explanation]
2. [Correct answer with brief explanation]
...";

const FLASHCARD_FORMAT: &str = "Create 5 flashcards for studying. Format like this:

📚 **Study Flashcards**

---
**Card 1**
📝 **Front:** [Question or term]
💡 **Back:** [Answer or definition]

---
**Card 2**
📝 **Front:** [Question or term]
💡 **Back:** [Answer or definition]

(Continue with more cards)

💪 **Study tip:** [A helpful tip for remembering this topic]";

const CONVERSATIONAL_GUIDANCE: &str = "Respond helpfully and naturally. Be warm and use emojis appropriately.
If there's relevant information provided above, use it to give an accurate answer.
If the user asks a follow-up question, refer to the person or topic from the previous conversation.";

/// Everything a prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub subject: SubjectMode,
    pub eli5: bool,
    /// Prior turns, oldest first; only the last [`HISTORY_WINDOW`] are used
    pub history: &'a [Turn],
    /// Collected helper output; only the conversational template quotes it
    pub tool_results: &'a str,
    pub user_input: &'a str,
    pub template: PromptTemplate,
}

pub struct PromptComposer {
    bot_name: String,
}

impl PromptComposer {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    pub fn compose(&self, input: &PromptInput<'_>) -> String {
        let name = &self.bot_name;
        let subject = input.subject.prompt_context();
        let eli5 = if input.eli5 { ELI5_BLOCK } else { "" };
        let history = render_history(input.history);
        let user_input = input.user_input;

        match input.template {
            PromptTemplate::Quiz => format!(
                "You are {name}, an educational AI. Create an engaging quiz!
{subject}
{eli5}

Previous conversation:
{history}

User request: {user_input}

{QUIZ_FORMAT}"
            ),
            PromptTemplate::Flashcards => format!(
                "You are {name}, an educational AI. Create helpful study flashcards!
{subject}
{eli5}

Previous conversation:
{history}

User request: {user_input}

{FLASHCARD_FORMAT}"
            ),
            PromptTemplate::Conversational => format!(
                "You are {name}, a friendly and knowledgeable educational AI assistant.
{subject}
{eli5}

Previous conversation:
{history}

{tool_results}

User: {user_input}

{CONVERSATIONAL_GUIDANCE}",
                tool_results = input.tool_results,
            ),
        }
    }
}

/// `Human:` / `Assistant:` lines for the last few turns.
pub fn render_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.into();
    }
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}
