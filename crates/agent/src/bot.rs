//! The knowledge bot: one learner session's request pipeline.
//!
//! Each message runs classify → invoke tools → compose prompt → model →
//! persist. Every failure is turned into a reply the learner can read; a
//! failed or rate-limited turn is never written to history.

use crate::intent::classify;
use crate::invoker::{ToolInvoker, ToolKind};
use crate::memory::ConversationMemory;
use crate::prompt::{PromptComposer, PromptInput, HISTORY_WINDOW};
use nova_core::error::Error;
use nova_core::message::{SessionId, Turn};
use nova_core::store::HistoryStore;
use nova_core::subject::SubjectMode;
use nova_providers::{ModelClient, ModelReply};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The shared collaborators a bot runs against.
#[derive(Clone)]
pub struct BotDeps {
    pub model: Arc<ModelClient>,
    pub invoker: Arc<ToolInvoker>,
    pub store: Arc<dyn HistoryStore>,
}

/// Per-session presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub name: String,
    pub subject: SubjectMode,
    pub eli5: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            name: "Nova".into(),
            subject: SubjectMode::General,
            eli5: false,
        }
    }
}

impl From<&nova_config::BotConfig> for BotSettings {
    fn from(config: &nova_config::BotConfig) -> Self {
        Self {
            name: config.name.clone(),
            subject: config.subject,
            eli5: config.eli5,
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Answered,
    RateLimited,
    Failed,
}

/// What the learner sees for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub used_tools: Vec<ToolKind>,
    pub outcome: ChatOutcome,
}

impl ChatReply {
    pub fn used_tools(&self) -> bool {
        !self.used_tools.is_empty()
    }
}

pub struct KnowledgeBot {
    deps: BotDeps,
    settings: BotSettings,
    composer: PromptComposer,
    memory: ConversationMemory,
}

impl KnowledgeBot {
    /// Start (or resume) the session `session_id`.
    pub async fn new(session_id: SessionId, deps: BotDeps, settings: BotSettings) -> Self {
        let memory = ConversationMemory::open(session_id, deps.store.clone()).await;
        Self {
            composer: PromptComposer::new(&settings.name),
            deps,
            settings,
            memory,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.memory.session_id()
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn set_subject(&mut self, subject: SubjectMode) {
        self.settings.subject = subject;
    }

    pub fn set_eli5_mode(&mut self, enabled: bool) {
        self.settings.eli5 = enabled;
    }

    /// The session's turns, oldest first.
    pub fn history(&self) -> &[Turn] {
        self.memory.messages()
    }

    /// Forget this session's in-memory turns.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Move to another session, keeping subject and ELI5 settings.
    pub async fn switch_session(&mut self, session_id: SessionId) {
        self.memory = ConversationMemory::open(session_id, self.deps.store.clone()).await;
    }

    /// Answer one learner message.
    pub async fn chat(&mut self, input: &str) -> ChatReply {
        match self.answer(input).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session = %self.session_id(), error = %e, "Turn failed");
                ChatReply {
                    text: format!("I'm sorry, I encountered an error: {e}"),
                    used_tools: Vec::new(),
                    outcome: ChatOutcome::Failed,
                }
            }
        }
    }

    async fn answer(&mut self, input: &str) -> Result<ChatReply, Error> {
        let intents = classify(input);
        debug!(session = %self.session_id(), ?intents, "Classified message");

        let report = self.deps.invoker.run(input, &intents).await;

        let prompt = self.composer.compose(&PromptInput {
            subject: self.settings.subject,
            eli5: self.settings.eli5,
            history: self.memory.recent(HISTORY_WINDOW),
            tool_results: &report.results,
            user_input: input,
            template: intents.template(),
        });

        let text = match self.deps.model.generate(&prompt).await? {
            ModelReply::Text(text) => text,
            ModelReply::Exhausted { attempts } => {
                let delay = self.deps.model.policy().retry_delay.as_secs();
                info!(session = %self.session_id(), attempts, "Rate limited, turn not saved");
                return Ok(ChatReply {
                    text: rate_limit_message(delay),
                    used_tools: Vec::new(),
                    outcome: ChatOutcome::RateLimited,
                });
            }
        };

        self.memory.add_interaction(input, text.as_str()).await?;
        info!(
            session = %self.session_id(),
            template = ?intents.template(),
            tools = ?report.used,
            "Turn answered"
        );

        Ok(ChatReply {
            text,
            used_tools: report.used,
            outcome: ChatOutcome::Answered,
        })
    }
}

/// The reply shown when every attempt was rate limited.
pub fn rate_limit_message(delay_secs: u64) -> String {
    format!("⏳ Rate limit reached. Please wait {delay_secs} seconds and try again.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::InvokerLimits;
    use crate::test_helpers::{MemoryStore, ScriptedLookup, ScriptedProvider};
    use nova_core::error::ProviderError;
    use nova_core::lookup::LookupKind;
    use nova_providers::RetryPolicy;
    use std::time::Duration;

    struct Harness {
        provider: Arc<ScriptedProvider>,
        store: Arc<MemoryStore>,
        deps: BotDeps,
    }

    fn harness(provider: ScriptedProvider, store: MemoryStore, encyclopedia: ScriptedLookup) -> Harness {
        let provider = Arc::new(provider);
        let store = Arc::new(store);
        let model = ModelClient::new(provider.clone(), "gemini-2.5-flash", 0.7)
            .with_policy(RetryPolicy::new(2, Duration::from_secs(5)));
        let invoker = ToolInvoker::new(
            Arc::new(encyclopedia),
            Arc::new(ScriptedLookup::empty(LookupKind::WebSearch)),
            Arc::new(ScriptedLookup::empty(LookupKind::VideoSearch)),
            InvokerLimits::default(),
        );
        Harness {
            provider: provider.clone(),
            store: store.clone(),
            deps: BotDeps {
                model: Arc::new(model),
                invoker: Arc::new(invoker),
                store,
            },
        }
    }

    fn simple(provider: ScriptedProvider) -> Harness {
        harness(
            provider,
            MemoryStore::new(50),
            ScriptedLookup::empty(LookupKind::Encyclopedia),
        )
    }

    async fn bot(h: &Harness, id: &str) -> KnowledgeBot {
        KnowledgeBot::new(SessionId::from(id), h.deps.clone(), BotSettings::default()).await
    }

    #[tokio::test]
    async fn answered_turn_is_persisted() {
        let h = simple(ScriptedProvider::replies(&["Hi there! 👋"]));
        let mut bot = bot(&h, "s1").await;

        let reply = bot.chat("Hello").await;

        assert_eq!(reply.outcome, ChatOutcome::Answered);
        assert_eq!(reply.text, "Hi there! 👋");
        assert!(!reply.used_tools());
        assert_eq!(bot.history().len(), 2);
        assert_eq!(h.store.stored(&SessionId::from("s1")).unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn lookup_results_reach_prompt() {
        let h = harness(
            ScriptedProvider::replies(&["Gravity pulls things together."]),
            MemoryStore::new(50),
            ScriptedLookup::found(LookupKind::Encyclopedia, "📚 **Gravity**"),
        );
        let mut bot = bot(&h, "s2").await;

        let reply = bot.chat("Tell me about gravity").await;

        assert_eq!(reply.used_tools, vec![ToolKind::Encyclopedia]);
        let prompt = &h.provider.prompts()[0];
        assert!(prompt.contains("Relevant information:\n📚 **Gravity**"));
        assert!(prompt.contains("This is the start of our conversation."));
    }

    #[tokio::test]
    async fn follow_up_sees_history() {
        let h = simple(ScriptedProvider::replies(&["Newton was a physicist.", "In 1687."]));
        let mut bot = bot(&h, "s3").await;

        bot.chat("Who was Newton?").await;
        bot.chat("When did he publish?").await;

        let prompt = &h.provider.prompts()[1];
        assert!(prompt.contains("Human: Who was Newton?\nAssistant: Newton was a physicist."));
    }

    #[tokio::test]
    async fn settings_shape_prompt() {
        let h = simple(ScriptedProvider::replies(&["🎯 **Quiz Time!**"]));
        let mut bot = bot(&h, "s4").await;
        bot.set_subject(SubjectMode::History);
        bot.set_eli5_mode(true);

        bot.chat("Quiz me on the Romans").await;

        let prompt = &h.provider.prompts()[0];
        assert!(prompt.contains("Subject focus: History 📜"));
        assert!(prompt.contains("ELI5 MODE ACTIVE"));
        assert!(prompt.contains("Create an engaging quiz!"));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhaustion_is_not_saved() {
        let h = simple(ScriptedProvider::new(vec![
            Err(ProviderError::RateLimited("429".into())),
            Err(ProviderError::RateLimited("429".into())),
        ]));
        let mut bot = bot(&h, "s5").await;

        let reply = bot.chat("Explain atoms").await;

        assert_eq!(reply.outcome, ChatOutcome::RateLimited);
        assert_eq!(
            reply.text,
            "⏳ Rate limit reached. Please wait 5 seconds and try again."
        );
        assert!(bot.history().is_empty());
        assert!(h.store.stored(&SessionId::from("s5")).is_none());
    }

    #[tokio::test]
    async fn model_error_becomes_apology() {
        let h = simple(ScriptedProvider::new(vec![Err(
            ProviderError::AuthenticationFailed("bad key".into()),
        )]));
        let mut bot = bot(&h, "s6").await;

        let reply = bot.chat("Hello").await;

        assert_eq!(reply.outcome, ChatOutcome::Failed);
        assert!(reply.text.starts_with("I'm sorry, I encountered an error: "));
        assert!(reply.text.contains("bad key"));
        assert!(bot.history().is_empty());
    }

    #[tokio::test]
    async fn save_failure_becomes_apology() {
        let h = harness(
            ScriptedProvider::replies(&["fine"]),
            MemoryStore::failing(),
            ScriptedLookup::empty(LookupKind::Encyclopedia),
        );
        let mut bot = bot(&h, "s7").await;

        let reply = bot.chat("Hello").await;

        assert_eq!(reply.outcome, ChatOutcome::Failed);
        assert!(reply.text.contains("disk full"));
        assert!(bot.history().is_empty());
    }

    #[tokio::test]
    async fn clear_and_switch_session() {
        let h = simple(ScriptedProvider::replies(&["one", "two"]));
        let mut bot = bot(&h, "first").await;
        bot.chat("q1").await;

        bot.clear_memory();
        assert!(bot.history().is_empty());

        bot.switch_session(SessionId::from("second")).await;
        assert_eq!(bot.session_id().as_str(), "second");
        bot.chat("q2").await;

        bot.switch_session(SessionId::from("first")).await;
        assert_eq!(bot.history().len(), 2);
        assert_eq!(bot.history()[1].content, "one");
    }
}
