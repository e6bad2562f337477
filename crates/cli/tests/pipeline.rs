//! End-to-end pipeline tests: a real JSON history store on disk, a scripted
//! model, and scripted lookups.

use async_trait::async_trait;
use nova_agent::{BotDeps, BotSettings, ChatOutcome, InvokerLimits, KnowledgeBot, ToolInvoker, ToolKind};
use nova_core::error::{LookupError, ProviderError};
use nova_core::lookup::{Lookup, LookupKind};
use nova_core::message::SessionId;
use nova_core::provider::{GenerateRequest, GenerateResponse, Provider};
use nova_core::store::HistoryStore;
use nova_core::subject::SubjectMode;
use nova_memory::JsonFileStore;
use nova_providers::{ModelClient, RetryPolicy};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Scripted {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ProviderError::RateLimited("429 Too Many Requests".into())));
        next.map(|text| GenerateResponse {
            text,
            model: request.model,
            usage: None,
        })
    }
}

struct FixedLookup {
    kind: LookupKind,
    text: Option<&'static str>,
}

#[async_trait]
impl Lookup for FixedLookup {
    fn name(&self) -> &str {
        "fixed"
    }

    fn kind(&self) -> LookupKind {
        self.kind
    }

    async fn lookup(&self, _query: &str, _max_results: usize) -> Result<Option<String>, LookupError> {
        Ok(self.text.map(String::from))
    }
}

fn deps(provider: Arc<Scripted>, store: Arc<JsonFileStore>, encyclopedia: Option<&'static str>) -> BotDeps {
    let model = ModelClient::new(provider, "gemini-2.5-flash", 0.7)
        .with_policy(RetryPolicy::new(2, Duration::from_secs(5)));
    let invoker = ToolInvoker::new(
        Arc::new(FixedLookup {
            kind: LookupKind::Encyclopedia,
            text: encyclopedia,
        }),
        Arc::new(FixedLookup {
            kind: LookupKind::WebSearch,
            text: None,
        }),
        Arc::new(FixedLookup {
            kind: LookupKind::VideoSearch,
            text: None,
        }),
        InvokerLimits::default(),
    );
    BotDeps {
        model: Arc::new(model),
        invoker: Arc::new(invoker),
        store,
    }
}

#[tokio::test]
async fn conversation_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let id = SessionId::from("study-session");

    {
        let store = Arc::new(JsonFileStore::new(dir.path(), 50).unwrap());
        let provider = Scripted::new(vec![Ok("Photosynthesis turns light into sugar. 🌱".into())]);
        let mut bot = KnowledgeBot::new(id.clone(), deps(provider, store, None), BotSettings::default()).await;

        let reply = bot.chat("Explain photosynthesis").await;
        assert_eq!(reply.outcome, ChatOutcome::Answered);
    }

    assert!(dir.path().join("study-session.json").exists());

    let store = Arc::new(JsonFileStore::new(dir.path(), 50).unwrap());
    let provider = Scripted::new(vec![Ok("Chlorophyll is the green pigment.".into())]);
    let mut bot = KnowledgeBot::new(
        id.clone(),
        deps(provider.clone(), store.clone(), None),
        BotSettings::default(),
    )
    .await;
    assert_eq!(bot.history().len(), 2);

    bot.chat("What makes leaves green?").await;

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("Human: Explain photosynthesis"));
    assert!(prompt.contains("Assistant: Photosynthesis turns light into sugar. 🌱"));

    let record = store.load(&id).await.unwrap().unwrap();
    assert_eq!(record.messages.len(), 4);
    assert_eq!(record.title, "Explain photosynthesis...");

    let summaries = store.list().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].message_count, 4);
}

#[tokio::test]
async fn calculation_result_reaches_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path(), 50).unwrap());
    let provider = Scripted::new(vec![Ok("12 times 4 is 48! 🎉".into())]);
    let mut bot = KnowledgeBot::new(
        SessionId::from("math"),
        deps(provider.clone(), store, None),
        BotSettings {
            subject: SubjectMode::Math,
            ..BotSettings::default()
        },
    )
    .await;

    let reply = bot.chat("Calculate 12 * 4").await;

    assert_eq!(reply.used_tools, vec![ToolKind::Calculator]);
    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("🧮 **Calculation Result:**\n\n`12 * 4` = **48**"));
    assert!(prompt.contains("Subject focus: Mathematics"));
}

#[tokio::test]
async fn encyclopedia_summary_reaches_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path(), 50).unwrap());
    let provider = Scripted::new(vec![Ok("Marie Curie studied radioactivity.".into())]);
    let mut bot = KnowledgeBot::new(
        SessionId::from("curie"),
        deps(provider.clone(), store, Some("📚 **Marie Curie**\n\nA physicist and chemist.")),
        BotSettings::default(),
    )
    .await;

    let reply = bot.chat("Who is Marie Curie?").await;

    assert!(reply.used_tools());
    assert!(provider.prompts()[0].contains("Relevant information:\n📚 **Marie Curie**"));
}

#[tokio::test(start_paused = true)]
async fn rate_limited_turn_waits_and_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path(), 50).unwrap());
    let provider = Scripted::new(Vec::new());
    let mut bot = KnowledgeBot::new(
        SessionId::from("busy"),
        deps(provider.clone(), store.clone(), None),
        BotSettings::default(),
    )
    .await;

    let started = tokio::time::Instant::now();
    let reply = bot.chat("Explain black holes").await;

    assert_eq!(reply.outcome, ChatOutcome::RateLimited);
    assert_eq!(
        reply.text,
        "⏳ Rate limit reached. Please wait 5 seconds and try again."
    );
    assert_eq!(provider.prompts().len(), 2);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(store.load(&SessionId::from("busy")).await.unwrap().is_none());
}
