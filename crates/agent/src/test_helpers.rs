//! Shared test doubles for the agent tests.

use async_trait::async_trait;
use nova_core::error::{LookupError, ProviderError, StoreError};
use nova_core::lookup::{Lookup, LookupKind};
use nova_core::message::{truncate_oldest, ConversationRecord, ConversationSummary, SessionId, Turn};
use nova_core::provider::{GenerateRequest, GenerateResponse, Provider};
use nova_core::store::HistoryStore;
use std::collections::HashMap;
use std::sync::Mutex;

enum LookupScript {
    Found(String),
    Empty,
    Failing,
    Hanging,
}

/// A lookup that always answers the same way and records its calls.
pub struct ScriptedLookup {
    kind: LookupKind,
    script: LookupScript,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedLookup {
    fn new(kind: LookupKind, script: LookupScript) -> Self {
        Self {
            kind,
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn found(kind: LookupKind, text: &str) -> Self {
        Self::new(kind, LookupScript::Found(text.into()))
    }

    pub fn empty(kind: LookupKind) -> Self {
        Self::new(kind, LookupScript::Empty)
    }

    pub fn failing(kind: LookupKind) -> Self {
        Self::new(kind, LookupScript::Failing)
    }

    /// Never completes; only useful with a timeout.
    pub fn hanging(kind: LookupKind) -> Self {
        Self::new(kind, LookupScript::Hanging)
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(q, _)| q.clone())
    }

    pub fn last_max_results(&self) -> Option<usize> {
        self.calls.lock().unwrap().last().map(|(_, n)| *n)
    }
}

#[async_trait]
impl Lookup for ScriptedLookup {
    fn name(&self) -> &str {
        "scripted"
    }

    fn kind(&self) -> LookupKind {
        self.kind
    }

    async fn lookup(&self, query: &str, max_results: usize) -> Result<Option<String>, LookupError> {
        self.calls.lock().unwrap().push((query.to_string(), max_results));
        match &self.script {
            LookupScript::Found(text) => Ok(Some(text.clone())),
            LookupScript::Empty => Ok(None),
            LookupScript::Failing => Err(LookupError::Network("connection refused".into())),
            LookupScript::Hanging => {
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

/// A provider that plays back scripted results in order and records prompts.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ProviderError::NotConfigured("script exhausted".into())));
        next.map(|text| GenerateResponse {
            text,
            model: request.model,
            usage: None,
        })
    }
}

/// An in-process history store; `failing_saves` makes every save error.
pub struct MemoryStore {
    records: Mutex<HashMap<SessionId, ConversationRecord>>,
    max_history_length: usize,
    failing_saves: bool,
}

impl MemoryStore {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_history_length,
            failing_saves: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing_saves: true,
            ..Self::new(50)
        }
    }

    pub fn stored(&self, session_id: &SessionId) -> Option<ConversationRecord> {
        self.records.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn max_history_length(&self) -> usize {
        self.max_history_length
    }

    async fn save(
        &self,
        session_id: &SessionId,
        messages: &[Turn],
    ) -> Result<ConversationRecord, StoreError> {
        if self.failing_saves {
            return Err(StoreError::Io("disk full".into()));
        }
        let mut messages = messages.to_vec();
        truncate_oldest(&mut messages, self.max_history_length);

        let mut records = self.records.lock().unwrap();
        let record = match records.get(session_id) {
            Some(existing) => ConversationRecord {
                messages,
                updated_at: chrono::Utc::now(),
                ..existing.clone()
            },
            None => ConversationRecord::new(session_id.clone(), messages),
        };
        records.insert(session_id.clone(), record.clone());
        Ok(record)
    }

    async fn load(&self, session_id: &SessionId) -> Result<Option<ConversationRecord>, StoreError> {
        Ok(self.stored(session_id))
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .map(|r| r.summary())
            .collect())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.records.lock().unwrap().remove(session_id).is_some())
    }
}
