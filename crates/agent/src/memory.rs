//! Conversation memory: the in-process message log of one session, backed
//! by a [`HistoryStore`].
//!
//! The log is loaded once on construction and written through on every
//! completed exchange. The in-process log is the source of truth: each save
//! writes it whole, so after [`ConversationMemory::clear`] the next exchange
//! replaces the stored record instead of extending it. The store owns
//! truncation, and the log adopts whatever the store kept. Loading never
//! fails the session: an unreadable record starts an empty log.

use nova_core::error::StoreError;
use nova_core::message::{SessionId, Turn};
use nova_core::store::HistoryStore;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ConversationMemory {
    session_id: SessionId,
    messages: Vec<Turn>,
    store: Arc<dyn HistoryStore>,
}

impl ConversationMemory {
    /// Open the log for `session_id`, resuming any stored record.
    pub async fn open(session_id: SessionId, store: Arc<dyn HistoryStore>) -> Self {
        let messages = match store.load(&session_id).await {
            Ok(Some(record)) => record.messages,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(session = %session_id, error = %e, "Could not load history, starting fresh");
                Vec::new()
            }
        };
        debug!(session = %session_id, turns = messages.len(), "Conversation memory opened");

        Self {
            session_id,
            messages,
            store,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// All turns, oldest first.
    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    /// The last `n` turns.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Record one exchange and persist the whole log.
    pub async fn add_interaction(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<(), StoreError> {
        let mut messages = self.messages.clone();
        messages.push(Turn::user(user));
        messages.push(Turn::assistant(assistant));

        let record = self.store.save(&self.session_id, &messages).await?;
        self.messages = record.messages;
        Ok(())
    }

    /// Forget the in-memory log. The stored record is left alone.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
