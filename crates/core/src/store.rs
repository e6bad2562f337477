//! HistoryStore trait: durable per-session conversation records.
//!
//! Every save is a whole-record overwrite. The store preserves a record's
//! `created_at` and `title` across saves and caps the stored turns at its
//! configured history length.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::message::{ConversationRecord, ConversationSummary, SessionId, Turn};

/// The core HistoryStore trait.
///
/// Implementations: JSON file per session.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "json_file").
    fn name(&self) -> &str;

    /// Maximum number of turns kept per record.
    fn max_history_length(&self) -> usize;

    /// Replace the record for `session_id` with `messages` (truncated to the
    /// cap), keeping the existing creation time and title if one exists.
    async fn save(
        &self,
        session_id: &SessionId,
        messages: &[Turn],
    ) -> std::result::Result<ConversationRecord, StoreError>;

    /// Load a record. Missing and unparseable records both yield `None`.
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> std::result::Result<Option<ConversationRecord>, StoreError>;

    /// Summaries of every stored record, most recently updated first.
    async fn list(&self) -> std::result::Result<Vec<ConversationSummary>, StoreError>;

    /// Remove a record. Returns false when there was nothing to remove.
    async fn delete(&self, session_id: &SessionId) -> std::result::Result<bool, StoreError>;

    /// Append one user/assistant exchange to the stored record, extending
    /// whatever is on disk. Callers holding their own log write it whole
    /// with [`HistoryStore::save`] instead.
    async fn append(
        &self,
        session_id: &SessionId,
        user_turn: Turn,
        assistant_turn: Turn,
    ) -> std::result::Result<ConversationRecord, StoreError> {
        let mut messages = self
            .load(session_id)
            .await?
            .map(|record| record.messages)
            .unwrap_or_default();
        messages.push(user_turn);
        messages.push(assistant_turn);
        self.save(session_id, &messages).await
    }
}
