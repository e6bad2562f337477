//! File-based history store: one pretty-printed JSON record per session.
//!
//! Storage location: `<dir>/<session_id>.json`, where `dir` defaults to
//! `chat_history` in the working directory. Records are human-inspectable
//! and every save rewrites the whole file.

use async_trait::async_trait;
use chrono::Utc;
use nova_core::error::StoreError;
use nova_core::message::{
    truncate_oldest, ConversationRecord, ConversationSummary, SessionId, Turn,
};
use nova_core::store::HistoryStore;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A directory of per-session JSON records.
pub struct JsonFileStore {
    dir: PathBuf,
    max_history_length: usize,
}

impl JsonFileStore {
    /// Open (and create if needed) the store directory.
    pub fn new(dir: impl Into<PathBuf>, max_history_length: usize) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Io(format!(
                "Failed to create history directory {}: {e}",
                dir.display()
            ))
        })?;
        debug!(dir = %dir.display(), max_history_length, "JSON history store ready");
        Ok(Self {
            dir,
            max_history_length: max_history_length.max(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `session_id`, rejecting ids that could escape
    /// the store directory.
    fn record_path(&self, session_id: &SessionId) -> Result<PathBuf, StoreError> {
        let id = session_id.as_str();
        let unsafe_id = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0']);
        if unsafe_id {
            return Err(StoreError::InvalidSessionId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    /// Read and parse one record file. Unparseable content is treated as
    /// missing.
    fn read_record(path: &Path) -> Result<Option<ConversationRecord>, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        match serde_json::from_str::<ConversationRecord>(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping corrupted history record");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    fn max_history_length(&self) -> usize {
        self.max_history_length
    }

    async fn save(
        &self,
        session_id: &SessionId,
        messages: &[Turn],
    ) -> Result<ConversationRecord, StoreError> {
        let path = self.record_path(session_id)?;

        let mut messages = messages.to_vec();
        truncate_oldest(&mut messages, self.max_history_length);

        let record = match Self::read_record(&path)? {
            Some(existing) => ConversationRecord {
                session_id: session_id.clone(),
                title: existing.title,
                created_at: existing.created_at,
                updated_at: Utc::now(),
                messages,
            },
            None => ConversationRecord::new(session_id.clone(), messages),
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| {
            StoreError::Io(format!("Failed to write {}: {e}", path.display()))
        })?;

        debug!(
            session = %session_id,
            messages = record.messages.len(),
            "Conversation saved"
        );
        Ok(record)
    }

    async fn load(&self, session_id: &SessionId) -> Result<Option<ConversationRecord>, StoreError> {
        let path = self.record_path(session_id)?;
        Self::read_record(&path)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            StoreError::Io(format!("Failed to list {}: {e}", self.dir.display()))
        })?;

        let mut summaries: Vec<ConversationSummary> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| match Self::read_record(&path) {
                Ok(record) => record.map(|r| r.summary()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable history file");
                    None
                }
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let path = self.record_path(session_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(session = %session_id, "Conversation deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}
