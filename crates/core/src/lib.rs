//! # Nova Core
//!
//! Domain types, traits, and error definitions for the Nova educational
//! chat bot. This crate has **no I/O of its own**; it defines the model that
//! the provider, tool, memory, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: a hosted generative model endpoint
//! - [`Lookup`]: an encyclopedia, web, or video search helper
//! - [`HistoryStore`]: durable per-session conversation records
//!
//! Implementations live in their own crates, so the routing logic can be
//! tested against scripted mocks.

pub mod error;
pub mod lookup;
pub mod message;
pub mod provider;
pub mod store;
pub mod subject;

// Re-export key types at crate root for ergonomics
pub use error::{Error, LookupError, ProviderError, Result, StoreError};
pub use lookup::{Lookup, LookupKind, LookupOutcome};
pub use message::{ConversationRecord, ConversationSummary, Role, SessionId, Turn};
pub use provider::{GenerateRequest, GenerateResponse, Provider, Usage};
pub use store::HistoryStore;
pub use subject::SubjectMode;
