//! Conversation history storage for Nova.

pub mod file_backend;

pub use file_backend::JsonFileStore;
